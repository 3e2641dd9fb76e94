//! Process identity and auxiliary vector queries

use sysbind::auxv::{self, getauxval, AT_EGID, AT_EUID, AT_GID, AT_PAGESZ, AT_UID};
use sysbind::process::{getegid, geteuid, getgid, getpid, getppid, gettid, getuid};
use sysbind::{Errno, Error};

#[test]
fn getpid_matches_std() {
    assert_eq!(getpid().raw() as u32, std::process::id());
}

#[test]
fn getppid_matches_libc() {
    assert_eq!(getppid().raw(), unsafe { libc::getppid() });
}

#[test]
fn gettid_is_per_thread() {
    let here = gettid();
    assert_eq!(here.raw() as libc::c_long, unsafe { libc::syscall(libc::SYS_gettid) });

    let there = std::thread::spawn(gettid).join().expect("thread panicked");
    assert_ne!(here, there);
}

#[test]
fn credentials_match_libc() {
    assert_eq!(getuid().raw(), unsafe { libc::getuid() });
    assert_eq!(geteuid().raw(), unsafe { libc::geteuid() });
    assert_eq!(getgid().raw(), unsafe { libc::getgid() });
    assert_eq!(getegid().raw(), unsafe { libc::getegid() });
}

#[test]
fn auxv_credentials_match_process_credentials() {
    assert_eq!(getauxval(AT_UID).expect("AT_UID"), getuid().raw() as u64);
    assert_eq!(getauxval(AT_EUID).expect("AT_EUID"), geteuid().raw() as u64);
    assert_eq!(getauxval(AT_GID).expect("AT_GID"), getgid().raw() as u64);
    assert_eq!(getauxval(AT_EGID).expect("AT_EGID"), getegid().raw() as u64);
}

#[test]
fn auxv_matches_libc_getauxval() {
    for key in [AT_UID, AT_GID, AT_PAGESZ] {
        let theirs = unsafe { libc::getauxval(key as libc::c_ulong) } as u64;
        assert_eq!(getauxval(key).expect("getauxval"), theirs, "key {}", key);
    }
    let page = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as u64;
    assert_eq!(getauxval(AT_PAGESZ).expect("AT_PAGESZ"), page);
}

#[test]
fn missing_auxv_key_is_enoent() {
    assert_eq!(getauxval(0xdead_beef), Err(Error::Os(Errno::ENOENT)));
}

#[test]
fn auxv_table_is_loaded_once() {
    let first = auxv::table().expect("auxv table") as *const _;
    let second = auxv::table().expect("auxv table") as *const _;
    assert_eq!(first, second);
    assert!(!auxv::table().expect("auxv table").is_empty());
}
