//! File preallocation, access hints and status queries

mod scratch;
use scratch::{skip, ScratchFile};

use sysbind::fs::{
    self, fallocate, posix_fadvise, FALLOC_FL_KEEP_SIZE, FALLOC_FL_PUNCH_HOLE, O_CLOEXEC,
    POSIX_FADV_DONTNEED, POSIX_FADV_NOREUSE, POSIX_FADV_NORMAL, POSIX_FADV_RANDOM,
    POSIX_FADV_SEQUENTIAL, POSIX_FADV_WILLNEED, SEEK_END, SEEK_SET,
};
use sysbind::stat::{
    fstat, fstatat, statx, AT_STATX_SYNC_AS_STAT, STATX_BASIC_STATS, STATX_INO, STATX_SIZE,
};
use sysbind::{Errno, Error, Fd, OwnedFd};

const LEN: i64 = 64 * 1024;

#[test]
fn fallocate_extends_file() {
    let file = ScratchFile::new("fallocate");
    match fallocate(file.fd(), 0, 0, LEN) {
        Ok(()) => {}
        Err(e) if e.is_unsupported() => return skip("fallocate", e),
        Err(e) => panic!("fallocate: {}", e),
    }
    let st = fstat(file.fd()).expect("fstat");
    assert_eq!(st.st_size, LEN);
    assert!(st.st_blocks * 512 >= LEN, "only {} blocks allocated", st.st_blocks);
}

#[test]
fn fallocate_keep_size_preserves_length() {
    let file = ScratchFile::with_contents("keep-size", b"hello");
    match fallocate(file.fd(), FALLOC_FL_KEEP_SIZE, 0, LEN) {
        Ok(()) => {}
        Err(e) if e.is_unsupported() => return skip("fallocate keep-size", e),
        Err(e) => panic!("fallocate: {}", e),
    }
    assert_eq!(fstat(file.fd()).expect("fstat").st_size, 5);
}

#[test]
fn punch_hole_zeroes_data() {
    let file = ScratchFile::with_contents("punch", &[0xaa; 8192]);
    match fallocate(file.fd(), FALLOC_FL_PUNCH_HOLE | FALLOC_FL_KEEP_SIZE, 0, 4096) {
        Ok(()) => {}
        Err(e) if e.is_unsupported() => return skip("punch hole", e),
        Err(e) => panic!("fallocate: {}", e),
    }
    let mut buf = [0xffu8; 8192];
    fs::lseek(file.fd(), 0, SEEK_SET).expect("lseek");
    assert_eq!(fs::read(file.fd(), &mut buf).expect("read"), 8192);
    assert!(buf[..4096].iter().all(|&b| b == 0));
    assert!(buf[4096..].iter().all(|&b| b == 0xaa));
}

#[test]
fn fallocate_rejects_bad_arguments() {
    let file = ScratchFile::new("fallocate-bad");
    assert_eq!(fallocate(file.fd(), 0, 0, 0), Err(Error::Os(Errno::EINVAL)));
    assert_eq!(fallocate(file.fd(), 0, -1, 10), Err(Error::Os(Errno::EINVAL)));

    let (read_end, write_end) = fs::pipe2(O_CLOEXEC).expect("pipe2");
    let (_r, w) = (OwnedFd::new(read_end), OwnedFd::new(write_end));
    assert_eq!(fallocate(w.fd(), 0, 0, 10), Err(Error::Os(Errno::ESPIPE)));
}

#[test]
fn fadvise_accepts_every_advice() {
    let file = ScratchFile::with_contents("fadvise", &[1; 4096]);
    for advice in [
        POSIX_FADV_NORMAL,
        POSIX_FADV_RANDOM,
        POSIX_FADV_SEQUENTIAL,
        POSIX_FADV_WILLNEED,
        POSIX_FADV_DONTNEED,
        POSIX_FADV_NOREUSE,
    ] {
        posix_fadvise(file.fd(), 0, 0, advice)
            .unwrap_or_else(|e| panic!("advice {}: {}", advice, e));
    }
    posix_fadvise(file.fd(), 1024, 2048, POSIX_FADV_SEQUENTIAL).expect("ranged advice");
}

#[test]
fn fadvise_reports_errors() {
    let file = ScratchFile::new("fadvise-bad");
    assert_eq!(posix_fadvise(file.fd(), 0, 0, 99), Err(Error::Os(Errno::EINVAL)));
    assert_eq!(
        posix_fadvise(Fd::from_raw(-1), 0, 0, POSIX_FADV_NORMAL),
        Err(Error::Os(Errno::EBADF))
    );

    let (read_end, write_end) = fs::pipe2(O_CLOEXEC).expect("pipe2");
    let (r, _w) = (OwnedFd::new(read_end), OwnedFd::new(write_end));
    assert_eq!(
        posix_fadvise(r.fd(), 0, 0, POSIX_FADV_NORMAL),
        Err(Error::Os(Errno::ESPIPE))
    );
}

#[test]
fn statx_agrees_with_fstatat() {
    let file = ScratchFile::with_contents("statx", b"some file contents\n");

    let stx = match statx(Fd::CWD, file.path(), AT_STATX_SYNC_AS_STAT, STATX_BASIC_STATS) {
        Ok(stx) => stx,
        Err(e) if e.is_unsupported() => return skip("statx", e),
        Err(e) => panic!("statx: {}", e),
    };
    let st = fstatat(Fd::CWD, file.path(), 0).expect("fstatat");

    assert!(stx.has(STATX_INO | STATX_SIZE));
    assert!(stx.is_file() && st.is_file());
    assert_eq!(stx.stx_ino, st.st_ino);
    assert_eq!(stx.stx_size as i64, st.st_size);
    assert_eq!(stx.stx_mode as u32, st.st_mode);
    assert_eq!(stx.stx_uid, st.st_uid);
    assert_eq!(stx.stx_gid, st.st_gid);
    assert_eq!(stx.stx_nlink as u64, st.nlink());
    assert_eq!(stx.stx_blocks as i64, st.st_blocks);
    assert_eq!(stx.dev(), st.st_dev);
    assert_eq!(stx.stx_mtime.tv_sec, st.st_mtime);
    assert_eq!(stx.stx_mtime.tv_nsec as i64, st.st_mtime_nsec);
}

#[test]
fn statx_empty_path_targets_descriptor() {
    let file = ScratchFile::with_contents("statx-fd", &[7; 100]);
    let stx = match statx(file.fd(), c"", sysbind::fs::AT_EMPTY_PATH, STATX_SIZE) {
        Ok(stx) => stx,
        Err(e) if e.is_unsupported() => return skip("statx", e),
        Err(e) => panic!("statx: {}", e),
    };
    assert_eq!(stx.stx_size, 100);
    assert_eq!(fstat(file.fd()).expect("fstat").st_ino, stx.stx_ino);
}

#[test]
fn fstatat_matches_libc_stat() {
    let file = ScratchFile::with_contents("fstatat", b"abc");
    let ours = fstatat(Fd::CWD, file.path(), 0).expect("fstatat");

    let mut theirs: libc::stat = unsafe { std::mem::zeroed() };
    assert_eq!(unsafe { libc::stat(file.path().as_ptr(), &mut theirs) }, 0);
    assert_eq!(ours.st_ino, theirs.st_ino as u64);
    assert_eq!(ours.st_size, theirs.st_size as i64);
    assert_eq!(ours.st_mode, theirs.st_mode as u32);
    assert_eq!(ours.st_dev, theirs.st_dev as u64);
}

#[test]
fn missing_path_is_enoent() {
    assert_eq!(
        fstatat(Fd::CWD, c"/nonexistent/sysbind/path", 0).map(|st| st.st_ino),
        Err(Error::Os(Errno::ENOENT))
    );
}

#[test]
fn truncate_pwrite_and_seek() {
    let file = ScratchFile::new("resize");
    fs::ftruncate(file.fd(), 4096).expect("ftruncate");
    assert_eq!(fs::lseek(file.fd(), 0, SEEK_END).expect("lseek"), 4096);

    assert_eq!(fs::pwrite(file.fd(), b"tail", 4096).expect("pwrite"), 4);
    assert_eq!(fstat(file.fd()).expect("fstat").st_size, 4100);
    // pwrite leaves the offset alone
    assert_eq!(fs::lseek(file.fd(), 0, sysbind::fs::SEEK_CUR).expect("lseek"), 4096);
}
