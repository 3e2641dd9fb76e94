//! CpuSet ABI compatibility with the C library's cpu_set_t
//!
//! The libc crate's CPU_* functions are the reference: a CpuSet copied
//! byte-for-byte into a cpu_set_t must mean the same set.

use std::mem::{align_of, size_of, zeroed};

use sysbind::cpuset::{CPU_AND, CPU_COUNT, CPU_EQUAL, CPU_ISSET, CPU_OR, CPU_SET, CPU_XOR, CPU_ZERO};
use sysbind::{CpuSet, CPU_SETSIZE};

fn to_libc(set: &CpuSet) -> libc::cpu_set_t {
    let mut raw: libc::cpu_set_t = unsafe { zeroed() };
    unsafe {
        std::ptr::copy_nonoverlapping(
            set.as_bytes().as_ptr(),
            &mut raw as *mut libc::cpu_set_t as *mut u8,
            size_of::<libc::cpu_set_t>(),
        );
    }
    raw
}

fn from_libc(raw: &libc::cpu_set_t) -> CpuSet {
    let mut set = CpuSet::new();
    for cpu in 0..CPU_SETSIZE {
        if unsafe { libc::CPU_ISSET(cpu, raw) } {
            set.set(cpu);
        }
    }
    set
}

fn set_of(cpus: &[usize]) -> CpuSet {
    let mut set = CpuSet::new();
    CPU_ZERO(&mut set);
    for &cpu in cpus {
        CPU_SET(cpu, &mut set);
    }
    set
}

#[test]
fn layout_matches_libc_cpu_set_t() {
    assert_eq!(size_of::<CpuSet>(), size_of::<libc::cpu_set_t>());
    assert_eq!(align_of::<CpuSet>(), align_of::<libc::cpu_set_t>());
    assert_eq!(CPU_SETSIZE, libc::CPU_SETSIZE as usize);
}

#[test]
fn bits_land_where_libc_puts_them() {
    for cpu in [0, 1, 31, 32, 63, 64, 127, 500, CPU_SETSIZE - 1] {
        let ours = set_of(&[cpu]);

        let mut theirs: libc::cpu_set_t = unsafe { zeroed() };
        unsafe {
            libc::CPU_ZERO(&mut theirs);
            libc::CPU_SET(cpu, &mut theirs);
        }

        let ours_raw = to_libc(&ours);
        assert!(unsafe { libc::CPU_ISSET(cpu, &ours_raw) }, "cpu {}", cpu);
        assert_eq!(unsafe { libc::CPU_COUNT(&ours_raw) }, 1);
        assert!(unsafe { libc::CPU_EQUAL(&ours_raw, &theirs) }, "cpu {}", cpu);
        assert_eq!(from_libc(&theirs), ours);
    }
}

#[test]
fn count_agrees_with_libc() {
    let set: CpuSet = (0..CPU_SETSIZE).filter(|cpu| cpu % 3 == 0).collect();
    let raw = to_libc(&set);
    assert_eq!(CPU_COUNT(&set), unsafe { libc::CPU_COUNT(&raw) } as usize);
}

#[test]
fn documented_set_algebra_scenario() {
    let a = set_of(&[5, 14, 24, 78]);
    let b = set_of(&[1, 5, 9, 24]);
    let mut dst = CpuSet::new();

    CPU_AND(&mut dst, &a, &b);
    assert!(CPU_EQUAL(&dst, &set_of(&[5, 24])));

    CPU_OR(&mut dst, &a, &b);
    assert!(CPU_EQUAL(&dst, &set_of(&[1, 5, 9, 14, 24, 78])));

    CPU_XOR(&mut dst, &a, &b);
    assert!(CPU_EQUAL(&dst, &set_of(&[1, 9, 14, 78])));

    assert!(CPU_EQUAL(&a, &a));
    assert!(!CPU_EQUAL(&a, &b));
}

#[test]
fn destination_may_start_as_a_copy_of_a_source() {
    let a = set_of(&[5, 14, 24, 78]);
    let b = set_of(&[1, 5, 9, 24]);

    let mut dst = a;
    let src = dst;
    dst.and(&src, &b);
    assert_eq!(dst, set_of(&[5, 24]));
}

#[test]
fn out_of_range_index_leaves_set_unchanged() {
    let mut set = set_of(&[3, 700]);
    let before = set;
    CPU_SET(CPU_SETSIZE, &mut set);
    assert_eq!(set, before);
    assert!(!CPU_ISSET(CPU_SETSIZE, &set));
    for cpu in 0..CPU_SETSIZE {
        assert_eq!(CPU_ISSET(cpu, &set), CPU_ISSET(cpu, &before));
    }
}
