//! Process identity syscall wrappers
//!
//! These calls cannot fail on Linux, so they return the value directly.

use crate::syscall::{nr, raw};
use crate::types::{Gid, Pid, Tid, Uid};

/// Get the current process ID.
#[inline]
pub fn getpid() -> Pid {
    Pid::from_raw(unsafe { raw::syscall0(nr::GETPID) } as i32)
}

/// Get the parent's process ID.
#[inline]
pub fn getppid() -> Pid {
    Pid::from_raw(unsafe { raw::syscall0(nr::GETPPID) } as i32)
}

/// Get the current thread ID.
///
/// Equal to [`getpid`] on the main thread.
#[inline]
pub fn gettid() -> Tid {
    Tid::from_raw(unsafe { raw::syscall0(nr::GETTID) } as i32)
}

/// Get the real user ID.
#[inline]
pub fn getuid() -> Uid {
    Uid::from_raw(unsafe { raw::syscall0(nr::GETUID) } as u32)
}

/// Get the effective user ID.
#[inline]
pub fn geteuid() -> Uid {
    Uid::from_raw(unsafe { raw::syscall0(nr::GETEUID) } as u32)
}

/// Get the real group ID.
#[inline]
pub fn getgid() -> Gid {
    Gid::from_raw(unsafe { raw::syscall0(nr::GETGID) } as u32)
}

/// Get the effective group ID.
#[inline]
pub fn getegid() -> Gid {
    Gid::from_raw(unsafe { raw::syscall0(nr::GETEGID) } as u32)
}
