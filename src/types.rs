//! Common types used across sysbind

/// Timespec structure for clock_gettime and timerfd (matches kernel definition)
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timespec {
    pub tv_sec: i64,
    pub tv_nsec: i64,
}

impl Timespec {
    pub const fn new() -> Self {
        Self {
            tv_sec: 0,
            tv_nsec: 0,
        }
    }

    /// Build a timespec from a millisecond count.
    pub const fn from_millis(ms: u64) -> Self {
        Self {
            tv_sec: (ms / 1_000) as i64,
            tv_nsec: ((ms % 1_000) * 1_000_000) as i64,
        }
    }

    /// Convert to total nanoseconds
    pub fn as_nanos(&self) -> i128 {
        (self.tv_sec as i128) * 1_000_000_000 + (self.tv_nsec as i128)
    }

    /// Convert to total milliseconds
    pub fn as_millis(&self) -> i64 {
        self.tv_sec * 1_000 + self.tv_nsec / 1_000_000
    }

    pub fn is_zero(&self) -> bool {
        self.tv_sec == 0 && self.tv_nsec == 0
    }
}

/// A file descriptor. This is a lightweight copyable handle.
/// For automatic close-on-drop, wrap in `OwnedFd`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Fd(i32);

impl Fd {
    pub const STDIN: Fd = Fd(0);
    pub const STDOUT: Fd = Fd(1);
    pub const STDERR: Fd = Fd(2);
    /// `AT_FDCWD`: resolve relative paths against the working directory.
    pub const CWD: Fd = Fd(-100);

    pub const fn from_raw(raw: i32) -> Self {
        Fd(raw)
    }
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// The descriptor sign-extended into a syscall argument register.
    #[inline]
    pub(crate) const fn arg(self) -> u64 {
        self.0 as i64 as u64
    }
}

/// Process ID type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Pid(i32);

impl Pid {
    /// The calling process, as understood by the sched_* calls.
    pub const SELF: Pid = Pid(0);

    pub const fn from_raw(raw: i32) -> Self {
        Pid(raw)
    }
    pub const fn raw(self) -> i32 {
        self.0
    }
}

/// Thread ID type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Tid(i32);

impl Tid {
    pub const fn from_raw(raw: i32) -> Self {
        Tid(raw)
    }
    pub const fn raw(self) -> i32 {
        self.0
    }
}

/// User ID type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Uid(u32);

impl Uid {
    pub const ROOT: Uid = Uid(0);

    pub const fn from_raw(raw: u32) -> Self {
        Uid(raw)
    }
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Group ID type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Gid(u32);

impl Gid {
    pub const fn from_raw(raw: u32) -> Self {
        Gid(raw)
    }
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// A file descriptor with RAII close-on-drop semantics.
#[derive(Debug)]
pub struct OwnedFd(Fd);

impl OwnedFd {
    pub fn new(fd: Fd) -> Self {
        OwnedFd(fd)
    }
    pub fn fd(&self) -> Fd {
        self.0
    }

    /// Consume self and return the raw Fd without closing.
    pub fn into_raw(self) -> Fd {
        let fd = self.0;
        core::mem::forget(self);
        fd
    }
}

impl Drop for OwnedFd {
    fn drop(&mut self) {
        if let Err(e) = crate::fs::close(self.0) {
            log::debug!("close({}) on drop failed: {}", self.0.raw(), e);
        }
    }
}

/// Clock IDs for clock_gettime and timerfd_create (Linux conventions)
pub mod clock {
    pub const REALTIME: u32 = 0;
    pub const MONOTONIC: u32 = 1;
    pub const BOOTTIME: u32 = 7;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timespec_from_millis_splits_seconds() {
        let ts = Timespec::from_millis(2_500);
        assert_eq!(ts.tv_sec, 2);
        assert_eq!(ts.tv_nsec, 500_000_000);
        assert_eq!(ts.as_millis(), 2_500);
        assert!(Timespec::new().is_zero());
    }

    #[test]
    fn at_fdcwd_is_sign_extended() {
        assert_eq!(Fd::CWD.arg(), (-100i64) as u64);
        assert_eq!(Fd::STDERR.arg(), 2);
    }
}
