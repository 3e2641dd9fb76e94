//! timerfd syscall wrappers
//!
//! A timerfd becomes readable (`EPOLLIN`) when it expires; reading it returns
//! the number of expirations since the last read.

use crate::errno::Errno;
use crate::error::Error;
use crate::fs;
use crate::syscall::{nr, raw};
use crate::types::{Fd, Timespec};

/// timerfd_create flags
pub const TFD_NONBLOCK: u32 = 0o4000;
pub const TFD_CLOEXEC: u32 = 0o2000000;

/// timerfd_settime flags
pub const TFD_TIMER_ABSTIME: u32 = 1;
pub const TFD_TIMER_CANCEL_ON_SET: u32 = 2;

/// Timer setting: first expiration and reload interval.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Itimerspec {
    /// Period for repeating timers; zero for one-shot.
    pub it_interval: Timespec,
    /// Time until the first expiration; zero disarms.
    pub it_value: Timespec,
}

impl Itimerspec {
    /// A timer that fires once after `ms` milliseconds.
    pub const fn one_shot_millis(ms: u64) -> Self {
        Self {
            it_interval: Timespec::new(),
            it_value: Timespec::from_millis(ms),
        }
    }

    /// A timer that fires every `ms` milliseconds, first after `ms`.
    pub const fn periodic_millis(ms: u64) -> Self {
        Self {
            it_interval: Timespec::from_millis(ms),
            it_value: Timespec::from_millis(ms),
        }
    }

    pub fn is_disarmed(&self) -> bool {
        self.it_value.is_zero()
    }
}

/// Create a timer descriptor on `clock_id` (`clock::MONOTONIC`, ...).
#[inline]
pub fn timerfd_create(clock_id: u32, flags: u32) -> Result<Fd, Error> {
    let ret = unsafe { raw::syscall2(nr::TIMERFD_CREATE, clock_id as u64, flags as u64) as i64 };
    Error::from_syscall(ret).map(|fd| Fd::from_raw(fd as i32))
}

/// Arm or disarm a timer.
///
/// # Returns
/// The previous setting.
#[inline]
pub fn timerfd_settime(fd: Fd, flags: u32, new_value: &Itimerspec) -> Result<Itimerspec, Error> {
    let mut old = Itimerspec::default();
    let ret = unsafe {
        raw::syscall4(
            nr::TIMERFD_SETTIME,
            fd.arg(),
            flags as u64,
            new_value as *const Itimerspec as u64,
            &mut old as *mut Itimerspec as u64,
        ) as i64
    };
    Error::from_syscall(ret)?;
    Ok(old)
}

/// Current setting, with `it_value` as the time left until expiration.
#[inline]
pub fn timerfd_gettime(fd: Fd) -> Result<Itimerspec, Error> {
    let mut curr = Itimerspec::default();
    let ret = unsafe {
        raw::syscall2(nr::TIMERFD_GETTIME, fd.arg(), &mut curr as *mut Itimerspec as u64) as i64
    };
    Error::from_syscall(ret)?;
    Ok(curr)
}

/// Read the expiration count, blocking unless the fd is non-blocking.
///
/// # Errors
/// `EAGAIN` on a non-blocking timer that has not expired.
pub fn timerfd_read(fd: Fd) -> Result<u64, Error> {
    let mut buf = [0u8; 8];
    let n = fs::read(fd, &mut buf)?;
    if n != buf.len() {
        // the kernel always hands out the full counter
        return Err(Error::Os(Errno::EIO));
    }
    Ok(u64::from_ne_bytes(buf))
}
