//! Time-related syscall wrappers
//!
//! This module provides both the POSIX-named syscall wrapper (clock_gettime)
//! and Rust-idiomatic convenience functions (now_monotonic, now_realtime).

use crate::error::Error;
use crate::syscall::{nr, raw};
use crate::types::{clock, Timespec};

/// Get the current time from a clock.
///
/// # Arguments
/// * `clock_id` - Which clock to query (CLOCK_REALTIME, CLOCK_MONOTONIC, ...)
/// * `ts` - Timespec struct to fill with the result
///
/// # Example
/// ```rust,ignore
/// use sysbind::time::{clock_gettime, CLOCK_MONOTONIC};
/// use sysbind::Timespec;
///
/// let mut ts = Timespec::new();
/// clock_gettime(CLOCK_MONOTONIC, &mut ts)?;
/// ```
#[inline]
pub fn clock_gettime(clock_id: u32, ts: &mut Timespec) -> Result<(), Error> {
    let ret = unsafe {
        raw::syscall2(nr::CLOCK_GETTIME, clock_id as u64, ts as *mut Timespec as u64)
    };
    Error::from_syscall(ret as i64).map(|_| ())
}

/// Get current wall-clock (real) time.
#[inline]
pub fn now_realtime() -> Result<Timespec, Error> {
    let mut ts = Timespec::new();
    clock_gettime(clock::REALTIME, &mut ts)?;
    Ok(ts)
}

/// Get current monotonic time (time since boot, excluding suspend).
#[inline]
pub fn now_monotonic() -> Result<Timespec, Error> {
    let mut ts = Timespec::new();
    clock_gettime(clock::MONOTONIC, &mut ts)?;
    Ok(ts)
}

// Re-export clock constants for convenience
pub use crate::types::clock::{
    BOOTTIME as CLOCK_BOOTTIME, MONOTONIC as CLOCK_MONOTONIC, REALTIME as CLOCK_REALTIME,
};
