//! CPU affinity syscall wrappers
//!
//! A pid of [`Pid::SELF`] (0) means the calling thread. Affinity is per
//! thread on Linux; new threads inherit the mask of their creator.

use core::mem::size_of;

use crate::cpuset::CpuSet;
use crate::error::Error;
use crate::syscall::{nr, raw};
use crate::types::Pid;

/// Fetch the affinity mask of `pid` into `set`.
///
/// `set` is cleared first; the kernel writes only as many bytes as it has
/// possible CPUs, so the remainder stays empty.
///
/// # Returns
/// The number of bytes the kernel wrote.
pub fn sched_getaffinity(pid: Pid, set: &mut CpuSet) -> Result<usize, Error> {
    set.zero();
    let ret = unsafe {
        raw::syscall3(
            nr::SCHED_GETAFFINITY,
            pid.raw() as i64 as u64,
            size_of::<CpuSet>() as u64,
            set as *mut CpuSet as u64,
        ) as i64
    };
    Error::from_syscall(ret).map(|n| n as usize)
}

/// Restrict `pid` to the CPUs in `set`.
///
/// # Errors
/// `EINVAL` when `set` contains no CPU the thread may run on, `ESRCH` for an
/// unknown pid, `EPERM` for another user's process.
pub fn sched_setaffinity(pid: Pid, set: &CpuSet) -> Result<(), Error> {
    let ret = unsafe {
        raw::syscall3(
            nr::SCHED_SETAFFINITY,
            pid.raw() as i64 as u64,
            size_of::<CpuSet>() as u64,
            set as *const CpuSet as u64,
        ) as i64
    };
    Error::from_syscall(ret)?;
    log::debug!("pid {} affinity set to {}", pid.raw(), set);
    Ok(())
}

/// The affinity mask of the calling thread.
pub fn current_affinity() -> Result<CpuSet, Error> {
    let mut set = CpuSet::new();
    sched_getaffinity(Pid::SELF, &mut set)?;
    Ok(set)
}

/// Pin the calling thread to a single CPU.
pub fn pin_current_thread(cpu: usize) -> Result<(), Error> {
    let mut set = CpuSet::new();
    set.set(cpu);
    if set.is_empty() {
        return Err(Error::InvalidInput("cpu index beyond CPU_SETSIZE"));
    }
    sched_setaffinity(Pid::SELF, &set)
}

/// The CPU and NUMA node the calling thread is running on.
///
/// The answer can be stale by the time it is used unless the thread is
/// pinned.
pub fn getcpu() -> Result<(u32, u32), Error> {
    let mut cpu: u32 = 0;
    let mut node: u32 = 0;
    let ret = unsafe {
        raw::syscall3(
            nr::GETCPU,
            &mut cpu as *mut u32 as u64,
            &mut node as *mut u32 as u64,
            0,
        ) as i64
    };
    Error::from_syscall(ret)?;
    Ok((cpu, node))
}
