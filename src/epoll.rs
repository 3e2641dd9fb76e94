//! epoll syscall wrappers
//!
//! `epoll_wait` is issued as `epoll_pwait` with a null signal mask, the only
//! form aarch64 provides.

use crate::error::Error;
use crate::syscall::{nr, raw};
use crate::types::Fd;

/// epoll_create1 flags
pub const EPOLL_CLOEXEC: u32 = 0o2000000;

/// epoll_ctl operations
pub const EPOLL_CTL_ADD: i32 = 1;
pub const EPOLL_CTL_DEL: i32 = 2;
pub const EPOLL_CTL_MOD: i32 = 3;

/// Event bits
pub const EPOLLIN: u32 = 0x001;
pub const EPOLLPRI: u32 = 0x002;
pub const EPOLLOUT: u32 = 0x004;
pub const EPOLLERR: u32 = 0x008;
pub const EPOLLHUP: u32 = 0x010;
pub const EPOLLRDHUP: u32 = 0x2000;
pub const EPOLLEXCLUSIVE: u32 = 1 << 28;
pub const EPOLLWAKEUP: u32 = 1 << 29;
pub const EPOLLONESHOT: u32 = 1 << 30;
pub const EPOLLET: u32 = 1 << 31;

/// Kernel `struct epoll_event`. Packed on x86_64 only.
#[cfg_attr(target_arch = "x86_64", repr(C, packed))]
#[cfg_attr(not(target_arch = "x86_64"), repr(C))]
#[derive(Clone, Copy, Default)]
pub struct EpollEvent {
    pub events: u32,
    pub data: u64,
}

impl EpollEvent {
    pub const fn new(events: u32, data: u64) -> Self {
        Self { events, data }
    }

    /// Copy of the event bits (safe to use on the packed layout).
    pub fn events(&self) -> u32 {
        self.events
    }

    /// Copy of the user data (safe to use on the packed layout).
    pub fn data(&self) -> u64 {
        self.data
    }
}

impl core::fmt::Debug for EpollEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EpollEvent")
            .field("events", &format_args!("{:#x}", self.events()))
            .field("data", &self.data())
            .finish()
    }
}

/// Create an epoll instance.
#[inline]
pub fn epoll_create1(flags: u32) -> Result<Fd, Error> {
    let ret = unsafe { raw::syscall1(nr::EPOLL_CREATE1, flags as u64) as i64 };
    Error::from_syscall(ret).map(|fd| Fd::from_raw(fd as i32))
}

/// Add, modify or remove `fd` in the interest list of `epfd`.
///
/// `event` may be `None` for `EPOLL_CTL_DEL`.
#[inline]
pub fn epoll_ctl(epfd: Fd, op: i32, fd: Fd, event: Option<&mut EpollEvent>) -> Result<(), Error> {
    let event_ptr = match event {
        Some(ev) => ev as *mut EpollEvent as u64,
        None => 0,
    };
    let ret = unsafe {
        raw::syscall4(nr::EPOLL_CTL, epfd.arg(), op as i64 as u64, fd.arg(), event_ptr) as i64
    };
    Error::from_syscall(ret).map(|_| ())
}

/// Wait for events on `epfd`.
///
/// # Arguments
/// * `events` - Buffer receiving ready events; must not be empty
/// * `timeout_ms` - Milliseconds to wait, -1 for forever, 0 to poll
///
/// # Returns
/// Number of entries of `events` filled in (0 on timeout).
pub fn epoll_wait(epfd: Fd, events: &mut [EpollEvent], timeout_ms: i32) -> Result<usize, Error> {
    if events.is_empty() {
        return Err(Error::InvalidInput("epoll_wait needs room for at least one event"));
    }
    let max_events = events.len().min(i32::MAX as usize);
    let ret = unsafe {
        raw::syscall6(
            nr::EPOLL_PWAIT,
            epfd.arg(),
            events.as_mut_ptr() as u64,
            max_events as u64,
            timeout_ms as i64 as u64,
            0, // no signal mask
            0,
        ) as i64
    };
    Error::from_syscall(ret).map(|n| n as usize)
}
