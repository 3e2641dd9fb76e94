//! sysbind: Linux userspace system call bindings
//!
//! This library provides safe(r) wrappers around a handful of Linux syscalls,
//! issued directly through the architecture's syscall instruction rather than
//! through a C library:
//!
//! - CPU affinity: [`CpuSet`] (a bit-for-bit `cpu_set_t`) and the
//!   `sched_{get,set}affinity` calls in [`sched`]
//! - Process identity: [`process`] and the auxiliary vector in [`auxv`]
//! - Files: preallocation and access hints in [`fs`], status in [`stat`]
//! - Events: [`epoll`] and [`timerfd`]
//!
//! # Usage
//!
//! ```rust,ignore
//! use sysbind::{sched, CpuSet};
//!
//! let mut set = CpuSet::new();
//! set.set(0);
//! set.set(2);
//! sched::sched_setaffinity(0, &set)?;
//! ```
//!
//! Every fallible call returns `Result<T, Error>`; CpuSet operations never fail.

#![no_std]

#[cfg(not(target_os = "linux"))]
compile_error!("sysbind only supports Linux targets");

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
compile_error!("sysbind only supports x86_64 and aarch64");

// Re-export all public APIs
pub use cpuset::{CpuSet, ParseCpuListError, CPU_SETSIZE};
pub use errno::Errno;
pub use error::Error;
pub use syscall::raw;
pub use types::*;

pub mod auxv;
pub mod cpuset;
pub mod epoll;
pub mod errno;
pub mod error;
pub mod fs;
pub mod process;
pub mod sched;
pub mod stat;
pub mod syscall;
pub mod time;
pub mod timerfd;
pub mod types;
