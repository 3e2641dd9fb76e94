//! Filesystem syscall wrappers
//!
//! Provides wrappers around file-related system calls:
//! - openat/open: Open a file and get a file descriptor
//! - read/write/pwrite: Move data through a descriptor
//! - lseek/ftruncate: Reposition and resize
//! - fallocate: Preallocate or deallocate file space
//! - posix_fadvise: Announce an access pattern
//! - unlinkat/close/pipe2
//!
//! Descriptors returned here are plain [`Fd`]s; wrap them in [`OwnedFd`] for
//! close-on-drop.

use core::ffi::CStr;

use crate::error::Error;
use crate::syscall::{nr, raw};
use crate::types::{Fd, OwnedFd};

/// Open flags (Linux generic values, shared by x86_64 and aarch64)
pub const O_RDONLY: u32 = 0;
pub const O_WRONLY: u32 = 1;
pub const O_RDWR: u32 = 2;
pub const O_CREAT: u32 = 0o100;
pub const O_EXCL: u32 = 0o200;
pub const O_TRUNC: u32 = 0o1000;
pub const O_APPEND: u32 = 0o2000;
pub const O_NONBLOCK: u32 = 0o4000;
pub const O_CLOEXEC: u32 = 0o2000000;

/// O_DIRECTORY - must be a directory
#[cfg(target_arch = "x86_64")]
pub const O_DIRECTORY: u32 = 0o200000;
#[cfg(target_arch = "aarch64")]
pub const O_DIRECTORY: u32 = 0o40000;

/// Seek whence values
pub const SEEK_SET: i32 = 0;
pub const SEEK_CUR: i32 = 1;
pub const SEEK_END: i32 = 2;

/// `*at` flags
pub const AT_SYMLINK_NOFOLLOW: u32 = 0x100;
pub const AT_REMOVEDIR: u32 = 0x200;
pub const AT_EMPTY_PATH: u32 = 0x1000;

/// fallocate modes
pub const FALLOC_FL_KEEP_SIZE: i32 = 0x01;
pub const FALLOC_FL_PUNCH_HOLE: i32 = 0x02;
pub const FALLOC_FL_COLLAPSE_RANGE: i32 = 0x08;
pub const FALLOC_FL_ZERO_RANGE: i32 = 0x10;
pub const FALLOC_FL_INSERT_RANGE: i32 = 0x20;
pub const FALLOC_FL_UNSHARE_RANGE: i32 = 0x40;

/// posix_fadvise advice values
pub const POSIX_FADV_NORMAL: i32 = 0;
pub const POSIX_FADV_RANDOM: i32 = 1;
pub const POSIX_FADV_SEQUENTIAL: i32 = 2;
pub const POSIX_FADV_WILLNEED: i32 = 3;
pub const POSIX_FADV_DONTNEED: i32 = 4;
pub const POSIX_FADV_NOREUSE: i32 = 5;

/// Open a file relative to a directory descriptor.
///
/// # Arguments
/// * `dirfd` - Directory for relative paths, or `Fd::CWD`
/// * `path` - Path to the file
/// * `flags` - Open flags (O_RDONLY, O_WRONLY, O_RDWR, O_CREAT, etc.)
/// * `mode` - File permissions if creating (e.g., 0o644)
#[inline]
pub fn openat(dirfd: Fd, path: &CStr, flags: u32, mode: u32) -> Result<Fd, Error> {
    let ret = unsafe {
        raw::syscall4(
            nr::OPENAT,
            dirfd.arg(),
            path.as_ptr() as u64,
            flags as u64,
            mode as u64,
        ) as i64
    };
    Error::from_syscall(ret).map(|fd| Fd::from_raw(fd as i32))
}

/// Open a file relative to the working directory.
///
/// # Example
/// ```ignore
/// let fd = open(c"/proc/self/auxv", O_RDONLY | O_CLOEXEC, 0)?;
/// ```
#[inline]
pub fn open(path: &CStr, flags: u32, mode: u32) -> Result<Fd, Error> {
    openat(Fd::CWD, path, flags, mode)
}

/// Open a file and wrap the descriptor so it closes on drop.
pub fn open_owned(path: &CStr, flags: u32, mode: u32) -> Result<OwnedFd, Error> {
    open(path, flags, mode).map(OwnedFd::new)
}

/// Close a file descriptor.
#[inline]
pub fn close(fd: Fd) -> Result<(), Error> {
    let ret = unsafe { raw::syscall1(nr::CLOSE, fd.arg()) as i64 };
    Error::from_syscall(ret).map(|_| ())
}

/// Read from a file descriptor into a buffer.
///
/// # Returns
/// Number of bytes read on success (0 at end of file).
#[inline]
pub fn read(fd: Fd, buf: &mut [u8]) -> Result<usize, Error> {
    let ret = unsafe {
        raw::syscall3(nr::READ, fd.arg(), buf.as_mut_ptr() as u64, buf.len() as u64) as i64
    };
    Error::from_syscall(ret).map(|n| n as usize)
}

/// Write bytes to a file descriptor.
///
/// # Returns
/// Number of bytes written on success.
#[inline]
pub fn write(fd: Fd, buf: &[u8]) -> Result<usize, Error> {
    let ret = unsafe {
        raw::syscall3(nr::WRITE, fd.arg(), buf.as_ptr() as u64, buf.len() as u64) as i64
    };
    Error::from_syscall(ret).map(|n| n as usize)
}

/// Write bytes at an absolute offset without moving the file position.
#[inline]
pub fn pwrite(fd: Fd, buf: &[u8], offset: i64) -> Result<usize, Error> {
    let ret = unsafe {
        raw::syscall4(
            nr::PWRITE64,
            fd.arg(),
            buf.as_ptr() as u64,
            buf.len() as u64,
            offset as u64,
        ) as i64
    };
    Error::from_syscall(ret).map(|n| n as usize)
}

/// Reposition the file offset.
///
/// # Returns
/// The resulting offset from the start of the file.
#[inline]
pub fn lseek(fd: Fd, offset: i64, whence: i32) -> Result<u64, Error> {
    let ret = unsafe {
        raw::syscall3(nr::LSEEK, fd.arg(), offset as u64, whence as i64 as u64) as i64
    };
    Error::from_syscall(ret)
}

/// Truncate or extend a file to exactly `len` bytes.
#[inline]
pub fn ftruncate(fd: Fd, len: i64) -> Result<(), Error> {
    let ret = unsafe { raw::syscall2(nr::FTRUNCATE, fd.arg(), len as u64) as i64 };
    Error::from_syscall(ret).map(|_| ())
}

/// Remove a directory entry (`AT_REMOVEDIR` in `flags` for directories).
#[inline]
pub fn unlinkat(dirfd: Fd, path: &CStr, flags: u32) -> Result<(), Error> {
    let ret = unsafe {
        raw::syscall3(nr::UNLINKAT, dirfd.arg(), path.as_ptr() as u64, flags as u64) as i64
    };
    Error::from_syscall(ret).map(|_| ())
}

/// Create a pipe.
///
/// # Returns
/// `(read_end, write_end)`
#[inline]
pub fn pipe2(flags: u32) -> Result<(Fd, Fd), Error> {
    let mut fds = [0i32; 2];
    let ret = unsafe { raw::syscall2(nr::PIPE2, fds.as_mut_ptr() as u64, flags as u64) as i64 };
    Error::from_syscall(ret)?;
    Ok((Fd::from_raw(fds[0]), Fd::from_raw(fds[1])))
}

/// Manipulate the allocated disk space of a file.
///
/// With `mode == 0` the range `[offset, offset + len)` is allocated and the
/// file grows to at least `offset + len` bytes. `FALLOC_FL_KEEP_SIZE`
/// allocates without changing the size; `FALLOC_FL_PUNCH_HOLE` (which must be
/// combined with `FALLOC_FL_KEEP_SIZE`) deallocates.
///
/// # Errors
/// `EOPNOTSUPP` when the filesystem does not implement the mode; see
/// [`Error::is_unsupported`].
#[inline]
pub fn fallocate(fd: Fd, mode: i32, offset: i64, len: i64) -> Result<(), Error> {
    let ret = unsafe {
        raw::syscall4(
            nr::FALLOCATE,
            fd.arg(),
            mode as i64 as u64,
            offset as u64,
            len as u64,
        ) as i64
    };
    Error::from_syscall(ret).map(|_| ()).inspect_err(|e| {
        if e.is_unsupported() {
            log::debug!("fallocate mode {:#x} unsupported on fd {}", mode, fd.raw());
        }
    })
}

/// Announce an intention to access file data in a specific pattern.
///
/// `len == 0` means "to the end of the file". Unlike the C library function,
/// failure is reported through `Err` rather than as a return code.
///
/// # Errors
/// `EBADF` for a bad descriptor, `ESPIPE` for a pipe or FIFO, `EINVAL` for
/// an unknown `advice`.
#[inline]
pub fn posix_fadvise(fd: Fd, offset: i64, len: i64, advice: i32) -> Result<(), Error> {
    let ret = unsafe {
        raw::syscall4(
            nr::FADVISE64,
            fd.arg(),
            offset as u64,
            len as u64,
            advice as i64 as u64,
        ) as i64
    };
    Error::from_syscall(ret).map(|_| ())
}
