//! File status: fstat, fstatat and statx
//!
//! `struct stat` differs between x86_64 and aarch64, so [`Stat`] is defined
//! per architecture; use the accessor methods for fields whose width differs.
//! `struct statx` is the same everywhere.

use core::ffi::CStr;

use crate::error::Error;
use crate::syscall::{nr, raw};
use crate::types::Fd;

/// File type mode constants (for st_mode interpretation)
pub const S_IFMT: u32 = 0o170000; // File type mask
pub const S_IFSOCK: u32 = 0o140000; // Socket
pub const S_IFLNK: u32 = 0o120000; // Symbolic link
pub const S_IFREG: u32 = 0o100000; // Regular file
pub const S_IFBLK: u32 = 0o060000; // Block device
pub const S_IFDIR: u32 = 0o040000; // Directory
pub const S_IFCHR: u32 = 0o020000; // Character device
pub const S_IFIFO: u32 = 0o010000; // FIFO (pipe)

/// statx mask bits
pub const STATX_TYPE: u32 = 0x0001;
pub const STATX_MODE: u32 = 0x0002;
pub const STATX_NLINK: u32 = 0x0004;
pub const STATX_UID: u32 = 0x0008;
pub const STATX_GID: u32 = 0x0010;
pub const STATX_ATIME: u32 = 0x0020;
pub const STATX_MTIME: u32 = 0x0040;
pub const STATX_CTIME: u32 = 0x0080;
pub const STATX_INO: u32 = 0x0100;
pub const STATX_SIZE: u32 = 0x0200;
pub const STATX_BLOCKS: u32 = 0x0400;
/// Everything `struct stat` carries.
pub const STATX_BASIC_STATS: u32 = 0x07ff;
pub const STATX_BTIME: u32 = 0x0800;
pub const STATX_MNT_ID: u32 = 0x1000;
pub const STATX_ALL: u32 = 0x0fff;

/// statx sync flags (passed in `flags` with the AT_* flags)
pub const AT_STATX_SYNC_AS_STAT: u32 = 0x0000;
pub const AT_STATX_FORCE_SYNC: u32 = 0x2000;
pub const AT_STATX_DONT_SYNC: u32 = 0x4000;

/// stat structure (Linux x86_64 layout)
#[cfg(target_arch = "x86_64")]
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Stat {
    pub st_dev: u64,
    pub st_ino: u64,
    pub st_nlink: u64,
    pub st_mode: u32,
    pub st_uid: u32,
    pub st_gid: u32,
    _pad0: u32,
    pub st_rdev: u64,
    pub st_size: i64,
    pub st_blksize: i64,
    pub st_blocks: i64,
    pub st_atime: i64,
    pub st_atime_nsec: i64,
    pub st_mtime: i64,
    pub st_mtime_nsec: i64,
    pub st_ctime: i64,
    pub st_ctime_nsec: i64,
    _reserved: [i64; 3],
}

/// stat structure (Linux aarch64 / asm-generic layout)
#[cfg(target_arch = "aarch64")]
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Stat {
    pub st_dev: u64,
    pub st_ino: u64,
    pub st_mode: u32,
    pub st_nlink: u32,
    pub st_uid: u32,
    pub st_gid: u32,
    pub st_rdev: u64,
    _pad1: u64,
    pub st_size: i64,
    pub st_blksize: i32,
    _pad2: i32,
    pub st_blocks: i64,
    pub st_atime: i64,
    pub st_atime_nsec: i64,
    pub st_mtime: i64,
    pub st_mtime_nsec: i64,
    pub st_ctime: i64,
    pub st_ctime_nsec: i64,
    _reserved: [u32; 2],
}

impl Stat {
    pub fn nlink(&self) -> u64 {
        self.st_nlink as u64
    }

    pub fn blksize(&self) -> i64 {
        self.st_blksize as i64
    }

    /// Check if this is a regular file
    pub fn is_file(&self) -> bool {
        (self.st_mode & S_IFMT) == S_IFREG
    }

    /// Check if this is a directory
    pub fn is_dir(&self) -> bool {
        (self.st_mode & S_IFMT) == S_IFDIR
    }

    /// Check if this is a symbolic link
    pub fn is_symlink(&self) -> bool {
        (self.st_mode & S_IFMT) == S_IFLNK
    }

    /// Check if this is a pipe
    pub fn is_fifo(&self) -> bool {
        (self.st_mode & S_IFMT) == S_IFIFO
    }
}

/// Timestamp inside [`Statx`]
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatxTimestamp {
    pub tv_sec: i64,
    pub tv_nsec: u32,
    _reserved: i32,
}

/// Linux statx structure (256 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Statx {
    /// Which fields the kernel filled in (STATX_*)
    pub stx_mask: u32,
    pub stx_blksize: u32,
    pub stx_attributes: u64,
    pub stx_nlink: u32,
    pub stx_uid: u32,
    pub stx_gid: u32,
    pub stx_mode: u16,
    _spare0: u16,
    pub stx_ino: u64,
    pub stx_size: u64,
    pub stx_blocks: u64,
    pub stx_attributes_mask: u64,
    pub stx_atime: StatxTimestamp,
    pub stx_btime: StatxTimestamp,
    pub stx_ctime: StatxTimestamp,
    pub stx_mtime: StatxTimestamp,
    pub stx_rdev_major: u32,
    pub stx_rdev_minor: u32,
    pub stx_dev_major: u32,
    pub stx_dev_minor: u32,
    pub stx_mnt_id: u64,
    pub stx_dio_mem_align: u32,
    pub stx_dio_offset_align: u32,
    _spare3: [u64; 12],
}

impl Statx {
    /// The containing device encoded like `st_dev` (glibc `makedev`).
    pub fn dev(&self) -> u64 {
        makedev(self.stx_dev_major, self.stx_dev_minor)
    }

    /// The represented device encoded like `st_rdev`.
    pub fn rdev(&self) -> u64 {
        makedev(self.stx_rdev_major, self.stx_rdev_minor)
    }

    /// Whether the kernel filled in every field in `mask`.
    pub fn has(&self, mask: u32) -> bool {
        self.stx_mask & mask == mask
    }

    pub fn is_file(&self) -> bool {
        (self.stx_mode as u32 & S_IFMT) == S_IFREG
    }

    pub fn is_dir(&self) -> bool {
        (self.stx_mode as u32 & S_IFMT) == S_IFDIR
    }
}

/// Combine a major/minor pair into the kernel's 64-bit `dev_t` encoding.
pub const fn makedev(major: u32, minor: u32) -> u64 {
    let major = major as u64;
    let minor = minor as u64;
    ((major & 0xffff_f000) << 32)
        | ((major & 0x0000_0fff) << 8)
        | ((minor & 0xffff_ff00) << 12)
        | (minor & 0x0000_00ff)
}

/// Get file status (fstat).
#[inline]
pub fn fstat(fd: Fd) -> Result<Stat, Error> {
    let mut stat = Stat::default();
    let ret = unsafe { raw::syscall2(nr::FSTAT, fd.arg(), &mut stat as *mut Stat as u64) as i64 };
    Error::from_syscall(ret)?;
    Ok(stat)
}

/// Get file status relative to a directory descriptor (newfstatat).
///
/// # Arguments
/// * `dirfd` - Directory for relative paths, or `Fd::CWD`
/// * `path` - Path to stat; empty with `AT_EMPTY_PATH` to stat `dirfd` itself
/// * `flags` - `AT_SYMLINK_NOFOLLOW`, `AT_EMPTY_PATH`
#[inline]
pub fn fstatat(dirfd: Fd, path: &CStr, flags: u32) -> Result<Stat, Error> {
    let mut stat = Stat::default();
    let ret = unsafe {
        raw::syscall4(
            nr::NEWFSTATAT,
            dirfd.arg(),
            path.as_ptr() as u64,
            &mut stat as *mut Stat as u64,
            flags as u64,
        ) as i64
    };
    Error::from_syscall(ret)?;
    Ok(stat)
}

/// Get extended file status.
///
/// # Arguments
/// * `dirfd` - Directory for relative paths, or `Fd::CWD`
/// * `path` - Path to stat; empty with `AT_EMPTY_PATH` to stat `dirfd` itself
/// * `flags` - AT_* and AT_STATX_* flags
/// * `mask` - STATX_* fields wanted; check [`Statx::has`] for what arrived
///
/// # Errors
/// `ENOSYS` on kernels before 4.11.
#[inline]
pub fn statx(dirfd: Fd, path: &CStr, flags: u32, mask: u32) -> Result<Statx, Error> {
    let mut stx = Statx::default();
    let ret = unsafe {
        raw::syscall5(
            nr::STATX,
            dirfd.arg(),
            path.as_ptr() as u64,
            flags as u64,
            mask as u64,
            &mut stx as *mut Statx as u64,
        ) as i64
    };
    Error::from_syscall(ret)?;
    Ok(stx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::size_of;

    #[test]
    fn kernel_structure_sizes() {
        assert_eq!(size_of::<Statx>(), 256);
        assert_eq!(size_of::<StatxTimestamp>(), 16);
        #[cfg(target_arch = "x86_64")]
        assert_eq!(size_of::<Stat>(), 144);
        #[cfg(target_arch = "aarch64")]
        assert_eq!(size_of::<Stat>(), 128);
    }

    #[test]
    fn makedev_matches_glibc_encoding() {
        assert_eq!(makedev(8, 1), 0x801);
        assert_eq!(makedev(259, 3), 0x10303);
        assert_eq!(makedev(0x1000, 0x100), (0x1000u64 << 32) | (0x100 << 12));
    }

    #[test]
    fn statx_has_checks_every_bit() {
        let stx = Statx {
            stx_mask: STATX_BASIC_STATS,
            ..Statx::default()
        };
        assert!(stx.has(STATX_INO | STATX_SIZE));
        assert!(!stx.has(STATX_BTIME));
    }
}
