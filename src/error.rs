//! Unified error type for sysbind operations.
//!
//! All fallible public functions in sysbind return `Result<T, Error>` for
//! consistent error handling. Use the `?` operator freely across modules.

use crate::errno::Errno;

const MAX_ERRNO: i64 = 4095;

/// Unified error type for sysbind operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A POSIX errno from a failed syscall.
    Os(Errno),
    /// A failed syscall whose errno is not in the [`Errno`] table.
    UnknownOs(i32),
    /// An argument rejected before reaching the kernel.
    InvalidInput(&'static str),
}

impl Error {
    /// Convert a raw syscall return value to `Result`.
    ///
    /// Values in `-4095..=-1` are a negated errno. Anything else is the
    /// syscall's result.
    #[inline]
    pub fn from_syscall(ret: i64) -> Result<u64, Error> {
        if (-MAX_ERRNO..0).contains(&ret) {
            let code = ret.unsigned_abs() as i32;
            log::trace!("syscall failed with errno {}", code);
            match Errno::from_raw(code) {
                Some(errno) => Err(Error::Os(errno)),
                None => Err(Error::UnknownOs(code)),
            }
        } else {
            Ok(ret as u64)
        }
    }

    /// The native errno value, if this error came from the kernel.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Error::Os(errno) => Some(errno.raw()),
            Error::UnknownOs(code) => Some(*code),
            Error::InvalidInput(_) => None,
        }
    }

    /// The errno, if it is one of the known values.
    pub fn errno(&self) -> Option<Errno> {
        match self {
            Error::Os(errno) => Some(*errno),
            _ => None,
        }
    }

    /// True when the kernel or filesystem does not implement the operation.
    ///
    /// Callers treat this as "skip" rather than failure on older kernels.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::Os(Errno::ENOSYS) | Error::Os(Errno::EOPNOTSUPP))
    }
}

impl From<Errno> for Error {
    fn from(e: Errno) -> Self {
        Error::Os(e)
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Os(e) => write!(f, "{:?} (os error {})", e, e.raw()),
            Error::UnknownOs(code) => write!(f, "os error {}", code),
            Error::InvalidInput(what) => write!(f, "invalid input: {}", what),
        }
    }
}

impl core::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_returns_become_errors() {
        assert_eq!(Error::from_syscall(-9), Err(Error::Os(Errno::EBADF)));
        assert_eq!(Error::from_syscall(-1000), Err(Error::UnknownOs(1000)));
        assert_eq!(Error::from_syscall(3), Ok(3));
    }

    #[test]
    fn unknown_codes_are_kept_verbatim() {
        assert_eq!(Error::from_syscall(-133), Err(Error::UnknownOs(133)));
        assert_eq!(Error::from_syscall(-4095), Err(Error::UnknownOs(4095)));
    }

    #[test]
    fn only_the_errno_window_is_an_error() {
        assert_eq!(Error::from_syscall(-1), Err(Error::Os(Errno::EPERM)));
        assert_eq!(Error::from_syscall(-4096), Ok(-4096i64 as u64));
        assert_eq!(Error::from_syscall(i64::MIN), Ok(i64::MIN as u64));
    }

    #[test]
    fn raw_os_error_is_verbatim() {
        assert_eq!(Error::Os(Errno::ESPIPE).raw_os_error(), Some(29));
        assert_eq!(Error::UnknownOs(1000).raw_os_error(), Some(1000));
        assert_eq!(Error::InvalidInput("x").raw_os_error(), None);
    }

    #[test]
    fn unsupported_covers_enosys_and_eopnotsupp() {
        assert!(Error::Os(Errno::ENOSYS).is_unsupported());
        assert!(Error::Os(Errno::ENOTSUP).is_unsupported());
        assert!(!Error::Os(Errno::EINVAL).is_unsupported());
    }
}
