//! Scratch files shared by the host integration tests
//!
//! Each file is created exclusively under the system temp directory and
//! unlinked when dropped.

#![allow(dead_code)]

use std::ffi::{CStr, CString};
use std::os::unix::ffi::OsStringExt;
use std::sync::atomic::{AtomicUsize, Ordering};

use sysbind::fs::{self, O_CLOEXEC, O_CREAT, O_EXCL, O_RDWR};
use sysbind::{Fd, OwnedFd};

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

pub struct ScratchFile {
    path: CString,
    file: OwnedFd,
}

impl ScratchFile {
    pub fn new(tag: &str) -> Self {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "sysbind-{}-{}-{}",
            tag,
            std::process::id(),
            NEXT_ID.fetch_add(1, Ordering::Relaxed)
        ));
        let path = CString::new(path.into_os_string().into_vec()).expect("temp path has NUL");
        let fd = fs::open(&path, O_RDWR | O_CREAT | O_EXCL | O_CLOEXEC, 0o600)
            .unwrap_or_else(|e| panic!("create {:?}: {}", path, e));
        ScratchFile {
            path,
            file: OwnedFd::new(fd),
        }
    }

    /// A scratch file holding `contents`.
    pub fn with_contents(tag: &str, contents: &[u8]) -> Self {
        let scratch = Self::new(tag);
        let written = fs::write(scratch.fd(), contents).expect("write scratch file");
        assert_eq!(written, contents.len());
        scratch
    }

    pub fn fd(&self) -> Fd {
        self.file.fd()
    }

    pub fn path(&self) -> &CStr {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        let _ = fs::unlinkat(Fd::CWD, &self.path, 0);
    }
}

/// Print a skip notice for a kernel or filesystem that lacks a feature.
pub fn skip(what: &str, err: sysbind::Error) {
    println!("SKIP {}: {}", what, err);
}
