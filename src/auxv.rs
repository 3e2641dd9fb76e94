//! ELF auxiliary vector
//!
//! The kernel places the auxiliary vector on the initial stack at exec(). It
//! carries the credentials the process started with (`AT_UID`, `AT_GID`,
//! ...), the page size, hardware capabilities and similar facts.
//!
//! Without control of the process entry point the vector is recovered from
//! `/proc/self/auxv`, which holds the same native-endian `(type, value)`
//! word pairs terminated by `AT_NULL`. The table is read once and cached.

use conquer_once::spin::OnceCell;
use core::mem::size_of;

use crate::errno::Errno;
use crate::error::Error;
use crate::fs::{self, O_CLOEXEC, O_RDONLY};
use crate::types::OwnedFd;

/// Auxiliary vector entry (two native words).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AuxEntry {
    pub a_type: u64,
    pub a_val: u64,
}

// =============================================================================
// Auxiliary vector type constants (ELF / Linux ABI)
// =============================================================================

/// End of auxiliary vector.
pub const AT_NULL: u64 = 0;
pub const AT_IGNORE: u64 = 1;
pub const AT_EXECFD: u64 = 2;
/// Address of program headers in memory.
pub const AT_PHDR: u64 = 3;
/// Size of each program header entry.
pub const AT_PHENT: u64 = 4;
/// Number of program headers.
pub const AT_PHNUM: u64 = 5;
/// System page size.
pub const AT_PAGESZ: u64 = 6;
/// Base address of the interpreter (0 for static binaries).
pub const AT_BASE: u64 = 7;
pub const AT_FLAGS: u64 = 8;
/// Entry point of the program (not the interpreter).
pub const AT_ENTRY: u64 = 9;
pub const AT_NOTELF: u64 = 10;
/// Real UID of the process.
pub const AT_UID: u64 = 11;
/// Effective UID.
pub const AT_EUID: u64 = 12;
/// Real GID of the process.
pub const AT_GID: u64 = 13;
/// Effective GID.
pub const AT_EGID: u64 = 14;
pub const AT_PLATFORM: u64 = 15;
/// Hardware capability bits.
pub const AT_HWCAP: u64 = 16;
/// Frequency of times().
pub const AT_CLKTCK: u64 = 17;
/// Secure mode boolean (0 = normal).
pub const AT_SECURE: u64 = 23;
pub const AT_BASE_PLATFORM: u64 = 24;
/// Address of 16 random bytes.
pub const AT_RANDOM: u64 = 25;
pub const AT_HWCAP2: u64 = 26;
/// Filename of the executed program.
pub const AT_EXECFN: u64 = 31;
/// Address of the vDSO.
pub const AT_SYSINFO_EHDR: u64 = 33;
pub const AT_MINSIGSTKSZ: u64 = 51;

/// Maximum number of entries kept; Linux emits about thirty.
pub const AUXV_CAPACITY: usize = 64;

const WORD: usize = size_of::<usize>();

/// A decoded auxiliary vector.
#[derive(Clone, Copy, Debug)]
pub struct AuxTable {
    entries: [AuxEntry; AUXV_CAPACITY],
    len: usize,
}

impl AuxTable {
    pub const fn new() -> Self {
        Self {
            entries: [AuxEntry { a_type: AT_NULL, a_val: 0 }; AUXV_CAPACITY],
            len: 0,
        }
    }

    /// Decode native-endian `(type, value)` word pairs, stopping at `AT_NULL`
    /// or at the end of `bytes`. Entries beyond [`AUXV_CAPACITY`] are dropped.
    pub fn parse(bytes: &[u8]) -> Self {
        let mut table = Self::new();
        for pair in bytes.chunks_exact(2 * WORD) {
            let a_type = read_word(&pair[..WORD]);
            if a_type == AT_NULL {
                break;
            }
            if table.len == AUXV_CAPACITY {
                log::warn!("auxv: more than {} entries, ignoring the rest", AUXV_CAPACITY);
                break;
            }
            table.entries[table.len] = AuxEntry {
                a_type,
                a_val: read_word(&pair[WORD..]),
            };
            table.len += 1;
        }
        table
    }

    /// Read and decode `/proc/self/auxv`.
    pub fn load() -> Result<Self, Error> {
        let file = OwnedFd::new(fs::open(c"/proc/self/auxv", O_RDONLY | O_CLOEXEC, 0)?);

        let mut buf = [0u8; (AUXV_CAPACITY + 1) * 2 * WORD];
        let mut filled = 0;
        while filled < buf.len() {
            let n = fs::read(file.fd(), &mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        let table = Self::parse(&buf[..filled]);
        log::debug!("auxv: loaded {} entries", table.len);
        Ok(table)
    }

    /// Value for `a_type`, if present.
    pub fn get(&self, a_type: u64) -> Option<u64> {
        self.iter().find(|e| e.a_type == a_type).map(|e| e.a_val)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AuxEntry> {
        self.entries[..self.len].iter()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for AuxTable {
    fn default() -> Self {
        Self::new()
    }
}

fn read_word(bytes: &[u8]) -> u64 {
    let mut word = [0u8; WORD];
    word.copy_from_slice(bytes);
    usize::from_ne_bytes(word) as u64
}

static AUXV: OnceCell<AuxTable> = OnceCell::uninit();

/// The process auxiliary vector, loaded on first use.
pub fn table() -> Result<&'static AuxTable, Error> {
    if let Some(table) = AUXV.get() {
        return Ok(table);
    }
    let loaded = AuxTable::load()?;
    Ok(AUXV.get_or_init(move || loaded))
}

/// Look up an auxiliary vector entry.
///
/// # Errors
/// `ENOENT` when the kernel did not supply `a_type`, or any error from
/// reading `/proc/self/auxv` on first use.
pub fn getauxval(a_type: u64) -> Result<u64, Error> {
    table()?.get(a_type).ok_or(Error::Os(Errno::ENOENT))
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::vec::Vec;

    fn encode(entries: &[(u64, u64)]) -> Vec<u8> {
        let mut bytes = Vec::new();
        for &(a_type, a_val) in entries {
            bytes.extend_from_slice(&(a_type as usize).to_ne_bytes());
            bytes.extend_from_slice(&(a_val as usize).to_ne_bytes());
        }
        bytes
    }

    #[test]
    fn parse_stops_at_at_null() {
        let bytes = encode(&[(AT_PAGESZ, 4096), (AT_UID, 1000), (AT_NULL, 0), (AT_GID, 7)]);
        let table = AuxTable::parse(&bytes);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(AT_PAGESZ), Some(4096));
        assert_eq!(table.get(AT_UID), Some(1000));
        assert_eq!(table.get(AT_GID), None);
    }

    #[test]
    fn parse_ignores_trailing_partial_entry() {
        let mut bytes = encode(&[(AT_EGID, 5)]);
        bytes.extend_from_slice(&[1, 2, 3]);
        let table = AuxTable::parse(&bytes);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(AT_EGID), Some(5));
    }

    #[test]
    fn parse_caps_at_capacity() {
        let entries: Vec<(u64, u64)> = (0..AUXV_CAPACITY as u64 + 10).map(|i| (100 + i, i)).collect();
        let table = AuxTable::parse(&encode(&entries));
        assert_eq!(table.len(), AUXV_CAPACITY);
        assert_eq!(table.get(100), Some(0));
        assert_eq!(table.get(100 + AUXV_CAPACITY as u64), None);
    }

    #[test]
    fn empty_input_gives_empty_table() {
        assert!(AuxTable::parse(&[]).is_empty());
    }
}
