//! CPU affinity sets
//!
//! [`CpuSet`] is a fixed-capacity bitset over CPU indices `0..CPU_SETSIZE`,
//! laid out bit-for-bit like the kernel's `cpu_set_t`: an array of native
//! words where bit `n % bits` of word `n / bits` is CPU `n`. It can be handed
//! to `sched_setaffinity`/`sched_getaffinity` without translation.
//!
//! Indices at or beyond `CPU_SETSIZE` are silently ignored by the mutating
//! operations and read back as unset, matching the C macros. None of the
//! bit operations can fail.
//!
//! The `CPU_*` free functions mirror the C macro API for code ported from C;
//! the methods and operator impls are the same operations.
//!
//! Two text forms are supported, both as produced by the kernel in
//! `/proc/<pid>/status`:
//! - cpulist (`Display`/`FromStr`): `0-3,8,10-11`
//! - hexadecimal mask (`LowerHex`/[`CpuSet::from_hex_mask`]): `d0f`

#![allow(non_snake_case)]

use core::ffi::c_ulong;
use core::fmt;
use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign};
use core::str::FromStr;

/// Maximum number of CPUs a [`CpuSet`] can hold (glibc and kernel `CPU_SETSIZE`).
pub const CPU_SETSIZE: usize = 1024;

const WORD_BITS: usize = c_ulong::BITS as usize;

/// Number of native words backing a [`CpuSet`].
pub const CPU_SET_WORDS: usize = CPU_SETSIZE / WORD_BITS;

/// A set of CPU indices, ABI-compatible with `cpu_set_t`.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CpuSet {
    bits: [c_ulong; CPU_SET_WORDS],
}

/// Word index and bit mask for `cpu`, or `None` when it is out of range.
#[inline]
const fn locate(cpu: usize) -> Option<(usize, c_ulong)> {
    if cpu < CPU_SETSIZE {
        Some((cpu / WORD_BITS, 1 << (cpu % WORD_BITS)))
    } else {
        None
    }
}

impl CpuSet {
    /// Create an empty set.
    pub const fn new() -> Self {
        Self {
            bits: [0; CPU_SET_WORDS],
        }
    }

    /// Adopt an arbitrary bit pattern, e.g. one received from the kernel.
    pub const fn from_words(bits: [c_ulong; CPU_SET_WORDS]) -> Self {
        Self { bits }
    }

    /// The backing words, CPU 0 in the least-significant bit of word 0.
    pub const fn as_words(&self) -> &[c_ulong; CPU_SET_WORDS] {
        &self.bits
    }

    /// The set as raw bytes, exactly as the kernel reads it.
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: CpuSet is a repr(C) array of integers with no padding.
        unsafe {
            core::slice::from_raw_parts(
                self as *const CpuSet as *const u8,
                core::mem::size_of::<CpuSet>(),
            )
        }
    }

    /// Remove every CPU (`CPU_ZERO`).
    #[inline]
    pub fn zero(&mut self) {
        self.bits = [0; CPU_SET_WORDS];
    }

    /// Add every representable CPU.
    #[inline]
    pub fn fill(&mut self) {
        self.bits = [c_ulong::MAX; CPU_SET_WORDS];
    }

    /// Add `cpu` to the set (`CPU_SET`). Out-of-range indices are ignored.
    #[inline]
    pub fn set(&mut self, cpu: usize) {
        if let Some((word, mask)) = locate(cpu) {
            self.bits[word] |= mask;
        }
    }

    /// Remove `cpu` from the set (`CPU_CLR`). Out-of-range indices are ignored.
    #[inline]
    pub fn clear(&mut self, cpu: usize) {
        if let Some((word, mask)) = locate(cpu) {
            self.bits[word] &= !mask;
        }
    }

    /// Whether `cpu` is in the set (`CPU_ISSET`). False for out-of-range indices.
    #[inline]
    pub fn is_set(&self, cpu: usize) -> bool {
        match locate(cpu) {
            Some((word, mask)) => self.bits[word] & mask != 0,
            None => false,
        }
    }

    /// Number of CPUs in the set (`CPU_COUNT`).
    pub fn count(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&w| w == 0)
    }

    /// Lowest CPU in the set.
    pub fn first(&self) -> Option<usize> {
        self.iter().next()
    }

    /// Iterate over the CPUs in the set in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            set: self,
            word: 0,
            pending: self.bits[0],
        }
    }

    /// `self = a & b` (`CPU_AND`). The previous contents of `self` are discarded.
    pub fn and(&mut self, a: &CpuSet, b: &CpuSet) {
        for (dst, (x, y)) in self.bits.iter_mut().zip(a.bits.iter().zip(b.bits.iter())) {
            *dst = x & y;
        }
    }

    /// `self = a | b` (`CPU_OR`). The previous contents of `self` are discarded.
    pub fn or(&mut self, a: &CpuSet, b: &CpuSet) {
        for (dst, (x, y)) in self.bits.iter_mut().zip(a.bits.iter().zip(b.bits.iter())) {
            *dst = x | y;
        }
    }

    /// `self = a ^ b` (`CPU_XOR`). The previous contents of `self` are discarded.
    pub fn xor(&mut self, a: &CpuSet, b: &CpuSet) {
        for (dst, (x, y)) in self.bits.iter_mut().zip(a.bits.iter().zip(b.bits.iter())) {
            *dst = x ^ y;
        }
    }

    /// Word-wise equality (`CPU_EQUAL`).
    #[inline]
    pub fn equal(&self, other: &CpuSet) -> bool {
        self.bits == other.bits
    }

    /// Parse a hexadecimal mask such as `f`, `0x30` or the kernel's
    /// comma-grouped `ff,00000001`. Bit 0 of the last digit is CPU 0.
    pub fn from_hex_mask(s: &str) -> Result<CpuSet, ParseCpuListError> {
        let s = s.trim();
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);

        let mut set = CpuSet::new();
        let mut nibble_index = 0usize;
        let mut seen_digit = false;
        for c in digits.chars().rev() {
            if c == ',' {
                continue;
            }
            let nibble = c.to_digit(16).ok_or(ParseCpuListError::InvalidNumber)? as usize;
            seen_digit = true;
            for bit in 0..4 {
                if nibble & (1 << bit) != 0 {
                    let cpu = nibble_index * 4 + bit;
                    if cpu >= CPU_SETSIZE {
                        return Err(ParseCpuListError::OutOfRange(cpu));
                    }
                    set.set(cpu);
                }
            }
            nibble_index += 1;
        }

        if !seen_digit {
            return Err(ParseCpuListError::InvalidNumber);
        }
        Ok(set)
    }
}

impl Default for CpuSet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CpuSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Ascending iterator over the CPUs of a [`CpuSet`].
pub struct Iter<'a> {
    set: &'a CpuSet,
    word: usize,
    pending: c_ulong,
}

impl Iterator for Iter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.pending == 0 {
            self.word += 1;
            if self.word >= CPU_SET_WORDS {
                return None;
            }
            self.pending = self.set.bits[self.word];
        }
        let bit = self.pending.trailing_zeros() as usize;
        // clear lowest set bit
        self.pending &= self.pending - 1;
        Some(self.word * WORD_BITS + bit)
    }
}

impl<'a> IntoIterator for &'a CpuSet {
    type Item = usize;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl FromIterator<usize> for CpuSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = CpuSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<usize> for CpuSet {
    fn extend<I: IntoIterator<Item = usize>>(&mut self, iter: I) {
        for cpu in iter {
            self.set(cpu);
        }
    }
}

impl BitAnd for CpuSet {
    type Output = CpuSet;

    fn bitand(self, rhs: CpuSet) -> CpuSet {
        let mut out = CpuSet::new();
        out.and(&self, &rhs);
        out
    }
}

impl BitOr for CpuSet {
    type Output = CpuSet;

    fn bitor(self, rhs: CpuSet) -> CpuSet {
        let mut out = CpuSet::new();
        out.or(&self, &rhs);
        out
    }
}

impl BitXor for CpuSet {
    type Output = CpuSet;

    fn bitxor(self, rhs: CpuSet) -> CpuSet {
        let mut out = CpuSet::new();
        out.xor(&self, &rhs);
        out
    }
}

impl BitAndAssign for CpuSet {
    fn bitand_assign(&mut self, rhs: CpuSet) {
        let lhs = *self;
        self.and(&lhs, &rhs);
    }
}

impl BitOrAssign for CpuSet {
    fn bitor_assign(&mut self, rhs: CpuSet) {
        let lhs = *self;
        self.or(&lhs, &rhs);
    }
}

impl BitXorAssign for CpuSet {
    fn bitxor_assign(&mut self, rhs: CpuSet) {
        let lhs = *self;
        self.xor(&lhs, &rhs);
    }
}

/// Writes the kernel cpulist form, e.g. `0-3,8,10-11`. The empty set is `""`.
impl fmt::Display for CpuSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut cpus = self.iter().peekable();
        let mut first = true;
        while let Some(start) = cpus.next() {
            let mut end = start;
            while cpus.peek() == Some(&(end + 1)) {
                end += 1;
                cpus.next();
            }
            if !first {
                f.write_str(",")?;
            }
            first = false;
            if start == end {
                write!(f, "{}", start)?;
            } else {
                write!(f, "{}-{}", start, end)?;
            }
        }
        Ok(())
    }
}

/// Writes the mask in hexadecimal without leading zeros (`0` when empty).
/// `{:#x}` adds a `0x` prefix.
impl fmt::LowerHex for CpuSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.write_str("0x")?;
        }
        let top = match self.bits.iter().rposition(|&w| w != 0) {
            Some(top) => top,
            None => return f.write_str("0"),
        };
        write!(f, "{:x}", self.bits[top])?;
        for word in self.bits[..top].iter().rev() {
            write!(f, "{:0width$x}", word, width = WORD_BITS / 4)?;
        }
        Ok(())
    }
}

/// Parses the cpulist form: comma-separated CPUs and inclusive ranges,
/// optionally strided (`0-10:2`). Whitespace around elements is ignored and
/// the empty string is the empty set.
impl FromStr for CpuSet {
    type Err = ParseCpuListError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut set = CpuSet::new();
        let s = s.trim();
        if s.is_empty() {
            return Ok(set);
        }

        for element in s.split(',') {
            let element = element.trim();
            if element.is_empty() {
                return Err(ParseCpuListError::EmptyElement);
            }

            let (range, stride) = match element.split_once(':') {
                Some((range, stride)) => (range, parse_cpu_number(stride)?),
                None => (element, 1),
            };
            if stride == 0 {
                return Err(ParseCpuListError::ZeroStride);
            }

            let (start, end) = match range.split_once('-') {
                Some((start, end)) => (parse_cpu_number(start)?, parse_cpu_number(end)?),
                None => {
                    let cpu = parse_cpu_number(range)?;
                    (cpu, cpu)
                }
            };
            if start > end {
                return Err(ParseCpuListError::ReversedRange { start, end });
            }
            if end >= CPU_SETSIZE {
                return Err(ParseCpuListError::OutOfRange(end));
            }

            for cpu in (start..=end).step_by(stride) {
                set.set(cpu);
            }
        }
        Ok(set)
    }
}

fn parse_cpu_number(s: &str) -> Result<usize, ParseCpuListError> {
    s.trim()
        .parse::<usize>()
        .map_err(|_| ParseCpuListError::InvalidNumber)
}

/// Error from parsing a cpulist or hexadecimal mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseCpuListError {
    /// Two commas with nothing between them, or a trailing comma.
    EmptyElement,
    /// Not a decimal CPU number (cpulist) or hex digit (mask).
    InvalidNumber,
    /// `start-end` with `start > end`.
    ReversedRange { start: usize, end: usize },
    /// A CPU index at or beyond `CPU_SETSIZE`.
    OutOfRange(usize),
    /// A `:0` stride.
    ZeroStride,
}

impl fmt::Display for ParseCpuListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCpuListError::EmptyElement => f.write_str("empty element in cpu list"),
            ParseCpuListError::InvalidNumber => f.write_str("invalid cpu number"),
            ParseCpuListError::ReversedRange { start, end } => {
                write!(f, "cpu range {}-{} is reversed", start, end)
            }
            ParseCpuListError::OutOfRange(cpu) => {
                write!(f, "cpu {} is out of range (max {})", cpu, CPU_SETSIZE - 1)
            }
            ParseCpuListError::ZeroStride => f.write_str("cpu range stride must be non-zero"),
        }
    }
}

impl core::error::Error for ParseCpuListError {}

// =============================================================================
// C macro API
// =============================================================================

#[inline]
pub fn CPU_ZERO(set: &mut CpuSet) {
    set.zero()
}

#[inline]
pub fn CPU_SET(cpu: usize, set: &mut CpuSet) {
    set.set(cpu)
}

#[inline]
pub fn CPU_CLR(cpu: usize, set: &mut CpuSet) {
    set.clear(cpu)
}

#[inline]
pub fn CPU_ISSET(cpu: usize, set: &CpuSet) -> bool {
    set.is_set(cpu)
}

#[inline]
pub fn CPU_COUNT(set: &CpuSet) -> usize {
    set.count()
}

#[inline]
pub fn CPU_AND(dest: &mut CpuSet, a: &CpuSet, b: &CpuSet) {
    dest.and(a, b)
}

#[inline]
pub fn CPU_OR(dest: &mut CpuSet, a: &CpuSet, b: &CpuSet) {
    dest.or(a, b)
}

#[inline]
pub fn CPU_XOR(dest: &mut CpuSet, a: &CpuSet, b: &CpuSet) {
    dest.xor(a, b)
}

#[inline]
pub fn CPU_EQUAL(a: &CpuSet, b: &CpuSet) -> bool {
    a.equal(b)
}
