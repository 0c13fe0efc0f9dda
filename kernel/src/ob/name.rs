//! Object Names
//!
//! Names are four bytes packed MSB-first into a 32-bit value, so tooling
//! can decode any class's names the same way. The all-zero name is never
//! valid.

use core::fmt;

/// Object name
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ObjectName(u32);

impl ObjectName {
    /// The empty (invalid) name
    pub const NONE: ObjectName = ObjectName(0);

    /// Wrap a raw 32-bit name
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw 32-bit value
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Check if the name may be used for an object
    #[inline]
    pub const fn is_valid(self) -> bool {
        name_is_valid(self)
    }

    /// The four characters, most significant first
    #[inline]
    pub const fn to_chars(self) -> [u8; 4] {
        name_to_characters(self)
    }
}

impl From<[u8; 4]> for ObjectName {
    fn from(chars: [u8; 4]) -> Self {
        build_name(chars[0], chars[1], chars[2], chars[3])
    }
}

impl From<&[u8; 4]> for ObjectName {
    fn from(chars: &[u8; 4]) -> Self {
        Self::from(*chars)
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.to_chars() {
            let shown = if c.is_ascii_graphic() || c == b' ' { c as char } else { '.' };
            write!(f, "{}", shown)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectName(\"{}\" {:#010x})", self, self.0)
    }
}

/// Build a name from four characters
#[inline]
pub const fn build_name(c1: u8, c2: u8, c3: u8, c4: u8) -> ObjectName {
    ObjectName((c1 as u32) << 24 | (c2 as u32) << 16 | (c3 as u32) << 8 | (c4 as u32))
}

/// Break a name into its four characters
#[inline]
pub const fn name_to_characters(name: ObjectName) -> [u8; 4] {
    name.0.to_be_bytes()
}

/// Check if a name is valid (non-zero)
#[inline]
pub const fn name_is_valid(name: ObjectName) -> bool {
    name.0 != 0
}
