//! Borrowed views of the labels inside a [`Name`](super::Name).

use std::fmt;

/// A single label of a domain name, borrowed from the name's wire bytes.
///
/// The root label is the empty label at the end of every name.
#[derive(Clone, Copy)]
pub struct Label<'a> {
    bytes: &'a [u8],
}

impl<'a> Label<'a> {
    /// Wraps raw label bytes (without the length prefix).
    #[inline]
    pub const fn from_bytes(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Returns the raw bytes of the label.
    #[inline]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Returns the length of the label in bytes.
    #[inline]
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if this is the root label.
    #[inline]
    pub const fn is_root(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns true if the label has no bytes (same as [`Label::is_root`]).
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// ASCII case-insensitive comparison.
    #[inline]
    pub fn eq_ignore_ascii_case(&self, other: &Label<'_>) -> bool {
        self.bytes.eq_ignore_ascii_case(other.bytes)
    }
}

impl fmt::Display for Label<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &byte in self.bytes {
            if byte == b'.' || byte == b'\\' {
                write!(f, "\\{}", byte as char)?;
            } else if byte.is_ascii_graphic() {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "\\{byte:03}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Label<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Label(\"{self}\")")
    }
}

/// Iterator over the labels of an uncompressed wire-format name.
///
/// Yields the root label last.
#[derive(Debug, Clone)]
pub struct LabelIter<'a> {
    wire: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> LabelIter<'a> {
    pub(super) const fn new(wire: &'a [u8]) -> Self {
        Self {
            wire,
            pos: 0,
            done: false,
        }
    }
}

impl<'a> Iterator for LabelIter<'a> {
    type Item = Label<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let len = self.wire.get(self.pos).copied().unwrap_or(0) as usize;
        if len == 0 {
            self.done = true;
            return Some(Label::from_bytes(&[]));
        }

        let start = self.pos + 1;
        let end = (start + len).min(self.wire.len());
        self.pos = end;
        Some(Label::from_bytes(&self.wire[start..end]))
    }
}
