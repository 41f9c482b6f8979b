//! Domain names.
//!
//! A [`Name`] keeps its uncompressed wire form and compares, hashes and
//! orders case-insensitively, so `WWW.Example.COM` and `www.example.com.`
//! are the same key in every map and set the resolver keeps.

mod label;
mod parse;

pub use label::{Label, LabelIter};
pub use parse::NameParser;

use crate::error::{Error, Result};
use crate::{MAX_LABEL_LENGTH, MAX_NAME_LENGTH};
use bytes::BytesMut;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A fully-qualified DNS domain name.
///
/// # Wire Format
///
/// `ns1.example.com.` is stored as
///
/// ```text
/// 03 'n' 's' '1' 07 'e' 'x' 'a' 'm' 'p' 'l' 'e' 03 'c' 'o' 'm' 00
/// ```
///
/// The terminating zero is always present, so the root name is the single
/// byte `00`.
///
/// # Example
///
/// ```rust
/// use rootwalk_proto::Name;
/// use std::str::FromStr;
///
/// let name = Name::from_str("Example.COM").unwrap();
/// assert_eq!(name.to_string(), "Example.COM.");
/// assert_eq!(name, Name::from_str("example.com.").unwrap());
/// assert_eq!(name.label_count(), 3); // example, com, root
/// ```
#[derive(Clone)]
pub struct Name {
    wire: SmallVec<[u8; 64]>,
    /// Number of labels including the root label.
    label_count: u8,
}

impl Name {
    /// Returns the root name `.`.
    #[inline]
    pub fn root() -> Self {
        Self {
            wire: SmallVec::from_slice(&[0]),
            label_count: 1,
        }
    }

    /// Assembles a name from wire bytes already validated by the caller.
    pub(crate) fn from_parts(wire: SmallVec<[u8; 64]>, label_count: u8) -> Self {
        Self { wire, label_count }
    }

    /// Returns the uncompressed wire representation, root label included.
    #[inline]
    pub fn as_wire(&self) -> &[u8] {
        &self.wire
    }

    /// Returns the wire length in bytes.
    #[inline]
    pub fn wire_len(&self) -> usize {
        self.wire.len()
    }

    /// Returns the number of labels, counting the root label.
    #[inline]
    pub const fn label_count(&self) -> usize {
        self.label_count as usize
    }

    /// Returns true for the root name.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.label_count == 1
    }

    /// Iterates over the labels from left to right, ending with the root.
    #[inline]
    pub fn labels(&self) -> LabelIter<'_> {
        LabelIter::new(&self.wire)
    }

    /// Returns true if `self` equals `other` or lies beneath it.
    pub fn is_subdomain_of(&self, other: &Name) -> bool {
        let Some(extra) = self.label_count().checked_sub(other.label_count()) else {
            return false;
        };
        self.labels()
            .skip(extra)
            .zip(other.labels())
            .all(|(a, b)| a.eq_ignore_ascii_case(&b))
    }

    /// Appends the wire form to a buffer.
    #[inline]
    pub fn write_wire(&self, buf: &mut BytesMut) {
        buf.extend_from_slice(&self.wire);
    }

    /// Renders the presentation form with a trailing dot.
    pub fn to_dotted(&self) -> CompactString {
        if self.is_root() {
            return CompactString::const_new(".");
        }

        let mut out = CompactString::default();
        for label in self.labels().filter(|l| !l.is_root()) {
            out.push_str(&label.to_string());
            out.push('.');
        }
        out
    }
}

impl FromStr for Name {
    type Err = Error;

    /// Parses a presentation-format name. The trailing dot is optional.
    ///
    /// Letters, digits, `-`, `_` and `*` are accepted in labels; escapes are
    /// not.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed == "." {
            return Ok(Self::root());
        }

        let body = trimmed.strip_suffix('.').unwrap_or(trimmed);
        let mut wire = SmallVec::<[u8; 64]>::new();
        let mut label_count = 1u8;

        for (position, part) in body.split('.').enumerate() {
            if part.is_empty() {
                return Err(Error::EmptyLabel { position });
            }
            if part.len() > MAX_LABEL_LENGTH {
                return Err(Error::LabelTooLong { length: part.len() });
            }
            if let Some((i, c)) = part
                .char_indices()
                .find(|&(_, c)| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '*')))
            {
                return Err(Error::InvalidLabelChar {
                    character: c,
                    position: i,
                });
            }

            wire.push(part.len() as u8);
            wire.extend_from_slice(part.as_bytes());
            label_count = label_count.saturating_add(1);
        }
        wire.push(0);

        if wire.len() > MAX_NAME_LENGTH {
            return Err(Error::NameTooLong { length: wire.len() });
        }

        Ok(Self { wire, label_count })
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dotted())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name(\"{self}\")")
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.label_count == other.label_count && self.wire.eq_ignore_ascii_case(&other.wire)
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in &self.wire {
            state.write_u8(byte.to_ascii_lowercase());
        }
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::root()
    }
}

impl Serialize for Name {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_dotted())
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}
