//! DNS classes.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classes known by name.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    IntoPrimitive,
    TryFromPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u16)]
pub enum RecordClass {
    /// Internet
    #[default]
    IN = 1,
    /// Chaos
    CH = 3,
    /// Hesiod
    HS = 4,
}

impl RecordClass {
    /// Returns the mnemonic.
    pub const fn name(self) -> &'static str {
        match self {
            Self::IN => "IN",
            Self::CH => "CH",
            Self::HS => "HS",
        }
    }
}

/// A class as found on the wire, known or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Class {
    /// A class listed in [`RecordClass`].
    Known(RecordClass),
    /// Any other class code.
    Unknown(u16),
}

impl Class {
    /// Classifies a numeric class code.
    #[inline]
    pub fn from_u16(value: u16) -> Self {
        RecordClass::try_from(value)
            .map(Self::Known)
            .unwrap_or(Self::Unknown(value))
    }

    /// Returns the numeric class code.
    #[inline]
    pub fn to_u16(self) -> u16 {
        match self {
            Self::Known(c) => c.into(),
            Self::Unknown(v) => v,
        }
    }
}

impl Default for Class {
    fn default() -> Self {
        Self::Known(RecordClass::IN)
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(c) => f.write_str(c.name()),
            Self::Unknown(v) => write!(f, "CLASS{v}"),
        }
    }
}
