//! DNS response codes (RFC 1035 Section 4.1.1).

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The 4-bit RCODE carried in the message header.
///
/// Extended RCODEs need EDNS0, which the iterative walker never sends, so
/// only the header values are modelled.
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
#[repr(u8)]
pub enum ResponseCode {
    /// No error condition
    #[default]
    NoError = 0,
    /// The server could not interpret the query
    FormErr = 1,
    /// The server failed while processing the query
    ServFail = 2,
    /// The queried name does not exist
    NXDomain = 3,
    /// The query kind is not supported
    NotImp = 4,
    /// The server refuses for policy reasons
    Refused = 5,
    /// Name exists when it should not (RFC 2136)
    YXDomain = 6,
    /// RRset exists when it should not (RFC 2136)
    YXRRSet = 7,
    /// RRset that should exist does not (RFC 2136)
    NXRRSet = 8,
    /// Server not authoritative for zone (RFC 2136)
    NotAuth = 9,
    /// Name not contained in zone (RFC 2136)
    NotZone = 10,
}

impl ResponseCode {
    /// Decodes the low four bits of the header flags word.
    #[inline]
    pub fn from_header(value: u8) -> Option<Self> {
        Self::try_from(value & 0x0F).ok()
    }

    /// Returns the numeric value.
    #[inline]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Returns true if the name does not exist.
    #[inline]
    pub const fn is_nxdomain(self) -> bool {
        matches!(self, Self::NXDomain)
    }

    /// Returns true if the response can be interpreted by an iterative walk.
    ///
    /// Only NOERROR and NXDOMAIN carry information about the name; every other
    /// code means this server could not help and the next one should be tried.
    #[inline]
    pub const fn is_usable(self) -> bool {
        matches!(self, Self::NoError | Self::NXDomain)
    }

    /// Returns the mnemonic used in dig output.
    pub const fn name(self) -> &'static str {
        match self {
            Self::NoError => "NOERROR",
            Self::FormErr => "FORMERR",
            Self::ServFail => "SERVFAIL",
            Self::NXDomain => "NXDOMAIN",
            Self::NotImp => "NOTIMP",
            Self::Refused => "REFUSED",
            Self::YXDomain => "YXDOMAIN",
            Self::YXRRSet => "YXRRSET",
            Self::NXRRSet => "NXRRSET",
            Self::NotAuth => "NOTAUTH",
            Self::NotZone => "NOTZONE",
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
