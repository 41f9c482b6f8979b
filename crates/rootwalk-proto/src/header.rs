//! The fixed 12-byte message header.

use crate::error::{Error, Result};
use crate::rcode::ResponseCode;
use crate::wire::WireReader;
use bitflags::bitflags;
use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Size of the DNS header in bytes.
pub const HEADER_SIZE: usize = 12;

/// Standard query opcode.
pub const OPCODE_QUERY: u8 = 0;

bitflags! {
    /// Single-bit header flags.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct HeaderFlags: u16 {
        /// Message is a response
        const QR = 0x8000;
        /// Answer is authoritative
        const AA = 0x0400;
        /// Message was truncated
        const TC = 0x0200;
        /// Recursion desired
        const RD = 0x0100;
        /// Recursion available
        const RA = 0x0080;
        /// Authentic data (DNSSEC)
        const AD = 0x0020;
        /// Checking disabled (DNSSEC)
        const CD = 0x0010;
    }
}

/// DNS message header.
///
/// ```text
///                                 1  1  1  1  1  1
///   0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                      ID                       |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |QR|   Opcode  |AA|TC|RD|RA| Z|AD|CD|   RCODE   |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |            QDCOUNT / ANCOUNT / ...            |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
///
/// Section counts are not stored here; [`Message`](crate::Message) derives
/// them from its sections when encoding and reads them when decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Message identifier used to pair responses with queries.
    pub id: u16,
    /// Flag bits.
    pub flags: HeaderFlags,
    /// Raw 4-bit opcode.
    pub opcode: u8,
    /// Response code.
    pub rcode: ResponseCode,
}

/// Section counts read from a received header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionCounts {
    /// Number of questions.
    pub questions: u16,
    /// Number of answer records.
    pub answers: u16,
    /// Number of authority records.
    pub authority: u16,
    /// Number of additional records.
    pub additional: u16,
}

impl Header {
    /// Creates an empty header with the given ID.
    #[inline]
    pub const fn new(id: u16) -> Self {
        Self {
            id,
            flags: HeaderFlags::empty(),
            opcode: OPCODE_QUERY,
            rcode: ResponseCode::NoError,
        }
    }

    /// Creates a query header with a random ID and RD cleared.
    pub fn iterative_query() -> Self {
        Self::new(rand::random())
    }

    /// Creates a response header echoing the ID and RD bit of a query.
    pub fn response_to(query: &Header) -> Self {
        Self {
            id: query.id,
            flags: HeaderFlags::QR | (query.flags & HeaderFlags::RD),
            opcode: query.opcode,
            rcode: ResponseCode::NoError,
        }
    }

    /// Returns true for a response.
    #[inline]
    pub fn is_response(&self) -> bool {
        self.flags.contains(HeaderFlags::QR)
    }

    /// Returns true if the answer is authoritative.
    #[inline]
    pub fn is_authoritative(&self) -> bool {
        self.flags.contains(HeaderFlags::AA)
    }

    /// Returns true if the message was truncated.
    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.flags.contains(HeaderFlags::TC)
    }

    /// Returns true if recursion was requested.
    #[inline]
    pub fn recursion_desired(&self) -> bool {
        self.flags.contains(HeaderFlags::RD)
    }

    /// Sets or clears a flag.
    #[inline]
    pub fn set_flag(&mut self, flag: HeaderFlags, on: bool) {
        self.flags.set(flag, on);
    }

    /// Decodes a header and the section counts that follow it.
    pub fn parse(data: &[u8]) -> Result<(Self, SectionCounts)> {
        if data.len() < HEADER_SIZE {
            return Err(Error::buffer_too_short(HEADER_SIZE, data.len()));
        }

        let mut reader = WireReader::new(data);
        let id = reader.read_u16()?;
        let raw = reader.read_u16()?;

        let rcode_value = (raw & 0x000F) as u8;
        let rcode = ResponseCode::from_header(rcode_value).ok_or(Error::InvalidResponseCode {
            value: u16::from(rcode_value),
        })?;

        let header = Self {
            id,
            flags: HeaderFlags::from_bits_truncate(raw),
            opcode: ((raw >> 11) & 0x0F) as u8,
            rcode,
        };
        let counts = SectionCounts {
            questions: reader.read_u16()?,
            answers: reader.read_u16()?,
            authority: reader.read_u16()?,
            additional: reader.read_u16()?,
        };

        Ok((header, counts))
    }

    /// Encodes the header followed by the given section counts.
    pub fn write_to(&self, counts: SectionCounts, buf: &mut BytesMut) {
        let raw = self.flags.bits()
            | (u16::from(self.opcode & 0x0F) << 11)
            | u16::from(self.rcode.to_u8());

        buf.extend_from_slice(&self.id.to_be_bytes());
        buf.extend_from_slice(&raw.to_be_bytes());
        for count in [
            counts.questions,
            counts.answers,
            counts.authority,
            counts.additional,
        ] {
            buf.extend_from_slice(&count.to_be_bytes());
        }
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "id: {}, status: {}, flags:", self.id, self.rcode)?;
        for (flag, label) in [
            (HeaderFlags::QR, "qr"),
            (HeaderFlags::AA, "aa"),
            (HeaderFlags::TC, "tc"),
            (HeaderFlags::RD, "rd"),
            (HeaderFlags::RA, "ra"),
        ] {
            if self.flags.contains(flag) {
                write!(f, " {label}")?;
            }
        }
        Ok(())
    }
}
