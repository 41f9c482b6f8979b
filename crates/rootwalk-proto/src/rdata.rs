//! Record data.
//!
//! Only the types an iterative A lookup has to reason about are decoded.
//! Everything else is kept as opaque bytes and rendered in the RFC 3597
//! `\# <len> <hex>` form.

use crate::error::{Error, Result};
use crate::name::Name;
use crate::rtype::{RecordType, Type};
use crate::wire::WireReader;
use bytes::BytesMut;
use data_encoding::HEXLOWER;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// SOA record data (RFC 1035 Section 3.3.13).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Soa {
    /// Primary nameserver of the zone.
    pub mname: Name,
    /// Mailbox of the responsible person.
    pub rname: Name,
    /// Zone serial.
    pub serial: u32,
    /// Secondary refresh interval.
    pub refresh: u32,
    /// Secondary retry interval.
    pub retry: u32,
    /// Secondary expiry.
    pub expire: u32,
    /// Negative caching TTL.
    pub minimum: u32,
}

impl fmt::Display for Soa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.mname, self.rname, self.serial, self.refresh, self.retry, self.expire, self.minimum
        )
    }
}

/// Parsed record data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RData {
    /// IPv4 address.
    A(Ipv4Addr),
    /// Nameserver hostname.
    NS(Name),
    /// Alias target.
    CNAME(Name),
    /// Start of authority.
    SOA(Soa),
    /// Any other type, kept verbatim.
    Opaque {
        /// The record's type code.
        rtype: u16,
        /// Raw RDATA bytes.
        data: Vec<u8>,
    },
}

impl RData {
    /// Decodes `rdlength` bytes of RDATA at `offset` inside `message`.
    ///
    /// Names inside RDATA may be compressed, so the whole message is needed.
    pub fn parse(rtype: Type, message: &[u8], offset: usize, rdlength: u16) -> Result<Self> {
        let len = usize::from(rdlength);
        let end = offset + len;
        if end > message.len() {
            return Err(Error::buffer_too_short(end, message.len()));
        }

        let mut reader = WireReader::at(message, offset);
        let rdata = match rtype.as_known() {
            Some(RecordType::A) => {
                if len != 4 {
                    return Err(Error::RDataLengthMismatch {
                        rtype: "A",
                        expected: 4,
                        actual: len,
                    });
                }
                let octets = reader.read_bytes(4)?;
                RData::A(Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]))
            }
            Some(RecordType::NS) => RData::NS(reader.read_name()?),
            Some(RecordType::CNAME) => RData::CNAME(reader.read_name()?),
            Some(RecordType::SOA) => RData::SOA(Soa {
                mname: reader.read_name()?,
                rname: reader.read_name()?,
                serial: reader.read_u32()?,
                refresh: reader.read_u32()?,
                retry: reader.read_u32()?,
                expire: reader.read_u32()?,
                minimum: reader.read_u32()?,
            }),
            _ => {
                return Ok(RData::Opaque {
                    rtype: rtype.to_u16(),
                    data: message[offset..end].to_vec(),
                });
            }
        };

        if reader.position() > end {
            return Err(Error::invalid_data(
                offset,
                format!("{rtype} RDATA overruns its length of {len}"),
            ));
        }
        Ok(rdata)
    }

    /// Returns the type this data belongs to.
    pub fn rtype(&self) -> Type {
        match self {
            RData::A(_) => Type::Known(RecordType::A),
            RData::NS(_) => Type::Known(RecordType::NS),
            RData::CNAME(_) => Type::Known(RecordType::CNAME),
            RData::SOA(_) => Type::Known(RecordType::SOA),
            RData::Opaque { rtype, .. } => Type::from_u16(*rtype),
        }
    }

    /// Encodes the RDATA without its length prefix. Names are not compressed.
    pub fn write_to(&self, buf: &mut BytesMut) {
        match self {
            RData::A(addr) => buf.extend_from_slice(&addr.octets()),
            RData::NS(name) | RData::CNAME(name) => name.write_wire(buf),
            RData::SOA(soa) => {
                soa.mname.write_wire(buf);
                soa.rname.write_wire(buf);
                for value in [soa.serial, soa.refresh, soa.retry, soa.expire, soa.minimum] {
                    buf.extend_from_slice(&value.to_be_bytes());
                }
            }
            RData::Opaque { data, .. } => buf.extend_from_slice(data),
        }
    }

    /// Returns the address of an A record.
    #[inline]
    pub fn as_a(&self) -> Option<Ipv4Addr> {
        match self {
            RData::A(addr) => Some(*addr),
            _ => None,
        }
    }

    /// Returns the hostname of an NS record.
    #[inline]
    pub fn as_ns(&self) -> Option<&Name> {
        match self {
            RData::NS(name) => Some(name),
            _ => None,
        }
    }

    /// Returns the target of a CNAME record.
    #[inline]
    pub fn as_cname(&self) -> Option<&Name> {
        match self {
            RData::CNAME(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for RData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RData::A(addr) => write!(f, "{addr}"),
            RData::NS(name) | RData::CNAME(name) => write!(f, "{name}"),
            RData::SOA(soa) => write!(f, "{soa}"),
            RData::Opaque { data, .. } => write!(f, "\\# {} {}", data.len(), HEXLOWER.encode(data)),
        }
    }
}
