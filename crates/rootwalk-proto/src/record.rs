//! Resource records.

use crate::class::{Class, RecordClass};
use crate::error::Result;
use crate::name::Name;
use crate::rdata::{RData, Soa};
use crate::rtype::Type;
use crate::wire::WireReader;
use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// A DNS resource record.
///
/// ```text
/// NAME / TYPE (16) / CLASS (16) / TTL (32) / RDLENGTH (16) / RDATA
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRecord {
    name: Name,
    rclass: Class,
    ttl: u32,
    rdata: RData,
}

impl ResourceRecord {
    /// Creates a record; the type is implied by `rdata`.
    pub fn new(name: Name, rclass: Class, ttl: u32, rdata: RData) -> Self {
        Self {
            name,
            rclass,
            ttl,
            rdata,
        }
    }

    /// Creates an `IN A` record.
    pub fn a(name: Name, ttl: u32, addr: Ipv4Addr) -> Self {
        Self::new(name, Class::Known(RecordClass::IN), ttl, RData::A(addr))
    }

    /// Creates an `IN NS` record.
    pub fn ns(name: Name, ttl: u32, nsdname: Name) -> Self {
        Self::new(name, Class::Known(RecordClass::IN), ttl, RData::NS(nsdname))
    }

    /// Creates an `IN CNAME` record.
    pub fn cname(name: Name, ttl: u32, target: Name) -> Self {
        Self::new(name, Class::Known(RecordClass::IN), ttl, RData::CNAME(target))
    }

    /// Creates an `IN SOA` record.
    pub fn soa(name: Name, ttl: u32, soa: Soa) -> Self {
        Self::new(name, Class::Known(RecordClass::IN), ttl, RData::SOA(soa))
    }

    /// Returns the owner name.
    #[inline]
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Returns the record type.
    #[inline]
    pub fn rtype(&self) -> Type {
        self.rdata.rtype()
    }

    /// Returns the record class.
    #[inline]
    pub fn rclass(&self) -> Class {
        self.rclass
    }

    /// Returns the TTL in seconds.
    #[inline]
    pub const fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Returns the record data.
    #[inline]
    pub fn rdata(&self) -> &RData {
        &self.rdata
    }

    /// Decodes a record at the reader's position.
    pub fn read(reader: &mut WireReader<'_>) -> Result<Self> {
        let name = reader.read_name()?;
        let rtype = Type::from_u16(reader.read_u16()?);
        let rclass = Class::from_u16(reader.read_u16()?);
        let ttl = reader.read_u32()?;
        let rdlength = reader.read_u16()?;

        let rdata = RData::parse(rtype, reader.data(), reader.position(), rdlength)?;
        reader.read_bytes(usize::from(rdlength))?;

        Ok(Self {
            name,
            rclass,
            ttl,
            rdata,
        })
    }

    /// Encodes the record without name compression.
    pub fn write_to(&self, buf: &mut BytesMut) {
        self.name.write_wire(buf);
        buf.extend_from_slice(&self.rtype().to_u16().to_be_bytes());
        buf.extend_from_slice(&self.rclass.to_u16().to_be_bytes());
        buf.extend_from_slice(&self.ttl.to_be_bytes());

        let mut rdata = BytesMut::new();
        self.rdata.write_to(&mut rdata);
        buf.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
        buf.extend_from_slice(&rdata);
    }
}

impl fmt::Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.name,
            self.ttl,
            self.rclass,
            self.rtype(),
            self.rdata
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtype::RecordType;
    use std::str::FromStr;

    #[test]
    fn test_record_read_write() {
        let record = ResourceRecord::a(
            Name::from_str("example.com").unwrap(),
            3600,
            Ipv4Addr::new(93, 184, 216, 34),
        );
        let mut buf = BytesMut::new();
        record.write_to(&mut buf);

        let mut reader = WireReader::new(&buf);
        let parsed = ResourceRecord::read(&mut reader).unwrap();
        assert_eq!(parsed, record);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_type_follows_rdata() {
        let record = ResourceRecord::cname(
            Name::from_str("alias.example.com").unwrap(),
            300,
            Name::from_str("real.example.com").unwrap(),
        );
        assert_eq!(record.rtype(), RecordType::CNAME);
        assert_eq!(
            record.rdata().as_cname(),
            Some(&Name::from_str("real.example.com").unwrap())
        );
    }

    #[test]
    fn test_display_dig_style() {
        let record = ResourceRecord::a(
            Name::from_str("example.com").unwrap(),
            300,
            Ipv4Addr::new(192, 0, 2, 1),
        );
        assert_eq!(record.to_string(), "example.com.\t300\tIN\tA\t192.0.2.1");
    }
}
