//! Grouping records into RRsets.

use crate::class::Class;
use crate::name::Name;
use crate::rdata::RData;
use crate::record::ResourceRecord;
use crate::rtype::{RecordType, Type};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// Records sharing owner, type and class.
///
/// The TTL of the set is the smallest TTL among its members (RFC 2181
/// Section 5.2 requires them to be equal; servers that disagree get the
/// conservative value).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rrset {
    owner: Name,
    rtype: Type,
    rclass: Class,
    ttl: u32,
    records: Vec<RData>,
}

impl Rrset {
    /// Creates a set holding a single record.
    pub fn from_record(record: &ResourceRecord) -> Self {
        Self {
            owner: record.name().clone(),
            rtype: record.rtype(),
            rclass: record.rclass(),
            ttl: record.ttl(),
            records: vec![record.rdata().clone()],
        }
    }

    /// Groups a section into RRsets.
    ///
    /// Sets appear in the order their first record appears; records keep
    /// their order within a set.
    pub fn group(records: &[ResourceRecord]) -> Vec<Rrset> {
        let mut sets: Vec<Rrset> = Vec::new();
        for record in records {
            match sets.iter_mut().find(|set| set.accepts(record)) {
                Some(set) => {
                    set.ttl = set.ttl.min(record.ttl());
                    set.records.push(record.rdata().clone());
                }
                None => sets.push(Self::from_record(record)),
            }
        }
        sets
    }

    fn accepts(&self, record: &ResourceRecord) -> bool {
        self.rtype == record.rtype() && self.rclass == record.rclass() && &self.owner == record.name()
    }

    /// Returns the owner name.
    #[inline]
    pub fn owner(&self) -> &Name {
        &self.owner
    }

    /// Returns the type shared by the records.
    #[inline]
    pub fn rtype(&self) -> Type {
        self.rtype
    }

    /// Returns the class shared by the records.
    #[inline]
    pub fn rclass(&self) -> Class {
        self.rclass
    }

    /// Returns the set TTL.
    #[inline]
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Returns the record data.
    #[inline]
    pub fn records(&self) -> &[RData] {
        &self.records
    }

    /// Returns the number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the set holds no records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns true if the set has the given known type.
    #[inline]
    pub fn is(&self, rtype: RecordType) -> bool {
        self.rtype == rtype
    }

    /// Returns the IPv4 addresses held by an A set.
    pub fn addresses(&self) -> impl Iterator<Item = Ipv4Addr> + '_ {
        self.records.iter().filter_map(RData::as_a)
    }

    /// Returns the hostnames held by an NS set.
    pub fn nameservers(&self) -> impl Iterator<Item = &Name> + '_ {
        self.records.iter().filter_map(RData::as_ns)
    }

    /// Returns the target names held by a CNAME set.
    pub fn cname_targets(&self) -> impl Iterator<Item = &Name> + '_ {
        self.records.iter().filter_map(RData::as_cname)
    }

    /// Expands the set back into individual records.
    pub fn to_records(&self) -> Vec<ResourceRecord> {
        self.records
            .iter()
            .map(|rdata| ResourceRecord::new(self.owner.clone(), self.rclass, self.ttl, rdata.clone()))
            .collect()
    }
}

impl fmt::Display for Rrset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rdata) in self.records.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "{}\t{}\t{}\t{}\t{}",
                self.owner, self.ttl, self.rclass, self.rtype, rdata
            )?;
        }
        Ok(())
    }
}
