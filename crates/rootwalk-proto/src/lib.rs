//! # rootwalk DNS protocol types
//!
//! The message model and wire codec used by the rootwalk iterative resolver.
//! Only what an iterative A-record walk needs is interpreted: A, NS, CNAME and
//! SOA record data. Every other record type is carried as opaque bytes so that
//! a response containing it still parses and can be printed.
//!
//! ## Example
//!
//! ```rust
//! use rootwalk_proto::{Message, Name, Question};
//! use std::str::FromStr;
//!
//! let query = Message::iterative_query(Question::a(Name::from_str("example.com").unwrap()));
//! assert!(!query.recursion_desired());
//!
//! let wire = query.to_wire();
//! let parsed = Message::parse(&wire).unwrap();
//! assert_eq!(parsed.id(), query.id());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod class;
pub mod error;
pub mod header;
pub mod message;
pub mod name;
pub mod question;
pub mod rcode;
pub mod rdata;
pub mod record;
pub mod rrset;
pub mod rtype;
pub mod wire;

pub use class::{Class, RecordClass};
pub use error::{Error, Result};
pub use header::{Header, HeaderFlags};
pub use message::Message;
pub use name::Name;
pub use question::Question;
pub use rcode::ResponseCode;
pub use rdata::RData;
pub use record::ResourceRecord;
pub use rrset::Rrset;
pub use rtype::{RecordType, Type};

/// Maximum length of a DNS label (63 bytes per RFC 1035)
pub const MAX_LABEL_LENGTH: usize = 63;

/// Maximum length of a domain name (255 bytes per RFC 1035)
pub const MAX_NAME_LENGTH: usize = 255;

/// Maximum size of a UDP DNS message without EDNS0 (512 bytes per RFC 1035)
pub const MAX_UDP_MESSAGE_SIZE: usize = 512;

/// Receive buffer size for UDP responses.
///
/// Servers may ignore the 512 byte limit when they see no OPT record, so the
/// receive side reads generously and lets the parser decide.
pub const UDP_RECV_BUFFER_SIZE: usize = 4096;

/// DNS port (53)
pub const DNS_PORT: u16 = 53;
