//! # rootwalk resolver
//!
//! Iterative A-record resolution starting from the root hints.
//!
//! The resolver never asks a server to recurse. Each hop sends one
//! non-recursive query to a nameserver of the zone currently believed to be
//! closest to the target and acts on the response:
//!
//! - an A RRset owned by the target ends the walk,
//! - a CNAME for the target is appended to the alias chain and the walk
//!   restarts at the root for the new target,
//! - an NS referral becomes the next hop's candidate set, taken from glue
//!   when present and otherwise from bounded sub-resolutions of the
//!   nameserver hostnames.
//!
//! Every walk runs under a hop budget shared with its sub-resolutions, and
//! each `(target, zone)` pair may be visited once, so even a hostile
//! hierarchy cannot keep the resolver busy forever.
//!
//! ## Example
//!
//! ```rust,no_run
//! use rootwalk_proto::Name;
//! use rootwalk_resolver::{IterativeResolver, ResolverConfig, RootHints};
//! use std::str::FromStr;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = IterativeResolver::udp(Arc::new(RootHints::builtin()), ResolverConfig::default());
//! let answer = resolver.resolve(&Name::from_str("example.com")?).await?;
//! for addr in answer.addresses() {
//!     println!("{addr}");
//! }
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

use rootwalk_proto::Name;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub mod delegation;
pub mod engine;
pub mod hints;
pub mod selector;
pub mod trace;
pub mod transport;

pub use delegation::{HostResolver, NextHop, next_hop};
pub use engine::{Answer, IterativeResolver, Resolution};
pub use hints::{HintsError, ROOT_SERVERS, RootHints, RootServer};
pub use selector::{Exchange, NameserverSelector};
pub use trace::{Hop, HopOutcome};
pub use transport::{Transport, UdpTransport};

/// Default hop budget for a top-level resolution.
pub const DEFAULT_MAX_HOPS: u32 = 16;

/// Default per-attempt timeout.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Errors
// ============================================================================

/// Why a resolution failed.
///
/// Failures of a glueless nameserver lookup never surface directly; the
/// delegation step treats them as "no address for this hostname".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no nameserver for {name} answered ({attempted} tried)")]
    TransportExhausted { name: Name, attempted: usize },

    #[error("{name} does not exist (NXDOMAIN)")]
    NameNotFound { name: Name },

    #[error("{zone} is authoritative and has no A record for {name}")]
    AuthoritativeNoData { name: Name, zone: Name },

    #[error("response for {name} has no answer and no delegation")]
    NoDelegation { name: Name },

    #[error("no nameserver address found for zone {zone}")]
    NoUsableDelegation { zone: Name },

    #[error("cycle detected: {name} revisited at zone {zone}")]
    CycleDetected { name: Name, zone: Name },

    #[error("hop limit of {limit} reached while resolving {name}")]
    HopLimitExceeded { name: Name, limit: u32 },

    #[error("overall deadline exceeded")]
    DeadlineExceeded,

    #[error("protocol error: {0}")]
    Protocol(String),
}

impl ResolveError {
    /// Creates a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Returns the failure kind.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::TransportExhausted { .. } => FailureKind::TransportExhausted,
            Self::NameNotFound { .. } => FailureKind::NameNotFound,
            Self::AuthoritativeNoData { .. } => FailureKind::AuthoritativeNoData,
            Self::NoDelegation { .. } => FailureKind::NoDelegation,
            Self::NoUsableDelegation { .. } => FailureKind::NoUsableDelegation,
            Self::CycleDetected { .. } => FailureKind::CycleDetected,
            Self::HopLimitExceeded { .. } => FailureKind::HopLimitExceeded,
            Self::DeadlineExceeded => FailureKind::DeadlineExceeded,
            Self::Protocol(_) => FailureKind::ProtocolError,
        }
    }
}

/// The closed set of failure kinds, for branching and labelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    TransportExhausted,
    NameNotFound,
    AuthoritativeNoData,
    NoDelegation,
    NoUsableDelegation,
    CycleDetected,
    HopLimitExceeded,
    DeadlineExceeded,
    ProtocolError,
}

impl FailureKind {
    /// Returns the snake_case label used in metrics and JSON output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TransportExhausted => "transport_exhausted",
            Self::NameNotFound => "name_not_found",
            Self::AuthoritativeNoData => "authoritative_no_data",
            Self::NoDelegation => "no_delegation",
            Self::NoUsableDelegation => "no_usable_delegation",
            Self::CycleDetected => "cycle_detected",
            Self::HopLimitExceeded => "hop_limit_exceeded",
            Self::DeadlineExceeded => "deadline_exceeded",
            Self::ProtocolError => "protocol_error",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type for resolver operations.
pub type Result<T> = std::result::Result<T, ResolveError>;

/// A single failed exchange with one nameserver.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("network error: {0}")]
    Network(#[from] std::io::Error),
}

impl TransportError {
    /// Returns a short label for metrics.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::Malformed(_) => "malformed",
            Self::Network(_) => "network",
        }
    }
}

impl From<rootwalk_proto::Error> for TransportError {
    fn from(err: rootwalk_proto::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Resolver configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Hop budget for a top-level resolution.
    pub max_hops: u32,

    /// Timeout for each attempt against one nameserver.
    pub query_timeout: Duration,

    /// Optional wall-clock limit for a whole resolution.
    pub deadline: Option<Duration>,

    /// Seed for candidate ordering; `None` draws from entropy.
    pub seed: Option<u64>,

    /// Destination port for every query.
    pub port: u16,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_hops: DEFAULT_MAX_HOPS,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            deadline: None,
            seed: None,
            port: rootwalk_proto::DNS_PORT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_resolver_config_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.max_hops, 16);
        assert_eq!(config.query_timeout, Duration::from_secs(5));
        assert_eq!(config.deadline, None);
        assert_eq!(config.port, 53);
    }

    #[test]
    fn test_error_kinds() {
        let name = Name::from_str("example.com").unwrap();
        let err = ResolveError::CycleDetected {
            name: name.clone(),
            zone: Name::root(),
        };
        assert_eq!(err.kind(), FailureKind::CycleDetected);
        assert_eq!(err.kind().as_str(), "cycle_detected");
        assert!(err.to_string().contains("example.com."));

        assert_eq!(
            ResolveError::protocol("truncated").kind(),
            FailureKind::ProtocolError
        );
    }

    #[test]
    fn test_failure_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FailureKind::HopLimitExceeded).unwrap();
        assert_eq!(json, "\"hop_limit_exceeded\"");
    }

    #[test]
    fn test_transport_error_labels() {
        assert_eq!(TransportError::Timeout(Duration::from_secs(1)).label(), "timeout");
        let malformed: TransportError = rootwalk_proto::Error::unexpected_eof(12).into();
        assert_eq!(malformed.label(), "malformed");
    }
}
