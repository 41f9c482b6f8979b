//! Per-hop record of a walk.

use rootwalk_proto::Name;
use serde::Serialize;
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};

/// One query sent during a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hop {
    /// Nesting level: 0 for the requested name, 1 for a nameserver
    /// hostname resolved on its behalf, and so on.
    pub depth: usize,
    /// Name asked for.
    pub target: Name,
    /// Zone whose servers were asked.
    pub zone: Name,
    /// Server that answered, if any did.
    pub server: Option<SocketAddr>,
    /// Queries sent for this hop, retries across servers included.
    pub attempts: usize,
    /// What the response meant.
    pub outcome: HopOutcome,
}

/// How a hop's response was interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HopOutcome {
    /// The target's A RRset.
    Answer { addresses: Vec<Ipv4Addr> },
    /// The target is an alias.
    Alias { target: Name },
    /// Delegation to a closer zone.
    Referral { zone: Name, nameservers: usize },
    /// The walk ended at this hop.
    Failed { reason: String },
}

impl fmt::Display for Hop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:indent$}{} @ {} ", "", self.target, self.zone, indent = self.depth * 2)?;
        match self.server {
            Some(server) => write!(f, "({server})")?,
            None => f.write_str("(no server)")?,
        }
        if self.attempts > 1 {
            write!(f, " [{} tries]", self.attempts)?;
        }
        write!(f, " -> {}", self.outcome)
    }
}

impl fmt::Display for HopOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Answer { addresses } => {
                f.write_str("answer")?;
                for addr in addresses {
                    write!(f, " {addr}")?;
                }
                Ok(())
            }
            Self::Alias { target } => write!(f, "alias to {target}"),
            Self::Referral { zone, nameservers } => {
                write!(f, "referral to {zone} ({nameservers} NS)")
            }
            Self::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_hop_display() {
        let hop = Hop {
            depth: 1,
            target: Name::from_str("ns1.example.net").unwrap(),
            zone: Name::from_str("net").unwrap(),
            server: Some("192.0.2.1:53".parse().unwrap()),
            attempts: 1,
            outcome: HopOutcome::Referral {
                zone: Name::from_str("example.net").unwrap(),
                nameservers: 2,
            },
        };
        assert_eq!(
            hop.to_string(),
            "  ns1.example.net. @ net. (192.0.2.1:53) -> referral to example.net. (2 NS)"
        );
    }

    #[test]
    fn test_hop_display_shows_retries() {
        let hop = Hop {
            depth: 0,
            target: Name::from_str("www.example.com").unwrap(),
            zone: Name::from_str("com").unwrap(),
            server: None,
            attempts: 3,
            outcome: HopOutcome::Failed {
                reason: "timed out".to_string(),
            },
        };
        assert_eq!(
            hop.to_string(),
            "www.example.com. @ com. (no server) [3 tries] -> failed: timed out"
        );
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let outcome = HopOutcome::Answer {
            addresses: vec![Ipv4Addr::new(192, 0, 2, 7)],
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["kind"], "answer");
        assert_eq!(json["addresses"][0], "192.0.2.7");
    }
}
