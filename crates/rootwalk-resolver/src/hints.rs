//! Root server hints.
//!
//! The walk always starts from these addresses. They are loaded once, either
//! from the built-in IANA table or from a BIND-style `root.hints` file, and
//! are never modified afterwards; a resolver shares them behind an `Arc`.

use rootwalk_proto::Name;
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

// ============================================================================
// Root Server Hints
// ============================================================================

/// IANA root servers (IPv4 only).
pub static ROOT_SERVERS: &[RootServer] = &[
    RootServer {
        name: "a.root-servers.net",
        ipv4: Ipv4Addr::new(198, 41, 0, 4),
    },
    RootServer {
        name: "b.root-servers.net",
        ipv4: Ipv4Addr::new(199, 9, 14, 201),
    },
    RootServer {
        name: "c.root-servers.net",
        ipv4: Ipv4Addr::new(192, 33, 4, 12),
    },
    RootServer {
        name: "d.root-servers.net",
        ipv4: Ipv4Addr::new(199, 7, 91, 13),
    },
    RootServer {
        name: "e.root-servers.net",
        ipv4: Ipv4Addr::new(192, 203, 230, 10),
    },
    RootServer {
        name: "f.root-servers.net",
        ipv4: Ipv4Addr::new(192, 5, 5, 241),
    },
    RootServer {
        name: "g.root-servers.net",
        ipv4: Ipv4Addr::new(192, 112, 36, 4),
    },
    RootServer {
        name: "h.root-servers.net",
        ipv4: Ipv4Addr::new(198, 97, 190, 53),
    },
    RootServer {
        name: "i.root-servers.net",
        ipv4: Ipv4Addr::new(192, 36, 148, 17),
    },
    RootServer {
        name: "j.root-servers.net",
        ipv4: Ipv4Addr::new(192, 58, 128, 30),
    },
    RootServer {
        name: "k.root-servers.net",
        ipv4: Ipv4Addr::new(193, 0, 14, 129),
    },
    RootServer {
        name: "l.root-servers.net",
        ipv4: Ipv4Addr::new(199, 7, 83, 42),
    },
    RootServer {
        name: "m.root-servers.net",
        ipv4: Ipv4Addr::new(202, 12, 27, 33),
    },
];

/// A built-in root server entry.
#[derive(Debug, Clone, Copy)]
pub struct RootServer {
    /// Hostname of the root server.
    pub name: &'static str,
    /// IPv4 address.
    pub ipv4: Ipv4Addr,
}

/// Errors loading a hints file.
#[derive(Error, Debug)]
pub enum HintsError {
    #[error("cannot read hints file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("hints contain no IPv4 root server address")]
    Empty,
}

impl HintsError {
    fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

// ============================================================================
// Root Hints
// ============================================================================

/// One named root server address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintEntry {
    /// Server hostname.
    pub name: Name,
    /// Server address.
    pub addr: Ipv4Addr,
}

/// The immutable starting set of nameserver addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootHints {
    servers: Vec<HintEntry>,
}

impl RootHints {
    /// Creates root hints from the built-in IANA table.
    pub fn builtin() -> Self {
        let servers = ROOT_SERVERS
            .iter()
            .filter_map(|rs| {
                Name::from_str(rs.name).ok().map(|name| HintEntry {
                    name,
                    addr: rs.ipv4,
                })
            })
            .collect();
        Self { servers }
    }

    /// Creates hints from bare addresses, naming each server after its
    /// position. Useful for pointing the walk at a private hierarchy.
    pub fn from_addrs(addrs: impl IntoIterator<Item = Ipv4Addr>) -> Self {
        let servers = addrs
            .into_iter()
            .enumerate()
            .map(|(i, addr)| HintEntry {
                name: Name::from_str(&format!("hint{i}.invalid")).unwrap_or_default(),
                addr,
            })
            .collect();
        Self { servers }
    }

    /// Loads hints from a BIND `root.hints` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, HintsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| HintsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let hints = Self::parse(&text)?;
        debug!(path = %path.display(), servers = hints.len(), "Loaded root hints");
        Ok(hints)
    }

    /// Parses hints in BIND zone-file form.
    ///
    /// `. NS <host>` lines name the root servers and `<host> A <addr>` lines
    /// give their addresses; TTL and class columns are optional. AAAA lines
    /// are skipped. Servers are kept in the order the NS lines list them;
    /// without any NS line every A line is used.
    pub fn parse(text: &str) -> Result<Self, HintsError> {
        let mut roots: Vec<Name> = Vec::new();
        let mut addresses: Vec<HintEntry> = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let content = raw.split(';').next().unwrap_or_default();
            let fields: Vec<&str> = content.split_whitespace().collect();
            let Some((owner, rest)) = fields.split_first() else {
                continue;
            };

            // Skip the optional TTL and class columns.
            let mut rest = rest.iter().copied().skip_while(|f| {
                f.bytes().all(|b| b.is_ascii_digit()) || f.eq_ignore_ascii_case("IN")
            });
            let (Some(rtype), Some(rdata)) = (rest.next(), rest.next()) else {
                return Err(HintsError::parse(line, "expected <owner> [ttl] [class] <type> <data>"));
            };

            let owner = Name::from_str(owner)
                .map_err(|e| HintsError::parse(line, format!("bad owner {owner:?}: {e}")))?;
            match rtype.to_ascii_uppercase().as_str() {
                "NS" if owner.is_root() => {
                    let host = Name::from_str(rdata)
                        .map_err(|e| HintsError::parse(line, format!("bad NS target {rdata:?}: {e}")))?;
                    if !roots.contains(&host) {
                        roots.push(host);
                    }
                }
                "A" => {
                    let addr = rdata
                        .parse::<Ipv4Addr>()
                        .map_err(|e| HintsError::parse(line, format!("bad address {rdata:?}: {e}")))?;
                    addresses.push(HintEntry { name: owner, addr });
                }
                _ => {}
            }
        }

        let servers: Vec<HintEntry> = if roots.is_empty() {
            addresses
        } else {
            roots
                .iter()
                .flat_map(|root| addresses.iter().filter(move |e| &e.name == root))
                .cloned()
                .collect()
        };

        if servers.is_empty() {
            return Err(HintsError::Empty);
        }
        Ok(Self { servers })
    }

    /// Returns the server entries.
    pub fn servers(&self) -> &[HintEntry] {
        &self.servers
    }

    /// Returns the socket addresses of every server on `port`.
    pub fn socket_addrs(&self, port: u16) -> Vec<SocketAddr> {
        self.servers
            .iter()
            .map(|e| SocketAddr::from((e.addr, port)))
            .collect()
    }

    /// Returns the number of servers.
    pub fn len(&self) -> usize {
        self.servers.len()
    }

    /// Returns true if there are no servers.
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}

impl Default for RootHints {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Display for RootHints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.servers {
            writeln!(f, "{}\tA\t{}", entry.name, entry.addr)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const NAMED_ROOT: &str = "\
;       This file holds the information on root name servers needed to
;       initialize cache of Internet domain name servers
.                        3600000      NS    A.ROOT-SERVERS.NET.
A.ROOT-SERVERS.NET.      3600000      A     198.41.0.4
A.ROOT-SERVERS.NET.      3600000      AAAA  2001:503:ba3e::2:30
;
.                        3600000      NS    B.ROOT-SERVERS.NET.
B.ROOT-SERVERS.NET.      3600000  IN  A     199.9.14.201
";

    #[test]
    fn test_builtin_hints() {
        let hints = RootHints::builtin();
        assert_eq!(hints.len(), 13);
        assert_eq!(hints.servers()[0].addr, Ipv4Addr::new(198, 41, 0, 4));
        assert_eq!(hints.servers()[12].name.to_string(), "m.root-servers.net.");
        assert!(hints.socket_addrs(53).iter().all(|a| a.port() == 53));
    }

    #[test]
    fn test_parse_named_root() {
        let hints = RootHints::parse(NAMED_ROOT).unwrap();
        assert_eq!(hints.len(), 2);
        assert_eq!(
            hints.servers()[0].name,
            Name::from_str("a.root-servers.net").unwrap()
        );
        assert_eq!(hints.servers()[1].addr, Ipv4Addr::new(199, 9, 14, 201));
    }

    #[test]
    fn test_parse_without_ns_lines() {
        let hints = RootHints::parse("ns.test. A 127.0.0.1\n").unwrap();
        assert_eq!(hints.socket_addrs(5353), vec!["127.0.0.1:5353".parse().unwrap()]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            RootHints::parse("; only comments\n"),
            Err(HintsError::Empty)
        ));
        assert!(matches!(
            RootHints::parse("a.root. A not-an-address\n"),
            Err(HintsError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            RootHints::parse("\n. NS\n"),
            Err(HintsError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(NAMED_ROOT.as_bytes()).unwrap();
        let hints = RootHints::from_file(file.path()).unwrap();
        assert_eq!(hints.len(), 2);

        let missing = RootHints::from_file("/nonexistent/root.hints");
        assert!(matches!(missing, Err(HintsError::Io { .. })));
    }

    #[test]
    fn test_from_addrs() {
        let hints = RootHints::from_addrs([Ipv4Addr::LOCALHOST]);
        assert_eq!(hints.len(), 1);
        assert_eq!(hints.servers()[0].addr, Ipv4Addr::LOCALHOST);
    }
}
