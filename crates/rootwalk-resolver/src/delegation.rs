//! Turning a referral into the next hop's candidate set.
//!
//! Glue wins: if the additional section carries an A record for any of the
//! referral's nameserver hostnames, those addresses are used and nothing is
//! resolved. Otherwise the hostnames are resolved one at a time, each under
//! a hop budget strictly smaller than what the caller has left, until one of
//! them yields an address.

use crate::{ResolveError, Result};
use async_trait::async_trait;
use rootwalk_proto::{Name, RecordType, Rrset};
use std::net::Ipv4Addr;
use tracing::{debug, instrument, trace};

/// Resolves a nameserver hostname on behalf of a delegation.
#[async_trait]
pub trait HostResolver: Send {
    /// Resolves `host` to IPv4 addresses using at most `budget` hops.
    async fn resolve_host(&mut self, host: &Name, budget: u32) -> HostLookup;
}

/// Result of resolving one nameserver hostname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostLookup {
    /// The addresses found, or why there are none.
    pub addresses: Result<Vec<Ipv4Addr>>,
    /// Hops the lookup spent; they are charged to the caller.
    pub hops: u32,
}

/// The next hop of a walk after a referral.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextHop {
    /// Addresses to query, in discovery order without duplicates.
    pub candidates: Result<Vec<Ipv4Addr>>,
    /// True when the candidates came from glue.
    pub via_glue: bool,
    /// Hops spent resolving nameserver hostnames.
    pub hops: u32,
}

/// Collects the NS hostnames of a referral, first-seen order, no repeats.
pub fn nameserver_hosts(ns: &[Rrset]) -> Vec<Name> {
    let mut hosts: Vec<Name> = Vec::new();
    for host in ns.iter().flat_map(Rrset::nameservers) {
        if !hosts.contains(host) {
            hosts.push(host.clone());
        }
    }
    hosts
}

/// Collects glue addresses for `hosts` from the additional section.
///
/// Owners must match a hostname exactly (ignoring case). Addresses are
/// returned in hostname order, then record order, without duplicates.
pub fn glue(hosts: &[Name], additional: &[Rrset]) -> Vec<Ipv4Addr> {
    let mut addrs = Vec::new();
    for host in hosts {
        for set in additional
            .iter()
            .filter(|set| set.is(RecordType::A) && set.owner() == host)
        {
            for addr in set.addresses() {
                if !addrs.contains(&addr) {
                    addrs.push(addr);
                }
            }
        }
    }
    addrs
}

/// Computes the candidate set for `zone` from a referral.
///
/// `remaining` is the caller's unspent hop budget. A hostname inside `zone`
/// with no glue is skipped: reaching it needs the very servers being looked
/// for. Failed lookups count as "no address"; only a passed deadline ends
/// the search early. When the budget runs out before any lookup could yield
/// an address the result is `HopLimitExceeded`, not `NoUsableDelegation`.
#[instrument(skip_all, fields(zone = %zone, remaining = remaining))]
pub async fn next_hop<R: HostResolver + ?Sized>(
    zone: &Name,
    ns: &[Rrset],
    additional: &[Rrset],
    remaining: u32,
    resolver: &mut R,
) -> NextHop {
    let hosts = nameserver_hosts(ns);
    let glued = glue(&hosts, additional);
    if !glued.is_empty() {
        trace!(addresses = glued.len(), "Using glue");
        return NextHop {
            candidates: Ok(glued),
            via_glue: true,
            hops: 0,
        };
    }

    let mut spent = 0u32;
    let mut found: Vec<Ipv4Addr> = Vec::new();
    let mut out_of_budget = false;

    for host in &hosts {
        if host.is_subdomain_of(zone) {
            debug!(ns = %host, "Lame delegation, in-zone nameserver without glue");
            continue;
        }

        let budget = remaining.saturating_sub(spent).saturating_sub(1);
        if budget == 0 {
            debug!(ns = %host, spent, "Hop budget cannot fund another nameserver lookup");
            out_of_budget = true;
            break;
        }

        trace!(ns = %host, budget, "Resolving nameserver address (no glue)");
        rootwalk_metrics::stats().record_sub_resolution();
        let lookup = resolver.resolve_host(host, budget).await;
        spent = spent.saturating_add(lookup.hops);

        match lookup.addresses {
            Ok(addrs) if !addrs.is_empty() => {
                for addr in addrs {
                    if !found.contains(&addr) {
                        found.push(addr);
                    }
                }
                break;
            }
            Ok(_) => debug!(ns = %host, "Nameserver has no address"),
            Err(ResolveError::DeadlineExceeded) => {
                return NextHop {
                    candidates: Err(ResolveError::DeadlineExceeded),
                    via_glue: false,
                    hops: spent,
                };
            }
            Err(e) => debug!(ns = %host, error = %e, "Nameserver lookup failed"),
        }
    }

    let candidates = if !found.is_empty() {
        Ok(found)
    } else if out_of_budget {
        Err(ResolveError::HopLimitExceeded {
            name: zone.clone(),
            limit: remaining,
        })
    } else {
        Err(ResolveError::NoUsableDelegation { zone: zone.clone() })
    };

    NextHop {
        candidates,
        via_glue: false,
        hops: spent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rootwalk_proto::ResourceRecord;
    use std::collections::HashMap;
    use std::str::FromStr;

    fn name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    fn referral(zone: &str, hosts: &[&str]) -> Vec<Rrset> {
        let records: Vec<_> = hosts
            .iter()
            .map(|h| ResourceRecord::ns(name(zone), 86400, name(h)))
            .collect();
        Rrset::group(&records)
    }

    /// Records every lookup and answers from a table.
    #[derive(Default)]
    struct Recorder {
        answers: HashMap<Name, Vec<Ipv4Addr>>,
        cost: u32,
        calls: Vec<(Name, u32)>,
    }

    #[async_trait]
    impl HostResolver for Recorder {
        async fn resolve_host(&mut self, host: &Name, budget: u32) -> HostLookup {
            self.calls.push((host.clone(), budget));
            let addresses = match self.answers.get(host) {
                Some(addrs) => Ok(addrs.clone()),
                None => Err(ResolveError::NameNotFound { name: host.clone() }),
            };
            HostLookup {
                addresses,
                hops: self.cost.min(budget),
            }
        }
    }

    #[tokio::test]
    async fn test_glue_preferred() {
        let ns = referral("com", &["a.gtld.example", "b.gtld.example"]);
        let additional = Rrset::group(&[
            ResourceRecord::a(name("B.GTLD.EXAMPLE"), 86400, Ipv4Addr::new(203, 0, 113, 2)),
            ResourceRecord::a(name("a.gtld.example"), 86400, Ipv4Addr::new(203, 0, 113, 1)),
            ResourceRecord::a(name("a.gtld.example"), 86400, Ipv4Addr::new(203, 0, 113, 2)),
            ResourceRecord::a(name("unrelated.example"), 86400, Ipv4Addr::new(198, 51, 100, 1)),
        ]);

        let mut resolver = Recorder::default();
        let hop = next_hop(&name("com"), &ns, &additional, 10, &mut resolver).await;

        assert!(hop.via_glue);
        assert_eq!(hop.hops, 0);
        assert_eq!(
            hop.candidates.unwrap(),
            vec![Ipv4Addr::new(203, 0, 113, 1), Ipv4Addr::new(203, 0, 113, 2)]
        );
        assert!(resolver.calls.is_empty());
    }

    #[tokio::test]
    async fn test_glueless_lookup_budget_is_smaller() {
        let ns = referral("example.org", &["ns1.example.net", "ns2.example.net"]);
        let mut resolver = Recorder {
            cost: 3,
            ..Recorder::default()
        };
        resolver
            .answers
            .insert(name("ns2.example.net"), vec![Ipv4Addr::new(198, 51, 100, 53)]);

        let hop = next_hop(&name("example.org"), &ns, &[], 10, &mut resolver).await;

        assert!(!hop.via_glue);
        assert_eq!(hop.candidates.unwrap(), vec![Ipv4Addr::new(198, 51, 100, 53)]);
        assert_eq!(hop.hops, 6);
        assert_eq!(
            resolver.calls,
            vec![(name("ns1.example.net"), 9), (name("ns2.example.net"), 6)]
        );
    }

    #[tokio::test]
    async fn test_each_host_resolved_once() {
        let ns = Rrset::group(&[
            ResourceRecord::ns(name("example.org"), 86400, name("ns1.example.net")),
            ResourceRecord::ns(name("example.org"), 86400, name("NS1.example.net")),
        ]);
        let mut resolver = Recorder::default();

        let hop = next_hop(&name("example.org"), &ns, &[], 5, &mut resolver).await;

        assert_eq!(resolver.calls.len(), 1);
        assert!(matches!(
            hop.candidates,
            Err(ResolveError::NoUsableDelegation { .. })
        ));
    }

    #[tokio::test]
    async fn test_in_zone_host_without_glue_skipped() {
        let ns = referral("example.com", &["ns1.example.com"]);
        let mut resolver = Recorder::default();

        let hop = next_hop(&name("example.com"), &ns, &[], 10, &mut resolver).await;

        assert!(resolver.calls.is_empty());
        assert_eq!(
            hop.candidates,
            Err(ResolveError::NoUsableDelegation {
                zone: name("example.com")
            })
        );
    }

    #[tokio::test]
    async fn test_exhausted_budget_stops_lookups() {
        let ns = referral("example.org", &["ns1.example.net", "ns2.example.net"]);
        let mut resolver = Recorder {
            cost: 5,
            ..Recorder::default()
        };

        // Remaining 3: the first lookup gets 2 and spends both; the second
        // would get nothing.
        let hop = next_hop(&name("example.org"), &ns, &[], 3, &mut resolver).await;

        assert_eq!(resolver.calls, vec![(name("ns1.example.net"), 2)]);
        assert_eq!(hop.hops, 2);
        assert!(matches!(
            hop.candidates,
            Err(ResolveError::HopLimitExceeded { limit: 3, .. })
        ));
    }

    #[tokio::test]
    async fn test_no_budget_for_any_lookup() {
        let ns = referral("example.org", &["ns1.example.net"]);
        let mut resolver = Recorder::default();

        let hop = next_hop(&name("example.org"), &ns, &[], 1, &mut resolver).await;

        assert!(resolver.calls.is_empty());
        assert_eq!(hop.hops, 0);
        assert!(matches!(
            hop.candidates,
            Err(ResolveError::HopLimitExceeded { .. })
        ));
    }
}
