//! The iterative resolution state machine.
//!
//! One call to [`IterativeResolver::resolve`] owns one [`ResolutionState`]
//! per walk: the requested name gets one, and every nameserver hostname that
//! has to be resolved because a referral came without glue gets its own,
//! with a smaller hop budget. Sub-walks run sequentially and the hops they
//! spend are charged to the walk that started them.
//!
//! Per hop, in order:
//!
//! 1. stop if the overall deadline has passed,
//! 2. stop if the hop budget is spent,
//! 3. stop if `(target, zone)` was already visited,
//! 4. query one of the candidates (one hop, whatever the number of attempts),
//! 5. act on the response: NXDOMAIN fails, an A RRset for the target answers,
//!    a CNAME restarts at the root, NS delegates, SOA alone means no data.

use crate::delegation::{HostLookup, HostResolver, next_hop};
use crate::hints::RootHints;
use crate::selector::NameserverSelector;
use crate::trace::{Hop, HopOutcome};
use crate::transport::{Transport, UdpTransport};
use crate::{ResolveError, ResolverConfig, Result};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use rootwalk_metrics::ResolutionTimer;
use rootwalk_proto::{Message, Name, Question, RecordType, ResourceRecord, Rrset};
use serde::Serialize;
use std::collections::HashSet;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, trace};

// ============================================================================
// Results
// ============================================================================

/// A successful resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    /// The name that was asked for.
    pub query: Name,
    /// CNAME RRsets followed, in order.
    pub chain: Vec<Rrset>,
    /// The A RRset of the last name in the chain.
    pub rrset: Rrset,
}

impl Answer {
    /// Returns the final addresses.
    pub fn addresses(&self) -> impl Iterator<Item = Ipv4Addr> + '_ {
        self.rrset.addresses()
    }

    /// Returns the name that owns the addresses.
    pub fn terminal_name(&self) -> &Name {
        self.rrset.owner()
    }

    /// Returns the chain followed by the answer, as individual records.
    pub fn records(&self) -> Vec<ResourceRecord> {
        self.chain
            .iter()
            .chain(std::iter::once(&self.rrset))
            .flat_map(Rrset::to_records)
            .collect()
    }

    /// Builds a response message carrying the whole chain, for display.
    pub fn to_message(&self) -> Message {
        let query = Message::iterative_query(Question::a(self.query.clone()));
        let mut response = Message::response_to(&query);
        for record in self.records() {
            response.add_answer(record);
        }
        response
    }
}

/// Everything known about one top-level resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The name that was asked for.
    pub query: Name,
    /// The answer or the failure.
    pub outcome: Result<Answer>,
    /// Hops spent, sub-walks included.
    pub hops: u32,
    /// Every query sent, in order.
    pub trace: Vec<Hop>,
    /// Wall-clock time taken.
    pub elapsed: Duration,
}

// ============================================================================
// Resolution State
// ============================================================================

/// State of one walk. Never shared between walks.
#[derive(Debug)]
struct ResolutionState {
    /// The name this walk was started for.
    query: Name,
    /// Current target (changes when an alias is followed).
    target: Name,
    /// Zone whose servers are in `candidates`.
    zone: Name,
    /// Servers to ask next.
    candidates: Vec<SocketAddr>,
    /// Aliases followed so far.
    chain: Vec<Rrset>,
    /// Hops spent, including those of sub-walks.
    hops: u32,
    /// Hops this walk may spend.
    budget: u32,
    /// `(target, zone)` pairs already queried.
    visited: HashSet<(Name, Name)>,
}

impl ResolutionState {
    fn new(query: Name, budget: u32, roots: Vec<SocketAddr>) -> Self {
        Self {
            target: query.clone(),
            query,
            zone: Name::root(),
            candidates: roots,
            chain: Vec::new(),
            hops: 0,
            budget,
            visited: HashSet::new(),
        }
    }

    fn remaining(&self) -> u32 {
        self.budget.saturating_sub(self.hops)
    }
}

/// Resources shared by a top-level walk and all of its sub-walks.
struct Session {
    selector: NameserverSelector,
    deadline: Option<Instant>,
    trace: Vec<Hop>,
}

impl Session {
    fn check_deadline(&self) -> Result<()> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(ResolveError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    fn record(
        &mut self,
        depth: usize,
        state: &ResolutionState,
        server: Option<SocketAddr>,
        attempts: usize,
        outcome: HopOutcome,
    ) {
        self.trace.push(Hop {
            depth,
            target: state.target.clone(),
            zone: state.zone.clone(),
            server,
            attempts,
            outcome,
        });
    }
}

/// A finished walk and what it cost.
struct Walk {
    result: Result<Answer>,
    hops: u32,
}

// ============================================================================
// Response interpretation
// ============================================================================

/// What a usable response tells the walk to do.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    /// The target's A RRset.
    Answer(Rrset),
    /// The target's CNAME RRset and its single target.
    Alias(Rrset, Name),
    /// NS RRsets for `zone` plus the additional section.
    Referral {
        zone: Name,
        ns: Vec<Rrset>,
        additional: Vec<Rrset>,
    },
}

/// Classifies a response to an A query for `target`.
fn interpret(response: &Message, target: &Name) -> Result<Step> {
    if response.is_nxdomain() {
        return Err(ResolveError::NameNotFound {
            name: target.clone(),
        });
    }
    if response.is_truncated() {
        return Err(ResolveError::protocol(format!(
            "truncated response for {target}"
        )));
    }

    let answers = response.answer_rrsets();
    let owned = |rtype: RecordType| {
        answers
            .iter()
            .find(|set| set.is(rtype) && set.owner() == target)
    };

    // An A RRset wins over a CNAME for the same owner.
    if let Some(a) = owned(RecordType::A) {
        return Ok(Step::Answer(a.clone()));
    }
    if let Some(cname) = owned(RecordType::CNAME) {
        let mut targets = cname.cname_targets();
        return match (targets.next(), targets.next()) {
            (Some(next), None) => Ok(Step::Alias(cname.clone(), next.clone())),
            _ => Err(ResolveError::protocol(format!(
                "CNAME RRset for {target} must hold exactly one target"
            ))),
        };
    }

    let authority = response.authority_rrsets();
    if let Some(zone) = authority
        .iter()
        .find(|set| set.is(RecordType::NS))
        .map(|set| set.owner().clone())
    {
        if !target.is_subdomain_of(&zone) {
            return Err(ResolveError::protocol(format!(
                "referral to {zone} does not cover {target}"
            )));
        }
        let ns = authority
            .into_iter()
            .filter(|set| set.is(RecordType::NS) && set.owner() == &zone)
            .collect();
        return Ok(Step::Referral {
            zone,
            ns,
            additional: response.additional_rrsets(),
        });
    }

    if let Some(soa) = authority.iter().find(|set| set.is(RecordType::SOA)) {
        return Err(ResolveError::AuthoritativeNoData {
            name: target.clone(),
            zone: soa.owner().clone(),
        });
    }

    Err(ResolveError::NoDelegation {
        name: target.clone(),
    })
}

// ============================================================================
// Iterative Resolver
// ============================================================================

/// Resolves A records by walking the delegation tree from the root hints.
pub struct IterativeResolver<T> {
    transport: T,
    hints: Arc<RootHints>,
    config: ResolverConfig,
}

impl IterativeResolver<UdpTransport> {
    /// Creates a resolver that talks plain UDP.
    pub fn udp(hints: Arc<RootHints>, config: ResolverConfig) -> Self {
        Self::new(UdpTransport::new(), hints, config)
    }
}

impl<T: Transport> IterativeResolver<T> {
    /// Creates a resolver over any transport.
    pub fn new(transport: T, hints: Arc<RootHints>, config: ResolverConfig) -> Self {
        Self {
            transport,
            hints,
            config,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Returns the root hints.
    pub fn hints(&self) -> &RootHints {
        &self.hints
    }

    /// Returns the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolves `name` with the configured hop budget.
    pub async fn resolve(&self, name: &Name) -> Result<Answer> {
        self.resolve_with_budget(name, self.config.max_hops).await
    }

    /// Resolves `name` with an explicit hop budget.
    pub async fn resolve_with_budget(&self, name: &Name, hop_budget: u32) -> Result<Answer> {
        self.resolve_traced_with_budget(name, hop_budget)
            .await
            .outcome
    }

    /// Resolves `name` and keeps the per-hop trace.
    pub async fn resolve_traced(&self, name: &Name) -> Resolution {
        self.resolve_traced_with_budget(name, self.config.max_hops)
            .await
    }

    /// Resolves `name` under `hop_budget` and keeps the per-hop trace.
    #[instrument(skip(self, name), fields(qname = %name))]
    pub async fn resolve_traced_with_budget(&self, name: &Name, hop_budget: u32) -> Resolution {
        let timer = ResolutionTimer::start();
        let mut session = Session {
            selector: NameserverSelector::new(self.config.seed),
            deadline: self.config.deadline.map(|d| Instant::now() + d),
            trace: Vec::new(),
        };

        let walk = self.walk(&mut session, name.clone(), hop_budget, &[]).await;

        let elapsed = match &walk.result {
            Ok(answer) => {
                debug!(
                    hops = walk.hops,
                    aliases = answer.chain.len(),
                    addresses = answer.rrset.len(),
                    "Resolution complete"
                );
                timer.succeed(walk.hops)
            }
            Err(e) => {
                debug!(hops = walk.hops, error = %e, "Resolution failed");
                timer.fail(e.kind().as_str())
            }
        };

        Resolution {
            query: name.clone(),
            outcome: walk.result,
            hops: walk.hops,
            trace: session.trace,
            elapsed,
        }
    }

    fn root_candidates(&self) -> Vec<SocketAddr> {
        self.hints.socket_addrs(self.config.port)
    }

    /// Runs one walk for `target`.
    ///
    /// `lineage` holds the targets of the walks waiting on this one; meeting
    /// one of them again means the hierarchy is circular.
    ///
    /// Boxed: walks nest through glueless nameserver lookups.
    fn walk<'a>(
        &'a self,
        session: &'a mut Session,
        target: Name,
        budget: u32,
        lineage: &'a [Name],
    ) -> BoxFuture<'a, Walk> {
        async move {
            let mut state = ResolutionState::new(target, budget, self.root_candidates());
            if lineage.contains(&state.target) {
                debug!(qname = %state.target, "Name is already being resolved further up");
                return Walk {
                    result: Err(ResolveError::CycleDetected {
                        name: state.target,
                        zone: state.zone,
                    }),
                    hops: 0,
                };
            }

            let result = self.run(session, &mut state, lineage).await;
            Walk {
                result,
                hops: state.hops,
            }
        }
        .boxed()
    }

    async fn run(
        &self,
        session: &mut Session,
        state: &mut ResolutionState,
        lineage: &[Name],
    ) -> Result<Answer> {
        let depth = lineage.len();

        loop {
            session.check_deadline()?;
            if state.hops >= state.budget {
                return Err(ResolveError::HopLimitExceeded {
                    name: state.target.clone(),
                    limit: state.budget,
                });
            }
            if !state
                .visited
                .insert((state.target.clone(), state.zone.clone()))
            {
                return Err(ResolveError::CycleDetected {
                    name: state.target.clone(),
                    zone: state.zone.clone(),
                });
            }
            if state.candidates.is_empty() {
                return Err(ResolveError::NoUsableDelegation {
                    zone: state.zone.clone(),
                });
            }

            trace!(
                qname = %state.target,
                zone = %state.zone,
                hop = state.hops + 1,
                candidates = state.candidates.len(),
                "Querying"
            );
            let query = Message::iterative_query(Question::a(state.target.clone()));
            let exchange = session
                .selector
                .query(
                    &self.transport,
                    &query,
                    &state.candidates,
                    self.config.query_timeout,
                    session.deadline,
                )
                .await;
            state.hops += 1;
            rootwalk_metrics::stats().record_hop();

            let exchange = match exchange {
                Ok(exchange) => exchange,
                Err(e) => {
                    let attempts = match &e {
                        ResolveError::TransportExhausted { attempted, .. } => *attempted,
                        _ => 0,
                    };
                    session.record(depth, state, None, attempts, HopOutcome::Failed {
                        reason: e.to_string(),
                    });
                    return Err(e);
                }
            };
            let server = Some(exchange.server);
            let attempts = exchange.attempts;

            let step = match interpret(&exchange.response, &state.target) {
                Ok(step) => step,
                Err(e) => {
                    session.record(depth, state, server, attempts, HopOutcome::Failed {
                        reason: e.to_string(),
                    });
                    return Err(e);
                }
            };

            match step {
                Step::Answer(rrset) => {
                    session.record(depth, state, server, attempts, HopOutcome::Answer {
                        addresses: rrset.addresses().collect(),
                    });
                    return Ok(Answer {
                        query: state.query.clone(),
                        chain: std::mem::take(&mut state.chain),
                        rrset,
                    });
                }
                Step::Alias(rrset, next) => {
                    session.record(depth, state, server, attempts, HopOutcome::Alias {
                        target: next.clone(),
                    });
                    debug!(qname = %state.target, alias = %next, "Following CNAME");
                    state.chain.push(rrset);
                    state.target = next;
                    state.zone = Name::root();
                    state.candidates = self.root_candidates();
                }
                Step::Referral {
                    zone,
                    ns,
                    additional,
                } => {
                    session.record(depth, state, server, attempts, HopOutcome::Referral {
                        zone: zone.clone(),
                        nameservers: ns.iter().map(Rrset::len).sum(),
                    });
                    debug!(qname = %state.target, zone = %zone, "Following referral");

                    let mut ancestors = lineage.to_vec();
                    ancestors.push(state.target.clone());
                    let mut sub = SubResolver {
                        engine: self,
                        session: &mut *session,
                        lineage: &ancestors,
                    };
                    let hop = next_hop(&zone, &ns, &additional, state.remaining(), &mut sub).await;
                    state.hops = state.hops.saturating_add(hop.hops);

                    let addrs = match hop.candidates {
                        Ok(addrs) => addrs,
                        // Reported against this walk's target and budget.
                        Err(ResolveError::HopLimitExceeded { .. }) => {
                            return Err(ResolveError::HopLimitExceeded {
                                name: state.target.clone(),
                                limit: state.budget,
                            });
                        }
                        Err(e) => return Err(e),
                    };
                    trace!(
                        zone = %zone,
                        via_glue = hop.via_glue,
                        candidates = addrs.len(),
                        "Next hop ready"
                    );

                    let port = self.config.port;
                    state.candidates = addrs
                        .into_iter()
                        .map(|addr| SocketAddr::from((addr, port)))
                        .collect();
                    state.zone = zone;
                }
            }
        }
    }
}

/// Resolves glueless nameserver hostnames as sub-walks of a session.
struct SubResolver<'a, T> {
    engine: &'a IterativeResolver<T>,
    session: &'a mut Session,
    lineage: &'a [Name],
}

#[async_trait]
impl<'a, T: Transport> HostResolver for SubResolver<'a, T> {
    async fn resolve_host(&mut self, host: &Name, budget: u32) -> HostLookup {
        let walk = self
            .engine
            .walk(&mut *self.session, host.clone(), budget, self.lineage)
            .await;
        HostLookup {
            addresses: walk.result.map(|answer| answer.addresses().collect()),
            hops: walk.hops,
        }
    }
}
