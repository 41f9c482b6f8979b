//! Choosing which nameserver answers a hop.
//!
//! Candidates are tried in a shuffled order so that load spreads across a
//! zone's servers instead of always landing on the first one listed. The
//! shuffle comes from a seedable RNG: with a fixed seed the attempt order,
//! and therefore the whole walk, is reproducible.

use crate::transport::Transport;
use crate::{ResolveError, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rootwalk_proto::{Message, Name};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// A usable response and the server that produced it.
#[derive(Debug, Clone)]
pub struct Exchange {
    /// The server that answered.
    pub server: SocketAddr,
    /// The response.
    pub response: Message,
    /// Attempts made, including the successful one.
    pub attempts: usize,
}

/// Tries a hop's candidates in randomized order until one answers.
#[derive(Debug)]
pub struct NameserverSelector {
    rng: StdRng,
}

impl NameserverSelector {
    /// Creates a selector. `None` seeds from entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Returns the candidates in the order they will be tried.
    pub fn order(&mut self, candidates: &[SocketAddr]) -> Vec<SocketAddr> {
        let mut order = candidates.to_vec();
        order.shuffle(&mut self.rng);
        order
    }

    /// Sends `query` to the candidates one at a time.
    ///
    /// A transport failure or a response whose rcode is neither NOERROR nor
    /// NXDOMAIN moves on to the next candidate. Each attempt waits at most
    /// `timeout`, shortened so that it never outlives `deadline`.
    pub async fn query<T: Transport + ?Sized>(
        &mut self,
        transport: &T,
        query: &Message,
        candidates: &[SocketAddr],
        timeout: Duration,
        deadline: Option<Instant>,
    ) -> Result<Exchange> {
        let order = self.order(candidates);
        let name = query
            .question()
            .map(|q| q.qname.clone())
            .unwrap_or_else(Name::root);

        for (attempt, server) in order.iter().copied().enumerate() {
            let limit = match deadline {
                Some(deadline) => {
                    let left = deadline.saturating_duration_since(Instant::now());
                    if left.is_zero() {
                        return Err(ResolveError::DeadlineExceeded);
                    }
                    left.min(timeout)
                }
                None => timeout,
            };

            trace!(server = %server, qname = %name, attempt, "Sending query");
            match transport.send(query, server, limit).await {
                Ok(response) if response.rcode().is_usable() => {
                    return Ok(Exchange {
                        server,
                        response,
                        attempts: attempt + 1,
                    });
                }
                Ok(response) => {
                    debug!(server = %server, rcode = %response.rcode(), "Unusable response, trying next server");
                    rootwalk_metrics::stats().record_transport_failure("rcode");
                }
                Err(e) => {
                    debug!(server = %server, error = %e, "Query failed, trying next server");
                    rootwalk_metrics::stats().record_transport_failure(e.label());
                }
            }
        }

        Err(ResolveError::TransportExhausted {
            name,
            attempted: order.len(),
        })
    }
}
