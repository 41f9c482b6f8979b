//! Presentation of a finished resolution.

use console::style;
use rootwalk_metrics::StatsSnapshot;
use rootwalk_proto::Name;
use rootwalk_resolver::{Answer, FailureKind, Hop, Resolution};
use serde::Serialize;
use std::fmt::{self, Write};
use std::net::Ipv4Addr;

/// Renders a resolution in a dig-like layout.
pub fn text(resolution: &Resolution, show_trace: bool) -> Result<String, fmt::Error> {
    let mut out = String::new();

    if show_trace {
        writeln!(out, "{}", style(";; TRACE").cyan().bold())?;
        for hop in &resolution.trace {
            writeln!(out, ";  {hop}")?;
        }
        out.push('\n');
    }

    writeln!(out, "{}", style(";; QUESTION").cyan().bold())?;
    writeln!(out, ";{}\t\tIN\tA", resolution.query)?;
    out.push('\n');

    match &resolution.outcome {
        Ok(answer) => {
            writeln!(out, "{}", style(";; ANSWER").green().bold())?;
            for record in answer.to_message().answers() {
                writeln!(out, "{record}")?;
            }
        }
        Err(e) => {
            writeln!(
                out,
                "{} {}: {}",
                style(";; FAILED").red().bold(),
                style(e.kind()).red(),
                e
            )?;
        }
    }

    out.push('\n');
    writeln!(
        out,
        "{}",
        style(format!(
            ";; {} {}, {} ms",
            resolution.hops,
            if resolution.hops == 1 { "hop" } else { "hops" },
            resolution.elapsed.as_millis()
        ))
        .dim()
    )?;
    Ok(out)
}

/// Machine-readable form of a resolution.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub query: &'a Name,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<AnswerReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
    pub hops: u32,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<&'a [Hop]>,
    /// Process counters, filled in by the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatsSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct AnswerReport {
    /// Last name of the alias chain.
    pub canonical_name: Name,
    pub addresses: Vec<Ipv4Addr>,
    pub ttl: u32,
    pub aliases: Vec<AliasReport>,
}

#[derive(Debug, Serialize)]
pub struct AliasReport {
    pub name: Name,
    pub target: Name,
}

#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&Answer> for AnswerReport {
    fn from(answer: &Answer) -> Self {
        Self {
            canonical_name: answer.terminal_name().clone(),
            addresses: answer.addresses().collect(),
            ttl: answer.rrset.ttl(),
            aliases: answer
                .chain
                .iter()
                .flat_map(|set| {
                    set.cname_targets().map(|target| AliasReport {
                        name: set.owner().clone(),
                        target: target.clone(),
                    })
                })
                .collect(),
        }
    }
}

/// Builds the JSON report; the trace is included only when asked for.
pub fn report(resolution: &Resolution, show_trace: bool) -> Report<'_> {
    let (status, answer, error) = match &resolution.outcome {
        Ok(answer) => ("ok", Some(AnswerReport::from(answer)), None),
        Err(e) => (
            "failed",
            None,
            Some(ErrorReport {
                kind: e.kind(),
                message: e.to_string(),
            }),
        ),
    };

    Report {
        query: &resolution.query,
        status,
        answer,
        error,
        hops: resolution.hops,
        elapsed_ms: u64::try_from(resolution.elapsed.as_millis()).unwrap_or(u64::MAX),
        trace: show_trace.then_some(resolution.trace.as_slice()),
        stats: None,
    }
}

impl Report<'_> {
    /// Attaches a counter snapshot.
    pub fn with_stats(mut self, stats: StatsSnapshot) -> Self {
        self.stats = Some(stats);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rootwalk_proto::{ResourceRecord, Rrset};
    use rootwalk_resolver::{HopOutcome, ResolveError};
    use std::str::FromStr;
    use std::time::Duration;

    fn name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    fn success() -> Resolution {
        let answer = Answer {
            query: name("alias.example.com"),
            chain: Rrset::group(&[ResourceRecord::cname(
                name("alias.example.com"),
                300,
                name("real.example.com"),
            )]),
            rrset: Rrset::group(&[ResourceRecord::a(
                name("real.example.com"),
                60,
                Ipv4Addr::new(198, 51, 100, 7),
            )])
            .remove(0),
        };
        Resolution {
            query: name("alias.example.com"),
            outcome: Ok(answer),
            hops: 6,
            trace: vec![Hop {
                depth: 0,
                target: name("alias.example.com"),
                zone: Name::root(),
                server: Some("198.41.0.4:53".parse().unwrap()),
                attempts: 1,
                outcome: HopOutcome::Referral {
                    zone: name("com"),
                    nameservers: 13,
                },
            }],
            elapsed: Duration::from_millis(42),
        }
    }

    fn failure() -> Resolution {
        Resolution {
            query: name("missing.example.com"),
            outcome: Err(ResolveError::NameNotFound {
                name: name("missing.example.com"),
            }),
            hops: 3,
            trace: Vec::new(),
            elapsed: Duration::from_millis(7),
        }
    }

    #[test]
    fn test_text_answer() {
        let out = text(&success(), false).unwrap();
        assert!(out.contains(";alias.example.com."));
        assert!(out.contains("CNAME"));
        assert!(out.contains("198.51.100.7"));
        assert!(out.contains("6 hops, 42 ms"));
        assert!(!out.contains("TRACE"));
    }

    #[test]
    fn test_text_trace() {
        let out = text(&success(), true).unwrap();
        assert!(out.contains("TRACE"));
        assert!(out.contains("referral to com."));
    }

    #[test]
    fn test_text_failure() {
        let out = text(&failure(), false).unwrap();
        assert!(out.contains("FAILED"));
        assert!(out.contains("name_not_found"));
        assert!(out.contains("3 hops"));
    }

    #[test]
    fn test_json_success() {
        let value = serde_json::to_value(report(&success(), false)).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["answer"]["canonical_name"], "real.example.com.");
        assert_eq!(value["answer"]["addresses"][0], "198.51.100.7");
        assert_eq!(value["answer"]["aliases"][0]["target"], "real.example.com.");
        assert_eq!(value["hops"], 6);
        assert!(value.get("trace").is_none());
        assert!(value.get("error").is_none());
        assert!(value.get("stats").is_none());
    }

    #[test]
    fn test_json_failure_with_trace() {
        let value = serde_json::to_value(report(&failure(), true)).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["error"]["kind"], "name_not_found");
        assert_eq!(value["trace"], serde_json::json!([]));
    }

    #[test]
    fn test_json_with_stats() {
        let stats = StatsSnapshot {
            resolutions_total: 1,
            resolutions_failed: 1,
            hops_total: 3,
            ..StatsSnapshot::default()
        };
        let value = serde_json::to_value(report(&failure(), false).with_stats(stats)).unwrap();
        assert_eq!(value["stats"]["resolutions_total"], 1);
        assert_eq!(value["stats"]["hops_total"], 3);
        assert_eq!(value["stats"]["sub_resolutions_total"], 0);
    }
}
