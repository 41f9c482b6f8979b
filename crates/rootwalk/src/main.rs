//! rootwalk
//!
//! Resolves the IPv4 addresses of a name by walking the DNS delegation tree
//! from the root servers, one non-recursive query at a time.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use rootwalk_config::{Config, find_config_file};
use rootwalk_metrics::tracing_setup::{LogFormat, init_tracing};
use rootwalk_proto::Name;
use rootwalk_resolver::IterativeResolver;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

mod render;

/// Exit code for a resolution that ran and failed.
const EXIT_RESOLUTION_FAILED: u8 = 1;

/// Exit code for bad input or configuration (clap uses it for usage errors).
const EXIT_USAGE: u8 = 2;

/// Iterative DNS resolver: walks from the root hints to an A record
#[derive(Parser, Debug)]
#[command(name = "rootwalk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Domain name to resolve
    #[arg(value_name = "NAME")]
    name: String,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "ROOTWALK_CONFIG")]
    config: Option<PathBuf>,

    /// Hop budget for the whole resolution
    #[arg(long, value_name = "N")]
    max_hops: Option<u32>,

    /// Seed for nameserver ordering (repeatable walks)
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Per-query timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Overall deadline in milliseconds
    #[arg(long, value_name = "MS")]
    deadline_ms: Option<u64>,

    /// Destination port for every query
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Root hints file (BIND format)
    #[arg(long, value_name = "FILE")]
    hints: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Print every hop of the walk
    #[arg(short, long)]
    trace: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the file configuration.
    fn apply(&self, config: &mut Config) {
        let resolver = &mut config.resolver;
        if let Some(max_hops) = self.max_hops {
            resolver.max_hops = max_hops;
        }
        if let Some(seed) = self.seed {
            resolver.seed = Some(seed);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            resolver.query_timeout_ms = timeout_ms;
        }
        if let Some(deadline_ms) = self.deadline_ms {
            resolver.deadline_ms = Some(deadline_ms);
        }
        if let Some(port) = self.port {
            resolver.port = port;
        }
        if let Some(hints) = &self.hints {
            resolver.root_hints = Some(hints.clone());
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}

/// Loads the configuration file, explicit or found on the search path.
fn load_config(explicit: Option<&PathBuf>) -> Result<Config> {
    let path = match explicit {
        Some(path) => Some(path.clone()),
        None => find_config_file(),
    };

    match path {
        Some(path) => Config::from_file(&path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Resolves the name and prints the result. Errors are setup failures.
async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = load_config(cli.config.as_ref())?;
    cli.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    let mut log_config = config.logging.to_log_config();
    if cli.json {
        // Keep stderr parseable alongside the JSON on stdout.
        log_config.format = LogFormat::Json;
    }
    init_tracing(&log_config);

    let name =
        Name::from_str(&cli.name).with_context(|| format!("Invalid domain name '{}'", cli.name))?;

    let hints = config
        .resolver
        .load_hints()
        .context("Failed to load root hints")?;
    debug!(servers = hints.len(), "Loaded root hints");

    let resolver = IterativeResolver::udp(Arc::new(hints), config.resolver.to_resolver_config());
    let resolution = resolver.resolve_traced(&name).await;

    if cli.json {
        let report = render::report(&resolution, cli.trace)
            .with_stats(rootwalk_metrics::stats().snapshot());
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to encode result")?
        );
    } else {
        let text = render::text(&resolution, cli.trace).context("Failed to format result")?;
        print!("{text}");
    }

    Ok(match resolution.outcome {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::from(EXIT_RESOLUTION_FAILED),
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", style("error:").red().bold(), e);
            ExitCode::from(EXIT_USAGE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["rootwalk", "example.com"]).unwrap();
        assert_eq!(cli.name, "example.com");
        assert!(cli.config.is_none());
        assert!(!cli.trace);
        assert!(!cli.json);

        let cli = Cli::try_parse_from([
            "rootwalk",
            "www.example.org",
            "--max-hops",
            "8",
            "--seed",
            "42",
            "-p",
            "5353",
            "--trace",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.max_hops, Some(8));
        assert_eq!(cli.seed, Some(42));
        assert_eq!(cli.port, Some(5353));
        assert!(cli.trace && cli.json);

        assert!(Cli::try_parse_from(["rootwalk"]).is_err());
        assert!(Cli::try_parse_from(["rootwalk", "a.test", "--max-hops", "many"]).is_err());
    }

    #[test]
    fn test_overrides_applied() {
        let cli = Cli::try_parse_from([
            "rootwalk",
            "example.com",
            "--timeout-ms",
            "750",
            "--deadline-ms",
            "3000",
            "--hints",
            "/tmp/root.hints",
            "-l",
            "debug",
        ])
        .unwrap();

        let mut config = Config::default();
        config.resolver.max_hops = 12;
        cli.apply(&mut config);

        assert_eq!(config.resolver.max_hops, 12);
        assert_eq!(config.resolver.query_timeout_ms, 750);
        assert_eq!(config.resolver.deadline_ms, Some(3000));
        assert_eq!(
            config.resolver.root_hints,
            Some(PathBuf::from("/tmp/root.hints"))
        );
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_zero_hops_rejected_by_validation() {
        let cli = Cli::try_parse_from(["rootwalk", "example.com", "--max-hops", "0"]).unwrap();
        let mut config = Config::default();
        cli.apply(&mut config);
        assert!(config.validate().is_err());
    }
}
