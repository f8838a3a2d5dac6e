use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reprobe::config::{ProbeConfig, Verbosity, DEFAULT_PORT};
use reprobe::error::ProbeError;
use reprobe::report::{render_summary, write_report_json, RunReport};
use reprobe::prober::run_probe;
use reprobe::resolver::{display_addr, resolve_url};

/// reprobe — send the same HTTP request N times and report latency, size and success rate.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "reprobe",
    version,
    about = "Send the same plain-HTTP GET request repeatedly and report latency, size and success rate.",
    long_about = None
)]
struct Cli {
    /// Web address, with or without http:// or https:// (TLS is never spoken).
    #[arg(short = 'u', long)]
    url: String,

    /// Number of requests to send, one after another.
    #[arg(
        short = 'p',
        long = "profile",
        visible_alias = "repeat",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    profile: u64,

    /// TCP port to connect to.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Per-request deadline in milliseconds, covering connect, send and full read.
    #[arg(long = "timeout-ms", default_value_t = 30_000, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_ms: u64,

    /// Echo every response and a line per run.
    #[arg(long, overrides_with = "brief")]
    verbose: bool,

    /// Only print the status code of non-200 responses (default).
    #[arg(long, overrides_with = "verbose")]
    brief: bool,

    /// Write the final report as pretty JSON to this path (optional).
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Cli {
    fn probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            repeat: self.profile,
            port: self.port,
            timeout: Duration::from_millis(self.timeout_ms),
            verbosity: if self.verbose && !self.brief {
                Verbosity::Verbose
            } else {
                Verbosity::Brief
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.probe_config();
    init_tracing(config.verbosity);

    // Configuration errors end the process with usage before any network work.
    if let Err(e) = config.validate() {
        Cli::command().error(ErrorKind::ValueValidation, e).exit();
    }
    let (target, endpoints) = match resolve_url(&cli.url, config.port).await {
        Ok(resolved) => resolved,
        Err(e @ ProbeError::Configuration(_)) => {
            Cli::command().error(ErrorKind::ValueValidation, e).exit()
        }
        Err(e) => {
            return Err(e).with_context(|| format!("cannot get address info for url = {}", cli.url))
        }
    };
    if config.verbosity.is_verbose() {
        for addr in endpoints.iter() {
            println!("Resolved {} -> {}", target.hostname, display_addr(addr));
        }
    }

    // Ctrl-C stops the loop and reports what completed.
    let cancel = CancellationToken::new();
    let cancel_ctrlc = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_ctrlc.cancel();
        }
    });

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let outcome = run_probe(&target, &endpoints, &config, &cancel, &mut out).await;
    drop(out);

    let stats = outcome.statistics().context("nothing to report")?;
    print!("{}", render_summary(&cli.url, &stats));
    if outcome.cancelled {
        eprintln!(
            "Interrupted: {} of {} requests completed",
            outcome.completed(),
            outcome.requested
        );
    }

    if let Some(path) = cli.output.as_deref() {
        let report = RunReport::new(&cli.url, outcome.requested, outcome.cancelled, stats);
        if let Err(e) = write_report_json(path, &report) {
            eprintln!("Failed to write JSON to {}: {}", path.display(), e);
        } else {
            println!("Wrote JSON report to {}", path.display());
        }
    }

    Ok(())
}

fn init_tracing(verbosity: Verbosity) {
    let default_directive = match verbosity {
        Verbosity::Verbose => "reprobe=debug",
        Verbosity::Brief => "reprobe=warn",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
