use std::fmt;
use std::io::Write;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::classifier::{classify, code_label};
use crate::config::{ProbeConfig, Verbosity, READ_BUFFER_SIZE};
use crate::error::ProbeError;
use crate::resolver::display_addr;
use crate::stats::Aggregator;
use crate::types::{Classification, EndpointSet, IterationResult, RunStatistics, Target};

/// Upper bound on the sample buffer pre-allocation; the buffer still grows past it.
const MAX_PRESIZE: usize = 1 << 16;

/// State of the loop once it stops, either after all iterations or on cancellation.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub requested: u64,
    pub cancelled: bool,
    pub aggregator: Aggregator,
}

impl RunOutcome {
    pub fn completed(&self) -> u64 {
        self.aggregator.count() as u64
    }

    /// Errors with `ProbeError::InsufficientData` when no iteration completed.
    pub fn statistics(&self) -> Result<RunStatistics, ProbeError> {
        self.aggregator.finalize()
    }
}

/// What one exchange produced so far. Survives a deadline expiry.
#[derive(Debug, Default)]
struct Exchange {
    classification: Option<Classification>,
    bytes_read: u64,
}

/// Probe the target `config.repeat` times, strictly one connection at a time.
///
/// Cancelling `cancel` abandons the in-flight iteration (it is not recorded) and
/// returns what was collected so far.
pub async fn run_probe<W: Write>(
    target: &Target,
    endpoints: &EndpointSet,
    config: &ProbeConfig,
    cancel: &CancellationToken,
    out: &mut W,
) -> RunOutcome {
    let presize = usize::try_from(config.repeat).unwrap_or(MAX_PRESIZE).min(MAX_PRESIZE);
    let mut aggregator = Aggregator::with_capacity(presize);
    let mut cancelled = false;

    if config.verbosity.is_verbose() {
        emit(out, format_args!("Starting test... (repeat={})\n", config.repeat));
    }

    for run in 1..=config.repeat {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            r = run_iteration(target, endpoints, config, &mut *out) => Some(r),
        };
        let Some(result) = result else {
            tracing::info!(completed = run - 1, requested = config.repeat, "probe run cancelled");
            cancelled = true;
            break;
        };

        aggregator.record(&result);
        if config.verbosity.is_verbose() {
            emit(
                out,
                format_args!(
                    "Run #{}: {:.3} ms (success={})\n",
                    run, result.elapsed_ms, result.success
                ),
            );
        }
        if let Err(e) = Write::flush(out) {
            tracing::debug!(error = %e, "flush failed");
        }
    }

    RunOutcome {
        requested: config.repeat,
        cancelled,
        aggregator,
    }
}

/// One connect, send, drain cycle. Never fails: connection problems become a failed result.
///
/// The timer covers connect, send and the full read, not resolution.
pub async fn run_iteration<W: Write>(
    target: &Target,
    endpoints: &EndpointSet,
    config: &ProbeConfig,
    out: &mut W,
) -> IterationResult {
    let request = target.request_header();
    let mut exchange = Exchange::default();

    let start = Instant::now();
    let res = time::timeout(
        config.timeout,
        exchange_once(endpoints, request.as_bytes(), config.verbosity, &mut exchange, out),
    )
    .await;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1e3;

    let completed = match res {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::debug!(error = %e, "iteration failed");
            false
        }
        Err(_) => {
            tracing::warn!(timeout = ?config.timeout, "iteration deadline exceeded");
            false
        }
    };

    let classification = exchange.classification.unwrap_or(Classification::UNKNOWN);
    let result = IterationResult {
        elapsed_ms,
        success: completed && classification.success,
        status_code: classification.code,
        body_size_bytes: exchange.bytes_read,
    };
    tracing::debug!(?result, "iteration finished");
    result
}

async fn exchange_once<W: Write>(
    endpoints: &EndpointSet,
    request: &[u8],
    verbosity: Verbosity,
    exchange: &mut Exchange,
    out: &mut W,
) -> Result<(), ProbeError> {
    let mut stream = connect_any(endpoints).await?;

    stream
        .write_all(request)
        .await
        .map_err(|e| ProbeError::Connection(format!("failed to send request: {e}")))?;

    let mut buf = [0u8; READ_BUFFER_SIZE];
    loop {
        let n = match stream.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                tracing::debug!(error = %e, "read ended with error");
                break;
            }
        };
        let chunk = &buf[..n];
        exchange.bytes_read += n as u64;

        if verbosity.is_verbose() {
            if let Err(e) = Write::write_all(out, chunk) {
                tracing::debug!(error = %e, "output write failed");
            }
        }
        if exchange.classification.is_none() {
            let c = classify(chunk);
            if !c.success && !verbosity.is_verbose() {
                emit(out, format_args!("Code: {}\n", code_label(c.code)));
            }
            exchange.classification = Some(c);
        }
    }
    Ok(())
}

/// Try each endpoint in order, moving on after a failed connect. No retries.
async fn connect_any(endpoints: &EndpointSet) -> Result<TcpStream, ProbeError> {
    for addr in endpoints.iter() {
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                tracing::debug!(addr = %display_addr(addr), "connected");
                return Ok(stream);
            }
            Err(e) => {
                tracing::debug!(addr = %display_addr(addr), error = %e, "connect failed");
            }
        }
    }
    Err(ProbeError::Connection(format!(
        "all {} endpoint(s) refused or unreachable",
        endpoints.len()
    )))
}

fn emit<W: Write>(out: &mut W, args: fmt::Arguments<'_>) {
    if let Err(e) = out.write_fmt(args) {
        tracing::debug!(error = %e, "output write failed");
    }
}
