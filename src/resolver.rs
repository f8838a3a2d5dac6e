use crate::config::{MAX_HOST_LEN, MAX_PATH_LEN};
use crate::error::ProbeError;
use crate::types::{EndpointSet, Target};
use std::net::SocketAddr;

const SCHEMES: &[&str] = &["http://", "https://"];

/// Split a raw URL into a `Target`.
///
/// - strips a literal `http://` or `https://` prefix (case-sensitive, position 0 only)
/// - everything before the first `/` is the hostname, the rest (slash included) is the path
/// - no `/` yields path `/`
///
/// Errors with `ProbeError::Configuration` on an empty or oversized hostname or path.
pub fn parse_target(raw: &str, port: u16) -> Result<Target, ProbeError> {
    let rest = SCHEMES
        .iter()
        .find_map(|scheme| raw.strip_prefix(*scheme))
        .unwrap_or(raw);

    let (hostname, path) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => (rest, "/"),
    };

    if hostname.is_empty() {
        return Err(ProbeError::Configuration(format!("no hostname in url: {raw}")));
    }
    if hostname.len() > MAX_HOST_LEN {
        return Err(ProbeError::Configuration(format!(
            "hostname exceeds {MAX_HOST_LEN} bytes"
        )));
    }
    if path.len() > MAX_PATH_LEN {
        return Err(ProbeError::Configuration(format!("path exceeds {MAX_PATH_LEN} bytes")));
    }

    Ok(Target {
        hostname: hostname.to_string(),
        path: path.to_string(),
        port,
    })
}

/// Resolve the target's hostname to every IPv4/IPv6 address, in resolver order.
///
/// Zero addresses is an error: a run never proceeds without endpoints.
pub async fn resolve(target: &Target) -> Result<EndpointSet, ProbeError> {
    let host = lookup_name(&target.hostname);
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, target.port))
        .await
        .map_err(|e| ProbeError::Resolution {
            host: target.hostname.clone(),
            reason: e.to_string(),
        })?
        .collect();

    if addrs.is_empty() {
        return Err(ProbeError::Resolution {
            host: target.hostname.clone(),
            reason: "no addresses returned".into(),
        });
    }

    tracing::info!(host = %target.hostname, count = addrs.len(), "resolved target");
    for addr in &addrs {
        tracing::debug!(addr = %display_addr(addr), "candidate endpoint");
    }
    Ok(EndpointSet::new(addrs))
}

/// Parse the raw URL and resolve it in one step.
pub async fn resolve_url(raw: &str, port: u16) -> Result<(Target, EndpointSet), ProbeError> {
    let target = parse_target(raw, port)?;
    let endpoints = resolve(&target).await?;
    Ok((target, endpoints))
}

/// Human-readable form of a resolved address, without the port.
pub fn display_addr(addr: &SocketAddr) -> String {
    match addr {
        SocketAddr::V4(v4) => v4.ip().to_string(),
        SocketAddr::V6(v6) => format!("[{}]", v6.ip()),
    }
}

/// `[::1]` is how an IPv6 literal appears in a URL; the resolver wants it bare.
fn lookup_name(hostname: &str) -> &str {
    hostname
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(hostname)
}
