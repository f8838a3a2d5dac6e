use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Host and path derived from the user-supplied URL, plus the port to connect on.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub hostname: String,
    pub path: String,
    pub port: u16,
}

impl Target {
    /// The single request sent per iteration.
    pub fn request_header(&self) -> String {
        format!(
            "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
            self.path, self.hostname
        )
    }
}

/// Candidate addresses for a target, in resolver order. Resolved once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSet {
    addrs: Vec<SocketAddr>,
}

impl EndpointSet {
    pub fn new(addrs: Vec<SocketAddr>) -> Self {
        Self { addrs }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SocketAddr> {
        self.addrs.iter()
    }

    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }
}

/// Outcome of the status-line check on the first response chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub success: bool,
    pub code: Option<u32>,
}

impl Classification {
    pub const UNKNOWN: Classification = Classification { success: false, code: None };
}

/// One probe cycle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct IterationResult {
    pub elapsed_ms: f64,
    pub success: bool,
    pub status_code: Option<u32>,
    pub body_size_bytes: u64,
}

/// Finalized aggregate over every recorded iteration.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct RunStatistics {
    pub count: u64,
    pub success_count: u64,
    pub fastest_ms: f64,
    pub slowest_ms: f64,
    pub mean_ms: f64,
    pub median_ms: f64,
    pub total_ms: f64,
    pub largest_bytes: u64,
    pub smallest_bytes: u64,
}

impl RunStatistics {
    /// Percentage of iterations classified as successful.
    pub fn success_rate(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.success_count as f64 * 100.0 / self.count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_header_is_fixed_form() {
        let t = Target { hostname: "example.com".into(), path: "/a/b".into(), port: 80 };
        assert_eq!(
            t.request_header(),
            "GET /a/b HTTP/1.1\r\nHost: example.com\r\nConnection: close\r\n\r\n"
        );
    }
}
