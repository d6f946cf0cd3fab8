//! Field extraction from the speed test's human-readable report

use std::sync::LazyLock;

use regex::Regex;

use crate::model::PerformanceReport;

static LATENCY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Latency:\s+(.*?)\s").unwrap());
static JITTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Latency:.*?jitter:\s+(.*?)ms").unwrap());
static DOWNLOAD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Download:\s+(.*?)\s").unwrap());
static UPLOAD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Upload:\s+(.*?)\s").unwrap());

fn first_capture(pattern: &Regex, report: &str) -> Option<String> {
    pattern
        .captures(report)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Best-effort extraction; each quantity is looked up on its own.
///
/// Jitter must sit on the same line as the first `Latency:` label.
pub fn parse_report(report: &str) -> PerformanceReport {
    PerformanceReport {
        ping_ms: first_capture(&LATENCY, report),
        download_mbps: first_capture(&DOWNLOAD, report),
        upload_mbps: first_capture(&UPLOAD, report),
        jitter_ms: first_capture(&JITTER, report),
    }
}
