//! Reachability probing.
//!
//! [`Controller::ping`](crate::Controller::ping) answers the question "is
//! the gateway reachable at all?" before any tag traffic is attempted. The
//! probe itself is a platform concern, so it sits behind the [`Prober`]
//! trait; the default [`SystemProber`] sends one ICMP echo through the
//! operating system's `ping` utility (raw ICMP sockets need elevated
//! privileges, the system binary carries them already). Tests substitute a
//! canned prober via [`Controller::set_prober`](crate::Controller::set_prober).

use std::process::Command;
use std::time::{Duration, Instant};

/// Result of a single reachability probe.
///
/// Consumed read-only for diagnostics; only [`success`](ProbeReport::success)
/// participates in the `ping` return contract.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    /// Address that was probed.
    pub address: String,
    /// Round-trip time, when the reply carried one.
    pub round_trip: Option<Duration>,
    /// Time-to-live of the reply, when reported.
    pub ttl: Option<u32>,
    /// Whether the probe was sent with the don't-fragment flag.
    pub dont_fragment: bool,
    /// Payload size in bytes, when reported.
    pub bytes: usize,
    /// Whether an echo reply arrived.
    pub success: bool,
}

impl ProbeReport {
    /// Builds a failed report for an address (nothing came back).
    pub fn failed(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            round_trip: None,
            ttl: None,
            dont_fragment: false,
            bytes: 0,
            success: false,
        }
    }
}

impl std::fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.success {
            write!(f, "Reply from {}: bytes={}", self.address, self.bytes)?;
            match self.round_trip {
                Some(rtt) => write!(f, " time={:.1}ms", rtt.as_secs_f64() * 1000.0)?,
                None => write!(f, " time=?")?,
            }
            match self.ttl {
                Some(ttl) => write!(f, " TTL={ttl}"),
                None => write!(f, " TTL=?"),
            }
        } else {
            write!(f, "Request to {} timed out", self.address)
        }
    }
}

/// Sends one reachability probe to a host.
pub trait Prober {
    /// Probes `host` once, waiting at most `timeout` for a reply.
    fn probe(&self, host: &str, timeout: Duration) -> ProbeReport;
}

/// Default [`Prober`] backed by the platform `ping` utility.
#[derive(Debug, Default)]
pub struct SystemProber;

impl Prober for SystemProber {
    fn probe(&self, host: &str, timeout: Duration) -> ProbeReport {
        let started = Instant::now();
        let output = ping_command(host, timeout).output();
        let Ok(output) = output else {
            return ProbeReport::failed(host);
        };
        let text = String::from_utf8_lossy(&output.stdout);
        ProbeReport {
            address: host.to_string(),
            round_trip: parse_time_ms(&text).or_else(|| {
                output.status.success().then(|| started.elapsed())
            }),
            ttl: parse_ttl(&text),
            dont_fragment: false,
            bytes: parse_bytes(&text),
            success: output.status.success(),
        }
    }
}

#[cfg(target_os = "windows")]
fn ping_command(host: &str, timeout: Duration) -> Command {
    let wait = timeout.as_millis().max(1).to_string();
    let mut cmd = Command::new("ping");
    cmd.args(["-n", "1", "-w", wait.as_str()]);
    cmd.arg(host);
    cmd
}

#[cfg(not(target_os = "windows"))]
fn ping_command(host: &str, timeout: Duration) -> Command {
    let wait = timeout.as_secs().max(1).to_string();
    let mut cmd = Command::new("ping");
    cmd.args(["-c", "1", "-W", wait.as_str()]);
    cmd.arg(host);
    cmd
}

/// Extracts `ttl=N` (any case) from ping output.
fn parse_ttl(text: &str) -> Option<u32> {
    scan_field(text, "ttl=")?.parse().ok()
}

/// Extracts `time=N.Nms` from ping output.
fn parse_time_ms(text: &str) -> Option<Duration> {
    let field = scan_field(text, "time=")?;
    let digits: String = field
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let ms: f64 = digits.parse().ok()?;
    Some(Duration::from_secs_f64(ms / 1000.0))
}

/// Extracts the payload size from a `N bytes from ...` reply line.
fn parse_bytes(text: &str) -> usize {
    for line in text.lines() {
        if let Some(pos) = line.find(" bytes from ") {
            if let Ok(n) = line[..pos].trim().parse() {
                return n;
            }
        }
    }
    0
}

fn scan_field<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    let lower = text.to_ascii_lowercase();
    let start = lower.find(key)? + key.len();
    let rest = &text[start..];
    let end = rest
        .find(|c: char| c.is_whitespace())
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINUX_REPLY: &str = "PING 10.0.0.1 (10.0.0.1) 56(84) bytes of data.\n\
        64 bytes from 10.0.0.1: icmp_seq=1 ttl=64 time=0.482 ms\n";

    #[test]
    fn test_parse_ttl() {
        assert_eq!(parse_ttl(LINUX_REPLY), Some(64));
        assert_eq!(parse_ttl("no reply"), None);
    }

    #[test]
    fn test_parse_time() {
        let rtt = parse_time_ms(LINUX_REPLY).unwrap();
        assert!((rtt.as_secs_f64() - 0.000_482).abs() < 1e-9);
    }

    #[test]
    fn test_parse_bytes() {
        assert_eq!(parse_bytes(LINUX_REPLY), 64);
        assert_eq!(parse_bytes("garbage"), 0);
    }

    #[test]
    fn test_report_display() {
        let report = ProbeReport {
            address: "10.0.0.1".to_string(),
            round_trip: Some(Duration::from_millis(2)),
            ttl: Some(64),
            dont_fragment: false,
            bytes: 32,
            success: true,
        };
        assert_eq!(report.to_string(), "Reply from 10.0.0.1: bytes=32 time=2.0ms TTL=64");

        let failed = ProbeReport::failed("10.0.0.9");
        assert_eq!(failed.to_string(), "Request to 10.0.0.9 timed out");
    }
}
