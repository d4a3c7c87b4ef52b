//! # Protocol generations
//!
//! The gateway has shipped two mutually incompatible generations of the header-signing protocol. They share the
//! canonical string layout (`timestamp|host|target_api|merchant_id|api_key`) and the HMAC-SHA256 / SHA-256 primitives,
//! but differ in how every one of the inputs and outputs is rendered:
//!
//! | | `V1` (legacy) | `V2` (current) |
//! |---|---|---|
//! | timestamp | `2026-02-09T07:47:49Z` | `Mon, 09 Feb 2026 07:47:49 GMT` |
//! | host | as configured | scheme-qualified |
//! | target api | `/path` | `POST /path` |
//! | signature | lowercase hex | base64 |
//! | digest | lowercase hex | `SHA-256=` + base64 |
//!
//! Exactly one generation is active for a given configuration. Mixing them between signer and verifier is a protocol
//! break, so nothing in this crate ever falls back from one to the other.
use std::{fmt::Display, net::IpAddr, str::FromStr};

use chrono::{DateTime, NaiveDateTime, Utc};

pub const ISO_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
pub const GMT_TIMESTAMP_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";
pub const DIGEST_PREFIX: &str = "SHA-256=";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProtocolVersion {
    /// Hex encodings, ISO-8601 timestamps, bare host and path-only target.
    V1,
    /// Base64 encodings, RFC-1123 timestamps, scheme-qualified host and method-prefixed target.
    #[default]
    V2,
}

impl ProtocolVersion {
    fn timestamp_format(&self) -> &'static str {
        match self {
            Self::V1 => ISO_TIMESTAMP_FORMAT,
            Self::V2 => GMT_TIMESTAMP_FORMAT,
        }
    }

    pub fn format_timestamp(&self, at: DateTime<Utc>) -> String {
        at.format(self.timestamp_format()).to_string()
    }

    /// Parses a timestamp header. Only the exact format of this generation is accepted.
    pub fn parse_timestamp(&self, value: &str) -> Result<DateTime<Utc>, String> {
        NaiveDateTime::parse_from_str(value.trim(), self.timestamp_format())
            .map(|naive| naive.and_utc())
            .map_err(|e| format!("'{value}' is not a valid {self} timestamp. {e}"))
    }

    /// The value that goes into the `host` slot of the signature string.
    pub fn signing_host(&self, configured_host: &str) -> String {
        match self {
            Self::V1 => configured_host.to_string(),
            Self::V2 => qualify_host(configured_host),
        }
    }

    /// The value that goes into the `target_api` slot of the signature string.
    pub fn target_api(&self, method: &str, path: &str) -> String {
        match self {
            Self::V1 => path.to_string(),
            Self::V2 => format!("{} {path}", method.to_ascii_uppercase()),
        }
    }

    pub fn encode_signature(&self, mac: &[u8]) -> String {
        match self {
            Self::V1 => hex::encode(mac),
            Self::V2 => base64::encode(mac),
        }
    }

    pub fn encode_digest(&self, hash: &[u8]) -> String {
        match self {
            Self::V1 => hex::encode(hash),
            Self::V2 => format!("{DIGEST_PREFIX}{}", base64::encode(hash)),
        }
    }
}

impl Display for ProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V1 => f.write_str("v1"),
            Self::V2 => f.write_str("v2"),
        }
    }
}

impl FromStr for ProtocolVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" | "1" | "legacy" => Ok(Self::V1),
            "v2" | "2" | "current" => Ok(Self::V2),
            other => Err(format!("Unknown protocol version: {other}")),
        }
    }
}

/// Adds a scheme to a bare host name. Loopback and private-range addresses get `http://`, everything else gets
/// `https://`. Hosts that already carry a scheme are returned unchanged.
pub fn qualify_host(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        return host.to_string();
    }
    let scheme = if is_local_host(host) { "http" } else { "https" };
    format!("{scheme}://{host}")
}

fn is_local_host(host: &str) -> bool {
    let name = strip_port(host);
    if name.eq_ignore_ascii_case("localhost") {
        return true;
    }
    match name.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => ip.is_loopback() || ip.is_private() || ip.is_link_local(),
        // fc00::/7 is the IPv6 unique-local range
        Ok(IpAddr::V6(ip)) => ip.is_loopback() || (ip.segments()[0] & 0xfe00) == 0xfc00,
        Err(_) => false,
    }
}

fn strip_port(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split(']').next().unwrap_or(rest);
    }
    match host.split_once(':') {
        // More than one colon means a bare IPv6 address, not host:port
        Some((name, port)) if !port.contains(':') => name,
        _ => host,
    }
}
