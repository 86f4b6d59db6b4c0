//! Indicator types and detection results

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinds of indicator the detector recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorType {
    /// IPv4 address
    Ipv4,
    /// IPv6 address
    Ipv6,
    /// Bare domain name
    Domain,
    /// http(s)/ftp URL
    Url,
    /// MD5 hash (32 hex chars)
    Md5,
    /// SHA1 hash (40 hex chars)
    Sha1,
    /// SHA256 hash (64 hex chars)
    Sha256,
    /// Email address
    Email,
    /// CVE identifier
    Cve,
    /// Bitcoin address (legacy or bech32)
    Bitcoin,
    /// Ethereum address
    Ethereum,
}

impl IndicatorType {
    /// All indicator types in declaration order.
    pub const ALL: [IndicatorType; 11] = [
        IndicatorType::Ipv4,
        IndicatorType::Ipv6,
        IndicatorType::Domain,
        IndicatorType::Url,
        IndicatorType::Md5,
        IndicatorType::Sha1,
        IndicatorType::Sha256,
        IndicatorType::Email,
        IndicatorType::Cve,
        IndicatorType::Bitcoin,
        IndicatorType::Ethereum,
    ];

    /// Scan order. Earlier types claim their text before later ones.
    ///
    /// URL and Email go first because they embed domain-shaped text; hashes
    /// go longest first; Domain comes after everything that can look like one.
    pub const PRECEDENCE: [IndicatorType; 11] = [
        IndicatorType::Url,
        IndicatorType::Email,
        IndicatorType::Ipv4,
        IndicatorType::Ipv6,
        IndicatorType::Sha256,
        IndicatorType::Sha1,
        IndicatorType::Md5,
        IndicatorType::Domain,
        IndicatorType::Cve,
        IndicatorType::Bitcoin,
        IndicatorType::Ethereum,
    ];

    /// Stable lowercase name, used in cache keys and JSON output
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorType::Ipv4 => "ipv4",
            IndicatorType::Ipv6 => "ipv6",
            IndicatorType::Domain => "domain",
            IndicatorType::Url => "url",
            IndicatorType::Md5 => "md5",
            IndicatorType::Sha1 => "sha1",
            IndicatorType::Sha256 => "sha256",
            IndicatorType::Email => "email",
            IndicatorType::Cve => "cve",
            IndicatorType::Bitcoin => "bitcoin",
            IndicatorType::Ethereum => "ethereum",
        }
    }

    /// Human-readable label for pretty output
    pub fn label(&self) -> &'static str {
        match self {
            IndicatorType::Ipv4 => "IPv4",
            IndicatorType::Ipv6 => "IPv6",
            IndicatorType::Domain => "Domain",
            IndicatorType::Url => "URL",
            IndicatorType::Md5 => "MD5",
            IndicatorType::Sha1 => "SHA1",
            IndicatorType::Sha256 => "SHA256",
            IndicatorType::Email => "Email",
            IndicatorType::Cve => "CVE",
            IndicatorType::Bitcoin => "Bitcoin",
            IndicatorType::Ethereum => "Ethereum",
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown indicator type name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown indicator type: {0}")]
pub struct UnknownIndicatorType(pub String);

impl FromStr for IndicatorType {
    type Err = UnknownIndicatorType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        IndicatorType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| UnknownIndicatorType(s.to_string()))
    }
}

/// Half-open byte range `[start, end)` into the scanned text.
///
/// Offsets always fall on UTF-8 char boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub start: usize,
    pub end: usize,
}

impl Position {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Half-open interval overlap test
    pub fn overlaps(&self, other: &Position) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True when `offset` lies inside this range
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A typed indicator found in a piece of text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedIndicator {
    #[serde(rename = "type")]
    pub indicator_type: IndicatorType,
    pub value: String,
    pub position: Position,
}
