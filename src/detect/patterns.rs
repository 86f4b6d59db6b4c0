//! Recognition patterns and validators, one per indicator type
//!
//! `regex` has no lookaround, so most patterns consume one boundary character
//! on each side (`(?:^|[^a-zA-Z0-9])` ... `(?:[^a-zA-Z0-9]|$)`). Matches are
//! trimmed back to the indicator itself before use.
//!
//! Letter classes are spelled out in ASCII rather than using `(?i)`, which
//! folds `ſ` and the Kelvin sign onto `s` and `k` in Unicode mode.

use regex::Regex;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;

use super::types::{IndicatorType, Position};

const IPV4_OCTET: &str = r"(?:25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])";
const IPV6_GROUP: &str = r"[0-9a-fA-F]{1,4}";

/// Non-ASCII characters that fold onto ASCII letters. They never count as a
/// boundary, so `exſample.com` is not split into `ample.com`.
const FOLDS: &str = r"\x{17F}\x{212A}";

/// File extensions that make a domain-shaped token more likely a file name.
/// Heuristic only; `report.pdf.example.com` style hosts still pass.
const NON_DOMAIN_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "svg", "ico", "webp", "tif", "tiff", "pdf", "doc", "docx",
    "xls", "xlsx", "ppt", "pptx", "txt", "csv", "log", "ini", "cfg", "zip", "rar", "7z", "gz",
    "tar", "exe", "dll", "bin", "msi", "js", "css", "html", "htm", "json", "xml", "yaml", "yml",
    "mp3", "mp4", "avi", "mov", "wav",
];

/// Compiled patterns, built once on first use
struct PatternTable {
    url: Regex,
    email: Regex,
    ipv4: Regex,
    ipv6: Regex,
    sha256: Regex,
    sha1: Regex,
    md5: Regex,
    domain: Regex,
    cve: Regex,
    bitcoin: Regex,
    ethereum: Regex,
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("indicator pattern must compile")
}

fn hex_pattern(len: usize) -> String {
    format!(r"(?:^|[^a-zA-Z0-9{FOLDS}])[a-fA-F0-9]{{{len}}}(?:[^a-zA-Z0-9{FOLDS}]|$)")
}

fn ipv6_pattern() -> String {
    let h = IPV6_GROUP;
    let forms = [
        format!(r"(?:{h}:){{7}}{h}"),
        format!(r"(?:{h}:){{1,7}}:"),
        format!(r"(?:{h}:){{1,6}}:{h}"),
        format!(r"(?:{h}:){{1,5}}(?::{h}){{1,2}}"),
        format!(r"(?:{h}:){{1,4}}(?::{h}){{1,3}}"),
        format!(r"(?:{h}:){{1,3}}(?::{h}){{1,4}}"),
        format!(r"(?:{h}:){{1,2}}(?::{h}){{1,5}}"),
        format!(r"{h}:(?::{h}){{1,6}}"),
        format!(r":(?:(?::{h}){{1,7}}|:)"),
    ];
    format!(
        r"(?:^|[^0-9a-zA-Z:{FOLDS}])(?:{})(?:[^0-9a-zA-Z:{FOLDS}]|$)",
        forms.join("|")
    )
}

static PATTERNS: LazyLock<PatternTable> = LazyLock::new(|| PatternTable {
    url: compile(&format!(
        r#"(?:^|[^a-zA-Z0-9{FOLDS}])(?:[hH][tT][tT][pP][sS]?|[fF][tT][pP])://[^\s<>"'`{{}}|\\^\[\]]+"#
    )),
    email: compile(&format!(
        r"(?:^|[^a-zA-Z0-9._%+{FOLDS}-])[a-zA-Z0-9._%+-]+@(?:[a-zA-Z0-9-]+\.)+[a-zA-Z]{{2,63}}(?:[^a-zA-Z0-9{FOLDS}-]|$)"
    )),
    ipv4: compile(&format!(
        r"(?:^|[^0-9a-zA-Z.{FOLDS}])(?:{o}\.){{3}}{o}(?:[^0-9a-zA-Z.{FOLDS}]|\.(?:[^0-9]|$)|$)",
        o = IPV4_OCTET
    )),
    ipv6: compile(&ipv6_pattern()),
    sha256: compile(&hex_pattern(64)),
    sha1: compile(&hex_pattern(40)),
    md5: compile(&hex_pattern(32)),
    // A leading `-` or `.` is boundary noise (`-evil.com`, `...evil.com`);
    // labels themselves still start with an alphanumeric.
    domain: compile(&format!(
        r"(?:^|[^a-zA-Z0-9{FOLDS}])(?:[a-zA-Z0-9](?:[a-zA-Z0-9-]{{0,61}}[a-zA-Z0-9])?\.)+[a-zA-Z]{{2,63}}(?:[^a-zA-Z0-9{FOLDS}-]|$)"
    )),
    cve: compile(&format!(
        r"(?:^|[^a-zA-Z0-9{FOLDS}])[cC][vV][eE]-[0-9]{{4}}-[0-9]{{4,7}}(?:[^a-zA-Z0-9{FOLDS}]|$)"
    )),
    bitcoin: compile(
        r"(?:^|[^a-zA-Z0-9])(?:[13][a-km-zA-HJ-NP-Z1-9]{25,34}|bc1[ac-hj-np-z02-9]{39,59})(?:[^a-zA-Z0-9]|$)",
    ),
    ethereum: compile(r"(?:^|[^a-zA-Z0-9])0x[a-fA-F0-9]{40}(?:[^a-zA-Z0-9]|$)"),
});

/// The recognition pattern for `indicator_type`
pub(crate) fn pattern(indicator_type: IndicatorType) -> &'static Regex {
    let table = &*PATTERNS;
    match indicator_type {
        IndicatorType::Url => &table.url,
        IndicatorType::Email => &table.email,
        IndicatorType::Ipv4 => &table.ipv4,
        IndicatorType::Ipv6 => &table.ipv6,
        IndicatorType::Sha256 => &table.sha256,
        IndicatorType::Sha1 => &table.sha1,
        IndicatorType::Md5 => &table.md5,
        IndicatorType::Domain => &table.domain,
        IndicatorType::Cve => &table.cve,
        IndicatorType::Bitcoin => &table.bitcoin,
        IndicatorType::Ethereum => &table.ethereum,
    }
}

/// Secondary check applied after a pattern match is trimmed
pub(crate) fn is_valid(indicator_type: IndicatorType, value: &str) -> bool {
    match indicator_type {
        IndicatorType::Ipv4 => value.parse::<Ipv4Addr>().is_ok(),
        IndicatorType::Ipv6 => {
            value.chars().any(|c| c.is_ascii_hexdigit()) && value.parse::<Ipv6Addr>().is_ok()
        }
        IndicatorType::Domain => !has_non_domain_extension(value),
        IndicatorType::Md5 => is_hex_of_len(value, 32),
        IndicatorType::Sha1 => is_hex_of_len(value, 40),
        IndicatorType::Sha256 => is_hex_of_len(value, 64),
        IndicatorType::Bitcoin => (26..=62).contains(&value.len()),
        IndicatorType::Ethereum => value.len() == 42,
        IndicatorType::Url | IndicatorType::Email | IndicatorType::Cve => !value.is_empty(),
    }
}

/// Type-specific value normalization. CVE ids are upper-cased; everything
/// else is reported exactly as it appears in the text.
pub(crate) fn normalize(indicator_type: IndicatorType, value: &str) -> String {
    match indicator_type {
        IndicatorType::Cve => value.to_ascii_uppercase(),
        _ => value.to_string(),
    }
}

fn is_hex_of_len(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_hexdigit())
}

fn has_non_domain_extension(value: &str) -> bool {
    value
        .rsplit_once('.')
        .map(|(_, ext)| {
            NON_DOMAIN_EXTENSIONS
                .iter()
                .any(|bad| ext.eq_ignore_ascii_case(bad))
        })
        .unwrap_or(false)
}

/// Whether `c` may start an indicator of this type
fn keeps_leading(indicator_type: IndicatorType, c: char) -> bool {
    c.is_ascii_alphanumeric() || (indicator_type == IndicatorType::Ipv6 && c == ':')
}

/// Whether `c` may end an indicator of this type
fn keeps_trailing(indicator_type: IndicatorType, c: char) -> bool {
    c.is_ascii_alphanumeric()
        || match indicator_type {
            IndicatorType::Url => c == '/' || c == ':',
            IndicatorType::Ipv6 => c == ':',
            _ => false,
        }
}

/// Strip boundary noise from a raw match starting at byte `offset`.
///
/// Returns the cleaned range in source-text offsets, or `None` if nothing
/// indicator-shaped is left.
pub(crate) fn trim_match(
    indicator_type: IndicatorType,
    raw: &str,
    offset: usize,
) -> Option<Position> {
    let lead = raw
        .char_indices()
        .find(|(_, c)| keeps_leading(indicator_type, *c))
        .map(|(i, _)| i)?;
    let trail = raw
        .char_indices()
        .rev()
        .find(|(_, c)| keeps_trailing(indicator_type, *c))
        .map(|(i, c)| i + c.len_utf8())?;

    if trail <= lead {
        return None;
    }
    Some(Position::new(offset + lead, offset + trail))
}

/// Cleaned candidate ranges for one type, in text order.
///
/// Scanning resumes at the end of each cleaned value rather than the end of
/// the raw match, so a boundary character shared by two neighbours
/// (`1.1.1.1,2.2.2.2`) is available to both.
pub(crate) struct Candidates<'t> {
    indicator_type: IndicatorType,
    regex: &'static Regex,
    text: &'t str,
    at: usize,
}

impl<'t> Candidates<'t> {
    pub(crate) fn new(indicator_type: IndicatorType, text: &'t str) -> Self {
        Self {
            indicator_type,
            regex: pattern(indicator_type),
            text,
            at: 0,
        }
    }
}

impl Iterator for Candidates<'_> {
    type Item = Position;

    fn next(&mut self) -> Option<Position> {
        while self.at <= self.text.len() {
            let m = self.regex.find_at(self.text, self.at)?;
            match trim_match(self.indicator_type, m.as_str(), m.start()) {
                Some(pos) => {
                    self.at = pos.end;
                    return Some(pos);
                }
                None => self.at = m.end(),
            }
        }
        None
    }
}
