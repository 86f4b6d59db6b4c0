//! Indicator of Compromise detection
//!
//! Pure text scanning: no I/O and no shared state. Every call owns its own
//! occupied-range accumulator, so detection is deterministic and safe to run
//! from any thread.
//!
//! Types are scanned in [`IndicatorType::PRECEDENCE`] order and the first
//! type to claim a span wins it. A span never yields two indicators, even
//! when it is plausibly both (say, an Ethereum address and a hash fragment).
//! That tie-break is a heuristic, not a statement about what the text is.

mod patterns;
mod ranges;
pub mod types;

use std::collections::BTreeMap;

use log::trace;

use patterns::Candidates;
use ranges::OccupiedRanges;
pub use types::{DetectedIndicator, IndicatorType, Position, UnknownIndicatorType};

/// Find every indicator in `text`.
///
/// Results come grouped in precedence order (all URLs, then emails, ...),
/// not in text order. Positions are byte offsets into `text` and never
/// overlap each other.
pub fn detect_indicators(text: &str) -> Vec<DetectedIndicator> {
    detect_types(text, &IndicatorType::PRECEDENCE)
}

/// True when `text` contains at least one indicator
pub fn has_indicators(text: &str) -> bool {
    !detect_indicators(text).is_empty()
}

/// Detect only the requested types.
///
/// Precedence order is kept regardless of the order of `wanted`. URL and
/// email spans are still computed so domains inside them stay suppressed
/// even when URLs and emails are not being reported.
pub fn detect_types(text: &str, wanted: &[IndicatorType]) -> Vec<DetectedIndicator> {
    let mut found = Vec::new();
    if text.is_empty() || wanted.is_empty() {
        return found;
    }

    let url_spans: Vec<Position> = Candidates::new(IndicatorType::Url, text).collect();
    let email_spans: Vec<Position> = Candidates::new(IndicatorType::Email, text).collect();
    let mut occupied = OccupiedRanges::new();

    for indicator_type in IndicatorType::PRECEDENCE {
        if !wanted.contains(&indicator_type) {
            continue;
        }

        for pos in Candidates::new(indicator_type, text) {
            if indicator_type == IndicatorType::Domain
                && url_spans
                    .iter()
                    .chain(email_spans.iter())
                    .any(|span| span.contains(pos.start))
            {
                continue;
            }

            if occupied.overlaps(&pos) {
                continue;
            }

            let raw = &text[pos.start..pos.end];
            if !patterns::is_valid(indicator_type, raw) {
                trace!("Rejected {} candidate {:?}", indicator_type, raw);
                continue;
            }

            occupied.insert(pos);
            found.push(DetectedIndicator {
                indicator_type,
                value: patterns::normalize(indicator_type, raw),
                position: pos,
            });
        }
    }

    found
}

/// Group detections by type, keeping detection order inside each group
pub fn group_by_type(
    indicators: &[DetectedIndicator],
) -> BTreeMap<IndicatorType, Vec<&DetectedIndicator>> {
    let mut groups: BTreeMap<IndicatorType, Vec<&DetectedIndicator>> = BTreeMap::new();
    for indicator in indicators {
        groups
            .entry(indicator.indicator_type)
            .or_default()
            .push(indicator);
    }
    groups
}
