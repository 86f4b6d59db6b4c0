//! Storage keys for daily cache buckets
//!
//! Bucket keys are `iocscout_cache_YYYYMMDD` (UTC day, zero padded). Because
//! every bucket key has the same prefix and a fixed-width date, comparing two
//! keys as strings gives the same answer as comparing their dates. Retention
//! and cleanup rely on that: any change to the date format must keep string
//! order equal to chronological order.

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::detect::IndicatorType;

/// Prefix shared by all bucket keys
pub const BUCKET_PREFIX: &str = "iocscout_cache_";

/// Key holding the persisted cache settings
pub const SETTINGS_KEY: &str = "iocscout_settings";

const DATE_FORMAT: &str = "%Y%m%d";

/// `YYYYMMDD` for a UTC day
pub fn bucket_date(day: NaiveDate) -> String {
    day.format(DATE_FORMAT).to_string()
}

/// Bucket key for a UTC day
pub fn bucket_key(day: NaiveDate) -> String {
    format!("{}{}", BUCKET_PREFIX, bucket_date(day))
}

/// Bucket key for the UTC day containing `now`
pub fn bucket_key_at(now: DateTime<Utc>) -> String {
    bucket_key(now.date_naive())
}

/// Date part of a bucket key, or `None` if `key` is not a bucket key
pub fn bucket_date_of(key: &str) -> Option<&str> {
    let date = key.strip_prefix(BUCKET_PREFIX)?;
    if date.len() == 8 && date.bytes().all(|b| b.is_ascii_digit()) {
        Some(date)
    } else {
        None
    }
}

pub fn is_bucket_key(key: &str) -> bool {
    bucket_date_of(key).is_some()
}

/// Composite key of one entry inside a bucket: `provider_type_value`
pub fn indicator_key(provider: &str, indicator_type: IndicatorType, value: &str) -> String {
    format!("{}_{}_{}", provider, indicator_type.as_str(), value)
}

/// Bucket keys searched on read, newest first: today back to
/// today - (retention_days - 1).
pub fn window_keys(now: DateTime<Utc>, retention_days: u32) -> Vec<String> {
    let today = now.date_naive();
    (0..retention_days.max(1))
        .filter_map(|back| today.checked_sub_days(Days::new(back as u64)))
        .map(bucket_key)
        .collect()
}

/// Buckets whose key sorts below this one are stale
pub fn cutoff_key(now: DateTime<Utc>, retention_days: u32) -> String {
    let today = now.date_naive();
    let cutoff = today
        .checked_sub_days(Days::new(retention_days as u64))
        .unwrap_or(NaiveDate::MIN);
    bucket_key(cutoff)
}
