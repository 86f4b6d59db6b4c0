//! iocscout - indicator of compromise detection with a day-bucketed result cache
//!
//! [`detect`] finds IOCs in free text. [`cache`] keeps provider results in
//! daily buckets bounded by a retention window. [`analyze`] ties the two
//! together for a set of threat-intel providers.

pub mod analyze;
pub mod cache;
pub mod config;
pub mod detect;
pub mod error;
pub mod models;

pub use detect::{detect_indicators, has_indicators};
pub use error::{Error, Result};
