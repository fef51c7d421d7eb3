//! Configuration errors raised before any scheduling happens.
//!
//! Task data never produces an error: malformed fields degrade to defaults in
//! `crate::normalize`. Only caller-supplied configuration is rejected here.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("block {index} is empty or inverted: start {start} is not before end {end}")]
    InvalidBlock {
        index: usize,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("invalid option `{name}`: {reason}")]
    InvalidOption { name: &'static str, reason: String },

    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("invalid day template: {0}")]
    InvalidTemplate(String),
}

impl ScheduleError {
    pub fn option(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            name,
            reason: reason.into(),
        }
    }
}
