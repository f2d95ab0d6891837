pub mod attendance;
pub mod batches;
pub mod core;
pub mod reports;
pub mod students;

use crate::calc::parse_iso_date;
use crate::error::{EngineError, EngineResult};
use chrono::NaiveDate;

fn get_required(value: Option<String>, key: &str) -> EngineResult<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| EngineError::InvalidArgument(format!("missing {}", key)))
}

fn parse_date(raw: &str, key: &str) -> EngineResult<NaiveDate> {
    parse_iso_date(raw).ok_or_else(|| {
        EngineError::InvalidArgument(format!("{} must be a calendar date (YYYY-MM-DD)", key))
    })
}

// Dates are parsed untrimmed; padded values are rejected.
fn get_required_date(value: Option<String>, key: &str) -> EngineResult<NaiveDate> {
    match value.filter(|s| !s.is_empty()) {
        Some(raw) => parse_date(&raw, key),
        None => Err(EngineError::InvalidArgument(format!("missing {}", key))),
    }
}

fn get_optional_date(value: Option<String>, key: &str) -> EngineResult<Option<NaiveDate>> {
    match value.filter(|s| !s.is_empty()) {
        Some(raw) => parse_date(&raw, key).map(Some),
        None => Ok(None),
    }
}

fn get_required_number<T: std::str::FromStr>(value: Option<String>, key: &str) -> EngineResult<T> {
    let raw = get_required(value, key)?;
    raw.parse::<T>()
        .map_err(|_| EngineError::InvalidArgument(format!("{} must be a number", key)))
}
