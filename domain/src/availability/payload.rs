//! Freeform availability payloads.
//!
//! Clients submit availability as JSON in one of two shapes:
//!
//! ```text
//! "open"                                  -> free at any time
//! {"open": true} / {"fully_open": true}   -> free at any time
//! {"2024-06-01": ["18:00", "19:30"], ...} -> free at exactly these times
//! ```
//!
//! Payloads are stored as submitted and parsed on every read, so one bad
//! submission can never poison the stored data of anyone else.

use crate::option::{TimeSlot, parse_hhmm};
use chrono::{NaiveDate, NaiveTime};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Why a stored payload could not be used.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityParseError {
    #[error("not valid JSON: {0}")]
    InvalidJson(String),

    #[error("expected \"open\" or an object of date -> times")]
    UnexpectedShape,

    #[error("invalid date key {0:?}")]
    InvalidDate(String),

    #[error("times for {date} must be a list of strings")]
    InvalidTimeList { date: String },

    #[error("invalid time {value:?} for {date}")]
    InvalidTime { date: String, value: String },
}

/// A parsed availability payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityPayload {
    /// Available for every slot.
    FullyOpen,
    /// Available only at the listed times on the listed dates.
    Dates(BTreeMap<NaiveDate, BTreeSet<NaiveTime>>),
}

impl AvailabilityPayload {
    /// Parse a raw JSON payload.
    pub fn parse(raw: &str) -> Result<Self, AvailabilityParseError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| AvailabilityParseError::InvalidJson(e.to_string()))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, AvailabilityParseError> {
        match value {
            Value::String(s) if s.trim().eq_ignore_ascii_case("open") => Ok(Self::FullyOpen),
            Value::Object(map) if is_open_marker(map) => Ok(Self::FullyOpen),
            Value::Object(map) => {
                let mut dates = BTreeMap::new();
                for (key, times) in map {
                    let date = NaiveDate::parse_from_str(key.trim(), "%Y-%m-%d")
                        .map_err(|_| AvailabilityParseError::InvalidDate(key.clone()))?;

                    let Value::Array(items) = times else {
                        return Err(AvailabilityParseError::InvalidTimeList { date: key.clone() });
                    };

                    let mut set = BTreeSet::new();
                    for item in items {
                        let Value::String(text) = item else {
                            return Err(AvailabilityParseError::InvalidTimeList {
                                date: key.clone(),
                            });
                        };
                        let time = parse_hhmm(text).ok_or_else(|| {
                            AvailabilityParseError::InvalidTime {
                                date: key.clone(),
                                value: text.clone(),
                            }
                        })?;
                        set.insert(time);
                    }
                    dates.entry(date).or_insert_with(BTreeSet::new).extend(set);
                }
                Ok(Self::Dates(dates))
            }
            _ => Err(AvailabilityParseError::UnexpectedShape),
        }
    }

    /// Whether this payload makes its owner available for `slot`.
    ///
    /// Fully open covers everything; otherwise the slot's date must be listed
    /// and its `HH:MM` must be one of that date's times.
    pub fn covers(&self, slot: &TimeSlot) -> bool {
        match self {
            AvailabilityPayload::FullyOpen => true,
            AvailabilityPayload::Dates(dates) => dates
                .get(&slot.date)
                .is_some_and(|times| times.contains(&slot.time)),
        }
    }

    /// Canonical JSON form.
    pub fn to_value(&self) -> Value {
        match self {
            AvailabilityPayload::FullyOpen => Value::String("open".to_string()),
            AvailabilityPayload::Dates(dates) => {
                let map = dates
                    .iter()
                    .map(|(date, times)| {
                        let list = times
                            .iter()
                            .map(|t| Value::String(t.format("%H:%M").to_string()))
                            .collect();
                        (date.format("%Y-%m-%d").to_string(), Value::Array(list))
                    })
                    .collect();
                Value::Object(map)
            }
        }
    }
}

fn is_open_marker(map: &serde_json::Map<String, Value>) -> bool {
    map.len() == 1
        && ["open", "fully_open"]
            .iter()
            .any(|key| map.get(*key) == Some(&Value::Bool(true)))
}
