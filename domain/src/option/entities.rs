//! Option entities - candidate outcomes for an activity.
//!
//! An option is either a [`PlaceAttributes`] bundle (a restaurant, a bar)
//! or a [`TimeSlot`] (a date plus a wall-clock time). The bundle is opaque
//! to the engine apart from what it needs for matching and scheduling.

use crate::core::error::DomainError;
use crate::identity::Identity;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a proposed option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OptionId(String);

impl OptionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    Place,
    TimeSlot,
}

impl OptionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKind::Place => "place",
            OptionKind::TimeSlot => "time_slot",
        }
    }
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive bundle for a place candidate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaceAttributes {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    /// 1 (cheap) to 4 (expensive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Where the candidate came from (e.g. "recommendation")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl PlaceAttributes {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// A candidate meeting time.
///
/// Slots carry no timezone; they are matched textually against the
/// `HH:MM` strings people submit as availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeSlot {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl TimeSlot {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }

    /// Parse an ISO date (`YYYY-MM-DD`) and a time (`HH:MM`, `H:MM` allowed).
    pub fn parse(date: &str, time: &str) -> Result<Self, DomainError> {
        let parsed_date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|_| DomainError::InvalidTimeSlot(format!("bad date {:?}", date)))?;
        let parsed_time = parse_hhmm(time)
            .ok_or_else(|| DomainError::InvalidTimeSlot(format!("bad time {:?}", time)))?;
        Ok(Self::new(parsed_date, parsed_time))
    }

    /// Time of day in canonical `HH:MM` form.
    pub fn hhmm(&self) -> String {
        self.time.format("%H:%M").to_string()
    }

    /// The slot as a UTC instant, used when a finalized meeting has no
    /// explicit schedule.
    pub fn starts_at(&self) -> DateTime<Utc> {
        NaiveDateTime::new(self.date, self.time).and_utc()
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.date.format("%Y-%m-%d"), self.hhmm())
    }
}

/// Parse `HH:MM` (or `H:MM`) into a minute-precision time.
pub fn parse_hhmm(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").ok()
}

/// The attribute bundle of an option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptionAttributes {
    Place(PlaceAttributes),
    TimeSlot(TimeSlot),
}

impl OptionAttributes {
    pub fn kind(&self) -> OptionKind {
        match self {
            OptionAttributes::Place(_) => OptionKind::Place,
            OptionAttributes::TimeSlot(_) => OptionKind::TimeSlot,
        }
    }

    pub fn time_slot(&self) -> Option<&TimeSlot> {
        match self {
            OptionAttributes::TimeSlot(slot) => Some(slot),
            OptionAttributes::Place(_) => None,
        }
    }

    /// Short human-readable label.
    pub fn label(&self) -> String {
        match self {
            OptionAttributes::Place(place) => place.name.clone(),
            OptionAttributes::TimeSlot(slot) => slot.to_string(),
        }
    }
}

/// A candidate outcome proposed on an activity.
///
/// The vote count is never stored here; it is derived from the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanOption {
    pub id: OptionId,
    pub attributes: OptionAttributes,
    pub proposed_by: Identity,
    pub selected: bool,
    pub created_at: DateTime<Utc>,
}

impl PlanOption {
    pub fn kind(&self) -> OptionKind {
        self.attributes.kind()
    }
}
