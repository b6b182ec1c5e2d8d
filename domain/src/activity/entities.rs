//! Activity entities
//!
//! - [`ActivityId`] - identifier of an activity
//! - [`ActivityKind`] - what is being planned
//! - [`Activity`] - the activity record itself
//! - [`ActivityTier`] - the derived lifecycle state

use crate::identity::UserId;
use crate::option::{OptionId, OptionKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActivityId(String);

impl ActivityId {
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

impl std::fmt::Display for ActivityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of outing is being planned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Restaurant,
    Meeting,
    GameNight,
    Cocktails,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Restaurant => "restaurant",
            ActivityKind::Meeting => "meeting",
            ActivityKind::GameNight => "game_night",
            ActivityKind::Cocktails => "cocktails",
        }
    }

    /// Which option kinds can be proposed on this kind of activity.
    ///
    /// Restaurants vote on places, meetings vote on time slots, and the
    /// social kinds may vote on either.
    pub fn accepts(&self, option: OptionKind) -> bool {
        match self {
            ActivityKind::Restaurant => option == OptionKind::Place,
            ActivityKind::Meeting => option == OptionKind::TimeSlot,
            ActivityKind::GameNight | ActivityKind::Cocktails => true,
        }
    }

    /// Only meetings collect per-person availability.
    pub fn collects_availability(&self) -> bool {
        matches!(self, ActivityKind::Meeting)
    }
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "restaurant" => Ok(ActivityKind::Restaurant),
            "meeting" => Ok(ActivityKind::Meeting),
            "game_night" | "gamenight" => Ok(ActivityKind::GameNight),
            "cocktails" => Ok(ActivityKind::Cocktails),
            _ => Err(format!(
                "Unknown activity kind: {}. Valid: restaurant, meeting, game-night, cocktails",
                s
            )),
        }
    }
}

/// Lifecycle tier of an activity.
///
/// Only `finalized` and `completed` are stored on [`Activity`]; `Collecting`
/// vs `Voting` is derived from whether any option exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityTier {
    Collecting,
    Voting,
    Finalized,
    Completed,
}

impl ActivityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityTier::Collecting => "collecting",
            ActivityTier::Voting => "voting",
            ActivityTier::Finalized => "finalized",
            ActivityTier::Completed => "completed",
        }
    }
}

impl std::fmt::Display for ActivityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The activity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub kind: ActivityKind,
    pub owner: UserId,
    pub title: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub welcome_message: Option<String>,
    pub finalized: bool,
    pub completed: bool,
    pub selected_option_id: Option<OptionId>,
    pub created_at: DateTime<Utc>,
}

/// Owner-editable descriptive fields. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityDetails {
    pub title: Option<String>,
    pub location: Option<String>,
    pub welcome_message: Option<String>,
}

impl ActivityDetails {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.location.is_none() && self.welcome_message.is_none()
    }
}
