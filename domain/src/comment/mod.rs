//! System comments posted on an activity's discussion thread.

use crate::activity::ActivityId;
use crate::option::OptionId;
use serde::{Deserialize, Serialize};

/// What a comment is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum CommentTarget {
    Activity(ActivityId),
    Option(OptionId),
}

impl std::fmt::Display for CommentTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommentTarget::Activity(id) => write!(f, "activity:{}", id),
            CommentTarget::Option(id) => write!(f, "option:{}", id),
        }
    }
}

/// Comments the engine writes on behalf of participants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemComment {
    Joined { who: String },
    Declined { who: String },
    Left { who: String },
    Removed { who: String },
    Finalized { plan: Option<String> },
    Rescheduled { when: String },
    Completed,
    OptionRemoved { label: String },
}

impl SystemComment {
    pub fn text(&self) -> String {
        match self {
            SystemComment::Joined { who } => format!("{} joined the activity", who),
            SystemComment::Declined { who } => format!("{} declined the invitation", who),
            SystemComment::Left { who } => format!("{} left the activity", who),
            SystemComment::Removed { who } => format!("{} was removed by the host", who),
            SystemComment::Finalized { plan: Some(plan) } => {
                format!("The plan is set: {}", plan)
            }
            SystemComment::Finalized { plan: None } => "The plan is set".to_string(),
            SystemComment::Rescheduled { when } => format!("Rescheduled to {}", when),
            SystemComment::Completed => "This activity is complete".to_string(),
            SystemComment::OptionRemoved { label } => {
                format!("{} was withdrawn by the host", label)
            }
        }
    }
}
