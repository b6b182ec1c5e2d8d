//! Read models returned by the use cases.

use rally_domain::{
    Activity, ActivityBoard, ActivityId, ActivityKind, ActivityTier, Email, GuestToken, Identity,
    ParticipantStatus, Participant, PlanOption, SkippedPayload, TimeSlot, OptionId, VoteTally,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantView {
    pub email: Email,
    pub identity: Identity,
    pub status: ParticipantStatus,
    pub has_guest_token: bool,
    pub invited_at: DateTime<Utc>,
}

impl From<&Participant> for ParticipantView {
    fn from(p: &Participant) -> Self {
        Self {
            email: p.email.clone(),
            identity: p.identity(),
            status: p.status,
            has_guest_token: p.guest_token.is_some(),
            invited_at: p.invited_at,
        }
    }
}

/// An option with its derived tally.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionView {
    pub option: PlanOption,
    pub tally: VoteTally,
}

impl OptionView {
    pub(crate) fn of(board: &ActivityBoard, option: &PlanOption) -> Self {
        Self {
            option: option.clone(),
            tally: VoteTally::for_option(&option.id, board.votes()),
        }
    }

    pub(crate) fn all(board: &ActivityBoard) -> Vec<Self> {
        board.options().iter().map(|o| Self::of(board, o)).collect()
    }
}

/// Everything a member sees on an activity page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityView {
    pub activity: Activity,
    pub tier: ActivityTier,
    pub participants: Vec<ParticipantView>,
    pub options: Vec<OptionView>,
}

impl From<&ActivityBoard> for ActivityView {
    fn from(board: &ActivityBoard) -> Self {
        Self {
            activity: board.activity().clone(),
            tier: board.tier(),
            participants: board.participants().iter().map(ParticipantView::from).collect(),
            options: OptionView::all(board),
        }
    }
}

/// The caller's relation to a listed activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Owner,
    Participant(ParticipantStatus),
}

/// One line of an activity listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivitySummary {
    pub id: ActivityId,
    pub kind: ActivityKind,
    pub title: String,
    pub tier: ActivityTier,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub role: MemberRole,
    pub created_at: DateTime<Utc>,
}

/// A time-slot option with its tally and live availability count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSlotView {
    pub option_id: OptionId,
    pub slot: TimeSlot,
    pub selected: bool,
    pub tally: VoteTally,
    pub availability_count: usize,
    pub available: Vec<Identity>,
}

/// Every time slot of an activity plus the responses that could not be read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailabilityReport {
    pub slots: Vec<TimeSlotView>,
    pub skipped: Vec<SkippedPayload>,
}

/// A guest token handed to the owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuestTokenGrant {
    pub email: Email,
    pub token: GuestToken,
    /// `false` when the participant already held this token.
    pub minted: bool,
}
