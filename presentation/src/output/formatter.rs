//! Command results and how they are rendered

use crate::output::console::ConsoleFormatter;
use rally_application::{
    ActivitySummary, ActivityView, AvailabilityReport, FinalizeOutput, GuestTokenGrant,
    OptionView, ParticipantView, ProposalView, RescheduleOutput,
};
use rally_domain::{
    Activity, InviteOutcome, OutputFormat, PlanOption, SubmittedAvailability, ToggleOutcome, User,
};
use serde::Serialize;

/// What a command produced, ready to print.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CommandOutput {
    Registered(User),
    Activity(ActivityView),
    Activities(Vec<ActivitySummary>),
    Invite(InviteReport),
    Participant(ParticipantView),
    GuestToken(GuestTokenGrant),
    Proposal(ProposalView),
    OptionRemoved(PlanOption),
    Vote(ToggleOutcome),
    Availability(AvailabilityReceipt),
    Slots(AvailabilityReport),
    Options(Vec<OptionView>),
    Finalized(FinalizeOutput),
    Rescheduled(RescheduleOutput),
    Completed(Activity),
    Done(Message),
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub message: String,
}

/// Serializable form of an invite result.
#[derive(Debug, Clone, Serialize)]
pub struct InviteReport {
    /// `invited`, `already_invited` or `already_owner`
    pub outcome: &'static str,
    pub participant: Option<ParticipantView>,
}

impl From<InviteOutcome> for InviteReport {
    fn from(outcome: InviteOutcome) -> Self {
        match outcome {
            InviteOutcome::Invited(p) => Self {
                outcome: "invited",
                participant: Some(ParticipantView::from(&p)),
            },
            InviteOutcome::AlreadyInvited(p) => Self {
                outcome: "already_invited",
                participant: Some(ParticipantView::from(&p)),
            },
            InviteOutcome::AlreadyOwner => Self {
                outcome: "already_owner",
                participant: None,
            },
        }
    }
}

/// Serializable form of an availability submission.
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityReceipt {
    pub replaced: bool,
    /// Why the payload will be ignored when matching, if it will be.
    pub parse_error: Option<String>,
}

impl From<SubmittedAvailability> for AvailabilityReceipt {
    fn from(submitted: SubmittedAvailability) -> Self {
        Self {
            replaced: submitted.replaced,
            parse_error: submitted.parse_error.map(|e| e.to_string()),
        }
    }
}

impl CommandOutput {
    pub fn done(message: impl Into<String>) -> Self {
        CommandOutput::Done(Message {
            message: message.into(),
        })
    }

    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Text => ConsoleFormatter::format(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rally_domain::{Email, Participant};

    #[test]
    fn test_invite_report_json() {
        let participant = Participant::invited(Email::parse("bo@x.io").unwrap(), None, Utc::now());
        let output = CommandOutput::Invite(InviteOutcome::Invited(participant).into());
        let json: serde_json::Value =
            serde_json::from_str(&output.render(OutputFormat::Json)).unwrap();
        assert_eq!(json["outcome"], "invited");
        assert_eq!(json["participant"]["email"], "bo@x.io");
        assert_eq!(json["participant"]["status"], "invited");
    }

    #[test]
    fn test_done_message_json() {
        let json: serde_json::Value = serde_json::from_str(
            &CommandOutput::done("Left activity").render(OutputFormat::Json),
        )
        .unwrap();
        assert_eq!(json["message"], "Left activity");
    }
}
