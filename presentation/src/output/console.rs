//! Console output for command results

use crate::output::formatter::CommandOutput;
use colored::Colorize;
use rally_application::{
    ActivitySummary, ActivityView, AvailabilityReport, MemberRole, OptionView, ParticipantView,
};
use rally_domain::{ActivityTier, Identity, OptionAttributes, PlanOption};

/// Formats command results for terminal display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn format(output: &CommandOutput) -> String {
        match output {
            CommandOutput::Registered(user) => format!(
                "{} {} <{}>\n{} {}\n",
                "Registered".green().bold(),
                user.display_name,
                user.email,
                "id:".dimmed(),
                user.id
            ),
            CommandOutput::Activity(view) => Self::activity(view),
            CommandOutput::Activities(list) => Self::activities(list),
            CommandOutput::Invite(report) => match (&report.participant, report.outcome) {
                (Some(p), "invited") => format!("{} {}\n", "Invited".green().bold(), p.email),
                (Some(p), _) => format!("{} is already invited ({})\n", p.email, p.status.as_str()),
                (None, _) => "That address belongs to the owner; nothing to do.\n".to_string(),
            },
            CommandOutput::Participant(p) => Self::participant_line(p) + "\n",
            CommandOutput::GuestToken(grant) => format!(
                "{} {}\n{}\n",
                (if grant.minted { "New guest token for" } else { "Guest token for" }).cyan(),
                grant.email,
                grant.token.as_str().bold()
            ),
            CommandOutput::Proposal(proposal) => {
                let mut out = format!(
                    "{} {}\n",
                    "Proposed".green().bold(),
                    Self::option_line(&proposal.option)
                );
                if !proposal.seeded_voters.is_empty() {
                    out.push_str(&format!(
                        "  {} vote(s) added from availability\n",
                        proposal.seeded_voters.len()
                    ));
                }
                out.push_str(&Self::skipped(
                    proposal.skipped.iter().map(|s| (&s.identity, s.reason.as_str())),
                ));
                out
            }
            CommandOutput::OptionRemoved(option) => {
                format!("{} {}\n", "Removed".yellow().bold(), Self::label(option))
            }
            CommandOutput::Vote(outcome) => format!(
                "{} {} ({} vote(s))\n",
                (if outcome.voted { "Voted for".green() } else { "Withdrew vote on".yellow() }),
                outcome.tally.option_id,
                outcome.tally.vote_count
            ),
            CommandOutput::Availability(receipt) => match &receipt.parse_error {
                Some(reason) => format!(
                    "{} stored, but it will be ignored: {}\n",
                    "Availability".yellow().bold(),
                    reason
                ),
                None if receipt.replaced => {
                    format!("{} updated\n", "Availability".green().bold())
                }
                None => format!("{} saved\n", "Availability".green().bold()),
            },
            CommandOutput::Slots(report) => Self::slots(report),
            CommandOutput::Options(options) if options.is_empty() => {
                "No new places to propose.\n".to_string()
            }
            CommandOutput::Options(options) => {
                let mut out = format!("{}\n", "Proposed from recommendations:".cyan().bold());
                for option in options {
                    out.push_str(&format!("  {}\n", Self::option_line(option)));
                }
                out
            }
            CommandOutput::Finalized(result) => {
                let mut out = format!("{} {}\n", "Finalized".green().bold(), result.activity.title);
                match &result.winner {
                    Some(winner) => out.push_str(&format!("  Plan: {}\n", Self::label(winner))),
                    None => out.push_str("  No option was chosen\n"),
                }
                if let Some(at) = result.activity.scheduled_at {
                    out.push_str(&format!("  When: {}\n", at.format("%Y-%m-%d %H:%M UTC")));
                }
                if result.reminders_scheduled > 0 {
                    out.push_str(&format!(
                        "  {} reminder(s) scheduled\n",
                        result.reminders_scheduled
                    ));
                }
                out
            }
            CommandOutput::Rescheduled(result) => {
                let mut out = format!("{} {}\n", "Rescheduled".green().bold(), result.activity.title);
                if let Some(previous) = result.previous {
                    out.push_str(&format!("  Was: {}\n", previous.format("%Y-%m-%d %H:%M UTC")));
                }
                if let Some(at) = result.activity.scheduled_at {
                    out.push_str(&format!("  Now: {}\n", at.format("%Y-%m-%d %H:%M UTC")));
                }
                out
            }
            CommandOutput::Completed(activity) => {
                format!("{} {}\n", "Completed".green().bold(), activity.title)
            }
            CommandOutput::Done(message) => format!("{}\n", message.message),
        }
    }

    fn activity(view: &ActivityView) -> String {
        let a = &view.activity;
        let mut out = String::new();

        out.push_str(&Self::header(&a.title));
        out.push('\n');
        out.push_str(&format!("{} {}\n", "Id:".cyan().bold(), a.id));
        out.push_str(&format!("{} {}\n", "Kind:".cyan().bold(), a.kind.as_str()));
        out.push_str(&format!("{} {}\n", "Status:".cyan().bold(), Self::tier(view.tier)));
        if let Some(at) = a.scheduled_at {
            out.push_str(&format!(
                "{} {}\n",
                "When:".cyan().bold(),
                at.format("%Y-%m-%d %H:%M UTC")
            ));
        }
        if let Some(location) = &a.location {
            out.push_str(&format!("{} {}\n", "Where:".cyan().bold(), location));
        }
        if let Some(welcome) = &a.welcome_message {
            out.push_str(&format!("\n{}\n", Self::indent(welcome, "  ")));
        }

        out.push_str(&Self::section_header("Participants"));
        if view.participants.is_empty() {
            out.push_str("  (none yet)\n");
        }
        for p in &view.participants {
            out.push_str(&format!("  {}\n", Self::participant_line(p)));
        }

        out.push_str(&Self::section_header("Options"));
        if view.options.is_empty() {
            out.push_str("  (none yet)\n");
        }
        for option in &view.options {
            out.push_str(&format!("  {}\n", Self::option_line(option)));
        }

        out
    }

    fn activities(list: &[ActivitySummary]) -> String {
        if list.is_empty() {
            return "No activities.\n".to_string();
        }
        let mut out = String::new();
        for s in list {
            let role = match s.role {
                MemberRole::Owner => "owner".to_string(),
                MemberRole::Participant(status) => status.as_str().to_string(),
            };
            out.push_str(&format!(
                "{}  {}  {} [{}] {}\n",
                s.id.to_string().dimmed(),
                Self::tier(s.tier),
                s.title.bold(),
                s.kind.as_str(),
                role.dimmed()
            ));
        }
        out
    }

    fn slots(report: &AvailabilityReport) -> String {
        let mut out = String::new();
        if report.slots.is_empty() {
            out.push_str("No time slots proposed.\n");
        }
        for slot in &report.slots {
            let marker = if slot.selected { "*".green().bold() } else { " ".normal() };
            out.push_str(&format!(
                "{} {}  {} available, {} vote(s)  {}\n",
                marker,
                slot.slot.to_string().bold(),
                slot.availability_count,
                slot.tally.vote_count,
                slot.option_id.to_string().dimmed()
            ));
        }
        out.push_str(&Self::skipped(
            report.skipped.iter().map(|s| (&s.identity, s.reason.as_str())),
        ));
        out
    }

    fn skipped<'a>(entries: impl Iterator<Item = (&'a Identity, &'a str)>) -> String {
        entries
            .map(|(who, reason)| {
                format!("  {} {}: {}\n", "skipped".yellow(), who, reason)
            })
            .collect()
    }

    fn participant_line(p: &ParticipantView) -> String {
        let status = match p.status.as_str() {
            "accepted" => p.status.as_str().green(),
            other => other.yellow(),
        };
        let guest = if p.identity.is_guest() { " (guest)" } else { "" };
        format!("{} {}{}", p.email, status, guest.dimmed())
    }

    fn option_line(view: &OptionView) -> String {
        let selected = if view.option.selected { " *" } else { "" };
        format!(
            "{}{}  {} vote(s)  {}",
            Self::label(&view.option).bold(),
            selected.green().bold(),
            view.tally.vote_count,
            view.option.id.to_string().dimmed()
        )
    }

    fn label(option: &PlanOption) -> String {
        match &option.attributes {
            OptionAttributes::Place(place) => match &place.address {
                Some(address) => format!("{} ({})", place.name, address),
                None => place.name.clone(),
            },
            OptionAttributes::TimeSlot(slot) => slot.to_string(),
        }
    }

    fn tier(tier: ActivityTier) -> String {
        match tier {
            ActivityTier::Collecting => tier.as_str().normal().to_string(),
            ActivityTier::Voting => tier.as_str().yellow().to_string(),
            ActivityTier::Finalized => tier.as_str().green().to_string(),
            ActivityTier::Completed => tier.as_str().dimmed().to_string(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
