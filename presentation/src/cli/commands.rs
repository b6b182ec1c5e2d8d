//! CLI command definitions

use chrono::{DateTime, NaiveDateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rally_domain::{ActivityKind, OutputFormat as DomainOutputFormat};
use std::path::PathBuf;

/// How results are printed
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

impl From<OutputFormat> for DomainOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => DomainOutputFormat::Text,
            OutputFormat::Json => DomainOutputFormat::Json,
        }
    }
}

/// CLI arguments for rally
#[derive(Parser, Debug)]
#[command(name = "rally")]
#[command(author, version, about = "Plan group outings: invite, propose, vote, finalize")]
#[command(long_about = r#"
Rally coordinates a group outing from invitation to the final plan.

An owner creates an activity and invites people by e-mail. Participants
propose places or time slots and vote on them; for meetings they can also
submit their availability. The owner finalizes the winner, and reminders
are scheduled for everyone who accepted.

Each invocation loads the state file, runs one command and saves it.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./rally.toml        Project-level config
3. ~/.config/rally/config.toml   Global config

Example:
  rally register ana@example.com --name Ana
  rally --as ana@example.com create restaurant "Friday dinner"
  rally --as ana@example.com invite <ACTIVITY> bo@example.com
  rally --guest-token <TOKEN> availability <ACTIVITY> '{"2024-06-01":["18:00"]}'
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Act as the registered account with this e-mail
    #[arg(long = "as", value_name = "EMAIL", global = true, conflicts_with = "guest_token")]
    pub as_email: Option<String>,

    /// Act as the invitee holding this guest token
    #[arg(long, value_name = "TOKEN", global = true)]
    pub guest_token: Option<String>,

    /// State file (overrides `[store] path`)
    #[arg(long, value_name = "PATH", global = true)]
    pub state: Option<PathBuf>,

    /// Output format (overrides `[output] format`)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account
    Register {
        email: String,
        /// Display name (defaults to the part before the @)
        #[arg(long)]
        name: Option<String>,
    },

    /// Create an activity you own
    Create {
        #[arg(value_parser = parse_kind)]
        kind: ActivityKind,
        title: String,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        welcome: Option<String>,
    },

    /// Show an activity with its participants and options
    Show { activity: String },

    /// List your activities
    List,

    /// Edit the title, location or welcome message
    Update {
        activity: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        welcome: Option<String>,
    },

    /// Invite someone by e-mail
    Invite { activity: String, email: String },

    /// Accept your invitation
    Accept { activity: String },

    /// Decline your invitation
    Decline { activity: String },

    /// Leave an activity you joined
    Leave { activity: String },

    /// Remove a participant (owner only)
    Remove { activity: String, email: String },

    /// Issue (or show) the guest token of a participant (owner only)
    GuestToken { activity: String, email: String },

    /// Propose a place
    ProposePlace(ProposePlaceArgs),

    /// Propose a time slot
    ProposeSlot {
        activity: String,
        /// Date as YYYY-MM-DD
        date: String,
        /// Time as HH:MM
        time: String,
    },

    /// Remove an option (owner only)
    RemoveOption { activity: String, option: String },

    /// Vote on an option; toggles unless --on or --off is given
    Vote {
        activity: String,
        option: String,
        #[arg(long, conflicts_with = "off")]
        on: bool,
        #[arg(long)]
        off: bool,
    },

    /// Submit your availability as JSON: "open" or {"YYYY-MM-DD": ["HH:MM", ...]}
    Availability { activity: String, payload: String },

    /// List time slots with their availability
    Slots { activity: String },

    /// Propose places from the recommendation catalog (owner only)
    Recommend { activity: String },

    /// Lock in the plan (owner only)
    Finalize(FinalizeArgs),

    /// Move the scheduled time (owner only)
    Reschedule {
        activity: String,
        #[arg(value_parser = parse_datetime)]
        at: DateTime<Utc>,
    },

    /// Mark the activity as done (owner only)
    Complete { activity: String },

    /// Delete the activity and everything on it (owner only)
    Destroy { activity: String },
}

#[derive(Args, Debug)]
pub struct ProposePlaceArgs {
    pub activity: String,
    pub name: String,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub rating: Option<f32>,
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
    pub price_level: Option<u8>,
    #[arg(long)]
    pub url: Option<String>,
}

#[derive(Args, Debug)]
pub struct FinalizeArgs {
    pub activity: String,
    /// Pick this option instead of the vote leader
    #[arg(long)]
    pub option: Option<String>,
    /// Scheduled time (defaults to the chosen slot's start)
    #[arg(long, value_parser = parse_datetime)]
    pub at: Option<DateTime<Utc>>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub welcome: Option<String>,
}

fn parse_kind(raw: &str) -> Result<ActivityKind, String> {
    raw.parse()
}

/// Accepts RFC 3339 or `YYYY-MM-DD HH:MM` (read as UTC).
pub fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("Invalid time {:?}. Use RFC 3339 or YYYY-MM-DD HH:MM", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_vote_flags() {
        let cli = Cli::parse_from(["rally", "--as", "a@x.io", "vote", "act", "opt", "--off"]);
        match cli.command {
            Some(Command::Vote { on, off, .. }) => assert!(!on && off),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(cli.as_email.as_deref(), Some("a@x.io"));
    }

    #[test]
    fn test_as_and_guest_token_conflict() {
        let result = Cli::try_parse_from([
            "rally",
            "--as",
            "a@x.io",
            "--guest-token",
            "t",
            "list",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_datetime_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 6, 1, 18, 30, 0).unwrap();
        assert_eq!(parse_datetime("2024-06-01 18:30"), Ok(expected));
        assert_eq!(parse_datetime("2024-06-01T20:30:00+02:00"), Ok(expected));
        assert!(parse_datetime("tomorrow").is_err());
    }

    #[test]
    fn test_create_parses_kind() {
        let cli = Cli::parse_from(["rally", "create", "game-night", "Catan"]);
        assert!(matches!(
            cli.command,
            Some(Command::Create {
                kind: ActivityKind::GameNight,
                ..
            })
        ));
        assert!(Cli::try_parse_from(["rally", "create", "picnic", "x"]).is_err());
    }
}
