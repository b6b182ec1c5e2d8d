//! Voting ledger primitives
//!
//! A vote is a bare (option, identity) pair. Counts are always derived by
//! tallying the ledger; nothing stores a number.

use super::entities::OptionId;
use crate::identity::Identity;
use serde::{Deserialize, Serialize};

/// How a vote came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteOrigin {
    /// Cast by the voter.
    #[default]
    Manual,
    /// Synthesized from the voter's declared availability.
    Availability,
}

/// A single vote, unique per (option, identity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub option_id: OptionId,
    pub identity: Identity,
    #[serde(default)]
    pub origin: VoteOrigin,
}

impl Vote {
    pub fn manual(option_id: OptionId, identity: Identity) -> Self {
        Self {
            option_id,
            identity,
            origin: VoteOrigin::Manual,
        }
    }

    pub fn from_availability(option_id: OptionId, identity: Identity) -> Self {
        Self {
            option_id,
            identity,
            origin: VoteOrigin::Availability,
        }
    }
}

/// Derived vote count for one option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub option_id: OptionId,
    pub vote_count: usize,
    pub voters: Vec<Identity>,
}

impl VoteTally {
    /// Tally the ledger for one option. Voters keep ledger order.
    pub fn for_option<'a>(option_id: &OptionId, votes: impl IntoIterator<Item = &'a Vote>) -> Self {
        let voters: Vec<Identity> = votes
            .into_iter()
            .filter(|v| &v.option_id == option_id)
            .map(|v| v.identity.clone())
            .collect();

        Self {
            option_id: option_id.clone(),
            vote_count: voters.len(),
            voters,
        }
    }

    pub fn has_voter(&self, identity: &Identity) -> bool {
        self.voters.contains(identity)
    }

    /// The option with strictly more votes than every other, if any.
    ///
    /// A tie for first place (including all-zero tallies) has no leader.
    pub fn strict_leader(tallies: &[VoteTally]) -> Option<&OptionId> {
        let best = tallies.iter().max_by_key(|t| t.vote_count)?;
        let at_best = tallies
            .iter()
            .filter(|t| t.vote_count == best.vote_count)
            .count();

        if at_best == 1 && best.vote_count > 0 {
            Some(&best.option_id)
        } else {
            None
        }
    }
}

/// Result of a vote toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleOutcome {
    /// Whether the caller has a vote on the option after the toggle.
    pub voted: bool,
    pub tally: VoteTally,
}
