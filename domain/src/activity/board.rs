//! The activity board aggregate.
//!
//! [`ActivityBoard`] owns every row scoped to one activity: the activity
//! record, participants, options, votes and availability responses. All
//! state transitions are methods on the board. Each method validates first
//! and mutates second, so a returned `Err` always leaves the board exactly as
//! it was; callers persist the board only after a method succeeds.
//!
//! ```text
//!  Collecting ──(first option)──▶ Voting ──finalize──▶ Finalized ──complete──▶ Completed
//!       │                                                  │
//!       └──────────────── finalize (no options) ───────────┘
//! ```

use super::entities::{Activity, ActivityDetails, ActivityId, ActivityKind, ActivityTier};
use super::participant::{GuestToken, Participant, ParticipantStatus};
use crate::availability::{
    AvailabilityParseError, AvailabilityResponse, SkippedPayload, SlotAvailability, match_slot,
};
use crate::core::error::DomainError;
use crate::identity::{Email, Identity, User, UserId};
use crate::option::{
    OptionAttributes, OptionId, PlanOption, TimeSlot, ToggleOutcome, Vote, VoteTally,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of an invite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InviteOutcome {
    /// A new participant row was created.
    Invited(Participant),
    /// The address was already on the activity; nothing changed.
    AlreadyInvited(Participant),
    /// The address belongs to the owner; nothing changed.
    AlreadyOwner,
}

impl InviteOutcome {
    pub fn is_noop(&self) -> bool {
        !matches!(self, InviteOutcome::Invited(_))
    }
}

/// Result of proposing an option.
#[derive(Debug, Clone, PartialEq)]
pub struct ProposedOption {
    pub option: PlanOption,
    /// Identities that received a vote derived from their availability.
    pub seeded_voters: Vec<Identity>,
    /// Availability responses that could not be read while seeding.
    pub skipped: Vec<SkippedPayload>,
}

/// Result of submitting availability.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedAvailability {
    pub response: AvailabilityResponse,
    /// Whether a previous response by the same identity was replaced.
    pub replaced: bool,
    /// Set when the payload is stored but will be skipped when matching.
    pub parse_error: Option<AvailabilityParseError>,
}

/// Owner's finalize request. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalizeRequest {
    /// Explicit winner; overrides the tally when present.
    pub selected_option: Option<OptionId>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub welcome_message: Option<String>,
}

/// What a successful finalize did.
#[derive(Debug, Clone, PartialEq)]
pub struct Finalization {
    pub winner: Option<PlanOption>,
    pub previously_selected: Option<OptionId>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// All state scoped to one activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityBoard {
    activity: Activity,
    #[serde(default)]
    participants: Vec<Participant>,
    #[serde(default)]
    options: Vec<PlanOption>,
    #[serde(default)]
    votes: Vec<Vote>,
    #[serde(default)]
    availability: Vec<AvailabilityResponse>,
}

impl ActivityBoard {
    /// Create a fresh activity owned by `owner`.
    pub fn create(
        id: ActivityId,
        kind: ActivityKind,
        owner: UserId,
        title: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DomainError::InvalidInput("title cannot be empty".to_string()));
        }

        Ok(Self {
            activity: Activity {
                id,
                kind,
                owner,
                title: title.to_string(),
                scheduled_at: None,
                location: None,
                welcome_message: None,
                finalized: false,
                completed: false,
                selected_option_id: None,
                created_at: now,
            },
            participants: Vec::new(),
            options: Vec::new(),
            votes: Vec::new(),
            availability: Vec::new(),
        })
    }

    // ==================== Queries ====================

    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    pub fn id(&self) -> &ActivityId {
        &self.activity.id
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn options(&self) -> &[PlanOption] {
        &self.options
    }

    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    pub fn availability(&self) -> &[AvailabilityResponse] {
        &self.availability
    }

    /// Current lifecycle tier; `Voting` is derived from option existence.
    pub fn tier(&self) -> ActivityTier {
        if self.activity.completed {
            ActivityTier::Completed
        } else if self.activity.finalized {
            ActivityTier::Finalized
        } else if self.options.is_empty() {
            ActivityTier::Collecting
        } else {
            ActivityTier::Voting
        }
    }

    pub fn owner_identity(&self) -> Identity {
        Identity::User(self.activity.owner.clone())
    }

    pub fn is_owner(&self, identity: &Identity) -> bool {
        identity.user_id() == Some(&self.activity.owner)
    }

    /// The owner or anyone with a participant row.
    pub fn is_member(&self, identity: &Identity) -> bool {
        self.is_owner(identity) || self.participant_by_identity(identity).is_some()
    }

    pub fn participant_by_email(&self, email: &Email) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.email == email)
    }

    pub fn participant_by_identity(&self, identity: &Identity) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.identity() == identity)
    }

    pub fn participant_by_token(&self, token: &GuestToken) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| p.guest_token.as_ref() == Some(token))
    }

    /// User ids of the owner and every linked participant, owner first.
    pub fn member_user_ids(&self) -> Vec<UserId> {
        std::iter::once(self.activity.owner.clone())
            .chain(self.participants.iter().filter_map(|p| p.user_id.clone()))
            .collect()
    }

    pub fn option(&self, id: &OptionId) -> Option<&PlanOption> {
        self.options.iter().find(|o| &o.id == id)
    }

    pub fn selected_option(&self) -> Option<&PlanOption> {
        self.options.iter().find(|o| o.selected)
    }

    pub fn tally(&self, id: &OptionId) -> Result<VoteTally, DomainError> {
        self.option(id)
            .map(|o| VoteTally::for_option(&o.id, &self.votes))
            .ok_or_else(|| DomainError::OptionNotFound(id.to_string()))
    }

    /// Tallies for every option, in proposal order.
    pub fn tallies(&self) -> Vec<VoteTally> {
        self.options
            .iter()
            .map(|o| VoteTally::for_option(&o.id, &self.votes))
            .collect()
    }

    /// Who is free for `slot`, computed from the stored responses.
    pub fn slot_availability(&self, slot: &TimeSlot) -> SlotAvailability {
        match_slot(&self.availability, slot)
    }

    // ==================== Guards ====================

    pub fn require_owner(&self, actor: &Identity) -> Result<(), DomainError> {
        if self.is_owner(actor) {
            Ok(())
        } else {
            Err(DomainError::NotOwner)
        }
    }

    fn require_member(&self, actor: &Identity) -> Result<(), DomainError> {
        if self.is_member(actor) {
            Ok(())
        } else {
            Err(DomainError::NotMember)
        }
    }

    /// Options, votes and availability may only change before finalization.
    fn require_open(&self) -> Result<(), DomainError> {
        if self.activity.finalized {
            Err(DomainError::OptionsLocked)
        } else {
            Ok(())
        }
    }

    fn require_not_completed(&self) -> Result<(), DomainError> {
        if self.activity.completed {
            Err(DomainError::AlreadyCompleted)
        } else {
            Ok(())
        }
    }

    // ==================== Participant registry ====================

    /// Invite an address. Repeating an invite is a successful no-op.
    ///
    /// `account` is the registered user behind `email`, if any; the new row is
    /// linked to it immediately but stays `Invited` until accepted.
    pub fn invite(
        &mut self,
        actor: &Identity,
        email: Email,
        account: Option<&User>,
        now: DateTime<Utc>,
    ) -> Result<InviteOutcome, DomainError> {
        self.require_member(actor)?;
        self.require_not_completed()?;

        if account.is_some_and(|u| u.id == self.activity.owner) {
            return Ok(InviteOutcome::AlreadyOwner);
        }

        let existing = self.participants.iter().position(|p| {
            p.email == email
                || account.is_some_and(|u| p.user_id.as_ref() == Some(&u.id))
        });
        if let Some(idx) = existing {
            // An account registered since the first invite is linked now.
            if let Some(user) = account
                && self.participants[idx].user_id.is_none()
            {
                self.link_account(user);
            }
            return Ok(InviteOutcome::AlreadyInvited(self.participants[idx].clone()));
        }

        let participant = Participant::invited(email, account.map(|u| u.id.clone()), now);
        self.participants.push(participant.clone());
        Ok(InviteOutcome::Invited(participant))
    }

    /// Attach a registered account to the guest row with the same e-mail.
    ///
    /// Votes and availability submitted as the guest are re-keyed to the
    /// user. Where the user already has an equivalent row, the user's row
    /// wins. Returns whether anything was linked.
    pub fn link_account(&mut self, user: &User) -> bool {
        if user.id == self.activity.owner {
            return false;
        }
        let Some(participant) = self
            .participants
            .iter_mut()
            .find(|p| p.email == user.email && p.user_id.is_none())
        else {
            return false;
        };
        participant.user_id = Some(user.id.clone());

        let guest = Identity::Guest(user.email.clone());
        let linked = user.identity();

        let mut votes = Vec::with_capacity(self.votes.len());
        for mut vote in std::mem::take(&mut self.votes) {
            if vote.identity == guest {
                vote.identity = linked.clone();
            }
            let duplicate = votes
                .iter()
                .any(|v: &Vote| v.option_id == vote.option_id && v.identity == vote.identity);
            if !duplicate {
                votes.push(vote);
            }
        }
        self.votes = votes;

        if let Some(guest_idx) = self.availability.iter().position(|a| a.identity == guest) {
            let guest_response = self.availability.remove(guest_idx);
            if !self.availability.iter().any(|a| a.identity == linked) {
                self.availability.push(AvailabilityResponse {
                    identity: linked,
                    ..guest_response
                });
            }
        }

        true
    }

    /// Accept an invitation on behalf of `email`.
    ///
    /// Requires a participant row and a registered account; accepting twice
    /// fails loudly so the "joined" side effects never fire twice.
    pub fn accept(
        &mut self,
        email: &Email,
        account: Option<&User>,
    ) -> Result<Participant, DomainError> {
        let idx = self
            .participants
            .iter()
            .position(|p| &p.email == email)
            .ok_or_else(|| DomainError::ParticipantNotFound(email.to_string()))?;
        let user = account.ok_or_else(|| DomainError::UserNotFound(email.to_string()))?;
        if self.participants[idx].is_accepted() {
            return Err(DomainError::AlreadyAccepted(email.to_string()));
        }

        self.link_account(user);
        let participant = &mut self.participants[idx];
        participant.status = ParticipantStatus::Accepted;
        Ok(participant.clone())
    }

    /// Decline a pending invitation. The row is deleted, so the address can
    /// be invited again later.
    pub fn decline(&mut self, email: &Email) -> Result<Participant, DomainError> {
        let idx = self
            .participants
            .iter()
            .position(|p| &p.email == email)
            .ok_or_else(|| DomainError::ParticipantNotFound(email.to_string()))?;
        if self.participants[idx].is_accepted() {
            return Err(DomainError::CannotDeclineAccepted(email.to_string()));
        }

        let participant = self.participants.remove(idx);
        self.purge(&participant);
        Ok(participant)
    }

    /// Leave the activity. Not available to the owner.
    pub fn leave(&mut self, actor: &Identity) -> Result<Participant, DomainError> {
        if self.is_owner(actor) {
            return Err(DomainError::OwnerCannotLeave);
        }
        let idx = self
            .participants
            .iter()
            .position(|p| &p.identity() == actor)
            .ok_or_else(|| DomainError::ParticipantNotFound(actor.to_string()))?;

        let participant = self.participants.remove(idx);
        self.purge(&participant);
        Ok(participant)
    }

    /// Owner removes a participant, registered or guest.
    pub fn remove_participant(
        &mut self,
        actor: &Identity,
        email: &Email,
        account: Option<&User>,
    ) -> Result<Participant, DomainError> {
        self.require_owner(actor)?;
        if account.is_some_and(|u| u.id == self.activity.owner) {
            return Err(DomainError::OwnerCannotBeRemoved);
        }
        let idx = self
            .participants
            .iter()
            .position(|p| {
                &p.email == email || account.is_some_and(|u| p.user_id.as_ref() == Some(&u.id))
            })
            .ok_or_else(|| DomainError::ParticipantNotFound(email.to_string()))?;

        let participant = self.participants.remove(idx);
        self.purge(&participant);
        Ok(participant)
    }

    /// Return the participant's guest token, minting one on first use.
    ///
    /// The boolean is `true` when a new token was minted.
    pub fn issue_guest_token(
        &mut self,
        actor: &Identity,
        email: &Email,
        mint: impl FnOnce() -> GuestToken,
    ) -> Result<(GuestToken, bool), DomainError> {
        self.require_owner(actor)?;
        let participant = self
            .participants
            .iter_mut()
            .find(|p| &p.email == email)
            .ok_or_else(|| DomainError::ParticipantNotFound(email.to_string()))?;

        if let Some(token) = &participant.guest_token {
            return Ok((token.clone(), false));
        }
        let token = mint();
        participant.guest_token = Some(token.clone());
        Ok((token, true))
    }

    /// Drop every vote and availability response held by a departed row.
    fn purge(&mut self, participant: &Participant) {
        let identities = [
            participant.identity(),
            Identity::Guest(participant.email.clone()),
        ];
        self.votes.retain(|v| !identities.contains(&v.identity));
        self.availability
            .retain(|a| !identities.contains(&a.identity));
    }

    // ==================== Option pool & voting ledger ====================

    /// Add a candidate option.
    ///
    /// On a meeting, a new time slot immediately receives a vote from every
    /// identity whose availability covers it.
    pub fn propose_option(
        &mut self,
        actor: &Identity,
        id: OptionId,
        attributes: OptionAttributes,
        now: DateTime<Utc>,
    ) -> Result<ProposedOption, DomainError> {
        self.require_member(actor)?;
        self.require_open()?;

        let kind = attributes.kind();
        if !self.activity.kind.accepts(kind) {
            return Err(DomainError::OptionKindMismatch {
                activity: self.activity.kind.to_string(),
                option: kind.to_string(),
            });
        }
        if let OptionAttributes::Place(place) = &attributes
            && place.name.trim().is_empty()
        {
            return Err(DomainError::InvalidInput("place name cannot be empty".to_string()));
        }
        if let Some(slot) = attributes.time_slot()
            && self
                .options
                .iter()
                .any(|o| o.attributes.time_slot() == Some(slot))
        {
            return Err(DomainError::DuplicateTimeSlot(slot.to_string()));
        }
        if self.option(&id).is_some() {
            return Err(DomainError::InvalidInput(format!("option id {} is taken", id)));
        }

        let option = PlanOption {
            id,
            attributes,
            proposed_by: actor.clone(),
            selected: false,
            created_at: now,
        };

        let (seeded_voters, skipped) = match option.attributes.time_slot() {
            Some(slot) if self.activity.kind.collects_availability() => {
                let matched = self.slot_availability(slot);
                (matched.available, matched.skipped)
            }
            _ => (Vec::new(), Vec::new()),
        };

        for identity in &seeded_voters {
            self.votes
                .push(Vote::from_availability(option.id.clone(), identity.clone()));
        }
        self.options.push(option.clone());

        Ok(ProposedOption {
            option,
            seeded_voters,
            skipped,
        })
    }

    /// Owner removes an option together with its votes.
    pub fn remove_option(
        &mut self,
        actor: &Identity,
        id: &OptionId,
    ) -> Result<PlanOption, DomainError> {
        self.require_owner(actor)?;
        self.require_open()?;
        let idx = self
            .options
            .iter()
            .position(|o| &o.id == id)
            .ok_or_else(|| DomainError::OptionNotFound(id.to_string()))?;

        let option = self.options.remove(idx);
        self.votes.retain(|v| &v.option_id != id);
        Ok(option)
    }

    /// Flip the caller's vote on an option.
    pub fn toggle_vote(
        &mut self,
        actor: &Identity,
        id: &OptionId,
    ) -> Result<ToggleOutcome, DomainError> {
        let currently = self
            .votes
            .iter()
            .any(|v| &v.option_id == id && &v.identity == actor);
        self.set_vote(actor, id, !currently)
    }

    /// Make sure the caller does (or does not) vote for an option.
    pub fn set_vote(
        &mut self,
        actor: &Identity,
        id: &OptionId,
        voted: bool,
    ) -> Result<ToggleOutcome, DomainError> {
        self.require_member(actor)?;
        self.require_open()?;
        if self.option(id).is_none() {
            return Err(DomainError::OptionNotFound(id.to_string()));
        }

        let existing = self
            .votes
            .iter()
            .position(|v| &v.option_id == id && &v.identity == actor);
        match (existing, voted) {
            (Some(idx), false) => {
                self.votes.remove(idx);
            }
            (None, true) => self.votes.push(Vote::manual(id.clone(), actor.clone())),
            _ => {}
        }

        Ok(ToggleOutcome {
            voted,
            tally: VoteTally::for_option(id, &self.votes),
        })
    }

    // ==================== Availability ====================

    /// Store the caller's availability, replacing any earlier submission.
    pub fn submit_availability(
        &mut self,
        actor: &Identity,
        raw: String,
        now: DateTime<Utc>,
    ) -> Result<SubmittedAvailability, DomainError> {
        self.require_member(actor)?;
        if !self.activity.kind.collects_availability() {
            return Err(DomainError::AvailabilityNotSupported(
                self.activity.kind.to_string(),
            ));
        }
        self.require_open()?;

        let response = AvailabilityResponse {
            identity: actor.clone(),
            raw,
            submitted_at: now,
        };
        let parse_error = response.payload().err();

        let before = self.availability.len();
        self.availability.retain(|a| &a.identity != actor);
        let replaced = self.availability.len() != before;
        self.availability.push(response.clone());

        Ok(SubmittedAvailability {
            response,
            replaced,
            parse_error,
        })
    }

    // ==================== Finalization ====================

    /// Lock in the plan.
    ///
    /// With an explicit selection the given option wins regardless of votes;
    /// otherwise the strict vote leader wins, and a tie selects nothing. All
    /// checks run before any field changes.
    pub fn finalize(
        &mut self,
        actor: &Identity,
        request: FinalizeRequest,
    ) -> Result<Finalization, DomainError> {
        self.require_owner(actor)?;
        self.require_not_completed()?;
        if self.activity.finalized {
            return Err(DomainError::AlreadyFinalized);
        }

        let winner_id = match &request.selected_option {
            Some(id) => {
                if self.option(id).is_none() {
                    return Err(DomainError::OptionNotFound(id.to_string()));
                }
                Some(id.clone())
            }
            None => VoteTally::strict_leader(&self.tallies()).cloned(),
        };

        let previously_selected = self.activity.selected_option_id.clone();
        for option in &mut self.options {
            option.selected = false;
        }
        let mut winner = None;
        if let Some(id) = &winner_id
            && let Some(option) = self.options.iter_mut().find(|o| &o.id == id)
        {
            option.selected = true;
            winner = Some(option.clone());
        }
        self.activity.selected_option_id = winner_id;

        let slot_start = winner
            .as_ref()
            .and_then(|w: &PlanOption| w.attributes.time_slot())
            .map(TimeSlot::starts_at);
        if let Some(at) = request.scheduled_at.or(slot_start) {
            self.activity.scheduled_at = Some(at);
        }
        if let Some(location) = request.location {
            self.activity.location = Some(location.trim().to_string());
        }
        if let Some(message) = request.welcome_message {
            self.activity.welcome_message = Some(message.trim().to_string());
        }
        self.activity.finalized = true;

        Ok(Finalization {
            winner,
            previously_selected,
            scheduled_at: self.activity.scheduled_at,
        })
    }

    /// Move the scheduled time. Allowed until completion; never changes tier.
    ///
    /// Returns the previous time.
    pub fn reschedule(
        &mut self,
        actor: &Identity,
        at: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, DomainError> {
        self.require_owner(actor)?;
        self.require_not_completed()?;
        Ok(self.activity.scheduled_at.replace(at))
    }

    /// Terminal transition from `Finalized` to `Completed`.
    pub fn complete(&mut self, actor: &Identity) -> Result<(), DomainError> {
        self.require_owner(actor)?;
        self.require_not_completed()?;
        if !self.activity.finalized {
            return Err(DomainError::NotFinalized);
        }
        self.activity.completed = true;
        Ok(())
    }

    /// Owner edits descriptive fields.
    pub fn update_details(
        &mut self,
        actor: &Identity,
        details: ActivityDetails,
    ) -> Result<(), DomainError> {
        self.require_owner(actor)?;
        self.require_not_completed()?;

        let title = match details.title {
            Some(title) if title.trim().is_empty() => {
                return Err(DomainError::InvalidInput("title cannot be empty".to_string()));
            }
            Some(title) => Some(title.trim().to_string()),
            None => None,
        };

        if let Some(title) = title {
            self.activity.title = title;
        }
        if let Some(location) = details.location {
            self.activity.location = Some(location.trim().to_string());
        }
        if let Some(message) = details.welcome_message {
            self.activity.welcome_message = Some(message.trim().to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::option::PlaceAttributes;
    use chrono::TimeZone;

    // ==================== Helpers ====================

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap()
    }

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    fn account(id: &str, addr: &str) -> User {
        User::new(UserId::new(id), email(addr), id.to_uppercase())
    }

    fn host() -> User {
        account("host", "host@example.com")
    }

    fn board(kind: ActivityKind) -> ActivityBoard {
        ActivityBoard::create(
            ActivityId::new("a1"),
            kind,
            host().id,
            "Friday plans",
            now(),
        )
        .unwrap()
    }

    fn slot(date: &str, time: &str) -> OptionAttributes {
        OptionAttributes::TimeSlot(TimeSlot::parse(date, time).unwrap())
    }

    fn place(name: &str) -> OptionAttributes {
        OptionAttributes::Place(PlaceAttributes::new(name))
    }

    /// Meeting with u1 and u2 accepted.
    fn meeting_with_two() -> (ActivityBoard, User, User) {
        let mut b = board(ActivityKind::Meeting);
        let u1 = account("u1", "u1@example.com");
        let u2 = account("u2", "u2@example.com");
        for u in [&u1, &u2] {
            b.invite(&host().identity(), u.email.clone(), Some(u), now())
                .unwrap();
            b.accept(&u.email, Some(u)).unwrap();
        }
        (b, u1, u2)
    }

    // ==================== Creation & tiers ====================

    #[test]
    fn test_create_rejects_blank_title() {
        let err = ActivityBoard::create(
            ActivityId::new("x"),
            ActivityKind::Restaurant,
            host().id,
            "   ",
            now(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_tier_is_derived_and_monotonic() {
        let mut b = board(ActivityKind::Restaurant);
        let h = host().identity();
        assert_eq!(b.tier(), ActivityTier::Collecting);

        b.propose_option(&h, OptionId::new("o1"), place("Luigi's"), now())
            .unwrap();
        assert_eq!(b.tier(), ActivityTier::Voting);

        b.finalize(&h, FinalizeRequest::default()).unwrap();
        assert_eq!(b.tier(), ActivityTier::Finalized);

        b.reschedule(&h, now()).unwrap();
        assert_eq!(b.tier(), ActivityTier::Finalized);

        b.complete(&h).unwrap();
        assert_eq!(b.tier(), ActivityTier::Completed);
    }

    // ==================== Participant registry ====================

    #[test]
    fn test_invite_twice_is_noop() {
        let mut b = board(ActivityKind::Restaurant);
        let h = host().identity();

        let first = b.invite(&h, email("g@x.io"), None, now()).unwrap();
        assert!(!first.is_noop());
        let second = b.invite(&h, email("G@X.io "), None, now()).unwrap();
        assert!(matches!(second, InviteOutcome::AlreadyInvited(_)));

        assert_eq!(b.participants().len(), 1);
    }

    #[test]
    fn test_invite_links_registered_account_but_stays_invited() {
        let mut b = board(ActivityKind::Restaurant);
        let u1 = account("u1", "u1@example.com");

        b.invite(&host().identity(), u1.email.clone(), Some(&u1), now())
            .unwrap();

        let p = b.participant_by_email(&u1.email).unwrap();
        assert_eq!(p.user_id, Some(u1.id.clone()));
        assert_eq!(p.status, ParticipantStatus::Invited);
        assert!(b.is_member(&u1.identity()));
    }

    #[test]
    fn test_reinvite_links_account_registered_later() {
        let mut b = board(ActivityKind::Restaurant);
        let h = host().identity();
        b.invite(&h, email("g@x.io"), None, now()).unwrap();
        b.propose_option(&h, OptionId::new("o1"), place("Luigi's"), now())
            .unwrap();
        b.toggle_vote(&Identity::Guest(email("g@x.io")), &OptionId::new("o1"))
            .unwrap();

        let user = account("g", "g@x.io");
        let outcome = b.invite(&h, user.email.clone(), Some(&user), now()).unwrap();

        assert!(outcome.is_noop());
        let p = b.participant_by_email(&user.email).unwrap();
        assert_eq!(p.user_id, Some(user.id.clone()));
        assert_eq!(p.status, ParticipantStatus::Invited);
        assert!(b.is_member(&user.identity()));
        assert_eq!(b.votes().len(), 1);
        assert_eq!(b.votes()[0].identity, user.identity());
    }

    #[test]
    fn test_inviting_the_owner_is_noop() {
        let mut b = board(ActivityKind::Restaurant);
        let h = host();
        let outcome = b
            .invite(&h.identity(), h.email.clone(), Some(&h), now())
            .unwrap();
        assert_eq!(outcome, InviteOutcome::AlreadyOwner);
        assert!(b.participants().is_empty());
    }

    #[test]
    fn test_outsider_cannot_invite() {
        let mut b = board(ActivityKind::Restaurant);
        let stranger = Identity::Guest(email("s@x.io"));
        let err = b.invite(&stranger, email("g@x.io"), None, now()).unwrap_err();
        assert_eq!(err, DomainError::NotMember);
    }

    #[test]
    fn test_accept_lifecycle() {
        let mut b = board(ActivityKind::Restaurant);
        let u1 = account("u1", "u1@example.com");

        let err = b.accept(&u1.email, Some(&u1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        b.invite(&host().identity(), u1.email.clone(), None, now())
            .unwrap();

        let err = b.accept(&u1.email, None).unwrap_err();
        assert!(matches!(err, DomainError::UserNotFound(_)));

        let accepted = b.accept(&u1.email, Some(&u1)).unwrap();
        assert!(accepted.is_accepted());
        assert_eq!(accepted.user_id, Some(u1.id.clone()));

        let err = b.accept(&u1.email, Some(&u1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_decline_deletes_row_and_allows_reinvite() {
        let mut b = board(ActivityKind::Restaurant);
        let h = host().identity();
        b.invite(&h, email("g@x.io"), None, now()).unwrap();

        b.decline(&email("g@x.io")).unwrap();
        assert!(b.participants().is_empty());

        let again = b.invite(&h, email("g@x.io"), None, now()).unwrap();
        assert!(!again.is_noop());
    }

    #[test]
    fn test_cannot_decline_after_accepting() {
        let (mut b, u1, _) = meeting_with_two();
        let err = b.decline(&u1.email).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_owner_cannot_leave_or_be_removed() {
        let mut b = board(ActivityKind::Restaurant);
        let h = host();
        assert_eq!(
            b.leave(&h.identity()).unwrap_err(),
            DomainError::OwnerCannotLeave
        );
        assert_eq!(
            b.remove_participant(&h.identity(), &h.email, Some(&h))
                .unwrap_err(),
            DomainError::OwnerCannotBeRemoved
        );
    }

    #[test]
    fn test_only_owner_removes() {
        let (mut b, u1, u2) = meeting_with_two();
        let err = b
            .remove_participant(&u1.identity(), &u2.email, Some(&u2))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn test_removal_purges_availability_and_votes() {
        let (mut b, u1, u2) = meeting_with_two();
        let h = host().identity();
        b.submit_availability(&u1.identity(), r#""open""#.into(), now())
            .unwrap();
        b.submit_availability(&u2.identity(), r#""open""#.into(), now())
            .unwrap();
        let proposed = b
            .propose_option(&h, OptionId::new("s1"), slot("2024-06-01", "18:00"), now())
            .unwrap();
        assert_eq!(proposed.seeded_voters.len(), 2);

        b.remove_participant(&h, &u1.email, Some(&u1)).unwrap();

        let s = TimeSlot::parse("2024-06-01", "18:00").unwrap();
        assert_eq!(b.slot_availability(&s).available, vec![u2.identity()]);
        let tally = b.tally(&OptionId::new("s1")).unwrap();
        assert_eq!(tally.voters, vec![u2.identity()]);
    }

    #[test]
    fn test_leave_purges_rows() {
        let (mut b, u1, _) = meeting_with_two();
        b.submit_availability(&u1.identity(), r#""open""#.into(), now())
            .unwrap();
        b.leave(&u1.identity()).unwrap();

        assert!(b.availability().is_empty());
        assert!(!b.is_member(&u1.identity()));
    }

    #[test]
    fn test_guest_rows_rekeyed_when_account_appears() {
        let mut b = board(ActivityKind::Meeting);
        let h = host().identity();
        let guest = Identity::Guest(email("g@x.io"));
        b.invite(&h, email("g@x.io"), None, now()).unwrap();
        b.submit_availability(&guest, r#"{"2024-06-01": ["18:00"]}"#.into(), now())
            .unwrap();
        b.propose_option(&h, OptionId::new("s1"), slot("2024-06-01", "18:00"), now())
            .unwrap();

        let user = account("g", "g@x.io");
        assert!(b.link_account(&user));
        assert!(!b.link_account(&user));

        assert_eq!(b.availability()[0].identity, user.identity());
        assert_eq!(
            b.tally(&OptionId::new("s1")).unwrap().voters,
            vec![user.identity()]
        );
        assert!(!b.is_member(&guest));
    }

    #[test]
    fn test_guest_token_is_stable() {
        let mut b = board(ActivityKind::Meeting);
        let h = host().identity();
        b.invite(&h, email("g@x.io"), None, now()).unwrap();

        let (first, minted) = b
            .issue_guest_token(&h, &email("g@x.io"), || GuestToken::new("t1"))
            .unwrap();
        assert!(minted);
        let (second, minted) = b
            .issue_guest_token(&h, &email("g@x.io"), || GuestToken::new("t2"))
            .unwrap();
        assert!(!minted);
        assert_eq!(first, second);
        assert_eq!(
            b.participant_by_token(&GuestToken::new("t1")).unwrap().email,
            email("g@x.io")
        );
    }

    // ==================== Options & votes ====================

    #[test]
    fn test_toggle_vote_is_involutive() {
        let mut b = board(ActivityKind::Restaurant);
        let h = host().identity();
        let id = OptionId::new("o1");
        b.propose_option(&h, id.clone(), place("Luigi's"), now())
            .unwrap();

        let before = b.tally(&id).unwrap();
        let on = b.toggle_vote(&h, &id).unwrap();
        assert!(on.voted);
        assert_eq!(on.tally.vote_count, before.vote_count + 1);

        let off = b.toggle_vote(&h, &id).unwrap();
        assert!(!off.voted);
        assert_eq!(off.tally, before);
    }

    #[test]
    fn test_one_identity_can_vote_many_options() {
        let mut b = board(ActivityKind::Restaurant);
        let h = host().identity();
        for id in ["o1", "o2"] {
            b.propose_option(&h, OptionId::new(id), place(id), now())
                .unwrap();
            b.toggle_vote(&h, &OptionId::new(id)).unwrap();
        }
        assert!(b.tallies().iter().all(|t| t.vote_count == 1));
    }

    #[test]
    fn test_set_vote_is_idempotent() {
        let mut b = board(ActivityKind::Restaurant);
        let h = host().identity();
        let id = OptionId::new("o1");
        b.propose_option(&h, id.clone(), place("Luigi's"), now())
            .unwrap();

        b.set_vote(&h, &id, true).unwrap();
        let again = b.set_vote(&h, &id, true).unwrap();
        assert_eq!(again.tally.vote_count, 1);
    }

    #[test]
    fn test_option_kind_must_match_activity() {
        let mut b = board(ActivityKind::Restaurant);
        let err = b
            .propose_option(
                &host().identity(),
                OptionId::new("s"),
                slot("2024-06-01", "18:00"),
                now(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::OptionKindMismatch { .. }));
    }

    #[test]
    fn test_duplicate_slot_rejected() {
        let mut b = board(ActivityKind::Meeting);
        let h = host().identity();
        b.propose_option(&h, OptionId::new("s1"), slot("2024-06-01", "18:00"), now())
            .unwrap();
        let err = b
            .propose_option(&h, OptionId::new("s2"), slot("2024-06-01", "18:00"), now())
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateTimeSlot(_)));
    }

    #[test]
    fn test_remove_option_cascades_votes() {
        let mut b = board(ActivityKind::Restaurant);
        let h = host().identity();
        let id = OptionId::new("o1");
        b.propose_option(&h, id.clone(), place("Luigi's"), now())
            .unwrap();
        b.toggle_vote(&h, &id).unwrap();

        b.remove_option(&h, &id).unwrap();
        assert!(b.votes().is_empty());
        assert_eq!(b.tier(), ActivityTier::Collecting);
    }

    #[test]
    fn test_mutations_locked_after_finalize() {
        let mut b = board(ActivityKind::Restaurant);
        let h = host().identity();
        let id = OptionId::new("o1");
        b.propose_option(&h, id.clone(), place("Luigi's"), now())
            .unwrap();
        b.finalize(&h, FinalizeRequest::default()).unwrap();

        let errors = [
            b.propose_option(&h, OptionId::new("o2"), place("Other"), now())
                .unwrap_err(),
            b.toggle_vote(&h, &id).unwrap_err(),
            b.remove_option(&h, &id).unwrap_err(),
        ];
        assert!(errors.iter().all(|e| e.kind() == ErrorKind::InvalidState));
    }

    // ==================== Availability ====================

    #[test]
    fn test_availability_counts_and_seeded_votes() {
        let (mut b, u1, u2) = meeting_with_two();
        let h = host().identity();
        b.submit_availability(&u1.identity(), r#"{"2024-06-01": ["18:00"]}"#.into(), now())
            .unwrap();
        b.submit_availability(&u2.identity(), r#""open""#.into(), now())
            .unwrap();

        let six = TimeSlot::parse("2024-06-01", "18:00").unwrap();
        let seven = TimeSlot::parse("2024-06-01", "19:00").unwrap();
        assert_eq!(b.slot_availability(&six).count(), 2);
        assert_eq!(b.slot_availability(&seven).count(), 1);

        b.propose_option(&h, OptionId::new("s6"), OptionAttributes::TimeSlot(six), now())
            .unwrap();
        b.propose_option(&h, OptionId::new("s7"), OptionAttributes::TimeSlot(seven), now())
            .unwrap();

        let t6 = b.tally(&OptionId::new("s6")).unwrap();
        assert_eq!(t6.voters, vec![u1.identity(), u2.identity()]);
        let t7 = b.tally(&OptionId::new("s7")).unwrap();
        assert_eq!(t7.voters, vec![u2.identity()]);

        // A seeded vote toggles off like a manual one
        let off = b.toggle_vote(&u2.identity(), &OptionId::new("s7")).unwrap();
        assert_eq!(off.tally.vote_count, 0);
    }

    #[test]
    fn test_resubmission_replaces() {
        let (mut b, u1, _) = meeting_with_two();
        let first = b
            .submit_availability(&u1.identity(), r#""open""#.into(), now())
            .unwrap();
        assert!(!first.replaced);
        let second = b
            .submit_availability(&u1.identity(), r#"{"2024-06-01": []}"#.into(), now())
            .unwrap();
        assert!(second.replaced);
        assert_eq!(b.availability().len(), 1);
    }

    #[test]
    fn test_malformed_availability_is_stored_and_skipped() {
        let (mut b, u1, u2) = meeting_with_two();
        let stored = b
            .submit_availability(&u1.identity(), "not json".into(), now())
            .unwrap();
        assert!(stored.parse_error.is_some());
        b.submit_availability(&u2.identity(), r#""open""#.into(), now())
            .unwrap();

        let proposed = b
            .propose_option(
                &host().identity(),
                OptionId::new("s1"),
                slot("2024-06-01", "18:00"),
                now(),
            )
            .unwrap();
        assert_eq!(proposed.seeded_voters, vec![u2.identity()]);
        assert_eq!(proposed.skipped.len(), 1);
    }

    #[test]
    fn test_availability_only_for_meetings() {
        let mut b = board(ActivityKind::Restaurant);
        let err = b
            .submit_availability(&host().identity(), r#""open""#.into(), now())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    // ==================== Finalization ====================

    #[test]
    fn test_finalize_picks_strict_leader() {
        let (mut b, u1, u2) = meeting_with_two();
        let h = host().identity();
        b.propose_option(&h, OptionId::new("s1"), slot("2024-06-01", "18:00"), now())
            .unwrap();
        b.propose_option(&h, OptionId::new("s2"), slot("2024-06-02", "18:00"), now())
            .unwrap();
        b.toggle_vote(&u1.identity(), &OptionId::new("s2")).unwrap();
        b.toggle_vote(&u2.identity(), &OptionId::new("s2")).unwrap();
        b.toggle_vote(&h, &OptionId::new("s1")).unwrap();

        let result = b.finalize(&h, FinalizeRequest::default()).unwrap();
        assert_eq!(result.winner.unwrap().id, OptionId::new("s2"));
        assert_eq!(
            b.activity().scheduled_at,
            Some(Utc.with_ymd_and_hms(2024, 6, 2, 18, 0, 0).unwrap())
        );
        assert_eq!(b.options().iter().filter(|o| o.selected).count(), 1);
    }

    #[test]
    fn test_finalize_tie_selects_nothing() {
        let mut b = board(ActivityKind::Restaurant);
        let h = host().identity();
        b.propose_option(&h, OptionId::new("o1"), place("A"), now())
            .unwrap();
        b.propose_option(&h, OptionId::new("o2"), place("B"), now())
            .unwrap();

        let result = b.finalize(&h, FinalizeRequest::default()).unwrap();
        assert!(result.winner.is_none());
        assert!(b.activity().finalized);
        assert!(b.selected_option().is_none());
    }

    #[test]
    fn test_explicit_selection_overrides_tally() {
        let mut b = board(ActivityKind::Restaurant);
        let h = host().identity();
        b.propose_option(&h, OptionId::new("o1"), place("A"), now())
            .unwrap();
        b.propose_option(&h, OptionId::new("o2"), place("B"), now())
            .unwrap();
        b.toggle_vote(&h, &OptionId::new("o1")).unwrap();

        let request = FinalizeRequest {
            selected_option: Some(OptionId::new("o2")),
            location: Some(" Main St ".into()),
            ..Default::default()
        };
        let result = b.finalize(&h, request).unwrap();
        assert_eq!(result.winner.unwrap().id, OptionId::new("o2"));
        assert_eq!(b.activity().selected_option_id, Some(OptionId::new("o2")));
        assert_eq!(b.activity().location.as_deref(), Some("Main St"));
    }

    #[test]
    fn test_finalize_with_foreign_option_has_no_effect() {
        let mut b = board(ActivityKind::Restaurant);
        let h = host().identity();
        b.propose_option(&h, OptionId::new("o1"), place("A"), now())
            .unwrap();
        let before = b.clone();

        let request = FinalizeRequest {
            selected_option: Some(OptionId::new("other-activity-option")),
            welcome_message: Some("hi".into()),
            ..Default::default()
        };
        let err = b.finalize(&h, request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(b, before);
    }

    #[test]
    fn test_double_finalize_and_owner_only() {
        let (mut b, u1, _) = meeting_with_two();
        let h = host().identity();

        let err = b
            .finalize(&u1.identity(), FinalizeRequest::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        b.finalize(&h, FinalizeRequest::default()).unwrap();
        let err = b.finalize(&h, FinalizeRequest::default()).unwrap_err();
        assert_eq!(err, DomainError::AlreadyFinalized);
    }

    #[test]
    fn test_complete_requires_finalized() {
        let mut b = board(ActivityKind::Cocktails);
        let h = host().identity();
        assert_eq!(b.complete(&h).unwrap_err(), DomainError::NotFinalized);
        b.finalize(&h, FinalizeRequest::default()).unwrap();
        b.complete(&h).unwrap();
        assert_eq!(b.complete(&h).unwrap_err(), DomainError::AlreadyCompleted);
        assert_eq!(
            b.reschedule(&h, now()).unwrap_err(),
            DomainError::AlreadyCompleted
        );
    }

    #[test]
    fn test_update_details() {
        let mut b = board(ActivityKind::GameNight);
        let h = host().identity();
        b.update_details(
            &h,
            ActivityDetails {
                title: Some("Catan night".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(b.activity().title, "Catan night");

        let err = b
            .update_details(
                &h,
                ActivityDetails {
                    title: Some(" ".into()),
                    location: Some("Here".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(b.activity().location.is_none());
    }

    #[test]
    fn test_serde_round_trip_keeps_board() {
        let (b, _, _) = meeting_with_two();
        let json = serde_json::to_string(&b).unwrap();
        let back: ActivityBoard = serde_json::from_str(&json).unwrap();
        assert_eq!(back, b);
    }
}
