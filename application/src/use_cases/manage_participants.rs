//! Manage Participants use case
//!
//! The invite → accept / decline → leave / remove lifecycle, plus guest
//! token issuance. Every transition commits first and notifies second.

use crate::error::RallyError;
use crate::ports::auth_context::Caller;
use crate::ports::clock::{Clock, TokenGenerator};
use crate::ports::notification::EmailKind;
use crate::use_cases::resolve_identity::IdentityResolver;
use crate::use_cases::shared::{BoardStore, Notifier, activity_payload};
use crate::use_cases::views::{GuestTokenGrant, ParticipantView};
use rally_domain::{ActivityId, Email, InviteOutcome, SystemComment, UserDirectory};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

pub struct ManageParticipantsUseCase {
    pub(crate) store: BoardStore,
    pub(crate) resolver: IdentityResolver,
    pub(crate) directory: Arc<dyn UserDirectory>,
    pub(crate) notifier: Notifier,
    pub(crate) tokens: Arc<dyn TokenGenerator>,
    pub(crate) clock: Arc<dyn Clock>,
}

impl ManageParticipantsUseCase {
    /// Invite an e-mail address. Re-inviting is a successful no-op.
    pub async fn invite(
        &self,
        caller: &Caller,
        id: &ActivityId,
        email: &str,
    ) -> Result<InviteOutcome, RallyError> {
        let resolved = self.resolver.resolve(email).await?;
        let email = resolved.email().clone();
        let account = resolved.user().cloned();
        let actor = caller.identity();
        let now = self.clock.now();

        let (board, outcome) = self
            .store
            .mutate(caller, id, |board| {
                Ok(board.invite(&actor, email.clone(), account.as_ref(), now)?)
            })
            .await?;

        match &outcome {
            InviteOutcome::Invited(participant) => {
                info!(activity = %id, invitee = %participant.email, registered = account.is_some(), "Invited participant");
                let mut payload = activity_payload(&board);
                payload["invited_by"] = json!(caller.display_name());
                payload["registered"] = json!(account.is_some());
                self.notifier
                    .email(EmailKind::Invitation, &participant.email, payload)
                    .await;
            }
            InviteOutcome::AlreadyInvited(_) | InviteOutcome::AlreadyOwner => {
                info!(activity = %id, invitee = %email, "Invite was a no-op");
            }
        }
        Ok(outcome)
    }

    /// The caller accepts their own invitation.
    pub async fn accept(&self, caller: &Caller, id: &ActivityId) -> Result<ParticipantView, RallyError> {
        let email = caller.email().clone();
        let account = match caller.account() {
            Some(user) => Some(user.clone()),
            None => self.resolver.account(&email).await?,
        };

        let (board, participant) = self
            .store
            .mutate(caller, id, |board| Ok(board.accept(&email, account.as_ref())?))
            .await?;
        info!(activity = %id, participant = %email, "Participant accepted");

        let who = account
            .as_ref()
            .map(|u| u.display_name.clone())
            .unwrap_or_else(|| email.local_part().to_string());
        self.notifier
            .comment(id, &participant.identity(), SystemComment::Joined { who: who.clone() })
            .await;

        match self.directory.find_by_id(&board.activity().owner).await {
            Ok(Some(owner)) => {
                let mut payload = activity_payload(&board);
                payload["participant"] = json!(who);
                self.notifier
                    .email(EmailKind::Accepted, &owner.email, payload)
                    .await;
            }
            Ok(None) => warn!(activity = %id, "Owner account missing; acceptance e-mail skipped"),
            Err(e) => warn!(activity = %id, error = %e, "Owner lookup failed; acceptance e-mail skipped"),
        }

        Ok(ParticipantView::from(&participant))
    }

    /// The caller declines a pending invitation.
    pub async fn decline(&self, caller: &Caller, id: &ActivityId) -> Result<(), RallyError> {
        let email = caller.email().clone();
        let (_, participant) = self
            .store
            .mutate(caller, id, |board| Ok(board.decline(&email)?))
            .await?;
        info!(activity = %id, participant = %email, "Participant declined");

        self.notifier
            .comment(
                id,
                &participant.identity(),
                SystemComment::Declined {
                    who: caller.display_name().to_string(),
                },
            )
            .await;
        Ok(())
    }

    /// The caller leaves. Their votes and availability go with them.
    pub async fn leave(&self, caller: &Caller, id: &ActivityId) -> Result<(), RallyError> {
        let actor = caller.identity();
        self.store
            .mutate(caller, id, |board| Ok(board.leave(&actor)?))
            .await?;
        info!(activity = %id, participant = %actor, "Participant left");

        self.notifier
            .comment(
                id,
                &actor,
                SystemComment::Left {
                    who: caller.display_name().to_string(),
                },
            )
            .await;
        Ok(())
    }

    /// Owner removes a participant by e-mail.
    pub async fn remove(
        &self,
        caller: &Caller,
        id: &ActivityId,
        email: &str,
    ) -> Result<ParticipantView, RallyError> {
        let resolved = self.resolver.resolve(email).await?;
        let email = resolved.email().clone();
        let account = resolved.user().cloned();
        let actor = caller.identity();

        let (_, removed) = self
            .store
            .mutate(caller, id, |board| {
                Ok(board.remove_participant(&actor, &email, account.as_ref())?)
            })
            .await?;
        info!(activity = %id, participant = %removed.email, "Participant removed by host");

        self.notifier
            .comment(
                id,
                &actor,
                SystemComment::Removed {
                    who: resolved.display_name().to_string(),
                },
            )
            .await;
        Ok(ParticipantView::from(&removed))
    }

    /// Everyone on the activity. Members only.
    pub async fn list(&self, caller: &Caller, id: &ActivityId) -> Result<Vec<ParticipantView>, RallyError> {
        let loaded = self.store.load_as_member(caller, id).await?;
        Ok(loaded
            .value
            .participants()
            .iter()
            .map(ParticipantView::from)
            .collect())
    }

    /// Owner fetches (minting on first use) a participant's guest token.
    pub async fn issue_guest_token(
        &self,
        caller: &Caller,
        id: &ActivityId,
        email: &str,
    ) -> Result<GuestTokenGrant, RallyError> {
        let email = Email::parse(email)?;
        let actor = caller.identity();
        let tokens = Arc::clone(&self.tokens);

        let (_, (token, minted)) = self
            .store
            .mutate(caller, id, |board| {
                Ok(board.issue_guest_token(&actor, &email, || tokens.guest_token())?)
            })
            .await?;
        if minted {
            info!(activity = %id, participant = %email, "Minted guest token");
        }

        Ok(GuestTokenGrant {
            email,
            token,
            minted,
        })
    }
}
