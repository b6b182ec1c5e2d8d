//! Finalize Activity use case
//!
//! Owner-only transitions that lock in and wrap up the plan: finalize,
//! reschedule and complete. Reminder scheduling happens after the commit and
//! is best effort.

use crate::error::RallyError;
use crate::ports::auth_context::Caller;
use crate::ports::clock::Clock;
use crate::ports::notification::EmailKind;
use crate::use_cases::shared::{
    BoardStore, Notifier, activity_payload, member_emails, reminder_recipients,
};
use chrono::{DateTime, Utc};
use rally_domain::{
    Activity, ActivityBoard, ActivityId, FinalizeRequest, Finalization, PlanOption,
    ReminderPolicy, SystemComment, UserDirectory,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Result of finalizing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalizeOutput {
    pub activity: Activity,
    pub winner: Option<PlanOption>,
    pub reminders_scheduled: usize,
}

/// Result of rescheduling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RescheduleOutput {
    pub activity: Activity,
    pub previous: Option<DateTime<Utc>>,
    pub reminders_scheduled: usize,
}

pub struct FinalizeActivityUseCase {
    pub(crate) store: BoardStore,
    pub(crate) directory: Arc<dyn UserDirectory>,
    pub(crate) notifier: Notifier,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) reminders: ReminderPolicy,
}

impl FinalizeActivityUseCase {
    /// Lock in the plan.
    ///
    /// Runs inside the versioned commit loop, so of two racing calls the
    /// second reloads the finalized board and fails with `AlreadyFinalized`.
    pub async fn finalize(
        &self,
        caller: &Caller,
        id: &ActivityId,
        request: FinalizeRequest,
    ) -> Result<FinalizeOutput, RallyError> {
        let actor = caller.identity();
        let (board, finalization) = self
            .store
            .mutate(caller, id, |board| Ok(board.finalize(&actor, request.clone())?))
            .await?;
        let Finalization {
            winner,
            previously_selected,
            scheduled_at,
        } = finalization;
        info!(
            activity = %id,
            winner = ?winner.as_ref().map(|w| w.id.to_string()),
            previously_selected = ?previously_selected.map(|o| o.to_string()),
            "Finalized activity"
        );

        let plan = winner.as_ref().map(|w| w.attributes.label());
        self.notifier
            .comment(id, &actor, SystemComment::Finalized { plan })
            .await;
        let recipients = member_emails(self.directory.as_ref(), &board).await;
        self.notifier
            .email_all(EmailKind::Finalized, &recipients, activity_payload(&board))
            .await;

        let reminders_scheduled = match scheduled_at {
            Some(at) => self.schedule_reminders(&board, at).await,
            None => 0,
        };

        Ok(FinalizeOutput {
            activity: board.activity().clone(),
            winner,
            reminders_scheduled,
        })
    }

    /// Move the scheduled time.
    ///
    /// Allowed until completion. On a finalized activity the old reminders
    /// are cancelled and new ones scheduled; the tier never changes.
    pub async fn reschedule(
        &self,
        caller: &Caller,
        id: &ActivityId,
        at: DateTime<Utc>,
    ) -> Result<RescheduleOutput, RallyError> {
        let actor = caller.identity();
        let (board, previous) = self
            .store
            .mutate(caller, id, |board| Ok(board.reschedule(&actor, at)?))
            .await?;
        info!(activity = %id, from = ?previous, to = %at, "Rescheduled activity");

        self.notifier
            .comment(
                id,
                &actor,
                SystemComment::Rescheduled {
                    when: at.format("%Y-%m-%d %H:%M UTC").to_string(),
                },
            )
            .await;

        let mut reminders_scheduled = 0;
        if board.activity().finalized {
            self.notifier.cancel_reminders(id).await;
            reminders_scheduled = self.schedule_reminders(&board, at).await;
            let recipients = member_emails(self.directory.as_ref(), &board).await;
            self.notifier
                .email_all(EmailKind::Rescheduled, &recipients, activity_payload(&board))
                .await;
        }

        Ok(RescheduleOutput {
            activity: board.activity().clone(),
            previous,
            reminders_scheduled,
        })
    }

    /// Finalized → Completed.
    pub async fn complete(&self, caller: &Caller, id: &ActivityId) -> Result<Activity, RallyError> {
        let actor = caller.identity();
        let (board, ()) = self
            .store
            .mutate(caller, id, |board| Ok(board.complete(&actor)?))
            .await?;
        info!(activity = %id, "Completed activity");

        self.notifier
            .comment(id, &actor, SystemComment::Completed)
            .await;
        let recipients = member_emails(self.directory.as_ref(), &board).await;
        self.notifier
            .email_all(EmailKind::Completed, &recipients, activity_payload(&board))
            .await;

        Ok(board.activity().clone())
    }

    async fn schedule_reminders(&self, board: &ActivityBoard, at: DateTime<Utc>) -> usize {
        let triggers = self.reminders.plan(at, self.clock.now());
        let users = reminder_recipients(board);
        let scheduled = self
            .notifier
            .schedule_reminders(board.activity(), &users, &triggers)
            .await;
        debug!(activity = %board.id(), triggers = triggers.len(), users = users.len(), scheduled, "Scheduled reminders");
        scheduled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::manage_activity::CreateActivityInput;
    use crate::use_cases::test_support::{Harness, RecordingDispatcher, Sent, now};
    use chrono::{Duration, TimeZone};
    use rally_domain::{ActivityKind, DomainError, ErrorKind, OptionId, PlaceAttributes};

    struct Dinner {
        h: Harness,
        host: Caller,
        ana: Caller,
        id: ActivityId,
        a: OptionId,
        b: OptionId,
    }

    async fn dinner_with(dispatcher: RecordingDispatcher) -> Dinner {
        let h = Harness::build(dispatcher, Default::default());
        let host = Caller::user(h.directory.add("host", "host@x.io"));
        let id = h
            .engine
            .activities()
            .create(&host, CreateActivityInput::new(ActivityKind::Restaurant, "Dinner"))
            .await
            .unwrap()
            .activity
            .id;
        let ana = Caller::user(h.directory.add("ana", "ana@x.io"));
        h.engine.participants().invite(&host, &id, "ana@x.io").await.unwrap();
        h.engine.participants().accept(&ana, &id).await.unwrap();

        let options = h.engine.options();
        let a = options
            .propose_place(&host, &id, PlaceAttributes::new("A"))
            .await
            .unwrap()
            .option
            .option
            .id;
        let b = options
            .propose_place(&host, &id, PlaceAttributes::new("B"))
            .await
            .unwrap()
            .option
            .option
            .id;
        h.dispatcher.take();
        Dinner { h, host, ana, id, a, b }
    }

    async fn dinner() -> Dinner {
        dinner_with(RecordingDispatcher::default()).await
    }

    fn selected_count(d: &Dinner) -> usize {
        d.h.repo
            .stored(&d.id)
            .unwrap()
            .options()
            .iter()
            .filter(|o| o.selected)
            .count()
    }

    #[tokio::test]
    async fn test_finalize_picks_leader_and_notifies() {
        let d = dinner().await;
        d.h.engine.options().toggle_vote(&d.ana, &d.id, &d.b).await.unwrap();

        let at = now() + Duration::days(2);
        let request = FinalizeRequest {
            scheduled_at: Some(at),
            ..Default::default()
        };
        let out = d
            .h
            .engine
            .finalization()
            .finalize(&d.host, &d.id, request)
            .await
            .unwrap();

        assert_eq!(out.winner.unwrap().id, d.b);
        assert!(out.activity.finalized);
        assert_eq!(out.activity.selected_option_id, Some(d.b.clone()));
        assert_eq!(selected_count(&d), 1);
        // T-60, T-30 and the morning reminder, for host and ana
        assert_eq!(out.reminders_scheduled, 6);

        let sent = d.h.dispatcher.take();
        let finalized_emails = sent
            .iter()
            .filter(|s| matches!(s, Sent::Email { kind: EmailKind::Finalized, .. }))
            .count();
        assert_eq!(finalized_emails, 2);
        assert!(sent.iter().any(|s| matches!(
            s,
            Sent::Comment { text, .. } if text == "The plan is set: B"
        )));
    }

    #[tokio::test]
    async fn test_explicit_selection_beats_votes() {
        let d = dinner().await;
        d.h.engine.options().toggle_vote(&d.ana, &d.id, &d.b).await.unwrap();

        let request = FinalizeRequest {
            selected_option: Some(d.a.clone()),
            ..Default::default()
        };
        let out = d
            .h
            .engine
            .finalization()
            .finalize(&d.host, &d.id, request)
            .await
            .unwrap();
        assert_eq!(out.winner.unwrap().id, d.a);
        assert_eq!(out.reminders_scheduled, 0);
    }

    #[tokio::test]
    async fn test_foreign_option_leaves_activity_unchanged() {
        let d = dinner().await;
        let before = d.h.repo.stored(&d.id).unwrap();

        let request = FinalizeRequest {
            selected_option: Some(OptionId::new("from-somewhere-else")),
            location: Some("Nowhere".into()),
            ..Default::default()
        };
        let err = d
            .h
            .engine
            .finalization()
            .finalize(&d.host, &d.id, request)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(d.h.repo.stored(&d.id).unwrap(), before);
        assert!(d.h.dispatcher.take().is_empty());
    }

    #[tokio::test]
    async fn test_only_owner_finalizes() {
        let d = dinner().await;
        let err = d
            .h
            .engine
            .finalization()
            .finalize(&d.ana, &d.id, FinalizeRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_racing_finalize_loses_cleanly() {
        let d = dinner().await;

        // Another finalize (explicitly choosing A) commits between our load
        // and our commit.
        let mut rival = d.h.repo.stored(&d.id).unwrap();
        rival
            .finalize(
                &d.host.identity(),
                FinalizeRequest {
                    selected_option: Some(d.a.clone()),
                    ..Default::default()
                },
            )
            .unwrap();
        d.h.repo.interleave_next_commit(rival);

        let request = FinalizeRequest {
            selected_option: Some(d.b.clone()),
            ..Default::default()
        };
        let err = d
            .h
            .engine
            .finalization()
            .finalize(&d.host, &d.id, request)
            .await
            .unwrap_err();

        assert!(matches!(err, RallyError::Domain(DomainError::AlreadyFinalized)));
        let stored = d.h.repo.stored(&d.id).unwrap();
        assert_eq!(stored.activity().selected_option_id, Some(d.a.clone()));
        assert_eq!(selected_count(&d), 1);
    }

    #[tokio::test]
    async fn test_concurrent_finalizes_select_one() {
        let d = dinner().await;
        let uc1 = d.h.engine.finalization();
        let uc2 = d.h.engine.finalization();
        let r1 = FinalizeRequest {
            selected_option: Some(d.a.clone()),
            ..Default::default()
        };
        let r2 = FinalizeRequest {
            selected_option: Some(d.b.clone()),
            ..Default::default()
        };

        let (first, second) = tokio::join!(
            uc1.finalize(&d.host, &d.id, r1),
            uc2.finalize(&d.host, &d.id, r2)
        );

        // Both loaded the same version; the second commit had to retry.
        assert_eq!(*d.h.repo.conflicts.lock().unwrap(), 1);
        let (winner, loser) = match (first, second) {
            (Ok(_), Err(e)) => (d.a.clone(), e),
            (Err(e), Ok(_)) => (d.b.clone(), e),
            (first, second) => panic!("expected one winner, got {first:?} and {second:?}"),
        };
        assert!(matches!(
            loser,
            RallyError::Domain(DomainError::AlreadyFinalized)
        ));

        let stored = d.h.repo.stored(&d.id).unwrap();
        assert_eq!(selected_count(&d), 1);
        assert_eq!(stored.activity().selected_option_id, Some(winner));
    }

    #[tokio::test]
    async fn test_reschedule_supersedes_reminders() {
        let d = dinner().await;
        let finalization = d.h.engine.finalization();
        let at = now() + Duration::days(1);
        finalization
            .finalize(
                &d.host,
                &d.id,
                FinalizeRequest {
                    scheduled_at: Some(at),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        d.h.dispatcher.take();

        let later = Utc.with_ymd_and_hms(2024, 6, 1, 20, 0, 0).unwrap();
        let out = finalization.reschedule(&d.host, &d.id, later).await.unwrap();
        assert_eq!(out.previous, Some(at));
        assert!(out.activity.finalized);

        let sent = d.h.dispatcher.take();
        let cancel_at = sent
            .iter()
            .position(|s| *s == Sent::Cancel(d.id.clone()))
            .unwrap();
        let first_push = sent
            .iter()
            .position(|s| matches!(s, Sent::Push { .. }))
            .unwrap();
        assert!(cancel_at < first_push);
        assert_eq!(out.reminders_scheduled, 6);
    }

    #[tokio::test]
    async fn test_reschedule_before_finalize_schedules_nothing() {
        let d = dinner().await;
        let out = d
            .h
            .engine
            .finalization()
            .reschedule(&d.host, &d.id, now() + Duration::days(3))
            .await
            .unwrap();
        assert_eq!(out.reminders_scheduled, 0);
        assert!(!d.h.dispatcher.take().contains(&Sent::Cancel(d.id.clone())));
    }

    #[tokio::test]
    async fn test_complete_lifecycle() {
        let d = dinner().await;
        let finalization = d.h.engine.finalization();

        let err = finalization.complete(&d.host, &d.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);

        finalization
            .finalize(&d.host, &d.id, FinalizeRequest::default())
            .await
            .unwrap();
        let done = finalization.complete(&d.host, &d.id).await.unwrap();
        assert!(done.completed);

        let err = finalization.complete(&d.host, &d.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        let err = finalization
            .reschedule(&d.host, &d.id, now())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[tokio::test]
    async fn test_failing_reminders_do_not_roll_back() {
        let d = dinner_with(RecordingDispatcher::failing()).await;
        let out = d
            .h
            .engine
            .finalization()
            .finalize(
                &d.host,
                &d.id,
                FinalizeRequest {
                    scheduled_at: Some(now() + Duration::days(1)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(out.reminders_scheduled, 0);
        assert!(d.h.repo.stored(&d.id).unwrap().activity().finalized);
    }
}
