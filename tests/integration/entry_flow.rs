//! End-to-end runs of the orchestrator against the scripted session.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use raffle_runner::engine::paginator::enumerate_all;
    use raffle_runner::engine::stats::fetch_stats;
    use raffle_runner::engine::submitter::enter;
    use raffle_runner::engine::{CancelToken, EntryOrchestrator};
    use raffle_runner::types::{
        EntryOutcome, RaffleError, RaffleId, RaffleStats, RunStatus, Token,
    };

    use crate::mock_session::*;

    /// Five raffles newest first, R3 already entered, split over two pages.
    fn five_raffles() -> Vec<String> {
        vec![
            page(&[("R5", false), ("R4", false), ("R3", true)], false),
            page(&[("R2", false), ("R1", false)], true),
        ]
    }

    fn orchestrator() -> EntryOrchestrator {
        EntryOrchestrator::new(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_enters_oldest_first_skipping_entered() {
        let session = ScriptedSession::new(five_raffles());

        let result = orchestrator().run(&session, &CancelToken::new()).await.unwrap();

        assert_eq!(session.entered_ids(), vec!["R1", "R2", "R4", "R5"]);
        assert_eq!(result.new_entries, 4);
        assert_eq!(result.total_entered, 5);
        assert_eq!(result.total_raffles, 5);
        assert_eq!(result.status, RunStatus::Completed);
    }

    #[tokio::test]
    async fn test_pagination_uses_last_id_as_cursor() {
        let session = ScriptedSession::new(five_raffles());
        let token = Token::new(LISTING_TOKEN.to_string());

        let all = enumerate_all(&session, &token).await.unwrap();

        assert_eq!(all.len(), 5);
        assert_eq!(session.paginate_starts(), vec!["", "R3"]);
    }

    #[tokio::test]
    async fn test_call_sequence() {
        let session = ScriptedSession::new(vec![page(&[("B", false), ("A", false)], true)]);

        orchestrator().run(&session, &CancelToken::new()).await.unwrap();

        assert_eq!(
            session.calls(),
            vec![
                Call::Listing,
                Call::Paginate { start: String::new() },
                Call::Detail { id: "A".into() },
                Call::Enter {
                    raffle: "A".into(),
                    hash: "hash-A".into(),
                    csrf: "detail-A".into(),
                },
                Call::Detail { id: "B".into() },
                Call::Enter {
                    raffle: "B".into(),
                    hash: "hash-B".into(),
                    csrf: "detail-B".into(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_rejection_stops_remaining_entries() {
        let session = ScriptedSession::new(five_raffles())
            .with_verdict("R2", rejected("You've hit the entry limit"));

        let result = orchestrator().run(&session, &CancelToken::new()).await.unwrap();

        assert_eq!(session.entered_ids(), vec!["R1", "R2"]);
        assert_eq!(result.new_entries, 1);
        assert_eq!(result.total_entered, 2);
        assert_eq!(
            result.status,
            RunStatus::StoppedOnFailure {
                raffle: RaffleId::new("R2").unwrap(),
                reason: "You've hit the entry limit".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_non_boolean_success_is_rejection() {
        let session = ScriptedSession::new(vec![page(&[("R1", false)], true)])
            .with_verdict("R1", r#"{"success": "yes", "message": "ok"}"#.to_string());

        let outcome = enter(&session, &RaffleId::new("r1").unwrap()).await;
        assert_eq!(outcome, EntryOutcome::Rejected("ok".into()));
    }

    #[tokio::test]
    async fn test_enter_canonicalizes_id() {
        let session = ScriptedSession::new(Vec::new());

        let outcome = enter(&session, &RaffleId::new("ab12cd").unwrap()).await;

        assert_eq!(outcome, EntryOutcome::Success);
        assert_eq!(
            session.calls(),
            vec![
                Call::Detail { id: "AB12CD".into() },
                Call::Enter {
                    raffle: "AB12CD".into(),
                    hash: "hash-AB12CD".into(),
                    csrf: "detail-AB12CD".into(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_listing_token_aborts_immediately() {
        let session = ScriptedSession::new(five_raffles())
            .with_listing("<html><script>var nothing = 1;</script></html>");

        let err = orchestrator().run(&session, &CancelToken::new()).await.unwrap_err();

        assert!(matches!(err, RaffleError::TokenMissing(_)));
        assert_eq!(session.calls(), vec![Call::Listing]);
    }

    #[tokio::test]
    async fn test_failed_pagination_enters_nothing() {
        let session = ScriptedSession::new(vec![
            page(&[("R5", false), ("R4", false)], false),
            r#"{"success": false}"#.to_string(),
        ]);

        let err = orchestrator().run(&session, &CancelToken::new()).await.unwrap_err();

        assert!(matches!(err, RaffleError::UpstreamRejected(_)));
        assert!(session.entered_ids().is_empty());
    }

    #[tokio::test]
    async fn test_endless_empty_pages_fail() {
        let session = ScriptedSession::new(vec![page(&[], false), page(&[], false)]);

        let err = orchestrator().run(&session, &CancelToken::new()).await.unwrap_err();

        assert!(matches!(err, RaffleError::MalformedResponse(_)));
        assert_eq!(session.paginate_starts().len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_after_entry_keeps_counts() {
        let cancel = CancelToken::new();
        let session = ScriptedSession::new(five_raffles()).cancel_after_entries(2, cancel.clone());

        let result = orchestrator().run(&session, &cancel).await.unwrap();

        assert_eq!(session.entered_ids(), vec!["R1", "R2"]);
        assert_eq!(result.new_entries, 2);
        assert_eq!(result.total_entered, 3);
        assert_eq!(result.total_raffles, 5);
        assert_eq!(result.status, RunStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_delay() {
        let cancel = CancelToken::new();
        let session = ScriptedSession::new(five_raffles());

        let canceller = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                cancel.cancel();
            })
        };

        // An hour-long delay: the run must wake on cancellation, not the timer.
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            EntryOrchestrator::new(Duration::from_secs(3600)).run(&session, &cancel),
        )
        .await
        .expect("cancellation should interrupt the delay")
        .unwrap();
        canceller.await.unwrap();

        assert_eq!(session.entered_ids(), vec!["R1"]);
        assert_eq!(result.new_entries, 1);
        assert_eq!(result.total_entered, 2);
        assert_eq!(result.status, RunStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_cancel_on_last_entry_still_completes() {
        let cancel = CancelToken::new();
        let session = ScriptedSession::new(vec![page(&[("R1", false)], true)])
            .cancel_after_entries(1, cancel.clone());

        let result = orchestrator().run(&session, &cancel).await.unwrap();

        assert_eq!(result.new_entries, 1);
        assert_eq!(result.status, RunStatus::Completed);
    }

    #[tokio::test]
    async fn test_no_delay_after_last_or_failure() {
        let slow = EntryOrchestrator::new(Duration::from_secs(3600));

        // A single raffle: nothing follows it, so no wait.
        let session = ScriptedSession::new(vec![page(&[("R1", false)], true)]);
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            slow.run(&session, &CancelToken::new()),
        )
        .await
        .expect("no delay after the last entry")
        .unwrap();
        assert_eq!(result.new_entries, 1);
        assert_eq!(result.status, RunStatus::Completed);

        // Rejected on the first attempt: the run stops without waiting.
        let session = ScriptedSession::new(five_raffles())
            .with_verdict("R1", rejected("Raffle ended"));
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            slow.run(&session, &CancelToken::new()),
        )
        .await
        .expect("no delay after a failed entry")
        .unwrap();
        assert_eq!(session.entered_ids(), vec!["R1"]);
        assert_eq!(result.new_entries, 0);
        assert_eq!(
            result.status,
            RunStatus::StoppedOnFailure {
                raffle: RaffleId::new("R1").unwrap(),
                reason: "Raffle ended".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_cancel_after_listing_skips_pagination() {
        let cancel = CancelToken::new();
        let session =
            ScriptedSession::new(five_raffles()).cancel_at(CancelTrigger::AfterListing, cancel.clone());

        let result = orchestrator().run(&session, &cancel).await.unwrap();

        assert_eq!(session.calls(), vec![Call::Listing]);
        assert!(session.paginate_starts().is_empty());
        assert_eq!(result.total_raffles, 0);
        assert_eq!(result.total_entered, 0);
        assert_eq!(result.new_entries, 0);
        assert_eq!(result.status, RunStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_cancel_after_enumeration_enters_nothing() {
        let cancel = CancelToken::new();
        let session =
            ScriptedSession::new(five_raffles()).cancel_at(CancelTrigger::AfterPages(2), cancel.clone());

        let result = orchestrator().run(&session, &cancel).await.unwrap();

        assert_eq!(session.paginate_starts(), vec!["", "R3"]);
        assert!(session.entered_ids().is_empty());
        assert_eq!(result.total_raffles, 5);
        assert_eq!(result.total_entered, 1);
        assert_eq!(result.new_entries, 0);
        assert_eq!(result.status, RunStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_no_open_raffles() {
        let session = ScriptedSession::new(vec![page(&[], true)]);

        let result = orchestrator().run(&session, &CancelToken::new()).await.unwrap();

        assert_eq!(result.total_raffles, 0);
        assert_eq!(result.new_entries, 0);
        assert_eq!(result.status, RunStatus::Completed);
    }

    #[tokio::test]
    async fn test_stats_from_listing() {
        let session = ScriptedSession::new(Vec::new());
        let stats = fetch_stats(&session).await.unwrap();
        assert_eq!(stats, Some(RaffleStats { entered: 1, total: 5 }));
    }
}
