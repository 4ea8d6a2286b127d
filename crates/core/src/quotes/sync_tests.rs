//! Tests for the QuoteSyncEngine cycle.
//!
//! # Contract Points
//!
//! 1. A fetch failure aborts the cycle and leaves the collection unchanged
//! 2. Push failures are per quote; the quote stays pending
//! 3. Pushed quotes come back with their remote id, without duplicates
//! 4. Only one cycle runs at a time; overlapping calls are skipped
//! 5. The engine always returns to `Idle`

#[cfg(test)]
mod tests {
    use crate::quotes::{
        errors::{QuoteSyncError, Result},
        model::{NewQuote, Quote},
        notify::{report_sync_failure, report_sync_result},
        ports::{Notifier, RemoteQuoteSource},
        sync::{EngineState, QuoteSyncEngine, QuoteSyncEngineTrait},
        types::QuoteId,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::Notify;

    // =========================================================================
    // Mock RemoteQuoteSource
    // =========================================================================

    #[derive(Default)]
    struct MockRemote {
        quotes: Mutex<Vec<Quote>>,
        next_id: AtomicI64,
        fail_fetch: Mutex<bool>,
        /// Texts whose creation fails.
        reject_texts: Mutex<Vec<String>>,
        /// When set, fetch_all waits until notified.
        gate: Option<Arc<Notify>>,
        fetch_started: Arc<Notify>,
        create_calls: Mutex<Vec<NewQuote>>,
        /// Created copies come back with a blank category.
        blank_created_category: Mutex<bool>,
    }

    impl MockRemote {
        fn with_quotes(quotes: Vec<Quote>, next_id: i64) -> Self {
            Self {
                quotes: Mutex::new(quotes),
                next_id: AtomicI64::new(next_id),
                ..Self::default()
            }
        }

        fn gated(gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::default()
            }
        }

        fn set_fail_fetch(&self, fail: bool) {
            *self.fail_fetch.lock().unwrap() = fail;
        }

        fn reject(&self, text: &str) {
            self.reject_texts.lock().unwrap().push(text.to_string());
        }

        fn create_count(&self) -> usize {
            self.create_calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RemoteQuoteSource for MockRemote {
        async fn fetch_all(&self) -> Result<Vec<Quote>> {
            self.fetch_started.notify_one();
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if *self.fail_fetch.lock().unwrap() {
                return Err(QuoteSyncError::RemoteFetch("connection refused".into()));
            }
            Ok(self.quotes.lock().unwrap().clone())
        }

        async fn create(&self, quote: &NewQuote) -> Result<Quote> {
            self.create_calls.lock().unwrap().push(quote.clone());
            if self.reject_texts.lock().unwrap().contains(&quote.text) {
                return Err(QuoteSyncError::RemotePush("HTTP 500".into()));
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let created = Quote::with_id(id, quote.text.clone(), quote.category.clone());
            self.quotes.lock().unwrap().push(created.clone());
            if *self.blank_created_category.lock().unwrap() {
                return Ok(Quote::with_id(id, quote.text.clone(), ""));
            }
            Ok(created)
        }

        async fn update(&self, quote: &Quote) -> Result<bool> {
            let mut quotes = self.quotes.lock().unwrap();
            match quotes.iter_mut().find(|q| q.id == quote.id) {
                Some(existing) => {
                    *existing = quote.clone();
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<(String, bool)>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, message: &str, is_error: bool) {
            self.messages
                .lock()
                .unwrap()
                .push((message.to_string(), is_error));
        }
    }

    fn q(id: i64, text: &str, category: &str) -> Quote {
        Quote::with_id(id, text, category)
    }

    // =========================================================================
    // Cycle
    // =========================================================================

    #[tokio::test]
    async fn test_pushed_quote_gets_remote_id() {
        let remote = Arc::new(MockRemote::with_quotes(vec![], 9));
        let engine = QuoteSyncEngine::new(remote.clone());

        let cycle = engine
            .run_sync_cycle(vec![Quote::pending("New", "C")])
            .await
            .unwrap();

        assert_eq!(cycle.quotes, vec![q(9, "New", "C")]);
        assert_eq!(cycle.result.pushed_local, vec![q(9, "New", "C")]);
        assert!(cycle.result.failed_pushes.is_empty());
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[tokio::test]
    async fn test_second_cycle_does_not_duplicate_pushed_quote() {
        let remote = Arc::new(MockRemote::with_quotes(vec![q(1, "A", "X")], 9));
        let engine = QuoteSyncEngine::new(remote.clone());

        let first = engine
            .run_sync_cycle(vec![q(1, "A", "X"), Quote::pending("New", "C")])
            .await
            .unwrap();
        let second = engine.run_sync_cycle(first.quotes.clone()).await.unwrap();

        assert_eq!(second.quotes, first.quotes);
        assert!(second.result.is_empty());
        assert_eq!(remote.create_count(), 1);
    }

    #[tokio::test]
    async fn test_unsaved_push_is_adopted_not_recreated() {
        let remote = Arc::new(MockRemote::with_quotes(vec![], 9));
        let engine = QuoteSyncEngine::new(remote.clone());
        let local = vec![Quote::pending("New", "C")];

        engine.run_sync_cycle(local.clone()).await.unwrap();
        // The caller lost the first result and syncs the old collection again.
        let again = engine.run_sync_cycle(local).await.unwrap();

        assert_eq!(again.quotes, vec![q(9, "New", "C")]);
        assert!(again.result.conflicts.is_empty());
        assert_eq!(remote.create_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_and_returns_to_idle() {
        let remote = Arc::new(MockRemote::with_quotes(vec![q(1, "A", "Y")], 2));
        remote.set_fail_fetch(true);
        let engine = QuoteSyncEngine::new(remote.clone());
        let notifier = RecordingNotifier::default();
        let local = vec![q(1, "A", "X")];

        let err = engine.run_sync_cycle(local.clone()).await.unwrap_err();
        report_sync_failure(&err, &notifier);

        assert!(err.aborts_cycle());
        assert_eq!(local, vec![q(1, "A", "X")]);
        assert_eq!(remote.create_count(), 0);
        assert_eq!(notifier.messages.lock().unwrap().len(), 1);
        assert!(notifier.messages.lock().unwrap()[0].1);
        assert_eq!(engine.state(), EngineState::Idle);
        assert!(engine.last_sync_at().is_none());

        remote.set_fail_fetch(false);
        let cycle = engine.run_sync_cycle(local).await.unwrap();
        assert_eq!(cycle.quotes, vec![q(1, "A", "Y")]);
        assert!(engine.last_sync_at().is_some());
    }

    #[tokio::test]
    async fn test_push_failure_is_per_quote() {
        let remote = Arc::new(MockRemote::with_quotes(vec![], 20));
        remote.reject("Bad");
        let engine = QuoteSyncEngine::new(remote.clone());

        let cycle = engine
            .run_sync_cycle(vec![
                Quote::pending("Good", "C"),
                Quote::pending("Bad", "C"),
                Quote::pending("Also good", "C"),
            ])
            .await
            .unwrap();

        assert_eq!(cycle.result.pushed_local.len(), 2);
        assert_eq!(cycle.result.failed_pushes.len(), 1);
        assert_eq!(cycle.result.failed_pushes[0].quote.text, "Bad");
        assert_eq!(remote.create_count(), 3);
        assert!(cycle
            .quotes
            .iter()
            .any(|quote| quote.text == "Bad" && quote.is_pending()));
        assert_eq!(
            cycle.quotes.iter().filter(|quote| !quote.is_pending()).count(),
            2
        );
    }

    #[tokio::test]
    async fn test_merge_applies_conflicts_before_push() {
        let remote = Arc::new(MockRemote::with_quotes(
            vec![q(1, "A", "Y"), q(2, "B", "Z")],
            3,
        ));
        let engine = QuoteSyncEngine::new(remote.clone());
        let persisted: Mutex<Vec<Vec<Quote>>> = Mutex::new(Vec::new());
        let hook = |merged: &[Quote]| -> Result<()> {
            persisted.lock().unwrap().push(merged.to_vec());
            Ok(())
        };

        let cycle = engine
            .run_sync_cycle_staged(vec![q(1, "A", "X"), Quote::pending("L", "C")], &hook)
            .await
            .unwrap();

        let persisted = persisted.lock().unwrap();
        assert_eq!(persisted.len(), 1);
        assert_eq!(
            persisted[0],
            vec![q(1, "A", "Y"), Quote::pending("L", "C"), q(2, "B", "Z")]
        );
        assert_eq!(cycle.result.conflicts.len(), 1);
        assert_eq!(cycle.result.applied_remote_updates.len(), 2);
        assert_eq!(
            cycle.quotes,
            vec![q(1, "A", "Y"), q(3, "L", "C"), q(2, "B", "Z")]
        );
    }

    #[tokio::test]
    async fn test_failing_merge_hook_aborts_before_push() {
        let remote = Arc::new(MockRemote::with_quotes(vec![], 1));
        let engine = QuoteSyncEngine::new(remote.clone());
        let hook = |_: &[Quote]| -> Result<()> { Err(QuoteSyncError::Storage("disk full".into())) };

        let err = engine
            .run_sync_cycle_staged(vec![Quote::pending("L", "C")], &hook)
            .await
            .unwrap_err();

        assert!(matches!(err, QuoteSyncError::Storage(_)));
        assert_eq!(remote.create_count(), 0);
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[tokio::test]
    async fn test_local_quote_deleted_remotely_is_pushed_again() {
        let remote = Arc::new(MockRemote::with_quotes(vec![], 40));
        let engine = QuoteSyncEngine::new(remote.clone());

        let cycle = engine
            .run_sync_cycle(vec![q(7, "Orphan", "X")])
            .await
            .unwrap();

        assert_eq!(cycle.quotes, vec![q(40, "Orphan", "X")]);
        assert_eq!(
            cycle.quotes[0].id.as_ref().map(QuoteId::as_str),
            Some("40")
        );
    }

    #[tokio::test]
    async fn test_invalid_remote_quotes_stay_out_of_collection() {
        let remote = Arc::new(MockRemote::with_quotes(
            vec![q(3, "   ", "X"), q(4, "Ok", ""), q(5, " Fine ", "Y")],
            10,
        ));
        let engine = QuoteSyncEngine::new(remote.clone());
        let notifier = RecordingNotifier::default();

        let cycle = engine.run_sync_cycle(vec![]).await.unwrap();
        report_sync_result(&cycle.result, &notifier);

        assert_eq!(cycle.quotes, vec![q(5, "Fine", "Y")]);
        assert_eq!(
            cycle.result.rejected_remote,
            vec![q(3, "   ", "X"), q(4, "Ok", "")]
        );
        assert_eq!(remote.create_count(), 0);
        assert!(notifier
            .messages
            .lock()
            .unwrap()
            .contains(&("Ignored 2 invalid quotes from server".to_string(), true)));
    }

    #[tokio::test]
    async fn test_local_quote_shadowed_by_invalid_remote_is_not_pushed() {
        let remote = Arc::new(MockRemote::with_quotes(vec![q(3, "", "X")], 10));
        let engine = QuoteSyncEngine::new(remote.clone());

        let cycle = engine.run_sync_cycle(vec![q(3, "Mine", "X")]).await.unwrap();

        assert_eq!(cycle.quotes, vec![q(3, "Mine", "X")]);
        assert_eq!(remote.create_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_created_copy_keeps_sent_content() {
        let remote = Arc::new(MockRemote::with_quotes(vec![], 30));
        *remote.blank_created_category.lock().unwrap() = true;
        let engine = QuoteSyncEngine::new(remote.clone());

        let cycle = engine
            .run_sync_cycle(vec![Quote::pending("New", "C")])
            .await
            .unwrap();

        assert_eq!(cycle.quotes, vec![q(30, "New", "C")]);
        assert_eq!(cycle.result.pushed_local, vec![q(30, "New", "C")]);
    }

    // =========================================================================
    // Single-flight
    // =========================================================================

    #[tokio::test]
    async fn test_overlapping_cycle_is_skipped() {
        let gate = Arc::new(Notify::new());
        let remote = Arc::new(MockRemote::gated(gate.clone()));
        let fetch_started = remote.fetch_started.clone();
        let engine = Arc::new(QuoteSyncEngine::new(remote.clone()));

        let running = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.run_sync_cycle(vec![q(1, "A", "X")]).await })
        };

        tokio::time::timeout(Duration::from_secs(5), fetch_started.notified())
            .await
            .expect("first cycle never reached fetch");
        assert_eq!(engine.state(), EngineState::Syncing);

        let local = vec![q(2, "B", "Y")];
        let skipped = engine.run_sync_cycle(local.clone()).await.unwrap();
        assert!(skipped.result.skipped);
        assert!(skipped.result.is_empty());
        assert_eq!(skipped.quotes, local);

        gate.notify_one();
        let first = running.await.unwrap().unwrap();
        assert!(!first.result.skipped);
        assert_eq!(engine.state(), EngineState::Idle);
    }
}
