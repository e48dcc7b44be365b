// Copyright 2024 Vault Bridge Developers.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::time::Duration;

use bridge_relayer_config::VaultConfig;
use bridge_relayer_store::DedupStore;
use bridge_relayer_utils::retry::ConstantWithMaxRetryCount;
use bridge_relayer_utils::{probe, Result};

use crate::shield_extractor::{ExtractionError, ShieldEventExtractor};
use crate::{LogRecord, ShieldEvent};

/// The downstream collaborator that credits a shield event on the sidechain.
#[async_trait::async_trait]
pub trait ShieldSubmitter: Send + Sync {
    /// Submits one accepted shield event for minting on chain B.
    async fn submit(&self, event: ShieldEvent) -> Result<()>;
}

/// Drives one log record through extract → dedup → hand-off.
///
/// The single entry point of the relay: the log subscription calls
/// [`RelayDispatcher::on_log_record`] once per delivered record, in stream
/// order. The dedup store is owned here and never mutated elsewhere, which
/// is what makes the mark-before-hand-off ordering a real guarantee.
#[derive(Debug, Clone)]
pub struct RelayDispatcher<S, T>
where
    S: DedupStore,
    T: ShieldSubmitter,
{
    extractor: ShieldEventExtractor,
    store: S,
    submitter: T,
    submit_retries: usize,
}

impl<S, T> RelayDispatcher<S, T>
where
    S: DedupStore,
    T: ShieldSubmitter,
{
    /// Creates a dispatcher over the given store and submitter.
    pub fn new(config: VaultConfig, store: S, submitter: T) -> Self {
        Self {
            extractor: ShieldEventExtractor::new(config),
            store,
            submitter,
            submit_retries: 3,
        }
    }

    /// Handles one delivered log record.
    ///
    /// Never fails on record content; only a store failure surfaces as an
    /// error. Malformed and hostile records cost one discarded event each.
    #[tracing::instrument(skip(self, record), fields(signature = %record.signature))]
    pub async fn on_log_record(&self, record: &LogRecord) -> Result<()> {
        let event = match self.extractor.extract(record) {
            Ok(event) => event,
            Err(e) => {
                self.log_rejection(record, &e);
                return Ok(());
            }
        };
        // mark before hand-off, so a concurrent redelivery of the same
        // signature cannot pass the check while submission is in flight.
        let newly_seen = self.store.mark_seen(record.signature.as_bytes())?;
        if !newly_seen {
            tracing::trace!(
                signature = %record.signature,
                "shield event already relayed, discarding",
            );
            return Ok(());
        }
        tracing::event!(
            target: probe::TARGET,
            tracing::Level::DEBUG,
            kind = %probe::Kind::Shield,
            signature = %event.tx_signature,
            token = %event.token_identifier,
            amount = %event.amount,
        );
        let backoff = ConstantWithMaxRetryCount::new(
            Duration::from_millis(100),
            self.submit_retries,
        );
        let task = || async {
            self.submitter
                .submit(event.clone())
                .await
                .map_err(backoff::Error::transient)
        };
        match backoff::future::retry(backoff, task).await {
            Ok(()) => {
                tracing::event!(
                    target: probe::TARGET,
                    tracing::Level::DEBUG,
                    kind = %probe::Kind::Relay,
                    signature = %event.tx_signature,
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    signature = %event.tx_signature,
                    error = %e,
                    "failed to hand off shield event, unmarking for redelivery",
                );
                // let a later redelivery take another shot at it.
                self.store.forget(record.signature.as_bytes())?;
                Ok(())
            }
        }
    }

    fn log_rejection(&self, record: &LogRecord, error: &ExtractionError) {
        match error {
            ExtractionError::NotShieldInstruction => {
                tracing::trace!(signature = %record.signature, "unrelated instruction");
            }
            ExtractionError::FailedTransaction => {
                tracing::debug!(signature = %record.signature, "failed transaction, skipping");
            }
            ExtractionError::MissingSignature
            | ExtractionError::MalformedLog(_) => {
                tracing::warn!(
                    signature = %record.signature,
                    error = %error,
                    "discarding malformed log record",
                );
            }
            ExtractionError::UntrustedProxy { expected, found } => {
                tracing::event!(
                    target: probe::TARGET,
                    tracing::Level::ERROR,
                    kind = %probe::Kind::TrustViolation,
                    signature = %record.signature,
                    expected_proxy = %expected,
                    found_proxy = %found,
                );
                tracing::error!(
                    signature = %record.signature,
                    error = %error,
                    "discarding log record from untrusted proxy",
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_relayer_store::InMemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const PROXY: &str = "8WUP1RGTDTZGYBjkHQfjnwMbnnk25hnE6Du7vFpaq1QK";

    #[derive(Debug, Clone, Default)]
    struct CountingSubmitter {
        submissions: Arc<AtomicUsize>,
        failures_left: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl ShieldSubmitter for CountingSubmitter {
        async fn submit(&self, _event: ShieldEvent) -> Result<()> {
            if self.failures_left.load(Ordering::SeqCst) > 0 {
                self.failures_left.fetch_sub(1, Ordering::SeqCst);
                return Err(bridge_relayer_utils::Error::Generic(
                    "submission failed",
                ));
            }
            self.submissions.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn dispatcher(
        submitter: CountingSubmitter,
    ) -> RelayDispatcher<InMemoryStore, CountingSubmitter> {
        let config = VaultConfig {
            proxy_address: PROXY.into(),
            ..Default::default()
        };
        RelayDispatcher::new(config, InMemoryStore::default(), submitter)
    }

    fn shield_record(signature: &str) -> LogRecord {
        LogRecord {
            signature: signature.into(),
            err: None,
            logs: vec![
                "Program invoked".into(),
                "Program log: Shield".into(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                format!("Program log: data:{PROXY},incAddr123,USDT,1000000"),
            ],
        }
    }

    #[tokio::test]
    async fn identical_records_yield_one_hand_off() {
        let submitter = CountingSubmitter::default();
        let dispatcher = dispatcher(submitter.clone());
        let record = shield_record("sig1");
        dispatcher.on_log_record(&record).await.unwrap();
        dispatcher.on_log_record(&record).await.unwrap();
        assert_eq!(submitter.submissions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_signatures_are_all_relayed() {
        let submitter = CountingSubmitter::default();
        let dispatcher = dispatcher(submitter.clone());
        dispatcher.on_log_record(&shield_record("sig1")).await.unwrap();
        dispatcher.on_log_record(&shield_record("sig2")).await.unwrap();
        assert_eq!(submitter.submissions.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn rejected_records_are_never_handed_off() {
        let submitter = CountingSubmitter::default();
        let dispatcher = dispatcher(submitter.clone());

        let mut failed = shield_record("sig-failed");
        failed.err = Some(serde_json::json!("InstructionError"));
        dispatcher.on_log_record(&failed).await.unwrap();

        let mut short = shield_record("sig-short");
        short.logs.truncate(2);
        dispatcher.on_log_record(&short).await.unwrap();

        let mut spoofed = shield_record("sig-spoofed");
        spoofed.logs[6] =
            "Program log: data:EvilProxy,incAddr123,USDT,1000000".into();
        dispatcher.on_log_record(&spoofed).await.unwrap();

        assert_eq!(submitter.submissions.load(Ordering::SeqCst), 0);
        assert!(logs_contain("untrusted proxy"));
    }

    #[tokio::test]
    async fn transient_submit_failures_are_retried() {
        let submitter = CountingSubmitter::default();
        submitter.failures_left.store(2, Ordering::SeqCst);
        let dispatcher = dispatcher(submitter.clone());
        dispatcher.on_log_record(&shield_record("sig1")).await.unwrap();
        assert_eq!(submitter.submissions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausted_retries_unmark_the_signature() {
        let submitter = CountingSubmitter::default();
        // more failures than the dispatcher will retry.
        submitter.failures_left.store(100, Ordering::SeqCst);
        let dispatcher = dispatcher(submitter.clone());
        let record = shield_record("sig1");
        dispatcher.on_log_record(&record).await.unwrap();
        assert_eq!(submitter.submissions.load(Ordering::SeqCst), 0);

        // a redelivery after the failures clear succeeds.
        submitter.failures_left.store(0, Ordering::SeqCst);
        dispatcher.on_log_record(&record).await.unwrap();
        assert_eq!(submitter.submissions.load(Ordering::SeqCst), 1);
    }
}
