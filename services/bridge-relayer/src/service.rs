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

//! The relay service loop.
//!
//! Log records arrive as JSON lines on an async reader (in production the
//! RPC log subscription is bridged into this form) and are fed one at a
//! time to the dispatcher, preserving stream order.

use bridge_relayer_store::DedupStore;
use bridge_relayer_utils::{probe, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use vault_event_watcher::{LogRecord, RelayDispatcher, ShieldEvent, ShieldSubmitter};

/// Feeds JSON-encoded log records from `reader` to the dispatcher until
/// the stream ends.
///
/// A line that fails to parse is logged and skipped; the stream is
/// external input and one bad line must not stop the relay.
pub async fn relay_json_lines<S, T, R>(
    dispatcher: &RelayDispatcher<S, T>,
    reader: R,
) -> Result<()>
where
    S: DedupStore,
    T: ShieldSubmitter,
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let record: LogRecord = match serde_json::from_str(&line) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "skipping undecodable log record line");
                continue;
            }
        };
        dispatcher.on_log_record(&record).await?;
    }
    tracing::debug!("log record stream ended");
    Ok(())
}

/// A submitter that only records the hand-off in the probe log.
///
/// Stands in for the sidechain minting client, which owns wallets and RPC
/// plumbing outside this daemon.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSubmitter;

#[async_trait::async_trait]
impl ShieldSubmitter for LoggingSubmitter {
    async fn submit(&self, event: ShieldEvent) -> Result<()> {
        tracing::event!(
            target: probe::TARGET,
            tracing::Level::INFO,
            kind = %probe::Kind::Relay,
            signature = %event.tx_signature,
            destination = %event.destination_address,
            token = %event.token_identifier,
            amount = %event.amount,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_relayer_config::VaultConfig;
    use bridge_relayer_store::InMemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const PROXY: &str = "8WUP1RGTDTZGYBjkHQfjnwMbnnk25hnE6Du7vFpaq1QK";

    #[derive(Debug, Clone, Default)]
    struct CountingSubmitter {
        submissions: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl ShieldSubmitter for CountingSubmitter {
        async fn submit(&self, _event: ShieldEvent) -> Result<()> {
            self.submissions.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn record_line(signature: &str) -> String {
        let record = LogRecord {
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
        };
        serde_json::to_string(&record).unwrap()
    }

    #[tokio::test]
    async fn relays_each_record_once_and_skips_garbage() {
        let submitter = CountingSubmitter::default();
        let config = VaultConfig {
            proxy_address: PROXY.into(),
            ..Default::default()
        };
        let dispatcher = RelayDispatcher::new(
            config,
            InMemoryStore::default(),
            submitter.clone(),
        );
        let input = format!(
            "{}\nnot json at all\n\n{}\n{}\n",
            record_line("sig1"),
            record_line("sig2"),
            record_line("sig1"),
        );
        relay_json_lines(&dispatcher, input.as_bytes()).await.unwrap();
        assert_eq!(submitter.submissions.load(Ordering::SeqCst), 2);
    }
}
