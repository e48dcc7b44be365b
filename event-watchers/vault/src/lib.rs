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

//! # Vault Event Watcher 🕸️
//!
//! Watches the vault program's transaction log stream for shield deposits:
//! parses raw log records into [`ShieldEvent`]s, drops replays through the
//! dedup store, and hands accepted events to the sidechain submitter.

use serde::{Deserialize, Serialize};

/// The relay dispatcher driving extraction, dedup and hand-off.
pub mod dispatcher;
/// The shield-event log parser.
pub mod shield_extractor;

pub use dispatcher::{RelayDispatcher, ShieldSubmitter};
pub use shield_extractor::{ExtractionError, ShieldEventExtractor};

/// One transaction log record as delivered by the chain-A log subscription.
///
/// Treated as immutable once received; everything in it is
/// attacker-observable free text except the signature, which the RPC node
/// attests.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogRecord {
    /// Transaction signature, unique per transaction.
    #[serde(default)]
    pub signature: String,
    /// Failure indicator; a non-null value means the transaction failed.
    #[serde(default)]
    pub err: Option<serde_json::Value>,
    /// Program log lines in emission order.
    #[serde(default)]
    pub logs: Vec<String>,
}

/// One confirmed vault deposit, extracted from a log record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ShieldEvent {
    /// Signature of the depositing transaction.
    pub tx_signature: String,
    /// The bridge-proxy identity the log claims.
    pub proxy_address: String,
    /// Sidechain recipient address.
    pub destination_address: String,
    /// Deposited token identifier.
    pub token_identifier: String,
    /// Deposit amount in chain-A base units.
    pub amount: u64,
}
