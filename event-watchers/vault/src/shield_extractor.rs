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

use bridge_relayer_config::VaultConfig;

use crate::{LogRecord, ShieldEvent};

/// Why a log record did not yield a shield event.
///
/// None of these are fatal to the caller; the dispatcher decides per
/// variant whether the record is normal traffic, garbage, or a forgery
/// attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    /// The transaction itself failed on chain A.
    #[error("Transaction failed on chain")]
    FailedTransaction,
    /// The record carries no transaction signature.
    #[error("Log record is missing a signature")]
    MissingSignature,
    /// The log shape does not match the vault program's shield layout.
    #[error("Malformed log record: {}", _0)]
    MalformedLog(&'static str),
    /// The instruction line carries no shield marker; unrelated traffic.
    #[error("Not a shield instruction")]
    NotShieldInstruction,
    /// The record claims a proxy identity other than the trusted one.
    #[error("Untrusted proxy: expected {expected}, found {found}")]
    UntrustedProxy {
        /// The configured bridge-proxy identity.
        expected: String,
        /// The identity the log actually carried.
        found: String,
    },
}

/// Parses vault transaction logs into [`ShieldEvent`]s.
///
/// The log format is free text owned by the vault program, so every offset
/// and delimiter comes from [`VaultConfig`] rather than being hardcoded.
#[derive(Debug, Clone)]
pub struct ShieldEventExtractor {
    config: VaultConfig,
}

impl ShieldEventExtractor {
    /// Creates an extractor over the given vault log layout.
    pub fn new(config: VaultConfig) -> Self {
        Self { config }
    }

    /// Runs the validation ladder over one record.
    ///
    /// Short-circuits on the first failure; the order matters, since a
    /// failed transaction or unrelated instruction must be classified as
    /// such even when its payload is also malformed.
    pub fn extract(&self, record: &LogRecord) -> Result<ShieldEvent, ExtractionError> {
        if record.err.is_some() {
            return Err(ExtractionError::FailedTransaction);
        }
        if record.signature.is_empty() {
            return Err(ExtractionError::MissingSignature);
        }
        if record.logs.len() < self.config.min_log_lines {
            return Err(ExtractionError::MalformedLog("too few log lines"));
        }
        let instruction_line = record
            .logs
            .get(self.config.instruction_line)
            .ok_or(ExtractionError::NotShieldInstruction)?;
        if !instruction_line.contains(&self.config.shield_marker) {
            return Err(ExtractionError::NotShieldInstruction);
        }
        let data_line = record
            .logs
            .get(self.config.data_line)
            .ok_or(ExtractionError::MalformedLog("missing data line"))?;
        let segments: Vec<&str> =
            data_line.split(self.config.segment_delimiter).collect();
        if segments.len() < 3 {
            return Err(ExtractionError::MalformedLog("too few data segments"));
        }
        // the payload is always the final segment; earlier segments are
        // log-prefix noise of varying depth.
        let payload = segments[segments.len() - 1];
        let fields: Vec<&str> =
            payload.split(self.config.field_delimiter).collect();
        if fields.len() < 4 {
            return Err(ExtractionError::MalformedLog("too few payload fields"));
        }
        let proxy_address = fields[0].trim();
        if proxy_address != self.config.proxy_address {
            return Err(ExtractionError::UntrustedProxy {
                expected: self.config.proxy_address.clone(),
                found: proxy_address.to_string(),
            });
        }
        let amount = fields[3]
            .trim()
            .parse::<u64>()
            .map_err(|_| ExtractionError::MalformedLog("invalid amount"))?;
        Ok(ShieldEvent {
            tx_signature: record.signature.clone(),
            proxy_address: proxy_address.to_string(),
            destination_address: fields[1].trim().to_string(),
            token_identifier: fields[2].trim().to_string(),
            amount,
        })
    }
}
