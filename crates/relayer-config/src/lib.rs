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

#![warn(missing_docs)]

//! # Relayer Configuration Module 🕸️
//!
//! A module for configuring the relayer.
//!
//! ## Overview
//!
//! The relayer configuration module is responsible for configuring the relayer.
//! Possible configuration include:
//! * `vault`: The watched vault proxy identity and the log-line layout its
//!   program emits.
//! * `beacon`: The sidechain validator set used to check unshield quorums.

/// CLI configuration
#[cfg(feature = "cli")]
pub mod cli;
/// Utils for processing configuration
pub mod utils;

use serde::{Deserialize, Serialize};

/// The shield-instruction marker is `"Shield"` by default.
fn default_shield_marker() -> String {
    String::from("Shield")
}
/// The instruction-tag line is at index `1` by default.
const fn default_instruction_line() -> usize {
    1
}
/// The data line is at index `6` by default.
const fn default_data_line() -> usize {
    6
}
/// Records with fewer than `6` log lines are rejected by default.
const fn default_min_log_lines() -> usize {
    6
}
/// Data lines are split into segments on `':'` by default.
const fn default_segment_delimiter() -> char {
    ':'
}
/// Payload segments are split into fields on `','` by default.
const fn default_field_delimiter() -> char {
    ','
}

/// BridgeRelayerConfig is the configuration for the vault bridge relayer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct BridgeRelayerConfig {
    /// The watched vault and its log layout.
    #[serde(default)]
    pub vault: VaultConfig,
    /// The beacon validator set for unshield verification.
    #[serde(default)]
    pub beacon: BeaconConfig,
}

impl BridgeRelayerConfig {
    /// Makes sure that the config is valid, by going
    /// through the whole config and doing some basic checks.
    pub fn verify(&self) -> bridge_relayer_utils::Result<()> {
        if self.vault.proxy_address.is_empty() {
            return Err(bridge_relayer_utils::Error::Generic(
                "vault.proxy-address must be configured",
            ));
        }
        for validator in &self.beacon.validators {
            let raw = hex::decode(validator.trim_start_matches("0x"))?;
            if raw.len() != 64 {
                return Err(bridge_relayer_utils::Error::InvalidBeaconKey(
                    raw.len(),
                ));
            }
        }
        Ok(())
    }
}

/// VaultConfig describes the watched vault program: the trusted proxy
/// identity and where shield data sits in its transaction logs.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct VaultConfig {
    /// The trusted bridge-proxy identity; log records claiming any other
    /// proxy are discarded as spoofed.
    #[serde(default)]
    pub proxy_address: String,
    /// Marker token identifying a shield instruction.
    ///
    /// default to "Shield"
    #[serde(default = "default_shield_marker")]
    pub shield_marker: String,
    /// Index of the log line carrying the instruction marker.
    ///
    /// default to 1
    #[serde(default = "default_instruction_line")]
    pub instruction_line: usize,
    /// Index of the log line carrying the shield payload.
    ///
    /// default to 6
    #[serde(default = "default_data_line")]
    pub data_line: usize,
    /// Minimum number of log lines a shield record must carry.
    ///
    /// default to 6
    #[serde(default = "default_min_log_lines")]
    pub min_log_lines: usize,
    /// Delimiter splitting the data line into segments.
    ///
    /// default to ':'
    #[serde(default = "default_segment_delimiter")]
    pub segment_delimiter: char,
    /// Delimiter splitting the payload segment into fields.
    ///
    /// default to ','
    #[serde(default = "default_field_delimiter")]
    pub field_delimiter: char,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            proxy_address: String::new(),
            shield_marker: default_shield_marker(),
            instruction_line: default_instruction_line(),
            data_line: default_data_line(),
            min_log_lines: default_min_log_lines(),
            segment_delimiter: default_segment_delimiter(),
            field_delimiter: default_field_delimiter(),
        }
    }
}

/// BeaconConfig is the sidechain validator-set view used to verify
/// unshield signature quorums.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct BeaconConfig {
    /// Hex-encoded 64-byte uncompressed beacon public keys, in slot order.
    #[serde(default)]
    pub validators: Vec<String>,
    /// Overrides the two-thirds quorum when set.
    #[serde(default)]
    pub required_quorum: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_vault_log_layout() {
        let cfg: VaultConfig = serde_json::from_str(
            r#"{"proxy-address": "8WUP1RGTDTZGYBjkHQfjnwMbnnk25hnE6Du7vFpaq1QK"}"#,
        )
        .unwrap();
        assert_eq!(cfg.shield_marker, "Shield");
        assert_eq!(cfg.instruction_line, 1);
        assert_eq!(cfg.data_line, 6);
        assert_eq!(cfg.min_log_lines, 6);
        assert_eq!(cfg.segment_delimiter, ':');
        assert_eq!(cfg.field_delimiter, ',');
    }

    #[test]
    fn verify_rejects_missing_proxy() {
        let cfg = BridgeRelayerConfig::default();
        assert!(cfg.verify().is_err());
    }

    #[test]
    fn verify_rejects_short_beacon_keys() {
        let cfg = BridgeRelayerConfig {
            vault: VaultConfig {
                proxy_address: String::from("proxy"),
                ..Default::default()
            },
            beacon: BeaconConfig {
                validators: vec![String::from("deadbeef")],
                required_quorum: None,
            },
        };
        assert!(matches!(
            cfg.verify(),
            Err(bridge_relayer_utils::Error::InvalidBeaconKey(4))
        ));
    }

    #[test]
    fn verify_accepts_full_beacon_keys() {
        let cfg = BridgeRelayerConfig {
            vault: VaultConfig {
                proxy_address: String::from("proxy"),
                ..Default::default()
            },
            beacon: BeaconConfig {
                validators: vec![format!("0x{}", "ab".repeat(64))],
                required_quorum: Some(1),
            },
        };
        assert!(cfg.verify().is_ok());
    }
}
