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

use derive_more::Display;
/// Target for logger
pub const TARGET: &str = "bridge_probe";

/// The Kind of the Probe.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// When the Lifecycle of the Relayer changes, like starting or shutting down.
    #[display(fmt = "lifecycle")]
    Lifecycle,
    /// When the relayer sees a new shield event on the vault chain.
    #[display(fmt = "shield")]
    Shield,
    /// When a shield event is handed off for submission to the sidechain.
    #[display(fmt = "relay")]
    Relay,
    /// When a log record claims the trusted proxy but carries another identity.
    #[display(fmt = "trust_violation")]
    TrustViolation,
    /// When the relayer will retry to do something.
    #[display(fmt = "retry")]
    Retry,
}
