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

//! # Relayer Store Module 🕸️
//!
//! A module for managing the storage of the relayer.
//!
//! ## Overview
//!
//! The relayer store module remembers which vault transactions have already
//! been relayed, so that a replayed log subscription never produces a second
//! submission for the same deposit.

use std::sync::Arc;

use bridge_relayer_utils::Result;

/// A module for managing in-memory storage of the relayer.
pub mod mem;
/// A module for setting up and managing a [Sled](https://sled.rs)-based database.
#[cfg(feature = "sled")]
pub mod sled;

/// A store that uses [`sled`](https://sled.rs) as the backend.
#[cfg(feature = "sled")]
pub use self::sled::SledStore;
/// A store that uses in memory data structures as the backend.
pub use mem::InMemoryStore;

/// A Simple Dedup Store, that does not store the transactions, instead it
/// stores the hash of the transaction signature as the key and the value is
/// just empty bytes.
///
/// This is mainly useful to mark a vault transaction as already relayed.
pub trait DedupStore: Send + Sync + Clone {
    /// Check if the transaction signature was already marked as relayed.
    fn has_seen(&self, signature: &[u8]) -> Result<bool>;

    /// Mark the transaction signature as relayed.
    ///
    /// Returns `true` when the signature was not present before, so a single
    /// call doubles as an atomic check-and-mark. Concurrent callers racing on
    /// the same signature get exactly one `true` between them.
    fn mark_seen(&self, signature: &[u8]) -> Result<bool>;

    /// Remove the mark for a transaction signature.
    ///
    /// Used to roll back when a marked transaction could not be handed off
    /// and should be retried by a later replay.
    fn forget(&self, signature: &[u8]) -> Result<()>;
}

impl<S> DedupStore for Arc<S>
where
    S: DedupStore,
{
    fn has_seen(&self, signature: &[u8]) -> Result<bool> {
        S::has_seen(self, signature)
    }

    fn mark_seen(&self, signature: &[u8]) -> Result<bool> {
        S::mark_seen(self, signature)
    }

    fn forget(&self, signature: &[u8]) -> Result<()> {
        S::forget(self, signature)
    }
}
