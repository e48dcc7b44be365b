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

use std::collections::HashSet;
use std::sync::Arc;

use bridge_relayer_utils::keccak::keccak256;
use parking_lot::RwLock;

use super::DedupStore;

type SeenSet = HashSet<[u8; 32]>;

/// InMemoryStore is a store that keeps the relayed-signature set in memory.
///
/// The set does not survive a restart; production deployments use the
/// sled-backed store and keep this one for tests.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    seen_signatures: Arc<RwLock<SeenSet>>,
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore").finish()
    }
}

impl DedupStore for InMemoryStore {
    fn has_seen(&self, signature: &[u8]) -> bridge_relayer_utils::Result<bool> {
        let hash = keccak256(signature);
        let guard = self.seen_signatures.read();
        Ok(guard.contains(&hash))
    }

    fn mark_seen(&self, signature: &[u8]) -> bridge_relayer_utils::Result<bool> {
        let hash = keccak256(signature);
        let mut guard = self.seen_signatures.write();
        Ok(guard.insert(hash))
    }

    fn forget(&self, signature: &[u8]) -> bridge_relayer_utils::Result<()> {
        let hash = keccak256(signature);
        let mut guard = self.seen_signatures.write();
        guard.remove(&hash);
        Ok(())
    }
}
