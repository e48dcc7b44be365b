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

use std::path::Path;

use bridge_relayer_utils::keccak::keccak256;

use super::DedupStore;

const SEEN_SIGNATURES_TREE: &str = "seen_signatures";

/// SledStore keeps the relayed-signature set in a
/// [Sled](https://sled.rs)-based database, so the dedup guarantee survives a
/// relayer restart.
#[derive(Clone)]
pub struct SledStore {
    db: sled::Db,
}

impl std::fmt::Debug for SledStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledStore").finish()
    }
}

impl SledStore {
    /// Create a new SledStore.
    pub fn open<P: AsRef<Path>>(path: P) -> bridge_relayer_utils::Result<Self> {
        let db = sled::Config::new()
            .path(path)
            .temporary(cfg!(test))
            .mode(sled::Mode::HighThroughput)
            .open()?;
        Ok(Self { db })
    }

    /// Creates a temporary SledStore.
    pub fn temporary() -> bridge_relayer_utils::Result<Self> {
        let dir = tempfile::tempdir()?;
        Self::open(dir.path())
    }

    /// Gets the total amount of data stored on disk
    pub fn get_data_stored_size(&self) -> u64 {
        self.db.size_on_disk().unwrap_or_default()
    }
}

impl DedupStore for SledStore {
    fn has_seen(&self, signature: &[u8]) -> bridge_relayer_utils::Result<bool> {
        let tree = self.db.open_tree(SEEN_SIGNATURES_TREE)?;
        let hash = keccak256(signature);
        let exists = tree.contains_key(hash)?;
        Ok(exists)
    }

    fn mark_seen(&self, signature: &[u8]) -> bridge_relayer_utils::Result<bool> {
        let tree = self.db.open_tree(SEEN_SIGNATURES_TREE)?;
        let hash = keccak256(signature);
        let old = tree.insert(hash, &[])?;
        Ok(old.is_none())
    }

    fn forget(&self, signature: &[u8]) -> bridge_relayer_utils::Result<()> {
        let tree = self.db.open_tree(SEEN_SIGNATURES_TREE)?;
        let hash = keccak256(signature);
        tree.remove(hash)?;
        Ok(())
    }
}
