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

use bridge_codec::{UnshieldRequest, SIG_LEN};
use bridge_relayer_utils::keccak::{keccak256, keccak256_concat};
use bridge_relayer_utils::Error;

/// One beacon's contribution: its slot in the validator set and its
/// recoverable signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeaconEntry {
    /// Slot of the signer in the validator set at `height`.
    pub index: u8,
    /// 64-byte signature followed by a 1-byte recovery id.
    pub signature: [u8; SIG_LEN],
}

/// The signatures an unshield request carries from the beacon validator set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeaconSignatureSet {
    /// Beacon block height the validator set is resolved at.
    pub height: u64,
    /// Signer entries in wire order.
    pub entries: Vec<BeaconEntry>,
}

impl BeaconSignatureSet {
    /// Pairs up the index and signature sequences of a request.
    ///
    /// The wire carries them as two independent counted arrays; a length
    /// mismatch means the request can never verify, so `None`.
    pub fn from_request(request: &UnshieldRequest) -> Option<Self> {
        if request.signer_indexes.len() != request.signatures.len() {
            return None;
        }
        let entries = request
            .signer_indexes
            .iter()
            .zip(&request.signatures)
            .map(|(index, signature)| BeaconEntry {
                index: *index,
                signature: *signature,
            })
            .collect();
        Some(Self {
            height: request.height,
            entries,
        })
    }
}

/// The digest the beacons sign: a double keccak over the block commitment
/// followed by the instruction-tree root.
pub fn signed_digest(block_hash: &[u8; 32], root: &[u8; 32]) -> [u8; 32] {
    keccak256(&keccak256_concat(block_hash, root))
}

/// The smallest signature count that is strictly more than two thirds of a
/// validator set of `beacon_count`.
pub const fn two_thirds_quorum(beacon_count: usize) -> usize {
    beacon_count * 2 / 3 + 1
}

/// Counts the entries whose signature recovers to the claimed beacon key
/// and returns whether they meet the quorum.
///
/// A duplicate slot counts at most once, an out-of-range slot counts
/// never, and an unrecoverable or mismatched signature is simply not
/// counted. Nothing here is an error: hostile input can only lower the
/// count.
pub fn verify(
    set: &BeaconSignatureSet,
    message: &[u8; 32],
    required_quorum: usize,
    beacons: &[libsecp256k1::PublicKey],
) -> bool {
    let mut counted = vec![false; beacons.len()];
    for entry in &set.entries {
        let slot = entry.index as usize;
        let Some(expected) = beacons.get(slot) else {
            continue;
        };
        if counted[slot] {
            continue;
        }
        match recover_signer(message, &entry.signature) {
            Ok(recovered) if recovered == *expected => counted[slot] = true,
            _ => continue,
        }
    }
    counted.iter().filter(|seen| **seen).count() >= required_quorum
}

/// Parses a hex-encoded 64-byte uncompressed beacon public key.
pub fn parse_beacon_key(key: &str) -> bridge_relayer_utils::Result<libsecp256k1::PublicKey> {
    let raw = hex::decode(key.trim_start_matches("0x"))?;
    if raw.len() != 64 {
        return Err(Error::InvalidBeaconKey(raw.len()));
    }
    let mut full = [0u8; 65];
    full[0] = 0x04;
    full[1..].copy_from_slice(&raw);
    let key = libsecp256k1::PublicKey::parse(&full)?;
    Ok(key)
}

fn recover_signer(
    message: &[u8; 32],
    signature: &[u8; SIG_LEN],
) -> Result<libsecp256k1::PublicKey, libsecp256k1::Error> {
    let rs = libsecp256k1::Signature::parse_standard_slice(&signature[..64])?;
    // accept both raw and Ethereum-style (27-offset) recovery ids.
    let v = libsecp256k1::RecoveryId::parse(if signature[64] > 26 {
        signature[64] - 27
    } else {
        signature[64]
    })?;
    libsecp256k1::recover(&libsecp256k1::Message::parse(message), &rs, &v)
}
