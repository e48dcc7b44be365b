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

use tiny_keccak::{Hasher, Keccak};

/// Computes the keccak-256 digest of `input`.
///
/// This is the hash the vault program uses for Merkle nodes, block
/// commitments and dedup keys, so it must stay bit-for-bit compatible.
pub fn keccak256(input: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(input);
    hasher.finalize(&mut output);
    output
}

/// Computes `keccak256(left ++ right)` without allocating a joined buffer.
pub fn keccak256_concat(left: &[u8], right: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(left);
    hasher.update(right);
    hasher.finalize(&mut output);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_vector() {
        // keccak256("") from the reference test suite.
        let expected =
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470";
        assert_eq!(hex::encode(keccak256(b"")), expected);
    }

    #[test]
    fn concat_equals_joined() {
        let joined = [b"left".as_ref(), b"right".as_ref()].concat();
        assert_eq!(keccak256(&joined), keccak256_concat(b"left", b"right"));
    }
}
