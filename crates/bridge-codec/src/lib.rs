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

//! # Bridge Codec Module 🕸️
//!
//! The binary instruction layouts exchanged with the vault program. The
//! vault decodes these bytes on-chain, so the layout here must agree with it
//! bit-for-bit: every integer is little-endian and every variable-length
//! sequence carries an explicit one-byte count. Decoding is strict — a
//! truncated buffer, a trailing byte, or an out-of-range flag is a
//! [`CodecError`], never a partially-populated value.

/// Instruction tag for a shield (deposit) request.
pub const SHIELD_TAG: u8 = 0;
/// Instruction tag for an unshield (withdraw) request.
pub const UNSHIELD_TAG: u8 = 1;
/// Width of the encoded burn instruction reference.
pub const BURN_INST_LEN: usize = 64;
/// Width of a hash (Merkle sibling, root, block hash).
pub const HASH_LEN: usize = 32;
/// Width of a recoverable beacon signature (64-byte signature + recovery id).
pub const SIG_LEN: usize = 65;

/// Errors produced while decoding instruction bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The buffer ended before a field was fully read.
    #[error("Unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof {
        /// Bytes the current field still required.
        needed: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },
    /// Bytes were left over after the last field.
    #[error("Trailing bytes after instruction: {trailing}")]
    TrailingBytes {
        /// Number of undecoded bytes at the end of the buffer.
        trailing: usize,
    },
    /// The first byte did not carry the expected instruction tag.
    #[error("Invalid instruction tag: expected {expected}, found {found}")]
    InvalidTag {
        /// The tag the decoder was asked to accept.
        expected: u8,
        /// The tag actually present in the buffer.
        found: u8,
    },
    /// A path-side flag was neither 0 nor 1.
    #[error("Invalid path side flag: {}", _0)]
    InvalidSideFlag(u8),
    /// A sequence held more entries than its one-byte count can carry.
    #[error("Too many {field} entries: {count}, the count byte caps at 255")]
    TooManyEntries {
        /// Which sequence overflowed.
        field: &'static str,
        /// Number of entries the request held.
        count: usize,
    },
}

/// A type alias for codec results.
pub type Result<T> = std::result::Result<T, CodecError>;

/// A strict cursor over instruction bytes.
///
/// Every read checks the remaining length first, and [`Reader::finish`]
/// rejects leftovers, so decoders built on it can never read past the end or
/// silently ignore attacker-appended bytes.
struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.buf.len() < len {
            return Err(CodecError::UnexpectedEof {
                needed: len,
                remaining: self.buf.len(),
            });
        }
        let (head, rest) = self.buf.split_at(len);
        self.buf = rest;
        Ok(head)
    }

    fn byte(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u64_le(&mut self) -> Result<u64> {
        let bytes = self.take(8)?;
        let mut out = [0u8; 8];
        out.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(out))
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    fn finish(self) -> Result<()> {
        if self.buf.is_empty() {
            Ok(())
        } else {
            Err(CodecError::TrailingBytes {
                trailing: self.buf.len(),
            })
        }
    }
}

/// A withdraw authorization as the vault program consumes it: the burn
/// transaction reference, its inclusion proof against a committed block root,
/// and the beacon signatures over that commitment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnshieldRequest {
    /// Encoded burn instruction reference from the sidechain.
    pub burn_inst: [u8; BURN_INST_LEN],
    /// Beacon block height the proof was issued at.
    pub height: u64,
    /// Merkle siblings, leaf to root.
    pub siblings: Vec<[u8; HASH_LEN]>,
    /// Per-level concatenation order; `true` means the sibling goes on the left.
    pub path_is_left: Vec<bool>,
    /// Expected instruction-tree root.
    pub root: [u8; HASH_LEN],
    /// Block commitment tying the root to a sidechain block.
    pub block_hash: [u8; HASH_LEN],
    /// Beacon slot index per signature.
    pub signer_indexes: Vec<u8>,
    /// Recoverable signatures over the block commitment.
    pub signatures: Vec<[u8; SIG_LEN]>,
}

impl UnshieldRequest {
    /// Serializes the request into instruction bytes.
    ///
    /// Each sequence carries a one-byte count on the wire, so a request
    /// holding more than 255 entries in any of them is unencodable and
    /// rejected rather than silently truncated.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let sibling_count = count_byte("sibling", self.siblings.len())?;
        let flag_count = count_byte("side flag", self.path_is_left.len())?;
        let index_count = count_byte("signer index", self.signer_indexes.len())?;
        let signature_count = count_byte("signature", self.signatures.len())?;
        let mut buf = Vec::with_capacity(self.encoded_len());
        buf.push(UNSHIELD_TAG);
        buf.extend_from_slice(&self.burn_inst);
        buf.extend_from_slice(&self.height.to_le_bytes());
        buf.push(sibling_count);
        for sibling in &self.siblings {
            buf.extend_from_slice(sibling);
        }
        buf.push(flag_count);
        for is_left in &self.path_is_left {
            buf.push(u8::from(*is_left));
        }
        buf.extend_from_slice(&self.root);
        buf.extend_from_slice(&self.block_hash);
        buf.push(index_count);
        buf.extend_from_slice(&self.signer_indexes);
        buf.push(signature_count);
        for signature in &self.signatures {
            buf.extend_from_slice(signature);
        }
        Ok(buf)
    }

    /// Deserializes instruction bytes, rejecting any deviation from the layout.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let tag = reader.byte()?;
        if tag != UNSHIELD_TAG {
            return Err(CodecError::InvalidTag {
                expected: UNSHIELD_TAG,
                found: tag,
            });
        }
        let burn_inst = reader.array::<BURN_INST_LEN>()?;
        let height = reader.u64_le()?;
        let sibling_count = reader.byte()?;
        let mut siblings = Vec::with_capacity(sibling_count as usize);
        for _ in 0..sibling_count {
            siblings.push(reader.array::<HASH_LEN>()?);
        }
        let flag_count = reader.byte()?;
        let mut path_is_left = Vec::with_capacity(flag_count as usize);
        for _ in 0..flag_count {
            let flag = reader.byte()?;
            match flag {
                0 => path_is_left.push(false),
                1 => path_is_left.push(true),
                other => return Err(CodecError::InvalidSideFlag(other)),
            }
        }
        let root = reader.array::<HASH_LEN>()?;
        let block_hash = reader.array::<HASH_LEN>()?;
        let index_count = reader.byte()?;
        let signer_indexes = reader.take(index_count as usize)?.to_vec();
        let signature_count = reader.byte()?;
        let mut signatures = Vec::with_capacity(signature_count as usize);
        for _ in 0..signature_count {
            signatures.push(reader.array::<SIG_LEN>()?);
        }
        reader.finish()?;
        Ok(Self {
            burn_inst,
            height,
            siblings,
            path_is_left,
            root,
            block_hash,
            signer_indexes,
            signatures,
        })
    }

    fn encoded_len(&self) -> usize {
        1 + BURN_INST_LEN
            + 8
            + 1
            + self.siblings.len() * HASH_LEN
            + 1
            + self.path_is_left.len()
            + HASH_LEN
            + HASH_LEN
            + 1
            + self.signer_indexes.len()
            + 1
            + self.signatures.len() * SIG_LEN
    }
}

fn count_byte(field: &'static str, count: usize) -> Result<u8> {
    u8::try_from(count).map_err(|_| CodecError::TooManyEntries { field, count })
}

/// A deposit request as the vault program consumes it.
///
/// The destination address has no length prefix; the vault takes it to be
/// whatever follows the amount. That framing is the vault's existing
/// contract, so it is reproduced here as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShieldRequest {
    /// Deposit amount in chain-A base units.
    pub amount: u64,
    /// Sidechain recipient address bytes.
    pub destination: Vec<u8>,
}

impl ShieldRequest {
    /// Serializes the request into instruction bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(1 + 8 + self.destination.len());
        buf.push(SHIELD_TAG);
        buf.extend_from_slice(&self.amount.to_le_bytes());
        buf.extend_from_slice(&self.destination);
        buf
    }

    /// Deserializes instruction bytes. The destination is everything after
    /// the amount, so there are never trailing bytes to reject.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let tag = reader.byte()?;
        if tag != SHIELD_TAG {
            return Err(CodecError::InvalidTag {
                expected: SHIELD_TAG,
                found: tag,
            });
        }
        let amount = reader.u64_le()?;
        let destination = reader.buf.to_vec();
        Ok(Self {
            amount,
            destination,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> UnshieldRequest {
        UnshieldRequest {
            burn_inst: [0xAB; BURN_INST_LEN],
            height: 42_000,
            siblings: vec![[0x11; HASH_LEN], [0x22; HASH_LEN], [0x33; HASH_LEN]],
            path_is_left: vec![true, false, true],
            root: [0x44; HASH_LEN],
            block_hash: [0x55; HASH_LEN],
            signer_indexes: vec![0, 2, 3],
            signatures: vec![[0x66; SIG_LEN], [0x77; SIG_LEN], [0x88; SIG_LEN]],
        }
    }

    #[test]
    fn round_trips_a_full_request() {
        let request = sample_request();
        let bytes = request.encode().unwrap();
        assert_eq!(UnshieldRequest::decode(&bytes).unwrap(), request);
    }

    #[test]
    fn round_trips_an_empty_request() {
        let request = UnshieldRequest {
            burn_inst: [0; BURN_INST_LEN],
            height: 0,
            siblings: vec![],
            path_is_left: vec![],
            root: [0; HASH_LEN],
            block_hash: [0; HASH_LEN],
            signer_indexes: vec![],
            signatures: vec![],
        };
        let bytes = request.encode().unwrap();
        // tag + burn ref + height + 4 counts + two hashes.
        assert_eq!(bytes.len(), 1 + 64 + 8 + 4 + 64);
        assert_eq!(UnshieldRequest::decode(&bytes).unwrap(), request);
    }

    #[test]
    fn layout_is_little_endian_and_count_prefixed() {
        let request = sample_request();
        let bytes = request.encode().unwrap();
        assert_eq!(bytes[0], UNSHIELD_TAG);
        // height starts right after the burn reference.
        assert_eq!(&bytes[65..73], &42_000u64.to_le_bytes());
        // sibling count precedes the first sibling.
        assert_eq!(bytes[73], 3);
        assert_eq!(&bytes[74..106], &[0x11; HASH_LEN]);
    }

    #[test]
    fn rejects_every_truncation() {
        let bytes = sample_request().encode().unwrap();
        for len in 0..bytes.len() {
            let err = UnshieldRequest::decode(&bytes[..len]).unwrap_err();
            assert!(
                matches!(err, CodecError::UnexpectedEof { .. }),
                "truncation at {len} produced {err:?}"
            );
        }
    }

    #[test]
    fn rejects_trailing_bytes() {
        let mut bytes = sample_request().encode().unwrap();
        bytes.push(0);
        assert_eq!(
            UnshieldRequest::decode(&bytes).unwrap_err(),
            CodecError::TrailingBytes { trailing: 1 }
        );
    }

    #[test]
    fn rejects_wrong_tag() {
        let mut bytes = sample_request().encode().unwrap();
        bytes[0] = SHIELD_TAG;
        assert_eq!(
            UnshieldRequest::decode(&bytes).unwrap_err(),
            CodecError::InvalidTag {
                expected: UNSHIELD_TAG,
                found: SHIELD_TAG
            }
        );
    }

    #[test]
    fn rejects_out_of_range_side_flag() {
        let mut bytes = sample_request().encode().unwrap();
        // first path flag sits after the count byte following the siblings.
        let flag_offset = 1 + 64 + 8 + 1 + 3 * HASH_LEN + 1;
        bytes[flag_offset] = 2;
        assert_eq!(
            UnshieldRequest::decode(&bytes).unwrap_err(),
            CodecError::InvalidSideFlag(2)
        );
    }

    #[test]
    fn rejects_sequences_longer_than_a_count_byte() {
        // 256 entries would wrap the count byte to 0 if written unchecked,
        // producing bytes whose count disagrees with the data.
        let mut request = sample_request();
        request.signer_indexes = vec![0; 256];
        request.signatures = vec![[0x66; SIG_LEN]; 256];
        assert_eq!(
            request.encode().unwrap_err(),
            CodecError::TooManyEntries {
                field: "signer index",
                count: 256
            }
        );

        let mut request = sample_request();
        request.siblings = vec![[0x11; HASH_LEN]; 300];
        assert_eq!(
            request.encode().unwrap_err(),
            CodecError::TooManyEntries {
                field: "sibling",
                count: 300
            }
        );
    }

    #[test]
    fn encodes_a_full_count_byte() {
        let mut request = sample_request();
        request.signer_indexes = vec![7; 255];
        request.signatures = vec![[0x99; SIG_LEN]; 255];
        let bytes = request.encode().unwrap();
        assert_eq!(UnshieldRequest::decode(&bytes).unwrap(), request);
    }

    #[test]
    fn shield_round_trip_keeps_destination_bytes() {
        let request = ShieldRequest {
            amount: 1_000_000,
            destination: b"incAddr123".to_vec(),
        };
        let bytes = request.encode();
        assert_eq!(bytes[0], SHIELD_TAG);
        assert_eq!(&bytes[1..9], &1_000_000u64.to_le_bytes());
        assert_eq!(ShieldRequest::decode(&bytes).unwrap(), request);
    }

    #[test]
    fn shield_allows_empty_destination() {
        let request = ShieldRequest {
            amount: 7,
            destination: vec![],
        };
        assert_eq!(ShieldRequest::decode(&request.encode()).unwrap(), request);
    }

    #[test]
    fn shield_rejects_truncated_amount() {
        let err = ShieldRequest::decode(&[SHIELD_TAG, 1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            CodecError::UnexpectedEof {
                needed: 8,
                remaining: 3
            }
        );
    }
}
