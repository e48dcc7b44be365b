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

//! # Proof Verification Module 🕸️
//!
//! The two predicates the vault program evaluates before releasing funds:
//! Merkle inclusion of a burn instruction under a committed block root, and
//! a two-thirds beacon signature quorum over that commitment. Both are pure
//! and total — hostile input yields `false`, never a panic.

/// Beacon signature set recovery and quorum counting.
pub mod beacon;
/// Merkle inclusion proofs over burn instructions.
pub mod merkle;

pub use beacon::BeaconSignatureSet;
pub use merkle::MerkleProof;
