//
// Copyright 2025 The Project Oak Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Core data model for the content attestation service: identifiers, digests,
//! verdicts and attestations. These types are shared between the verification
//! pipeline, the signer and the HTTP surface.

mod attestation;
mod digest;
mod identifier;
mod verdict;

pub use attestation::Attestation;
pub use digest::{ContentDigest, InvalidDigest};
pub use identifier::{ContentId, InvalidIdentifier, SubjectId};
pub use verdict::Verdict;

/// Canonical verification form of fetched content: the decoded text, its
/// length in canonical units (Unicode scalar values) and the digest over the
/// canonical UTF-8 bytes.
///
/// Only the canonical bytes are ever digested or signed; if a transport-level
/// representation differs from the canonical one, its digest is irrelevant to
/// the attestation.
#[derive(Clone, Debug, PartialEq)]
pub struct CanonicalContent {
    pub text: String,
    pub canonical_length: u64,
    pub digest: ContentDigest,
}
