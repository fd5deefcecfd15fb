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

use core::fmt;

use attestation_types::{CanonicalContent, ContentDigest};
use sha2::{Digest, Sha256};

/// Failure to reduce fetched bytes to the canonical form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// The payload is not valid UTF-8. `valid_up_to` is the length of the
    /// longest valid prefix.
    InvalidUtf8 { valid_up_to: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::InvalidUtf8 { valid_up_to } => {
                write!(f, "content is not valid UTF-8 (valid up to byte {valid_up_to})")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Reduces fetched bytes to the canonical verification form.
///
/// For text payloads the canonical form is the decoded text itself: the
/// canonical length counts Unicode scalar values, and the digest is SHA-256
/// over the canonical UTF-8 bytes. Only the canonical digest is ever signed.
pub fn canonicalize(bytes: &[u8]) -> Result<CanonicalContent, DecodeError> {
    let text = core::str::from_utf8(bytes)
        .map_err(|err| DecodeError::InvalidUtf8 { valid_up_to: err.valid_up_to() })?;
    let digest = ContentDigest::from_bytes(Sha256::digest(text.as_bytes()).into());
    Ok(CanonicalContent {
        text: text.to_string(),
        canonical_length: text.chars().count() as u64,
        digest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalization_is_deterministic() {
        let bytes = "Hello, accessible world!".as_bytes();
        let first = canonicalize(bytes).expect("content should decode");
        let second = canonicalize(bytes).expect("content should decode");
        assert_eq!(first, second);
        assert_eq!(first.canonical_length, 24);
    }

    #[test]
    fn canonical_length_counts_scalar_values_not_bytes() {
        let content = canonicalize("héllo✓".as_bytes()).expect("content should decode");
        assert_eq!(content.canonical_length, 6);
        assert!(content.text.len() > 6);
    }

    #[test]
    fn known_digest_value() {
        // SHA-256 of the ASCII bytes of "abc".
        let content = canonicalize(b"abc").expect("content should decode");
        assert_eq!(
            content.digest.to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = canonicalize(&[b'h', b'i', 0xff]).expect_err("decode should fail");
        assert_eq!(err, DecodeError::InvalidUtf8 { valid_up_to: 2 });
    }
}
