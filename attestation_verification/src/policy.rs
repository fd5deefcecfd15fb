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

use attestation_types::{CanonicalContent, ContentDigest, Verdict};

/// Default minimum canonical length accepted by the policy. Rejects empty and
/// near-empty uploads masquerading as content.
pub const DEFAULT_MIN_CANONICAL_LENGTH: u64 = 10;

/// Configuration for the fixed content checks.
#[derive(Clone, Copy, Debug)]
pub struct PolicyConfig {
    /// Minimum canonical length for the `minLength` check.
    pub min_canonical_length: u64,
    /// When set, the `digestMatch` check fails unless the caller supplied an
    /// expected digest. Off by default: an absent expected digest passes
    /// trivially, which permits first submissions but is a documented
    /// weakness, not a security guarantee.
    pub require_expected_digest: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self { min_canonical_length: DEFAULT_MIN_CANONICAL_LENGTH, require_expected_digest: false }
    }
}

/// Evaluates the fixed set of deterministic checks against canonical content.
///
/// Every check is recorded independently in the [`Verdict`], never collapsed
/// into a single boolean, so callers always see which check failed.
pub struct ContentPolicy {
    config: PolicyConfig,
}

impl ContentPolicy {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn evaluate(
        &self,
        content: &CanonicalContent,
        expected_digest: Option<&ContentDigest>,
    ) -> Verdict {
        let min_length = content.canonical_length >= self.config.min_canonical_length;
        let digest_match = match expected_digest {
            Some(expected) => *expected == content.digest,
            None => !self.config.require_expected_digest,
        };
        // Reaching evaluation means the content was fetched and decoded.
        // Placeholder for richer content-specific checks (format validation,
        // provenance) a deployment would add.
        let integrity = true;
        Verdict { min_length, digest_match, integrity }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonicalize;

    fn default_policy() -> ContentPolicy {
        ContentPolicy::new(PolicyConfig::default())
    }

    #[test]
    fn well_formed_content_passes_all_checks() {
        let content = canonicalize(b"Hello, accessible world!").expect("content should decode");
        let verdict = default_policy().evaluate(&content, None);
        assert_eq!(verdict, Verdict { min_length: true, digest_match: true, integrity: true });
        assert!(verdict.pass());
    }

    #[test]
    fn short_content_fails_only_min_length() {
        let content = canonicalize(b"hi!").expect("content should decode");
        let verdict = default_policy().evaluate(&content, None);
        assert_eq!(verdict, Verdict { min_length: false, digest_match: true, integrity: true });
        assert!(!verdict.pass());
    }

    #[test]
    fn matching_expected_digest_passes() {
        let content = canonicalize(b"Hello, accessible world!").expect("content should decode");
        let expected = content.digest;
        let verdict = default_policy().evaluate(&content, Some(&expected));
        assert!(verdict.digest_match);
        assert!(verdict.pass());
    }

    #[test]
    fn mismatched_expected_digest_fails_only_digest_match() {
        let content = canonicalize(b"Hello, accessible world!").expect("content should decode");
        let expected = ContentDigest::from_bytes([0u8; 32]);
        let verdict = default_policy().evaluate(&content, Some(&expected));
        assert_eq!(verdict, Verdict { min_length: true, digest_match: false, integrity: true });
    }

    #[test]
    fn required_expected_digest_fails_when_absent() {
        let policy = ContentPolicy::new(PolicyConfig {
            require_expected_digest: true,
            ..PolicyConfig::default()
        });
        let content = canonicalize(b"Hello, accessible world!").expect("content should decode");
        let verdict = policy.evaluate(&content, None);
        assert_eq!(verdict, Verdict { min_length: true, digest_match: false, integrity: true });
    }

    #[test]
    fn evaluation_is_deterministic() {
        let bytes = b"The same bytes, every time.";
        let first = canonicalize(bytes).expect("content should decode");
        let second = canonicalize(bytes).expect("content should decode");
        assert_eq!(first.digest, second.digest);
        assert_eq!(
            default_policy().evaluate(&first, None),
            default_policy().evaluate(&second, None)
        );
    }
}
