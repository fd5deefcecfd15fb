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

use serde::{Deserialize, Serialize};

/// Result of evaluating the content policy: every check is recorded by name
/// so a rejection stays debuggable and auditable, and the overall outcome is
/// derived rather than stored.
///
/// Created only by the policy evaluator and never mutated afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    /// Canonical length is at least the configured minimum.
    pub min_length: bool,
    /// Computed digest equals the caller-supplied expected digest, when one
    /// was supplied.
    pub digest_match: bool,
    /// Content was fetched and decoded successfully.
    pub integrity: bool,
}

impl Verdict {
    /// Overall outcome: the conjunction of all named checks.
    pub fn pass(&self) -> bool {
        self.min_length && self.digest_match && self.integrity
    }
}
