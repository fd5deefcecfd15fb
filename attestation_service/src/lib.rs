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

//! Content attestation service: fetches untrusted content by id, verifies it
//! against policy, and signs an attestation binding subject, content identity
//! and verdict that an independent party can verify offline.

pub mod ledger;
pub mod pipeline;
pub mod server;

use std::sync::Arc;

use attestation_signing::AttestationSigner;
use attestation_verification::ContentPolicy;
use content_store::BlobStore;
use ledger::LedgerClient;

/// Everything a verification request needs, constructed once at startup and
/// shared read-only across concurrent requests. No ambient globals: the store
/// client, policy and signing key are all injected here.
pub struct ServiceContext {
    pub store: Arc<dyn BlobStore>,
    pub policy: ContentPolicy,
    /// Absent when the service runs without a signing key; verification then
    /// degrades to local-only verdicts instead of failing outright.
    pub signer: Option<AttestationSigner>,
    /// Absent when no downstream ledger is configured; attestations are then
    /// returned to the caller without submission.
    pub ledger: Option<Arc<dyn LedgerClient>>,
}

impl ServiceContext {
    pub fn signer_configured(&self) -> bool {
        self.signer.is_some()
    }

    pub fn ledger_configured(&self) -> bool {
        self.ledger.is_some()
    }
}
