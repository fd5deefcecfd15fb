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

//! The verification pipeline: fetch → canonicalize → evaluate → sign.
//!
//! Purely sequential per request; the only state shared between concurrent
//! runs is the read-only [`ServiceContext`]. Any stage failure short-circuits
//! to a typed error and no partial attestation is ever produced.

use core::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use attestation_signing::SigningError;
use attestation_types::{Attestation, ContentDigest, ContentId, SubjectId, Verdict};
use attestation_verification::{canonicalize, DecodeError};
use content_store::FetchError;

use crate::{ledger::LedgerError, ServiceContext};

/// Terminal outcome of a verification run that completed its business logic.
/// Infrastructure faults are reported separately as [`VerifyError`].
#[derive(Debug)]
pub enum VerifyOutcome {
    /// All checks passed, the attestation was signed and (when a ledger is
    /// configured) accepted downstream.
    Attested { attestation: Attestation },
    /// The attestation was signed but the downstream submission failed. The
    /// attestation is returned so the caller can retry submission without
    /// re-verifying.
    SubmissionFailed { attestation: Attestation, error: LedgerError },
    /// No signing key is configured: the verdict was computed but not
    /// attested. The verification work still has value to the caller.
    VerifiedLocally { content_digest: ContentDigest, verdict: Verdict },
    /// Verification ran to completion and at least one check failed. A
    /// business outcome, not an error; carries the full per-check verdict and
    /// the actually-computed digest.
    Rejected { content_digest: ContentDigest, verdict: Verdict },
}

/// Infrastructure failure of a pipeline stage.
#[derive(Debug)]
pub enum VerifyError {
    Fetch(FetchError),
    Decode(DecodeError),
    Signing(SigningError),
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyError::Fetch(err) => write!(f, "fetch stage failed: {err}"),
            VerifyError::Decode(err) => write!(f, "canonicalization stage failed: {err}"),
            VerifyError::Signing(err) => write!(f, "signing stage failed: {err}"),
        }
    }
}

impl std::error::Error for VerifyError {}

fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}

/// Runs one verification request end to end. The sole entry point used by
/// the HTTP layer.
pub async fn run_verification(
    ctx: &ServiceContext,
    subject: &SubjectId,
    content_id: &ContentId,
    expected_digest: Option<&ContentDigest>,
) -> Result<VerifyOutcome, VerifyError> {
    let bytes = ctx.store.fetch(content_id).await.map_err(VerifyError::Fetch)?;
    log::debug!("fetched {} bytes for content {content_id}", bytes.len());

    let content = canonicalize(&bytes).map_err(VerifyError::Decode)?;
    let verdict = ctx.policy.evaluate(&content, expected_digest);
    if !verdict.pass() {
        log::info!("content {content_id} rejected for subject {subject}: {verdict:?}");
        return Ok(VerifyOutcome::Rejected { content_digest: content.digest, verdict });
    }

    let Some(signer) = &ctx.signer else {
        log::info!("no signing key; returning local verdict for content {content_id}");
        return Ok(VerifyOutcome::VerifiedLocally { content_digest: content.digest, verdict });
    };

    let attestation = signer
        .sign(subject, content_id, &content.digest, &verdict, unix_millis())
        .map_err(VerifyError::Signing)?;
    log::info!("attested content {content_id} for subject {subject}");

    match &ctx.ledger {
        None => Ok(VerifyOutcome::Attested { attestation }),
        Some(ledger) => match ledger.submit_attestation(&attestation).await {
            Ok(()) => Ok(VerifyOutcome::Attested { attestation }),
            Err(error) => {
                log::warn!("ledger submission failed for subject {subject}: {error}");
                Ok(VerifyOutcome::SubmissionFailed { attestation, error })
            }
        },
    }
}
