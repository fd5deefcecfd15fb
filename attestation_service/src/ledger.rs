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

//! Client for the external attestation ledger.
//!
//! The ledger is consumed through a narrow contract: submit an attestation,
//! look up a subject's recorded verdict state. Its internals are out of
//! scope. Nothing is retried here.

use core::fmt;

use async_trait::async_trait;
use attestation_types::{Attestation, SubjectId};

/// Typed ledger failures.
#[derive(Debug)]
pub enum LedgerError {
    /// The ledger has no record for the requested subject.
    SubjectNotFound,
    /// The ledger understood the request and refused it.
    Rejected { reason: String },
    /// Connection, protocol or unexpected-status failure.
    Transport(anyhow::Error),
}

impl LedgerError {
    /// Stable machine-readable kind, for response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::SubjectNotFound => "subject_not_found",
            LedgerError::Rejected { .. } => "ledger_rejected",
            LedgerError::Transport(_) => "ledger_transport",
        }
    }
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::SubjectNotFound => write!(f, "subject not found on ledger"),
            LedgerError::Rejected { reason } => write!(f, "ledger rejected the request: {reason}"),
            LedgerError::Transport(err) => write!(f, "ledger transport error: {err:#}"),
        }
    }
}

impl std::error::Error for LedgerError {}

/// Trait for the ledger's submit/status contract.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Submits an attestation for downstream acceptance.
    async fn submit_attestation(&self, attestation: &Attestation) -> Result<(), LedgerError>;

    /// Looks up the recorded verdict state for a subject. Returned as the
    /// ledger's own JSON document; this service proxies it without
    /// reinterpretation.
    async fn subject_status(&self, subject: &SubjectId) -> Result<serde_json::Value, LedgerError>;
}

/// HTTP implementation of [`LedgerClient`].
pub struct HttpLedgerClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpLedgerClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self { base_url: base_url.trim_end_matches('/').to_string(), client: reqwest::Client::new() }
    }

    /// Builds the status URL with the subject as a single percent-encoded
    /// path segment. Subjects are uninterpreted strings, so `/`, `?`, `#` and
    /// dot segments in one must not be able to rewrite the request path or
    /// escape the `/subjects/` namespace.
    fn subject_status_url(&self, subject: &SubjectId) -> Result<reqwest::Url, LedgerError> {
        let mut url = reqwest::Url::parse(&self.base_url).map_err(|err| {
            LedgerError::Transport(anyhow::Error::new(err).context("parsing ledger base URL"))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                LedgerError::Transport(anyhow::anyhow!("ledger base URL cannot be a base"))
            })?
            .extend(["subjects", subject.as_str(), "status"]);
        Ok(url)
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn submit_attestation(&self, attestation: &Attestation) -> Result<(), LedgerError> {
        let url = format!("{}/attestations", self.base_url);
        log::debug!("submitting attestation for subject {} to {url}", attestation.subject);
        let response = self
            .client
            .post(&url)
            .json(attestation)
            .send()
            .await
            .map_err(|err| LedgerError::Transport(anyhow::Error::new(err)))?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status.is_client_error() {
            let reason = response.text().await.unwrap_or_else(|_| status.to_string());
            return Err(LedgerError::Rejected { reason });
        }
        Err(LedgerError::Transport(anyhow::anyhow!("unexpected ledger status {status}")))
    }

    async fn subject_status(&self, subject: &SubjectId) -> Result<serde_json::Value, LedgerError> {
        let url = self.subject_status_url(subject)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| LedgerError::Transport(anyhow::Error::new(err)))?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LedgerError::SubjectNotFound);
        }
        if !status.is_success() {
            return Err(LedgerError::Transport(anyhow::anyhow!(
                "unexpected ledger status {status}"
            )));
        }
        response.json::<serde_json::Value>().await.map_err(|err| {
            LedgerError::Transport(anyhow::Error::new(err).context("parsing ledger status body"))
        })
    }
}
