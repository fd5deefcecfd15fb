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

//! Client for the external content-addressed blob store.
//!
//! Fetches are bounded by a hard byte ceiling and a wall-clock timeout. Both
//! bounds reject rather than truncate, and nothing is retried here: retry
//! policy belongs to the caller.

use core::fmt;
use std::time::Duration;

use async_trait::async_trait;
use attestation_types::ContentId;

/// Default wall-clock bound on a single fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Default ceiling on the size of a fetched blob.
pub const DEFAULT_MAX_FETCH_BYTES: usize = 10 * 1024 * 1024;

/// Typed fetch failures. Callers branch on the variant, so every
/// infrastructure failure maps to a distinct kind.
#[derive(Debug)]
pub enum FetchError {
    /// The store has no blob under the requested id.
    NotFound,
    /// The fetch did not complete within the configured deadline.
    Timeout,
    /// The blob exceeds the configured byte ceiling.
    TooLarge { limit: usize },
    /// Connection, protocol or unexpected-status failure.
    Transport(anyhow::Error),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::NotFound => write!(f, "blob not found in content store"),
            FetchError::Timeout => write!(f, "content store fetch timed out"),
            FetchError::TooLarge { limit } => {
                write!(f, "blob exceeds the configured limit of {limit} bytes")
            }
            FetchError::Transport(err) => write!(f, "content store transport error: {err:#}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Size and time bounds applied to every fetch.
#[derive(Clone, Copy, Debug)]
pub struct FetchLimits {
    pub max_bytes: usize,
    pub timeout: Duration,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self { max_bytes: DEFAULT_MAX_FETCH_BYTES, timeout: DEFAULT_FETCH_TIMEOUT }
    }
}

/// Trait for fetching blob content from the store.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetches the bytes stored under `id`, subject to the implementation's
    /// size and time bounds.
    async fn fetch(&self, id: &ContentId) -> Result<Vec<u8>, FetchError>;
}

/// HTTP implementation of [`BlobStore`] against a store that serves blobs at
/// `{base_url}/{id}`.
pub struct HttpBlobStore {
    base_url: String,
    client: reqwest::Client,
    limits: FetchLimits,
}

impl HttpBlobStore {
    pub fn new(base_url: impl Into<String>, limits: FetchLimits) -> Self {
        let base_url = base_url.into();
        Self { base_url: base_url.trim_end_matches('/').to_string(), client: reqwest::Client::new(), limits }
    }

    fn blob_url(&self, id: &ContentId) -> String {
        // The id is already validated to `[A-Za-z0-9_-]+`, so it needs no
        // escaping and cannot traverse the path.
        format!("{}/{}", self.base_url, id)
    }

    async fn fetch_inner(&self, id: &ContentId) -> Result<Vec<u8>, FetchError> {
        let url = self.blob_url(id);
        log::debug!("fetching blob from {url}");
        let mut response = self.client.get(&url).send().await.map_err(|err| {
            if err.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Transport(anyhow::Error::new(err))
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::GONE {
            return Err(FetchError::NotFound);
        }
        if !status.is_success() {
            return Err(FetchError::Transport(anyhow::anyhow!(
                "unexpected status {status} fetching blob {id}"
            )));
        }

        // Reject on the advertised length first, then enforce the ceiling
        // while streaming so an oversized body is never fully buffered.
        if let Some(length) = response.content_length() {
            if length > self.limits.max_bytes as u64 {
                return Err(FetchError::TooLarge { limit: self.limits.max_bytes });
            }
        }
        let mut body = Vec::new();
        while let Some(chunk) =
            response.chunk().await.map_err(|err| FetchError::Transport(anyhow::Error::new(err)))?
        {
            if body.len() + chunk.len() > self.limits.max_bytes {
                return Err(FetchError::TooLarge { limit: self.limits.max_bytes });
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn fetch(&self, id: &ContentId) -> Result<Vec<u8>, FetchError> {
        match tokio::time::timeout(self.limits.timeout, self.fetch_inner(id)).await {
            Ok(result) => result,
            Err(_) => {
                log::warn!("fetch of blob {id} exceeded {:?}", self.limits.timeout);
                Err(FetchError::Timeout)
            }
        }
    }
}

#[cfg(test)]
mod tests;
