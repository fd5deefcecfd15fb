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

use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use attestation_service::{
    ledger::{HttpLedgerClient, LedgerClient},
    server::serve,
    ServiceContext,
};
use attestation_signing::AttestationSigner;
use attestation_verification::{ContentPolicy, PolicyConfig, DEFAULT_MIN_CANONICAL_LENGTH};
use clap::Parser;
use content_store::{FetchLimits, HttpBlobStore, DEFAULT_MAX_FETCH_BYTES};
use tokio::net::TcpListener;

#[derive(Parser, Debug)]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:8079")]
    listen_address: SocketAddr,

    /// Base URL of the content-addressed blob store.
    #[arg(long)]
    store_url: String,

    /// Base URL of the attestation ledger. When set, attestations are
    /// submitted downstream after signing; requires --signing-key.
    #[arg(long)]
    ledger_url: Option<String>,

    /// Path to the service signing key (PKCS#8 PEM, P-256). Without it the
    /// service runs in verify-only mode and never attests.
    #[arg(long)]
    signing_key: Option<PathBuf>,

    /// Minimum canonical content length accepted by policy.
    #[arg(long, default_value_t = DEFAULT_MIN_CANONICAL_LENGTH)]
    min_content_length: u64,

    /// Fail the digestMatch check when the caller supplies no expected
    /// digest, instead of passing it trivially.
    #[arg(long)]
    require_expected_digest: bool,

    /// Ceiling on fetched blob size, in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_FETCH_BYTES)]
    max_fetch_bytes: usize,

    /// Wall-clock bound on a single store fetch, in seconds.
    #[arg(long, default_value_t = 30)]
    fetch_timeout_seconds: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let signer = match &args.signing_key {
        Some(path) => {
            let pem = std::fs::read_to_string(path)
                .with_context(|| format!("reading signing key from {}", path.display()))?;
            let signer = AttestationSigner::from_pkcs8_pem(&pem)?;
            log::info!("signing key loaded; public key {}", hex::encode(signer.public_key_bytes()));
            Some(signer)
        }
        None => {
            log::warn!("no signing key configured; running in verify-only mode");
            None
        }
    };
    // Fail fast: submission is a caller path that requires signing, so a
    // ledger without a key is a misconfiguration, not a degraded mode.
    if args.ledger_url.is_some() && signer.is_none() {
        anyhow::bail!("--ledger-url requires --signing-key");
    }

    let limits = FetchLimits {
        max_bytes: args.max_fetch_bytes,
        timeout: Duration::from_secs(args.fetch_timeout_seconds),
    };
    let ctx = Arc::new(ServiceContext {
        store: Arc::new(HttpBlobStore::new(&args.store_url, limits)),
        policy: ContentPolicy::new(PolicyConfig {
            min_canonical_length: args.min_content_length,
            require_expected_digest: args.require_expected_digest,
        }),
        signer,
        ledger: args
            .ledger_url
            .as_deref()
            .map(|url| Arc::new(HttpLedgerClient::new(url)) as Arc<dyn LedgerClient>),
    });

    let listener = TcpListener::bind(args.listen_address)
        .await
        .with_context(|| format!("binding {}", args.listen_address))?;
    log::info!("attestation service listening on {}", args.listen_address);
    serve(ctx, listener).await
}
