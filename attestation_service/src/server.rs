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

//! HTTP surface of the attestation service.
//!
//! Thin by design: request parsing and status-code mapping only. All
//! verification semantics live in the pipeline. Rate limiting and CORS are an
//! external admission-control concern layered in front of this server.

use std::{convert::Infallible, sync::Arc};

use anyhow::Context;
use attestation_types::{ContentDigest, ContentId, SubjectId, Verdict};
use bytes::Bytes;
use content_store::FetchError;
use http_body_util::{BodyExt, Full, Limited};
use hyper::{
    body::Incoming, header, header::HeaderValue, server::conn::http1, service::service_fn, Method,
    Request, Response, StatusCode,
};
use hyper_util::rt::TokioIo;
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;

use crate::{
    ledger::LedgerError,
    pipeline::{run_verification, VerifyError, VerifyOutcome},
    ServiceContext,
};

/// Ceiling on the size of an accepted request body.
const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct VerifyRequest {
    content_id: String,
    subject_id: String,
    expected_digest: Option<String>,
}

/// Accepts connections forever, spawning one task per connection. Each
/// request runs independently; there is no cross-request state beyond the
/// read-only context.
pub async fn serve(ctx: Arc<ServiceContext>, listener: TcpListener) -> anyhow::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await.context("accepting connection")?;
        let ctx = ctx.clone();
        tokio::spawn(async move {
            let service = service_fn(move |request| {
                let ctx = ctx.clone();
                async move { Ok::<_, Infallible>(handle_request(&ctx, request).await) }
            });
            if let Err(err) =
                http1::Builder::new().serve_connection(TokioIo::new(stream), service).await
            {
                log::debug!("connection from {peer} closed: {err}");
            }
        });
    }
}

async fn handle_request(
    ctx: &ServiceContext,
    request: Request<Incoming>,
) -> Response<Full<Bytes>> {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    if method == Method::POST && path == "/v1/verify" {
        handle_verify(ctx, request).await
    } else if method == Method::GET && path == "/healthz" {
        health_response(ctx)
    } else if method == Method::GET && path.starts_with("/v1/status/") {
        handle_status(ctx, &path["/v1/status/".len()..]).await
    } else {
        json_response(StatusCode::NOT_FOUND, &json!({"error": "not_found"}))
    }
}

async fn handle_verify(ctx: &ServiceContext, request: Request<Incoming>) -> Response<Full<Bytes>> {
    let body = match Limited::new(request.into_body(), MAX_REQUEST_BODY_BYTES).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(_) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                &json!({"error": "invalid_request", "message": "request body unreadable or too large"}),
            )
        }
    };
    verify_from_body(ctx, &body).await
}

/// Parses and validates a verify request body, then runs the pipeline.
/// Validation failures are client errors; nothing is fetched before the
/// identifiers are accepted.
async fn verify_from_body(ctx: &ServiceContext, body: &[u8]) -> Response<Full<Bytes>> {
    let request: VerifyRequest = match serde_json::from_slice(body) {
        Ok(request) => request,
        Err(err) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                &json!({"error": "invalid_request", "message": format!("malformed JSON body: {err}")}),
            )
        }
    };

    let content_id = match ContentId::new(&request.content_id) {
        Ok(id) => id,
        Err(err) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                &json!({"error": "invalid_content_id", "message": err.to_string()}),
            )
        }
    };
    let subject = match SubjectId::new(&request.subject_id) {
        Ok(subject) => subject,
        Err(err) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                &json!({"error": "invalid_subject_id", "message": err.to_string()}),
            )
        }
    };
    let expected_digest = match &request.expected_digest {
        None => None,
        Some(raw) => match ContentDigest::parse_hex(raw) {
            Ok(digest) => Some(digest),
            Err(err) => {
                return json_response(
                    StatusCode::BAD_REQUEST,
                    &json!({"error": "invalid_expected_digest", "message": err.to_string()}),
                )
            }
        },
    };

    match run_verification(ctx, &subject, &content_id, expected_digest.as_ref()).await {
        Ok(outcome) => outcome_response(&outcome),
        Err(err) => verify_error_response(&err),
    }
}

async fn handle_status(ctx: &ServiceContext, raw_subject: &str) -> Response<Full<Bytes>> {
    let subject = match SubjectId::new(raw_subject) {
        Ok(subject) => subject,
        Err(err) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                &json!({"error": "invalid_subject_id", "message": err.to_string()}),
            )
        }
    };
    let Some(ledger) = &ctx.ledger else {
        return json_response(
            StatusCode::SERVICE_UNAVAILABLE,
            &json!({"error": "ledger_unconfigured"}),
        );
    };
    match ledger.subject_status(&subject).await {
        Ok(status) => json_response(StatusCode::OK, &status),
        Err(LedgerError::SubjectNotFound) => {
            json_response(StatusCode::NOT_FOUND, &json!({"error": "subject_not_found"}))
        }
        Err(err) => {
            log::warn!("ledger status lookup failed for {subject}: {err}");
            json_response(
                StatusCode::BAD_GATEWAY,
                &json!({"error": err.kind(), "message": err.to_string()}),
            )
        }
    }
}

/// Configuration booleans only. Key material never appears here.
fn health_response(ctx: &ServiceContext) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::OK,
        &json!({
            "signerConfigured": ctx.signer_configured(),
            "ledgerConfigured": ctx.ledger_configured(),
        }),
    )
}

/// Maps a completed pipeline run to its HTTP shape.
fn outcome_response(outcome: &VerifyOutcome) -> Response<Full<Bytes>> {
    match outcome {
        VerifyOutcome::Attested { attestation } => json_response(
            StatusCode::OK,
            &json!({"status": "attested", "attestation": attestation}),
        ),
        VerifyOutcome::SubmissionFailed { attestation, error } => json_response(
            StatusCode::OK,
            &json!({
                "status": "submission_failed",
                "attestation": attestation,
                "error": error.kind(),
                "message": error.to_string(),
            }),
        ),
        VerifyOutcome::VerifiedLocally { content_digest, verdict } => json_response(
            StatusCode::OK,
            &json!({
                "status": "verified_locally",
                "contentDigest": content_digest,
                "verdict": verdict,
            }),
        ),
        VerifyOutcome::Rejected { content_digest, verdict } => json_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            &json!({
                "error": "verification_failed",
                "contentDigest": content_digest,
                "verdict": verdict,
            }),
        ),
    }
}

/// Maps an infrastructure failure to its HTTP shape. Every kind is
/// machine-readable so automated callers can branch without parsing text.
fn verify_error_response(err: &VerifyError) -> Response<Full<Bytes>> {
    match err {
        VerifyError::Fetch(FetchError::NotFound) => {
            json_response(StatusCode::NOT_FOUND, &json!({"error": "content_not_found"}))
        }
        VerifyError::Fetch(FetchError::Timeout) => {
            json_response(StatusCode::GATEWAY_TIMEOUT, &json!({"error": "upstream_timeout"}))
        }
        VerifyError::Fetch(FetchError::TooLarge { limit }) => json_response(
            StatusCode::BAD_GATEWAY,
            &json!({"error": "content_too_large", "limitBytes": limit}),
        ),
        VerifyError::Fetch(FetchError::Transport(transport)) => {
            log::warn!("content store transport failure: {transport:#}");
            json_response(StatusCode::BAD_GATEWAY, &json!({"error": "upstream_transport"}))
        }
        VerifyError::Decode(decode) => json_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            &json!({
                "error": "verification_failed",
                "contentDigest": serde_json::Value::Null,
                "verdict": Verdict { min_length: false, digest_match: false, integrity: false },
                "message": decode.to_string(),
            }),
        ),
        VerifyError::Signing(signing) => {
            log::error!("signing failure: {signing}");
            json_response(StatusCode::INTERNAL_SERVER_ERROR, &json!({"error": "signing_failed"}))
        }
    }
}

fn json_response(status: StatusCode, body: &serde_json::Value) -> Response<Full<Bytes>> {
    let bytes = serde_json::to_vec(body).unwrap_or_default();
    let mut response = Response::new(Full::new(Bytes::from(bytes)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
