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

//! Attestation message framing and signing.
//!
//! The canonical signed message uses a domain-separation prefix and
//! length-prefixed fields. Naive `subject || content_id` concatenation is
//! ambiguous (`("AB", "C")` and `("A", "BC")` collide) and must never be
//! reintroduced: the length prefixes make the encoding injective, so distinct
//! (subject, content id, digest) triples always sign distinct byte strings.
//!
//! Signatures are ECDSA P-256 over SHA-256 with RFC 6979 deterministic
//! nonces. Verification is a pure function of (message, signature, public
//! key): [`verify_attestation`] never calls back into the service and can be
//! reimplemented by any third party, including an on-chain program.

use core::fmt;

use anyhow::Context;
use attestation_types::{Attestation, ContentDigest, ContentId, SubjectId, Verdict};
use p256::{
    ecdsa::{
        signature::{Signer, Verifier},
        Signature, SigningKey, VerifyingKey,
    },
    pkcs8::DecodePrivateKey,
};

/// Domain-separation prefix for attestation messages. Versioned so a future
/// framing change cannot be confused with this one.
const SIGNING_DOMAIN: &[u8] = b"content-attestation/v1\0";

/// Builds the canonical byte string that gets signed: the domain prefix, then
/// each field as a big-endian u32 length followed by the field bytes, in
/// fixed order (subject, content id, digest).
pub fn attestation_message(
    subject: &SubjectId,
    content_id: &ContentId,
    digest: &ContentDigest,
) -> Vec<u8> {
    let fields: [&[u8]; 3] = [subject.as_bytes(), content_id.as_bytes(), digest.as_bytes()];
    let mut message =
        Vec::with_capacity(SIGNING_DOMAIN.len() + fields.iter().map(|f| 4 + f.len()).sum::<usize>());
    message.extend_from_slice(SIGNING_DOMAIN);
    for field in fields {
        message.extend_from_slice(&(field.len() as u32).to_be_bytes());
        message.extend_from_slice(field);
    }
    message
}

/// Typed signing failures.
#[derive(Debug)]
pub enum SigningError {
    /// The verdict does not pass. A failing verdict is never signed: a signed
    /// negative attestation could later be replayed or misread as positive by
    /// a careless consumer.
    FailingVerdict { verdict: Verdict },
    /// The underlying signature operation failed.
    Signature(p256::ecdsa::Error),
}

impl fmt::Display for SigningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigningError::FailingVerdict { verdict } => {
                write!(f, "refusing to sign a failing verdict: {verdict:?}")
            }
            SigningError::Signature(err) => write!(f, "signature operation failed: {err}"),
        }
    }
}

impl std::error::Error for SigningError {}

/// Holds the service's long-lived signing key and produces attestations.
///
/// Read-only after construction; safe to share across concurrent requests.
pub struct AttestationSigner {
    signing_key: SigningKey,
}

impl AttestationSigner {
    pub fn new(signing_key: SigningKey) -> Self {
        Self { signing_key }
    }

    /// Loads the signing key from a PKCS#8 PEM document.
    pub fn from_pkcs8_pem(pem: &str) -> anyhow::Result<Self> {
        let signing_key =
            SigningKey::from_pkcs8_pem(pem).map_err(anyhow::Error::msg).context("parsing signing key PEM")?;
        Ok(Self { signing_key })
    }

    /// Uncompressed SEC1 encoding of the corresponding public key. Embedded
    /// in every attestation; never the private half.
    pub fn public_key_bytes(&self) -> Vec<u8> {
        self.signing_key.verifying_key().to_encoded_point(false).as_bytes().to_vec()
    }

    /// Signs the canonical message for a passing verdict and returns the
    /// assembled attestation.
    pub fn sign(
        &self,
        subject: &SubjectId,
        content_id: &ContentId,
        digest: &ContentDigest,
        verdict: &Verdict,
        issued_at_ms: i64,
    ) -> Result<Attestation, SigningError> {
        if !verdict.pass() {
            return Err(SigningError::FailingVerdict { verdict: *verdict });
        }
        let message = attestation_message(subject, content_id, digest);
        let signature: Signature =
            self.signing_key.try_sign(&message).map_err(SigningError::Signature)?;
        Ok(Attestation {
            subject: subject.clone(),
            content_id: content_id.clone(),
            content_digest: *digest,
            verdict: *verdict,
            signature: signature.to_bytes().to_vec(),
            public_key: self.public_key_bytes(),
            issued_at_ms,
        })
    }
}

/// Verifies an attestation using only the fields it carries: the canonical
/// message rebuilt from (subject, content id, digest), the signature and the
/// embedded public key.
pub fn verify_attestation(attestation: &Attestation) -> anyhow::Result<()> {
    let message = attestation_message(
        &attestation.subject,
        &attestation.content_id,
        &attestation.content_digest,
    );
    let verifying_key = VerifyingKey::from_sec1_bytes(&attestation.public_key)
        .map_err(anyhow::Error::msg)
        .context("parsing attestation public key")?;
    let signature = Signature::from_slice(&attestation.signature)
        .map_err(anyhow::Error::msg)
        .context("parsing attestation signature")?;
    verifying_key
        .verify(&message, &signature)
        .map_err(anyhow::Error::msg)
        .context("attestation signature does not verify")
}
