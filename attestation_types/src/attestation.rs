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

use serde::Serialize;

use crate::{ContentDigest, ContentId, SubjectId, Verdict};

/// Signed claim binding a subject, a content identity and a verdict.
///
/// A pure value: constructed once per successful pipeline run and returned to
/// the caller, which is responsible for persisting or submitting it. The
/// service keeps no attestation state. The raw public key bytes are embedded
/// so that verification never depends on key-lookup infrastructure.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attestation {
    pub subject: SubjectId,
    pub content_id: ContentId,
    pub content_digest: ContentDigest,
    pub verdict: Verdict,
    /// Fixed-width (r || s) ECDSA P-256 signature over the canonical
    /// attestation message.
    #[serde(with = "hex_bytes")]
    pub signature: Vec<u8>,
    /// Uncompressed SEC1 encoding of the signer's public key.
    #[serde(with = "hex_bytes")]
    pub public_key: Vec<u8>,
    /// Issuance time, milliseconds since the Unix epoch.
    pub issued_at_ms: i64,
}

/// Serializes byte strings as lower-case hex.
mod hex_bytes {
    use serde::Serializer;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_signature_and_key_as_hex() {
        let attestation = Attestation {
            subject: SubjectId::new("0x1").expect("subject should validate"),
            content_id: ContentId::new("blob-1").expect("id should validate"),
            content_digest: ContentDigest::from_bytes([0; 32]),
            verdict: Verdict { min_length: true, digest_match: true, integrity: true },
            signature: vec![0xde, 0xad],
            public_key: vec![0xbe, 0xef],
            issued_at_ms: 1,
        };
        let json = serde_json::to_value(&attestation).expect("attestation should serialize");
        assert_eq!(json["signature"], "dead");
        assert_eq!(json["publicKey"], "beef");
        assert_eq!(json["contentId"], "blob-1");
    }
}
