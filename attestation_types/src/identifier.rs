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

use core::fmt;

use serde::Serialize;

/// Reason an identifier failed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvalidIdentifier {
    Empty,
    ForbiddenCharacter(char),
}

impl fmt::Display for InvalidIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidIdentifier::Empty => write!(f, "identifier is empty"),
            InvalidIdentifier::ForbiddenCharacter(c) => {
                write!(f, "identifier contains forbidden character {c:?}")
            }
        }
    }
}

impl std::error::Error for InvalidIdentifier {}

/// Opaque identifier naming a blob in the external content-addressed store.
///
/// The whole input is validated against `[A-Za-z0-9_-]+` before it is
/// accepted. Inputs containing other characters are rejected outright rather
/// than stripped, so two distinct raw inputs can never alias to the same
/// accepted id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    pub fn new(raw: &str) -> Result<Self, InvalidIdentifier> {
        if raw.is_empty() {
            return Err(InvalidIdentifier::Empty);
        }
        match raw.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '_' && *c != '-') {
            Some(c) => Err(InvalidIdentifier::ForbiddenCharacter(c)),
            None => Ok(Self(raw.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque handle naming the entity a verdict applies to, e.g. an on-chain
/// object reference. Treated as an uninterpreted byte string; only the caller
/// (or the chain) assigns it semantics, so the sole requirement here is
/// non-emptiness.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(raw: &str) -> Result<Self, InvalidIdentifier> {
        if raw.is_empty() {
            return Err(InvalidIdentifier::Empty);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_content_id() {
        let id = ContentId::new("blob_01-A").expect("id should validate");
        assert_eq!(id.as_str(), "blob_01-A");
    }

    #[test]
    fn rejects_empty_content_id() {
        assert_eq!(ContentId::new(""), Err(InvalidIdentifier::Empty));
    }

    #[test]
    fn rejects_content_id_with_forbidden_characters() {
        assert_eq!(
            ContentId::new("../../etc/passwd"),
            Err(InvalidIdentifier::ForbiddenCharacter('.'))
        );
        assert_eq!(ContentId::new("blob id"), Err(InvalidIdentifier::ForbiddenCharacter(' ')));
        assert_eq!(ContentId::new("blob/1"), Err(InvalidIdentifier::ForbiddenCharacter('/')));
    }

    #[test]
    fn subject_id_accepts_arbitrary_non_empty_input() {
        let subject = SubjectId::new("0x5af3::note::Note").expect("subject should validate");
        assert_eq!(subject.as_str(), "0x5af3::note::Note");
        assert_eq!(SubjectId::new(""), Err(InvalidIdentifier::Empty));
    }
}
