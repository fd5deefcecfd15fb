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

use serde::{Serialize, Serializer};

/// Reason a digest string failed to parse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvalidDigest {
    InvalidHex,
    WrongLength(usize),
}

impl fmt::Display for InvalidDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidDigest::InvalidHex => write!(f, "digest is not valid hex"),
            InvalidDigest::WrongLength(len) => {
                write!(f, "digest has {len} bytes, expected {}", ContentDigest::LEN)
            }
        }
    }
}

impl std::error::Error for InvalidDigest {}

/// SHA-256 digest over the canonical bytes of a piece of content.
///
/// Rendered as lower-case hex everywhere it crosses a serialization boundary.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; Self::LEN]);

impl ContentDigest {
    pub const LEN: usize = 32;

    pub fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn parse_hex(input: &str) -> Result<Self, InvalidDigest> {
        let bytes = hex::decode(input).map_err(|_| InvalidDigest::InvalidHex)?;
        let bytes: [u8; Self::LEN] =
            bytes.try_into().map_err(|rest: Vec<u8>| InvalidDigest::WrongLength(rest.len()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({})", self.to_hex())
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}
