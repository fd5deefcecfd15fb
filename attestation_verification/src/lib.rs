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

//! Deterministic canonicalization and policy evaluation for fetched content.
//!
//! Two independent verifiers running this code over the same input bytes must
//! reach the same digest and the same verdict; everything downstream (the
//! signed attestation, on-chain acceptance) leans on that determinism.

mod canonical;
mod policy;

pub use canonical::{canonicalize, DecodeError};
pub use policy::{ContentPolicy, PolicyConfig, DEFAULT_MIN_CANONICAL_LENGTH};
