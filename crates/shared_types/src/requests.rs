// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

/// A unique per-invocation ID that is attached to every API request as an
/// HTTP header. This helps with correlating one audit run's requests when
/// digging through proxy or audit logs on the other end.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl FromStr for RequestId {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(String::from(s)))
    }
}

impl RequestId {
    pub const FIELD: &'static str = "X-Request-ID";

    pub fn new_unique() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn new_unique_with_prefix(prefix: &str) -> Self {
        Self(format!("{prefix}-{}", Uuid::new_v4()))
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
