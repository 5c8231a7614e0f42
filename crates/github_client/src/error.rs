// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use http_client::HttpError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("invalid API root {url:?}: {reason}")]
    BadApiRoot { url: String, reason: String },
}

impl Error {
    /// Was this ultimately a 404? Used to tell "no protection configured"
    /// apart from real failures.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Http(HttpError::NotFound { .. }))
    }
}
