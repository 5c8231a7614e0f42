// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::api_client_core::{ApiClientCore, ApiClientCoreImpl};
use crate::error::HttpError;
use shared_types::requests::RequestId;

/// A response body plus the headers that came with it. Headers matter here:
/// paginated APIs put the next-page cursor in `Link`, and rate limiters talk
/// back through `X-RateLimit-*` and `Retry-After`.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Bytes,
    pub headers: Vec<(String, String)>,
}

impl ApiResponse {
    /// Case-insensitive header lookup; returns the first match.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Helper for querying JSON HTTP APIs
#[derive(Clone)]
pub struct BaseApiClient {
    // 99% of the time this is going to be ApiClientCoreImpl (the reqwest
    // implementation), but it's overrideable for mocking purposes
    core: Arc<dyn ApiClientCore + Send + Sync>,
}

impl<Core: ApiClientCore + Send + Sync + 'static> From<Core> for BaseApiClient {
    fn from(core: Core) -> Self {
        Self {
            core: Arc::new(core),
        }
    }
}

impl BaseApiClient {
    /// Construct a new ApiClient for the given RequestId. It will attach this
    /// id to each request it makes.
    pub fn new(request_id: RequestId) -> Self {
        ApiClientCoreImpl::new(request_id).into()
    }

    /// Get JSON. Returns an error for >=400 status.
    pub async fn json_get<O: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<O, HttpError> {
        let (value, _) = self.json_get_with_response(url, headers).await?;
        Ok(value)
    }

    /// Get JSON, and also hand back the raw response so the caller can read
    /// headers. Returns an error for >=400 status.
    pub async fn json_get_with_response<O: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<(O, ApiResponse), HttpError> {
        let response = self.raw_get(url, headers).await?;
        let value = serde_json::from_slice(&response.body).map_err(|e| {
            let error_text = format_serde_error_from_bytes(response.body.to_vec(), e);
            HttpError::DecodeError {
                decoding: format!("json from {url}"),
                source: error_text.into(),
            }
        })?;
        Ok((value, response))
    }

    pub async fn raw_get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<ApiResponse, HttpError> {
        self.core.raw_request(url, headers).await
    }
}

impl fmt::Debug for BaseApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseApiClient").finish_non_exhaustive()
    }
}

fn format_serde_error_from_bytes(
    bytes: Vec<u8>,
    e: impl Into<format_serde_error::ErrorTypes>,
) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => format_serde_error::SerdeError::new(text, e).to_string(),
        Err(err) => err.to_string(),
    }
}
