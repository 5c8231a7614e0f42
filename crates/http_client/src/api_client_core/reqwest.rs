// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use tracing::{debug, warn};

use crate::api_client::ApiResponse;
use crate::error::HttpError;
use shared_types::requests::RequestId;

#[derive(Debug, Clone)]
pub struct ApiClientCore {
    client: reqwest::Client, // cheaply cloneable (Arc<...> internally), see docs
}

impl ApiClientCore {
    pub fn new(request_id: RequestId) -> Self {
        let mut default_headers = reqwest::header::HeaderMap::with_capacity(2);
        default_headers.insert(
            RequestId::FIELD,
            reqwest::header::HeaderValue::from_str(&request_id.0).unwrap_or(
                reqwest::header::HeaderValue::from_static("non-ascii request id"),
            ),
        );
        // GitHub rejects requests without a User-Agent.
        default_headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(concat!(
                "ghaudit/",
                env!("CARGO_PKG_VERSION")
            )),
        );

        let client = reqwest::ClientBuilder::new()
            .default_headers(default_headers)
            .build()
            .unwrap(); // this only fails if the system config is messed up, isn't recoverable

        Self { client }
    }

    /// Get the given url with optional extra headers.
    pub(crate) async fn raw_request(
        &self,
        url: &str,
        header_iter: &[(String, String)],
    ) -> Result<ApiResponse, HttpError> {
        let mut rb = self.client.get(url);
        for (key, value) in header_iter {
            rb = rb.header(key, value)
        }

        debug!("http_client: requesting {url}");

        let response = rb.send().await.map_err(|e| HttpError::RequestError {
            ctx: format!("requesting {url}"),
            status: None,
            retriable: true,
            source: Box::new(e),
        })?;

        let status = response.status();
        debug!("http_client: response from {url:?}: {status}");

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect();

        let body = response.bytes().await.map_err(|e| HttpError::RequestError {
            ctx: format!("reading response body from {url}"),
            status: Some(status.as_u16()),
            retriable: true,
            source: Box::new(e),
        })?;

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(HttpError::NotFound { url: url.into() });
        }
        if status.is_client_error() || status.is_server_error() {
            let mut retriable = super::status_code::is_retriable(status.as_u16());
            // A 403 with an exhausted rate-limit quota is a throttle, not a
            // permissions problem. Worth backing off for.
            if status == reqwest::StatusCode::FORBIDDEN && rate_limit_exhausted(&headers) {
                retriable = true;
                warn!(
                    "rate limited by {url}; quota resets at epoch {}",
                    header(&headers, "x-ratelimit-reset").unwrap_or("unknown")
                );
            }
            return Err(HttpError::RequestError {
                ctx: format!("requesting {url}"),
                status: Some(status.as_u16()),
                retriable,
                source: format!("{status}: {}", String::from_utf8_lossy(&body)).into(),
            });
        }

        Ok(ApiResponse {
            status: status.as_u16(),
            body,
            headers,
        })
    }
}

fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

fn rate_limit_exhausted(headers: &[(String, String)]) -> bool {
    header(headers, "x-ratelimit-remaining") == Some("0")
}
