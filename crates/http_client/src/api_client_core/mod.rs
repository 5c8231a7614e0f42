// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod status_code;

#[path = "reqwest.rs"]
pub mod implementation;

pub use self::implementation::ApiClientCore as ApiClientCoreImpl;

use crate::api_client::ApiResponse;
use crate::error::HttpError;

#[async_trait::async_trait]
pub trait ApiClientCore {
    async fn raw_request(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<ApiResponse, HttpError>;
}

#[async_trait::async_trait]
impl ApiClientCore for ApiClientCoreImpl {
    async fn raw_request(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<ApiResponse, HttpError> {
        self.raw_request(url, headers).await
    }
}

pub mod test_utils {
    use super::*;

    use std::pin::Pin;

    type ResultFuture = dyn futures::Future<Output = Result<ApiResponse, HttpError>> + Send;
    type Responder = dyn (Fn(String, Vec<(String, String)>) -> Pin<Box<ResultFuture>>) + Send + Sync;

    /// Mock `ApiClientCore` that holds a closure that can respond to requests
    /// with fake responses, or errors.
    ///
    /// ```rust
    /// use futures::FutureExt;
    ///
    /// use http_client::{ApiResponse, BaseApiClient, HttpError};
    /// use http_client::test_utils::ApiClientCoreMock;
    ///
    /// let mock = ApiClientCoreMock::from(|url: String, _headers| {
    ///     // note the `async { ... }.boxed()`!
    ///     async move {
    ///         if url.contains("teapot") {
    ///             Err(HttpError::RequestError {
    ///                 ctx: url,
    ///                 status: Some(418),
    ///                 retriable: false,
    ///                 source: "i'm a teapot".into(),
    ///             })
    ///         } else {
    ///             Ok(ApiResponse {
    ///                 status: 200,
    ///                 body: "\"earl grey, hot\"".as_bytes().into(),
    ///                 headers: vec![],
    ///             })
    ///         }
    ///     }.boxed()
    /// });
    /// let client = BaseApiClient::from(mock);
    ///
    /// let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
    /// rt.block_on(async {
    ///     client.json_get::<String>("https://example.com/tea", &[]).await.unwrap();
    ///     client.json_get::<String>("https://example.com/teapot", &[]).await.unwrap_err();
    /// });
    /// ```
    pub struct ApiClientCoreMock {
        responder: Box<Responder>,
    }

    #[async_trait::async_trait]
    impl ApiClientCore for ApiClientCoreMock {
        async fn raw_request(
            &self,
            url: &str,
            headers: &[(String, String)],
        ) -> Result<ApiResponse, HttpError> {
            (self.responder)(url.into(), headers.into()).await
        }
    }

    impl<F: Fn(String, Vec<(String, String)>) -> Pin<Box<ResultFuture>> + Send + Sync + 'static>
        From<F> for ApiClientCoreMock
    {
        fn from(value: F) -> Self {
            Self {
                responder: Box::new(value),
            }
        }
    }

    /// Shorthand for a 200 JSON response with the given headers.
    pub fn json_response(body: &str, headers: &[(&str, &str)]) -> ApiResponse {
        ApiResponse {
            status: 200,
            body: body.as_bytes().to_vec().into(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}
