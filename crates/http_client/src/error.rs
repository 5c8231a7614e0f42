// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("while {ctx}: {status_wrap}, {retriable_wrap}: {source}", status_wrap=StatusWrapper(*status), retriable_wrap=RetriableWrapper(*retriable))]
    RequestError {
        ctx: String,
        /// The HTTP status code of the error, or None if no response arrived.
        status: Option<u16>,
        retriable: bool,
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
    /// 404 gets its own variant: several of the resources we query (branch
    /// protection in particular) report "not configured" as a 404, and
    /// callers need to tell that apart from a failed request.
    #[error("not found: {url}")]
    NotFound { url: String },
    #[error("decoding {decoding}: {source}")]
    DecodeError {
        decoding: String,
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl HttpError {
    pub fn is_retriable(&self) -> bool {
        match self {
            HttpError::RequestError { retriable, .. } => *retriable,
            HttpError::NotFound { .. } | HttpError::DecodeError { .. } => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::RequestError { status, .. } => *status,
            HttpError::NotFound { .. } => Some(404),
            HttpError::DecodeError { .. } => None,
        }
    }
}

struct StatusWrapper(Option<u16>);

impl std::fmt::Display for StatusWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            None => f.write_str("no status"),
            Some(status) => write!(f, "status: {status}"),
        }
    }
}

struct RetriableWrapper(bool);

impl std::fmt::Display for RetriableWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            false => f.write_str("not retriable"),
            true => f.write_str("retriable"),
        }
    }
}
