// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod client;
pub mod error;
mod pagination;
mod retry_if;

pub use client::GithubClient;
pub use error::Error;
