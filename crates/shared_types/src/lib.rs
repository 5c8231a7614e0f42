// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! This crate is used for types that are shared within this repo's crates

pub mod github;
pub mod policy;
pub mod report;
pub mod requests;

pub use policy::ReviewPolicy;
pub use report::{AccessRow, GranteeKind, ProtectionRow};
