// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

/// The minimum number of approving reviewers we prefer on a project.
pub const DEFAULT_MIN_APPROVERS: u32 = 1;

/// The compliance bar a repository's default branch is held to.
///
/// The basic policy requires branch protection with pull request reviews,
/// stale-review dismissal, CODEOWNERS reviews, at least
/// `min_required_approvers` approvers, and admin enforcement. A strict policy
/// additionally requires signed commits and mandatory CI status checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewPolicy {
    pub min_required_approvers: u32,
    pub strict: bool,
}

impl ReviewPolicy {
    pub fn basic() -> Self {
        Self {
            min_required_approvers: DEFAULT_MIN_APPROVERS,
            strict: false,
        }
    }

    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::basic()
        }
    }
}

impl Default for ReviewPolicy {
    fn default() -> Self {
        Self::basic()
    }
}
