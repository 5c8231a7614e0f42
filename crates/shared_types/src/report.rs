// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Report rows produced by the audit. One `ProtectionRow` per repository,
//! and one `AccessRow` per collaborator or team grant.

use std::fmt;

use serde::Serialize;

use crate::github::BranchProtection;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtectionRow {
    pub repository: String,
    /// Empty string when the repository has no default branch.
    pub default_branch: String,
    pub protected: bool,
    pub pr_reviews: bool,
    pub dismisses_stale_reviews: bool,
    pub requires_code_owners: bool,
    pub approver_count: u32,
    pub enforce_admins: bool,
    /// Only reported in strict mode.
    pub requires_signed_commits: bool,
    /// Only reported in strict mode.
    pub requires_status_checks: bool,
}

impl ProtectionRow {
    /// The all-false row written when a default branch has no protection at
    /// all (or when the repository has no default branch to protect).
    pub fn unprotected(repository: impl Into<String>, default_branch: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            default_branch: default_branch.into(),
            protected: false,
            pr_reviews: false,
            dismisses_stale_reviews: false,
            requires_code_owners: false,
            approver_count: 0,
            enforce_admins: false,
            requires_signed_commits: false,
            requires_status_checks: false,
        }
    }

    pub fn from_protection(
        repository: impl Into<String>,
        default_branch: impl Into<String>,
        protection: &BranchProtection,
    ) -> Self {
        let reviews = protection.required_pull_request_reviews.as_ref();
        Self {
            repository: repository.into(),
            default_branch: default_branch.into(),
            protected: true,
            pr_reviews: reviews.is_some(),
            dismisses_stale_reviews: reviews.is_some_and(|r| r.dismiss_stale_reviews),
            requires_code_owners: reviews.is_some_and(|r| r.require_code_owner_reviews),
            approver_count: reviews.map_or(0, |r| r.required_approving_review_count),
            enforce_admins: protection.enforce_admins.is_some_and(|e| e.enabled),
            requires_signed_commits: protection.required_signatures.is_some_and(|s| s.enabled),
            requires_status_checks: protection.required_status_checks.is_some(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GranteeKind {
    User,
    Team,
}

impl GranteeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GranteeKind::User => "user",
            GranteeKind::Team => "team",
        }
    }
}

impl fmt::Display for GranteeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One grant on a repository: a user with direct access, an outside
/// collaborator, or a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessRow {
    pub repository: String,
    pub grantee: String,
    pub kind: GranteeKind,
    pub permission: String,
    /// `direct`, `outside`, or `team`.
    pub affiliation: String,
}
