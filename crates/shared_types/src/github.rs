// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Models for the subset of the GitHub REST v3 API the audit reads.
//!
//! Fields we don't look at are left out; serde ignores the rest of the
//! payload. Everything optional in the API is optional here, since branch
//! protection objects in particular omit any rule that was never configured.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    /// `owner/name`, as the API reports it.
    pub full_name: String,
    /// Missing on repositories that have never had a commit pushed.
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub archived: bool,
}

/// `GET /repos/{owner}/{repo}/branches/{branch}/protection`
///
/// Each rule is `None` when it has never been configured for the branch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BranchProtection {
    #[serde(default)]
    pub required_pull_request_reviews: Option<RequiredPullRequestReviews>,
    #[serde(default)]
    pub required_signatures: Option<EnabledFlag>,
    #[serde(default)]
    pub enforce_admins: Option<EnabledFlag>,
    #[serde(default)]
    pub required_status_checks: Option<RequiredStatusChecks>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequiredPullRequestReviews {
    #[serde(default)]
    pub dismiss_stale_reviews: bool,
    #[serde(default)]
    pub require_code_owner_reviews: bool,
    #[serde(default)]
    pub required_approving_review_count: u32,
}

/// The API wraps several boolean protection rules in `{ "enabled": bool }`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EnabledFlag {
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequiredStatusChecks {
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub contexts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collaborator {
    pub login: String,
    #[serde(default)]
    pub role_name: Option<String>,
    #[serde(default)]
    pub permissions: Option<Permissions>,
}

impl Collaborator {
    /// The strongest grant this collaborator holds, preferring the API's
    /// `role_name` (present on newer API versions) over the permission flags.
    pub fn permission(&self) -> &str {
        match (&self.role_name, &self.permissions) {
            (Some(role), _) => role,
            (None, Some(perms)) => perms.highest(),
            (None, None) => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub maintain: bool,
    #[serde(default)]
    pub push: bool,
    #[serde(default)]
    pub triage: bool,
    #[serde(default)]
    pub pull: bool,
}

impl Permissions {
    /// Collapse the flags to the strongest grant's name.
    pub fn highest(&self) -> &'static str {
        if self.admin {
            "admin"
        } else if self.maintain {
            "maintain"
        } else if self.push {
            "push"
        } else if self.triage {
            "triage"
        } else if self.pull {
            "pull"
        } else {
            "none"
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub slug: String,
    pub permission: String,
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.slug, self.permission)
    }
}
