// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Policy evaluation. Pure functions from API state to report rows and
//! findings, so the whole engine is testable without a network.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use shared_types::github::{BranchProtection, Collaborator, Team};
use shared_types::{AccessRow, GranteeKind, ProtectionRow, ReviewPolicy};

/// Everything the audit learned about one repository.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepoAudit {
    #[serde(flatten)]
    pub row: ProtectionRow,
    pub findings: Vec<Finding>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub access: Vec<AccessRow>,
}

/// One gap between a branch's protection settings and the policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Finding {
    NoDefaultBranch,
    NotProtected,
    NoPullRequestReviews,
    StaleReviewsNotDismissed,
    CodeOwnersNotRequired,
    TooFewApprovers { required: u32, minimum: u32 },
    AdminsNotEnforced,
    SignedCommitsNotRequired,
    StatusChecksNotRequired,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::NoDefaultBranch => f.write_str("has no default branch!"),
            Finding::NotProtected => f.write_str("has NO protection!"),
            Finding::NoPullRequestReviews => f.write_str("does not require PR reviews!"),
            Finding::StaleReviewsNotDismissed => f.write_str("does not dismiss stale reviews"),
            Finding::CodeOwnersNotRequired => f.write_str("does not require CODEOWNERS"),
            Finding::TooFewApprovers { minimum, .. } => {
                write!(f, "does not require at least {minimum} approving review(s)")
            }
            Finding::AdminsNotEnforced => {
                f.write_str("does not enforce the rules for GitHub/repo admins")
            }
            Finding::SignedCommitsNotRequired => {
                f.write_str("STRICT: does not require signed commits")
            }
            Finding::StatusChecksNotRequired => {
                f.write_str("STRICT: does not perform mandatory CI/CD checks")
            }
        }
    }
}

/// Evaluate one repository's default-branch protection against the policy.
pub fn evaluate(
    repository: &str,
    default_branch: Option<&str>,
    protection: Option<&BranchProtection>,
    policy: &ReviewPolicy,
) -> (ProtectionRow, Vec<Finding>) {
    let Some(branch) = default_branch else {
        return (
            ProtectionRow::unprotected(repository, ""),
            vec![Finding::NoDefaultBranch],
        );
    };

    let Some(protection) = protection else {
        return (
            ProtectionRow::unprotected(repository, branch),
            vec![Finding::NotProtected],
        );
    };

    let row = ProtectionRow::from_protection(repository, branch, protection);
    let mut findings = Vec::new();

    match &protection.required_pull_request_reviews {
        None => findings.push(Finding::NoPullRequestReviews),
        Some(reviews) => {
            if !reviews.dismiss_stale_reviews {
                findings.push(Finding::StaleReviewsNotDismissed);
            }
            if !reviews.require_code_owner_reviews {
                findings.push(Finding::CodeOwnersNotRequired);
            }
            if reviews.required_approving_review_count < policy.min_required_approvers {
                findings.push(Finding::TooFewApprovers {
                    required: reviews.required_approving_review_count,
                    minimum: policy.min_required_approvers,
                });
            }
        }
    }

    if !row.enforce_admins {
        findings.push(Finding::AdminsNotEnforced);
    }

    if policy.strict {
        if !row.requires_signed_commits {
            findings.push(Finding::SignedCommitsNotRequired);
        }
        if !row.requires_status_checks {
            findings.push(Finding::StatusChecksNotRequired);
        }
    }

    (row, findings)
}

/// Turn the collaborator and team listings into access report rows: who can
/// touch this repository, with what permission, and through what door.
pub fn access_rows(
    repository: &str,
    direct: &[Collaborator],
    outside: &[Collaborator],
    teams: &[Team],
) -> Vec<AccessRow> {
    let outside_logins: HashSet<&str> = outside.iter().map(|c| c.login.as_str()).collect();

    let mut rows: Vec<AccessRow> = direct
        .iter()
        .map(|collaborator| AccessRow {
            repository: repository.into(),
            grantee: collaborator.login.clone(),
            kind: GranteeKind::User,
            permission: collaborator.permission().into(),
            affiliation: if outside_logins.contains(collaborator.login.as_str()) {
                "outside".into()
            } else {
                "direct".into()
            },
        })
        .collect();

    rows.extend(teams.iter().map(|team| AccessRow {
        repository: repository.into(),
        grantee: team.slug.clone(),
        kind: GranteeKind::Team,
        permission: team.permission.clone(),
        affiliation: "team".into(),
    }));

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::github::{EnabledFlag, Permissions, RequiredPullRequestReviews};

    fn full_protection() -> BranchProtection {
        BranchProtection {
            required_pull_request_reviews: Some(RequiredPullRequestReviews {
                dismiss_stale_reviews: true,
                require_code_owner_reviews: true,
                required_approving_review_count: 1,
            }),
            required_signatures: Some(EnabledFlag { enabled: true }),
            enforce_admins: Some(EnabledFlag { enabled: true }),
            required_status_checks: Some(Default::default()),
        }
    }

    #[test]
    fn fully_protected_repo_has_no_findings() {
        let (row, findings) = evaluate(
            "acme/anvil",
            Some("main"),
            Some(&full_protection()),
            &ReviewPolicy::strict(),
        );
        assert!(row.protected);
        assert_eq!(findings, vec![]);
    }

    #[test]
    fn unprotected_repo() {
        let (row, findings) = evaluate("acme/anvil", Some("main"), None, &ReviewPolicy::basic());
        assert!(!row.protected);
        assert_eq!(findings, vec![Finding::NotProtected]);
    }

    #[test]
    fn repo_without_default_branch() {
        let (row, findings) = evaluate("acme/empty", None, None, &ReviewPolicy::basic());
        assert_eq!(row.default_branch, "");
        assert_eq!(findings, vec![Finding::NoDefaultBranch]);
    }

    #[test]
    fn protection_without_review_rule() {
        let protection = BranchProtection {
            enforce_admins: Some(EnabledFlag { enabled: true }),
            ..Default::default()
        };
        let (row, findings) = evaluate(
            "acme/anvil",
            Some("main"),
            Some(&protection),
            &ReviewPolicy::basic(),
        );
        assert!(row.protected);
        assert_eq!(findings, vec![Finding::NoPullRequestReviews]);
    }

    #[test]
    fn lax_review_rule_is_fully_itemized() {
        let protection = BranchProtection {
            required_pull_request_reviews: Some(RequiredPullRequestReviews {
                dismiss_stale_reviews: false,
                require_code_owner_reviews: false,
                required_approving_review_count: 0,
            }),
            ..Default::default()
        };
        let (_, findings) = evaluate(
            "acme/anvil",
            Some("main"),
            Some(&protection),
            &ReviewPolicy::basic(),
        );
        assert_eq!(
            findings,
            vec![
                Finding::StaleReviewsNotDismissed,
                Finding::CodeOwnersNotRequired,
                Finding::TooFewApprovers {
                    required: 0,
                    minimum: 1
                },
                Finding::AdminsNotEnforced,
            ]
        );
    }

    #[test]
    fn strict_findings_only_in_strict_mode() {
        let protection = BranchProtection {
            required_pull_request_reviews: Some(RequiredPullRequestReviews {
                dismiss_stale_reviews: true,
                require_code_owner_reviews: true,
                required_approving_review_count: 2,
            }),
            enforce_admins: Some(EnabledFlag { enabled: true }),
            ..Default::default()
        };

        let (_, basic) = evaluate(
            "acme/anvil",
            Some("main"),
            Some(&protection),
            &ReviewPolicy::basic(),
        );
        assert_eq!(basic, vec![]);

        let (_, strict) = evaluate(
            "acme/anvil",
            Some("main"),
            Some(&protection),
            &ReviewPolicy::strict(),
        );
        assert_eq!(
            strict,
            vec![
                Finding::SignedCommitsNotRequired,
                Finding::StatusChecksNotRequired,
            ]
        );
    }

    #[test]
    fn access_rows_tag_outside_collaborators_and_teams() {
        let direct = vec![
            Collaborator {
                login: "alice".into(),
                role_name: Some("admin".into()),
                permissions: None,
            },
            Collaborator {
                login: "contractor".into(),
                role_name: None,
                permissions: Some(Permissions {
                    push: true,
                    pull: true,
                    ..Default::default()
                }),
            },
        ];
        let outside = vec![Collaborator {
            login: "contractor".into(),
            role_name: None,
            permissions: None,
        }];
        let teams = vec![Team {
            name: "Platform".into(),
            slug: "platform".into(),
            permission: "maintain".into(),
        }];

        let rows = access_rows("acme/anvil", &direct, &outside, &teams);
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].grantee, "alice");
        assert_eq!(rows[0].permission, "admin");
        assert_eq!(rows[0].affiliation, "direct");

        assert_eq!(rows[1].grantee, "contractor");
        assert_eq!(rows[1].permission, "push");
        assert_eq!(rows[1].affiliation, "outside");

        assert_eq!(rows[2].grantee, "platform");
        assert_eq!(rows[2].kind, GranteeKind::Team);
        assert_eq!(rows[2].affiliation, "team");
    }
}
