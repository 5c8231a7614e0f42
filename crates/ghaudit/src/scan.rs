// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Drives the audit across an organization: enumerate repositories, scan
//! each one, keep going when a single repository fails.

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use github_client::GithubClient;
use shared_types::github::Repository;
use shared_types::ReviewPolicy;

use crate::audit::{self, RepoAudit};

pub struct ScanOptions {
    pub org: String,
    pub policy: ReviewPolicy,
    /// Also fetch collaborators and teams per repository.
    pub audit_access: bool,
    pub skip_archived: bool,
}

pub struct ScanOutcome {
    pub audits: Vec<RepoAudit>,
    /// Repositories considered (after the archived filter).
    pub total: usize,
    /// Repositories that could not be scanned due to API failures.
    pub failed: usize,
}

pub async fn scan_org(client: &GithubClient, options: &ScanOptions) -> Result<ScanOutcome> {
    info!("Getting a list of repos from the {} organization", options.org);
    let repos = client
        .org_repos(&options.org)
        .await
        .with_context(|| format!("listing repositories of {}", options.org))?;
    info!("Found {} repositories", repos.len());

    let mut audits = Vec::new();
    let mut total = 0;
    let mut failed = 0;
    for repo in &repos {
        if options.skip_archived && repo.archived {
            info!("Skipping archived repo {}", repo.full_name);
            continue;
        }
        total += 1;
        match scan_repo(client, options, repo).await {
            Ok(repo_audit) => audits.push(repo_audit),
            Err(err) => {
                error!("scan failed for {}: {err:#}", repo.full_name);
                failed += 1;
            }
        }
    }

    Ok(ScanOutcome {
        audits,
        total,
        failed,
    })
}

async fn scan_repo(
    client: &GithubClient,
    options: &ScanOptions,
    repo: &Repository,
) -> Result<RepoAudit> {
    info!("Scanning repo {}", repo.full_name);

    let branch = repo.default_branch.as_deref();
    if let Some(branch) = branch {
        info!("{} has default branch {branch}", repo.full_name);
    }

    let protection = match branch {
        Some(branch) => client
            .branch_protection(&repo.full_name, branch)
            .await
            .with_context(|| format!("fetching protection for {}:{branch}", repo.full_name))?,
        None => None,
    };
    if let (Some(branch), Some(_)) = (branch, &protection) {
        info!("{}:{branch} has protection!", repo.full_name);
    }

    let (row, findings) = audit::evaluate(&repo.full_name, branch, protection.as_ref(), &options.policy);
    for finding in &findings {
        if row.default_branch.is_empty() {
            warn!("{} {finding}", repo.full_name);
        } else {
            warn!("{}:{} {finding}", repo.full_name, row.default_branch);
        }
    }

    let access = if options.audit_access {
        let direct = client
            .collaborators(&repo.full_name, "direct")
            .await
            .with_context(|| format!("listing collaborators of {}", repo.full_name))?;
        let outside = client
            .collaborators(&repo.full_name, "outside")
            .await
            .with_context(|| format!("listing outside collaborators of {}", repo.full_name))?;
        let teams = client
            .teams(&repo.full_name)
            .await
            .with_context(|| format!("listing teams of {}", repo.full_name))?;
        audit::access_rows(&repo.full_name, &direct, &outside, &teams)
    } else {
        Vec::new()
    };

    Ok(RepoAudit {
        row,
        findings,
        access,
    })
}
