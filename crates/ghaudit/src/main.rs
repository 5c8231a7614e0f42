// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use ghaudit::report;
use ghaudit::scan::{scan_org, ScanOptions};
use github_client::GithubClient;
use http_client::BaseApiClient;
use shared_types::policy::DEFAULT_MIN_APPROVERS;
use shared_types::requests::RequestId;
use shared_types::{AccessRow, ProtectionRow, ReviewPolicy};

#[derive(Debug, Parser)]
#[command(
    version,
    author,
    about = "Checks the repos of a GitHub org for basic security compliance.",
    long_about = "ghaudit walks every repository in a GitHub organization, reads the \
branch protection settings of its default branch, and writes a CSV compliance report. \
With --strict, signed commits and mandatory CI status checks are also required. \
With --access-report, collaborators and teams are audited too.",
    after_help = "Examples:
# audit an org with the basic policy
ghaudit -t ghp_token -o my-org

# strict policy, plus an access report and a JSON dump of all findings
ghaudit -t ghp_token -o my-org -s \\
    --access-report github_audit_access.csv --json github_audit.json
"
)]
struct Arguments {
    #[arg(
        short,
        long,
        env = "GHAUDIT_TOKEN",
        hide_env_values = true,
        help = "A GitHub personal access token."
    )]
    token: String,

    #[arg(
        short,
        long,
        env = "GHAUDIT_ORG",
        help = "The short name of a GitHub organization (the \"username\")."
    )]
    org: String,

    #[arg(short, long, help = "Audit with very strict requirements.")]
    strict: bool,

    #[arg(
        long,
        default_value = "github_audit.csv",
        help = "Where to write the compliance report CSV."
    )]
    output: PathBuf,

    #[arg(
        long,
        value_name = "PATH",
        help = "Also audit collaborators and teams, writing the result to this CSV."
    )]
    access_report: Option<PathBuf>,

    #[arg(
        long,
        value_name = "PATH",
        help = "Also write the full audit, findings included, as JSON."
    )]
    json: Option<PathBuf>,

    #[arg(
        long,
        env = "GHAUDIT_API_ROOT",
        default_value = "https://api.github.com",
        help = "GitHub API root; point this at your GitHub Enterprise host if you have one."
    )]
    api_root: String,

    #[arg(
        long,
        env = "GHAUDIT_MIN_APPROVERS",
        default_value_t = DEFAULT_MIN_APPROVERS,
        help = "The minimum amount of approving reviewers we prefer on a project."
    )]
    min_approvers: u32,

    #[arg(long, help = "Leave archived repositories out of the audit.")]
    skip_archived: bool,

    #[arg(
        short,
        long,
        help = "Suppress non-error output and set the log level to WARN."
    )]
    quiet: bool,

    #[arg(
        short,
        long,
        action = ArgAction::Count,
        help = "Increase verbosity level, can be used multiple times."
    )]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ! {
    let args = Arguments::parse();

    let subscriber = FmtSubscriber::builder()
        .with_writer(std::io::stderr)
        .with_max_level(match (args.quiet, args.verbose) {
            (true, _) => Level::WARN,
            (false, 0) => Level::INFO,
            (false, 1) => Level::DEBUG,
            (false, _) => Level::TRACE,
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber).unwrap();

    let client = match build_client(&args) {
        Ok(client) => client,
        Err(err) => {
            error!("{err:#}");
            std::process::exit(2);
        }
    };

    if let Err(err) = ghaudit_run(&args, &client).await {
        error!("{err:#}");
        std::process::exit(1);
    } else {
        std::process::exit(0);
    }
}

fn build_client(args: &Arguments) -> Result<GithubClient> {
    let request_id = RequestId::new_unique_with_prefix("ghaudit");
    GithubClient::new(BaseApiClient::new(request_id), &args.api_root, &args.token)
        .context("configuring the GitHub client")
}

async fn ghaudit_run(args: &Arguments, client: &GithubClient) -> Result<()> {
    let policy = ReviewPolicy {
        min_required_approvers: args.min_approvers,
        strict: args.strict,
    };
    if policy.strict {
        info!("Strict mode is enabled.");
    }

    let options = ScanOptions {
        org: args.org.clone(),
        policy,
        audit_access: args.access_report.is_some(),
        skip_archived: args.skip_archived,
    };
    let outcome = scan_org(client, &options).await?;

    let rows: Vec<ProtectionRow> = outcome.audits.iter().map(|a| a.row.clone()).collect();
    report::write_protection_csv(&args.output, &rows, policy.strict)?;
    info!("Wrote compliance report to {:?}", args.output);

    if let Some(path) = &args.access_report {
        let access: Vec<AccessRow> = outcome
            .audits
            .iter()
            .flat_map(|a| a.access.iter().cloned())
            .collect();
        report::write_access_csv(path, &access)?;
        info!("Wrote access report to {path:?}");
    }

    if let Some(path) = &args.json {
        report::write_json(path, &outcome.audits)?;
        info!("Wrote JSON report to {path:?}");
    }

    if outcome.failed > 0 {
        anyhow::bail!(
            "{} of {} repositories could not be scanned",
            outcome.failed,
            outcome.total
        );
    }
    Ok(())
}
