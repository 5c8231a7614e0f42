// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Report writers. The CSV layout is the long-standing one consumers of
//! these audits already ingest, so column names and cell rendering are kept
//! stable; the JSON report carries the full audit including findings.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use csv::Writer;

use crate::audit::RepoAudit;
use shared_types::{AccessRow, ProtectionRow};

const PROTECTION_HEADER: [&str; 8] = [
    "Repository",
    "Default Branch",
    "Protected?",
    "PR Reviews",
    "Dismisses Stale Reviews",
    "Requires CODEOWNERS",
    "Approver Count",
    "Enforce For Admins",
];

const PROTECTION_HEADER_STRICT: [&str; 2] = [
    "STRICT: Requires Signed Commits",
    "STRICT: CI Status Checks Required",
];

const ACCESS_HEADER: [&str; 5] = ["Repository", "Grantee", "Type", "Permission", "Affiliation"];

// Report consumers expect capitalized booleans.
fn bool_cell(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

pub fn write_protection_header<W: Write>(wtr: &mut Writer<W>, strict: bool) -> Result<()> {
    let strict_columns = if strict { &PROTECTION_HEADER_STRICT[..] } else { &[] };
    wtr.write_record(PROTECTION_HEADER.iter().chain(strict_columns))
        .context("writing header")
}

pub fn write_protection_row<W: Write>(
    wtr: &mut Writer<W>,
    row: &ProtectionRow,
    strict: bool,
) -> Result<()> {
    let mut record = vec![
        row.repository.as_str(),
        row.default_branch.as_str(),
        bool_cell(row.protected),
        bool_cell(row.pr_reviews),
        bool_cell(row.dismisses_stale_reviews),
        bool_cell(row.requires_code_owners),
    ];
    let approvers = row.approver_count.to_string();
    record.push(&approvers);
    record.push(bool_cell(row.enforce_admins));
    if strict {
        record.push(bool_cell(row.requires_signed_commits));
        record.push(bool_cell(row.requires_status_checks));
    }
    wtr.write_record(&record)
        .with_context(|| format!("writing record: {}", row.repository))
}

pub fn write_protection_csv(path: &Path, rows: &[ProtectionRow], strict: bool) -> Result<()> {
    let mut wtr =
        Writer::from_path(path).with_context(|| format!("creating report {path:?}"))?;
    write_protection_header(&mut wtr, strict)?;
    for row in rows {
        write_protection_row(&mut wtr, row, strict)?;
    }
    wtr.flush().context("flushing report")?;
    Ok(())
}

pub fn write_access_csv(path: &Path, rows: &[AccessRow]) -> Result<()> {
    let mut wtr =
        Writer::from_path(path).with_context(|| format!("creating access report {path:?}"))?;
    wtr.write_record(ACCESS_HEADER).context("writing header")?;
    for row in rows {
        wtr.write_record([
            row.repository.as_str(),
            row.grantee.as_str(),
            row.kind.as_str(),
            row.permission.as_str(),
            row.affiliation.as_str(),
        ])
        .with_context(|| format!("writing record: {}/{}", row.repository, row.grantee))?;
    }
    wtr.flush().context("flushing access report")?;
    Ok(())
}

pub fn write_json(path: &Path, audits: &[RepoAudit]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating JSON report {path:?}"))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, audits).context("serializing JSON report")?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> ProtectionRow {
        ProtectionRow {
            repository: "acme/anvil".into(),
            default_branch: "main".into(),
            protected: true,
            pr_reviews: true,
            dismisses_stale_reviews: true,
            requires_code_owners: false,
            approver_count: 1,
            enforce_admins: true,
            requires_signed_commits: false,
            requires_status_checks: true,
        }
    }

    fn to_csv(rows: &[ProtectionRow], strict: bool) -> String {
        let mut buffer = Vec::new();
        {
            let mut wtr = Writer::from_writer(&mut buffer);
            write_protection_header(&mut wtr, strict).unwrap();
            for row in rows {
                write_protection_row(&mut wtr, row, strict).unwrap();
            }
        }
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn basic_report_layout() {
        assert_eq!(
            to_csv(&[sample_row()], false),
            "Repository,Default Branch,Protected?,PR Reviews,Dismisses Stale Reviews,\
             Requires CODEOWNERS,Approver Count,Enforce For Admins\n\
             acme/anvil,main,True,True,True,False,1,True\n",
        );
    }

    #[test]
    fn strict_report_has_two_extra_columns() {
        let csv = to_csv(&[sample_row()], true);
        let mut lines = csv.lines();
        let header = lines.next().unwrap();
        let row = lines.next().unwrap();
        assert!(header.ends_with(
            "STRICT: Requires Signed Commits,STRICT: CI Status Checks Required"
        ));
        assert!(row.ends_with("1,True,False,True"));
        assert_eq!(header.split(',').count(), 10);
        assert_eq!(row.split(',').count(), 10);
    }

    #[test]
    fn unprotected_row_renders_all_false() {
        let csv = to_csv(&[ProtectionRow::unprotected("acme/anvil", "main")], false);
        assert!(csv.ends_with("acme/anvil,main,False,False,False,False,0,False\n"));
    }

    #[test]
    fn access_report_layout() {
        let rows = vec![AccessRow {
            repository: "acme/anvil".into(),
            grantee: "alice".into(),
            kind: shared_types::GranteeKind::User,
            permission: "admin".into(),
            affiliation: "direct".into(),
        }];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.csv");
        write_access_csv(&path, &rows).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Repository,Grantee,Type,Permission,Affiliation\nacme/anvil,alice,user,admin,direct\n"
        );
    }

    #[test]
    fn json_report_round_trips_findings() {
        let audits = vec![RepoAudit {
            row: sample_row(),
            findings: vec![crate::audit::Finding::CodeOwnersNotRequired],
            access: vec![],
        }];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.json");
        write_json(&path, &audits).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["repository"], "acme/anvil");
        assert_eq!(value[0]["findings"][0], "code_owners_not_required");
    }
}
