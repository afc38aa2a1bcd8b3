//! Import command: reads every existing session log once and persists its usage.

use anyhow::{Context, Result};
use ct_core::{BranchResolver, PricingTable, UsageRecord, read_history_many};
use ct_db::Database;

use crate::Config;

/// Summary of one import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub files_scanned: usize,
    pub records_found: usize,
    pub records_written: usize,
    pub issues: usize,
}

/// Fills in the branch of records whose log line carried none.
pub fn attribute_branches(records: &mut [UsageRecord], resolver: &dyn BranchResolver) {
    for record in records.iter_mut().filter(|r| r.branch_name.is_unknown()) {
        record.branch_name = resolver.branch_at_time(record.timestamp);
    }
}

pub fn run(
    db: &mut Database,
    config: &Config,
    pricing: &PricingTable,
    resolver: &dyn BranchResolver,
) -> Result<ImportSummary> {
    let mut scan = read_history_many(&config.log_patterns(), pricing)
        .context("failed to expand log patterns")?;
    for issue in &scan.issues {
        tracing::warn!(error = %issue, "log read issue during import");
    }

    attribute_branches(&mut scan.records, resolver);
    let records_written = db
        .upsert_usage(&scan.records)
        .context("failed to persist usage records")?;

    let summary = ImportSummary {
        files_scanned: scan.files_scanned,
        records_found: scan.records.len(),
        records_written,
        issues: scan.issues.len(),
    };
    tracing::info!(?summary, "import complete");
    Ok(summary)
}
