//! Report command: focus time and model spend per branch.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use anyhow::Result;
use ct_core::{
    ActivityEvent, BranchName, CostBreakdown, FlowConfig, FocusLedger, UsageRecord, breakdown,
};
use ct_db::Database;
use serde::Serialize;

use crate::Config;
use crate::commands::activity::read_events;

/// Options that shape a report.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub hourly_rate: f64,
    pub include_background: bool,
    pub branch: Option<BranchName>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchReport {
    pub branch: BranchName,
    /// Usage records counted toward AI cost.
    pub records: usize,
    #[serde(flatten)]
    pub cost: CostBreakdown,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub hourly_rate: f64,
    pub include_background: bool,
    pub branches: Vec<BranchReport>,
    pub totals: CostBreakdown,
}

// ========== Focus Replay ==========

/// Replays activity events, oldest first, into per-branch focus seconds.
pub fn replay_focus(events: &[ActivityEvent], flow: FlowConfig) -> BTreeMap<BranchName, f64> {
    let mut ledger = FocusLedger::new(flow);
    for event in events {
        ledger.record(event);
    }
    ledger.totals()
}

// ========== Report Generation ==========

/// Loads the usage a report needs: one branch when filtered, otherwise all.
pub fn load_usage(db: &Database, branch: Option<&BranchName>) -> Result<Vec<UsageRecord>> {
    let usage = match branch {
        Some(branch) => db.usage_for_branch(branch)?,
        None => db.all_usage()?,
    };
    Ok(usage)
}

pub fn build_report(
    focus: &BTreeMap<BranchName, f64>,
    usage: &[UsageRecord],
    options: &ReportOptions,
) -> Report {
    let mut by_branch: BTreeMap<&BranchName, Vec<&UsageRecord>> = BTreeMap::new();
    for branch in focus.keys() {
        by_branch.entry(branch).or_default();
    }
    for record in usage {
        by_branch.entry(&record.branch_name).or_default().push(record);
    }

    let branches: Vec<BranchReport> = by_branch
        .into_iter()
        .filter(|(branch, _)| options.branch.as_ref().is_none_or(|only| only == *branch))
        .map(|(branch, records)| {
            let seconds = focus.get(branch).copied().unwrap_or(0.0);
            let cost = breakdown(
                seconds,
                records.iter().copied(),
                options.hourly_rate,
                options.include_background,
            );
            BranchReport {
                branch: branch.clone(),
                records: records
                    .iter()
                    .filter(|r| options.include_background || !r.is_background)
                    .count(),
                cost,
            }
        })
        .filter(|report| report.records > 0 || report.cost.focus_hours > 0.0)
        .collect();

    let totals = CostBreakdown {
        human_cost_usd: branches.iter().map(|b| b.cost.human_cost_usd).fold(0.0, |a, b| a + b),
        ai_cost_usd: branches.iter().map(|b| b.cost.ai_cost_usd).fold(0.0, |a, b| a + b),
        total_cost_usd: branches.iter().map(|b| b.cost.total_cost_usd).fold(0.0, |a, b| a + b),
        focus_hours: branches.iter().map(|b| b.cost.focus_hours).fold(0.0, |a, b| a + b),
    };

    Report {
        hourly_rate: options.hourly_rate,
        include_background: options.include_background,
        branches,
        totals,
    }
}

// ========== Formatting ==========

/// Formats milliseconds as "Xh Ym", or "Xm" under an hour.
pub fn format_duration(ms: i64) -> String {
    if ms < 0 {
        return "0m".to_string();
    }
    let total_minutes = ms / 60_000;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

#[allow(clippy::cast_possible_truncation)]
fn hours_to_ms(hours: f64) -> i64 {
    (hours * 3_600_000.0).round() as i64
}

fn push_row(out: &mut String, width: usize, label: &str, cost: &CostBreakdown) {
    let focus = format_duration(hours_to_ms(cost.focus_hours));
    let human = format!("${:.2}", cost.human_cost_usd);
    let ai = format!("${:.4}", cost.ai_cost_usd);
    let total = format!("${:.2}", cost.total_cost_usd);
    let _ = writeln!(
        out,
        "{label:<width$}  {focus:>8}  {human:>10}  {ai:>10}  {total:>10}"
    );
}

pub fn format_report(report: &Report) -> String {
    let mut out = String::new();
    let background = if report.include_background {
        "background included"
    } else {
        "background excluded"
    };
    let _ = writeln!(
        out,
        "COST REPORT  ${:.2}/h, {background}",
        report.hourly_rate
    );
    let _ = writeln!(out);

    if report.branches.is_empty() {
        let _ = writeln!(out, "No activity or usage recorded.");
        let _ = writeln!(out, "Hint: Run 'ct import' to read existing session logs.");
        return out.trim_end().to_string();
    }

    let width = report
        .branches
        .iter()
        .map(|b| b.branch.as_str().len())
        .chain(["BRANCH".len()])
        .max()
        .unwrap_or(0);

    let _ = writeln!(
        out,
        "{:<width$}  {:>8}  {:>10}  {:>10}  {:>10}",
        "BRANCH", "FOCUS", "HUMAN", "AI", "TOTAL"
    );
    for branch in &report.branches {
        push_row(&mut out, width, branch.branch.as_str(), &branch.cost);
    }
    if report.branches.len() > 1 {
        let _ = writeln!(out);
        push_row(&mut out, width, "TOTAL", &report.totals);
    }
    out.trim_end().to_string()
}

pub fn format_report_json(report: &Report) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

// ========== Public Interface ==========

pub fn run(
    db: &Database,
    config: &Config,
    branch: Option<BranchName>,
    json: bool,
    include_background: bool,
) -> Result<()> {
    let events = read_events(&config.events_path)?;
    let focus = replay_focus(&events, config.flow_config());
    let usage = load_usage(db, branch.as_ref())?;
    tracing::debug!(events = events.len(), records = usage.len(), "building report");

    let options = ReportOptions {
        hourly_rate: config.hourly_rate,
        include_background: include_background || config.include_background,
        branch,
    };
    let report = build_report(&focus, &usage, &options);

    if json {
        println!("{}", format_report_json(&report)?);
    } else {
        println!("{}", format_report(&report));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ct_core::{ActivityKind, TokenCounts};
    use insta::assert_snapshot;

    fn branch(name: &str) -> BranchName {
        BranchName::new(name).unwrap()
    }

    fn usage(id: &str, on: &str, cost: f64, background: bool) -> UsageRecord {
        UsageRecord {
            record_id: None,
            message_id: id.to_string(),
            timestamp: 0,
            model: "claude-sonnet-4-6".to_string(),
            tokens: TokenCounts::default(),
            cost_usd: cost,
            is_background: background,
            is_partial: false,
            session_id: String::new(),
            branch_name: branch(on),
        }
    }

    fn sample() -> (BTreeMap<BranchName, f64>, Vec<UsageRecord>) {
        let focus = BTreeMap::from([(branch("feature"), 5400.0), (branch("main"), 1800.0)]);
        let records = vec![
            usage("a", "feature", 0.5, false),
            usage("b", "main", 0.25, false),
            usage("c", "main", 1.0, true),
        ];
        (focus, records)
    }

    fn options() -> ReportOptions {
        ReportOptions {
            hourly_rate: 100.0,
            include_background: false,
            branch: None,
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0m");
        assert_eq!(format_duration(59_999), "0m");
        assert_eq!(format_duration(5_400_000), "1h 30m");
        assert_eq!(format_duration(-5), "0m");
    }

    #[test]
    fn test_replay_focus_splits_by_branch() {
        let timeline = [
            (0, "main"),
            (60_000, "main"),
            (100_000, "feature"),
            (130_000, "feature"),
        ];
        let events: Vec<ActivityEvent> = timeline
            .into_iter()
            .map(|(ts, name)| ActivityEvent::new(ActivityKind::Edit, ts, branch(name)))
            .collect();
        let focus = replay_focus(&events, FlowConfig::default());
        assert!((focus[&branch("main")] - 60.0).abs() < f64::EPSILON);
        assert!((focus[&branch("feature")] - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_report_table() {
        let (focus, records) = sample();
        let report = build_report(&focus, &records, &options());
        assert_snapshot!(format_report(&report), @r"
        COST REPORT  $100.00/h, background excluded

        BRANCH      FOCUS       HUMAN          AI       TOTAL
        feature    1h 30m     $150.00     $0.5000     $150.50
        main          30m      $50.00     $0.2500      $50.25

        TOTAL       2h 0m     $200.00     $0.7500     $200.75
        ");
    }

    #[test]
    fn test_report_json() {
        let (focus, records) = sample();
        let report = build_report(
            &focus,
            &records,
            &ReportOptions {
                branch: Some(branch("main")),
                include_background: true,
                ..options()
            },
        );
        assert_snapshot!(format_report_json(&report).unwrap(), @r#"
        {
          "hourlyRate": 100.0,
          "includeBackground": true,
          "branches": [
            {
              "branch": "main",
              "records": 2,
              "humanCostUsd": 50.0,
              "aiCostUsd": 1.25,
              "totalCostUsd": 51.25,
              "focusHours": 0.5
            }
          ],
          "totals": {
            "humanCostUsd": 50.0,
            "aiCostUsd": 1.25,
            "totalCostUsd": 51.25,
            "focusHours": 0.5
          }
        }
        "#);
    }

    #[test]
    fn test_report_empty() {
        let report = build_report(&BTreeMap::new(), &[], &options());
        assert_snapshot!(format_report(&report), @r"
        COST REPORT  $100.00/h, background excluded

        No activity or usage recorded.
        Hint: Run 'ct import' to read existing session logs.
        ");
    }

    #[test]
    fn test_load_usage_filters_in_database() {
        let mut db = Database::open_in_memory().unwrap();
        db.upsert_usage(&[
            usage("a", "feature", 0.5, false),
            usage("b", "main", 0.25, false),
        ])
        .unwrap();

        let only_main = load_usage(&db, Some(&branch("main"))).unwrap();
        let ids: Vec<&str> = only_main.iter().map(|r| r.message_id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
        assert_eq!(load_usage(&db, None).unwrap().len(), 2);
    }

    #[test]
    fn test_background_only_branch_hidden_by_default() {
        let records = vec![usage("bg", "docs", 2.0, true)];
        let hidden = build_report(&BTreeMap::new(), &records, &options());
        assert!(hidden.branches.is_empty());

        let shown = build_report(
            &BTreeMap::new(),
            &records,
            &ReportOptions {
                include_background: true,
                ..options()
            },
        );
        assert_eq!(shown.branches.len(), 1);
        assert!((shown.totals.ai_cost_usd - 2.0).abs() < f64::EPSILON);
    }
}
