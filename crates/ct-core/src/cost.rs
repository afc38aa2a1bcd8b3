//! Cost aggregation: human focus time plus model spend.

use serde::{Deserialize, Serialize};

use crate::usage::UsageRecord;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Derived cost view. Recomputed on every query, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub human_cost_usd: f64,
    pub ai_cost_usd: f64,
    pub total_cost_usd: f64,
    pub focus_hours: f64,
}

/// Combines focus seconds and usage records into a cost breakdown.
///
/// Background calls are excluded unless `include_background` is set. No
/// rounding happens here.
pub fn breakdown<'a>(
    focus_seconds: f64,
    records: impl IntoIterator<Item = &'a UsageRecord>,
    hourly_rate: f64,
    include_background: bool,
) -> CostBreakdown {
    let ai_cost_usd: f64 = records
        .into_iter()
        .filter(|record| include_background || !record.is_background)
        .fold(0.0, |total, record| total + record.cost_usd);
    let focus_hours = focus_seconds / SECONDS_PER_HOUR;
    let human_cost_usd = focus_hours * hourly_rate;

    CostBreakdown {
        human_cost_usd,
        ai_cost_usd,
        total_cost_usd: human_cost_usd + ai_cost_usd,
        focus_hours,
    }
}
