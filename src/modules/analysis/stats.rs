use serde::{Deserialize, Serialize};

use crate::modules::analysis::model::NormalizedResult;

// The three shares need not add up to exactly 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsView {
    pub positive_pct: f64,
    pub negative_pct: f64,
    pub neutral_pct: f64,
}

fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

pub fn project(result: &NormalizedResult) -> StatsView {
    let stats = &result.stats;

    StatsView {
        positive_pct: percentage(stats.positive, stats.total),
        negative_pct: percentage(stats.negative, stats.total),
        neutral_pct: percentage(stats.neutral, stats.total),
    }
}
