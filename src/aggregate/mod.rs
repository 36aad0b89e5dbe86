//! Pure transforms over warehouse rows.
//!
//! Monthly counts from the three sources are unioned and regrouped here,
//! then shaped into the series the chart builders draw. Nothing in this
//! module touches the network.

mod series;
mod stats;

pub use series::{MonthlyPivot, NurseSeries, NurseTrend, NurseTrendRow, PivotSeries};
pub use stats::SummaryStats;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::filters::CAMERA_ANNOTATION_EVENTS;
use crate::warehouse::QueryResult;

/// Label of the bucket that absorbs everything past the top N.
pub const OTHERS_LABEL: &str = "Others";

/// Slices shown in the distribution pies.
pub const TOP_N: usize = 5;

// ═══════════════════════════════════════════════════════════
// Monthly counts
// ═══════════════════════════════════════════════════════════

/// One (month, escalation) bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    /// First day of the month.
    pub month: NaiveDate,
    pub escalation: String,
    pub count: i64,
}

impl MonthlyCount {
    pub fn new(month: NaiveDate, escalation: impl Into<String>, count: i64) -> Self {
        Self {
            month,
            escalation: escalation.into(),
            count,
        }
    }

    /// Read `date`, `escalation_observation`, `count` rows. Rows missing any
    /// of the three are dropped.
    pub fn from_result(result: &QueryResult) -> Vec<Self> {
        let rows: Vec<Self> = result
            .rows()
            .iter()
            .filter_map(|row| {
                Some(Self {
                    month: row.date("date")?,
                    escalation: row.text("escalation_observation")?,
                    count: row.integer("count")?,
                })
            })
            .collect();

        if rows.len() != result.len() {
            tracing::debug!(
                total = result.len(),
                kept = rows.len(),
                "Dropped incomplete monthly rows"
            );
        }
        rows
    }
}

/// Union every source, regroup by (month, trimmed escalation) summing counts,
/// drop the camera label when excluded, sorted by (month, escalation).
pub fn merge_monthly(parts: Vec<Vec<MonthlyCount>>, exclude_camera: bool) -> Vec<MonthlyCount> {
    let mut grouped: BTreeMap<(NaiveDate, String), i64> = BTreeMap::new();
    for row in parts.into_iter().flatten() {
        let key = (row.month, row.escalation.trim().to_string());
        *grouped.entry(key).or_insert(0) += row.count;
    }

    grouped
        .into_iter()
        .filter(|((_, escalation), _)| !(exclude_camera && escalation == CAMERA_ANNOTATION_EVENTS))
        .map(|((month, escalation), count)| MonthlyCount {
            month,
            escalation,
            count,
        })
        .collect()
}

/// Narrow a single-escalation result to the requested type.
///
/// The nursing query already filters on the trimmed label; this catches
/// stored labels that differ only by whitespace or stray extra types.
pub fn restrict_to_escalation(rows: Vec<MonthlyCount>, name: &str) -> Vec<MonthlyCount> {
    if rows.is_empty() {
        return rows;
    }

    let wanted = name.trim();
    let distinct: BTreeSet<&str> = rows.iter().map(|r| r.escalation.as_str()).collect();
    let present = distinct.contains(wanted) || distinct.iter().any(|e| e.trim() == wanted);

    if present && distinct.len() <= 1 {
        return rows;
    }

    tracing::warn!(
        requested = wanted,
        found = ?distinct,
        "Unexpected escalation types in single-escalation result, filtering"
    );
    rows.into_iter()
        .filter(|r| r.escalation.trim() == wanted)
        .collect()
}

// ═══════════════════════════════════════════════════════════
// Top-N bucketing
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: i64,
}

/// Sum per label, keep the `n` largest (ties by label), and fold the rest
/// into a trailing `Others` bucket when it is non-empty.
pub fn top_n_with_others<I, S>(counts: I, n: usize) -> Vec<LabelCount>
where
    I: IntoIterator<Item = (S, i64)>,
    S: Into<String>,
{
    let mut totals: HashMap<String, i64> = HashMap::new();
    for (label, count) in counts {
        *totals.entry(label.into()).or_insert(0) += count;
    }

    let mut ranked: Vec<LabelCount> = totals
        .into_iter()
        .map(|(label, count)| LabelCount { label, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));

    if ranked.len() <= n {
        return ranked;
    }

    let others: i64 = ranked[n..].iter().map(|c| c.count).sum();
    ranked.truncate(n);
    if others > 0 {
        ranked.push(LabelCount {
            label: OTHERS_LABEL.to_string(),
            count: others,
        });
    }
    ranked
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
