use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::{MonthlyCount, SummaryStats};
use crate::warehouse::QueryResult;

// ═══════════════════════════════════════════════════════════
// Monthly pivot
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct PivotSeries {
    pub escalation: String,
    /// One value per pivot month, zero where the escalation had no rows.
    pub values: Vec<i64>,
}

/// Months × escalations grid behind the monthly trend chart.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyPivot {
    pub months: Vec<NaiveDate>,
    pub series: Vec<PivotSeries>,
    /// Computed over non-zero cells only.
    pub stats: SummaryStats,
}

impl MonthlyPivot {
    pub fn build(rows: &[MonthlyCount]) -> Self {
        let months: Vec<NaiveDate> = rows
            .iter()
            .map(|r| r.month)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut cells: BTreeMap<&str, BTreeMap<NaiveDate, i64>> = BTreeMap::new();
        for row in rows {
            *cells
                .entry(row.escalation.as_str())
                .or_default()
                .entry(row.month)
                .or_insert(0) += row.count;
        }

        let series: Vec<PivotSeries> = cells
            .into_iter()
            .map(|(escalation, by_month)| PivotSeries {
                escalation: escalation.to_string(),
                values: months
                    .iter()
                    .map(|m| by_month.get(m).copied().unwrap_or(0))
                    .collect(),
            })
            .collect();

        let stats = SummaryStats::from_counts(
            series
                .iter()
                .flat_map(|s| s.values.iter().copied())
                .filter(|v| *v > 0),
        );

        Self {
            months,
            series,
            stats,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════
// Nurse-wise trend
// ═══════════════════════════════════════════════════════════

/// One `(year, month, nurse_email, count)` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NurseTrendRow {
    pub year: i32,
    pub month: u32,
    pub email: String,
    pub count: i64,
}

impl NurseTrendRow {
    pub fn from_result(result: &QueryResult) -> Vec<Self> {
        result
            .rows()
            .iter()
            .filter_map(|row| {
                Some(Self {
                    year: i32::try_from(row.integer("year")?).ok()?,
                    month: u32::try_from(row.integer("month")?).ok()?,
                    email: row.text("nurse_email")?,
                    count: row.integer("count")?,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NurseSeries {
    pub email: String,
    /// Local part of the email.
    pub display_name: String,
    /// `(month label, count)` in chronological order; only months with rows.
    pub points: Vec<(String, i64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NurseTrend {
    /// Chronological `"January 2025"` style labels.
    pub month_labels: Vec<String>,
    /// One per nurse, in order of first appearance.
    pub series: Vec<NurseSeries>,
    /// Computed over every count, zeros included.
    pub stats: SummaryStats,
}

impl NurseTrend {
    pub fn build(rows: &[NurseTrendRow]) -> Self {
        let mut sorted: Vec<&NurseTrendRow> = rows
            .iter()
            .filter(|r| month_label(r.year, r.month).is_some())
            .collect();
        sorted.sort_by(|a, b| {
            (a.year, a.month, a.email.as_str()).cmp(&(b.year, b.month, b.email.as_str()))
        });

        let month_labels: Vec<String> = sorted
            .iter()
            .map(|r| (r.year, r.month))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter_map(|(y, m)| month_label(y, m))
            .collect();

        let mut series: Vec<NurseSeries> = Vec::new();
        for row in &sorted {
            let label = match month_label(row.year, row.month) {
                Some(label) => label,
                None => continue,
            };
            match series.iter_mut().find(|s| s.email == row.email) {
                Some(existing) => existing.points.push((label, row.count)),
                None => series.push(NurseSeries {
                    email: row.email.clone(),
                    display_name: display_name(&row.email).to_string(),
                    points: vec![(label, row.count)],
                }),
            }
        }

        Self {
            month_labels,
            series,
            stats: SummaryStats::from_counts(sorted.iter().map(|r| r.count)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// `"March 2025"`; `None` for an out-of-range month.
pub fn month_label(year: i32, month: u32) -> Option<String> {
    NaiveDate::from_ymd_opt(year, month, 1).map(|d| d.format("%B %Y").to_string())
}

fn display_name(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}
