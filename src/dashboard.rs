//! Dashboard operations over any `Warehouse`.
//!
//! Each public method is one thing the browser asks for: dropdown options,
//! the record listing, the chart bundle. Branching on the escalation filter
//! lives here; SQL text comes from `sql`, shaping from `aggregate`, and
//! figures from `charts`.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::aggregate::{
    self, merge_monthly, restrict_to_escalation, LabelCount, MonthlyCount, MonthlyPivot,
    NurseTrend, NurseTrendRow, TOP_N,
};
use crate::charts::{self, Figure};
use crate::config::TableRefs;
use crate::filters::{
    DashboardFilter, DateFilter, Escalation, CAMERA_ANNOTATION_EVENTS, IMPACT_CASES,
};
use crate::sql::{NurseTrendKind, QueryBuilder, Source};
use crate::warehouse::{QueryResult, Warehouse, WarehouseError};

/// Days covered by the landing-page overview.
pub const OVERVIEW_DAYS: i64 = 90;

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Warehouse query failed: {0}")]
    Warehouse(#[from] WarehouseError),
}

// ═══════════════════════════════════════════════════════════
// Response shapes
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub escalations: Vec<String>,
    pub emails: Vec<String>,
    pub hospitals: Vec<String>,
    pub dates: Vec<String>,
}

/// The charts shown for one filter selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartBundle {
    pub monthly_trend: Figure,
    /// Escalation, camera-event or impact-type pie depending on the branch.
    pub escalation_dist: Figure,
    pub nurse_wise_trend: Option<Figure>,
}

impl ChartBundle {
    /// Same notice in every slot, nurse trend included.
    pub fn notice(title: &str) -> Self {
        Self {
            monthly_trend: Figure::empty_notice(title),
            escalation_dist: Figure::empty_notice(title),
            nurse_wise_trend: Some(Figure::empty_notice(title)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub filter_options: FilterOptions,
    pub monthly_trend: Figure,
    pub escalation_dist: Figure,
}

// ═══════════════════════════════════════════════════════════
// Service
// ═══════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct Dashboard {
    warehouse: Arc<dyn Warehouse>,
    tables: TableRefs,
}

impl Dashboard {
    pub fn new(warehouse: Arc<dyn Warehouse>, tables: TableRefs) -> Self {
        Self { warehouse, tables }
    }

    fn queries(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(&self.tables)
    }

    async fn run(&self, sql: &str) -> Result<QueryResult, DashboardError> {
        let result = self.warehouse.query(sql).await?;
        tracing::debug!(rows = result.len(), "Query returned");
        Ok(result)
    }

    // ── Dropdowns ───────────────────────────────────────────

    pub async fn filter_options(&self) -> Result<FilterOptions, DashboardError> {
        let queries = self.queries();
        let (nursing_sql, impact_sql, camera_sql) = (
            queries.nursing_filter_options(),
            queries.impact_filter_options(),
            queries.camera_filter_options(),
        );
        let (nursing, impact, camera) = tokio::try_join!(
            self.run(&nursing_sql),
            self.run(&impact_sql),
            self.run(&camera_sql),
        )?;

        let distinct = |result: &QueryResult, column: &str| -> BTreeSet<String> {
            result.rows().iter().filter_map(|r| r.text(column)).collect()
        };

        let mut escalations: Vec<String> = distinct(&nursing, "escalation_observation")
            .into_iter()
            .collect();
        escalations.push(IMPACT_CASES.to_string());
        escalations.push(CAMERA_ANNOTATION_EVENTS.to_string());

        let mut emails = distinct(&nursing, "email_address");
        emails.extend(distinct(&impact, "email_address"));
        emails.extend(distinct(&camera, "user_email"));

        let mut hospitals = distinct(&nursing, "hospital_name");
        hospitals.extend(distinct(&impact, "hospital_name"));
        hospitals.extend(distinct(&camera, "hospital_name"));

        let mut dates = distinct(&nursing, "date_only");
        dates.extend(distinct(&camera, "date_only"));

        Ok(FilterOptions {
            escalations,
            emails: emails.into_iter().collect(),
            hospitals: hospitals.into_iter().collect(),
            dates: dates.into_iter().collect(),
        })
    }

    // ── Records ─────────────────────────────────────────────

    pub async fn filtered_records(
        &self,
        filter: &DashboardFilter,
    ) -> Result<QueryResult, DashboardError> {
        let sql = match self.queries().records(filter) {
            Some(sql) => sql,
            None => {
                tracing::debug!("Camera annotations excluded, skipping record query");
                return Ok(QueryResult::empty());
            }
        };
        let result = self.run(&sql).await?;

        if let Escalation::Named(name) = &filter.escalation {
            let found: BTreeSet<String> = result
                .rows()
                .iter()
                .filter_map(|r| r.text("escalation_observation"))
                .map(|e| e.trim().to_string())
                .collect();
            tracing::debug!(requested = %name, ?found, "Escalation types in records");
        }
        Ok(result)
    }

    // ── Monthly series ──────────────────────────────────────

    pub async fn monthly_counts(
        &self,
        filter: &DashboardFilter,
    ) -> Result<Vec<MonthlyCount>, DashboardError> {
        if filter.camera_suppressed() {
            tracing::debug!("Camera annotations excluded, monthly series empty");
            return Ok(Vec::new());
        }

        let queries = self.queries();
        match &filter.escalation {
            Escalation::CameraAnnotations => {
                tracing::debug!(branch = "camera", "Monthly counts");
                self.monthly_from(queries.monthly_counts(Source::CameraEvents, filter, None))
                    .await
            }
            Escalation::ImpactCases => {
                tracing::debug!(branch = "impact", "Monthly counts");
                self.monthly_from(queries.monthly_counts(Source::ImpactCases, filter, None))
                    .await
            }
            Escalation::Named(name) => {
                tracing::debug!(branch = "single", escalation = %name, "Monthly counts");
                let rows = self
                    .monthly_from(queries.monthly_counts(Source::NursingPod, filter, Some(name)))
                    .await?;
                Ok(restrict_to_escalation(rows, name))
            }
            Escalation::All => {
                tracing::debug!(branch = "all", exclude_camera = filter.exclude_camera, "Monthly counts");
                let nursing_sql = queries.monthly_counts(Source::NursingPod, filter, None);
                let impact_sql = queries.monthly_counts(Source::ImpactCases, filter, None);
                let (nursing, impact) =
                    tokio::try_join!(self.monthly_from(nursing_sql), self.monthly_from(impact_sql))?;

                let mut parts = vec![nursing, impact];
                if !filter.exclude_camera {
                    let camera_sql = queries.monthly_counts(Source::CameraEvents, filter, None);
                    parts.push(self.monthly_from(camera_sql).await?);
                }
                Ok(merge_monthly(parts, filter.exclude_camera))
            }
        }
    }

    async fn monthly_from(&self, sql: String) -> Result<Vec<MonthlyCount>, DashboardError> {
        let result = self.run(&sql).await?;
        Ok(MonthlyCount::from_result(&result))
    }

    // ── Charts ──────────────────────────────────────────────

    pub async fn charts(&self, filter: &DashboardFilter) -> Result<ChartBundle, DashboardError> {
        if filter.camera_suppressed() {
            return Ok(ChartBundle::notice(charts::CAMERA_EXCLUDED_TITLE));
        }

        let monthly = self.monthly_counts(filter).await?;
        let monthly_trend = charts::monthly_trend(&MonthlyPivot::build(&monthly));

        let bundle = match &filter.escalation {
            Escalation::CameraAnnotations => {
                let breakdown = self.run(&self.queries().camera_event_breakdown(filter)).await?;
                let buckets = top_buckets(&breakdown, "event_name");
                ChartBundle {
                    monthly_trend,
                    escalation_dist: charts::camera_events_distribution(&buckets),
                    nurse_wise_trend: Some(
                        self.nurse_trend(NurseTrendKind::CameraAnnotations, filter).await?,
                    ),
                }
            }
            Escalation::ImpactCases => {
                let breakdown = self.run(&self.queries().impact_type_breakdown(filter)).await?;
                let buckets = top_buckets(&breakdown, "impact_type");
                ChartBundle {
                    monthly_trend,
                    escalation_dist: charts::impact_cases_distribution(&buckets),
                    nurse_wise_trend: None,
                }
            }
            escalation => {
                let nurse_wise_trend = if escalation.is_educating_nurses() {
                    Some(self.nurse_trend(NurseTrendKind::EducatingNurses, filter).await?)
                } else {
                    None
                };
                let distinct: BTreeSet<&str> =
                    monthly.iter().map(|r| r.escalation.as_str()).collect();
                tracing::debug!(count = distinct.len(), types = ?distinct, "Escalation types in monthly series");
                ChartBundle {
                    monthly_trend,
                    escalation_dist: charts::escalation_distribution(&escalation_buckets(&monthly)),
                    nurse_wise_trend,
                }
            }
        };
        Ok(bundle)
    }

    async fn nurse_trend(
        &self,
        kind: NurseTrendKind,
        filter: &DashboardFilter,
    ) -> Result<Figure, DashboardError> {
        let result = self.run(&self.queries().nurse_trend(kind, filter)).await?;
        let trend = NurseTrend::build(&NurseTrendRow::from_result(&result));
        Ok(charts::nurse_trend(&trend, kind))
    }

    pub async fn impact_score_chart(&self, filter: &DashboardFilter) -> Result<Figure, DashboardError> {
        if filter.camera_suppressed() {
            return Ok(charts::impact_score_distribution(&[]));
        }
        let result = self.run(&self.queries().impact_scores(filter)).await?;
        Ok(charts::impact_score_distribution(&label_counts(&result, "impact_score")))
    }

    pub async fn camera_user_role_chart(
        &self,
        filter: &DashboardFilter,
    ) -> Result<Figure, DashboardError> {
        if filter.camera_suppressed() {
            tracing::debug!("Camera annotations excluded, skipping user-role query");
            return Ok(charts::camera_user_roles(&[]));
        }
        let result = self.run(&self.queries().camera_user_roles(filter)).await?;
        Ok(charts::camera_user_roles(&label_counts(&result, "user_role")))
    }

    // ── Landing page ────────────────────────────────────────

    /// Dropdown options plus the last 90 days of every source.
    pub async fn overview(&self, today: NaiveDate) -> Result<Overview, DashboardError> {
        let filter = DashboardFilter {
            date: DateFilter::Range(today - Duration::days(OVERVIEW_DAYS), today),
            ..DashboardFilter::default()
        };

        let (filter_options, monthly) =
            tokio::try_join!(self.filter_options(), self.monthly_counts(&filter))?;

        Ok(Overview {
            filter_options,
            monthly_trend: charts::monthly_trend(&MonthlyPivot::build(&monthly)),
            escalation_dist: charts::escalation_distribution(&escalation_buckets(&monthly)),
        })
    }
}

fn escalation_buckets(monthly: &[MonthlyCount]) -> Vec<LabelCount> {
    aggregate::top_n_with_others(
        monthly.iter().map(|r| (r.escalation.clone(), r.count)),
        TOP_N,
    )
}

/// Top-5 + Others over a `(label_column, count)` breakdown.
fn top_buckets(result: &QueryResult, label_column: &str) -> Vec<LabelCount> {
    aggregate::top_n_with_others(
        result
            .rows()
            .iter()
            .filter_map(|r| Some((r.text(label_column)?, r.integer("count")?))),
        TOP_N,
    )
}

/// Rows as returned, in query order.
fn label_counts(result: &QueryResult, label_column: &str) -> Vec<LabelCount> {
    result
        .rows()
        .iter()
        .filter_map(|r| {
            Some(LabelCount {
                label: r.text(label_column)?,
                count: r.integer("count")?,
            })
        })
        .collect()
}
