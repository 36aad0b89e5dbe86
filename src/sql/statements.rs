use super::{explicit_date_condition, quote_literal, Predicates, Source};
use crate::config::TableRefs;
use crate::filters::{
    DashboardFilter, CAMERA_ANNOTATION_EVENTS, EDUCATING_NURSES, IMPACT_CASES,
};

/// Row cap for the record listing.
pub const RECORD_LIMIT: u32 = 1000;

/// Which nurse-wise trend to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NurseTrendKind {
    /// Camera annotations per `user_email`.
    CameraAnnotations,
    /// "Educating nurses" escalations per `email_address`.
    EducatingNurses,
}

impl NurseTrendKind {
    fn source(self) -> Source {
        match self {
            Self::CameraAnnotations => Source::CameraEvents,
            Self::EducatingNurses => Source::NursingPod,
        }
    }
}

/// Builds every statement the dashboard sends to the warehouse.
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder<'a> {
    tables: &'a TableRefs,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(tables: &'a TableRefs) -> Self {
        Self { tables }
    }

    fn table(&self, source: Source) -> &'a str {
        source.table(self.tables)
    }

    // ── Filter dropdowns ────────────────────────────────────

    pub fn nursing_filter_options(&self) -> String {
        format!(
            "SELECT DISTINCT escalation_observation, email_address, hospital_name, DATE(timestamp) AS date_only \
             FROM `{table}` \
             WHERE escalation_observation IS NOT NULL AND escalation_observation != '' \
             AND email_address IS NOT NULL AND email_address != '' AND email_address != '0' \
             AND hospital_name IS NOT NULL AND hospital_name != '' \
             AND DATE(timestamp) >= DATE_SUB(CURRENT_DATE(), INTERVAL 3 MONTH) \
             ORDER BY escalation_observation, email_address, hospital_name, date_only \
             LIMIT 10000",
            table = self.table(Source::NursingPod)
        )
    }

    pub fn impact_filter_options(&self) -> String {
        format!(
            "SELECT DISTINCT email_address, hospital_name \
             FROM `{table}` \
             WHERE email_address IS NOT NULL AND email_address != '' \
             AND hospital_name IS NOT NULL AND hospital_name != '' \
             AND DATE(timestamp) >= DATE_SUB(CURRENT_DATE(), INTERVAL 3 MONTH) \
             ORDER BY email_address, hospital_name \
             LIMIT 5000",
            table = self.table(Source::ImpactCases)
        )
    }

    pub fn camera_filter_options(&self) -> String {
        format!(
            "SELECT DISTINCT user_email, hospital_name, DATE(timestamp) AS date_only \
             FROM `{table}` \
             WHERE user_email IS NOT NULL AND user_email != '' \
             AND hospital_name IS NOT NULL AND hospital_name != '' \
             AND TIMESTAMP_TRUNC(timestamp, DAY) >= TIMESTAMP_SUB(CURRENT_TIMESTAMP(), INTERVAL 7 DAY) \
             ORDER BY user_email, hospital_name, date_only \
             LIMIT 5000",
            table = self.table(Source::CameraEvents)
        )
    }

    // ── Record listing ──────────────────────────────────────

    /// `SELECT *` over the source chosen by the escalation filter.
    /// `None` when the camera source is selected but excluded.
    pub fn records(&self, filter: &DashboardFilter) -> Option<String> {
        use crate::filters::Escalation;

        if filter.camera_suppressed() {
            return None;
        }

        let (source, predicates, order) = match &filter.escalation {
            Escalation::CameraAnnotations => (
                Source::CameraEvents,
                Predicates::for_source(Source::CameraEvents, filter),
                "timestamp DESC",
            ),
            Escalation::ImpactCases => (
                Source::ImpactCases,
                Predicates::for_source(Source::ImpactCases, filter),
                "impact_score DESC",
            ),
            Escalation::Named(name) => {
                let mut predicates = Predicates::new();
                predicates.push(escalation_condition(name));
                predicates.extend(Predicates::for_source(Source::NursingPod, filter));
                (Source::NursingPod, predicates, "timestamp DESC")
            }
            Escalation::All => (
                Source::NursingPod,
                Predicates::for_source(Source::NursingPod, filter),
                "timestamp DESC",
            ),
        };

        let where_clause = predicates.render(source);
        tracing::debug!(%where_clause, conditions = predicates.len(), "Record listing predicates");

        Some(format!(
            "SELECT * FROM `{table}` WHERE {where_clause} ORDER BY {order} LIMIT {RECORD_LIMIT}",
            table = self.table(source)
        ))
    }

    // ── Monthly counts ──────────────────────────────────────

    /// Month-bucketed counts from one source.
    ///
    /// Nursing rows keep their own `escalation_observation` label and can be
    /// narrowed to one escalation; impact and camera rows are labelled with
    /// their pseudo escalation name.
    pub fn monthly_counts(
        &self,
        source: Source,
        filter: &DashboardFilter,
        escalation: Option<&str>,
    ) -> String {
        let mut predicates = Predicates::new();
        if let (Source::NursingPod, Some(name)) = (source, escalation) {
            predicates.push(escalation_condition(name));
        }
        predicates.extend(Predicates::for_source(source, filter));
        let where_clause = predicates.render(source);

        let (label, guard, group_extra) = match source {
            Source::NursingPod => (
                "escalation_observation".to_string(),
                "escalation_observation IS NOT NULL AND escalation_observation != ''",
                ", escalation_observation",
            ),
            Source::ImpactCases => (
                format!("{} AS escalation_observation", quote_literal(IMPACT_CASES)),
                "impact_type IS NOT NULL AND impact_type != ''",
                "",
            ),
            Source::CameraEvents => (
                format!(
                    "{} AS escalation_observation",
                    quote_literal(CAMERA_ANNOTATION_EVENTS)
                ),
                "event_name IS NOT NULL AND event_name != ''",
                "",
            ),
        };

        format!(
            "SELECT DATE_TRUNC(DATE(timestamp), MONTH) AS date, {label}, COUNT(*) AS count \
             FROM `{table}` \
             WHERE {guard} AND {where_clause} \
             GROUP BY DATE_TRUNC(DATE(timestamp), MONTH){group_extra} \
             ORDER BY DATE_TRUNC(DATE(timestamp), MONTH)",
            table = self.table(source)
        )
    }

    // ── Breakdowns ──────────────────────────────────────────

    pub fn camera_event_breakdown(&self, filter: &DashboardFilter) -> String {
        let where_clause =
            Predicates::for_source(Source::CameraEvents, filter).render(Source::CameraEvents);
        format!(
            "SELECT event_name, user_role, unit_name, COUNT(*) AS count \
             FROM `{table}` \
             WHERE event_name IS NOT NULL AND event_name != '' AND {where_clause} \
             GROUP BY event_name, user_role, unit_name \
             ORDER BY count DESC",
            table = self.table(Source::CameraEvents)
        )
    }

    /// User roles over the last 30 days regardless of the date filter.
    pub fn camera_user_roles(&self, filter: &DashboardFilter) -> String {
        let mut predicates = Predicates::email_and_hospital(Source::CameraEvents, filter);
        predicates.push_opt(Source::CameraEvents.default_window().map(str::to_string));
        format!(
            "SELECT user_role, COUNT(*) AS count \
             FROM `{table}` \
             WHERE user_role IS NOT NULL AND user_role != '' AND {where_clause} \
             GROUP BY user_role \
             ORDER BY count DESC",
            table = self.table(Source::CameraEvents),
            where_clause = predicates.render(Source::CameraEvents)
        )
    }

    pub fn impact_type_breakdown(&self, filter: &DashboardFilter) -> String {
        let where_clause = impact_predicates(filter).render(Source::ImpactCases);
        format!(
            "SELECT impact_type, impact_score, impact_rating, bed_name_score, eagle_score, COUNT(*) AS count \
             FROM `{table}` \
             WHERE impact_type IS NOT NULL AND impact_type != '' AND {where_clause} \
             GROUP BY impact_type, impact_score, impact_rating, bed_name_score, eagle_score \
             ORDER BY impact_score DESC",
            table = self.table(Source::ImpactCases)
        )
    }

    pub fn impact_scores(&self, filter: &DashboardFilter) -> String {
        let where_clause = impact_predicates(filter).render(Source::ImpactCases);
        format!(
            "SELECT impact_score, COUNT(*) AS count \
             FROM `{table}` \
             WHERE impact_score IS NOT NULL AND {where_clause} \
             GROUP BY impact_score \
             ORDER BY impact_score DESC",
            table = self.table(Source::ImpactCases)
        )
    }

    // ── Nurse-wise trends ───────────────────────────────────

    /// Per-nurse monthly counts. No default window: `all` means all history.
    pub fn nurse_trend(&self, kind: NurseTrendKind, filter: &DashboardFilter) -> String {
        let source = kind.source();
        let email_column = source.email_column();

        let mut predicates = Predicates::new();
        if kind == NurseTrendKind::EducatingNurses {
            predicates.push(escalation_condition(EDUCATING_NURSES));
        }
        predicates.extend(Predicates::email_and_hospital(source, filter));
        predicates.push_opt(explicit_date_condition(&filter.date));

        let where_clause = predicates.render_or_match_all();

        format!(
            "SELECT EXTRACT(YEAR FROM timestamp) AS year, EXTRACT(MONTH FROM timestamp) AS month, \
             {email_column} AS nurse_email, COUNT(*) AS count \
             FROM `{table}` \
             WHERE {email_column} IS NOT NULL AND {email_column} != '' AND {where_clause} \
             GROUP BY year, month, {email_column} \
             ORDER BY year, month, {email_column}",
            table = self.table(source)
        )
    }
}

/// Exact match against the trimmed stored escalation label.
fn escalation_condition(name: &str) -> String {
    format!("TRIM(escalation_observation) = {}", quote_literal(name.trim()))
}

/// Impact charts take an explicit date filter but never a default window.
fn impact_predicates(filter: &DashboardFilter) -> Predicates {
    let mut predicates = Predicates::email_and_hospital(Source::ImpactCases, filter);
    predicates.push_opt(explicit_date_condition(&filter.date));
    predicates
}
