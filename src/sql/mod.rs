//! SQL text for the three record sources.
//!
//! `Predicates` turns a `DashboardFilter` into WHERE fragments for one
//! source; `statements` assembles the fixed set of parameterized queries
//! the dashboard runs. Values are only ever spliced in through
//! `quote_literal`, and dates only after they parsed as `NaiveDate`.

mod statements;

pub use statements::{NurseTrendKind, QueryBuilder};

use crate::config::TableRefs;
use crate::filters::{DashboardFilter, DateFilter, EmailFilter, HospitalFilter};

const NURSING_DEFAULT_WINDOW: &str = "DATE(timestamp) >= DATE_SUB(CURRENT_DATE(), INTERVAL 90 DAY)";
const CAMERA_DEFAULT_WINDOW: &str =
    "TIMESTAMP_TRUNC(timestamp, DAY) >= TIMESTAMP_SUB(CURRENT_TIMESTAMP(), INTERVAL 30 DAY)";
const MATCH_ALL: &str = "1=1";

/// The tables the dashboard reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    NursingPod,
    ImpactCases,
    CameraEvents,
}

impl Source {
    pub fn table(self, tables: &TableRefs) -> &str {
        match self {
            Self::NursingPod => &tables.nursing_pod,
            Self::ImpactCases => &tables.impact_cases,
            Self::CameraEvents => &tables.camera_events,
        }
    }

    pub fn email_column(self) -> &'static str {
        match self {
            Self::NursingPod | Self::ImpactCases => "email_address",
            Self::CameraEvents => "user_email",
        }
    }

    /// Time window applied when the user picked no date.
    pub fn default_window(self) -> Option<&'static str> {
        match self {
            Self::NursingPod => Some(NURSING_DEFAULT_WINDOW),
            Self::CameraEvents => Some(CAMERA_DEFAULT_WINDOW),
            Self::ImpactCases => None,
        }
    }
}

/// Doubles single quotes for a standard-SQL string literal.
pub fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

pub fn quote_literal(value: &str) -> String {
    format!("'{}'", escape_literal(value))
}

pub fn hospital_condition(filter: &HospitalFilter) -> Option<String> {
    match filter {
        HospitalFilter::All => None,
        HospitalFilter::One(name) => Some(format!("hospital_name = {}", quote_literal(name))),
        HospitalFilter::Many(names) => {
            let list: Vec<String> = names.iter().map(|n| quote_literal(n)).collect();
            Some(format!("hospital_name IN ({})", list.join(", ")))
        }
    }
}

pub fn email_condition(source: Source, filter: &EmailFilter) -> Option<String> {
    match filter {
        EmailFilter::All => None,
        EmailFilter::Address(email) => Some(format!(
            "{} = {}",
            source.email_column(),
            quote_literal(email)
        )),
    }
}

/// Explicit date predicate only; `None` for `DateFilter::All`.
pub fn explicit_date_condition(filter: &DateFilter) -> Option<String> {
    match filter {
        DateFilter::All => None,
        DateFilter::Day(day) => Some(format!("DATE(timestamp) = '{day}'")),
        DateFilter::Range(start, end) => Some(format!(
            "DATE(timestamp) >= '{start}' AND DATE(timestamp) <= '{end}'"
        )),
    }
}

/// Date predicate falling back to the source's default window.
pub fn date_condition(source: Source, filter: &DateFilter) -> Option<String> {
    explicit_date_condition(filter).or_else(|| source.default_window().map(str::to_string))
}

/// Ordered WHERE fragments joined with `AND`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicates {
    clauses: Vec<String>,
}

impl Predicates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Email, hospital and date (with default window) for `source`.
    pub fn for_source(source: Source, filter: &DashboardFilter) -> Self {
        let mut predicates = Self::new();
        predicates.push_opt(email_condition(source, &filter.email));
        predicates.push_opt(hospital_condition(&filter.hospital));
        predicates.push_opt(date_condition(source, &filter.date));
        predicates
    }

    /// Email and hospital only; the caller decides about dates.
    pub fn email_and_hospital(source: Source, filter: &DashboardFilter) -> Self {
        let mut predicates = Self::new();
        predicates.push_opt(email_condition(source, &filter.email));
        predicates.push_opt(hospital_condition(&filter.hospital));
        predicates
    }

    pub fn push(&mut self, clause: impl Into<String>) -> &mut Self {
        self.clauses.push(clause.into());
        self
    }

    pub fn push_opt(&mut self, clause: Option<String>) -> &mut Self {
        if let Some(clause) = clause {
            self.clauses.push(clause);
        }
        self
    }

    pub fn extend(&mut self, other: Predicates) -> &mut Self {
        self.clauses.extend(other.clauses);
        self
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Joined clauses, or the source's default window (`1=1` when it has none).
    pub fn render(&self, source: Source) -> String {
        if self.clauses.is_empty() {
            source.default_window().unwrap_or(MATCH_ALL).to_string()
        } else {
            self.clauses.join(" AND ")
        }
    }

    /// Joined clauses, or `1=1` regardless of any source window.
    pub fn render_or_match_all(&self) -> String {
        if self.clauses.is_empty() {
            MATCH_ALL.to_string()
        } else {
            self.clauses.join(" AND ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::Escalation;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn escape_doubles_single_quotes() {
        assert_eq!(escape_literal("O'Brien"), "O''Brien");
        assert_eq!(escape_literal(""), "");
        assert_eq!(quote_literal("a'b'c"), "'a''b''c'");
    }

    #[test]
    fn hospital_conditions() {
        assert_eq!(hospital_condition(&HospitalFilter::All), None);
        assert_eq!(
            hospital_condition(&HospitalFilter::One("St. John's".into())).unwrap(),
            "hospital_name = 'St. John''s'"
        );
        assert_eq!(
            hospital_condition(&HospitalFilter::Many(vec!["A".into(), "B".into()])).unwrap(),
            "hospital_name IN ('A', 'B')"
        );
    }

    #[test]
    fn email_column_depends_on_source() {
        let email = EmailFilter::Address("x@y.net".into());
        assert_eq!(
            email_condition(Source::CameraEvents, &email).unwrap(),
            "user_email = 'x@y.net'"
        );
        assert_eq!(
            email_condition(Source::ImpactCases, &email).unwrap(),
            "email_address = 'x@y.net'"
        );
        assert_eq!(email_condition(Source::NursingPod, &EmailFilter::All), None);
    }

    #[test]
    fn date_conditions_and_default_windows() {
        let range = DateFilter::Range(day(2025, 1, 1), day(2025, 1, 31));
        assert_eq!(
            date_condition(Source::NursingPod, &range).unwrap(),
            "DATE(timestamp) >= '2025-01-01' AND DATE(timestamp) <= '2025-01-31'"
        );
        assert_eq!(
            date_condition(Source::CameraEvents, &DateFilter::Day(day(2025, 2, 9))).unwrap(),
            "DATE(timestamp) = '2025-02-09'"
        );
        assert_eq!(
            date_condition(Source::NursingPod, &DateFilter::All).unwrap(),
            NURSING_DEFAULT_WINDOW
        );
        assert_eq!(
            date_condition(Source::CameraEvents, &DateFilter::All).unwrap(),
            CAMERA_DEFAULT_WINDOW
        );
        assert_eq!(date_condition(Source::ImpactCases, &DateFilter::All), None);
    }

    #[test]
    fn predicates_join_in_order() {
        let filter = DashboardFilter {
            escalation: Escalation::All,
            email: EmailFilter::Address("n@h.org".into()),
            hospital: HospitalFilter::One("General".into()),
            date: DateFilter::Day(day(2025, 5, 1)),
            exclude_camera: false,
        };
        let predicates = Predicates::for_source(Source::NursingPod, &filter);
        assert_eq!(predicates.len(), 3);
        assert_eq!(
            predicates.render(Source::NursingPod),
            "email_address = 'n@h.org' AND hospital_name = 'General' AND DATE(timestamp) = '2025-05-01'"
        );
    }

    #[test]
    fn empty_predicates_render_source_fallback() {
        let empty = Predicates::new();
        assert_eq!(empty.render(Source::ImpactCases), "1=1");
        assert_eq!(empty.render(Source::NursingPod), NURSING_DEFAULT_WINDOW);
        assert_eq!(empty.render(Source::CameraEvents), CAMERA_DEFAULT_WINDOW);
    }

    #[test]
    fn impact_cases_without_filters_match_everything() {
        let predicates = Predicates::for_source(Source::ImpactCases, &DashboardFilter::default());
        assert!(predicates.is_empty());
        assert_eq!(predicates.render(Source::ImpactCases), "1=1");
    }

    #[test]
    fn match_all_ignores_default_windows() {
        assert_eq!(Predicates::new().render_or_match_all(), "1=1");

        let mut predicates = Predicates::new();
        predicates.push("a = 1").push("b = 2");
        assert_eq!(predicates.render_or_match_all(), "a = 1 AND b = 2");
    }
}
