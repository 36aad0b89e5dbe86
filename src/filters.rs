//! Dashboard filter vocabulary.
//!
//! The browser sends five string parameters where `all` means "no filter".
//! They are parsed once here into typed selections; everything downstream
//! matches on these types instead of comparing strings.

use chrono::NaiveDate;
use serde::Deserialize;

/// Label of the pseudo escalation type backed by the camera events table.
pub const CAMERA_ANNOTATION_EVENTS: &str = "Camera Annotation Events";
/// Label of the pseudo escalation type backed by the impact cases table.
pub const IMPACT_CASES: &str = "Impact Cases";
/// Nursing escalation with its own nurse-wise trend chart.
pub const EDUCATING_NURSES: &str = "Educating nurses";

/// Hospital lists longer than this are treated as "all hospitals".
pub const MAX_HOSPITALS: usize = 100;

const ALL: &str = "all";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FilterError {
    #[error("Invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Invalid date range {0:?}, expected YYYY-MM-DD,YYYY-MM-DD")]
    InvalidRange(String),
}

// ═══════════════════════════════════════════════════════════
// Selections
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Escalation {
    All,
    ImpactCases,
    CameraAnnotations,
    /// A value of the nursing table's `escalation_observation` column.
    Named(String),
}

impl Escalation {
    pub fn parse(raw: &str) -> Self {
        let value = raw.trim();
        if value.is_empty() || value == ALL {
            return Self::All;
        }
        match value {
            CAMERA_ANNOTATION_EVENTS => Self::CameraAnnotations,
            IMPACT_CASES => Self::ImpactCases,
            other => Self::Named(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => ALL,
            Self::ImpactCases => IMPACT_CASES,
            Self::CameraAnnotations => CAMERA_ANNOTATION_EVENTS,
            Self::Named(name) => name,
        }
    }

    pub fn is_educating_nurses(&self) -> bool {
        matches!(self, Self::Named(name) if name == EDUCATING_NURSES)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailFilter {
    All,
    Address(String),
}

impl EmailFilter {
    pub fn parse(raw: &str) -> Self {
        let value = raw.trim();
        if value.is_empty() || value == ALL {
            Self::All
        } else {
            Self::Address(value.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HospitalFilter {
    All,
    One(String),
    Many(Vec<String>),
}

impl HospitalFilter {
    pub fn parse(raw: &str) -> Self {
        let value = raw.trim();
        if value.is_empty() || value == ALL {
            return Self::All;
        }
        if !value.contains(',') {
            return Self::One(value.to_string());
        }

        let hospitals: Vec<String> = value
            .split(',')
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string)
            .collect();

        match hospitals.len() {
            0 => Self::All,
            n if n > MAX_HOSPITALS => {
                tracing::debug!(count = n, "Hospital list too long, treating as all");
                Self::All
            }
            _ => Self::Many(hospitals),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    All,
    Day(NaiveDate),
    Range(NaiveDate, NaiveDate),
}

impl DateFilter {
    pub fn parse(raw: &str) -> Result<Self, FilterError> {
        let value = raw.trim();
        if value.is_empty() || value == ALL {
            return Ok(Self::All);
        }
        match value.split_once(',') {
            Some((start, end)) => {
                let start = parse_day(start).ok_or_else(|| FilterError::InvalidRange(value.into()))?;
                let end = parse_day(end).ok_or_else(|| FilterError::InvalidRange(value.into()))?;
                Ok(Self::Range(start, end))
            }
            None => parse_day(value)
                .map(Self::Day)
                .ok_or_else(|| FilterError::InvalidDate(value.into())),
        }
    }
}

fn parse_day(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

// ═══════════════════════════════════════════════════════════
// Combined filter
// ═══════════════════════════════════════════════════════════

/// Raw query-string parameters as sent by the dashboard script.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterParams {
    #[serde(default = "all")]
    pub escalation: String,
    #[serde(default = "all")]
    pub email: String,
    #[serde(default = "all")]
    pub hospital: String,
    #[serde(default = "all")]
    pub date: String,
    #[serde(default = "false_flag")]
    pub exclude_camera: String,
}

fn all() -> String {
    ALL.to_string()
}

fn false_flag() -> String {
    "false".to_string()
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            escalation: all(),
            email: all(),
            hospital: all(),
            date: all(),
            exclude_camera: false_flag(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardFilter {
    pub escalation: Escalation,
    pub email: EmailFilter,
    pub hospital: HospitalFilter,
    pub date: DateFilter,
    pub exclude_camera: bool,
}

impl Default for DashboardFilter {
    fn default() -> Self {
        Self {
            escalation: Escalation::All,
            email: EmailFilter::All,
            hospital: HospitalFilter::All,
            date: DateFilter::All,
            exclude_camera: false,
        }
    }
}

impl DashboardFilter {
    pub fn parse(params: &FilterParams) -> Result<Self, FilterError> {
        Ok(Self {
            escalation: Escalation::parse(&params.escalation),
            email: EmailFilter::parse(&params.email),
            hospital: HospitalFilter::parse(&params.hospital),
            date: DateFilter::parse(&params.date)?,
            exclude_camera: params.exclude_camera.trim().eq_ignore_ascii_case("true"),
        })
    }

    /// Camera events selected while the camera source is excluded:
    /// every data operation short-circuits to an empty result.
    pub fn camera_suppressed(&self) -> bool {
        self.exclude_camera && self.escalation == Escalation::CameraAnnotations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn escalation_recognises_pseudo_types() {
        assert_eq!(Escalation::parse("all"), Escalation::All);
        assert_eq!(Escalation::parse(""), Escalation::All);
        assert_eq!(
            Escalation::parse(" Camera Annotation Events "),
            Escalation::CameraAnnotations
        );
        assert_eq!(Escalation::parse("Impact Cases"), Escalation::ImpactCases);
        assert_eq!(
            Escalation::parse("  Lab abnormality"),
            Escalation::Named("Lab abnormality".into())
        );
    }

    #[test]
    fn educating_nurses_is_detected() {
        assert!(Escalation::parse("Educating nurses").is_educating_nurses());
        assert!(!Escalation::parse("Gasping").is_educating_nurses());
        assert!(!Escalation::All.is_educating_nurses());
    }

    #[test]
    fn email_all_and_address() {
        assert_eq!(EmailFilter::parse("all"), EmailFilter::All);
        assert_eq!(
            EmailFilter::parse(" a@b.net "),
            EmailFilter::Address("a@b.net".into())
        );
    }

    #[test]
    fn hospital_single_and_list() {
        assert_eq!(HospitalFilter::parse("all"), HospitalFilter::All);
        assert_eq!(
            HospitalFilter::parse("St. Mary"),
            HospitalFilter::One("St. Mary".into())
        );
        assert_eq!(
            HospitalFilter::parse("A, B ,,C"),
            HospitalFilter::Many(vec!["A".into(), "B".into(), "C".into()])
        );
    }

    #[test]
    fn hospital_list_of_blanks_is_all() {
        assert_eq!(HospitalFilter::parse(" , ,"), HospitalFilter::All);
    }

    #[test]
    fn hospital_list_over_limit_is_all() {
        let many: Vec<String> = (0..=MAX_HOSPITALS).map(|i| format!("H{i}")).collect();
        assert_eq!(HospitalFilter::parse(&many.join(",")), HospitalFilter::All);

        let exactly: Vec<String> = (0..MAX_HOSPITALS).map(|i| format!("H{i}")).collect();
        assert!(matches!(
            HospitalFilter::parse(&exactly.join(",")),
            HospitalFilter::Many(list) if list.len() == MAX_HOSPITALS
        ));
    }

    #[test]
    fn date_day_and_range() {
        assert_eq!(DateFilter::parse("all").unwrap(), DateFilter::All);
        assert_eq!(
            DateFilter::parse("2025-02-03").unwrap(),
            DateFilter::Day(day(2025, 2, 3))
        );
        assert_eq!(
            DateFilter::parse("2025-01-01,2025-03-31").unwrap(),
            DateFilter::Range(day(2025, 1, 1), day(2025, 3, 31))
        );
    }

    #[test]
    fn malformed_dates_are_rejected() {
        assert_eq!(
            DateFilter::parse("yesterday"),
            Err(FilterError::InvalidDate("yesterday".into()))
        );
        assert!(matches!(
            DateFilter::parse("2025-01-01,' OR 1=1 --"),
            Err(FilterError::InvalidRange(_))
        ));
    }

    #[test]
    fn exclude_camera_only_for_literal_true() {
        let mut params = FilterParams::default();
        params.exclude_camera = "TRUE".into();
        assert!(DashboardFilter::parse(&params).unwrap().exclude_camera);
        params.exclude_camera = "yes".into();
        assert!(!DashboardFilter::parse(&params).unwrap().exclude_camera);
    }

    #[test]
    fn camera_suppression_requires_both_flags() {
        let mut filter = DashboardFilter {
            escalation: Escalation::CameraAnnotations,
            exclude_camera: true,
            ..DashboardFilter::default()
        };
        assert!(filter.camera_suppressed());
        filter.exclude_camera = false;
        assert!(!filter.camera_suppressed());
        filter.exclude_camera = true;
        filter.escalation = Escalation::All;
        assert!(!filter.camera_suppressed());
    }

    #[test]
    fn default_params_parse_to_default_filter() {
        let filter = DashboardFilter::parse(&FilterParams::default()).unwrap();
        assert_eq!(filter, DashboardFilter::default());
    }
}
