//! Record listing: which columns each escalation type shows, and the HTML
//! table the dashboard swaps into the page.

use serde_json::Value;

use crate::filters::{Escalation, CAMERA_ANNOTATION_EVENTS, EDUCATING_NURSES, IMPACT_CASES};
use crate::warehouse::QueryResult;

// ═══════════════════════════════════════════════════════════
// Column catalog
// ═══════════════════════════════════════════════════════════

/// Columns shown for `all` and for escalation types without a layout.
pub const DEFAULT_COLUMNS: &[&str] = &[
    "timestamp",
    "email_address",
    "nurse_on_shift",
    "hospital_name",
    "escalation_observation",
    "bedside_staff_name",
    "intervention_advised",
    "communication_method",
    "intervention_status",
    "recommend_icu_move",
    "patient_moved_to_icu",
    "comments",
    "patient_link",
];

const CAMERA_COLUMNS: &[&str] = &[
    "event_id",
    "camera_ip",
    "event_name",
    "comment",
    "user_email",
    "user_role",
    "timestamp",
    "hospital_name",
    "hospital_id",
    "unit_name",
    "unit_id",
];

const IMPACT_COLUMNS: &[&str] = &[
    "email_address",
    "hospital_name",
    "impact_type",
    "impact_score",
    "impact_rating",
    "bed_name_score",
    "eagle_score",
    "patient_link",
];

/// Shared by most clinical escalations.
const CLINICAL_COLUMNS: &[&str] = &[
    "timestamp",
    "email_address",
    "nurse_on_shift",
    "hospital_name",
    "escalation_observation",
    "bedside_staff_name",
    "intervention_advised",
    "communication_method",
    "intervention_status",
    "recommend_icu_move",
    "patient_moved_to_icu",
    "reason_not_moved",
    "patient_handover_completed",
    "comments",
    "patient_link",
];

/// Escalations that can end in an ICU transfer record the destination too.
const ICU_TRANSFER_COLUMNS: &[&str] = &[
    "timestamp",
    "email_address",
    "nurse_on_shift",
    "hospital_name",
    "escalation_observation",
    "bedside_staff_name",
    "intervention_advised",
    "communication_method",
    "intervention_status",
    "recommend_icu_move",
    "who_recommended_icu_move",
    "patient_moved_to_icu",
    "reason_not_moved",
    "workspace_moved_to",
    "patient_handover_completed",
    "concerns_feedback",
    "comments",
    "patient_link",
];

const EDUCATING_COLUMNS: &[&str] = &[
    "timestamp",
    "email_address",
    "nurse_on_shift",
    "hospital_name",
    "escalation_observation",
    "bedside_staff_name",
    "intervention_advised",
    "communication_method",
    "intervention_status",
    "training_session_image",
    "issue_details",
    "session_attendees",
    "teaching_session_screenshot",
    "session_topic",
    "score",
    "issues",
    "patient_link",
];

const ISSUES_COLUMNS: &[&str] = &[
    "timestamp",
    "email_address",
    "nurse_on_shift",
    "hospital_name",
    "escalation_observation",
    "bedside_staff_name",
    "intervention_advised",
    "communication_method",
    "intervention_status",
    "issue_details",
    "issues",
    "comments",
    "patient_link",
];

/// Escalation label → display columns, in display order.
pub const COLUMN_LAYOUTS: &[(&str, &[&str])] = &[
    (CAMERA_ANNOTATION_EVENTS, CAMERA_COLUMNS),
    (IMPACT_CASES, IMPACT_COLUMNS),
    ("Lab abnormality", CLINICAL_COLUMNS),
    ("Vitals abnormality", ICU_TRANSFER_COLUMNS),
    ("Nursing care", CLINICAL_COLUMNS),
    ("Lines and infusion syringes not labelled", CLINICAL_COLUMNS),
    ("Medication error", CLINICAL_COLUMNS),
    ("Ventilator Alarm - Suctioning", CLINICAL_COLUMNS),
    ("Glycemic abnormality", CLINICAL_COLUMNS),
    ("Drop in GCS", CLINICAL_COLUMNS),
    ("Gasping", CLINICAL_COLUMNS),
    ("Jerky movement", CLINICAL_COLUMNS),
    ("Position not changed", CLINICAL_COLUMNS),
    (EDUCATING_NURSES, EDUCATING_COLUMNS),
    ("Issues", ISSUES_COLUMNS),
    ("Level 4 patients moved to ICU services", ICU_TRANSFER_COLUMNS),
];

pub fn columns_for(escalation: &Escalation) -> &'static [&'static str] {
    if *escalation == Escalation::All {
        return DEFAULT_COLUMNS;
    }
    let label = escalation.label();
    COLUMN_LAYOUTS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, columns)| *columns)
        .unwrap_or(DEFAULT_COLUMNS)
}

// ═══════════════════════════════════════════════════════════
// Projected table
// ═══════════════════════════════════════════════════════════

/// Error row shown in place of the table when the listing fails.
pub const ERROR_ROW_HTML: &str =
    r#"<tr><td colspan="10" class="text-center text-danger">Error loading data. Please try again.</td></tr>"#;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RecordTable {
    /// Keep the layout's columns that the result actually has, in layout order.
    pub fn project(result: &QueryResult, escalation: &Escalation) -> Self {
        let columns: Vec<String> = columns_for(escalation)
            .iter()
            .filter(|c| result.has_column(c))
            .map(|c| c.to_string())
            .collect();

        let rows = result
            .rows()
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|c| row.value(c).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Bootstrap-styled table. Cell text is escaped; NULL renders as `None`.
    pub fn to_html(&self) -> String {
        let mut html = String::from(
            "<table border=\"1\" class=\"dataframe table table-striped\" id=\"data-table\">\n",
        );

        html.push_str("  <thead>\n    <tr style=\"text-align: right;\">\n");
        for column in &self.columns {
            html.push_str(&format!("      <th>{}</th>\n", escape_html(column)));
        }
        html.push_str("    </tr>\n  </thead>\n  <tbody>\n");

        for row in &self.rows {
            html.push_str("    <tr>\n");
            for cell in row {
                html.push_str(&format!("      <td>{}</td>\n", escape_html(&cell_text(cell))));
            }
            html.push_str("    </tr>\n");
        }

        html.push_str("  </tbody>\n</table>");
        html
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        other => other.to_string(),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}
