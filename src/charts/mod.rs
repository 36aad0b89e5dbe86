//! Chart builders: aggregated series in, Plotly figures out.

mod figure;
pub mod palette;

pub use figure::{Axis, Bar, Figure, Font, Layout, Legend, Line, Margin, Marker, Pie, Scatter, Title, Trace};

use serde_json::{json, Value};

use crate::aggregate::{LabelCount, MonthlyPivot, NurseTrend, SummaryStats};
use crate::sql::NurseTrendKind;

use palette::{FONT_FAMILY, MEDIAN_COLOR, PRIMARY, TITLE_COLOR, UPPER_BAND_COLOR};

pub const MONTHLY_TREND_TITLE: &str = "Monthly Escalation Trends";
pub const ESCALATION_DIST_TITLE: &str = "Escalation Distribution (Top 5 + Others)";
pub const CAMERA_EXCLUDED_TITLE: &str = "No data (Camera Annotations excluded)";
pub const LOAD_ERROR_TITLE: &str = "Error loading chart data";

const LINE_WIDTH: f64 = 2.5;
const MARKER_SIZE: u32 = 7;

// ═══════════════════════════════════════════════════════════
// Monthly trend
// ═══════════════════════════════════════════════════════════

pub fn monthly_trend(pivot: &MonthlyPivot) -> Figure {
    if pivot.is_empty() {
        return Figure::titled_empty(MONTHLY_TREND_TITLE, "Month", "Number of Escalations");
    }

    let dates: Vec<Value> = pivot
        .months
        .iter()
        .map(|m| json!(m.format("%Y-%m-%d").to_string()))
        .collect();
    let labels: Vec<String> = pivot
        .months
        .iter()
        .map(|m| m.format("%B %Y").to_string())
        .collect();

    let mut traces: Vec<Trace> = pivot
        .series
        .iter()
        .enumerate()
        .map(|(i, series)| {
            let (colour, dash, symbol) = palette::trend_style(i);
            Trace::Scatter(Scatter {
                x: dates.clone(),
                y: series.values.iter().map(|v| json!(v)).collect(),
                mode: "lines+markers",
                name: series.escalation.clone(),
                line: Some(Line {
                    color: colour.to_string(),
                    width: LINE_WIDTH,
                    dash,
                }),
                marker: Some(Marker {
                    size: Some(MARKER_SIZE),
                    symbol: Some(symbol),
                    ..Marker::default()
                }),
                hovertemplate: None,
            })
        })
        .collect();
    traces.extend(reference_lines(&dates, &pivot.stats, "Date"));

    let mut layout = Layout::base(MONTHLY_TREND_TITLE);
    layout.title = Some(accent_title(MONTHLY_TREND_TITLE));
    layout.xaxis = Some(Axis {
        axis_type: Some("date"),
        tickangle: Some(-45),
        showgrid: Some(true),
        gridcolor: Some("lightgray"),
        zeroline: Some(false),
        tickmode: Some("array"),
        tickvals: Some(dates),
        ticktext: Some(labels),
        ..Axis::titled("Month")
    });
    layout.yaxis = Some(Axis {
        showgrid: Some(true),
        gridcolor: Some("lightgray"),
        zeroline: Some(true),
        ..Axis::titled("Number of Escalations")
    });
    layout.hovermode = Some("closest");
    layout.height = Some(700);
    layout.margin = Some(Margin { l: 80, r: 200, t: 100, b: 120 });
    layout.legend = Some(side_legend(9));

    Figure::new(traces, layout)
}

// ═══════════════════════════════════════════════════════════
// Distributions
// ═══════════════════════════════════════════════════════════

/// Top-5 + Others pie over the escalation labels of the monthly series.
pub fn escalation_distribution(buckets: &[LabelCount]) -> Figure {
    if buckets.is_empty() {
        return Figure::empty_notice(ESCALATION_DIST_TITLE);
    }

    let mut pie = pie_trace(buckets, 11);
    pie.marker.line = Some(Line {
        color: "white".into(),
        width: 2.0,
        dash: None,
    });
    pie.textposition = Some("outside");
    pie.hole = Some(0.0);
    pie.automargin = Some(true);

    let mut layout = Layout::base(ESCALATION_DIST_TITLE);
    layout.title = Some(Title {
        text: ESCALATION_DIST_TITLE.into(),
        font: Some(Font::sized(16)),
    });
    layout.height = Some(500);
    layout.margin = Some(Margin { l: 50, r: 50, t: 80, b: 50 });
    layout.showlegend = Some(true);
    layout.legend = Some(Legend {
        orientation: "v",
        yanchor: "middle",
        y: 0.5,
        xanchor: "right",
        x: 1.15,
        font: Font::sized(11),
    });

    Figure::new(vec![Trace::Pie(pie)], layout)
}

pub fn camera_events_distribution(buckets: &[LabelCount]) -> Figure {
    if buckets.is_empty() {
        return Figure::empty_notice("No Camera Events Data");
    }
    Figure::new(
        vec![Trace::Pie(pie_trace(buckets, 12))],
        Layout::base("Camera Events Distribution (Top 5 + Others)"),
    )
}

pub fn impact_cases_distribution(buckets: &[LabelCount]) -> Figure {
    if buckets.is_empty() {
        return Figure::empty_notice("No Impact Cases Data");
    }
    Figure::new(
        vec![Trace::Pie(pie_trace(buckets, 12))],
        Layout::base("Impact Cases Distribution (Top 5 + Others)"),
    )
}

fn pie_trace(buckets: &[LabelCount], text_size: u32) -> Pie {
    Pie {
        labels: buckets.iter().map(|b| b.label.clone()).collect(),
        values: buckets.iter().map(|b| b.count).collect(),
        marker: Marker {
            colors: Some(palette::pie_colours(buckets.len())),
            ..Marker::default()
        },
        textinfo: "label+percent",
        textfont: Font::sized(text_size),
        ..Pie::default()
    }
}

// ── Bars ────────────────────────────────────────────────

pub fn impact_score_distribution(scores: &[LabelCount]) -> Figure {
    bar_chart(scores, "Impact Score Distribution", "Impact Score", "Number of Cases")
}

pub fn camera_user_roles(roles: &[LabelCount]) -> Figure {
    bar_chart(roles, "User Role Distribution", "User Role", "Number of Events")
}

fn bar_chart(points: &[LabelCount], title: &str, x_title: &str, y_title: &str) -> Figure {
    let mut figure = Figure::titled_empty(title, x_title, y_title);
    if points.is_empty() {
        return figure;
    }

    let counts: Vec<Value> = points.iter().map(|p| json!(p.count)).collect();
    figure.data.push(Trace::Bar(Bar {
        x: points.iter().map(|p| json!(p.label)).collect(),
        y: counts.clone(),
        text: counts,
        textposition: "auto",
        marker: Marker {
            color: Some(PRIMARY.to_string()),
            ..Marker::default()
        },
    }));
    figure
}

// ═══════════════════════════════════════════════════════════
// Nurse-wise trend
// ═══════════════════════════════════════════════════════════

pub fn nurse_trend(trend: &NurseTrend, kind: NurseTrendKind) -> Figure {
    let (title, y_title) = match kind {
        NurseTrendKind::CameraAnnotations => (
            "Nurse-wise Month-on-Month Trend (Camera Annotations)",
            "Number of Camera Annotations",
        ),
        NurseTrendKind::EducatingNurses => (
            "Nurse-wise Month-on-Month Trend (Educating Nurses)",
            "Number of Educating Nurses Events",
        ),
    };

    if trend.is_empty() {
        return Figure::titled_empty("Nurse-wise Month-on-Month Trend", "Month", y_title);
    }

    let months: Vec<Value> = trend.month_labels.iter().map(|m| json!(m)).collect();

    let mut traces: Vec<Trace> = trend
        .series
        .iter()
        .enumerate()
        .map(|(i, series)| {
            Trace::Scatter(Scatter {
                x: series.points.iter().map(|(m, _)| json!(m)).collect(),
                y: series.points.iter().map(|(_, c)| json!(c)).collect(),
                mode: "lines+markers",
                name: series.display_name.clone(),
                line: Some(Line {
                    color: palette::nurse_colour(i).to_string(),
                    width: LINE_WIDTH,
                    dash: None,
                }),
                marker: Some(Marker {
                    size: Some(MARKER_SIZE),
                    symbol: Some("circle"),
                    ..Marker::default()
                }),
                hovertemplate: Some(format!(
                    "<b>{}</b><br>Month: %{{x}}<br>Count: %{{y}}<extra></extra>",
                    series.email
                )),
            })
        })
        .collect();
    traces.extend(reference_lines(&months, &trend.stats, "Month"));

    let mut layout = Layout::base(title);
    layout.title = Some(accent_title(title));
    layout.xaxis = Some(Axis {
        axis_type: Some("category"),
        tickangle: Some(-45),
        showgrid: Some(true),
        gridcolor: Some("#E0E0E0"),
        categoryorder: Some("array"),
        categoryarray: Some(trend.month_labels.clone()),
        ..Axis::titled("Month")
    });
    layout.yaxis = Some(Axis {
        showgrid: Some(true),
        gridcolor: Some("#E0E0E0"),
        ..Axis::titled(y_title)
    });
    layout.hovermode = Some("closest");
    layout.height = Some(500);
    layout.margin = Some(Margin { l: 80, r: 150, t: 80, b: 100 });
    layout.legend = Some(side_legend(10));

    Figure::new(traces, layout)
}

// ── Shared pieces ───────────────────────────────────────

/// Flat `Median` and `+3 SD` lines across `x`.
fn reference_lines(x: &[Value], stats: &SummaryStats, x_name: &str) -> [Trace; 2] {
    let flat = |name: &str, value: f64, colour: &str, dash: &'static str| {
        Trace::Scatter(Scatter {
            x: x.to_vec(),
            y: vec![json!(value); x.len()],
            mode: "lines",
            name: name.to_string(),
            line: Some(Line {
                color: colour.to_string(),
                width: LINE_WIDTH,
                dash: Some(dash),
            }),
            marker: None,
            hovertemplate: Some(format!(
                "<b>{name}</b><br>{x_name}: %{{x}}<br>Value: %{{y:.2f}}<extra></extra>"
            )),
        })
    };
    [
        flat("Median", stats.median, MEDIAN_COLOR, "dash"),
        flat("+3 SD", stats.upper_band, UPPER_BAND_COLOR, "dot"),
    ]
}

fn accent_title(text: &str) -> Title {
    Title {
        text: text.to_string(),
        font: Some(Font {
            family: FONT_FAMILY,
            size: 18,
            color: Some(TITLE_COLOR),
        }),
    }
}

fn side_legend(font_size: u32) -> Legend {
    Legend {
        orientation: "v",
        yanchor: "top",
        y: 1.0,
        xanchor: "left",
        x: 1.02,
        font: Font::sized(font_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{MonthlyCount, NurseTrendRow};
    use chrono::NaiveDate;

    fn month(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn bucket(label: &str, count: i64) -> LabelCount {
        LabelCount {
            label: label.into(),
            count,
        }
    }

    fn scatter(trace: &Trace) -> &Scatter {
        match trace {
            Trace::Scatter(s) => s,
            other => panic!("expected scatter, got {other:?}"),
        }
    }

    #[test]
    fn monthly_trend_has_series_plus_reference_lines() {
        let pivot = MonthlyPivot::build(&[
            MonthlyCount::new(month(2025, 1), "Fall", 2),
            MonthlyCount::new(month(2025, 2), "Gasping", 4),
        ]);
        let figure = monthly_trend(&pivot);
        assert_eq!(figure.data.len(), 4);

        let median = scatter(&figure.data[2]);
        assert_eq!(median.name, "Median");
        assert_eq!(median.y, vec![json!(3.0), json!(3.0)]);
        assert_eq!(median.line.as_ref().unwrap().color, "red");

        let band = scatter(&figure.data[3]);
        assert_eq!(band.name, "+3 SD");
        assert_eq!(band.y[0], json!(6.0));

        let xaxis = figure.layout.xaxis.as_ref().unwrap();
        assert_eq!(
            xaxis.ticktext.as_deref().unwrap(),
            ["January 2025".to_string(), "February 2025".to_string()]
        );
    }

    #[test]
    fn monthly_trend_empty_keeps_axis_titles() {
        let figure = monthly_trend(&MonthlyPivot::build(&[]));
        assert!(figure.data.is_empty());
        let value = serde_json::to_value(&figure).unwrap();
        assert_eq!(value["layout"]["title"]["text"], MONTHLY_TREND_TITLE);
        assert_eq!(value["layout"]["yaxis"]["title"]["text"], "Number of Escalations");
    }

    #[test]
    fn escalation_pie_colours_follow_slices() {
        let figure = escalation_distribution(&[bucket("Fall", 3), bucket("Gasping", 1)]);
        let value = serde_json::to_value(&figure).unwrap();
        assert_eq!(value["data"][0]["type"], "pie");
        assert_eq!(value["data"][0]["labels"], json!(["Fall", "Gasping"]));
        assert_eq!(value["data"][0]["marker"]["colors"], json!(["#1188C9", "#0253a5"]));
        assert_eq!(value["data"][0]["textposition"], "outside");
    }

    #[test]
    fn empty_distributions_have_source_titles() {
        let camera = serde_json::to_value(camera_events_distribution(&[])).unwrap();
        assert_eq!(camera["layout"]["title"]["text"], "No Camera Events Data");
        let impact = serde_json::to_value(impact_cases_distribution(&[])).unwrap();
        assert_eq!(impact["layout"]["title"]["text"], "No Impact Cases Data");
    }

    #[test]
    fn bar_charts_label_counts() {
        let figure = impact_score_distribution(&[bucket("5", 2), bucket("3", 7)]);
        let value = serde_json::to_value(&figure).unwrap();
        assert_eq!(value["data"][0]["type"], "bar");
        assert_eq!(value["data"][0]["text"], json!([2, 7]));
        assert_eq!(value["layout"]["xaxis"]["title"]["text"], "Impact Score");

        let roles = camera_user_roles(&[]);
        assert!(roles.data.is_empty());
        assert_eq!(roles.layout.title.unwrap().text, "User Role Distribution");
    }

    #[test]
    fn nurse_trend_uses_display_names_and_month_categories() {
        let trend = NurseTrend::build(&[
            NurseTrendRow {
                year: 2025,
                month: 1,
                email: "jane@h.org".into(),
                count: 2,
            },
            NurseTrendRow {
                year: 2025,
                month: 2,
                email: "jane@h.org".into(),
                count: 4,
            },
        ]);
        let figure = nurse_trend(&trend, NurseTrendKind::EducatingNurses);
        assert_eq!(figure.data.len(), 3);
        let jane = scatter(&figure.data[0]);
        assert_eq!(jane.name, "jane");
        assert!(jane.hovertemplate.as_deref().unwrap().contains("jane@h.org"));

        let xaxis = figure.layout.xaxis.as_ref().unwrap();
        assert_eq!(xaxis.axis_type, Some("category"));
        assert_eq!(
            figure.layout.title.as_ref().unwrap().text,
            "Nurse-wise Month-on-Month Trend (Educating Nurses)"
        );
    }

    #[test]
    fn empty_nurse_trend_is_titled() {
        let figure = nurse_trend(&NurseTrend::build(&[]), NurseTrendKind::CameraAnnotations);
        let value = serde_json::to_value(&figure).unwrap();
        assert_eq!(value["layout"]["title"]["text"], "Nurse-wise Month-on-Month Trend");
        assert_eq!(value["layout"]["yaxis"]["title"]["text"], "Number of Camera Annotations");
    }
}
