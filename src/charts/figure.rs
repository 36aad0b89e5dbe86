//! Plotly figure JSON, typed.
//!
//! Only the attributes the dashboard sets are modelled; everything is
//! optional and skipped when unset so the browser falls back to Plotly's
//! defaults.

use serde::Serialize;
use serde_json::Value;

use super::palette::FONT_FAMILY;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    pub fn new(data: Vec<Trace>, layout: Layout) -> Self {
        Self { data, layout }
    }

    /// No traces, just a title on a white canvas.
    pub fn empty_notice(title: &str) -> Self {
        Self::new(Vec::new(), Layout::base(title))
    }

    /// No traces, with titled axes so the empty frame still reads correctly.
    pub fn titled_empty(title: &str, x_title: &str, y_title: &str) -> Self {
        let mut layout = Layout::base(title);
        layout.xaxis = Some(Axis::titled(x_title));
        layout.yaxis = Some(Axis::titled(y_title));
        Self::new(Vec::new(), layout)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ── Traces ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Scatter(Scatter),
    Bar(Bar),
    Pie(Pie),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scatter {
    pub x: Vec<Value>,
    pub y: Vec<Value>,
    pub mode: &'static str,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovertemplate: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Bar {
    pub x: Vec<Value>,
    pub y: Vec<Value>,
    pub text: Vec<Value>,
    pub textposition: &'static str,
    pub marker: Marker,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Pie {
    pub labels: Vec<String>,
    pub values: Vec<i64>,
    pub marker: Marker,
    pub textinfo: &'static str,
    pub textfont: Font,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub textposition: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hole: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automargin: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Line {
    pub color: String,
    pub width: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<&'static str>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Marker {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
}

// ── Layout ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub family: &'static str,
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
}

impl Font {
    pub fn sized(size: u32) -> Self {
        Self {
            family: FONT_FAMILY,
            size,
            color: None,
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::sized(12)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
}

impl Title {
    pub fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            font: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub axis_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickangle: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showgrid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gridcolor: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zeroline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickmode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickvals: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticktext: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categoryorder: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categoryarray: Option<Vec<String>>,
}

impl Axis {
    pub fn titled(title: &str) -> Self {
        Self {
            title: Some(Title::plain(title)),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub orientation: &'static str,
    pub yanchor: &'static str,
    pub y: f64,
    pub xanchor: &'static str,
    pub x: f64,
    pub font: Font,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    pub font: Font,
    pub plot_bgcolor: &'static str,
    pub paper_bgcolor: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovermode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
}

impl Layout {
    /// Title, dashboard font and white backgrounds.
    pub fn base(title: &str) -> Self {
        Self {
            title: Some(Title::plain(title)),
            font: Font::default(),
            plot_bgcolor: "white",
            paper_bgcolor: "white",
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_notice_serializes_minimal_layout() {
        let value = serde_json::to_value(Figure::empty_notice("Nothing here")).unwrap();
        assert_eq!(value["data"], json!([]));
        assert_eq!(value["layout"]["title"]["text"], "Nothing here");
        assert_eq!(value["layout"]["font"]["family"], FONT_FAMILY);
        assert_eq!(value["layout"]["plot_bgcolor"], "white");
        assert!(value["layout"].get("xaxis").is_none());
    }

    #[test]
    fn traces_are_tagged_with_plotly_type() {
        let trace = Trace::Bar(Bar {
            x: vec![json!("nurse")],
            y: vec![json!(3)],
            text: vec![json!(3)],
            textposition: "auto",
            marker: Marker {
                color: Some("#1188C9".into()),
                ..Marker::default()
            },
        });
        let value = serde_json::to_value(trace).unwrap();
        assert_eq!(value["type"], "bar");
        assert_eq!(value["marker"]["color"], "#1188C9");
        assert!(value["marker"].get("size").is_none());
    }

    #[test]
    fn axis_type_is_renamed() {
        let axis = Axis {
            axis_type: Some("category"),
            ..Axis::titled("Month")
        };
        let value = serde_json::to_value(axis).unwrap();
        assert_eq!(value["type"], "category");
        assert_eq!(value["title"]["text"], "Month");
    }
}
