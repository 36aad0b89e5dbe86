//! Brand colours and trace styling.

pub const FONT_FAMILY: &str = "Source Sans Pro";

pub const PRIMARY: &str = "#1188C9";
pub const TITLE_COLOR: &str = "#0253a5";
pub const MEDIAN_COLOR: &str = "red";
pub const UPPER_BAND_COLOR: &str = "orange";

/// Pie slices: the four base colours, then the last two repeated for
/// slice five and "Others".
pub const PIE: [&str; 6] = ["#1188C9", "#0253a5", "#5f4987", "#dcb695", "#dcb695", "#1188C9"];

/// Monthly trend lines: base colours followed by lighter, darker and
/// complementary variations.
pub const TREND: [&str; 52] = [
    "#1188C9", "#0253a5", "#5f4987", "#dcb695",
    "#4BA8E8", "#3B8FD8", "#7B6AA5", "#F2D6B8",
    "#0D6B9F", "#01387A", "#3E2F5A", "#B8966F",
    "#2D9FD4", "#1B6FBF", "#6B5A97", "#E6C9A5",
    "#1A9BC9", "#0369C9", "#6F5A9F", "#D4B687",
    "#3CA8D9", "#045EA9", "#8068B0", "#E8D1A3",
    "#28B5E5", "#0257A3", "#7560A8", "#DFC28F",
    "#5BB8E0", "#0840A0", "#8A70BA", "#F0D99F",
    "#47A8D1", "#063399", "#775FA5", "#E3CC9B",
    "#1199D0", "#0256A8", "#625A9A", "#D9C091",
    "#2FA5D6", "#0452A6", "#6D5CA2", "#E5CE96",
    "#1CA0CE", "#0248A1", "#6858A0", "#DDC595",
    "#39ABDC", "#0559AB", "#735CA6", "#E7D09A",
];

/// Nurse-wise trend lines.
pub const NURSE: [&str; 32] = [
    "#1188C9", "#0253a5", "#5f4987", "#dcb695",
    "#4BA8E8", "#3B8FD8", "#7B6AA5", "#F2D6B8",
    "#0D6B9F", "#01387A", "#3E2F5A", "#B8966F",
    "#2D9FD4", "#1B6FBF", "#6B5A97", "#E6C9A5",
    "#1A9BC9", "#0369C9", "#6F5A9F", "#D4B687",
    "#3CA8D9", "#045EA9", "#8068B0", "#E8D1A3",
    "#28B5E5", "#0257A3", "#7560A8", "#DFC28F",
    "#5BB8E0", "#0840A0", "#8A70BA", "#F0D99F",
];

/// `None` is a solid line.
pub const DASHES: [Option<&str>; 4] = [None, Some("dash"), Some("dot"), Some("dashdot")];

pub const MARKERS: [&str; 10] = [
    "circle",
    "square",
    "diamond",
    "triangle-up",
    "triangle-down",
    "pentagon",
    "hexagon",
    "star",
    "cross",
    "x",
];

/// Colour, dash and marker for the `index`-th trend series. Colour cycles
/// first, then dash style, then marker, so every combination is distinct.
pub fn trend_style(index: usize) -> (&'static str, Option<&'static str>, &'static str) {
    let colour = TREND[index % TREND.len()];
    let dash = DASHES[(index / TREND.len()) % DASHES.len()];
    let marker = MARKERS[(index / (TREND.len() * DASHES.len())) % MARKERS.len()];
    (colour, dash, marker)
}

pub fn nurse_colour(index: usize) -> &'static str {
    NURSE[index % NURSE.len()]
}

pub fn pie_colours(slices: usize) -> Vec<String> {
    PIE.iter().take(slices).map(|c| c.to_string()).collect()
}
