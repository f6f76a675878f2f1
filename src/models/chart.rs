// file: src/models/chart.rs
// description: renderer independent bar chart description
// reference: internal data structures

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
    /// Text printed next to the bar.
    pub text: String,
    /// `#rrggbb`
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    #[serde(default)]
    pub secondary_axis: bool,
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    pub fn max_value(&self) -> f64 {
        self.points.iter().map(|p| p.value).fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_axis_title: Option<String>,
    pub series: Vec<ChartSeries>,
}

impl ChartSpec {
    pub fn bar_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }
}

/// `#rrggbb` to an RGB triple.
pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#1e88e5"), Some((0x1e, 0x88, 0xe5)));
        assert_eq!(parse_hex_color("43a047"), Some((0x43, 0xa0, 0x47)));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }
}
