//! Rendering-ready chart structures
//!
//! These serialize directly into the configuration object Chart.js expects
//! (`{ type, data: { labels, datasets }, options }`).

use serde::Serialize;

/// Chart.js chart type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Scatter,
}

/// One plotted value: a plain number or an `(x, y)` point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DataPoint {
    Value(Option<f64>),
    Point { x: f64, y: f64 },
}

/// Either a single color or one color per data point
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Single(String),
    PerPoint(Vec<String>),
}

/// One named series
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<DataPoint>,
    pub background_color: ColorSpec,
    pub border_color: ColorSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_dash: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_line: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
}

impl Dataset {
    pub fn new(label: impl Into<String>, data: Vec<DataPoint>, color: ColorSpec) -> Self {
        Self {
            label: label.into(),
            data,
            background_color: color.clone(),
            border_color: color,
            border_width: None,
            border_dash: None,
            fill: None,
            show_line: None,
            point_radius: None,
            tension: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleOptions {
    pub display: bool,
    pub text: String,
}

impl TitleOptions {
    pub fn from_text(text: Option<&str>) -> Option<Self> {
        text.map(|t| Self {
            display: true,
            text: t.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendPosition {
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendOptions {
    pub display: bool,
    pub position: LegendPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plugins {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<TitleOptions>,
    pub legend: LegendOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Axis {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<TitleOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_at_zero: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Axis {
    pub fn titled(title: Option<&str>) -> Self {
        Self {
            kind: None,
            title: TitleOptions::from_text(title),
            begin_at_zero: None,
            min: None,
            max: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scales {
    pub x: Axis,
    pub y: Axis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub responsive: bool,
    pub maintain_aspect_ratio: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_axis: Option<String>,
    pub plugins: Plugins,
    pub scales: Scales,
}

/// Complete chart definition handed to a render surface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub data: ChartData,
    pub options: ChartOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_data_points_serialize_as_chartjs_expects() {
        let points = vec![
            DataPoint::Value(Some(3.0)),
            DataPoint::Value(None),
            DataPoint::Point { x: 0.1, y: 0.9 },
        ];
        assert_eq!(
            serde_json::to_value(&points).unwrap(),
            json!([3.0, null, { "x": 0.1, "y": 0.9 }])
        );
    }

    #[test]
    fn test_dataset_uses_camel_case_and_skips_unset() {
        let dataset = Dataset::new("Wins", vec![], ColorSpec::Single("#fff".to_string()));
        let value = serde_json::to_value(&dataset).unwrap();
        assert_eq!(value["backgroundColor"], json!("#fff"));
        assert!(value.get("borderDash").is_none());
    }
}
