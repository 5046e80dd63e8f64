//! Chart adapter.
//!
//! Maps a query result into the description a renderer consumes. The mapping
//! is pure: the same result and kind always produce the same `ChartSpec`.

use serde::Serialize;
use serde_json::{Value, json};

use super::ChartKind;
use crate::query::QueryResult;

/// Series name used for pie charts.
pub const PIE_SERIES_NAME: &str = "Crime Type";
/// Series name and value-axis title used for bar and line charts.
pub const COUNT_SERIES_NAME: &str = "Crime Count";

/// A named pie slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub name: String,
    pub y: f64,
}

/// Points of the single series, shaped by chart kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SeriesData {
    Slices(Vec<PieSlice>),
    Values(Vec<f64>),
}

impl SeriesData {
    pub fn len(&self) -> usize {
        match self {
            Self::Slices(slices) => slices.len(),
            Self::Values(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    pub data: SeriesData,
}

/// Renderer-ready chart description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: Option<String>,
    /// Category axis labels; `None` for pie charts.
    pub categories: Option<Vec<String>>,
    /// Value axis title; `None` for pie charts.
    pub value_axis_title: Option<String>,
    pub series: ChartSeries,
}

impl ChartSpec {
    /// Highcharts-style options object equivalent to this spec.
    pub fn to_options(&self) -> Value {
        let mut options = json!({
            "chart": { "type": self.kind.as_ref() },
            "title": { "text": self.title },
            "series": [self.series],
        });

        if let Some(categories) = &self.categories {
            options["xAxis"] = json!({ "categories": categories });
        }
        if let Some(axis_title) = &self.value_axis_title {
            options["yAxis"] = json!({ "title": { "text": axis_title } });
        }

        options
    }
}

/// Stateless mapping from query results to chart specs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChartAdapter;

impl ChartAdapter {
    /// Returns `None` ("no chart") when there is no result.
    pub fn adapt(result: Option<&QueryResult>, kind: ChartKind) -> Option<ChartSpec> {
        let result = result?;

        let spec = match kind {
            ChartKind::Pie => ChartSpec {
                kind,
                title: result.title.clone(),
                categories: None,
                value_axis_title: None,
                series: ChartSeries {
                    name: PIE_SERIES_NAME.to_string(),
                    data: SeriesData::Slices(
                        result
                            .points
                            .iter()
                            .map(|point| PieSlice {
                                name: point.label.clone(),
                                y: point.value,
                            })
                            .collect(),
                    ),
                },
            },
            ChartKind::Bar | ChartKind::Line => ChartSpec {
                kind,
                title: result.title.clone(),
                categories: Some(result.points.iter().map(|p| p.label.clone()).collect()),
                value_axis_title: Some(COUNT_SERIES_NAME.to_string()),
                series: ChartSeries {
                    name: COUNT_SERIES_NAME.to_string(),
                    data: SeriesData::Values(result.points.iter().map(|p| p.value).collect()),
                },
            },
        };

        Some(spec)
    }
}
