//! Query result domain models.
//!
//! The backend answers a chart query with a chart-options object
//! (`{title: {text}, series: [{data: [{name, y}]}]}`) and a text query with a
//! plain string. Both arrive in the `data` member of the `/query` response.

use serde::{Deserialize, Serialize};

/// One labelled value of a query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub label: String,
    pub value: f64,
}

impl DataPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// A chart-shaped query result: an optional title and ordered labelled values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "ChartPayload", into = "ChartPayload")]
pub struct QueryResult {
    pub title: Option<String>,
    pub points: Vec<DataPoint>,
}

impl QueryResult {
    pub fn new(title: Option<String>, points: Vec<DataPoint>) -> Self {
        Self { title, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Renders the result as plain text: the title, then one `label: value` line per point.
    pub fn summary(&self) -> String {
        let mut lines = Vec::with_capacity(self.points.len() + 1);
        if let Some(title) = &self.title {
            lines.push(title.clone());
        }
        for point in &self.points {
            lines.push(format!("{}: {}", point.label, format_value(point.value)));
        }
        lines.join("\n")
    }
}

/// Formats a count without a trailing `.0` when it is whole.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// The `data` member of a `/query` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryData {
    Chart(QueryResult),
    Text(String),
}

impl QueryData {
    pub fn as_chart(&self) -> Option<&QueryResult> {
        match self {
            Self::Chart(result) => Some(result),
            Self::Text(_) => None,
        }
    }

    /// Text view of the data; chart results are summarised line by line.
    pub fn to_text(&self) -> String {
        match self {
            Self::Chart(result) => result.summary(),
            Self::Text(text) => text.clone(),
        }
    }
}

// Wire shape of a chart result.

#[derive(Debug, Default, Serialize, Deserialize)]
struct ChartPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<TitlePayload>,
    #[serde(default)]
    series: Vec<SeriesPayload>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct TitlePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SeriesPayload {
    #[serde(default)]
    data: Vec<PointPayload>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PointPayload {
    name: String,
    y: f64,
}

impl From<ChartPayload> for QueryResult {
    fn from(payload: ChartPayload) -> Self {
        // Only the first series carries data; the backend never sends more than one.
        let points = payload
            .series
            .into_iter()
            .next()
            .map(|series| {
                series
                    .data
                    .into_iter()
                    .map(|point| DataPoint::new(point.name, point.y))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            title: payload.title.and_then(|title| title.text),
            points,
        }
    }
}

impl From<QueryResult> for ChartPayload {
    fn from(result: QueryResult) -> Self {
        Self {
            title: result.title.map(|text| TitlePayload { text: Some(text) }),
            series: vec![SeriesPayload {
                data: result
                    .points
                    .into_iter()
                    .map(|point| PointPayload {
                        name: point.label,
                        y: point.value,
                    })
                    .collect(),
            }],
        }
    }
}
