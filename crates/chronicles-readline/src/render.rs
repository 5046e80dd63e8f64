//! Terminal chart renderer.
//!
//! Draws a `ChartSpec` with block characters: pie charts as share bars with
//! percentages, bar charts as horizontal bars, line charts as a sparkline
//! followed by the values. The output is plain text; colouring is left to
//! the caller.

use chronicles_core::chart::SeriesData;
use chronicles_core::query::format_value;
use chronicles_core::{ChartKind, ChartRenderer, ChartSpec, Result};

const BAR: char = '█';
const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const DEFAULT_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy)]
pub struct TerminalChartRenderer {
    width: usize,
}

impl Default for TerminalChartRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH)
    }
}

impl TerminalChartRenderer {
    /// `width` is the length of the longest bar.
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
        }
    }

    fn bar(&self, value: f64, max: f64) -> String {
        let cells = if max > 0.0 && value > 0.0 {
            ((value / max) * self.width as f64).round().max(1.0) as usize
        } else {
            0
        };
        BAR.to_string().repeat(cells)
    }

    fn pie(&self, rows: &[(String, f64)]) -> Vec<String> {
        let total: f64 = rows.iter().map(|(_, y)| y.max(0.0)).sum();
        let label_width = label_width(rows);

        rows.iter()
            .map(|(name, y)| {
                let share = if total > 0.0 { y.max(0.0) / total } else { 0.0 };
                format!(
                    "{name:<label_width$}  {:>5.1}%  {}",
                    share * 100.0,
                    self.bar(share, 1.0)
                )
            })
            .collect()
    }

    fn bars(&self, rows: &[(String, f64)]) -> Vec<String> {
        let max = rows.iter().map(|(_, v)| *v).fold(0.0, f64::max);
        let label_width = label_width(rows);

        rows.iter()
            .map(|(label, value)| {
                format!(
                    "{label:<label_width$}  {} {}",
                    self.bar(*value, max),
                    format_value(*value)
                )
            })
            .collect()
    }

    fn line(&self, rows: &[(String, f64)]) -> Vec<String> {
        let min = rows.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
        let max = rows.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max);
        let span = max - min;

        let spark: String = rows
            .iter()
            .map(|(_, value)| {
                if span > 0.0 {
                    let level = ((value - min) / span * (SPARKS.len() - 1) as f64).round();
                    SPARKS[level as usize]
                } else {
                    SPARKS[SPARKS.len() / 2]
                }
            })
            .collect();

        let label_width = label_width(rows);
        let mut lines = vec![spark];
        lines.extend(
            rows.iter()
                .map(|(label, value)| format!("{label:<label_width$}  {}", format_value(*value))),
        );
        lines
    }
}

impl ChartRenderer for TerminalChartRenderer {
    fn render(&self, spec: &ChartSpec) -> Result<String> {
        let rows = rows(spec);

        let mut lines = Vec::new();
        if let Some(title) = &spec.title {
            lines.push(title.clone());
        }

        if rows.is_empty() {
            lines.push("(no data)".to_string());
        } else {
            lines.extend(match spec.kind {
                ChartKind::Pie => self.pie(&rows),
                ChartKind::Bar => self.bars(&rows),
                ChartKind::Line => self.line(&rows),
            });
        }

        if let Some(axis) = &spec.value_axis_title {
            lines.push(format!("({axis})"));
        }

        Ok(lines.join("\n"))
    }
}

/// Labels paired with values, whichever shape the series has.
fn rows(spec: &ChartSpec) -> Vec<(String, f64)> {
    match &spec.series.data {
        SeriesData::Slices(slices) => slices.iter().map(|s| (s.name.clone(), s.y)).collect(),
        SeriesData::Values(values) => {
            let categories = spec.categories.as_deref().unwrap_or_default();
            values
                .iter()
                .enumerate()
                .map(|(i, value)| {
                    let label = categories.get(i).cloned().unwrap_or_else(|| format!("#{}", i + 1));
                    (label, *value)
                })
                .collect()
        }
    }
}

fn label_width(rows: &[(String, f64)]) -> usize {
    rows.iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0)
}
