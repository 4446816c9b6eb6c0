//! Benchmark results as loaded from disk.
//!
//! Measurements are produced by running the interpreters on the generated
//! fixtures elsewhere; this module only describes and validates them.

use crate::error::{invalid_chart, Error, Result};
use crate::fixture::Family;
use crate::magnitude::UnitFamily;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::warn;

/// What was measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Wall-clock execution time, in microseconds
    Execution,
    /// Peak memory, in bytes
    Memory,
}

impl Metric {
    pub fn unit(self) -> UnitFamily {
        match self {
            Metric::Execution => UnitFamily::Time,
            Metric::Memory => UnitFamily::Bytes,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Metric::Execution => "execution",
            Metric::Memory => "memory",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Corner of the plot holding the legend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LegendPosition {
    #[default]
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
}

/// One implementation's samples, one per category. `0` marks "not measured".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub label: String,
    pub values: Vec<f64>,
    /// `#rrggbb`; a palette colour is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl MetricSeries {
    /// Whether the sample at `idx` carries a measurement
    pub fn is_measured(&self, idx: usize) -> bool {
        self.values.get(idx).is_some_and(|&v| v > 0.0)
    }
}

fn default_log_scale() -> bool {
    true
}

/// Everything needed to draw one comparison chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub family: Family,
    pub metric: Metric,
    pub title: Option<String>,
    pub x_label: String,
    pub y_label: String,
    #[serde(default = "default_log_scale")]
    pub log_scale: bool,
    #[serde(default)]
    pub legend: LegendPosition,
    /// Print the formatted value above each bar
    #[serde(default)]
    pub data_labels: bool,
    /// x-axis labels, in the order shared by every series
    pub categories: Vec<String>,
    pub series: Vec<MetricSeries>,
}

impl ChartSpec {
    /// `<family>_<metric>`, used as chart name and output file stem
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.family.name(), self.metric.name())
    }

    pub fn unit(&self) -> UnitFamily {
        self.metric.unit()
    }

    /// Reject charts whose series cannot be mapped onto the categories.
    pub fn validate(&self) -> Result<()> {
        let chart = self.file_stem();
        if self.categories.is_empty() {
            return Err(invalid_chart(chart, "no categories"));
        }
        if self.series.is_empty() {
            return Err(invalid_chart(chart, "no series"));
        }

        for series in &self.series {
            if series.values.len() != self.categories.len() {
                return Err(Error::MisalignedSeries {
                    chart,
                    series: series.label.clone(),
                    expected: self.categories.len(),
                    actual: series.values.len(),
                });
            }
            if let Some(bad) = series.values.iter().find(|v| !v.is_finite() || **v < 0.0) {
                return Err(invalid_chart(
                    chart,
                    format!("series {:?} has invalid sample {bad}", series.label),
                ));
            }
            if let Some(color) = &series.color {
                if parse_hex_color(color).is_none() {
                    return Err(invalid_chart(
                        chart,
                        format!("series {:?} has invalid colour {color:?}", series.label),
                    ));
                }
            }
        }

        for series in &self.series {
            for (idx, category) in self.categories.iter().enumerate() {
                if !series.is_measured(idx) {
                    warn!(chart = %chart, series = %series.label, %category, "no measurement");
                }
            }
        }
        Ok(())
    }

    /// Smallest and largest measured sample, if any sample was measured
    pub fn measured_range(&self) -> Option<(f64, f64)> {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .filter(|&v| v > 0.0)
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Parse `#rrggbb` into its components
pub fn parse_hex_color(s: &str) -> Option<(u8, u8, u8)> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// A set of charts, typically one execution and one memory chart per family
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultsTable {
    pub charts: Vec<ChartSpec>,
}

impl ResultsTable {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| Error::ResultsIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json).map_err(|source| Error::ResultsFormat {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Look a chart up by its `<family>_<metric>` name
    pub fn chart(&self, name: &str) -> Option<&ChartSpec> {
        self.charts.iter().find(|c| c.file_stem() == name)
    }
}
