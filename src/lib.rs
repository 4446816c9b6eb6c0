pub mod chart;
pub mod error;
pub mod fixture;
pub mod magnitude;
pub mod results;
pub mod telemetry;

pub use chart::{render_all, render_chart, ChartConfig};
pub use error::{Error, Result};
pub use fixture::{generate_all, generate_family, Family, Fixture, GeneratorConfig, ScaleFactor};
pub use magnitude::{format_bytes, format_time, UnitFamily};
pub use results::{ChartSpec, Metric, MetricSeries, ResultsTable};
pub use telemetry::setup_logging;
