//! Errors exposed to users of the crate

use crate::fixture::Family;
use plotters::drawing::DrawingAreaErrorKind;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Scale factor outside the range a family can generate
    #[error("{family} fixture: invalid scale factor {scale}: {reason}")]
    InvalidScale {
        family: Family,
        scale: i64,
        reason: &'static str,
    },

    /// Creating or writing a fixture file failed
    #[error("{family} fixture at scale {scale}: cannot write {}", path.display())]
    FixtureIo {
        family: Family,
        scale: u64,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A series does not have one sample per category
    #[error("chart {chart}: series {series:?} has {actual} samples for {expected} categories")]
    MisalignedSeries {
        chart: String,
        series: String,
        expected: usize,
        actual: usize,
    },

    /// Chart description that cannot be drawn (no categories, no series, bad sample)
    #[error("chart {chart}: {message}")]
    InvalidChart { chart: String, message: String },

    /// Creating the chart output directory failed
    #[error("chart {chart}: cannot create {}", path.display())]
    ChartIo {
        chart: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The drawing backend failed while rendering or saving
    #[error("chart {chart}: rendering failed")]
    Render {
        chart: String,
        #[source]
        source: DrawingAreaErrorKind<std::io::Error>,
    },

    #[error("cannot read results table {}", path.display())]
    ResultsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed results table {}", path.display())]
    ResultsFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub(crate) fn invalid_scale(family: Family, scale: i64, reason: &'static str) -> Error {
    Error::InvalidScale {
        family,
        scale,
        reason,
    }
}

pub(crate) fn invalid_chart(chart: impl Into<String>, message: impl Into<String>) -> Error {
    Error::InvalidChart {
        chart: chart.into(),
        message: message.into(),
    }
}
