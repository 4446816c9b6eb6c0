use crate::error::{invalid_chart, Error, Result};
use crate::results::{parse_hex_color, ChartSpec, LegendPosition, ResultsTable};
use plotters::coord::ranged1d::{Ranged, ValueFormatter};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// Font sizes, in pixels at the default 1000x500 canvas
const TITLE_FONT_SIZE: u32 = 32;
const AXIS_LABEL_FONT_SIZE: u32 = 26;
const TICK_LABEL_FONT_SIZE: u32 = 20;
const LEGEND_FONT_SIZE: u32 = 20;
const DATA_LABEL_FONT_SIZE: u32 = 16;

// Layout tuning
const DEFAULT_MARGIN_BOTTOM: u32 = 55;
const DEFAULT_X_LABEL_AREA_SIZE: u32 = 60;
// Wide enough for "1000.0 milliseconds"
const Y_LABEL_AREA_SIZE: u32 = 210;

/// Share of a category slot covered by its bar group
const GROUP_WIDTH: f64 = 0.8;
/// Gap trimmed from each side of a bar
const BAR_GAP: f64 = 0.02;

/// Default series colours, in series order
const PALETTE: &[RGBColor] = &[
    RGBColor(31, 119, 180), // Blue
    RGBColor(255, 127, 14), // Orange
    RGBColor(44, 160, 44),  // Green
    RGBColor(214, 39, 40),  // Red
];

type DrawResult<T> = std::result::Result<T, DrawingAreaErrorKind<std::io::Error>>;

/// Where and how large charts are written
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub output_dir: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("figures"),
            width: 1000,
            height: 500,
        }
    }
}

/// Horizontal extent of one bar, in category coordinates (category `k` is centred on `k`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub category: usize,
    pub series: usize,
    pub x_left: f64,
    pub x_right: f64,
}

impl Bar {
    pub fn x_mid(&self) -> f64 {
        (self.x_left + self.x_right) / 2.0
    }
}

/// Lay out one bar per (category, series), side by side within each group.
///
/// A single series is centred on its category.
pub fn bar_layout(num_categories: usize, num_series: usize) -> Vec<Bar> {
    if num_series == 0 {
        return Vec::new();
    }

    let bar_width = GROUP_WIDTH / num_series as f64;
    let gap = BAR_GAP.min(bar_width / 4.0);
    let mut bars = Vec::with_capacity(num_categories * num_series);

    for category in 0..num_categories {
        let x_center = category as f64;
        for series in 0..num_series {
            let x_offset = (series as f64 - (num_series as f64 - 1.0) / 2.0) * bar_width;
            bars.push(Bar {
                category,
                series,
                x_left: x_center + x_offset - bar_width / 2.0 + gap,
                x_right: x_center + x_offset + bar_width / 2.0 - gap,
            });
        }
    }

    bars
}

fn series_color(spec: &ChartSpec, idx: usize) -> RGBColor {
    spec.series[idx]
        .color
        .as_deref()
        .and_then(parse_hex_color)
        .map(|(r, g, b)| RGBColor(r, g, b))
        .unwrap_or(PALETTE[idx % PALETTE.len()])
}

fn label_position(legend: LegendPosition) -> SeriesLabelPosition {
    match legend {
        LegendPosition::UpperLeft => SeriesLabelPosition::UpperLeft,
        LegendPosition::UpperRight => SeriesLabelPosition::UpperRight,
        LegendPosition::LowerLeft => SeriesLabelPosition::LowerLeft,
        LegendPosition::LowerRight => SeriesLabelPosition::LowerRight,
    }
}

/// y range of a log-scale chart: one octave of headroom on both sides of the data
fn log_bounds(spec: &ChartSpec) -> (f64, f64) {
    spec.measured_range()
        .map(|(lo, hi)| (lo / 2.0, hi * 2.0))
        .unwrap_or((1.0, 10.0))
}

fn linear_top(spec: &ChartSpec) -> f64 {
    spec.measured_range()
        .map(|(_, hi)| hi * 1.25)
        .unwrap_or(1.0)
}

/// Render one grouped bar chart to `<output_dir>/<family>_<metric>.svg`.
///
/// The series are validated against the categories before anything is drawn.
pub fn render_chart(spec: &ChartSpec, config: &ChartConfig) -> Result<PathBuf> {
    spec.validate()?;
    let chart = spec.file_stem();

    std::fs::create_dir_all(&config.output_dir).map_err(|source| Error::ChartIo {
        chart: chart.clone(),
        path: config.output_dir.clone(),
        source,
    })?;

    let path = config.output_dir.join(format!("{chart}.svg"));
    draw(spec, &path, (config.width, config.height)).map_err(|source| Error::Render {
        chart: chart.clone(),
        source,
    })?;

    info!(chart = %chart, path = %path.display(), "generated chart");
    Ok(path)
}

/// Render every chart of `table`, or only those named in `only`.
pub fn render_all(
    table: &ResultsTable,
    config: &ChartConfig,
    only: &[String],
) -> Result<Vec<PathBuf>> {
    if let Some(unknown) = only.iter().find(|name| table.chart(name).is_none()) {
        return Err(invalid_chart(unknown.as_str(), "not in the results table"));
    }

    table
        .charts
        .iter()
        .filter(|spec| only.is_empty() || only.contains(&spec.file_stem()))
        .map(|spec| render_chart(spec, config))
        .collect()
}

fn draw(spec: &ChartSpec, path: &Path, size: (u32, u32)) -> DrawResult<()> {
    // No background fill: the SVG stays transparent for inclusion in documents.
    let root = SVGBackend::new(path, size).into_drawing_area();

    let bars = bar_layout(spec.categories.len(), spec.series.len());
    let num_categories = spec.categories.len() as f64;
    let x_range = -0.5..(num_categories - 0.5);

    let mut builder = ChartBuilder::on(&root);
    builder
        .margin(20)
        .margin_bottom(DEFAULT_MARGIN_BOTTOM)
        .x_label_area_size(DEFAULT_X_LABEL_AREA_SIZE)
        .y_label_area_size(Y_LABEL_AREA_SIZE);
    if let Some(title) = &spec.title {
        builder.caption(title, ("sans-serif", TITLE_FONT_SIZE));
    }

    if spec.log_scale {
        let (bottom, top) = log_bounds(spec);
        debug!(chart = %spec.file_stem(), bottom, top, "log-scale y range");
        let mut chart = builder.build_cartesian_2d(x_range, (bottom..top).log_scale())?;
        draw_bars(&mut chart, spec, &bars, bottom, top)?;
    } else {
        let top = linear_top(spec);
        debug!(chart = %spec.file_stem(), top, "linear y range");
        let mut chart = builder.build_cartesian_2d(x_range, 0.0..top)?;
        draw_bars(&mut chart, spec, &bars, 0.0, top)?;
    }

    root.present()?;
    Ok(())
}

fn draw_bars<'a, Y>(
    chart: &mut ChartContext<'a, SVGBackend<'a>, Cartesian2d<RangedCoordf64, Y>>,
    spec: &ChartSpec,
    bars: &[Bar],
    bottom: f64,
    top: f64,
) -> DrawResult<()>
where
    Y: Ranged<ValueType = f64> + ValueFormatter<f64>,
{
    let unit = spec.unit();
    let categories = &spec.categories;
    let x_formatter = |x: &f64| {
        let idx = x.round();
        if idx >= 0.0 && (idx as usize) < categories.len() && (x - idx).abs() < 0.3 {
            categories[idx as usize].clone()
        } else {
            String::new()
        }
    };
    let y_formatter = |y: &f64| unit.format(*y);

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(categories.len())
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&y_formatter)
        .x_desc(spec.x_label.as_str())
        .y_desc(spec.y_label.as_str())
        .label_style(("sans-serif", TICK_LABEL_FONT_SIZE))
        .axis_desc_style(("sans-serif", AXIS_LABEL_FONT_SIZE))
        .draw()?;

    for bar in bars {
        let value = spec.series[bar.series].values[bar.category];
        // Unmeasured samples keep their slot but draw nothing
        if value <= 0.0 {
            continue;
        }

        let color = series_color(spec, bar.series);
        chart.draw_series(std::iter::once(Rectangle::new(
            [(bar.x_left, bottom), (bar.x_right, value)],
            color.filled(),
        )))?;

        if spec.data_labels {
            let label_y = if spec.log_scale {
                value * 1.15
            } else {
                value + top * 0.02
            };
            chart.draw_series(std::iter::once(Text::new(
                unit.format(value),
                (bar.x_mid(), label_y),
                ("sans-serif", DATA_LABEL_FONT_SIZE)
                    .into_font()
                    .color(&BLACK)
                    .pos(Pos::new(HPos::Center, VPos::Bottom)),
            )))?;
        }
    }

    // Legend entries are anchored on zero-radius markers
    for (idx, series) in spec.series.iter().enumerate() {
        let color = series_color(spec, idx);
        chart
            .draw_series(std::iter::once(Circle::new(
                (categories.len() as f64 - 1.0, top),
                0,
                color.filled(),
            )))?
            .label(series.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(label_position(spec.legend))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", LEGEND_FONT_SIZE))
        .draw()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::Family;
    use crate::results::{Metric, MetricSeries};
    use tempfile::TempDir;

    fn two_series_spec() -> ChartSpec {
        ChartSpec {
            family: Family::Derivation,
            metric: Metric::Memory,
            title: Some("Derivation: peak memory".into()),
            x_label: "Domain Size".into(),
            y_label: "Memory".into(),
            log_scale: true,
            legend: LegendPosition::UpperLeft,
            data_labels: true,
            categories: ["1", "10", "100", "1000", "10000"].map(String::from).to_vec(),
            series: vec![
                MetricSeries {
                    label: "Reference interpreter".into(),
                    values: vec![15944.0, 15944.0, 16176.0, 44616.0, 0.0],
                    color: None,
                },
                MetricSeries {
                    label: "Our work".into(),
                    values: vec![76600.0, 613130.0, 5819520.0, 57978168.0, 586865528.0],
                    color: Some("#ff7f0e".into()),
                },
            ],
        }
    }

    #[test]
    fn test_two_series_layout_has_ten_disjoint_bars() {
        let bars = bar_layout(5, 2);
        assert_eq!(bars.len(), 10);

        let mut sorted = bars.clone();
        sorted.sort_by(|a, b| a.x_left.total_cmp(&b.x_left));
        for pair in sorted.windows(2) {
            assert!(pair[0].x_left < pair[0].x_right);
            assert!(
                pair[0].x_right < pair[1].x_left,
                "{:?} overlaps {:?}",
                pair[0],
                pair[1]
            );
        }

        // Every bar stays within its own category slot
        for bar in &bars {
            assert!(bar.x_left > bar.category as f64 - 0.5);
            assert!(bar.x_right < bar.category as f64 + 0.5);
        }
    }

    #[test]
    fn test_single_series_is_centred() {
        let bars = bar_layout(5, 1);
        assert_eq!(bars.len(), 5);
        for bar in &bars {
            assert!((bar.x_mid() - bar.category as f64).abs() < 1e-9);
        }
    }

    #[test]
    fn test_two_series_straddle_the_category() {
        let bars = bar_layout(1, 2);
        assert!(bars[0].x_mid() < 0.0);
        assert!(bars[1].x_mid() > 0.0);
        assert!((bars[0].x_mid() + bars[1].x_mid()).abs() < 1e-9);
    }

    #[test]
    fn test_many_series_keep_positive_width() {
        for bar in bar_layout(3, 40) {
            assert!(bar.x_left < bar.x_right);
        }
    }

    #[test]
    fn test_no_series_no_bars() {
        assert!(bar_layout(5, 0).is_empty());
    }

    #[test]
    fn test_series_color() {
        let spec = two_series_spec();
        assert_eq!(series_color(&spec, 0), PALETTE[0]);
        assert_eq!(series_color(&spec, 1), RGBColor(255, 127, 14));
    }

    #[test]
    fn test_bounds_ignore_sentinels() {
        let spec = two_series_spec();
        assert_eq!(log_bounds(&spec), (15944.0 / 2.0, 586865528.0 * 2.0));
        assert_eq!(linear_top(&spec), 586865528.0 * 1.25);
    }

    #[test]
    fn test_misaligned_series_rejected_before_drawing() {
        let dir = TempDir::new().unwrap();
        let config = ChartConfig {
            output_dir: dir.path().join("figures"),
            ..ChartConfig::default()
        };
        let mut spec = two_series_spec();
        spec.series[1].values.pop();

        let err = render_chart(&spec, &config).unwrap_err();
        assert!(matches!(err, Error::MisalignedSeries { .. }));
        assert!(err.to_string().contains("derivation_memory"));
        assert!(!config.output_dir.exists());
    }

    #[test]
    fn test_render_all_rejects_unknown_chart() {
        let table = ResultsTable {
            charts: vec![two_series_spec()],
        };
        let err = render_all(
            &table,
            &ChartConfig::default(),
            &["derivation_runtime".to_string()],
        )
        .unwrap_err();
        assert!(err.to_string().contains("derivation_runtime"));
    }

    #[test]
    #[ignore = "needs system fonts for text layout"]
    fn test_render_svg() {
        let dir = TempDir::new().unwrap();
        let config = ChartConfig {
            output_dir: dir.path().to_path_buf(),
            ..ChartConfig::default()
        };

        let path = render_chart(&two_series_spec(), &config).unwrap();
        assert_eq!(path, dir.path().join("derivation_memory.svg"));

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Our work"));
        assert!(svg.contains("Reference interpreter"));

        // Same input, same picture
        render_chart(&two_series_spec(), &config).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), svg);
    }
}
