//! Chart Renderer Module
//! Rasterizes chart specifications into in-memory bitmaps.
//!
//! Presentation is non-interactive: each chart is drawn into an RGB pixel
//! buffer and dropped after rendering. Nothing is written to disk.

use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::debug;

use crate::charts::spec::{ChartError, ChartSpec, HeatmapGrid, LabeledValue, PieSlice, SeriesData};
use crate::stats::HistogramBin;

/// Canvas size of every rendered chart.
pub const CHART_WIDTH: u32 = 1024;
pub const CHART_HEIGHT: u32 = 720;

/// Series color palette.
const PALETTE: [RGBColor; 10] = [
    RGBColor(231, 76, 60),   // Red
    RGBColor(46, 204, 113),  // Green
    RGBColor(155, 89, 182),  // Purple
    RGBColor(243, 156, 18),  // Orange
    RGBColor(26, 188, 156),  // Teal
    RGBColor(233, 30, 99),   // Pink
    RGBColor(0, 188, 212),   // Cyan
    RGBColor(255, 87, 34),   // Deep Orange
    RGBColor(121, 85, 72),   // Brown
    RGBColor(96, 125, 139),  // Blue Grey
];

type Canvas<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Render a chart spec into a fresh in-memory bitmap.
pub fn render(spec: &ChartSpec) -> Result<(), ChartError> {
    let mut buffer = vec![0u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];
    draw_into(spec, &mut buffer)?;
    debug!("Rendered chart: {}", spec.title);
    Ok(())
}

fn draw_into(spec: &ChartSpec, buffer: &mut [u8]) -> Result<(), ChartError> {
    let root = BitMapBackend::with_buffer(buffer, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(to_render_error)?;

    match &spec.series {
        SeriesData::Bars(points) => draw_bars(&root, spec, points),
        SeriesData::Histogram(bins) => draw_histogram(&root, spec, bins),
        SeriesData::Line(points) => draw_line(&root, spec, points),
        SeriesData::Pie(slices) => draw_pie(&root, spec, slices),
        SeriesData::Heatmap(grid) => draw_heatmap(&root, spec, grid),
    }?;

    root.present().map_err(to_render_error)
}

fn to_render_error<E: std::fmt::Display>(err: E) -> ChartError {
    ChartError::Render(err.to_string())
}

/// An empty series still renders as a titled blank canvas.
fn draw_empty(root: &Canvas<'_>, spec: &ChartSpec) -> Result<(), ChartError> {
    root.titled(&spec.title, ("sans-serif", 28))
        .map(|_| ())
        .map_err(to_render_error)
}

fn draw_bars(root: &Canvas<'_>, spec: &ChartSpec, points: &[LabeledValue]) -> Result<(), ChartError> {
    if points.is_empty() {
        return draw_empty(root, spec);
    }

    let max = points.iter().fold(0.0f64, |m, p| m.max(p.value));
    let y_max = if max > 0.0 { max * 1.1 } else { 1.0 };
    let labels: Vec<String> = points.iter().map(|p| p.label.clone()).collect();

    let mut chart = ChartBuilder::on(root)
        .caption(&spec.title, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d((0u32..points.len() as u32).into_segmented(), 0.0..y_max)
        .map_err(to_render_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(spec.x_label.as_str())
        .y_desc(spec.y_label.as_str())
        .x_label_formatter(&|seg| match seg {
            SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .draw()
        .map_err(to_render_error)?;

    chart
        .draw_series(points.iter().enumerate().map(|(i, p)| {
            let color = PALETTE[i % PALETTE.len()];
            let mut bar = Rectangle::new(
                [
                    (SegmentValue::Exact(i as u32), 0.0),
                    (SegmentValue::Exact(i as u32 + 1), p.value),
                ],
                color.filled(),
            );
            bar.set_margin(0, 0, 10, 10);
            bar
        }))
        .map_err(to_render_error)?;

    Ok(())
}

fn draw_histogram(
    root: &Canvas<'_>,
    spec: &ChartSpec,
    bins: &[HistogramBin],
) -> Result<(), ChartError> {
    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        return draw_empty(root, spec);
    };

    let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0) as f64;
    let y_max = if max_count > 0.0 { max_count * 1.1 } else { 1.0 };

    let mut chart = ChartBuilder::on(root)
        .caption(&spec.title, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(first.lower..last.upper, 0.0..y_max)
        .map_err(to_render_error)?;

    chart
        .configure_mesh()
        .x_desc(spec.x_label.as_str())
        .y_desc(spec.y_label.as_str())
        .draw()
        .map_err(to_render_error)?;

    chart
        .draw_series(bins.iter().map(|b| {
            Rectangle::new(
                [(b.lower, 0.0), (b.upper, b.count as f64)],
                PALETTE[6].mix(0.7).filled(),
            )
        }))
        .map_err(to_render_error)?;

    Ok(())
}

fn draw_line(root: &Canvas<'_>, spec: &ChartSpec, points: &[LabeledValue]) -> Result<(), ChartError> {
    if points.is_empty() {
        return draw_empty(root, spec);
    }

    let max = points.iter().fold(0.0f64, |m, p| m.max(p.value));
    let y_max = if max > 0.0 { max * 1.1 } else { 1.0 };
    let x_max = (points.len() - 1).max(1) as f64;
    let labels: Vec<String> = points.iter().map(|p| p.label.clone()).collect();

    let mut chart = ChartBuilder::on(root)
        .caption(&spec.title, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max)
        .map_err(to_render_error)?;

    chart
        .configure_mesh()
        .x_desc(spec.x_label.as_str())
        .y_desc(spec.y_label.as_str())
        .x_labels(points.len())
        .x_label_formatter(&|x| {
            let idx = x.round();
            if idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .draw()
        .map_err(to_render_error)?;

    chart
        .draw_series(LineSeries::new(
            points.iter().enumerate().map(|(i, p)| (i as f64, p.value)),
            PALETTE[1].stroke_width(2),
        ))
        .map_err(to_render_error)?;

    chart
        .draw_series(
            points
                .iter()
                .enumerate()
                .map(|(i, p)| Circle::new((i as f64, p.value), 4, PALETTE[1].filled())),
        )
        .map_err(to_render_error)?;

    Ok(())
}

fn draw_pie(root: &Canvas<'_>, spec: &ChartSpec, slices: &[PieSlice]) -> Result<(), ChartError> {
    let sizes: Vec<f64> = slices.iter().map(|s| s.value).collect();
    if slices.is_empty() || sizes.iter().sum::<f64>() <= 0.0 {
        return draw_empty(root, spec);
    }

    let area = root
        .titled(&spec.title, ("sans-serif", 28))
        .map_err(to_render_error)?;

    let colors: Vec<RGBColor> = slices
        .iter()
        .enumerate()
        .map(|(i, _)| PALETTE[i % PALETTE.len()])
        .collect();
    let labels: Vec<String> = slices
        .iter()
        .map(|s| format!("{} ({:.1}%)", s.label, s.fraction * 100.0))
        .collect();

    let center = ((CHART_WIDTH / 2) as i32, (CHART_HEIGHT / 2) as i32);
    let radius = f64::from(CHART_WIDTH.min(CHART_HEIGHT)) * 0.35;

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(-90.0);
    pie.label_style(("sans-serif", 18).into_font());
    area.draw(&pie).map_err(to_render_error)?;

    Ok(())
}

fn draw_heatmap(root: &Canvas<'_>, spec: &ChartSpec, grid: &HeatmapGrid) -> Result<(), ChartError> {
    let rows = grid.row_labels.len();
    let cols = grid.col_labels.len();
    if rows == 0 || cols == 0 {
        return draw_empty(root, spec);
    }

    let present: Vec<f64> = grid.cells.iter().flatten().filter_map(|c| *c).collect();
    let min = present.iter().copied().fold(f64::INFINITY, f64::min);
    let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut chart = ChartBuilder::on(root)
        .caption(&spec.title, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(80)
        .y_label_area_size(140)
        .build_cartesian_2d(0..cols as i32, 0..rows as i32)
        .map_err(to_render_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc(spec.x_label.as_str())
        .y_desc(spec.y_label.as_str())
        .x_labels(cols)
        .y_labels(rows)
        .x_label_formatter(&|x| grid.col_labels.get(*x as usize).cloned().unwrap_or_default())
        .y_label_formatter(&|y| grid.row_labels.get(*y as usize).cloned().unwrap_or_default())
        .draw()
        .map_err(to_render_error)?;

    let mut filled: Vec<(i32, i32, f64)> = Vec::new();
    for (r, row) in grid.cells.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if let Some(v) = cell {
                filled.push((c as i32, r as i32, *v));
            }
        }
    }

    chart
        .draw_series(filled.iter().map(|&(c, r, v)| {
            let t = if max > min { (v - min) / (max - min) } else { 0.5 };
            Rectangle::new([(c, r), (c + 1, r + 1)], heat_color(t).filled())
        }))
        .map_err(to_render_error)?;

    // Cell annotations, as value text at the cell origin.
    chart
        .draw_series(filled.iter().map(|&(c, r, v)| {
            Text::new(format!("{:.2}", v), (c, r), ("sans-serif", 16))
        }))
        .map_err(to_render_error)?;

    Ok(())
}

/// Map a normalized value onto a white-to-blue ramp.
fn heat_color(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    RGBColor(
        (245.0 - 195.0 * t) as u8,
        (245.0 - 130.0 * t) as u8,
        (250.0 - 60.0 * t) as u8,
    )
}
