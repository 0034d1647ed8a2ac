use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;
use serde::{Deserialize, Serialize};

use crate::color::ColorScheme;
use crate::data::model::Dataset;
use crate::error::{ChartError, RenderError};

use super::request::{
    validate, CategoricalColumn, NumericColumn, PlotRequest, PlotSpec, ValidatedRequest, XColumn,
};
use super::stats;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Output geometry for a render pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Bin count for histogram charts.
    pub hist_bins: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            width: 1000,
            height: 600,
            hist_bins: 20,
        }
    }
}

/// A rendered chart: PNG-encoded bytes plus pixel dimensions. Owned by the
/// caller until downloaded or discarded.
#[derive(Debug, Clone)]
pub struct RenderedChart {
    png: Vec<u8>,
    width: u32,
    height: u32,
}

impl RenderedChart {
    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn into_png_bytes(self) -> Vec<u8> {
        self.png
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

// ---------------------------------------------------------------------------
// Dispatcher entry-points
// ---------------------------------------------------------------------------

/// Validate `request` against `dataset` and render the chart at the default
/// resolution. Each invocation re-renders from scratch.
pub fn render(dataset: &Dataset, request: &PlotRequest) -> Result<RenderedChart, ChartError> {
    render_with(dataset, request, &RenderOptions::default())
}

/// [`render`] with explicit output geometry.
pub fn render_with(
    dataset: &Dataset,
    request: &PlotRequest,
    options: &RenderOptions,
) -> Result<RenderedChart, ChartError> {
    let validated = validate(dataset, request)?;

    let width = options.width.max(32);
    let height = options.height.max(32);
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(to_render)?;
        draw(&root, &validated, options)?;
        root.present().map_err(to_render)?;
    }

    let png = encode_png(&buffer, width, height)?;
    Ok(RenderedChart { png, width, height })
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    validated: &ValidatedRequest<'_>,
    options: &RenderOptions,
) -> Result<(), RenderError> {
    let scheme = validated.scheme;
    match &validated.spec {
        PlotSpec::Line { x, ys } => draw_line(root, scheme, x, ys),
        PlotSpec::Bar { categories, values } => draw_bar(root, scheme, categories, values),
        PlotSpec::Scatter { x, y } => draw_scatter(root, scheme, x, y),
        PlotSpec::Histogram { values } => draw_histogram(root, scheme, values, options.hist_bins),
        PlotSpec::Box { columns } => draw_box(root, scheme, columns),
        PlotSpec::Correlation { columns } => draw_correlation(root, scheme, columns),
    }
}

// ---------------------------------------------------------------------------
// Per-kind drawing
// ---------------------------------------------------------------------------

fn draw_line<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    scheme: ColorScheme,
    x: &XColumn<'_>,
    ys: &[NumericColumn<'_>],
) -> Result<(), RenderError> {
    // Categorical x plots by row position with category tick labels.
    let (x_values, tick_labels): (Vec<f64>, Option<&[String]>) = match x {
        XColumn::Numeric(c) => (c.values.to_vec(), None),
        XColumn::Categorical(c) => (
            (0..c.values.len()).map(|i| i as f64).collect(),
            Some(c.values),
        ),
    };

    let (x_min, x_max) = stats::bounds(&x_values).ok_or_else(|| degenerate(x.name()))?;
    let y_all: Vec<f64> = ys.iter().flat_map(|c| c.values.iter().copied()).collect();
    let (y_min, y_max) = stats::bounds(&y_all).ok_or_else(|| degenerate(ys[0].name))?;

    let y_names: Vec<&str> = ys.iter().map(|c| c.name).collect();
    let caption = format!("Line Plot of {} vs {}", y_names.join(", "), x.name());

    let mut chart = ChartBuilder::on(root)
        .caption(caption, ("sans-serif", 22))
        .margin(12)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(padded(x_min, x_max), padded(y_min, y_max))
        .map_err(to_render)?;

    let y_desc = if ys.len() == 1 { ys[0].name } else { "value" };
    match tick_labels {
        Some(labels) => chart
            .configure_mesh()
            .x_desc(x.name())
            .y_desc(y_desc)
            .axis_desc_style(("sans-serif", 15))
            .x_labels(labels.len().min(12))
            .x_label_formatter(&|v: &f64| position_label(*v, labels))
            .draw()
            .map_err(to_render)?,
        None => chart
            .configure_mesh()
            .x_desc(x.name())
            .y_desc(y_desc)
            .axis_desc_style(("sans-serif", 15))
            .draw()
            .map_err(to_render)?,
    }

    let colors = if ys.len() == 1 {
        // A lone series draws in the scheme's mid-range tone.
        vec![scheme.sample(0.6)]
    } else {
        scheme.discrete(ys.len())
    };

    for (idx, col) in ys.iter().enumerate() {
        let color = colors[idx];
        let points: Vec<(f64, f64)> = x_values
            .iter()
            .zip(col.values.iter())
            .filter(|(a, b)| a.is_finite() && b.is_finite())
            .map(|(&a, &b)| (a, b))
            .collect();

        let series = chart
            .draw_series(LineSeries::new(points, color.stroke_width(2)).point_size(3))
            .map_err(to_render)?;
        if ys.len() > 1 {
            series.label(col.name).legend(move |(lx, ly)| {
                PathElement::new(vec![(lx, ly), (lx + 18, ly)], color.stroke_width(2))
            });
        }
    }

    if ys.len() > 1 {
        chart
            .configure_series_labels()
            .border_style(BLACK.mix(0.4))
            .background_style(WHITE.mix(0.85))
            .draw()
            .map_err(to_render)?;
    }
    Ok(())
}

fn draw_bar<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    scheme: ColorScheme,
    categories: &CategoricalColumn<'_>,
    values: &NumericColumn<'_>,
) -> Result<(), RenderError> {
    let n = values.values.len();
    let (min, max) = stats::bounds(values.values).ok_or_else(|| degenerate(values.name))?;

    let mut chart = ChartBuilder::on(root)
        .caption(
            format!("Bar Plot of {} vs {}", values.name, categories.name),
            ("sans-serif", 22),
        )
        .margin(12)
        .x_label_area_size(if n > 10 { 110 } else { 50 })
        .y_label_area_size(60)
        .build_cartesian_2d((0..n).into_segmented(), padded(min.min(0.0), max.max(0.0)))
        .map_err(to_render)?;

    // One tick per bar; rotate the labels when they start to crowd.
    let label_font = if n > 10 {
        ("sans-serif", 12).into_font().transform(FontTransform::Rotate90)
    } else {
        ("sans-serif", 12).into_font()
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(categories.name)
        .y_desc(values.name)
        .axis_desc_style(("sans-serif", 15))
        .x_labels(n.min(30))
        .x_label_style(label_font)
        .x_label_formatter(&|seg| segment_label(seg, categories.values))
        .draw()
        .map_err(to_render)?;

    let colors = scheme.discrete(n);
    chart
        .draw_series(
            values
                .values
                .iter()
                .enumerate()
                .filter(|(_, v)| v.is_finite())
                .map(|(i, &v)| {
                    Rectangle::new(
                        [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), v)],
                        colors[i].filled(),
                    )
                }),
        )
        .map_err(to_render)?;
    Ok(())
}

fn draw_scatter<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    scheme: ColorScheme,
    x: &NumericColumn<'_>,
    y: &NumericColumn<'_>,
) -> Result<(), RenderError> {
    let points: Vec<(usize, f64, f64)> = x
        .values
        .iter()
        .zip(y.values.iter())
        .enumerate()
        .filter(|(_, (a, b))| a.is_finite() && b.is_finite())
        .map(|(i, (&a, &b))| (i, a, b))
        .collect();

    let xs: Vec<f64> = points.iter().map(|&(_, a, _)| a).collect();
    let ys: Vec<f64> = points.iter().map(|&(_, _, b)| b).collect();
    let (x_min, x_max) = stats::bounds(&xs).ok_or_else(|| degenerate(x.name))?;
    let (y_min, y_max) = stats::bounds(&ys).ok_or_else(|| degenerate(y.name))?;

    let mut chart = ChartBuilder::on(root)
        .caption(
            format!("Scatter Plot of {} vs {}", y.name, x.name),
            ("sans-serif", 22),
        )
        .margin(12)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(padded(x_min, x_max), padded(y_min, y_max))
        .map_err(to_render)?;

    chart
        .configure_mesh()
        .x_desc(x.name)
        .y_desc(y.name)
        .axis_desc_style(("sans-serif", 15))
        .draw()
        .map_err(to_render)?;

    // Points sweep the scheme by row index.
    let denom = (x.values.len().saturating_sub(1)).max(1) as f64;
    chart
        .draw_series(
            points
                .iter()
                .map(|&(i, a, b)| Circle::new((a, b), 4, scheme.sample(i as f64 / denom).filled())),
        )
        .map_err(to_render)?;
    Ok(())
}

fn draw_histogram<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    scheme: ColorScheme,
    values: &NumericColumn<'_>,
    bins: usize,
) -> Result<(), RenderError> {
    let hist = stats::histogram(values.values, bins).ok_or_else(|| degenerate(values.name))?;
    let bins = hist.counts.len();
    let max_count = hist.counts.iter().copied().max().unwrap_or(0);

    let x_range = hist.start..(hist.start + hist.width * bins as f64);
    let y_range = 0f64..(max_count as f64 * 1.05).max(1.0);

    let mut chart = ChartBuilder::on(root)
        .caption(format!("Histogram of {}", values.name), ("sans-serif", 22))
        .margin(12)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)
        .map_err(to_render)?;

    chart
        .configure_mesh()
        .x_desc(values.name)
        .y_desc("Frequency")
        .axis_desc_style(("sans-serif", 15))
        .draw()
        .map_err(to_render)?;

    let colors = scheme.discrete(bins);
    chart
        .draw_series(hist.counts.iter().enumerate().map(|(i, &count)| {
            let x0 = hist.start + hist.width * i as f64;
            let x1 = x0 + hist.width;
            Rectangle::new([(x0, 0.0), (x1, count as f64)], colors[i].filled())
        }))
        .map_err(to_render)?;
    // White edges between bins.
    chart
        .draw_series(hist.counts.iter().enumerate().map(|(i, &count)| {
            let x0 = hist.start + hist.width * i as f64;
            let x1 = x0 + hist.width;
            Rectangle::new([(x0, 0.0), (x1, count as f64)], WHITE.stroke_width(1))
        }))
        .map_err(to_render)?;
    Ok(())
}

fn draw_box<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    scheme: ColorScheme,
    columns: &[NumericColumn<'_>],
) -> Result<(), RenderError> {
    let mut finite_columns = Vec::with_capacity(columns.len());
    for col in columns {
        let finite: Vec<f64> = col.values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return Err(degenerate(col.name));
        }
        finite_columns.push(finite);
    }

    let all: Vec<f64> = finite_columns.iter().flatten().copied().collect();
    let (y_min, y_max) = stats::bounds(&all).ok_or_else(|| degenerate(columns[0].name))?;
    let n = columns.len();

    let mut chart = ChartBuilder::on(root)
        .caption("Box Plot", ("sans-serif", 22))
        .margin(12)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d((0..n).into_segmented(), {
            let r = padded(y_min, y_max);
            (r.start as f32)..(r.end as f32)
        })
        .map_err(to_render)?;

    let names: Vec<&str> = columns.iter().map(|c| c.name).collect();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("value")
        .axis_desc_style(("sans-serif", 15))
        .x_labels(n)
        .x_label_formatter(&|seg| segment_label(seg, &names))
        .draw()
        .map_err(to_render)?;

    let colors = scheme.discrete(n);
    for (i, finite) in finite_columns.iter().enumerate() {
        let quartiles = Quartiles::new(finite);
        chart
            .draw_series([Boxplot::new_vertical(SegmentValue::CenterOf(i), &quartiles)
                .width(24)
                .style(colors[i])])
            .map_err(to_render)?;
    }
    Ok(())
}

fn draw_correlation<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    scheme: ColorScheme,
    columns: &[NumericColumn<'_>],
) -> Result<(), RenderError> {
    let names: Vec<&str> = columns.iter().map(|c| c.name).collect();
    let slices: Vec<&[f64]> = columns.iter().map(|c| c.values).collect();
    let matrix = stats::correlation_matrix(&slices);
    let n = names.len();

    let mut chart = ChartBuilder::on(root)
        .caption("Correlation Matrix", ("sans-serif", 22))
        .margin(12)
        .x_label_area_size(if n > 6 { 110 } else { 50 })
        .y_label_area_size(100)
        .build_cartesian_2d((0..n).into_segmented(), (0..n).into_segmented())
        .map_err(to_render)?;

    let label_font = if n > 6 {
        ("sans-serif", 13).into_font().transform(FontTransform::Rotate90)
    } else {
        ("sans-serif", 13).into_font()
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(n)
        .y_labels(n)
        .x_label_style(label_font)
        .x_label_formatter(&|seg| segment_label(seg, &names))
        // Row 0 sits at the top, so the y axis reads top-down.
        .y_label_formatter(&|seg| flipped_segment_label(seg, &names))
        .draw()
        .map_err(to_render)?;

    let mut cells = Vec::with_capacity(n * n);
    let mut annotations = Vec::with_capacity(n * n);
    for (i, row) in matrix.iter().enumerate() {
        for (j, &r) in row.iter().enumerate() {
            let t = if r.is_nan() { 0.5 } else { (r + 1.0) / 2.0 };
            let flipped = n - 1 - i;
            cells.push(Rectangle::new(
                [
                    (SegmentValue::Exact(j), SegmentValue::Exact(flipped)),
                    (SegmentValue::Exact(j + 1), SegmentValue::Exact(flipped + 1)),
                ],
                scheme.sample(t).filled(),
            ));

            // White annotation on strong cells, black on weak ones.
            let text_color = if r.abs() > 0.5 { &WHITE } else { &BLACK };
            let label = if r.is_nan() {
                "nan".to_string()
            } else {
                format!("{r:.2}")
            };
            annotations.push(Text::new(
                label,
                (SegmentValue::CenterOf(j), SegmentValue::CenterOf(flipped)),
                ("sans-serif", 14)
                    .into_font()
                    .color(text_color)
                    .pos(Pos::new(HPos::Center, VPos::Center)),
            ));
        }
    }
    chart.draw_series(cells).map_err(to_render)?;
    chart.draw_series(annotations).map_err(to_render)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn to_render(e: impl std::fmt::Display) -> RenderError {
    RenderError::Backend(e.to_string())
}

fn degenerate(name: &str) -> RenderError {
    RenderError::DegenerateColumn {
        name: name.to_string(),
    }
}

/// Pad an axis range by 5%, widening degenerate ranges so a flat series
/// still draws.
fn padded(min: f64, max: f64) -> std::ops::Range<f64> {
    if min == max {
        (min - 0.5)..(max + 0.5)
    } else {
        let pad = (max - min) * 0.05;
        (min - pad)..(max + pad)
    }
}

/// Tick label for a row position on a categorical axis; blank between rows.
fn position_label(v: f64, labels: &[String]) -> String {
    let rounded = v.round();
    if (v - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

fn segment_index(seg: &SegmentValue<usize>) -> Option<usize> {
    match seg {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => Some(*i),
        SegmentValue::Last => None,
    }
}

fn segment_label<S: AsRef<str>>(seg: &SegmentValue<usize>, labels: &[S]) -> String {
    segment_index(seg)
        .and_then(|i| labels.get(i))
        .map(|s| s.as_ref().to_string())
        .unwrap_or_default()
}

fn flipped_segment_label<S: AsRef<str>>(seg: &SegmentValue<usize>, labels: &[S]) -> String {
    segment_index(seg)
        .and_then(|i| labels.len().checked_sub(i + 1))
        .and_then(|i| labels.get(i))
        .map(|s| s.as_ref().to_string())
        .unwrap_or_default()
}

fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
    use image::codecs::png::PngEncoder;
    use image::ImageEncoder;

    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(buffer, width, height, image::ExtendedColorType::Rgb8)?;
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_a_landscape_figure() {
        let options = RenderOptions::default();
        assert_eq!((options.width, options.height), (1000, 600));
        assert_eq!(options.hist_bins, 20);
    }

    #[test]
    fn padded_widens_flat_ranges() {
        let range = padded(3.0, 3.0);
        assert!(range.start < 3.0 && range.end > 3.0);
    }

    #[test]
    fn segment_labels_flip_for_matrix_rows() {
        let labels = ["a", "b", "c"];
        assert_eq!(segment_label(&SegmentValue::CenterOf(0), &labels), "a");
        assert_eq!(flipped_segment_label(&SegmentValue::CenterOf(0), &labels), "c");
        assert_eq!(flipped_segment_label(&SegmentValue::CenterOf(2), &labels), "a");
        assert_eq!(segment_label(&SegmentValue::<usize>::Last, &labels), "");
    }
}
