//! Panel drawing
//!
//! The four chart panels, drawn against a generic plotters backend so the
//! same code paints the SVG and the raster render. `scale` multiplies every
//! pixel-denominated size (fonts, strokes, markers) for the supersampled
//! raster pass.

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontStyle;

use crate::report::{ChartSpec, Theme, BAR_FEATURE, HISTOGRAM_FEATURE, SCATTER_FEATURES};
use crate::stats::SpeciesMeans;
use crate::table::{Feature, Species, Table};
use crate::{Error, Result};

/// Figure-level title shared by both renders.
const FIGURE_TITLE: &str = "Iris Dataset Analysis Visualizations";

/// Grid points of the density overlay.
const DENSITY_GRID: usize = 200;

fn rerr<E: std::fmt::Display>(e: E) -> Error {
    Error::Render(e.to_string())
}

/// Draw the full 2×2 grid onto one drawing area.
pub(super) fn draw_report<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    table: &Table,
    means: &[SpeciesMeans],
    theme: &Theme,
    specs: &[ChartSpec; 4],
    scale: u32,
) -> Result<()> {
    root.fill(&WHITE).map_err(rerr)?;
    let titled = root
        .titled(
            FIGURE_TITLE,
            (theme.font_family, 26 * scale)
                .into_font()
                .style(FontStyle::Bold),
        )
        .map_err(rerr)?;

    let quads = titled.split_evenly((2, 2));
    draw_line_panel(&quads[0], means, theme, &specs[0], scale)?;
    draw_bar_panel(&quads[1], means, theme, &specs[1], scale)?;
    draw_histogram_panel(&quads[2], table, theme, &specs[2], scale)?;
    draw_scatter_panel(&quads[3], table, theme, &specs[3], scale)?;
    Ok(())
}

/// Panel 1: one line per feature across the species axis.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn draw_line_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    means: &[SpeciesMeans],
    theme: &Theme,
    spec: &ChartSpec,
    scale: u32,
) -> Result<()> {
    let y_max = means
        .iter()
        .flat_map(|m| m.means)
        .fold(0.0_f64, f64::max)
        * 1.15;
    let x_max = means.len().saturating_sub(1) as f64;

    let mut chart = ChartBuilder::on(area)
        .caption(spec.title.as_str(), (theme.font_family, 18 * scale))
        .margin(10 * scale)
        .x_label_area_size(36 * scale)
        .y_label_area_size(48 * scale)
        .build_cartesian_2d(-0.3..x_max + 0.3, 0.0..y_max.max(1.0))
        .map_err(rerr)?;

    chart
        .configure_mesh()
        .x_desc(spec.x_label.as_str())
        .y_desc(spec.y_label.as_str())
        .x_labels(means.len().max(2))
        .x_label_formatter(&|x: &f64| {
            let idx = x.round();
            if (x - idx).abs() < 0.05 && idx >= 0.0 && (idx as usize) < means.len() {
                means[idx as usize].species.name().to_string()
            } else {
                String::new()
            }
        })
        .label_style((theme.font_family, 12 * scale))
        .axis_desc_style((theme.font_family, 14 * scale))
        .light_line_style(BLACK.mix(0.08))
        .draw()
        .map_err(rerr)?;

    for feature in Feature::ALL {
        let color = theme.feature_palette[feature.column_index()];
        let points: Vec<(f64, f64)> = means
            .iter()
            .enumerate()
            .map(|(i, m)| (i as f64, m.means[feature.column_index()]))
            .collect();
        chart
            .draw_series(
                LineSeries::new(points, color.stroke_width(2 * scale)).point_size(3 * scale),
            )
            .map_err(rerr)?
            .label(feature.label())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 14, y)], color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK.mix(0.4))
        .label_font((theme.font_family, 12 * scale))
        .draw()
        .map_err(rerr)?;
    Ok(())
}

/// Panel 2: per-species mean of the designated bar feature, values labeled
/// above the bars to two decimal places.
fn draw_bar_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    means: &[SpeciesMeans],
    theme: &Theme,
    spec: &ChartSpec,
    scale: u32,
) -> Result<()> {
    let y_max = means
        .iter()
        .map(|m| m.means[BAR_FEATURE.column_index()])
        .fold(0.0_f64, f64::max)
        * 1.3;
    let seg_max = means.len().saturating_sub(1);

    let mut chart = ChartBuilder::on(area)
        .caption(spec.title.as_str(), (theme.font_family, 18 * scale))
        .margin(10 * scale)
        .x_label_area_size(36 * scale)
        .y_label_area_size(48 * scale)
        .build_cartesian_2d((0..seg_max).into_segmented(), 0.0..y_max.max(1.0))
        .map_err(rerr)?;

    chart
        .configure_mesh()
        .x_desc(spec.x_label.as_str())
        .y_desc(spec.y_label.as_str())
        .x_label_formatter(&|x: &SegmentValue<usize>| match x {
            SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => means
                .get(*i)
                .map_or_else(String::new, |m| m.species.name().to_string()),
            SegmentValue::Last => String::new(),
        })
        .label_style((theme.font_family, 12 * scale))
        .axis_desc_style((theme.font_family, 14 * scale))
        .light_line_style(BLACK.mix(0.08))
        .draw()
        .map_err(rerr)?;

    for (i, m) in means.iter().enumerate() {
        let color = theme.species_color(m.species);
        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(color.mix(0.75).filled())
                    .margin(12 * scale)
                    .data(std::iter::once((i, m.means[BAR_FEATURE.column_index()]))),
            )
            .map_err(rerr)?;
    }

    let value_font = TextStyle::from((theme.font_family, 12 * scale).into_font())
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    chart
        .draw_series(means.iter().enumerate().map(|(i, m)| {
            let v = m.means[BAR_FEATURE.column_index()];
            Text::new(
                format!("{v:.2}"),
                (SegmentValue::CenterOf(i), v + y_max * 0.02),
                value_font.clone(),
            )
        }))
        .map_err(rerr)?;
    Ok(())
}

/// Panel 3: distribution of the designated histogram feature, partitioned by
/// species, with a per-species density overlay scaled to the count axis.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn draw_histogram_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    table: &Table,
    theme: &Theme,
    spec: &ChartSpec,
    scale: u32,
) -> Result<()> {
    let all = table.feature_values(HISTOGRAM_FEATURE, None)?;
    if all.is_empty() {
        return Err(Error::Render("no values for histogram panel".to_string()));
    }
    let lo = all.iter().fold(f64::INFINITY, |a, &b| a.min(b));
    let hi = all.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let bins = theme.histogram_bins.max(1);
    let width = (hi - lo).max(1e-9) / bins as f64;

    let mut layers: Vec<(Species, Vec<usize>, Vec<f64>)> = Vec::new();
    let mut top = 0_usize;
    for species in Species::ALL {
        let values = table.feature_values(HISTOGRAM_FEATURE, Some(species))?;
        if values.is_empty() {
            continue;
        }
        let mut counts = vec![0_usize; bins];
        for &v in &values {
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        top = top.max(counts.iter().copied().max().unwrap_or(0));
        layers.push((species, counts, values));
    }
    let y_max = (top as f64 * 1.2).max(1.0);
    let x_from = lo - width;
    let x_to = hi + width;

    let mut chart = ChartBuilder::on(area)
        .caption(spec.title.as_str(), (theme.font_family, 18 * scale))
        .margin(10 * scale)
        .x_label_area_size(36 * scale)
        .y_label_area_size(48 * scale)
        .build_cartesian_2d(x_from..x_to, 0.0..y_max)
        .map_err(rerr)?;

    chart
        .configure_mesh()
        .x_desc(spec.x_label.as_str())
        .y_desc(spec.y_label.as_str())
        .label_style((theme.font_family, 12 * scale))
        .axis_desc_style((theme.font_family, 14 * scale))
        .light_line_style(BLACK.mix(0.08))
        .draw()
        .map_err(rerr)?;

    for (species, counts, values) in &layers {
        let color = theme.species_color(*species);
        chart
            .draw_series(counts.iter().enumerate().filter(|(_, &c)| c > 0).map(
                |(j, &c)| {
                    let x0 = lo + j as f64 * width;
                    Rectangle::new(
                        [(x0, 0.0), (x0 + width, c as f64)],
                        color.mix(0.35).filled(),
                    )
                },
            ))
            .map_err(rerr)?
            .label(species.name())
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.mix(0.6).filled())
            });

        if let Some(curve) = gaussian_kde_curve(values, x_from, x_to, DENSITY_GRID) {
            let n = values.len() as f64;
            chart
                .draw_series(LineSeries::new(
                    curve.into_iter().map(|(x, d)| (x, d * n * width)),
                    color.stroke_width(2 * scale),
                ))
                .map_err(rerr)?;
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK.mix(0.4))
        .label_font((theme.font_family, 12 * scale))
        .draw()
        .map_err(rerr)?;
    Ok(())
}

/// Panel 4: the designated feature pair as points, colored and shaped by
/// species.
fn draw_scatter_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    table: &Table,
    theme: &Theme,
    spec: &ChartSpec,
    scale: u32,
) -> Result<()> {
    let (fx, fy) = SCATTER_FEATURES;
    let xs = table.feature_values(fx, None)?;
    let ys = table.feature_values(fy, None)?;
    if xs.is_empty() {
        return Err(Error::Render("no values for scatter panel".to_string()));
    }
    let (x_from, x_to) = padded_range(&xs);
    let (y_from, y_to) = padded_range(&ys);

    let mut chart = ChartBuilder::on(area)
        .caption(spec.title.as_str(), (theme.font_family, 18 * scale))
        .margin(10 * scale)
        .x_label_area_size(36 * scale)
        .y_label_area_size(48 * scale)
        .build_cartesian_2d(x_from..x_to, y_from..y_to)
        .map_err(rerr)?;

    chart
        .configure_mesh()
        .x_desc(spec.x_label.as_str())
        .y_desc(spec.y_label.as_str())
        .label_style((theme.font_family, 12 * scale))
        .axis_desc_style((theme.font_family, 14 * scale))
        .light_line_style(BLACK.mix(0.08))
        .draw()
        .map_err(rerr)?;

    for species in Species::ALL {
        let sx = table.feature_values(fx, Some(species))?;
        let sy = table.feature_values(fy, Some(species))?;
        if sx.is_empty() {
            continue;
        }
        let color = theme.species_color(species);
        let points: Vec<(f64, f64)> = sx.into_iter().zip(sy).collect();

        let anno = match species {
            Species::Setosa => chart
                .draw_series(
                    points
                        .iter()
                        .map(|&(x, y)| Circle::new((x, y), 3 * scale, color.mix(0.8).filled())),
                )
                .map_err(rerr)?,
            Species::Versicolor => chart
                .draw_series(points.iter().map(|&(x, y)| {
                    TriangleMarker::new((x, y), 4 * scale, color.mix(0.8).filled())
                }))
                .map_err(rerr)?,
            Species::Virginica => chart
                .draw_series(
                    points
                        .iter()
                        .map(|&(x, y)| Cross::new((x, y), 3 * scale, color.stroke_width(scale))),
                )
                .map_err(rerr)?,
        };
        anno.label(species.name())
            .legend(move |(x, y)| Circle::new((x + 6, y), 3, color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK.mix(0.4))
        .label_font((theme.font_family, 12 * scale))
        .draw()
        .map_err(rerr)?;
    Ok(())
}

/// Range of a sample padded by 5% on both ends.
fn padded_range(values: &[f64]) -> (f64, f64) {
    let lo = values.iter().fold(f64::INFINITY, |a, &b| a.min(b));
    let hi = values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let pad = ((hi - lo) * 0.05).max(1e-9);
    (lo - pad, hi + pad)
}

/// Gaussian kernel density estimate with Scott's bandwidth, evaluated on an
/// even grid over `[from, to]`. Returns `None` for samples too small or too
/// degenerate to smooth.
#[allow(clippy::cast_precision_loss)]
fn gaussian_kde_curve(
    samples: &[f64],
    from: f64,
    to: f64,
    points: usize,
) -> Option<Vec<(f64, f64)>> {
    if samples.len() < 2 || points < 2 {
        return None;
    }
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let var = samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let bandwidth = var.sqrt() * n.powf(-0.2);
    if bandwidth <= 0.0 || !bandwidth.is_finite() {
        return None;
    }

    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    let step = (to - from) / (points - 1) as f64;
    Some(
        (0..points)
            .map(|i| {
                let x = from + i as f64 * step;
                let density = samples
                    .iter()
                    .map(|&s| (-0.5 * ((x - s) / bandwidth).powi(2)).exp())
                    .sum::<f64>()
                    * norm;
                (x, density)
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kde_integrates_to_one() {
        let samples = [1.0, 1.2, 0.8, 1.1, 0.9, 1.3, 0.7, 1.0];
        let curve = gaussian_kde_curve(&samples, -4.0, 6.0, 2000).unwrap();
        let step = curve[1].0 - curve[0].0;
        let mass: f64 = curve.iter().map(|(_, d)| d * step).sum();
        assert!((mass - 1.0).abs() < 1e-2, "mass = {mass}");
    }

    #[test]
    fn test_kde_rejects_degenerate_samples() {
        assert!(gaussian_kde_curve(&[1.0], 0.0, 2.0, 100).is_none());
        // Zero variance gives zero bandwidth.
        assert!(gaussian_kde_curve(&[2.0, 2.0, 2.0], 0.0, 4.0, 100).is_none());
    }

    #[test]
    fn test_padded_range_brackets_data() {
        let (lo, hi) = padded_range(&[1.0, 2.0, 3.0]);
        assert!(lo < 1.0);
        assert!(hi > 3.0);
    }
}
