//! Chart reporting
//!
//! Builds the fixed 2×2 chart grid (line, bar, histogram, scatter) from the
//! table and its aggregates, renders it once to SVG and once to a PNG raster,
//! and persists both under a timestamped stem.
//!
//! All visual state — palette, geometry, bin count, raster scale — lives in
//! an explicit [`Theme`] handed to the [`Reporter`] at construction. Nothing
//! here touches process-global configuration, so the component can be
//! exercised in isolation with a throwaway theme.
//!
//! Which feature feeds which panel is fixed configuration
//! ([`BAR_FEATURE`], [`HISTOGRAM_FEATURE`], [`SCATTER_FEATURES`]), not
//! derived logic.

mod artifact;
mod panels;

pub use artifact::{ReportArtifact, SavedReport, TIMESTAMP_FORMAT};

use plotters::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::stats::SpeciesMeans;
use crate::table::{Feature, Table};
use crate::{Error, Result};

/// Stem prefix shared by both output files.
pub const OUTPUT_PREFIX: &str = "iris_analysis_report";

/// Feature shown in the bar panel.
pub const BAR_FEATURE: Feature = Feature::SepalWidth;

/// Feature whose distribution the histogram panel shows.
pub const HISTOGRAM_FEATURE: Feature = Feature::PetalLength;

/// Feature pair (x, y) of the scatter panel.
pub const SCATTER_FEATURES: (Feature, Feature) = (Feature::SepalLength, Feature::PetalLength);

/// Kind of one chart panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartKind {
    /// Per-species feature means as lines
    Line,
    /// Per-species mean of one feature as bars
    Bar,
    /// Distribution of one feature with a density overlay
    Histogram,
    /// One feature pair as points
    Scatter,
}

/// Declarative description of one chart panel.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    /// Panel kind
    pub kind: ChartKind,
    /// Panel title
    pub title: String,
    /// X-axis label
    pub x_label: String,
    /// Y-axis label
    pub y_label: String,
    /// Features the panel draws, in drawing order
    pub features: Vec<Feature>,
    /// Whether the panel partitions records by species
    pub by_species: bool,
}

/// Visual configuration for one report.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Base figure geometry in pixels (the SVG renders at this size)
    pub figure_size: (u32, u32),
    /// Supersampling factor of the raster render relative to the base size
    pub raster_scale: u32,
    /// One color per species, in closed-set order
    pub species_palette: [RGBColor; 3],
    /// One color per feature, in schema order
    pub feature_palette: [RGBColor; 4],
    /// Font family for every text element
    pub font_family: &'static str,
    /// Bin count of the histogram panel
    pub histogram_bins: usize,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            figure_size: (1600, 1200),
            raster_scale: 2,
            species_palette: [
                RGBColor(0x4C, 0x72, 0xB0),
                RGBColor(0x55, 0xA8, 0x68),
                RGBColor(0xC4, 0x4E, 0x52),
            ],
            feature_palette: [
                RGBColor(0x4C, 0x72, 0xB0),
                RGBColor(0x55, 0xA8, 0x68),
                RGBColor(0xC4, 0x4E, 0x52),
                RGBColor(0x81, 0x72, 0xB2),
            ],
            font_family: "sans-serif",
            histogram_bins: 15,
        }
    }
}

impl Theme {
    /// Color assigned to one species.
    #[must_use]
    pub const fn species_color(&self, species: crate::table::Species) -> RGBColor {
        self.species_palette[species as usize]
    }
}

/// Builds and renders the four-panel report.
#[derive(Debug, Clone)]
pub struct Reporter {
    theme: Theme,
}

impl Reporter {
    /// Create a reporter with an explicit theme.
    #[must_use]
    pub const fn new(theme: Theme) -> Self {
        Self { theme }
    }

    /// The reporter's theme.
    #[must_use]
    pub const fn theme(&self) -> &Theme {
        &self.theme
    }

    /// The four panel specifications, in grid order (row-major).
    #[must_use]
    pub fn chart_specs(&self) -> [ChartSpec; 4] {
        [
            ChartSpec {
                kind: ChartKind::Line,
                title: "Feature Means by Species".to_string(),
                x_label: "Species".to_string(),
                y_label: "Mean Measurement (cm)".to_string(),
                features: Feature::ALL.to_vec(),
                by_species: true,
            },
            ChartSpec {
                kind: ChartKind::Bar,
                title: "Mean Sepal Width by Species".to_string(),
                x_label: "Species".to_string(),
                y_label: format!("Mean {}", BAR_FEATURE.label()),
                features: vec![BAR_FEATURE],
                by_species: true,
            },
            ChartSpec {
                kind: ChartKind::Histogram,
                title: "Distribution of Petal Length by Species".to_string(),
                x_label: HISTOGRAM_FEATURE.label().to_string(),
                y_label: "Count".to_string(),
                features: vec![HISTOGRAM_FEATURE],
                by_species: true,
            },
            ChartSpec {
                kind: ChartKind::Scatter,
                title: "Sepal Length vs Petal Length".to_string(),
                x_label: SCATTER_FEATURES.0.label().to_string(),
                y_label: SCATTER_FEATURES.1.label().to_string(),
                features: vec![SCATTER_FEATURES.0, SCATTER_FEATURES.1],
                by_species: true,
            },
        ]
    }

    /// Render the report twice: SVG at base geometry and PNG at
    /// `raster_scale ×` base geometry. Both encodings stay in memory; nothing
    /// touches the filesystem until [`ReportArtifact::persist_into`].
    ///
    /// # Errors
    /// Returns [`Error::Render`] if a panel cannot be drawn or the raster
    /// cannot be encoded.
    pub fn render(&self, table: &Table, means: &[SpeciesMeans]) -> Result<ReportArtifact> {
        if means.is_empty() {
            return Err(Error::Render(
                "no species groups to plot".to_string(),
            ));
        }
        let specs = self.chart_specs();
        let (width, height) = self.theme.figure_size;

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
            panels::draw_report(&root, table, means, &self.theme, &specs, 1)?;
            root.present().map_err(|e| Error::Render(e.to_string()))?;
        }

        let scale = self.theme.raster_scale.max(1);
        let (rw, rh) = (width * scale, height * scale);
        let mut rgb = vec![0_u8; rw as usize * rh as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut rgb, (rw, rh)).into_drawing_area();
            panels::draw_report(&root, table, means, &self.theme, &specs, scale)?;
            root.present().map_err(|e| Error::Render(e.to_string()))?;
        }
        let png = encode_png(&rgb, rw, rh)?;

        info!(
            vector_bytes = svg.len(),
            raster_bytes = png.len(),
            "report rendered"
        );
        Ok(ReportArtifact::new(svg, png))
    }
}

/// Encode an RGB pixel buffer as PNG bytes.
fn encode_png(rgb: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    use image::ImageEncoder;

    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(rgb, width, height, image::ColorType::Rgb8)
        .map_err(|e| Error::Render(format!("PNG encoding failed: {e}")))?;
    Ok(out)
}
