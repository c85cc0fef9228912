//! Curve rendering (plotters)
//!
//! One panel per value column, stacked vertically in a single PNG:
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ ── ppo                               │  legend (one entry per line)
//! │ ── sac                               │
//! ├──────────────────────────────────────┤
//! │   ░░░░▒▒▒▒────────                   │  center line + sd band
//! │ ░░──────                             │  on a darkgrid background
//! └──────────────────────────────────────┘
//!              TotalEnvInteracts (1e6)
//! ```
//!
//! Figure geometry follows a 6.4 x 4.8 inch figure per panel at a fixed
//! DPI, with font and stroke sizes given in points.

use crate::aggregate::Curve;
use crate::{Error, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::fmt::Display;
use std::path::Path;

const FIGURE_INCHES: (f64, f64) = (6.4, 4.8);
const POINTS_PER_INCH: f64 = 72.0;
const BASE_FONT_POINTS: f64 = 10.0;
const FONT_FAMILY: &str = "sans-serif";

/// Plot-area background of the darkgrid theme.
pub const DARKGRID: RGBColor = RGBColor(234, 234, 242);

fn plot_err<E: Display>(e: E) -> Error {
    Error::PlotError(e.to_string())
}

/// Line colors, assigned by label index.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    colors: &'static [RGBColor],
}

const PAIRED: [RGBColor; 12] = [
    RGBColor(166, 206, 227),
    RGBColor(31, 120, 180),
    RGBColor(178, 223, 138),
    RGBColor(51, 160, 44),
    RGBColor(251, 154, 153),
    RGBColor(227, 26, 28),
    RGBColor(253, 191, 111),
    RGBColor(255, 127, 0),
    RGBColor(202, 178, 214),
    RGBColor(106, 61, 154),
    RGBColor(255, 255, 153),
    RGBColor(177, 89, 40),
];

impl Palette {
    /// The 12-color "Paired" qualitative palette.
    #[must_use]
    pub const fn paired() -> Self {
        Self { colors: &PAIRED }
    }

    /// Number of distinct colors before the palette cycles.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.colors.len()
    }

    /// Check whether the palette has no colors.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color for the `index`-th label (cycles).
    #[must_use]
    pub fn color(&self, index: usize) -> RGBColor {
        self.colors[index % self.colors.len()]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::paired()
    }
}

/// Label → color map shared by every panel of one image.
///
/// Indices follow the sorted union of labels over all panels, so a
/// label keeps its color in panels where other labels are missing.
#[derive(Debug, Clone)]
pub struct LabelColors<'a> {
    palette: Palette,
    indices: FxHashMap<&'a str, usize>,
}

impl<'a> LabelColors<'a> {
    /// Index the labels of `panels`.
    #[must_use]
    pub fn new(panels: &'a [Panel], palette: Palette) -> Self {
        let labels: BTreeSet<&str> = panels
            .iter()
            .flat_map(|panel| &panel.curves)
            .map(|curve| curve.label.as_str())
            .collect();
        let indices = labels
            .into_iter()
            .enumerate()
            .map(|(index, label)| (label, index))
            .collect();
        Self { palette, indices }
    }

    /// Position of `label` in the sorted union.
    #[must_use]
    pub fn index(&self, label: &str) -> Option<usize> {
        self.indices.get(label).copied()
    }

    /// Color of `label`; unknown labels take the first color.
    #[must_use]
    pub fn color(&self, label: &str) -> RGBColor {
        self.palette.color(self.index(label).unwrap_or(0))
    }
}

/// X tick label format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisFormat {
    /// Values printed as-is
    Plain,
    /// Values divided by `10^exponent`; the exponent goes into the axis
    /// description
    Scientific {
        /// Power of ten factored out of every tick
        exponent: i32,
    },
}

impl AxisFormat {
    /// Largest x that is still printed plainly.
    pub const SCIENTIFIC_THRESHOLD: f64 = 5e3;

    /// Pick the format for an axis whose largest value is `max`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn for_max(max: f64) -> Self {
        if max.is_finite() && max > Self::SCIENTIFIC_THRESHOLD {
            Self::Scientific {
                exponent: max.log10().floor() as i32,
            }
        } else {
            Self::Plain
        }
    }

    /// Tick label for `value`.
    #[must_use]
    pub fn label(self, value: f64) -> String {
        match self {
            Self::Plain => trim_float(value),
            Self::Scientific { exponent } => trim_float(value / 10f64.powi(exponent)),
        }
    }

    /// Axis description for column `name`.
    #[must_use]
    pub fn describe(self, name: &str) -> String {
        match self {
            Self::Plain => name.to_string(),
            Self::Scientific { exponent } => format!("{name} (1e{exponent})"),
        }
    }
}

/// Format with at most three decimals, dropping trailing zeros.
fn trim_float(value: f64) -> String {
    let text = format!("{value:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// Sizes in points, converted to pixels at `dpi`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotStyle {
    /// Curve line width (points)
    pub linewidth: f64,
    /// Multiplier on the base font size
    pub font_scale: f64,
    /// Output resolution
    pub dpi: u32,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            linewidth: 4.0,
            font_scale: 1.75,
            dpi: 300,
        }
    }
}

impl PlotStyle {
    fn pixels_per_point(&self) -> f64 {
        f64::from(self.dpi) / POINTS_PER_INCH
    }

    /// Pixel size of one panel.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn panel_size(&self) -> (u32, u32) {
        let dpi = f64::from(self.dpi);
        (
            (FIGURE_INCHES.0 * dpi).round() as u32,
            (FIGURE_INCHES.1 * dpi).round() as u32,
        )
    }

    /// Pixel size of an image holding `panels` stacked panels.
    #[must_use]
    pub fn image_size(&self, panels: usize) -> (u32, u32) {
        let (width, height) = self.panel_size();
        let panels = u32::try_from(panels.max(1)).unwrap_or(u32::MAX);
        (width, height.saturating_mul(panels))
    }

    /// Font size in pixels.
    #[must_use]
    pub fn font_px(&self) -> f64 {
        BASE_FONT_POINTS * self.font_scale * self.pixels_per_point()
    }

    /// Curve stroke width in pixels (at least 1).
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn stroke_px(&self) -> u32 {
        (self.linewidth * self.pixels_per_point()).round().max(1.0) as u32
    }
}

/// Curves of one value column.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    /// Value column (y-axis label)
    pub value: String,
    /// Curves sorted by label
    pub curves: Vec<Curve>,
}

/// Bounds `(x_min, x_max, y_min, y_max)` over all finite points, the
/// y range covering the sd bands.
#[must_use]
pub fn data_bounds(curves: &[Curve]) -> Option<(f64, f64, f64, f64)> {
    let mut bounds: Option<(f64, f64, f64, f64)> = None;
    for point in curves.iter().flat_map(|c| &c.points) {
        let (lower, upper) = (point.lower(), point.upper());
        if !(point.x.is_finite() && lower.is_finite() && upper.is_finite()) {
            continue;
        }
        bounds = Some(match bounds {
            None => (point.x, point.x, lower, upper),
            Some((x0, x1, y0, y1)) => (x0.min(point.x), x1.max(point.x), y0.min(lower), y1.max(upper)),
        });
    }
    bounds
}

/// Pad a range by `fraction` of its span; a degenerate range widens by 1.
fn padded(lo: f64, hi: f64, fraction: f64) -> std::ops::Range<f64> {
    let span = hi - lo;
    if span > 0.0 {
        (lo - span * fraction)..(hi + span * fraction)
    } else {
        (lo - 1.0)..(hi + 1.0)
    }
}

/// Render panels into a PNG at `path`.
///
/// Each label has one color across all panels.
///
/// # Errors
///
/// Returns `Error::InvalidInput` if there is nothing to draw, and
/// `Error::PlotError` if drawing or encoding fails.
pub fn render<P: AsRef<Path>>(panels: &[Panel], xaxis: &str, style: &PlotStyle, path: P) -> Result<()> {
    if panels.iter().all(|p| data_bounds(&p.curves).is_none()) {
        return Err(Error::InvalidInput(
            "No data to plot. Check --xaxis/--value and that the runs have rows.".to_string(),
        ));
    }

    let root = BitMapBackend::new(path.as_ref(), style.image_size(panels.len())).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let colors = LabelColors::new(panels, Palette::paired());
    for (panel, area) in panels.iter().zip(root.split_evenly((panels.len(), 1))) {
        draw_panel(&area, panel, xaxis, style, &colors)?;
    }

    root.present().map_err(plot_err)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel,
    xaxis: &str,
    style: &PlotStyle,
    colors: &LabelColors<'_>,
) -> Result<()> {
    let Some((x_min, x_max, y_min, y_max)) = data_bounds(&panel.curves) else {
        return Ok(());
    };

    let font = style.font_px();
    let row = (font * 1.4) as i32;
    let pad = (font * 0.4) as i32;
    let rows = i32::try_from(panel.curves.len()).unwrap_or(i32::MAX);
    let legend_height = rows.saturating_mul(row).saturating_add(2 * pad);
    let (legend_area, plot_area) = area.split_vertically(legend_height);
    draw_legend(&legend_area, &panel.curves, style, colors)?;

    let format = AxisFormat::for_max(x_max);
    let x_labels = |x: &f64| format.label(*x);
    let y_labels = |y: &f64| trim_float(*y);

    let mut chart = ChartBuilder::on(&plot_area)
        .margin((font * 0.5) as u32)
        .x_label_area_size((font * 2.4) as u32)
        .y_label_area_size((font * 3.6) as u32)
        .build_cartesian_2d(padded(x_min, x_max, 0.0), padded(y_min, y_max, 0.05))
        .map_err(plot_err)?;

    chart.plotting_area().fill(&DARKGRID).map_err(plot_err)?;
    chart
        .configure_mesh()
        .bold_line_style(WHITE.stroke_width(((font / 10.0) as u32).max(1)))
        .light_line_style(WHITE.mix(0.0).stroke_width(0))
        .axis_style(DARKGRID.stroke_width(1))
        .x_labels(6)
        .y_labels(6)
        .x_label_formatter(&x_labels)
        .y_label_formatter(&y_labels)
        .label_style((FONT_FAMILY, font * 0.9).into_font())
        .axis_desc_style((FONT_FAMILY, font).into_font())
        .x_desc(format.describe(xaxis))
        .y_desc(panel.value.as_str())
        .draw()
        .map_err(plot_err)?;

    let stroke = style.stroke_px();
    for curve in &panel.curves {
        let color = colors.color(&curve.label);
        let finite: Vec<_> = curve
            .points
            .iter()
            .filter(|p| p.x.is_finite() && p.lower().is_finite() && p.upper().is_finite())
            .collect();

        let band: Vec<(f64, f64)> = finite
            .iter()
            .map(|p| (p.x, p.upper()))
            .chain(finite.iter().rev().map(|p| (p.x, p.lower())))
            .collect();
        chart
            .draw_series(std::iter::once(Polygon::new(band, color.mix(0.2).filled())))
            .map_err(plot_err)?;
        chart
            .draw_series(LineSeries::new(
                finite.iter().map(|p| (p.x, p.center)),
                color.stroke_width(stroke),
            ))
            .map_err(plot_err)?;
    }

    Ok(())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn draw_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    curves: &[Curve],
    style: &PlotStyle,
    colors: &LabelColors<'_>,
) -> Result<()> {
    let font = style.font_px();
    let row = (font * 1.4) as i32;
    let pad = (font * 0.4) as i32;
    let handle = (font * 3.0) as i32;
    let (width, height) = area.dim_in_pixel();

    area.draw(&Rectangle::new(
        [(pad, 1), (width as i32 - pad, height as i32 - 1)],
        BLACK.mix(0.2).stroke_width(1),
    ))
    .map_err(plot_err)?;

    let text = (FONT_FAMILY, font)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));
    let stroke = style.stroke_px();
    let x = 2 * pad;
    for (index, curve) in curves.iter().enumerate() {
        let y = pad + row * i32::try_from(index).unwrap_or(i32::MAX) + row / 2;
        area.draw(&PathElement::new(
            vec![(x, y), (x + handle, y)],
            colors.color(&curve.label).stroke_width(stroke),
        ))
        .map_err(plot_err)?;
        area.draw(&Text::new(curve.label.clone(), (x + handle + pad, y), text.clone()))
            .map_err(plot_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::CurvePoint;

    fn curve(label: &str, points: &[(f64, f64, f64)]) -> Curve {
        Curve {
            label: label.to_string(),
            points: points
                .iter()
                .map(|&(x, center, sd)| CurvePoint {
                    x,
                    center,
                    sd,
                    count: 1,
                })
                .collect(),
        }
    }

    #[test]
    fn test_palette_cycles() {
        let palette = Palette::paired();
        assert_eq!(palette.len(), 12);
        assert_eq!(palette.color(0), RGBColor(166, 206, 227));
        assert_eq!(palette.color(1), RGBColor(31, 120, 180));
        assert_eq!(palette.color(12), palette.color(0));
    }

    #[test]
    fn test_label_colors_stable_across_panels() {
        let panels = vec![
            Panel {
                value: "Performance".to_string(),
                curves: vec![curve("ppo", &[(0.0, 1.0, 0.0)]), curve("sac", &[(0.0, 2.0, 0.0)])],
            },
            Panel {
                value: "LossPi".to_string(),
                curves: vec![curve("sac", &[(0.0, 0.5, 0.0)])],
            },
            Panel {
                value: "LossV".to_string(),
                curves: vec![curve("td3", &[(0.0, 0.5, 0.0)]), curve("a2c", &[(0.0, 0.1, 0.0)])],
            },
        ];
        let palette = Palette::paired();
        let colors = LabelColors::new(&panels, palette);

        assert_eq!(colors.index("a2c"), Some(0));
        assert_eq!(colors.index("ppo"), Some(1));
        assert_eq!(colors.index("sac"), Some(2));
        assert_eq!(colors.index("td3"), Some(3));
        assert_eq!(colors.index("her"), None);
        assert_eq!(colors.color("sac"), palette.color(2));
        assert_eq!(colors.color("her"), palette.color(0));
    }

    #[test]
    fn test_axis_format_threshold() {
        assert_eq!(AxisFormat::for_max(5000.0), AxisFormat::Plain);
        assert_eq!(
            AxisFormat::for_max(5001.0),
            AxisFormat::Scientific { exponent: 3 }
        );
        assert_eq!(
            AxisFormat::for_max(3.0e6),
            AxisFormat::Scientific { exponent: 6 }
        );
        assert_eq!(AxisFormat::for_max(f64::NAN), AxisFormat::Plain);
    }

    #[test]
    fn test_axis_labels() {
        let sci = AxisFormat::Scientific { exponent: 6 };
        assert_eq!(sci.label(1_500_000.0), "1.5");
        assert_eq!(sci.label(0.0), "0");
        assert_eq!(sci.describe("TotalEnvInteracts"), "TotalEnvInteracts (1e6)");
        assert_eq!(AxisFormat::Plain.label(4000.0), "4000");
        assert_eq!(AxisFormat::Plain.label(0.25), "0.25");
        assert_eq!(AxisFormat::Plain.describe("Epoch"), "Epoch");
    }

    #[test]
    fn test_trim_float() {
        assert_eq!(trim_float(0.1 + 0.2), "0.3");
        assert_eq!(trim_float(-0.0001), "0");
        assert_eq!(trim_float(-2.5), "-2.5");
    }

    #[test]
    fn test_style_geometry() {
        let style = PlotStyle::default();
        assert_eq!(style.panel_size(), (1920, 1440));
        assert_eq!(style.image_size(2), (1920, 2880));
        assert_eq!(style.image_size(0), (1920, 1440));
        assert!((style.font_px() - 72.916_666).abs() < 1e-3);
        assert_eq!(style.stroke_px(), 17);

        let thin = PlotStyle {
            linewidth: 0.0,
            ..PlotStyle::default()
        };
        assert_eq!(thin.stroke_px(), 1);
    }

    #[test]
    fn test_data_bounds_cover_bands() {
        let curves = vec![
            curve("a", &[(0.0, 1.0, 0.5), (10.0, 2.0, 0.0)]),
            curve("b", &[(5.0, -1.0, 1.0), (20.0, f64::NAN, 0.0)]),
        ];
        assert_eq!(data_bounds(&curves), Some((0.0, 10.0, -2.0, 2.0)));
        assert_eq!(data_bounds(&[]), None);
    }

    #[test]
    fn test_padded_degenerate_range() {
        assert_eq!(padded(3.0, 3.0, 0.05), 2.0..4.0);
        assert_eq!(padded(0.0, 10.0, 0.1), -1.0..11.0);
    }

    #[test]
    fn test_render_rejects_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let panels = vec![Panel {
            value: "Performance".to_string(),
            curves: vec![],
        }];
        let err = render(&panels, "Epoch", &PlotStyle::default(), tmp.path().join("x.png"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
