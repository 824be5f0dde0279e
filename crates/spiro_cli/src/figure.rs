//! Figure description files
//!
//! A figure is a set of polylines and text labels in data coordinates,
//! loaded from TOML and drawn onto a canvas scaled to fit:
//!
//! ```toml
//! size = [800, 800]
//! face_color = "#1a1a1a"
//!
//! [title]
//! text = "Hypotrochoid"
//! size = 24.0
//!
//! [[lines]]
//! points = [[0.0, 0.0], [1.0, 1.0]]
//! color = "#00ffff"
//! line_width = 1.5
//! style = "dashed"
//! ```

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::Deserialize;
use spiro_canvas::prelude::*;
use spiro_canvas::FontId;

// ============================================================================
// Colors
// ============================================================================

/// Color written as a `#RRGGBB` or `#RRGGBBAA` string
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct HexColor(pub Color);

impl TryFrom<String> for HexColor {
    type Error = spiro_core::CoreError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Color::from_str(&value).map(HexColor)
    }
}

impl From<Color> for HexColor {
    fn from(color: Color) -> Self {
        HexColor(color)
    }
}

// ============================================================================
// Figure model
// ============================================================================

/// Dash pattern of a line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    DashDot,
}

impl LineStyle {
    /// Alternating on/off lengths in units of the line width
    fn pattern(self) -> &'static [f32] {
        match self {
            LineStyle::Solid => &[],
            LineStyle::Dashed => &[6.0, 4.0],
            LineStyle::Dotted => &[1.0, 3.0],
            LineStyle::DashDot => &[6.0, 3.0, 1.0, 3.0],
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl From<HorizontalAlign> for TextAlign {
    fn from(align: HorizontalAlign) -> Self {
        match align {
            HorizontalAlign::Left => TextAlign::Left,
            HorizontalAlign::Center => TextAlign::Center,
            HorizontalAlign::Right => TextAlign::Right,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalAlign {
    Top,
    Middle,
    #[default]
    Bottom,
    Baseline,
}

impl From<VerticalAlign> for TextBaseline {
    fn from(align: VerticalAlign) -> Self {
        match align {
            VerticalAlign::Top => TextBaseline::Top,
            VerticalAlign::Middle => TextBaseline::Middle,
            VerticalAlign::Bottom => TextBaseline::Bottom,
            VerticalAlign::Baseline => TextBaseline::Alphabetic,
        }
    }
}

/// A polyline in data coordinates
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LineArtist {
    pub points: Vec<[f32; 2]>,
    pub color: HexColor,
    pub line_width: f32,
    pub style: LineStyle,
    pub cap: LineCap,
    pub join: LineJoin,
}

impl Default for LineArtist {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            color: Color::rgb(0.0, 0.5, 1.0).into(),
            line_width: 1.0,
            style: LineStyle::Solid,
            cap: LineCap::Round,
            join: LineJoin::Round,
        }
    }
}

impl LineArtist {
    fn pen(&self) -> Pen {
        Pen::new(self.line_width)
            .with_cap(self.cap)
            .with_join(self.join)
            .with_miter_limit(10.0)
    }
}

/// A text label anchored at a data-space position
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TextArtist {
    pub text: String,
    pub position: [f32; 2],
    pub color: HexColor,
    pub size: f32,
    pub h_align: HorizontalAlign,
    pub v_align: VerticalAlign,
}

impl Default for TextArtist {
    fn default() -> Self {
        Self {
            text: String::new(),
            position: [0.0, 0.0],
            color: Color::BLACK.into(),
            size: 12.0,
            h_align: HorizontalAlign::Left,
            v_align: VerticalAlign::Bottom,
        }
    }
}

/// Title centered above the plot area
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TitleConfig {
    pub text: String,
    pub color: HexColor,
    pub size: f32,
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            text: String::new(),
            color: Color::WHITE.into(),
            size: 20.0,
        }
    }
}

/// Background grid over the data bounds
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub visible: bool,
    pub color: HexColor,
    pub style: LineStyle,
    pub line_width: f32,
    /// Cells along each axis
    pub divisions: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            visible: false,
            color: Color::rgba(0.5, 0.5, 0.5, 0.5).into(),
            style: LineStyle::Dashed,
            line_width: 1.0,
            divisions: 10,
        }
    }
}

/// A complete figure
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Figure {
    /// Output size in pixels
    pub size: [u32; 2],
    pub face_color: HexColor,
    pub title: Option<TitleConfig>,
    /// Font used for the title and labels
    pub font: Option<String>,
    /// Empty border around the plot, in pixels
    pub margin: f32,
    pub lines: Vec<LineArtist>,
    pub texts: Vec<TextArtist>,
    pub grid: GridConfig,
}

impl Default for Figure {
    fn default() -> Self {
        Self {
            size: [800, 800],
            face_color: Color::rgb(0.1, 0.1, 0.1).into(),
            title: None,
            font: None,
            margin: 40.0,
            lines: Vec::new(),
            texts: Vec::new(),
            grid: GridConfig::default(),
        }
    }
}

impl Figure {
    /// Load a figure from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Canvas configuration for rendering this figure
    pub fn canvas_config(&self) -> CanvasConfig {
        let title = self
            .title
            .as_ref()
            .map_or("Spiro figure", |t| t.text.as_str());
        CanvasConfig::new(title)
            .size(self.size[0].max(1), self.size[1].max(1))
            .vsync(false)
            .background(self.face_color.0)
    }

    /// Bounds of every line point, in data coordinates
    pub fn data_bounds(&self) -> Option<Rect> {
        let points: Vec<Point> = self
            .lines
            .iter()
            .flat_map(|line| line.points.iter())
            .map(|&[x, y]| Point::new(x, y))
            .collect();
        Rect::bounding(&points)
    }
}

// ============================================================================
// Data-to-pixel mapping
// ============================================================================

/// Uniform scale from data space into the plot area, y pointing up
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DataFit {
    scale: f32,
    data_center: Point,
    pixel_center: Point,
}

impl DataFit {
    /// Fit `data` inside `size` minus `margin` on every side, keeping the
    /// aspect ratio
    pub fn new(data: Rect, size: Size, margin: f32) -> Self {
        let avail_w = (size.width - 2.0 * margin).max(1.0);
        let avail_h = (size.height - 2.0 * margin).max(1.0);

        let sx = (data.width() > 0.0).then(|| avail_w / data.width());
        let sy = (data.height() > 0.0).then(|| avail_h / data.height());
        let scale = match (sx, sy) {
            (Some(sx), Some(sy)) => sx.min(sy),
            (Some(s), None) | (None, Some(s)) => s,
            (None, None) => 1.0,
        };

        Self {
            scale,
            data_center: Point::new(
                data.x() + data.width() / 2.0,
                data.y() + data.height() / 2.0,
            ),
            pixel_center: Point::new(size.width / 2.0, size.height / 2.0),
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn map(&self, [x, y]: [f32; 2]) -> Point {
        Point::new(
            self.pixel_center.x + (x - self.data_center.x) * self.scale,
            self.pixel_center.y - (y - self.data_center.y) * self.scale,
        )
    }
}

// ============================================================================
// Dashing
// ============================================================================

/// Split a polyline into the "on" runs of a dash pattern
///
/// `pattern` alternates on and off lengths in pixels. An empty pattern
/// returns the polyline unchanged.
pub fn dash_polyline(points: &[Point], pattern: &[f32]) -> Vec<Vec<Point>> {
    if pattern.is_empty() || pattern.iter().all(|&len| len <= 0.0) {
        return vec![points.to_vec()];
    }

    let mut runs = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    let mut index = 0;
    let mut remaining = pattern[0];
    let mut on = true;

    for segment in points.windows(2) {
        let (mut start, end) = (segment[0], segment[1]);
        let mut length = (end - start).length();
        if on && current.is_empty() {
            current.push(start);
        }

        while length > remaining {
            let dir = (end - start).normalize();
            let split = start + dir * remaining;
            length -= remaining;
            start = split;

            if on {
                current.push(split);
                runs.push(std::mem::take(&mut current));
            } else {
                current.push(split);
            }
            on = !on;
            index = (index + 1) % pattern.len();
            remaining = pattern[index];
        }

        remaining -= length;
        if on {
            current.push(end);
        }
    }

    if on && current.len() >= 2 {
        runs.push(current);
    }
    runs
}

// ============================================================================
// Drawing
// ============================================================================

/// Draw `figure` onto `canvas` inside an open frame
///
/// Text is skipped when `font` is `None`.
pub fn draw_figure<B: GpuBackend>(canvas: &mut Canvas<B>, figure: &Figure, font: Option<FontId>) {
    let size = canvas.size();
    let Some(bounds) = figure.data_bounds() else {
        tracing::warn!("Figure has no line data");
        draw_title(canvas, figure, font);
        return;
    };
    let fit = DataFit::new(bounds, size, figure.margin);

    if figure.grid.visible {
        draw_grid(canvas, &figure.grid, bounds, &fit);
    }

    for line in &figure.lines {
        let points: Vec<Point> = line.points.iter().map(|&p| fit.map(p)).collect();
        stroke_styled(canvas, &points, line.pen(), line.color.0, line.style);
    }

    if let Some(font) = font {
        for label in &figure.texts {
            let anchor = fit.map(label.position);
            canvas.set_font(Some(font), label.size);
            canvas.set_color(label.color.0);
            canvas.draw_text_aligned(
                &label.text,
                anchor.x,
                anchor.y,
                label.h_align.into(),
                label.v_align.into(),
            );
        }
    } else if !figure.texts.is_empty() {
        tracing::warn!("No font available, skipping {} labels", figure.texts.len());
    }

    draw_title(canvas, figure, font);
}

fn draw_title<B: GpuBackend>(canvas: &mut Canvas<B>, figure: &Figure, font: Option<FontId>) {
    let (Some(title), Some(font)) = (&figure.title, font) else {
        return;
    };
    let width = canvas.size().width;
    canvas.set_font(Some(font), title.size);
    canvas.set_color(title.color.0);
    canvas.draw_text_aligned(
        &title.text,
        width / 2.0,
        figure.margin / 2.0,
        TextAlign::Center,
        TextBaseline::Middle,
    );
}

fn draw_grid<B: GpuBackend>(canvas: &mut Canvas<B>, grid: &GridConfig, bounds: Rect, fit: &DataFit) {
    let divisions = grid.divisions.max(1);
    let pen = Pen::new(grid.line_width);

    for i in 0..=divisions {
        let t = i as f32 / divisions as f32;
        let x = bounds.x() + bounds.width() * t;
        let y = bounds.y() + bounds.height() * t;

        let vertical = [fit.map([x, bounds.y()]), fit.map([x, bounds.max_y()])];
        let horizontal = [fit.map([bounds.x(), y]), fit.map([bounds.max_x(), y])];
        stroke_styled(canvas, &vertical, pen, grid.color.0, grid.style);
        stroke_styled(canvas, &horizontal, pen, grid.color.0, grid.style);
    }
}

fn stroke_styled<B: GpuBackend>(
    canvas: &mut Canvas<B>,
    points: &[Point],
    pen: Pen,
    color: Color,
    style: LineStyle,
) {
    let unit = pen.line_width.max(1.0);
    let pattern: Vec<f32> = style.pattern().iter().map(|len| len * unit).collect();

    let pen = canvas.create_pen(pen);
    canvas.save();
    canvas.set_pen(Some(pen));
    canvas.set_color(color);

    for run in dash_polyline(points, &pattern) {
        let path = canvas.create_path();
        for (i, p) in run.iter().enumerate() {
            if i == 0 {
                canvas.path_move_to(path, p.x, p.y);
            } else {
                canvas.path_line_to(path, p.x, p.y);
            }
        }
        canvas.stroke_path(path);
        canvas.destroy_path(path);
    }

    canvas.restore();
    canvas.destroy_pen(pen);
}
