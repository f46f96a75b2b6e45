//! Raster output through the `image` crate.

use std::path::{Path, PathBuf};

use image::{Rgb as Pixel, RgbImage};
use tracing::info;

use super::font::{self, GLYPH_HEIGHT};
use super::scale::{NO_DATA, Rgb, is_dark};
use super::tilemap::{GRID_COLUMNS, GRID_ROWS, TILES};
use super::{ChoroplethMap, MapSink, legend_value};
use crate::error::{PipelineError, Result};

const BACKGROUND: Rgb = [255, 255, 255];
const INK: Rgb = [40, 40, 40];
const MARGIN: u32 = 24;
const TILE_GAP: u32 = 4;
const LEGEND_BAR_HEIGHT: u32 = 18;
const LEGEND_STEPS: u32 = 256;
const LEGEND_LABEL_SCALE: u32 = 2;
const MAX_TITLE_SCALE: u32 = 3;
const MIN_TILE: u32 = TILE_GAP + 4;

/// Bottom band holding the metric name, colour bar and range labels.
const LEGEND_BAND: u32 = MARGIN
    + GLYPH_HEIGHT * LEGEND_LABEL_SCALE
    + 8
    + LEGEND_BAR_HEIGHT
    + 8
    + GLYPH_HEIGHT * LEGEND_LABEL_SCALE;

/// Smallest image that fits the tallest title, a grid of `MIN_TILE` tiles
/// and the legend without overlap.
pub const MIN_WIDTH: u32 = GRID_COLUMNS * MIN_TILE + 2 * MARGIN;
pub const MIN_HEIGHT: u32 =
    MARGIN + GLYPH_HEIGHT * MAX_TITLE_SCALE + MARGIN + GRID_ROWS * MIN_TILE + MARGIN + LEGEND_BAND;

/// Writes each map as `<dir>/<file_name>` at a fixed size.
pub struct PngSink {
    dir: PathBuf,
    width: u32,
    height: u32,
    written: Vec<PathBuf>,
}

impl PngSink {
    pub fn new(dir: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            dir: dir.into(),
            width,
            height,
            written: Vec::new(),
        }
    }

    /// Paths of the images saved so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl MapSink for PngSink {
    fn render(&mut self, map: &ChoroplethMap) -> Result<()> {
        let path = self.dir.join(&map.file_name);
        let img = draw(map, self.width, self.height)?;
        save(&img, &path)?;
        info!(path = %path.display(), states = map.values.len(), "Map image saved");
        self.written.push(path);
        Ok(())
    }
}

fn save(img: &RgbImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    img.save(path)?;
    Ok(())
}

/// Largest integer text scale that fits `text` into `max_width`, at most `preferred`.
fn fit_scale(text: &str, max_width: u32, preferred: u32) -> u32 {
    (1..=preferred)
        .rev()
        .find(|s| font::text_width(text, *s) <= max_width)
        .unwrap_or(1)
}

fn fill_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb) {
    let x_end = (x + w).min(img.width());
    let y_end = (y + h).min(img.height());
    for py in y..y_end {
        for px in x..x_end {
            img.put_pixel(px, py, Pixel(color));
        }
    }
}

fn draw_text(img: &mut RgbImage, text: &str, x: u32, y: u32, scale: u32, color: Rgb) {
    let (w, h) = img.dimensions();
    font::for_each_pixel(text, x, y, scale, |px, py| {
        if px < w && py < h {
            img.put_pixel(px, py, Pixel(color));
        }
    });
}

/// Vertical placement of the tile grid and legend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    title_scale: u32,
    grid_top: u32,
    tile: u32,
    legend_top: u32,
}

impl Layout {
    fn new(title: &str, width: u32, height: u32) -> Result<Self> {
        if width < MIN_WIDTH || height < MIN_HEIGHT {
            return Err(PipelineError::Render(format!(
                "image size {width}x{height} is below the minimum {MIN_WIDTH}x{MIN_HEIGHT}"
            )));
        }
        let inner_width = width - 2 * MARGIN;
        let title_scale = fit_scale(title, inner_width, MAX_TITLE_SCALE);
        let grid_top = MARGIN + GLYPH_HEIGHT * title_scale + MARGIN;
        let legend_top = height - LEGEND_BAND;
        let grid_bottom = legend_top - MARGIN;
        let tile = (inner_width / GRID_COLUMNS).min((grid_bottom - grid_top) / GRID_ROWS);
        Ok(Self {
            title_scale,
            grid_top,
            tile,
            legend_top,
        })
    }

    fn grid_bottom(&self) -> u32 {
        self.grid_top + self.tile * GRID_ROWS
    }
}

/// Renders the full map (title, tile grid, legend) into a new image.
pub fn draw(map: &ChoroplethMap, width: u32, height: u32) -> Result<RgbImage> {
    let layout = Layout::new(&map.title, width, height)?;
    let mut img = RgbImage::from_pixel(width, height, Pixel(BACKGROUND));

    let title_width = font::text_width(&map.title, layout.title_scale);
    draw_text(
        &mut img,
        &map.title,
        width.saturating_sub(title_width) / 2,
        MARGIN,
        layout.title_scale,
        INK,
    );

    let tile = layout.tile;
    let grid_left = (width - tile * GRID_COLUMNS) / 2;

    for (code, col, row) in TILES {
        let fill = map.color_of(code).unwrap_or(NO_DATA);
        let x = grid_left + col * tile;
        let y = layout.grid_top + row * tile;
        let side = tile - TILE_GAP;
        fill_rect(&mut img, x, y, side, side, fill);

        let label_scale = fit_scale(code, side.saturating_sub(4), (side / 20).max(1));
        let label_w = font::text_width(code, label_scale);
        let label_h = GLYPH_HEIGHT * label_scale;
        let ink = if is_dark(fill) { [255, 255, 255] } else { INK };
        draw_text(
            &mut img,
            code,
            x + side.saturating_sub(label_w) / 2,
            y + side.saturating_sub(label_h) / 2,
            label_scale,
            ink,
        );
    }

    draw_legend(&mut img, map, layout.legend_top);
    Ok(img)
}

fn draw_legend(img: &mut RgbImage, map: &ChoroplethMap, top: u32) {
    let width = img.width();
    let bar_width = (width / 2).max(LEGEND_STEPS.min(width - 2 * MARGIN));
    let bar_left = (width - bar_width) / 2;

    let label_scale = LEGEND_LABEL_SCALE;
    let metric_w = font::text_width(&map.metric, label_scale);
    draw_text(
        img,
        &map.metric,
        width.saturating_sub(metric_w) / 2,
        top,
        label_scale,
        INK,
    );

    let bar_top = top + GLYPH_HEIGHT * label_scale + 8;
    for i in 0..bar_width {
        let t = i as f64 / (bar_width - 1).max(1) as f64;
        fill_rect(img, bar_left + i, bar_top, 1, LEGEND_BAR_HEIGHT, map.scale.sample(t));
    }

    let values_top = bar_top + LEGEND_BAR_HEIGHT + 8;
    let min_label = legend_value(map.range.min);
    let max_label = legend_value(map.range.max);
    draw_text(img, &min_label, bar_left, values_top, label_scale, INK);
    let max_w = font::text_width(&max_label, label_scale);
    draw_text(
        img,
        &max_label,
        (bar_left + bar_width).saturating_sub(max_w),
        values_top,
        label_scale,
        INK,
    );
}
