//! Rasterization of normalized polygons into a single-channel binary mask,
//! and the line-per-polygon annotation text that accompanies it.
//!
//! The mask is drawn in pixel space: every normalized point is scaled by the
//! canvas size and truncated toward zero. The annotation text keeps the
//! original normalized values, one `0 x1 y1 x2 y2 ...` line per polygon.

use crate::config::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::error::{Result, ServiceError};
use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Value written into covered mask pixels
pub const FILL: u8 = u8::MAX;

/// Pixel coordinates are clamped to `[-COORD_LIMIT, COORD_LIMIT]` before
/// drawing so edge arithmetic cannot overflow
pub const COORD_LIMIT: i64 = 1 << 40;

/// Class index written at the start of every annotation line
pub const CLASS_INDEX: u32 = 0;

/// Pixel dimensions of the mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Default for Canvas {
    fn default() -> Self {
        Canvas {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
        }
    }
}

/// The default canvas size of the settings; the pixel limit is applied
/// separately through [`Canvas::validate`]
impl From<crate::config::CanvasSettings> for Canvas {
    fn from(settings: crate::config::CanvasSettings) -> Self {
        Canvas {
            width: settings.width,
            height: settings.height,
        }
    }
}

impl Canvas {
    pub fn pixels(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Reject empty canvases and ones larger than `max_pixels`
    pub fn validate(&self, max_pixels: u64) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ServiceError::invalid_canvas(format!(
                "canvas must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        if self.pixels() > max_pixels {
            return Err(ServiceError::invalid_canvas(format!(
                "canvas {}x{} exceeds the {max_pixels} pixel limit",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// A point in normalized `[0, 1]` coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Scale onto `canvas`, truncating toward zero
    pub fn to_pixel(&self, canvas: Canvas) -> (i64, i64) {
        (
            (self.x * canvas.width as f64) as i64,
            (self.y * canvas.height as f64) as i64,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<Point>,
}

impl Polygon {
    pub fn validate(&self) -> Result<()> {
        match self
            .points
            .iter()
            .position(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            Some(i) => Err(ServiceError::invalid_polygon(format!(
                "point {i} has a non-finite coordinate"
            ))),
            None => Ok(()),
        }
    }

    pub fn to_pixels(&self, canvas: Canvas) -> Vec<(i64, i64)> {
        self.points.iter().map(|p| p.to_pixel(canvas)).collect()
    }
}

/// Rasterize every polygon onto a fresh, all-zero canvas of at most
/// `max_pixels` pixels
pub fn rasterize(canvas: Canvas, max_pixels: u64, polygons: &[Polygon]) -> Result<GrayImage> {
    canvas.validate(max_pixels)?;
    let mut mask = GrayImage::new(canvas.width, canvas.height);
    for polygon in polygons {
        polygon.validate()?;
        fill_polygon(&mut mask, &polygon.to_pixels(canvas), FILL);
    }
    Ok(mask)
}

/// Fill a closed polygon given in pixel coordinates. Interior coverage uses
/// the even-odd rule on each row; the outline itself is always drawn, so
/// polygons with fewer than three vertices come out as a point or a line.
/// Everything is clipped to the mask.
pub fn fill_polygon(mask: &mut GrayImage, vertices: &[(i64, i64)], value: u8) {
    if vertices.is_empty() {
        return;
    }
    let vertices: Vec<(i64, i64)> = vertices
        .iter()
        .map(|&(x, y)| {
            (
                x.clamp(-COORD_LIMIT, COORD_LIMIT),
                y.clamp(-COORD_LIMIT, COORD_LIMIT),
            )
        })
        .collect();
    let vertices = vertices.as_slice();

    let (width, height) = (mask.width() as i64, mask.height() as i64);
    let y_min = vertices.iter().map(|v| v.1).min().unwrap_or(0).max(0);
    let y_max = vertices
        .iter()
        .map(|v| v.1)
        .max()
        .unwrap_or(0)
        .min(height - 1);

    let mut crossings: Vec<f64> = Vec::with_capacity(vertices.len());
    for y in y_min..=y_max {
        crossings.clear();
        for (i, &(x0, y0)) in vertices.iter().enumerate() {
            let (x1, y1) = vertices[(i + 1) % vertices.len()];
            // half-open so shared vertices are counted once
            let (lo, hi) = if y0 < y1 { (y0, y1) } else { (y1, y0) };
            if y0 == y1 || y < lo || y >= hi {
                continue;
            }
            let t = (y - y0) as f64 / (y1 - y0) as f64;
            crossings.push(x0 as f64 + t * (x1 - x0) as f64);
        }
        crossings.sort_by(f64::total_cmp);

        for span in crossings.chunks_exact(2) {
            let start = span[0].ceil().max(0.0) as i64;
            let end = span[1].floor().min((width - 1) as f64) as i64;
            for x in start..=end {
                mask.put_pixel(x as u32, y as u32, Luma([value]));
            }
        }
    }

    for (i, &from) in vertices.iter().enumerate() {
        let to = vertices[(i + 1) % vertices.len()];
        draw_segment(mask, from, to, value);
    }
}

/// Draw a straight segment, stepping along its major axis. Only the part
/// inside the mask is visited.
fn draw_segment(mask: &mut GrayImage, from: (i64, i64), to: (i64, i64), value: u8) {
    let (width, height) = (mask.width() as i64, mask.height() as i64);
    let mut plot = |x: i64, y: i64| {
        if (0..width).contains(&x) && (0..height).contains(&y) {
            mask.put_pixel(x as u32, y as u32, Luma([value]));
        }
    };

    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    if dx == 0 && dy == 0 {
        plot(from.0, from.1);
    } else if dx.abs() >= dy.abs() {
        let lo = from.0.min(to.0).max(0);
        let hi = from.0.max(to.0).min(width - 1);
        for x in lo..=hi {
            let y = from.1 as f64 + (x - from.0) as f64 * dy as f64 / dx as f64;
            plot(x, y.round() as i64);
        }
    } else {
        let lo = from.1.min(to.1).max(0);
        let hi = from.1.max(to.1).min(height - 1);
        for y in lo..=hi {
            let x = from.0 as f64 + (y - from.1) as f64 * dx as f64 / dy as f64;
            plot(x.round() as i64, y);
        }
    }
}

/// One annotation line per polygon, in submission order
pub fn annotation_lines(polygons: &[Polygon]) -> String {
    let mut out = String::new();
    for polygon in polygons {
        let _ = write!(out, "{CLASS_INDEX}");
        for p in &polygon.points {
            let _ = write!(out, " {:?} {:?}", p.x, p.y);
        }
        out.push('\n');
    }
    out
}
