//! Raster plotting primitives and the individual plot builders.

pub mod crosssection;
pub mod horizontal;
pub mod sounding;

use std::path::Path;

use image::{Rgb, RgbImage};

use crate::error::VisError;

/// Number of filled contour bands for shaded fields
pub const NLEVELS_FILL: usize = 21;
/// Number of line contour levels for the geopotential background
pub const NLEVELS_GEO: usize = 12;
/// Keep every 5th column of wind arrows
pub const QUIVER_X_SKIP: usize = 5;
/// Keep every row of wind arrows
pub const QUIVER_Y_SKIP: usize = 1;
/// Pixels per m/s of arrow length
pub const QUIVER_SCALE: f64 = 5.0;
/// Exaggeration for vertical velocity in section arrows
pub const W_EXAG: f64 = 1000.0;

/// English month names, indexed by month number minus one
pub const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

pub const WHITE: (u8, u8, u8) = (255, 255, 255);
pub const BLACK: (u8, u8, u8) = (0, 0, 0);
pub const GREY: (u8, u8, u8) = (110, 110, 110);
pub const RED: (u8, u8, u8) = (200, 30, 30);
pub const GREEN: (u8, u8, u8) = (30, 140, 30);

/// A drawable RGB raster with the handful of primitives the plots need.
pub struct Canvas {
    pub image: RgbImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        let mut image = RgbImage::new(width, height);
        for px in image.pixels_mut() {
            *px = Rgb([WHITE.0, WHITE.1, WHITE.2]);
        }
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn set(&mut self, x: i64, y: i64, color: (u8, u8, u8)) {
        if x >= 0 && y >= 0 && (x as u32) < self.image.width() && (y as u32) < self.image.height() {
            self.image.put_pixel(x as u32, y as u32, Rgb([color.0, color.1, color.2]));
        }
    }

    pub fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: (u8, u8, u8)) {
        for y in y0.min(y1)..=y0.max(y1) {
            for x in x0.min(x1)..=x0.max(x1) {
                self.set(x, y, color);
            }
        }
    }

    /// Bresenham line.
    pub fn line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: (u8, u8, u8)) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);
        loop {
            self.set(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Line drawn with every other pixel, for reference graticules.
    pub fn dotted_line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: (u8, u8, u8)) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);
        let mut on = true;
        loop {
            if on {
                self.set(x, y, color);
            }
            on = !on;
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    pub fn rect_outline(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: (u8, u8, u8)) {
        self.line(x0, y0, x1, y0, color);
        self.line(x1, y0, x1, y1, color);
        self.line(x1, y1, x0, y1, color);
        self.line(x0, y1, x0, y0, color);
    }

    /// Arrow from (x0, y0) to (x1, y1) with a small two-stroke head.
    pub fn arrow(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: (u8, u8, u8)) {
        self.line(x0, y0, x1, y1, color);
        let dx = (x1 - x0) as f64;
        let dy = (y1 - y0) as f64;
        let len = (dx * dx + dy * dy).sqrt();
        if len < 1.0 {
            return;
        }
        let (ux, uy) = (dx / len, dy / len);
        let head = 4.0f64.min(len * 0.4);
        for sign in [1.0, -1.0] {
            // rotate the unit vector ±150° for the barbs of the head
            let angle = sign * 150.0f64.to_radians();
            let (rx, ry) = (
                ux * angle.cos() - uy * angle.sin(),
                ux * angle.sin() + uy * angle.cos(),
            );
            self.line(
                x1,
                y1,
                x1 + (rx * head).round() as i64,
                y1 + (ry * head).round() as i64,
                color,
            );
        }
    }

    pub fn disc(&mut self, cx: i64, cy: i64, radius: i64, color: (u8, u8, u8)) {
        for y in -radius..=radius {
            for x in -radius..=radius {
                if x * x + y * y <= radius * radius {
                    self.set(cx + x, cy + y, color);
                }
            }
        }
    }
}

/// A finished plot: the rendered raster plus the title text that describes
/// it. Titles are surfaced on the HTML page rather than drawn into pixels.
pub struct Figure {
    pub canvas: Canvas,
    pub title: String,
}

impl Figure {
    /// Write the raster as PNG.
    pub fn save(&self, path: &Path) -> Result<(), VisError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        self.canvas.image.save(path)?;
        Ok(())
    }
}

/// Maps data coordinates into a pixel rectangle.
///
/// The vertical axis is pressure with the conventional inversion: the
/// lowest pressure (highest altitude) sits at the top of the panel.
#[derive(Debug, Clone)]
pub struct PanelGeom {
    pub px0: i64,
    pub py0: i64,
    pub px1: i64,
    pub py1: i64,
    pub x_min: f64,
    pub x_max: f64,
    pub p_min: f64,
    pub p_max: f64,
}

impl PanelGeom {
    pub fn new(
        px0: i64,
        py0: i64,
        px1: i64,
        py1: i64,
        x: &[f64],
        pressures: &[f64],
    ) -> Self {
        let (x_min, x_max) = span(x);
        let (p_min, p_max) = span(pressures);
        Self {
            px0,
            py0,
            px1,
            py1,
            x_min,
            x_max,
            p_min,
            p_max,
        }
    }

    pub fn x_to_px(&self, x: f64) -> i64 {
        let t = if self.x_max > self.x_min {
            (x - self.x_min) / (self.x_max - self.x_min)
        } else {
            0.5
        };
        self.px0 + (t * (self.px1 - self.px0) as f64).round() as i64
    }

    /// Lowest pressure at the top.
    pub fn p_to_py(&self, p: f64) -> i64 {
        let t = if self.p_max > self.p_min {
            (p - self.p_min) / (self.p_max - self.p_min)
        } else {
            0.5
        };
        self.py0 + (t * (self.py1 - self.py0) as f64).round() as i64
    }
}

fn span(values: &[f64]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        if v.is_finite() {
            min = min.min(v);
            max = max.max(v);
        }
    }
    if !min.is_finite() {
        (0.0, 1.0)
    } else {
        (min, max)
    }
}
