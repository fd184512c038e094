//! On-screen reel geometry

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in stage coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Placement of the reel strip on stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReelLayout {
    /// Left edge of reel 0
    pub origin_x: f64,
    /// Top edge of the visible window
    pub origin_y: f64,
    pub reel_width: f64,
    pub symbol_height: f64,
    /// Horizontal space between adjacent reels
    pub reel_gap: f64,
}

impl ReelLayout {
    /// Visible window of one reel
    pub fn reel_rect(&self, index: usize, rows: usize) -> Rect {
        Rect::new(
            self.origin_x + index as f64 * (self.reel_width + self.reel_gap),
            self.origin_y,
            self.reel_width,
            rows as f64 * self.symbol_height,
        )
    }

    /// Bounding box of all reels
    pub fn bounds(&self, reels: usize, rows: usize) -> Rect {
        let width = if reels == 0 {
            0.0
        } else {
            reels as f64 * self.reel_width + (reels - 1) as f64 * self.reel_gap
        };
        Rect::new(
            self.origin_x,
            self.origin_y,
            width,
            rows as f64 * self.symbol_height,
        )
    }
}

impl Default for ReelLayout {
    fn default() -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            reel_width: 120.0,
            symbol_height: 100.0,
            reel_gap: 10.0,
        }
    }
}
