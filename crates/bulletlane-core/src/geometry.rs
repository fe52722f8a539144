//! Viewport and item rectangles, and the collaborators that supply them.

use serde::{Deserialize, Serialize};

use crate::lane::ItemId;

/// Axis-aligned rectangle in stage pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x < self.right() && y >= self.top && y < self.bottom()
    }
}

/// The region bullets travel across.
///
/// `left` is the origin used to normalize item positions into progress values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[inline]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Fraction of the viewport width an x coordinate has travelled from the left edge
    #[inline]
    pub fn progress_of(&self, x: f64) -> f64 {
        if self.width <= 0.0 {
            return 1.0;
        }
        (x - self.left) / self.width
    }

    /// Number of whole lanes of `lane_height` that fit vertically
    pub fn lane_count(&self, lane_height: f64) -> usize {
        if lane_height <= 0.0 || self.height <= 0.0 {
            return 0;
        }
        (self.height / lane_height).floor() as usize
    }
}

impl From<Rect> for Viewport {
    fn from(rect: Rect) -> Self {
        Self {
            left: rect.left,
            width: rect.width,
            height: rect.height,
        }
    }
}

/// Supplies fresh geometry at decision time. Nothing is cached between calls.
pub trait GeometryProvider {
    fn viewport_rect(&self) -> Rect;

    /// Current bounding box of an item, or `None` if it has not been mounted yet
    fn item_rect(&self, id: &ItemId) -> Option<Rect>;
}

/// Off-screen measurement surface
pub trait ContentMeasure {
    fn measure_width(&self, content: &str) -> f64;
}
