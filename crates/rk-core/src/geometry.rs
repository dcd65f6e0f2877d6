//! Logical 2-D geometry for hit-testing
//!
//! Coordinates are reel-local pixels with y growing downwards.

use serde::{Deserialize, Serialize};

/// A point in reel-local space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Treat `p` as a 1×1 box and test overlap with this rectangle.
    ///
    /// The unit box gives one pixel of tolerance on the near edge, which
    /// matches the reel's whole-pixel alignment.
    #[inline]
    pub fn meets(&self, p: Point) -> bool {
        let meets_y = p.y < self.bottom() && p.y + 1.0 > self.y;
        let meets_x = p.x < self.right() && p.x + 1.0 > self.x;
        meets_x && meets_y
    }

    /// True when the two rectangles share interior area
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}
