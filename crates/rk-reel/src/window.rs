//! Slot windows — fixed hit-test zones over the reel's visible area

use rk_core::{Point, Rect};
use serde::{Deserialize, Serialize};

use crate::config::ReelGeometry;

/// One fixed, non-rendered zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotWindow {
    /// Position in the stack, 0 = top
    pub index: usize,
    pub rect: Rect,
}

impl SlotWindow {
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        self.rect.meets(p)
    }
}

/// Immutable stack of windows covering the visible height
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSet {
    windows: Vec<SlotWindow>,
}

impl WindowSet {
    /// Stack `window_count` equal windows from y = 0 down to the visible height
    pub fn stacked(geometry: &ReelGeometry) -> Self {
        let count = geometry.window_count;
        let height = if count == 0 {
            0.0
        } else {
            geometry.visible_height() / count as f64
        };

        let windows = (0..count)
            .map(|index| SlotWindow {
                index,
                rect: Rect::new(0.0, index as f64 * height, geometry.slot_width, height),
            })
            .collect();

        Self { windows }
    }

    /// Build from explicit rectangles (layout-driven placement)
    pub fn from_rects(rects: impl IntoIterator<Item = Rect>) -> Self {
        let windows = rects
            .into_iter()
            .enumerate()
            .map(|(index, rect)| SlotWindow { index, rect })
            .collect();
        Self { windows }
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SlotWindow> {
        self.windows.iter()
    }

    /// No two windows share interior area
    pub fn is_disjoint(&self) -> bool {
        self.windows.iter().enumerate().all(|(i, a)| {
            self.windows[i + 1..]
                .iter()
                .all(|b| !a.rect.overlaps(&b.rect))
        })
    }
}
