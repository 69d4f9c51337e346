use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in scene coordinates (y grows upwards).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    pub fn min(&self) -> Vec2 {
        self.origin
    }

    pub fn max(&self) -> Vec2 {
        self.origin + self.size
    }

    pub fn mid(&self) -> Vec2 {
        self.origin + self.size * 0.5
    }

    /// Inclusive on every edge, so a point on a shared border hits both rects.
    pub fn contains(&self, point: Vec2) -> bool {
        let min = self.min().min(self.max());
        let max = self.min().max(self.max());
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }
}
