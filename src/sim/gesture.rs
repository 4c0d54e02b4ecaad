//! Swipe gesture tracking
//!
//! Keeps a short polyline of the most recent pointer samples. Oldest points
//! fall off the front once the path is full.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Bounded FIFO of recent pointer points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwipePath {
    points: Vec<Vec2>,
    capacity: usize,
}

impl SwipePath {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Append a point, evicting from the front while over capacity
    pub fn push(&mut self, point: Vec2) {
        self.points.push(point);
        if self.points.len() > self.capacity {
            let excess = self.points.len() - self.capacity;
            self.points.drain(..excess);
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drawable points; empty with fewer than two
    pub fn drawable(&self) -> &[Vec2] {
        if self.points.len() < 2 {
            &[]
        } else {
            &self.points
        }
    }
}

/// Pointer stroke state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureTracker {
    path: SwipePath,
    stroke_active: bool,
}

impl GestureTracker {
    pub fn new(capacity: usize) -> Self {
        Self {
            path: SwipePath::new(capacity),
            stroke_active: false,
        }
    }

    /// Start a new stroke at `point`
    pub fn on_pointer_down(&mut self, point: Vec2) {
        self.path.clear();
        self.path.push(point);
        self.stroke_active = true;
    }

    pub fn on_pointer_move(&mut self, point: Vec2) {
        self.path.push(point);
    }

    /// End the stroke. The path is left for the renderer to fade.
    pub fn on_pointer_up(&mut self) {
        self.stroke_active = false;
    }

    pub fn is_stroke_active(&self) -> bool {
        self.stroke_active
    }

    /// Path to draw and hit-test; empty with fewer than two points
    pub fn current_path(&self) -> &[Vec2] {
        self.path.drawable()
    }

    /// Raw point count, including a lone touch-down point
    pub fn point_count(&self) -> usize {
        self.path.len()
    }
}
