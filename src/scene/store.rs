//! Ordered triangle store
//!
//! Indices here are 0-based. Draw order is insertion order: later triangles
//! overwrite earlier ones where they overlap.

use crate::rasterizer::{Camera, Triangle, WHITE};

#[derive(Debug, Clone)]
pub struct Scene {
    triangles: Vec<Triangle>,
    background: i8,
    camera: Camera,
}

impl Scene {
    pub fn new() -> Self {
        Self::with_camera(Camera::default())
    }

    pub fn with_camera(camera: Camera) -> Self {
        Self {
            triangles: Vec::new(),
            background: WHITE,
            camera,
        }
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Triangle> {
        self.triangles.get(index)
    }

    /// Append a triangle, returning its index
    pub fn push(&mut self, triangle: Triangle) -> usize {
        let idx = self.triangles.len();
        self.triangles.push(triangle);
        idx
    }

    /// Replace the triangle at `index`. Out of range does nothing and
    /// returns false.
    pub fn update(&mut self, index: usize, triangle: Triangle) -> bool {
        match self.triangles.get_mut(index) {
            Some(slot) => {
                *slot = triangle;
                true
            }
            None => false,
        }
    }

    /// Remove the triangle at `index`, keeping the order of the rest. Out of
    /// range does nothing.
    pub fn remove(&mut self, index: usize) -> Option<Triangle> {
        if index >= self.triangles.len() {
            return None;
        }
        let removed = self.triangles.remove(index);
        let cap = self.triangles.capacity();
        if self.triangles.len() <= cap / 4 {
            self.triangles.shrink_to(cap / 2);
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.triangles.clear();
        self.triangles.shrink_to_fit();
    }

    pub fn background(&self) -> i8 {
        self.background
    }

    pub fn set_background(&mut self, shade: i8) {
        self.background = shade;
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
