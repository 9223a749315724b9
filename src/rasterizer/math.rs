//! Vector math and perspective projection

use std::ops::Add;
use serde::{Deserialize, Serialize};

use super::types::{Camera, Triangle};

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

/// Integer pixel position of a projected vertex. Only valid for the frame it
/// was computed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Pinhole projection of one vertex onto a `width` x `height` pixel grid.
///
/// The vertex is offset by the display centre, divided by depth and scaled
/// by the focal length, then mapped from sensor units to pixels and
/// re-centred. Nothing guards `z <= 0`: such vertices come out as garbage
/// (saturated) coordinates and it is up to the caller to keep geometry in
/// front of the camera.
pub fn project(v: Vec3, camera: &Camera, width: usize, height: usize) -> ScreenPoint {
    let half_w = (width / 2) as f32;
    let half_h = (height / 2) as f32;

    let iz = 1.0 / v.z;
    let vx = (v.x - half_w) * camera.focal_length * iz;
    let vy = (v.y - half_h) * camera.focal_length * iz;

    // Viewport to screen
    let vp2screen = width as f32 / camera.sensor_width;
    ScreenPoint {
        x: ((vx * vp2screen).floor() as i32).saturating_add(half_w as i32),
        y: ((vy * vp2screen).floor() as i32).saturating_add(half_h as i32),
    }
}

/// Project every triangle of a scene, three points per triangle, into `out`.
pub fn project_triangles(
    triangles: &[Triangle],
    camera: &Camera,
    width: usize,
    height: usize,
    out: &mut Vec<ScreenPoint>,
) {
    out.clear();
    out.reserve(triangles.len() * 3);
    for t in triangles {
        out.push(project(t.p0, camera, width, height));
        out.push(project(t.p1, camera, width, height));
        out.push(project(t.p2, camera, width, height));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centre_projects_to_centre() {
        let cam = Camera::default();
        let p = project(Vec3::new(200.0, 120.0, 10.0), &cam, 400, 240);
        assert_eq!(p, ScreenPoint::new(200, 120));
    }

    #[test]
    fn test_projection_scales_with_focal_length_and_depth() {
        let cam = Camera::default();
        // (10 * 35 / 32) * (400 / 25) = 175
        let p = project(Vec3::new(210.0, 110.0, 32.0), &cam, 400, 240);
        assert_eq!(p, ScreenPoint::new(375, -55));
    }

    #[test]
    fn test_projection_floors_negative_offsets() {
        let cam = Camera {
            sensor_width: 400.0,
            focal_length: 1.0,
        };
        // x' = -0.5 -> floor -1
        let p = project(Vec3::new(199.0, 120.0, 2.0), &cam, 400, 240);
        assert_eq!(p.x, 199);
    }

    #[test]
    fn test_vertex_behind_camera_does_not_panic() {
        let cam = Camera::default();
        let _ = project(Vec3::new(10.0, 10.0, 0.0), &cam, 400, 240);
        let _ = project(Vec3::new(10.0, 10.0, -1.0), &cam, 400, 240);
    }

    #[test]
    fn test_project_triangles_reuses_scratch() {
        let cam = Camera::default();
        let t = Triangle::new(
            Vec3::new(200.0, 120.0, 10.0),
            Vec3::new(200.0, 120.0, 10.0),
            Vec3::new(200.0, 120.0, 10.0),
            90,
        );
        let mut scratch = vec![ScreenPoint::default(); 12];
        project_triangles(&[t], &cam, 400, 240, &mut scratch);
        assert_eq!(scratch.len(), 3);
        assert!(scratch.iter().all(|p| *p == ScreenPoint::new(200, 120)));
    }
}
