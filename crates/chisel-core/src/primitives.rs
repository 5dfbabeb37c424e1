//! Primitive builders
//!
//! Base cages for new meshes and the ground grid. All primitives are centered
//! at the origin with a unit extent unless stated otherwise.

use std::f32::consts::TAU;

use glam::Vec3;

use crate::mesh::{Face, Geometry};

/// Unit cube, six quads
pub fn cube() -> Geometry {
    let positions = vec![
        Vec3::new(-0.5, -0.5, -0.5),
        Vec3::new(0.5, -0.5, -0.5),
        Vec3::new(0.5, 0.5, -0.5),
        Vec3::new(-0.5, 0.5, -0.5),
        Vec3::new(-0.5, -0.5, 0.5),
        Vec3::new(0.5, -0.5, 0.5),
        Vec3::new(0.5, 0.5, 0.5),
        Vec3::new(-0.5, 0.5, 0.5),
    ];
    let faces = vec![
        Face::Quad([4, 5, 6, 7]),
        Face::Quad([1, 0, 3, 2]),
        Face::Quad([0, 4, 7, 3]),
        Face::Quad([5, 1, 2, 6]),
        Face::Quad([7, 6, 2, 3]),
        Face::Quad([0, 1, 5, 4]),
    ];
    build(positions, faces)
}

/// Closed cylinder of radius 0.5 along Y, side quads and triangle-fan caps
pub fn cylinder(segments: u32) -> Geometry {
    let segments = segments.max(3);
    let mut positions = Vec::with_capacity(segments as usize * 2 + 2);

    for i in 0..segments {
        let angle = TAU * i as f32 / segments as f32;
        let (sin, cos) = angle.sin_cos();
        positions.push(Vec3::new(cos * 0.5, -0.5, sin * 0.5));
        positions.push(Vec3::new(cos * 0.5, 0.5, sin * 0.5));
    }
    let bottom_center = positions.len() as u32;
    positions.push(Vec3::new(0.0, -0.5, 0.0));
    let top_center = positions.len() as u32;
    positions.push(Vec3::new(0.0, 0.5, 0.0));

    let mut faces = Vec::with_capacity(segments as usize * 3);
    for i in 0..segments {
        let j = (i + 1) % segments;
        let (b0, t0, b1, t1) = (2 * i, 2 * i + 1, 2 * j, 2 * j + 1);
        faces.push(Face::Quad([b0, t0, t1, b1]));
        faces.push(Face::Tri([bottom_center, b0, b1]));
        faces.push(Face::Tri([top_center, t1, t0]));
    }

    build(positions, faces)
}

/// Flat XZ grid of `divisions` x `divisions` quads spanning `size`
pub fn grid(size: f32, divisions: u32) -> Geometry {
    let divisions = divisions.max(1);
    let row = divisions + 1;
    let half = size * 0.5;
    let step = size / divisions as f32;

    let mut positions = Vec::with_capacity((row * row) as usize);
    for z in 0..row {
        for x in 0..row {
            positions.push(Vec3::new(-half + x as f32 * step, 0.0, -half + z as f32 * step));
        }
    }

    let mut faces = Vec::with_capacity((divisions * divisions) as usize);
    for z in 0..divisions {
        for x in 0..divisions {
            let i0 = z * row + x;
            faces.push(Face::Quad([i0, i0 + row, i0 + row + 1, i0 + 1]));
        }
    }

    build(positions, faces)
}

fn build(positions: Vec<Vec3>, faces: Vec<Face>) -> Geometry {
    debug_assert!(Geometry::new(positions.clone(), faces.clone()).is_ok());
    Geometry::from_parts(positions, faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Aabb;

    #[test]
    fn test_cube() {
        let cube = cube();
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.face_count(), 6);
        assert_eq!(cube.bounds(), Aabb::unit());
    }

    #[test]
    fn test_cylinder() {
        let cylinder = cylinder(16);
        assert_eq!(cylinder.vertex_count(), 34);
        assert_eq!(cylinder.face_count(), 48);
        assert!((cylinder.bounds().size().y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cylinder_minimum_segments() {
        assert_eq!(cylinder(1).face_count(), 9);
    }

    #[test]
    fn test_grid() {
        let grid = grid(10.0, 4);
        assert_eq!(grid.vertex_count(), 25);
        assert_eq!(grid.face_count(), 16);
        let bounds = grid.bounds();
        assert_eq!(bounds.min, Vec3::new(-5.0, 0.0, -5.0));
        assert_eq!(bounds.max, Vec3::new(5.0, 0.0, 5.0));
    }
}
