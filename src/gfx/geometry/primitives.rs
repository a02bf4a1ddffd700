//! # Primitive Shape Generation
//!
//! Unit shapes centred at the origin with outward normals. Flat shapes lie in
//! the XY plane facing +Z; the scene builder rotates them to lie on the floor.

use super::GeometryData;
use std::f32::consts::PI;

/// Generate a unit cube centered at the origin
///
/// Vertices span -0.5 to 0.5 on all axes, four per face so each face keeps a
/// flat normal.
pub fn generate_cube() -> GeometryData {
    let mut data = GeometryData::new();

    #[rustfmt::skip]
    let positions = [
        // Front face
        [-0.5, -0.5,  0.5], [ 0.5, -0.5,  0.5], [ 0.5,  0.5,  0.5], [-0.5,  0.5,  0.5],
        // Back face
        [ 0.5, -0.5, -0.5], [-0.5, -0.5, -0.5], [-0.5,  0.5, -0.5], [ 0.5,  0.5, -0.5],
        // Left face
        [-0.5, -0.5, -0.5], [-0.5, -0.5,  0.5], [-0.5,  0.5,  0.5], [-0.5,  0.5, -0.5],
        // Right face
        [ 0.5, -0.5,  0.5], [ 0.5, -0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5,  0.5,  0.5],
        // Top face
        [-0.5,  0.5,  0.5], [ 0.5,  0.5,  0.5], [ 0.5,  0.5, -0.5], [-0.5,  0.5, -0.5],
        // Bottom face
        [-0.5, -0.5, -0.5], [ 0.5, -0.5, -0.5], [ 0.5, -0.5,  0.5], [-0.5, -0.5,  0.5],
    ];

    let face_normals = [
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [-1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
    ];

    data.vertices = positions.to_vec();
    data.normals = face_normals
        .iter()
        .flat_map(|normal| std::iter::repeat(*normal).take(4))
        .collect();

    for face in 0..6u32 {
        let base = face * 4;
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    data
}

/// Generate a unit quad in the XY plane
///
/// Spans -0.5 to 0.5 on X and Y with its normal along +Z.
pub fn generate_plane() -> GeometryData {
    let mut data = GeometryData::new();

    data.vertices = vec![
        [-0.5, -0.5, 0.0],
        [0.5, -0.5, 0.0],
        [0.5, 0.5, 0.0],
        [-0.5, 0.5, 0.0],
    ];
    data.normals = vec![[0.0, 0.0, 1.0]; 4];
    data.indices = vec![0, 1, 2, 2, 3, 0];

    data
}

/// Generate a disc of diameter 1 in the XY plane
///
/// # Arguments
/// * `segments` - Number of rim segments (at least 3)
pub fn generate_disc(segments: u32) -> GeometryData {
    let mut data = GeometryData::new();
    let segs = segments.max(3);

    data.vertices.push([0.0, 0.0, 0.0]);
    data.normals.push([0.0, 0.0, 1.0]);

    for i in 0..segs {
        let angle = i as f32 * 2.0 * PI / segs as f32;
        data.vertices.push([0.5 * angle.cos(), 0.5 * angle.sin(), 0.0]);
        data.normals.push([0.0, 0.0, 1.0]);
    }

    for i in 0..segs {
        let current = 1 + i;
        let next = 1 + (i + 1) % segs;
        data.indices.extend_from_slice(&[0, current, next]);
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_generation() {
        let cube = generate_cube();
        assert_eq!(cube.vertices.len(), 24); // 6 faces * 4 vertices
        assert_eq!(cube.normals.len(), 24);
        assert_eq!(cube.indices.len(), 36); // 6 faces * 2 triangles * 3 indices
        assert_eq!(cube.triangle_count(), 12);
    }

    #[test]
    fn test_plane_generation() {
        let plane = generate_plane();
        assert_eq!(plane.vertex_count(), 4);
        assert_eq!(plane.triangle_count(), 2);
        assert!(plane.vertices.iter().all(|v| v[2] == 0.0));
    }

    #[test]
    fn test_disc_generation() {
        let disc = generate_disc(16);
        assert_eq!(disc.vertex_count(), 17);
        assert_eq!(disc.triangle_count(), 16);
        for v in disc.vertices.iter().skip(1) {
            let r = (v[0] * v[0] + v[1] * v[1]).sqrt();
            assert!((r - 0.5).abs() < 1e-5);
        }

        // Degenerate segment counts are raised to a triangle
        assert_eq!(generate_disc(1).triangle_count(), 3);
    }
}
