//! # Procedural Base Shapes
//!
//! Every instanced batch in the scene shares one of a handful of unit shapes.
//! Instance transforms stretch these into walls, floors, puddles and stains,
//! so no model files are needed.
//!
//! ## Supported Primitives
//!
//! - **Cube**: unit cube centred at the origin (walls, fixtures, bands)
//! - **Plane**: unit quad in the XY plane facing +Z (floors, stains)
//! - **Disc**: unit-diameter disc in the XY plane facing +Z (puddles)
//!
//! ## Usage
//!
//! ```rust
//! use floodview::gfx::geometry::{generate_cube, generate_disc, MeshKind};
//!
//! let cube = generate_cube();
//! assert_eq!(cube.triangle_count(), 12);
//!
//! let puddle = MeshKind::Disc.geometry();
//! assert!(puddle.vertex_count() > 3);
//! # let _ = generate_disc(8);
//! ```

pub mod primitives;

pub use primitives::*;

use crate::gfx::scene::vertex::Vertex3D;

/// Segment count used for the shared disc mesh
pub const DISC_SEGMENTS: u32 = 24;

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Interleaves positions and normals into the renderer's vertex format
    pub fn to_scene_format(&self) -> (Vec<Vertex3D>, Vec<u32>) {
        let vertices = self
            .vertices
            .iter()
            .enumerate()
            .map(|(i, position)| {
                Vertex3D::new(*position, self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]))
            })
            .collect();

        (vertices, self.indices.clone())
    }
}

/// Base shape shared by all instances of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeshKind {
    Cube,
    Plane,
    Disc,
}

impl MeshKind {
    pub const ALL: [MeshKind; 3] = [MeshKind::Cube, MeshKind::Plane, MeshKind::Disc];

    pub fn geometry(&self) -> GeometryData {
        match self {
            MeshKind::Cube => generate_cube(),
            MeshKind::Plane => generate_plane(),
            MeshKind::Disc => generate_disc(DISC_SEGMENTS),
        }
    }
}
