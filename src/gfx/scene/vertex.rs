//! Per-vertex data of the unit shapes (cube, plane, disc).
//!
//! Locations 0 and 1 belong to the mesh. Instance attributes start at
//! [`FIRST_INSTANCE_LOCATION`].

use bytemuck::{Pod, Zeroable};

/// First shader location free for instance attributes
pub const FIRST_INSTANCE_LOCATION: u32 = 2;

/// Mesh vertex: object-space position and unit normal.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex3D {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex3D {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }

    /// Slot 0 layout, stepped per vertex
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_is_tightly_packed() {
        let layout = Vertex3D::desc();
        assert_eq!(layout.array_stride, 24);
        assert_eq!(layout.attributes[1].offset, 12);
        let last = layout.attributes.iter().map(|a| a.shader_location).max();
        assert_eq!(last, Some(FIRST_INSTANCE_LOCATION - 1));
    }
}
