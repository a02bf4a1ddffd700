//! Instance transforms and fixed-capacity instance batches.
//!
//! A batch is one draw call: a shared base shape plus a flat array of
//! per-instance transforms. Capacity is decided before the batch is filled
//! and never grows afterwards.

use cgmath::{Deg, Matrix4, Quaternion, Rotation3, Vector3};

use crate::data::FixtureKind;
use crate::gfx::geometry::MeshKind;

use super::layers::{DamageLayer, LayerId};

/// Placement of one instance relative to its batch's base shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceTransform {
    pub translation: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
    pub color: [f32; 4],
}

impl InstanceTransform {
    /// Axis-aligned box of the given extents centred at `translation`
    pub fn boxed(translation: Vector3<f32>, extents: Vector3<f32>, color: [f32; 4]) -> Self {
        Self {
            translation,
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            scale: extents,
            color,
        }
    }

    /// Flat shape on a horizontal plane facing up: `width` along X, `depth` along Z
    pub fn flat(translation: Vector3<f32>, width: f32, depth: f32, color: [f32; 4]) -> Self {
        Self {
            translation,
            rotation: Quaternion::from_angle_x(Deg(-90.0)),
            scale: Vector3::new(width, depth, 1.0),
            color,
        }
    }

    /// Flat shape facing down, for ceiling undersides
    pub fn flat_facing_down(
        translation: Vector3<f32>,
        width: f32,
        depth: f32,
        color: [f32; 4],
    ) -> Self {
        Self {
            rotation: Quaternion::from_angle_x(Deg(90.0)),
            ..Self::flat(translation, width, depth, color)
        }
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.translation)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    pub fn is_finite(&self) -> bool {
        let v = |v: Vector3<f32>| v.x.is_finite() && v.y.is_finite() && v.z.is_finite();
        v(self.translation)
            && v(self.scale)
            && self.rotation.s.is_finite()
            && v(self.rotation.v)
            && self.color.iter().all(|c| c.is_finite())
    }

    pub fn to_raw(&self) -> InstanceRaw {
        InstanceRaw {
            model: self.matrix().into(),
            color: self.color,
        }
    }
}

/// GPU layout of one instance: model matrix columns followed by RGBA colour.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl InstanceRaw {
    /// Vertex buffer layout for instance data, locations 2..=6
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
            2 => Float32x4,
            3 => Float32x4,
            4 => Float32x4,
            5 => Float32x4,
            6 => Float32x4
        ];

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Category of repeated element; each kind is one batch and one draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BatchKind {
    Ground,
    Floor,
    Wall,
    PerimeterWall,
    Fixture(FixtureKind),
    Highlight,
    Puddle,
    FloorStain,
    FloodWater,
    CeilingStain,
    DripMark,
    DripBand,
    WickingBand,
    InfrastructureMarker,
}

impl BatchKind {
    /// Every batch kind in draw order
    pub fn all() -> Vec<BatchKind> {
        let mut kinds = vec![
            BatchKind::Ground,
            BatchKind::Floor,
            BatchKind::Wall,
            BatchKind::PerimeterWall,
        ];
        kinds.extend(FixtureKind::ALL.iter().map(|k| BatchKind::Fixture(*k)));
        kinds.extend([
            BatchKind::Puddle,
            BatchKind::FloorStain,
            BatchKind::CeilingStain,
            BatchKind::DripMark,
            BatchKind::DripBand,
            BatchKind::WickingBand,
            BatchKind::InfrastructureMarker,
            BatchKind::FloodWater,
            BatchKind::Highlight,
        ]);
        kinds
    }

    /// Group assignment, fixed for the lifetime of the scene
    pub fn layer(&self) -> LayerId {
        match self {
            BatchKind::Ground
            | BatchKind::Floor
            | BatchKind::Wall
            | BatchKind::PerimeterWall
            | BatchKind::Fixture(_)
            | BatchKind::Highlight => LayerId::Building,
            BatchKind::Puddle | BatchKind::FloorStain | BatchKind::FloodWater => {
                LayerId::Damage(DamageLayer::Floor)
            }
            BatchKind::CeilingStain | BatchKind::DripMark | BatchKind::DripBand => {
                LayerId::Damage(DamageLayer::Ceiling)
            }
            BatchKind::WickingBand => LayerId::Damage(DamageLayer::Walls),
            BatchKind::InfrastructureMarker => LayerId::Damage(DamageLayer::Infrastructure),
        }
    }

    pub fn mesh(&self) -> MeshKind {
        match self {
            BatchKind::Ground
            | BatchKind::Floor
            | BatchKind::FloorStain
            | BatchKind::FloodWater
            | BatchKind::CeilingStain => MeshKind::Plane,
            BatchKind::Puddle => MeshKind::Disc,
            _ => MeshKind::Cube,
        }
    }

    /// Drawn after opaque batches without depth writes
    pub fn is_translucent(&self) -> bool {
        matches!(
            self,
            BatchKind::Highlight
                | BatchKind::Puddle
                | BatchKind::FloorStain
                | BatchKind::FloodWater
                | BatchKind::CeilingStain
        )
    }

    pub fn label(&self) -> String {
        match self {
            BatchKind::Fixture(kind) => format!("fixture:{}", kind.label()),
            other => format!("{:?}", other),
        }
    }
}

/// Fixed-capacity array of instance transforms for one batch kind.
#[derive(Debug, Clone)]
pub struct InstanceBatch {
    kind: BatchKind,
    capacity: usize,
    instances: Vec<InstanceTransform>,
}

impl InstanceBatch {
    /// Capacity is at least 1; an empty batch stays allocated and unpopulated.
    pub fn with_capacity(kind: BatchKind, count: usize) -> Self {
        let capacity = count.max(1);
        Self {
            kind,
            capacity,
            instances: Vec::with_capacity(capacity),
        }
    }

    pub fn kind(&self) -> BatchKind {
        self.kind
    }

    pub fn layer(&self) -> LayerId {
        self.kind.layer()
    }

    pub fn mesh(&self) -> MeshKind {
        self.kind.mesh()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn instances(&self) -> &[InstanceTransform] {
        &self.instances
    }

    /// Appends an instance. Non-finite transforms and overflow are rejected.
    pub fn push(&mut self, instance: InstanceTransform) -> bool {
        if !instance.is_finite() {
            log::warn!("Rejected non-finite instance for {}", self.kind.label());
            return false;
        }
        if self.instances.len() >= self.capacity {
            log::warn!(
                "Batch {} is full ({} instances)",
                self.kind.label(),
                self.capacity
            );
            return false;
        }
        self.instances.push(instance);
        true
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    pub fn raw_instances(&self) -> Vec<InstanceRaw> {
        self.instances.iter().map(InstanceTransform::to_raw).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cgmath::{Rotation, Vector4};

    #[test]
    fn test_flat_lies_on_floor() {
        let t = InstanceTransform::flat(Vector3::new(2.0, 0.0, 3.0), 10.0, 6.0, [1.0; 4]);
        let normal = t.rotation.rotate_vector(Vector3::unit_z());
        assert_relative_eq!(normal, Vector3::unit_y(), epsilon = 1e-6);

        // Corner (0.5, 0.5) of the unit plane maps to +X, -Z of the centre
        let corner = t.matrix() * Vector4::new(0.5, 0.5, 0.0, 1.0);
        assert_relative_eq!(corner.x, 7.0, epsilon = 1e-5);
        assert_relative_eq!(corner.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(corner.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_flat_facing_down() {
        let t = InstanceTransform::flat_facing_down(Vector3::new(0.0, 3.0, 0.0), 1.0, 1.0, [1.0; 4]);
        let normal = t.rotation.rotate_vector(Vector3::unit_z());
        assert_relative_eq!(normal, -Vector3::unit_y(), epsilon = 1e-6);
    }

    #[test]
    fn test_zero_count_batch_keeps_capacity() {
        let batch = InstanceBatch::with_capacity(BatchKind::Puddle, 0);
        assert_eq!(batch.capacity(), 1);
        assert!(batch.is_empty());
        assert!(batch.raw_instances().is_empty());
    }

    #[test]
    fn test_push_rejects_nan_and_overflow() {
        let mut batch = InstanceBatch::with_capacity(BatchKind::Wall, 1);
        let bad = InstanceTransform::boxed(
            Vector3::new(f32::NAN, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
            [1.0; 4],
        );
        assert!(!batch.push(bad));

        let good = InstanceTransform::boxed(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0), [1.0; 4]);
        assert!(batch.push(good));
        assert!(!batch.push(good));
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_every_kind_has_one_layer() {
        let kinds = BatchKind::all();
        let unique: std::collections::BTreeSet<_> = kinds.iter().collect();
        assert_eq!(unique.len(), kinds.len());
        assert_eq!(
            BatchKind::Fixture(FixtureKind::Pump).layer(),
            LayerId::Building
        );
        assert_eq!(
            BatchKind::DripBand.layer(),
            LayerId::Damage(DamageLayer::Ceiling)
        );
    }
}
