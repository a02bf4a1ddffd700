//! GPU side of the instance batches
//!
//! One [`GpuMesh`] per base shape and one [`GpuBatch`] per scene batch. Each
//! batch's instance buffer is created at the batch's fixed capacity and only
//! ever rewritten in place.

use std::collections::BTreeMap;

use bytemuck::Zeroable;
use wgpu::util::DeviceExt;
use wgpu::{Buffer, Device, Queue, RenderPass};

use crate::gfx::geometry::MeshKind;
use crate::gfx::scene::instance::{BatchKind, InstanceBatch, InstanceRaw};

/// Vertex and index buffers of one base shape
pub struct GpuMesh {
    pub vertex_buffer: Buffer,
    pub index_buffer: Buffer,
    pub index_count: u32,
}

impl GpuMesh {
    pub fn new(device: &Device, kind: MeshKind) -> Self {
        let (vertices, indices) = kind.geometry().to_scene_format();

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", kind)),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", kind)),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }
}

/// Fixed-capacity instance buffer for one batch
pub struct GpuBatch {
    pub kind: BatchKind,
    instance_buffer: Buffer,
    capacity: u32,
    instance_count: u32,
}

impl GpuBatch {
    pub fn new(device: &Device, batch: &InstanceBatch) -> Self {
        let mut raw = batch.raw_instances();
        raw.resize(batch.capacity(), InstanceRaw::zeroed());

        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("Instance Buffer {}", batch.kind().label())),
            contents: bytemuck::cast_slice(&raw),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            kind: batch.kind(),
            instance_buffer,
            capacity: batch.capacity() as u32,
            instance_count: batch.len() as u32,
        }
    }

    /// Rewrites the instance data in place; extra instances beyond capacity are dropped
    pub fn write_instances(&mut self, queue: &Queue, instances: &[InstanceRaw]) {
        self.instance_count = instances.len().min(self.capacity as usize) as u32;
        if self.instance_count > 0 {
            let data_slice = &instances[..self.instance_count as usize];
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(data_slice));
        }
    }

    /// One draw call for every instance in the batch
    pub fn draw(&self, render_pass: &mut RenderPass<'_>, mesh: &GpuMesh) {
        if self.instance_count == 0 {
            return;
        }

        render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..mesh.index_count, 0, 0..self.instance_count);
    }
}

/// Meshes and batch buffers for a whole scene
pub struct InstancedRenderer {
    meshes: BTreeMap<MeshKind, GpuMesh>,
    batches: BTreeMap<BatchKind, GpuBatch>,
}

impl InstancedRenderer {
    pub fn new(device: &Device, batches: &[InstanceBatch]) -> Self {
        let meshes = MeshKind::ALL
            .iter()
            .map(|kind| (*kind, GpuMesh::new(device, *kind)))
            .collect();

        let batches = batches
            .iter()
            .map(|batch| (batch.kind(), GpuBatch::new(device, batch)))
            .collect();

        Self { meshes, batches }
    }

    pub fn mesh(&self, kind: MeshKind) -> Option<&GpuMesh> {
        self.meshes.get(&kind)
    }

    pub fn batch(&self, kind: BatchKind) -> Option<&GpuBatch> {
        self.batches.get(&kind)
    }

    /// Re-uploads a scene batch whose instances changed
    pub fn sync_batch(&mut self, queue: &Queue, batch: &InstanceBatch) {
        if let Some(gpu) = self.batches.get_mut(&batch.kind()) {
            gpu.write_instances(queue, &batch.raw_instances());
        }
    }

    /// Re-uploads a batch with every instance's alpha replaced
    pub fn sync_batch_alpha(&mut self, queue: &Queue, batch: &InstanceBatch, alpha: f32) {
        if let Some(gpu) = self.batches.get_mut(&batch.kind()) {
            gpu.write_instances(queue, &with_alpha(batch.raw_instances(), alpha));
        }
    }
}

fn with_alpha(mut instances: Vec<InstanceRaw>, alpha: f32) -> Vec<InstanceRaw> {
    let alpha = alpha.clamp(0.0, 1.0);
    for instance in &mut instances {
        instance.color[3] = alpha;
    }
    instances
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_alpha_keeps_colour() {
        let raw = InstanceRaw {
            model: [[0.0; 4]; 4],
            color: [0.2, 0.4, 0.8, 0.5],
        };
        let out = with_alpha(vec![raw, raw], 1.7);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].color, [0.2, 0.4, 0.8, 1.0]);
        assert_eq!(out[1].model, raw.model);
    }
}
