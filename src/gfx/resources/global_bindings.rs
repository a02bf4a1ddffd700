//! Global and per-layer uniform bindings
//!
//! Group 0 holds the per-frame globals (camera and light direction). Group 1
//! holds one slot per layer group with that group's vertical offset, selected
//! with a dynamic offset per draw.

use crate::{
    gfx::{camera::camera_utils::CameraUniform, scene::layers::{DamageLayer, LayerId}},
    wgpu_utils::uniform_buffer::{DynamicUniformBuffer, UniformBuffer},
};

/// MUST match the `Globals` struct in `scene.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
    /// Direction towards the light, w unused
    light_direction: [f32; 4],
}

/// MUST match the `LayerUniform` struct in `scene.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LayerUniform {
    pub offset: [f32; 4],
}

pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// Building plus one slot per damage layer
pub const LAYER_SLOTS: usize = 1 + DamageLayer::COUNT;

pub fn layer_slot(id: LayerId) -> usize {
    match id {
        LayerId::Building => 0,
        LayerId::Damage(layer) => 1 + layer.index(),
    }
}

const LIGHT_DIRECTION: [f32; 4] = [0.35, 0.85, 0.4, 0.0];

pub fn update_global_ubo(ubo: &mut GlobalUBO, queue: &wgpu::Queue, camera: CameraUniform) {
    ubo.update_content(
        queue,
        GlobalUBOContent {
            view_position: camera.view_position,
            view_proj: camera.view_proj,
            light_direction: LIGHT_DIRECTION,
        },
    );
}

/// Bind group layouts and bind groups for groups 0 and 1
pub struct GlobalBindings {
    global_layout: wgpu::BindGroupLayout,
    layer_layout: wgpu::BindGroupLayout,
    global_bind_group: wgpu::BindGroup,
    layer_bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(
        device: &wgpu::Device,
        ubo: &GlobalUBO,
        layers: &DynamicUniformBuffer<LayerUniform>,
    ) -> Self {
        let global_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let layer_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Layer Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<LayerUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let global_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Global Bind Group"),
            layout: &global_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.binding_resource(),
            }],
        });

        let layer_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Layer Bind Group"),
            layout: &layer_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: layers.binding_resource(),
            }],
        });

        Self {
            global_layout,
            layer_layout,
            global_bind_group,
            layer_bind_group,
        }
    }

    pub fn bind_group_layouts(&self) -> Vec<wgpu::BindGroupLayout> {
        vec![self.global_layout.clone(), self.layer_layout.clone()]
    }

    pub fn global_bind_group(&self) -> &wgpu::BindGroup {
        &self.global_bind_group
    }

    pub fn layer_bind_group(&self) -> &wgpu::BindGroup {
        &self.layer_bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_slots_unique() {
        let mut slots: Vec<usize> = DamageLayer::ALL
            .iter()
            .map(|l| layer_slot(LayerId::Damage(*l)))
            .collect();
        slots.push(layer_slot(LayerId::Building));
        slots.sort_unstable();
        slots.dedup();

        assert_eq!(slots.len(), LAYER_SLOTS);
        assert!(slots.iter().all(|s| *s < LAYER_SLOTS));
    }

    #[test]
    fn test_uniform_sizes() {
        assert_eq!(std::mem::size_of::<GlobalUBOContent>(), 96);
        assert_eq!(std::mem::size_of::<LayerUniform>(), 16);
    }
}
