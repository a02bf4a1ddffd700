// src/wgpu_utils/uniform_buffer.rs
use std::marker::PhantomData;

fn type_name_of<Content>() -> &'static str {
    let type_name = std::any::type_name::<Content>();
    match type_name.rfind(':') {
        Some(pos) => &type_name[(pos + 1)..],
        None => type_name,
    }
}

/// Typed uniform buffer holding a single `Content` value
pub struct UniformBuffer<Content> {
    buffer: wgpu::Buffer,
    content_type: PhantomData<Content>,
    previous_content: Vec<u8>,
}

impl<Content: bytemuck::Pod> UniformBuffer<Content> {
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("UniformBuffer: {}", type_name_of::<Content>())),
            size: std::mem::size_of::<Content>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        UniformBuffer {
            buffer,
            content_type: PhantomData,
            previous_content: Vec::new(),
        }
    }

    /// Writes the content unless it is byte-identical to the last write
    pub fn update_content(&mut self, queue: &wgpu::Queue, content: Content) {
        let new_content = bytemuck::bytes_of(&content);
        if self.previous_content == new_content {
            return;
        }
        queue.write_buffer(&self.buffer, 0, new_content);
        self.previous_content = new_content.to_vec();
    }

    pub fn binding_resource(&self) -> wgpu::BindingResource {
        self.buffer.as_entire_binding()
    }
}

/// Fixed number of `Content` slots addressed with dynamic offsets.
///
/// Each slot starts on the device's uniform offset alignment, so slot `i`
/// is bound with offset `i * stride`.
pub struct DynamicUniformBuffer<Content> {
    buffer: wgpu::Buffer,
    content_type: PhantomData<Content>,
    stride: u64,
    slots: usize,
}

impl<Content: bytemuck::Pod> DynamicUniformBuffer<Content> {
    pub fn new(device: &wgpu::Device, slots: usize) -> Self {
        let stride = aligned_stride(
            std::mem::size_of::<Content>() as u64,
            u64::from(device.limits().min_uniform_buffer_offset_alignment),
        );
        let slots = slots.max(1);

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("DynamicUniformBuffer: {}", type_name_of::<Content>())),
            size: stride * slots as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            content_type: PhantomData,
            stride,
            slots,
        }
    }

    pub fn write_slot(&self, queue: &wgpu::Queue, slot: usize, content: Content) {
        if slot >= self.slots {
            log::warn!("Uniform slot {} out of range ({} slots)", slot, self.slots);
            return;
        }
        queue.write_buffer(&self.buffer, self.offset(slot) as u64, bytemuck::bytes_of(&content));
    }

    /// Dynamic offset for `set_bind_group`
    pub fn offset(&self, slot: usize) -> u32 {
        (self.stride * slot as u64) as u32
    }

    /// Binding covering one slot; the dynamic offset picks which
    pub fn binding_resource(&self) -> wgpu::BindingResource {
        wgpu::BindingResource::Buffer(wgpu::BufferBinding {
            buffer: &self.buffer,
            offset: 0,
            size: wgpu::BufferSize::new(std::mem::size_of::<Content>() as u64),
        })
    }
}

/// Rounds `size` up to a multiple of `alignment`
pub fn aligned_stride(size: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aligned_stride() {
        assert_eq!(aligned_stride(16, 256), 256);
        assert_eq!(aligned_stride(256, 256), 256);
        assert_eq!(aligned_stride(300, 256), 512);
        assert_eq!(aligned_stride(12, 0), 12);
    }
}
