//! WGPU-based rendering engine for the flood viewer
//!
//! Owns the surface, device and queue, the two scene pipelines (opaque and
//! translucent) and the GPU copies of the scene's instance batches. Every
//! visible, non-empty batch is one instanced draw call.

use std::sync::Arc;
use wgpu::TextureFormat;

use crate::error::{Result, ViewerError};
use crate::gfx::{
    camera::camera_utils::CameraUniform,
    frame_loop::FrameOutput,
    resources::{
        global_bindings::{layer_slot, update_global_ubo, GlobalBindings, GlobalUBO, LayerUniform, LAYER_SLOTS},
        depth_buffer::DepthBuffer,
    },
    scene::{
        instance::BatchKind,
        layers::{DamageLayer, LayerId},
        scene::Scene,
    },
};
use crate::wgpu_utils::uniform_buffer::DynamicUniformBuffer;

use super::instanced_renderer::InstancedRenderer;
use super::pipeline_manager::{PassKind, PipelineConfig, PipelineManager};

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.82,
    g: 0.86,
    b: 0.9,
    a: 1.0,
};

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_buffer: DepthBuffer,
    format: TextureFormat,
    pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    layer_uniforms: DynamicUniformBuffer<LayerUniform>,
    global_bindings: GlobalBindings,
    instanced: Option<InstancedRenderer>,
}

impl RenderEngine {
    /// Creates the surface, device and pipelines for a window.
    ///
    /// Fails when no adapter or device is available; the caller decides
    /// whether that ends the application.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;
        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .unwrap_or(TextureFormat::Bgra8Unorm);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_buffer = DepthBuffer::new(&device, config.width, config.height);

        let global_ubo = GlobalUBO::new(&device);
        let layer_uniforms = DynamicUniformBuffer::<LayerUniform>::new(&device, LAYER_SLOTS);
        let global_bindings = GlobalBindings::new(&device, &global_ubo, &layer_uniforms);

        let pipeline_manager = PipelineManager::new(
            &device,
            include_str!("scene.wgsl"),
            &global_bindings.bind_group_layouts(),
            PipelineConfig::default().with_color_format(format),
        );

        log::info!(
            "Render engine ready: {}x{} surface, format {:?}",
            config.width,
            config.height,
            format
        );

        Ok(RenderEngine {
            surface,
            device,
            queue,
            config,
            depth_buffer,
            format,
            pipeline_manager,
            global_ubo,
            layer_uniforms,
            global_bindings,
            instanced: None,
        })
    }

    /// Uploads every batch of the scene at its fixed capacity
    pub fn load_scene(&mut self, scene: &Scene) {
        self.instanced = Some(InstancedRenderer::new(&self.device, scene.batches()));
        log::debug!("Uploaded {} instance batches", scene.batches().len());
    }

    /// Syncs per-frame GPU state: changed batches, flood opacity and group offsets
    pub fn prepare_frame(&mut self, scene: &mut Scene, frame: &FrameOutput) {
        let dirty = scene.take_dirty_batches();

        if let Some(instanced) = self.instanced.as_mut() {
            for kind in dirty {
                if let Some(batch) = scene.batch(kind) {
                    instanced.sync_batch(&self.queue, batch);
                }
            }
            if let Some(flood) = scene.batch(BatchKind::FloodWater) {
                instanced.sync_batch_alpha(&self.queue, flood, frame.flood_opacity);
            }
        }

        let ids = std::iter::once(LayerId::Building)
            .chain(DamageLayer::ALL.iter().map(|layer| LayerId::Damage(*layer)));
        for id in ids {
            self.layer_uniforms.write_slot(
                &self.queue,
                layer_slot(id),
                LayerUniform {
                    offset: [0.0, scene.layers().offset(id), 0.0, 0.0],
                },
            );
        }
    }

    /// Renders one frame: opaque batches, then translucent batches, then the UI overlay.
    ///
    /// A lost or outdated surface is reconfigured once; if that fails the
    /// error is returned. A timed out frame is skipped.
    pub fn render_frame<F>(&mut self, scene: &Scene, ui_callback: Option<F>) -> Result<()>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let Some(surface_texture) = self.acquire_frame()? else {
            return Ok(());
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.depth_buffer.view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, self.global_bindings.global_bind_group(), &[]);

            if let Some(instanced) = self.instanced.as_ref() {
                for pass in PassKind::ALL {
                    let Some(pipeline) = self.pipeline_manager.pipeline(pass) else {
                        continue;
                    };
                    render_pass.set_pipeline(pipeline);

                    for batch in scene
                        .visible_batches()
                        .filter(|b| PassKind::for_batch(b.kind()) == pass)
                    {
                        let (Some(gpu_batch), Some(mesh)) =
                            (instanced.batch(batch.kind()), instanced.mesh(batch.mesh()))
                        else {
                            continue;
                        };
                        render_pass.set_bind_group(
                            1,
                            self.global_bindings.layer_bind_group(),
                            &[self.layer_uniforms.offset(layer_slot(batch.layer()))],
                        );
                        gpu_batch.draw(&mut render_pass, mesh);
                    }
                }
            }
        }

        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    fn acquire_frame(&mut self) -> Result<Option<wgpu::SurfaceTexture>> {
        match self.surface.get_current_texture() {
            Ok(texture) => Ok(Some(texture)),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                self.surface
                    .get_current_texture()
                    .map(Some)
                    .map_err(|_| ViewerError::SurfaceLost)
            }
            Err(wgpu::SurfaceError::OutOfMemory) => Err(ViewerError::SurfaceOutOfMemory),
            Err(e) => {
                log::warn!("Skipping frame: {}", e);
                Ok(None)
            }
        }
    }

    /// Writes the camera into the global uniform buffer
    pub fn update(&mut self, camera_uniform: CameraUniform) {
        update_global_ubo(&mut self.global_ubo, &self.queue, camera_uniform);
    }

    /// Resizes the surface and recreates the depth buffer. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.depth_buffer.resize(&self.device, width, height);
    }

    pub fn get_surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}
