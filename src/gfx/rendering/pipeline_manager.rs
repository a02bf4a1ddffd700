//! Scene render pipelines
//!
//! The scene is drawn in two passes over one shader. [`PassKind`] fixes the
//! depth and blend state of each pass, [`PipelineConfig`] carries what the
//! surface decides (formats, culling).

use std::collections::BTreeMap;

use wgpu::*;

use crate::gfx::resources::depth_buffer::DepthBuffer;
use crate::gfx::scene::{
    instance::{BatchKind, InstanceRaw},
    vertex::Vertex3D,
};

/// Scene passes in draw order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PassKind {
    /// Depth-tested and depth-writing, no blending
    Opaque,
    /// Alpha-blended over the opaque pass without writing depth
    Translucent,
}

impl PassKind {
    pub const ALL: [PassKind; 2] = [PassKind::Opaque, PassKind::Translucent];

    pub fn for_batch(kind: BatchKind) -> Self {
        if kind.is_translucent() {
            PassKind::Translucent
        } else {
            PassKind::Opaque
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PassKind::Opaque => "scene_opaque",
            PassKind::Translucent => "scene_translucent",
        }
    }

    pub fn writes_depth(self) -> bool {
        self == PassKind::Opaque
    }

    pub fn blend(self) -> BlendState {
        match self {
            PassKind::Opaque => BlendState::REPLACE,
            PassKind::Translucent => BlendState::ALPHA_BLENDING,
        }
    }
}

/// Surface-dependent pipeline settings shared by both passes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    pub color_format: TextureFormat,
    pub depth_format: TextureFormat,
    pub depth_compare: CompareFunction,
    pub cull_mode: Option<Face>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            color_format: TextureFormat::Bgra8Unorm,
            depth_format: DepthBuffer::FORMAT,
            depth_compare: CompareFunction::LessEqual,
            // Floor and stain planes are seen from both sides while orbiting
            cull_mode: None,
        }
    }
}

impl PipelineConfig {
    pub fn with_color_format(mut self, format: TextureFormat) -> Self {
        self.color_format = format;
        self
    }

    pub fn with_cull_mode(mut self, face: Option<Face>) -> Self {
        self.cull_mode = face;
        self
    }
}

/// One render pipeline per [`PassKind`], built from a single shader module
pub struct PipelineManager {
    pipelines: BTreeMap<PassKind, RenderPipeline>,
}

impl PipelineManager {
    /// Compiles `shader_source` and builds every pass.
    ///
    /// The shader must provide `vs_main` reading [`Vertex3D`] in slot 0 and
    /// [`InstanceRaw`] in slot 1, and `fs_main` writing one colour target.
    pub fn new(
        device: &Device,
        shader_source: &str,
        bind_group_layouts: &[BindGroupLayout],
        config: PipelineConfig,
    ) -> Self {
        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: ShaderSource::Wgsl(shader_source.into()),
        });

        let layout_refs: Vec<&BindGroupLayout> = bind_group_layouts.iter().collect();
        let layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &layout_refs,
            push_constant_ranges: &[],
        });

        let pipelines = PassKind::ALL
            .into_iter()
            .map(|pass| {
                let pipeline = Self::build(device, &shader, &layout, pass, config);
                log::debug!("Created pipeline '{}'", pass.label());
                (pass, pipeline)
            })
            .collect();

        Self { pipelines }
    }

    pub fn pipeline(&self, pass: PassKind) -> Option<&RenderPipeline> {
        self.pipelines.get(&pass)
    }

    fn build(
        device: &Device,
        shader: &ShaderModule,
        layout: &PipelineLayout,
        pass: PassKind,
        config: PipelineConfig,
    ) -> RenderPipeline {
        let targets = [Some(ColorTargetState {
            format: config.color_format,
            blend: Some(pass.blend()),
            write_mask: ColorWrites::ALL,
        })];

        device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some(pass.label()),
            layout: Some(layout),
            vertex: VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex3D::desc(), InstanceRaw::desc()],
                compilation_options: PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &targets,
                compilation_options: PipelineCompilationOptions::default(),
            }),
            primitive: PrimitiveState {
                cull_mode: config.cull_mode,
                ..PrimitiveState::default()
            },
            depth_stencil: Some(DepthStencilState {
                format: config.depth_format,
                depth_write_enabled: pass.writes_depth(),
                depth_compare: config.depth_compare,
                stencil: StencilState::default(),
                bias: DepthBiasState::default(),
            }),
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_for_batch() {
        for kind in BatchKind::all() {
            let pass = PassKind::for_batch(kind);
            assert_eq!(pass == PassKind::Translucent, kind.is_translucent());
        }
        assert_eq!(PassKind::for_batch(BatchKind::Wall), PassKind::Opaque);
        assert_eq!(PassKind::for_batch(BatchKind::FloodWater), PassKind::Translucent);
    }

    #[test]
    fn test_only_opaque_writes_depth() {
        assert!(PassKind::Opaque.writes_depth());
        assert!(!PassKind::Translucent.writes_depth());
        assert_eq!(PassKind::Translucent.blend(), BlendState::ALPHA_BLENDING);
        assert!(PassKind::ALL.windows(2).all(|w| w[0] < w[1]));
    }
}
