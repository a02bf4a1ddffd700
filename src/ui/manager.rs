// src/ui/manager.rs
//! Dear ImGui overlay on top of the scene pass.

use imgui::{Context, FontConfig, FontSource, MouseCursor};
use imgui_wgpu::{Renderer, RendererConfig};
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use std::time::Instant;
use wgpu::{CommandEncoder, Device, Queue, TextureFormat, TextureView};
use winit::{
    event::{Event, WindowEvent},
    window::{Window, WindowId},
};

const FONT_SIZE: f32 = 18.0;

/// Which ImGui capture flag decides whether an event stays with the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    Pointer,
    Keyboard,
    Never,
}

fn capture_kind(event: &WindowEvent) -> Option<Capture> {
    match event {
        WindowEvent::CursorMoved { .. }
        | WindowEvent::MouseInput { .. }
        | WindowEvent::MouseWheel { .. } => Some(Capture::Pointer),
        WindowEvent::KeyboardInput { .. } => Some(Capture::Keyboard),
        WindowEvent::Focused(_) | WindowEvent::ModifiersChanged(_) => Some(Capture::Never),
        _ => None,
    }
}

/// ImGui context, winit glue and wgpu renderer for the panels
pub struct UiManager {
    context: Context,
    platform: WinitPlatform,
    renderer: Renderer,
    last_frame: Instant,
    last_cursor: Option<MouseCursor>,
}

impl UiManager {
    /// DPI is locked to 1.0 so panel sizes are in physical pixels.
    pub fn new(
        device: &Device,
        queue: &Queue,
        output_color_format: TextureFormat,
        window: &Window,
    ) -> Self {
        let mut context = Context::create();
        context.set_ini_filename(None);

        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(context.io_mut(), window, HiDpiMode::Locked(1.0));

        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 1,
                pixel_snap_h: true,
                size_pixels: FONT_SIZE,
                ..Default::default()
            }),
        }]);

        let renderer = Renderer::new(
            &mut context,
            device,
            queue,
            RendererConfig {
                texture_format: output_color_format,
                ..Default::default()
            },
        );

        Self {
            context,
            platform,
            renderer,
            last_frame: Instant::now(),
            last_cursor: None,
        }
    }

    /// Feeds `event` to ImGui. Returns true when a panel keeps it, in which
    /// case the camera and picking must not see it.
    pub fn capture_event(
        &mut self,
        window: &Window,
        window_id: WindowId,
        event: &WindowEvent,
    ) -> bool {
        let Some(kind) = capture_kind(event) else {
            return false;
        };

        let wrapped: Event<()> = Event::WindowEvent {
            window_id,
            event: event.clone(),
        };
        self.platform
            .handle_event(self.context.io_mut(), window, &wrapped);

        let io = self.context.io();
        match kind {
            Capture::Pointer => io.want_capture_mouse,
            Capture::Keyboard => io.want_capture_keyboard,
            Capture::Never => false,
        }
    }

    /// Builds the panels with `build` and draws them over `target`.
    ///
    /// A frame the platform cannot prepare is skipped with a warning.
    pub fn draw<F>(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        window: &Window,
        target: &TextureView,
        build: F,
    ) where
        F: FnOnce(&imgui::Ui),
    {
        let now = Instant::now();
        self.context
            .io_mut()
            .update_delta_time(now - self.last_frame);
        self.last_frame = now;

        if let Err(e) = self.platform.prepare_frame(self.context.io_mut(), window) {
            log::warn!("Skipping UI frame: {}", e);
            return;
        }

        let ui = self.context.frame();
        build(ui);

        let cursor = ui.mouse_cursor();
        if cursor != self.last_cursor {
            self.last_cursor = cursor;
            self.platform.prepare_render(ui, window);
        }

        let draw_data = self.context.render();
        if draw_data.display_size.iter().any(|extent| *extent <= 0.0) {
            return;
        }

        let mut overlay = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("ui_overlay"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if let Err(e) = self
            .renderer
            .render(draw_data, queue, device, &mut overlay)
        {
            log::error!("Failed to render UI: {:?}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::event::Ime;

    #[test]
    fn test_capture_kinds() {
        assert_eq!(capture_kind(&WindowEvent::Focused(true)), Some(Capture::Never));
        assert_eq!(capture_kind(&WindowEvent::Ime(Ime::Disabled)), None);
        assert_eq!(capture_kind(&WindowEvent::CloseRequested), None);
    }
}
