//! winit application shell
//!
//! Owns the window, renderer, UI and scene, and routes input: ImGui first,
//! then keyboard shortcuts, then the camera controller and picking.

use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    config::ViewerConfig,
    data::{Dataset, Room},
    error::{Result, ViewerError},
    gfx::{
        frame_loop::FrameLoop,
        scene::{LayerId, Scene},
        RenderEngine,
    },
    ui::{layer_panel, room_detail_panel, PanelActions, UiManager},
};

/// Called with the newly selected room, or `None` when the selection clears
pub type SelectionCallback = Box<dyn FnMut(Option<&Room>)>;

/// Builder and entry point for the viewer
pub struct FloodViewApp {
    dataset: Dataset,
    config: ViewerConfig,
    on_selection_change: Option<SelectionCallback>,
}

impl FloodViewApp {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            config: ViewerConfig::default(),
            on_selection_change: None,
        }
    }

    pub fn with_config(mut self, config: ViewerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn on_selection_change<F>(mut self, callback: F) -> Self
    where
        F: FnMut(Option<&Room>) + 'static,
    {
        self.on_selection_change = Some(Box::new(callback));
        self
    }

    /// Opens the window and runs until it is closed.
    ///
    /// Returns the first fatal render error, if any ended the loop.
    pub fn run(self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app_state = AppState::new(self.dataset, self.config, self.on_selection_change);
        event_loop.run_app(&mut app_state)?;

        match app_state.fatal.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

struct AppState {
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    scene: Scene,
    frame_loop: FrameLoop,
    last_frame: Instant,
    on_selection_change: Option<SelectionCallback>,
    fatal: Option<ViewerError>,
}

impl AppState {
    fn new(
        dataset: Dataset,
        config: ViewerConfig,
        on_selection_change: Option<SelectionCallback>,
    ) -> Self {
        let aspect = config.window.width.max(1) as f32 / config.window.height.max(1) as f32;
        let camera_manager = config.camera_manager(&dataset.building.sanitized(), aspect);
        let scene = Scene::new(dataset, &config.layers, camera_manager);
        let frame_loop = FrameLoop::new(config.animation);

        Self {
            config,
            window: None,
            render_engine: None,
            ui_manager: None,
            scene,
            frame_loop,
            last_frame: Instant::now(),
            on_selection_change,
            fatal: None,
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.frame_loop.stop();
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: ViewerError) {
        log::error!("{}", error);
        if self.fatal.is_none() {
            self.fatal = Some(error);
        }
        self.shutdown(event_loop);
    }

    fn notify_selection(&mut self) {
        if let Some(callback) = self.on_selection_change.as_mut() {
            callback(self.scene.selected_room());
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key_code: KeyCode) {
        let layer_index = match key_code {
            KeyCode::Digit1 => Some(0),
            KeyCode::Digit2 => Some(1),
            KeyCode::Digit3 => Some(2),
            KeyCode::Digit4 => Some(3),
            _ => None,
        };
        if let Some(index) = layer_index {
            let layer = self
                .scene
                .layers()
                .damage_layers()
                .nth(index)
                .and_then(|group| match group.id {
                    LayerId::Damage(layer) => Some(layer),
                    LayerId::Building => None,
                });
            if let Some(layer) = layer {
                self.scene.toggle_layer(layer);
            }
            return;
        }

        match key_code {
            KeyCode::KeyE => self.frame_loop.toggle_exploded(&mut self.scene),
            KeyCode::KeyR => self.scene.camera_manager.reset(),
            KeyCode::Escape => {
                if self.scene.selection().is_some() {
                    self.scene.clear_selection();
                    self.notify_selection();
                } else {
                    self.shutdown(event_loop);
                }
            }
            _ => (),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f64();
        self.last_frame = now;

        let Some(frame) = self.frame_loop.tick(dt, &mut self.scene) else {
            return;
        };
        let (Some(render_engine), Some(window)) =
            (self.render_engine.as_mut(), self.window.as_ref())
        else {
            return;
        };

        render_engine.update(self.scene.camera_manager.camera.uniform);
        render_engine.prepare_frame(&mut self.scene, &frame);

        let mut actions = PanelActions::default();
        let exploded = self.frame_loop.is_exploded();
        let scene = &self.scene;

        let result = match self.ui_manager.as_mut() {
            Some(ui_manager) => {
                let window = window.clone();
                render_engine.render_frame(
                    scene,
                    Some(
                        |device: &wgpu::Device,
                         queue: &wgpu::Queue,
                         encoder: &mut wgpu::CommandEncoder,
                         view: &wgpu::TextureView| {
                            ui_manager.draw(device, queue, encoder, &window, view, |ui| {
                                layer_panel(ui, scene, exploded, &mut actions);
                                room_detail_panel(ui, scene, &mut actions);
                            });
                        },
                    ),
                )
            }
            None => render_engine.render_frame(
                scene,
                None::<fn(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView)>,
            ),
        };

        if let Err(e) = result {
            self.fail(event_loop, e);
            return;
        }

        if !actions.is_empty() {
            let before = self.scene.selection();
            actions.apply(&mut self.scene, &mut self.frame_loop);
            if self.scene.selection() != before {
                self.notify_selection();
            }
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = WindowAttributes::default()
            .with_title(self.config.window.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, e.into());
                return;
            }
        };
        self.window = Some(window.clone());

        let (width, height) = window.inner_size().into();
        let window_clone = window.clone();
        let renderer =
            pollster::block_on(async move { RenderEngine::new(window_clone, width, height).await });
        let mut renderer = match renderer {
            Ok(renderer) => renderer,
            Err(e) => {
                self.fail(event_loop, e);
                return;
            }
        };

        renderer.load_scene(&self.scene);
        self.scene
            .camera_manager
            .camera
            .resize_projection(width, height);

        let ui_manager = UiManager::new(
            renderer.device(),
            renderer.queue(),
            renderer.surface_format(),
            &window,
        );

        self.ui_manager = Some(ui_manager);
        self.render_engine = Some(renderer);
        self.last_frame = Instant::now();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };

        if let Some(ui_manager) = self.ui_manager.as_mut() {
            if ui_manager.capture_event(&window, window_id, &event) {
                let controller = &mut self.scene.camera_manager.controller;
                match event {
                    WindowEvent::CursorMoved { position, .. } => controller
                        .pointer_captured(Some((position.x as f32, position.y as f32))),
                    WindowEvent::MouseInput { .. } | WindowEvent::MouseWheel { .. } => {
                        controller.pointer_captured(None)
                    }
                    _ => (),
                }
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.scene
                    .camera_manager
                    .camera
                    .resize_projection(width, height);
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(event_loop, key_code),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            other => {
                if let Some(click) = self.scene.camera_manager.process_window_event(&other) {
                    let size = window.inner_size();
                    let change = self
                        .scene
                        .click(click.position, (size.width as f32, size.height as f32));
                    if change.changed() {
                        self.notify_selection();
                    }
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if !self.frame_loop.is_running() {
            return;
        }
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.frame_loop.stop();
    }
}
