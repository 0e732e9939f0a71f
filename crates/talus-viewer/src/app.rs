//! Viewer application implementing winit ApplicationHandler
//!
//! Runs the frame loop with free-fly camera controls and the scan overlay.

use crate::clock::FrameClock;
use crate::config::ViewerConfig;
use crate::input::InputState;
use crate::scene::Scene;
use std::path::PathBuf;
use std::sync::Arc;
use talus_core::Vec3;
use talus_render::{Camera, RenderContext};
use talus_terrain::TerrainMesh;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, MouseButton, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

pub struct ViewerApp {
    // Scene inputs
    config: ViewerConfig,
    terrain: TerrainMesh,
    asset_root: PathBuf,

    // Systems
    clock: FrameClock,
    input: InputState,

    // Rendering
    window: Option<Arc<Window>>,
    render_context: Option<RenderContext>,
    scene: Option<Scene>,
    camera: Camera,

    // Window options
    pub fullscreen: bool,
    cursor_captured: bool,
}

impl ViewerApp {
    pub fn new(
        config: ViewerConfig,
        terrain: TerrainMesh,
        asset_root: PathBuf,
        fullscreen: bool,
    ) -> Self {
        let camera = Camera {
            position: Vec3::from_array(config.camera.position),
            yaw: config.camera.yaw,
            pitch: config.camera.pitch,
            fov: config.camera.fov,
            near: config.camera.near,
            far: config.camera.far,
            ..Camera::new()
        };

        Self {
            config,
            terrain,
            asset_root,
            clock: FrameClock::new(),
            input: InputState::new(),
            window: None,
            render_context: None,
            scene: None,
            camera,
            fullscreen,
            cursor_captured: false,
        }
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) {
        let window_attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));

        let window = Arc::new(event_loop.create_window(window_attrs).unwrap());

        if self.fullscreen {
            window.set_fullscreen(Some(winit::window::Fullscreen::Borderless(None)));
        }

        self.window = Some(window.clone());

        let render_context = pollster::block_on(RenderContext::new(window.clone())).unwrap();

        self.camera.aspect = render_context.aspect_ratio();

        let scene = Scene::new(&render_context, &self.config, &self.terrain, &self.asset_root)
            .expect("Failed to create scene");

        self.render_context = Some(render_context);
        self.scene = Some(scene);

        // Capture cursor for free-fly look
        self.capture_cursor();
    }

    fn capture_cursor(&mut self) {
        if let Some(window) = &self.window {
            // Try confined first, then locked
            let _ = window
                .set_cursor_grab(CursorGrabMode::Confined)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked));
            window.set_cursor_visible(false);
            self.cursor_captured = true;
        }
    }

    fn release_cursor(&mut self) {
        if let Some(window) = &self.window {
            let _ = window.set_cursor_grab(CursorGrabMode::None);
            window.set_cursor_visible(true);
            self.cursor_captured = false;
        }
    }

    fn tick(&mut self) {
        self.clock.tick();
        let delta = self.clock.delta_time as f32;

        if self.cursor_captured {
            let (dx, dy) = self.input.raw_mouse_delta();
            self.camera
                .rotate(dx as f32, dy as f32, self.config.camera.sensitivity);
        }

        // Free-fly movement along the view direction
        let mut direction = Vec3::ZERO;
        if self.input.is_key_down(KeyCode::KeyW) {
            direction = direction + self.camera.forward_vector();
        }
        if self.input.is_key_down(KeyCode::KeyS) {
            direction = direction - self.camera.forward_vector();
        }
        if self.input.is_key_down(KeyCode::KeyD) {
            direction = direction + self.camera.right_vector();
        }
        if self.input.is_key_down(KeyCode::KeyA) {
            direction = direction - self.camera.right_vector();
        }
        if direction.length() > 0.0 {
            self.camera.position = self.camera.position
                + direction.normalized() * (self.config.camera.speed * delta);
        }

        if let Some(scene) = &mut self.scene {
            scene.update(delta);
        }

        // Clear per-frame input state
        self.input.end_frame();
    }

    fn render(&mut self, event_loop: &ActiveEventLoop) {
        let Some(context) = &self.render_context else {
            return;
        };
        let Some(scene) = &self.scene else {
            return;
        };

        let output = match context.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                // Reconfigured by the Resized event that accompanies the loss
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                eprintln!("Surface out of memory, exiting");
                event_loop.exit();
                return;
            }
            Err(e) => {
                eprintln!("Surface error: {:?}", e);
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        scene.render(context, &self.camera, self.clock.total_time as f32, &view);

        output.present();
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            self.initialize(event_loop);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(context) = &mut self.render_context {
                    context.resize(new_size);
                    self.camera.aspect = context.aspect_ratio();
                    if let Some(scene) = &mut self.scene {
                        if let Err(e) =
                            scene.resize(&context.device, context.config.width, context.config.height)
                        {
                            eprintln!("Resize error: {:?}", e);
                        }
                    }
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => {
                            // Handle escape to toggle cursor capture
                            if key_code == KeyCode::Escape {
                                if self.cursor_captured {
                                    self.release_cursor();
                                } else {
                                    event_loop.exit();
                                }
                                return;
                            }

                            match key_code {
                                KeyCode::F2 => {
                                    if let Some(scene) = &mut self.scene {
                                        scene.scan_enabled = !scene.scan_enabled;
                                    }
                                }
                                KeyCode::F11 => {
                                    if let Some(window) = &self.window {
                                        if window.fullscreen().is_some() {
                                            window.set_fullscreen(None);
                                        } else {
                                            window.set_fullscreen(Some(
                                                winit::window::Fullscreen::Borderless(None),
                                            ));
                                        }
                                    }
                                }
                                _ => {}
                            }

                            self.input.process_key_down(key_code);
                        }
                        ElementState::Released => {
                            self.input.process_key_up(key_code);
                        }
                    }
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if !self.cursor_captured
                    && state == ElementState::Pressed
                    && button == MouseButton::Left
                {
                    self.capture_cursor();
                }
            }

            WindowEvent::RedrawRequested => {
                self.tick();
                self.render(event_loop);
            }

            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if !self.cursor_captured {
            return;
        }

        if let DeviceEvent::MouseMotion { delta } = event {
            self.input.process_mouse_raw_delta(delta.0, delta.1);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
