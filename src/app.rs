use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use glam::Vec2;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::*,
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::asset::Assets;
use crate::error::{RenderError, Result};
use crate::renderer::FrameRenderer;
use crate::scene::{Camera, Scene};
use crate::settings::RenderSettings;

/// Keyboard and mouse state gathered between two updates.
#[derive(Debug, Default)]
pub struct Input {
    pressed: HashSet<KeyCode>,
    cursor: Option<Vec2>,
    dragging: bool,
    mouse_delta: Vec2,
}

impl Input {
    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    /// Cursor movement in pixels while the left button is held.
    pub fn drag_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    fn handle(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => match state {
                ElementState::Pressed => {
                    self.pressed.insert(*code);
                }
                ElementState::Released => {
                    self.pressed.remove(code);
                }
            },
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                self.dragging = *state == ElementState::Pressed;
            }
            WindowEvent::CursorMoved { position, .. } => {
                let position = Vec2::new(position.x as f32, position.y as f32);
                if let (Some(previous), true) = (self.cursor, self.dragging) {
                    self.mouse_delta += position - previous;
                }
                self.cursor = Some(position);
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
            }
            _ => {}
        }
    }

    fn end_frame(&mut self) {
        self.mouse_delta = Vec2::ZERO;
    }
}

pub struct SetupContext<'a> {
    pub renderer: &'a FrameRenderer,
    pub assets: &'a mut Assets,
    pub scene: &'a mut Scene,
    pub camera: &'a mut Camera,
}

pub struct UpdateContext<'a> {
    pub input: &'a Input,
    pub dt: f32,
    pub scene: &'a mut Scene,
    pub camera: &'a mut Camera,
}

/// Game-side hooks driven by [`App`]. Logic mutates the scene and camera and
/// calls [`Scene::mark_changed`] whenever something that casts shadows moved.
pub trait GameLogic: 'static {
    fn title(&self) -> &str {
        "skyshade"
    }

    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<()>;

    fn update(&mut self, ctx: &mut UpdateContext<'_>);
}

struct Running {
    window: Arc<Window>,
    renderer: FrameRenderer,
    assets: Assets,
    scene: Scene,
    camera: Camera,
}

impl Running {
    fn cleanup(mut self) {
        self.assets.cleanup();
        self.renderer.cleanup();
    }
}

pub struct App<G: GameLogic> {
    game: G,
    settings: RenderSettings,
    running: Option<Running>,
    input: Input,
    last_frame: Instant,
}

impl<G: GameLogic> App<G> {
    pub fn new(game: G, settings: RenderSettings) -> Self {
        Self {
            game,
            settings,
            running: None,
            input: Input::default(),
            last_frame: Instant::now(),
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<Running> {
        let resolution = &self.settings.resolution;
        let attributes = Window::default_attributes()
            .with_title(self.game.title())
            .with_inner_size(PhysicalSize::new(resolution.width, resolution.height));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(|err| RenderError::init(format!("failed to create window: {err}")))?,
        );

        let renderer = FrameRenderer::init(window.clone(), self.settings.clone())?;
        let mut running = Running {
            window,
            renderer,
            assets: Assets::new(),
            scene: Scene::new(),
            camera: Camera::default(),
        };

        self.game.setup(&mut SetupContext {
            renderer: &running.renderer,
            assets: &mut running.assets,
            scene: &mut running.scene,
            camera: &mut running.camera,
        })?;
        log::info!(
            "Scene ready: {} meshes, {} instances",
            running.assets.mesh_count(),
            running.scene.instance_count()
        );
        Ok(running)
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(running) = self.running.as_mut() else {
            return;
        };

        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.game.update(&mut UpdateContext {
            input: &self.input,
            dt,
            scene: &mut running.scene,
            camera: &mut running.camera,
        });
        self.input.end_frame();

        let changed = running.scene.take_changed();
        match running
            .renderer
            .render(&running.camera, &running.scene, &running.assets, changed)
        {
            Ok(()) => {}
            Err(RenderError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                log::warn!("Surface lost, reconfiguring");
                running.renderer.recover_surface();
                running.scene.mark_changed();
            }
            Err(RenderError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                log::error!("Out of GPU memory, exiting");
                event_loop.exit();
            }
            Err(err) => {
                log::warn!("Frame skipped: {}", err);
                running.scene.mark_changed();
            }
        }

        running.window.request_redraw();
    }
}

impl<G: GameLogic> ApplicationHandler for App<G> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(running) => {
                running.window.request_redraw();
                self.last_frame = Instant::now();
                self.running = Some(running);
            }
            Err(err) => {
                log::error!("{}", err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        let Some(running) = self.running.as_mut() else {
            return;
        };
        if running.window.id() != id {
            return;
        }

        self.input.handle(&event);
        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                running.renderer.resize(size);
                running.scene.mark_changed();
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                running.renderer.resize(running.window.inner_size());
                running.scene.mark_changed();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(running) = self.running.take() {
            running.cleanup();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_delta_resets_each_frame() {
        let mut input = Input {
            dragging: true,
            cursor: Some(Vec2::ZERO),
            ..Default::default()
        };
        input.mouse_delta += Vec2::new(3.0, -2.0);
        assert_eq!(input.drag_delta(), Vec2::new(3.0, -2.0));
        input.end_frame();
        assert_eq!(input.drag_delta(), Vec2::ZERO);
    }
}
