//! Application shell: window, event loop, and the per-frame clock.
//!
//! One cooperative loop drives everything: winit delivers input events,
//! the controller mutates the camera synchronously, and each redraw
//! renders one frame. Exactly one thread touches camera, shader, and
//! scene state, so there is no locking anywhere. Exit (Escape or window
//! close) is a flag on the event loop, checked after the in-flight frame
//! completes.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowAttributes},
};

use crate::gfx::{
    camera::{CameraController, FlyCamera},
    rendering::FrameRenderer,
    texture::PixelData,
};

const WINDOW_WIDTH: u32 = 800;
const WINDOW_HEIGHT: u32 = 600;
const WINDOW_TITLE: &str = "lantern";

pub struct LanternApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    window: Option<Arc<Window>>,
    renderer: Option<FrameRenderer>,
    camera: FlyCamera,
    controller: CameraController,
    last_frame: Option<Instant>,
    diffuse_pixels: PixelData,
    specular_pixels: PixelData,
}

impl LanternApp {
    /// Creates the application with already-decoded material maps.
    ///
    /// Event-loop creation is the one startup step that aborts on failure;
    /// everything downstream degrades instead.
    pub fn new(diffuse_pixels: PixelData, specular_pixels: PixelData) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                window: None,
                renderer: None,
                camera: FlyCamera::new(),
                controller: CameraController::new(),
                last_frame: None,
                diffuse_pixels,
                specular_pixels,
            },
        })
    }

    /// Runs the application (consumes self and starts the event loop).
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = self
            .event_loop
            .take()
            .context("event loop already consumed")?;
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.app_state)
            .context("event loop terminated abnormally")
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = WindowAttributes::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));

        if let Ok(window) = event_loop.create_window(attributes) {
            let window_handle = Arc::new(window);
            self.window = Some(window_handle.clone());

            // Mouse-look wants a captured, hidden cursor. Not every
            // platform supports confinement; locking is the fallback.
            if let Err(err) = window_handle
                .set_cursor_grab(CursorGrabMode::Confined)
                .or_else(|_| window_handle.set_cursor_grab(CursorGrabMode::Locked))
            {
                log::warn!("cursor grab unavailable: {err}");
            }
            window_handle.set_cursor_visible(false);

            let (width, height) = window_handle.inner_size().into();
            let window_clone = window_handle.clone();
            let renderer = pollster::block_on(FrameRenderer::new(
                window_clone,
                width,
                height,
                &self.diffuse_pixels,
                &self.specular_pixels,
            ));
            self.renderer = Some(renderer);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        // Input events mutate the camera before the loop regains control.
        self.controller
            .process_window_event(&event, &mut self.camera);

        match event {
            WindowEvent::KeyboardInput {
                event:
                    winit::event::KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: winit::event::ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                renderer.resize(width, height);
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = self
                    .last_frame
                    .map(|last| (now - last).as_secs_f32())
                    .unwrap_or(0.0);
                self.last_frame = Some(now);

                self.controller.apply_movement(&mut self.camera, dt);
                renderer.render_frame(&self.camera);
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
