//! Translates window input events into camera operations.

use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::fly_camera::{FlyCamera, MoveDirection};

/// Pixel-delta scroll wheels (trackpads) report much larger magnitudes than
/// line-delta wheels; scale them into the same range.
const PIXEL_SCROLL_SCALE: f32 = 1.0 / 20.0;

/// Routes pointer, scroll, and key events to a [`FlyCamera`] and tracks
/// which movement keys are currently held.
///
/// Events mutate the camera synchronously as they arrive; held-key movement
/// is applied once per frame via [`apply_movement`] so displacement scales
/// with elapsed time rather than event rate.
///
/// [`apply_movement`]: CameraController::apply_movement
pub struct CameraController {
    forward_held: bool,
    backward_held: bool,
    left_held: bool,
    right_held: bool,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraController {
    pub fn new() -> Self {
        Self {
            forward_held: false,
            backward_held: false,
            left_held: false,
            right_held: false,
        }
    }

    /// Feeds one window event to the camera.
    ///
    /// Cursor positions arrive as absolute window coordinates and go to the
    /// camera unmodified; the camera owns the delta computation. Losing
    /// focus clears the pointer history so the cursor's re-entry position
    /// does not register as one huge swing.
    pub fn process_window_event(&mut self, event: &WindowEvent, camera: &mut FlyCamera) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                camera.pointer_delta(position.x, position.y);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => {
                        *y as f32 * PIXEL_SCROLL_SCALE
                    }
                };
                camera.scroll_delta(scroll);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.process_key_event(event);
            }
            WindowEvent::Focused(false) => {
                camera.reset_pointer();
            }
            _ => (),
        }
    }

    /// Updates held-key state from a keyboard event.
    pub fn process_key_event(&mut self, event: &KeyEvent) {
        let held = event.state == ElementState::Pressed;
        match event.physical_key {
            PhysicalKey::Code(KeyCode::KeyW | KeyCode::ArrowUp) => self.forward_held = held,
            PhysicalKey::Code(KeyCode::KeyS | KeyCode::ArrowDown) => self.backward_held = held,
            PhysicalKey::Code(KeyCode::KeyA | KeyCode::ArrowLeft) => self.left_held = held,
            PhysicalKey::Code(KeyCode::KeyD | KeyCode::ArrowRight) => self.right_held = held,
            _ => (),
        }
    }

    /// Applies one frame's worth of movement for every held direction.
    pub fn apply_movement(&self, camera: &mut FlyCamera, dt: f32) {
        if self.forward_held {
            camera.apply_movement(MoveDirection::Forward, dt);
        }
        if self.backward_held {
            camera.apply_movement(MoveDirection::Backward, dt);
        }
        if self.left_held {
            camera.apply_movement(MoveDirection::Left, dt);
        }
        if self.right_held {
            camera.apply_movement(MoveDirection::Right, dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cgmath::InnerSpace;

    #[test]
    fn held_directions_compound_within_one_frame() {
        let mut controller = CameraController::new();
        controller.forward_held = true;
        controller.right_held = true;

        let mut camera = FlyCamera::new();
        let before = camera.position();
        controller.apply_movement(&mut camera, 1.0);

        let displacement = camera.position() - before;
        // Forward and strafe both contribute; the result is diagonal.
        assert!(displacement.magnitude() > 2.5);
    }

    #[test]
    fn no_keys_held_means_no_movement() {
        let controller = CameraController::new();
        let mut camera = FlyCamera::new();
        let before = camera.position();
        controller.apply_movement(&mut camera, 1.0);
        assert_eq!(camera.position(), before);
    }

    #[test]
    fn opposing_keys_cancel() {
        let mut controller = CameraController::new();
        controller.forward_held = true;
        controller.backward_held = true;

        let mut camera = FlyCamera::new();
        let before = camera.position();
        controller.apply_movement(&mut camera, 1.0);
        let displacement = camera.position() - before;
        assert_relative_eq!(displacement.magnitude(), 0.0, epsilon = 1e-5);
    }
}
