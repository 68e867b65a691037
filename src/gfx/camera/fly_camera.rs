//! Free-fly camera model
//!
//! Turns raw pointer, scroll, and movement input into an orthonormal view
//! basis plus a field-of-view scalar. All orientation state lives on the
//! camera itself, including the pointer history, so multiple independent
//! cameras can coexist without shared globals.

use cgmath::{InnerSpace, Vector3};

/// Degrees of rotation per pixel of pointer travel.
const SENSITIVITY: f32 = 0.1;
/// World units per second of held movement input.
const MOVE_SPEED: f32 = 2.5;
/// Pitch is kept strictly inside the poles to avoid gimbal flip.
const PITCH_LIMIT_DEG: f32 = 89.0;
/// Field-of-view bounds in degrees; scrolling narrows the view to zoom.
const FOV_MIN_DEG: f32 = 1.0;
const FOV_MAX_DEG: f32 = 45.0;

/// Movement intents the camera understands.
///
/// Forward/backward travel along the view direction, left/right strafe
/// along the axis orthogonal to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
}

/// A first-person camera driven by yaw/pitch angles.
///
/// The front vector is always a pure function of (yaw, pitch) — it is
/// rederived from the angles after every pointer update rather than
/// integrated incrementally, which prevents numeric drift from ever
/// denormalizing the basis.
pub struct FlyCamera {
    position: Vector3<f32>,
    front: Vector3<f32>,
    up: Vector3<f32>,
    right: Vector3<f32>,
    world_up: Vector3<f32>,
    yaw: f32,
    pitch: f32,
    fov: f32,
    sensitivity: f32,
    speed: f32,
    last_pointer: Option<(f64, f64)>,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl FlyCamera {
    /// Creates a camera at (0, 0, 3) looking down -Z with a 45° view.
    pub fn new() -> Self {
        let mut camera = Self {
            position: Vector3::new(0.0, 0.0, 3.0),
            front: Vector3::new(0.0, 0.0, -1.0),
            up: Vector3::unit_y(),
            right: Vector3::unit_x(),
            world_up: Vector3::unit_y(),
            yaw: -90.0,
            pitch: 0.0,
            fov: FOV_MAX_DEG,
            sensitivity: SENSITIVITY,
            speed: MOVE_SPEED,
            last_pointer: None,
        };
        camera.update_basis();
        camera
    }

    /// Consumes an absolute pointer position in window pixel space.
    ///
    /// The first sample after creation (or after [`reset_pointer`]) only
    /// seeds the history and produces zero orientation change; treating it
    /// as a delta from an arbitrary origin would snap the view. Subsequent
    /// samples rotate yaw by the horizontal delta and pitch by the inverted
    /// vertical delta (screen Y grows downward), both scaled by the
    /// sensitivity coefficient.
    ///
    /// [`reset_pointer`]: FlyCamera::reset_pointer
    pub fn pointer_delta(&mut self, x: f64, y: f64) {
        let Some((last_x, last_y)) = self.last_pointer.replace((x, y)) else {
            return;
        };

        let dx = (x - last_x) as f32 * self.sensitivity;
        let dy = (last_y - y) as f32 * self.sensitivity;

        self.yaw += dx;
        self.pitch = (self.pitch + dy).clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);
        self.update_basis();
    }

    /// Consumes a signed scroll delta and narrows/widens the field of view.
    ///
    /// This is a zoom control, not an optical model: scrolling up shrinks
    /// the angle toward 1°, scrolling down widens it back out to 45°.
    pub fn scroll_delta(&mut self, y: f32) {
        self.fov = (self.fov - y).clamp(FOV_MIN_DEG, FOV_MAX_DEG);
    }

    /// Displaces the camera by `speed * dt` along the requested axis.
    ///
    /// A zero `dt` yields zero displacement. The strafe axis is rederived
    /// from front × up on every call; front changes continuously under
    /// mouse-look, so a cached value would go stale.
    pub fn apply_movement(&mut self, direction: MoveDirection, dt: f32) {
        let step = self.speed * dt;
        match direction {
            MoveDirection::Forward => self.position += self.front * step,
            MoveDirection::Backward => self.position -= self.front * step,
            MoveDirection::Left => {
                self.position -= self.front.cross(self.up).normalize() * step;
            }
            MoveDirection::Right => {
                self.position += self.front.cross(self.up).normalize() * step;
            }
        }
    }

    /// Clears the pointer history so the next sample reseeds it.
    ///
    /// Called when the window loses and regains the cursor; otherwise the
    /// jump between the stale last position and the re-entry position would
    /// read as one huge delta.
    pub fn reset_pointer(&mut self) {
        self.last_pointer = None;
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn front(&self) -> Vector3<f32> {
        self.front
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    /// Field of view in degrees, always within [1, 45].
    pub fn fov_deg(&self) -> f32 {
        self.fov
    }

    pub fn yaw_deg(&self) -> f32 {
        self.yaw
    }

    pub fn pitch_deg(&self) -> f32 {
        self.pitch
    }

    /// Rederives the orthonormal basis from the current yaw and pitch.
    fn update_basis(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        let front = Vector3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        );
        self.front = front.normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn first_pointer_sample_only_seeds() {
        let mut camera = FlyCamera::new();
        camera.pointer_delta(500.0, 400.0);
        assert_eq!(camera.yaw_deg(), -90.0);
        assert_eq!(camera.pitch_deg(), 0.0);

        camera.pointer_delta(510.0, 405.0);
        assert_relative_eq!(camera.yaw_deg(), -89.0, epsilon = 1e-5);
        assert_relative_eq!(camera.pitch_deg(), -0.5, epsilon = 1e-5);
    }

    #[test]
    fn pitch_never_leaves_clamp_range() {
        let mut camera = FlyCamera::new();
        camera.pointer_delta(0.0, 0.0);
        // Drag far past both poles and back.
        for step in [-100_000.0, 100_000.0, -50_000.0] {
            camera.pointer_delta(0.0, step);
            assert!(camera.pitch_deg() >= -89.0 && camera.pitch_deg() <= 89.0);
        }
    }

    #[test]
    fn pitch_is_stable_at_the_bound() {
        let mut camera = FlyCamera::new();
        camera.pointer_delta(0.0, 0.0);
        camera.pointer_delta(0.0, -100_000.0);
        assert_eq!(camera.pitch_deg(), 89.0);

        // Repeated clamped input keeps the value pinned, not oscillating.
        for i in 1..5 {
            camera.pointer_delta(0.0, -100_000.0 - i as f64);
            assert_eq!(camera.pitch_deg(), 89.0);
        }
    }

    #[test]
    fn front_is_unit_length_after_every_update() {
        let mut camera = FlyCamera::new();
        camera.pointer_delta(400.0, 300.0);
        for (x, y) in [(410.0, 290.0), (37.5, 812.25), (-50.0, 300.0), (0.0, 0.0)] {
            camera.pointer_delta(x, y);
            assert_relative_eq!(camera.front().magnitude(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn basis_stays_orthonormal() {
        let mut camera = FlyCamera::new();
        camera.pointer_delta(0.0, 0.0);
        camera.pointer_delta(123.0, -456.0);
        assert_relative_eq!(camera.front().dot(camera.right()), 0.0, epsilon = 1e-5);
        assert_relative_eq!(camera.front().dot(camera.up()), 0.0, epsilon = 1e-5);
        assert_relative_eq!(camera.right().dot(camera.up()), 0.0, epsilon = 1e-5);
        assert_relative_eq!(camera.up().magnitude(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn scroll_zoom_clamps_both_ends() {
        let mut camera = FlyCamera::new();
        assert_eq!(camera.fov_deg(), 45.0);

        camera.scroll_delta(10.0);
        assert_relative_eq!(camera.fov_deg(), 35.0);

        camera.scroll_delta(50.0);
        assert_eq!(camera.fov_deg(), 1.0);

        camera.scroll_delta(-100.0);
        assert_eq!(camera.fov_deg(), 45.0);
    }

    #[test]
    fn zero_elapsed_time_moves_nothing() {
        let mut camera = FlyCamera::new();
        let before = camera.position();
        camera.apply_movement(MoveDirection::Forward, 0.0);
        assert_eq!(camera.position(), before);
    }

    #[test]
    fn forward_for_one_second_covers_move_speed() {
        let mut camera = FlyCamera::new();
        let before = camera.position();
        let front = camera.front();
        camera.apply_movement(MoveDirection::Forward, 1.0);
        let displacement = camera.position() - before;
        assert_relative_eq!(displacement.magnitude(), MOVE_SPEED, epsilon = 1e-5);
        assert_relative_eq!(displacement.dot(front), MOVE_SPEED, epsilon = 1e-5);
    }

    #[test]
    fn strafe_is_orthogonal_to_front() {
        let mut camera = FlyCamera::new();
        camera.pointer_delta(0.0, 0.0);
        camera.pointer_delta(77.0, -31.0);
        let before = camera.position();
        camera.apply_movement(MoveDirection::Left, 0.5);
        let displacement = camera.position() - before;
        assert_relative_eq!(displacement.dot(camera.front()), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn reset_pointer_reseeds_on_next_sample() {
        let mut camera = FlyCamera::new();
        camera.pointer_delta(100.0, 100.0);
        camera.pointer_delta(110.0, 100.0);
        let yaw = camera.yaw_deg();

        camera.reset_pointer();
        // A wildly different position after a reset must not register a jump.
        camera.pointer_delta(900.0, 700.0);
        assert_eq!(camera.yaw_deg(), yaw);
    }
}
