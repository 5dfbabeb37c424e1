//! Camera
//!
//! The camera contract consumed by the frame renderer and the scene
//! orchestrator, and a basic perspective orbit camera implementing it.

use chisel_core::Aabb;
use glam::{Mat4, Vec3};

/// Camera collaborator
pub trait Camera {
    /// Fit the depth range around the scene bounds
    fn optimize_near_far(&mut self, bounds: &Aabb);

    /// Track the drawable size in pixels
    fn on_resize(&mut self, width: u32, height: u32);

    /// Return to the default framing
    fn reset_view(&mut self);

    /// Orbit around `pivot` at distance `zoom`
    fn set_and_focus_on_pivot(&mut self, pivot: Vec3, zoom: f32);

    /// Distance factor that fits a unit-radius sphere in the frustum
    fn compute_frustum_fit(&self) -> f32;

    fn view(&self) -> Mat4;

    fn projection(&self) -> Mat4;
}

/// Perspective camera orbiting a pivot
#[derive(Debug, Clone)]
pub struct ViewportCamera {
    /// Orbit center
    pub pivot: Vec3,
    /// Unit vector from pivot towards the eye
    pub direction: Vec3,
    /// Distance from pivot to eye
    pub zoom: f32,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
    width: u32,
    height: u32,
    default_zoom: f32,
}

impl ViewportCamera {
    pub fn new() -> Self {
        Self {
            pivot: Vec3::ZERO,
            direction: Vec3::Z,
            zoom: 30.0,
            fov: 45.0,
            near: 0.05,
            far: 5000.0,
            width: 1,
            height: 1,
            default_zoom: 30.0,
        }
    }

    /// Eye position in world space
    pub fn position(&self) -> Vec3 {
        self.pivot + self.direction * self.zoom
    }

    /// Viewport width over height
    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

impl Default for ViewportCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera for ViewportCamera {
    fn optimize_near_far(&mut self, bounds: &Aabb) {
        if bounds.is_empty() {
            return;
        }
        let diagonal = bounds.diagonal();
        let distance = self.position().distance(bounds.center());
        self.near = (distance - diagonal).max(0.01);
        self.far = distance + diagonal;
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn reset_view(&mut self) {
        self.pivot = Vec3::ZERO;
        self.direction = Vec3::Z;
        self.zoom = self.default_zoom;
    }

    fn set_and_focus_on_pivot(&mut self, pivot: Vec3, zoom: f32) {
        self.pivot = pivot;
        self.zoom = zoom;
    }

    fn compute_frustum_fit(&self) -> f32 {
        let half_fov_y = self.fov.to_radians() * 0.5;
        let half_fov_x = (half_fov_y.tan() * self.aspect()).atan();
        1.0 / half_fov_y.min(half_fov_x).sin()
    }

    fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.pivot, Vec3::Y)
    }

    fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect(), self.near, self.far)
    }
}
