//! Camera controls and the camera target display

use nalgebra::{Matrix4, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_FOV: f64 = 90.0;
pub const DEFAULT_YAW: f64 = 0.0;
pub const DEFAULT_PITCH: f64 = -45.0;
/// Orbit distance at zero dolly.
pub const DEFAULT_DISTANCE: f64 = 50.0;

const LOG_DISTANCE_SCALE: f64 = 50.0;
const LOG_DISTANCE_LIMIT: f64 = 500.0;
const MIN_PITCH: f64 = -180.0;
const MAX_PITCH: f64 = 0.0;
const NEAR: f64 = 0.1;
const FAR: f64 = 10000.0;

/// View and projection matrices for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMatrices {
    pub view: Matrix4<f64>,
    pub proj: Matrix4<f64>,
}

impl CameraMatrices {
    pub fn view_projection(&self) -> Matrix4<f64> {
        self.proj * self.view
    }
}

/// Orbit camera around a target point.
///
/// Pitch 0 looks straight down at the target, -90 looks at it from the side.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Camera {
    target: Vector3<f64>,
    yaw: f64,
    pitch: f64,
    log_distance: f64,
    fov: f64,
    orthographic: bool,
    proj_offset: (f64, f64),
}

impl Camera {
    pub fn new() -> Self {
        Self {
            target: Vector3::zeros(),
            yaw: DEFAULT_YAW,
            pitch: DEFAULT_PITCH,
            log_distance: 0.0,
            fov: DEFAULT_FOV,
            orthographic: false,
            proj_offset: (0.0, 0.0),
        }
    }

    /// Reset the camera view and fov.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Orbit the camera left or right about the camera target.
    pub fn yaw(&mut self, degrees: f64) {
        self.set_yaw(self.yaw + degrees);
    }

    /// Pitch the camera up or down.
    pub fn pitch(&mut self, degrees: f64) {
        self.set_pitch(self.pitch + degrees);
    }

    /// Move the camera towards or away from the target.
    pub fn dolly(&mut self, amount: f64) {
        self.set_dolly(self.log_distance + amount);
    }

    /// Move the camera in the XY plane of the camera view.
    pub fn dolly_xy(&mut self, x: f64, y: f64) {
        let rotation = self.rotation().fixed_view::<3, 3>(0, 0).into_owned();
        let shift = rotation.transpose() * Vector3::new(x, y, 0.0) * self.view_distance();
        self.target += shift;
    }

    pub fn set_yaw(&mut self, degrees: f64) {
        self.yaw = degrees.rem_euclid(360.0);
    }

    pub fn set_pitch(&mut self, degrees: f64) {
        self.pitch = degrees.clamp(MIN_PITCH, MAX_PITCH);
    }

    pub fn set_dolly(&mut self, log_distance: f64) {
        self.log_distance = log_distance.clamp(-LOG_DISTANCE_LIMIT, LOG_DISTANCE_LIMIT);
    }

    pub fn set_target(&mut self, target: Vector3<f64>) {
        self.target = target;
    }

    /// Set the diagonal field of view.
    pub fn set_fov(&mut self, degrees: f64) {
        self.fov = degrees;
    }

    /// Use an orthographic or perspective projection.
    pub fn set_orthographic(&mut self, state: bool) {
        self.orthographic = state;
    }

    /// Set the 2d position of the camera target in the viewport, in
    /// normalized coordinates [-1, 1].
    pub fn set_proj_offset(&mut self, x: f64, y: f64) {
        self.proj_offset = (x, y);
    }

    pub fn target(&self) -> Vector3<f64> {
        self.target
    }

    pub fn yaw_degrees(&self) -> f64 {
        self.yaw
    }

    pub fn pitch_degrees(&self) -> f64 {
        self.pitch
    }

    pub fn dolly_amount(&self) -> f64 {
        self.log_distance
    }

    pub fn fov(&self) -> f64 {
        self.fov
    }

    pub fn is_orthographic(&self) -> bool {
        self.orthographic
    }

    pub fn proj_offset(&self) -> (f64, f64) {
        self.proj_offset
    }

    /// Distance from the eye to the target.
    pub fn view_distance(&self) -> f64 {
        DEFAULT_DISTANCE * (self.log_distance / LOG_DISTANCE_SCALE).exp()
    }

    fn rotation(&self) -> Matrix4<f64> {
        Matrix4::from_axis_angle(&Vector3::x_axis(), self.pitch.to_radians())
            * Matrix4::from_axis_angle(&Vector3::z_axis(), self.yaw.to_radians())
    }

    pub fn view_matrix(&self) -> Matrix4<f64> {
        Matrix4::new_translation(&Vector3::new(0.0, 0.0, -self.view_distance()))
            * self.rotation()
            * Matrix4::new_translation(&-self.target)
    }

    /// Projection for a viewport with the given width / height ratio,
    /// including the projection offset.
    pub fn proj_matrix(&self, aspect: f64) -> Matrix4<f64> {
        let aspect = if aspect > 0.0 { aspect } else { 1.0 };
        // split the diagonal half-angle into half extents at unit depth
        let diagonal = (self.fov.to_radians() / 2.0).tan();
        let half_height = diagonal / (1.0 + aspect * aspect).sqrt();
        let half_width = half_height * aspect;

        let mut proj = Matrix4::zeros();
        if self.orthographic {
            let distance = self.view_distance();
            proj[(0, 0)] = 1.0 / (half_width * distance);
            proj[(1, 1)] = 1.0 / (half_height * distance);
            proj[(2, 2)] = -2.0 / (FAR - NEAR);
            proj[(2, 3)] = -(FAR + NEAR) / (FAR - NEAR);
            proj[(3, 3)] = 1.0;
        } else {
            proj[(0, 0)] = 1.0 / half_width;
            proj[(1, 1)] = 1.0 / half_height;
            proj[(2, 2)] = -(FAR + NEAR) / (FAR - NEAR);
            proj[(2, 3)] = -2.0 * FAR * NEAR / (FAR - NEAR);
            proj[(3, 2)] = -1.0;
        }

        let (x, y) = self.proj_offset;
        Matrix4::new_translation(&Vector3::new(x, y, 0.0)) * proj
    }

    pub fn matrices(&self, aspect: f64) -> CameraMatrices {
        CameraMatrices {
            view: self.view_matrix(),
            proj: self.proj_matrix(aspect),
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// State of the distance rings drawn around the camera target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TargetDisplay {
    rings_enabled: bool,
    ring_size: i32,
}

impl TargetDisplay {
    pub fn new() -> Self {
        Self {
            rings_enabled: false,
            ring_size: 1,
        }
    }

    /// Enable or disable distance ring display.
    pub fn enable_rings(&mut self, state: bool) {
        self.rings_enabled = state;
    }

    /// Set the distance between rings as a power of ten meters.
    pub fn set_ring_size(&mut self, n: i32) {
        self.ring_size = n;
    }

    pub fn rings_enabled(&self) -> bool {
        self.rings_enabled
    }

    pub fn ring_size(&self) -> i32 {
        self.ring_size
    }

    /// Ring spacing in meters.
    pub fn ring_spacing(&self) -> f64 {
        10f64.powi(self.ring_size)
    }
}

impl Default for TargetDisplay {
    fn default() -> Self {
        Self::new()
    }
}
