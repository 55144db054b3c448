use std::f32::consts::PI;

use glam::Vec3;

use super::transform::Transform;
use crate::asset::MeshId;

/// Parametrised atmospheric sky dome centred on the camera.
#[derive(Clone, Debug)]
pub struct Sky {
    pub mesh: MeshId,
    pub transform: Transform,
    pub turbidity: f32,
    pub rayleigh: f32,
    pub mie_coefficient: f32,
    pub mie_directional_g: f32,
    pub luminance: f32,
    /// Sun elevation control in `[0, 1]`.
    pub inclination: f32,
    /// Sun heading control in `[0, 1]`.
    pub azimuth: f32,
    pub distance: f32,
}

impl Sky {
    pub const DOME_WIDTH_SEGMENTS: u32 = 32;
    pub const DOME_HEIGHT_SEGMENTS: u32 = 15;

    pub fn new(mesh: MeshId) -> Self {
        Self {
            mesh,
            transform: Transform::default(),
            turbidity: 10.0,
            rayleigh: 2.0,
            mie_coefficient: 0.005,
            mie_directional_g: 0.8,
            luminance: 1.0,
            inclination: 0.49,
            azimuth: 0.25,
            distance: 400_000.0,
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.transform.scale = radius;
        self
    }

    pub fn sun_position(&self) -> Vec3 {
        sun_position(self.inclination, self.azimuth, self.distance)
    }
}

/// `distance * (cos phi, sin phi * sin theta, sin phi * cos theta)` with
/// `theta = pi * (inclination - 0.5)` and `phi = 2 pi * (azimuth - 0.5)`.
pub fn sun_position(inclination: f32, azimuth: f32, distance: f32) -> Vec3 {
    let theta = PI * (inclination - 0.5);
    let phi = 2.0 * PI * (azimuth - 0.5);
    Vec3::new(
        distance * phi.cos(),
        distance * phi.sin() * theta.sin(),
        distance * phi.sin() * theta.cos(),
    )
}
