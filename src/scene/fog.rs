use glam::Vec3;

/// Exponential-squared distance fog. A zero density disables it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Fog {
    pub color: Vec3,
    pub density: f32,
}

impl Fog {
    pub fn new(color: Vec3, density: f32) -> Self {
        Self { color, density }
    }

    pub fn is_active(&self) -> bool {
        self.density > 0.0
    }

    /// Fraction of the surface colour that survives at `distance`.
    pub fn factor(&self, distance: f32) -> f32 {
        let d = distance * self.density;
        (1.0 / (d * d).exp()).clamp(0.0, 1.0)
    }
}
