use glam::Vec3;

pub const MAX_POINT_LIGHTS: usize = 5;
pub const MAX_SPOT_LIGHTS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub exponent: f32,
}

impl Attenuation {
    pub const fn new(constant: f32, linear: f32, exponent: f32) -> Self {
        Self {
            constant,
            linear,
            exponent,
        }
    }
}

impl Default for Attenuation {
    fn default() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub attenuation: Attenuation,
}

impl PointLight {
    pub fn new(position: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            position,
            color,
            intensity,
            attenuation: Attenuation::default(),
        }
    }

    pub fn with_attenuation(mut self, attenuation: Attenuation) -> Self {
        self.attenuation = attenuation;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpotLight {
    pub point_light: PointLight,
    pub cone_direction: Vec3,
    /// Cosine of the cone half angle.
    pub cut_off: f32,
}

impl SpotLight {
    pub fn new(point_light: PointLight, cone_direction: Vec3, cut_off: f32) -> Self {
        Self {
            point_light,
            cone_direction,
            cut_off,
        }
    }

    pub fn from_angle(point_light: PointLight, cone_direction: Vec3, angle_degrees: f32) -> Self {
        Self::new(point_light, cone_direction, angle_degrees.to_radians().cos())
    }
}

/// Sun-like light. `direction` points from the scene towards the light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub shadow_pos_mult: f32,
}

impl DirectionalLight {
    pub fn new(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            direction,
            color,
            intensity,
            shadow_pos_mult: 1.0,
        }
    }

    pub fn with_shadow_pos_mult(mut self, shadow_pos_mult: f32) -> Self {
        self.shadow_pos_mult = shadow_pos_mult;
        self
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::new(Vec3::Y, Vec3::ONE, 1.0)
    }
}

/// Fixed-capacity light set of a scene.
#[derive(Clone, Debug, Default)]
pub struct SceneLights {
    pub ambient: Vec3,
    point_lights: Vec<PointLight>,
    spot_lights: Vec<SpotLight>,
    pub directional: DirectionalLight,
}

impl SceneLights {
    pub fn new(ambient: Vec3, directional: DirectionalLight) -> Self {
        Self {
            ambient,
            directional,
            ..Self::default()
        }
    }

    /// Returns `false` when the list is already full.
    pub fn add_point_light(&mut self, light: PointLight) -> bool {
        if self.point_lights.len() >= MAX_POINT_LIGHTS {
            log::warn!(
                "Point light ignored: at most {} point lights are supported",
                MAX_POINT_LIGHTS
            );
            return false;
        }
        self.point_lights.push(light);
        true
    }

    /// Returns `false` when the list is already full.
    pub fn add_spot_light(&mut self, light: SpotLight) -> bool {
        if self.spot_lights.len() >= MAX_SPOT_LIGHTS {
            log::warn!(
                "Spot light ignored: at most {} spot lights are supported",
                MAX_SPOT_LIGHTS
            );
            return false;
        }
        self.spot_lights.push(light);
        true
    }

    pub fn point_lights(&self) -> &[PointLight] {
        &self.point_lights
    }

    pub fn point_lights_mut(&mut self) -> &mut [PointLight] {
        &mut self.point_lights
    }

    pub fn spot_lights(&self) -> &[SpotLight] {
        &self.spot_lights
    }

    pub fn spot_lights_mut(&mut self) -> &mut [SpotLight] {
        &mut self.spot_lights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_light_defaults_to_constant_attenuation() {
        let light = PointLight::new(Vec3::ZERO, Vec3::ONE, 1.0);
        assert_eq!(light.attenuation, Attenuation::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn light_lists_are_capped() {
        let mut lights = SceneLights::default();
        let point = PointLight::new(Vec3::ZERO, Vec3::ONE, 1.0);
        for _ in 0..MAX_POINT_LIGHTS {
            assert!(lights.add_point_light(point));
        }
        assert!(!lights.add_point_light(point));
        assert_eq!(lights.point_lights().len(), MAX_POINT_LIGHTS);

        let spot = SpotLight::from_angle(point, Vec3::NEG_Z, 30.0);
        for _ in 0..MAX_SPOT_LIGHTS {
            assert!(lights.add_spot_light(spot));
        }
        assert!(!lights.add_spot_light(spot));
        assert_eq!(lights.spot_lights().len(), MAX_SPOT_LIGHTS);
    }

    #[test]
    fn spot_cut_off_is_cosine() {
        let spot = SpotLight::from_angle(PointLight::new(Vec3::ZERO, Vec3::ONE, 1.0), Vec3::Z, 60.0);
        assert!((spot.cut_off - 0.5).abs() < 1e-6);
    }
}
