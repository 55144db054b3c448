use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::scene::{
    DirectionalLight, PointLight, SceneLights, SpotLight, MAX_POINT_LIGHTS, MAX_SPOT_LIGHTS,
};

/// Copy of a light expressed in the camera's view space. The scene-owned
/// light is never modified, so repeated frames produce the same values.
pub trait ViewSpace: Sized {
    fn to_view_space(&self, view: &Mat4) -> Self;
}

impl ViewSpace for PointLight {
    fn to_view_space(&self, view: &Mat4) -> Self {
        Self {
            position: view.transform_point3(self.position),
            ..*self
        }
    }
}

impl ViewSpace for SpotLight {
    fn to_view_space(&self, view: &Mat4) -> Self {
        Self {
            point_light: self.point_light.to_view_space(view),
            cone_direction: view.transform_vector3(self.cone_direction),
            ..*self
        }
    }
}

impl ViewSpace for DirectionalLight {
    fn to_view_space(&self, view: &Mat4) -> Self {
        Self {
            direction: view.transform_vector3(self.direction),
            ..*self
        }
    }
}

pub fn to_view_space<L: ViewSpace>(light: &L, view: &Mat4) -> L {
    light.to_view_space(view)
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct PointLightRaw {
    pub position_intensity: [f32; 4],
    pub color: [f32; 4],
    pub attenuation: [f32; 4],
}

impl PointLightRaw {
    pub fn from_light(light: &PointLight) -> Self {
        let att = light.attenuation;
        Self {
            position_intensity: light.position.extend(light.intensity).to_array(),
            color: light.color.extend(0.0).to_array(),
            attenuation: [att.constant, att.linear, att.exponent, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SpotLightRaw {
    pub light: PointLightRaw,
    pub cone_direction_cut_off: [f32; 4],
}

impl SpotLightRaw {
    pub fn from_light(light: &SpotLight) -> Self {
        Self {
            light: PointLightRaw::from_light(&light.point_light),
            cone_direction_cut_off: light.cone_direction.extend(light.cut_off).to_array(),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct DirectionalLightRaw {
    pub direction_intensity: [f32; 4],
    pub color: [f32; 4],
}

impl DirectionalLightRaw {
    pub fn from_light(light: &DirectionalLight) -> Self {
        Self {
            direction_intensity: light.direction.extend(light.intensity).to_array(),
            color: light.color.extend(0.0).to_array(),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct LightsUniform {
    pub ambient: [f32; 4],
    /// x = point lights, y = spot lights
    pub counts: [u32; 4],
    pub points: [PointLightRaw; MAX_POINT_LIGHTS],
    pub spots: [SpotLightRaw; MAX_SPOT_LIGHTS],
    pub directional: DirectionalLightRaw,
}

impl LightsUniform {
    /// Packs the scene lights after moving them into view space.
    pub fn from_scene(lights: &SceneLights, view: &Mat4) -> Self {
        let mut uniform = Self::zeroed();
        uniform.ambient = lights.ambient.extend(1.0).to_array();

        let point_count = lights.point_lights().len().min(MAX_POINT_LIGHTS);
        uniform.counts[0] = point_count as u32;
        for (dst, src) in uniform.points.iter_mut().zip(lights.point_lights()) {
            *dst = PointLightRaw::from_light(&to_view_space(src, view));
        }

        let spot_count = lights.spot_lights().len().min(MAX_SPOT_LIGHTS);
        uniform.counts[1] = spot_count as u32;
        for (dst, src) in uniform.spots.iter_mut().zip(lights.spot_lights()) {
            *dst = SpotLightRaw::from_light(&to_view_space(src, view));
        }

        uniform.directional =
            DirectionalLightRaw::from_light(&to_view_space(&lights.directional, view));
        uniform
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::transform::build_view;
    use glam::Vec3;

    #[test]
    fn point_position_transforms_as_point() {
        let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0));
        let light = PointLight::new(Vec3::new(1.0, 2.0, 3.0), Vec3::ONE, 1.0);
        let moved = light.to_view_space(&view);
        assert!(moved.position.abs_diff_eq(Vec3::new(1.0, 2.0, -2.0), 1e-6));
        assert_eq!(light.position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn directions_ignore_translation() {
        let view = Mat4::from_translation(Vec3::new(4.0, 4.0, 4.0));
        let spot = SpotLight::new(PointLight::new(Vec3::ZERO, Vec3::ONE, 1.0), Vec3::NEG_Z, 0.5);
        let moved = spot.to_view_space(&view);
        assert!(moved.cone_direction.abs_diff_eq(Vec3::NEG_Z, 1e-6));
        assert!(moved.point_light.position.abs_diff_eq(Vec3::splat(4.0), 1e-6));
        assert_eq!(moved.cut_off, 0.5);
    }

    #[test]
    fn uniform_counts_match_scene() {
        let mut lights = SceneLights::new(Vec3::splat(0.3), DirectionalLight::default());
        lights.add_point_light(PointLight::new(Vec3::X, Vec3::ONE, 1.0));
        let uniform = LightsUniform::from_scene(&lights, &Mat4::IDENTITY);
        assert_eq!(uniform.counts[0], 1);
        assert_eq!(uniform.counts[1], 0);
        assert_eq!(uniform.ambient, [0.3, 0.3, 0.3, 1.0]);
        assert_eq!(uniform.points[1].position_intensity, [0.0; 4]);
    }

    #[test]
    fn directional_uses_rotation_only() {
        let view = build_view(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 90.0, 0.0));
        let light = DirectionalLight::new(Vec3::X, Vec3::ONE, 1.0);
        let moved = light.to_view_space(&view);
        assert!((moved.direction.length() - 1.0).abs() < 1e-6);
        assert!(moved.direction.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5));
    }

    #[test]
    fn struct_sizes_are_uniform_compatible() {
        assert_eq!(std::mem::size_of::<PointLightRaw>(), 48);
        assert_eq!(std::mem::size_of::<SpotLightRaw>(), 64);
        assert_eq!(std::mem::size_of::<DirectionalLightRaw>(), 32);
        assert_eq!(std::mem::size_of::<LightsUniform>() % 16, 0);
    }
}
