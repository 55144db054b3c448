use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use super::cascades::{ShadowCascade, ShadowCascadeSet, NUM_CASCADES};
use super::lights::LightsUniform;
use crate::scene::transform::build_model_view;
use crate::scene::{Fog, SceneLights, Sky};

/// Per-instance data, indexed by `instance_index` in the shaders.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq)]
pub struct ObjectData {
    pub model: [[f32; 4]; 4],
}

impl From<Mat4> for ObjectData {
    fn from(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CascadeUniform {
    pub ortho: [[f32; 4]; 4],
    pub light_view: [[f32; 4]; 4],
}

impl CascadeUniform {
    pub fn from_cascade(cascade: &ShadowCascade) -> Self {
        Self {
            ortho: cascade.ortho().to_cols_array_2d(),
            light_view: cascade.light_view().to_cols_array_2d(),
        }
    }
}

/// Everything the scene and terrain shaders read besides per-object data.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SceneUniforms {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub cascades: [CascadeUniform; NUM_CASCADES],
    pub cascade_far_planes: [f32; 4],
    /// rgb = colour, a = density
    pub fog: [f32; 4],
    /// x = specular power, y = shadows enabled
    pub params: [f32; 4],
    pub lights: LightsUniform,
}

pub struct SceneInputs<'a> {
    pub view: Mat4,
    pub projection: Mat4,
    pub cascades: &'a ShadowCascadeSet,
    pub lights: &'a SceneLights,
    pub fog: &'a Fog,
    pub render_shadows: bool,
    pub specular_power: f32,
}

impl SceneUniforms {
    pub fn new(inputs: &SceneInputs<'_>) -> Self {
        let mut cascades = [CascadeUniform::zeroed(); NUM_CASCADES];
        for (dst, src) in cascades.iter_mut().zip(inputs.cascades.cascades()) {
            *dst = CascadeUniform::from_cascade(src);
        }

        Self {
            view: inputs.view.to_cols_array_2d(),
            projection: inputs.projection.to_cols_array_2d(),
            cascades,
            cascade_far_planes: inputs.cascades.far_planes(),
            fog: inputs.fog.color.extend(inputs.fog.density).to_array(),
            params: [
                inputs.specular_power,
                if inputs.render_shadows { 1.0 } else { 0.0 },
                0.0,
                0.0,
            ],
            lights: LightsUniform::from_scene(inputs.lights, &inputs.view),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SkyUniforms {
    pub projection: [[f32; 4]; 4],
    pub model_view: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub sun_position: [f32; 4],
    /// x = rayleigh, y = turbidity, z = mie coefficient, w = luminance
    pub scattering: [f32; 4],
    /// x = mie directional g
    pub mie: [f32; 4],
}

impl SkyUniforms {
    /// `view` must already have its translation removed.
    pub fn new(sky: &Sky, view: &Mat4, projection: &Mat4) -> Self {
        let model = sky.transform.matrix();
        let sun: Vec3 = sky.sun_position();
        Self {
            projection: projection.to_cols_array_2d(),
            model_view: build_model_view(&sky.transform, view).to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            sun_position: sun.extend(1.0).to_array(),
            scattering: [sky.rayleigh, sky.turbidity, sky.mie_coefficient, sky.luminance],
            mie: [sky.mie_directional_g, 0.0, 0.0, 0.0],
        }
    }
}

/// Drops the translation so the sky stays centred on the eye.
pub fn rotation_only(view: &Mat4) -> Mat4 {
    let mut view = *view;
    view.w_axis.x = 0.0;
    view.w_axis.y = 0.0;
    view.w_axis.z = 0.0;
    view
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_sizes_are_aligned() {
        assert_eq!(std::mem::size_of::<ObjectData>(), 64);
        assert_eq!(std::mem::size_of::<CascadeUniform>(), 128);
        assert_eq!(std::mem::size_of::<SceneUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<SkyUniforms>() % 16, 0);
    }

    #[test]
    fn rotation_only_keeps_rotation() {
        let view = Mat4::from_rotation_y(0.3) * Mat4::from_translation(Vec3::new(5.0, 6.0, 7.0));
        let stripped = rotation_only(&view);
        assert!(stripped.transform_point3(Vec3::ZERO).abs_diff_eq(Vec3::ZERO, 1e-6));
        assert!(stripped
            .transform_vector3(Vec3::X)
            .abs_diff_eq(view.transform_vector3(Vec3::X), 1e-6));
    }
}
