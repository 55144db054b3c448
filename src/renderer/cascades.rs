use glam::{Mat4, Vec3};

use crate::scene::transform::{build_light_view, build_ortho, light_angles, light_eye};
use crate::scene::DirectionalLight;

pub const NUM_CASCADES: usize = 3;

/// One depth slice of the camera frustum with its light-space matrices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowCascade {
    near: f32,
    far: f32,
    light_view: Mat4,
    ortho: Mat4,
}

impl ShadowCascade {
    pub fn new(near: f32, far: f32) -> Self {
        Self {
            near,
            far,
            light_view: Mat4::IDENTITY,
            ortho: Mat4::IDENTITY,
        }
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn light_view(&self) -> Mat4 {
        self.light_view
    }

    pub fn ortho(&self) -> Mat4 {
        self.ortho
    }

    pub fn light_view_proj(&self) -> Mat4 {
        self.ortho * self.light_view
    }

    fn update(
        &mut self,
        camera_to_world: &Mat4,
        lens: &CameraLens,
        light: &DirectionalLight,
        margin: f32,
    ) {
        let corners = frustum_corners(self.near, self.far, lens.fov_y, lens.aspect)
            .map(|corner| camera_to_world.transform_point3(corner));

        let direction = light.direction.try_normalize().unwrap_or(Vec3::Y);
        self.light_view = build_light_view(
            light_eye(direction, light.shadow_pos_mult),
            light_angles(direction),
        );

        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for corner in corners {
            let light_space = self.light_view.transform_point3(corner);
            min = min.min(light_space);
            max = max.max(light_space);
        }

        // Light space looks down -Z, so the nearest corner has the largest z.
        self.ortho = build_ortho(
            min.x - margin,
            max.x + margin,
            min.y - margin,
            max.y + margin,
            -max.z - margin,
            -min.z + margin,
        );
    }
}

/// Projection parameters of the camera the cascades are fitted to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraLens {
    pub fov_y: f32,
    pub aspect: f32,
}

impl CameraLens {
    pub fn new(fov_y: f32, width: u32, height: u32) -> Self {
        Self {
            fov_y,
            aspect: width.max(1) as f32 / height.max(1) as f32,
        }
    }
}

/// View-space corners of the frustum slice between `near` and `far`, near
/// plane first.
pub fn frustum_corners(near: f32, far: f32, fov_y: f32, aspect: f32) -> [Vec3; 8] {
    let tan_half = (fov_y * 0.5).tan();
    let mut corners = [Vec3::ZERO; 8];
    for (slot, distance) in [near, far].into_iter().enumerate() {
        let half_height = distance * tan_half;
        let half_width = half_height * aspect;
        let base = slot * 4;
        corners[base] = Vec3::new(-half_width, -half_height, -distance);
        corners[base + 1] = Vec3::new(half_width, -half_height, -distance);
        corners[base + 2] = Vec3::new(half_width, half_height, -distance);
        corners[base + 3] = Vec3::new(-half_width, half_height, -distance);
    }
    corners
}

/// Contiguous cascades covering `[z_near, last split]` of the camera frustum.
#[derive(Clone, Debug)]
pub struct ShadowCascadeSet {
    cascades: Vec<ShadowCascade>,
    margin: f32,
}

impl ShadowCascadeSet {
    pub fn new(z_near: f32, splits: &[f32], margin: f32) -> Self {
        debug_assert!(
            splits.windows(2).all(|pair| pair[0] < pair[1]),
            "cascade splits must increase"
        );
        debug_assert!(
            splits.first().map_or(true, |&far| far > z_near),
            "first cascade split must lie beyond the near plane"
        );
        let mut near = z_near;
        let cascades = splits
            .iter()
            .map(|&far| {
                let cascade = ShadowCascade::new(near, far);
                near = far;
                cascade
            })
            .collect();
        Self { cascades, margin }
    }

    /// Refits every cascade to the current camera and light.
    pub fn update(&mut self, view: &Mat4, lens: &CameraLens, light: &DirectionalLight) {
        let camera_to_world = view.inverse();
        for cascade in &mut self.cascades {
            cascade.update(&camera_to_world, lens, light, self.margin);
        }
    }

    pub fn cascades(&self) -> &[ShadowCascade] {
        &self.cascades
    }

    pub fn len(&self) -> usize {
        self.cascades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cascades.is_empty()
    }

    /// Far split of each cascade, padded for a `vec4` uniform slot.
    pub fn far_planes(&self) -> [f32; 4] {
        let mut planes = [0.0; 4];
        for (plane, cascade) in planes.iter_mut().zip(&self.cascades) {
            *plane = cascade.far;
        }
        planes
    }
}
