use glam::{Mat4, Vec3};

/// Position, Euler rotation in degrees (applied X, Y, Z) and uniform scale of
/// a renderable item.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn matrix(&self) -> Mat4 {
        build_model(self)
    }
}

/// `T(position) * Rx(-x) * Ry(-y) * Rz(-z) * S(scale)`.
pub fn build_model(transform: &Transform) -> Mat4 {
    let rotation = transform.rotation;
    Mat4::from_translation(transform.position)
        * Mat4::from_rotation_x(-rotation.x.to_radians())
        * Mat4::from_rotation_y(-rotation.y.to_radians())
        * Mat4::from_rotation_z(-rotation.z.to_radians())
        * Mat4::from_scale(Vec3::splat(transform.scale))
}

/// Rotates about the origin first, then translates, so the eye turns in place.
/// The Z angle is ignored.
pub fn build_view(position: Vec3, rotation: Vec3) -> Mat4 {
    Mat4::from_rotation_x(rotation.x.to_radians())
        * Mat4::from_rotation_y(rotation.y.to_radians())
        * Mat4::from_translation(-position)
}

pub fn build_model_view(transform: &Transform, view: &Mat4) -> Mat4 {
    *view * build_model(transform)
}

/// Orthographic projection mapping depth into wgpu's `[0, 1]` range.
pub fn build_ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    Mat4::orthographic_rh(left, right, bottom, top, near, far)
}

pub fn build_projection(fov_y_radians: f32, width: u32, height: u32, z_near: f32, z_far: f32) -> Mat4 {
    let aspect = width.max(1) as f32 / height.max(1) as f32;
    Mat4::perspective_rh(fov_y_radians, aspect, z_near, z_far)
}

pub fn build_light_view(position: Vec3, angles: Vec3) -> Mat4 {
    build_view(position, angles)
}

/// Euler angles (degrees) that point an orthographic eye along `direction`.
pub fn light_angles(direction: Vec3) -> Vec3 {
    let direction = direction.try_normalize().unwrap_or(Vec3::Y);
    Vec3::new(
        direction.z.clamp(-1.0, 1.0).acos().to_degrees(),
        direction.x.clamp(-1.0, 1.0).asin().to_degrees(),
        0.0,
    )
}

/// Synthetic eye of a directional light.
pub fn light_eye(direction: Vec3, shadow_pos_mult: f32) -> Vec3 {
    direction * shadow_pos_mult
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_identity() {
        let m = Transform::default().matrix();
        assert!(m.abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn translate_then_scale_ok() {
        let tr = Transform::from_position(Vec3::new(1.0, 2.0, 3.0)).with_scale(2.0);
        let p = tr.matrix().transform_point3(Vec3::new(1.0, 0.0, 0.0));
        // (1,0,0) -> (2,0,0) -> (3,2,3)
        assert!(p.abs_diff_eq(Vec3::new(3.0, 2.0, 3.0), 1e-6));
    }

    #[test]
    fn model_rotation_is_negated() {
        let tr = Transform::default().with_rotation(Vec3::new(0.0, 90.0, 0.0));
        let p = tr.matrix().transform_vector3(Vec3::X);
        // Ry(-90) maps +X onto +Z.
        assert!(p.abs_diff_eq(Vec3::Z, 1e-5));
    }

    #[test]
    fn view_moves_eye_to_origin() {
        let eye = Vec3::new(4.0, -2.0, 7.0);
        let view = build_view(eye, Vec3::new(30.0, -45.0, 12.0));
        assert!(view.transform_point3(eye).abs_diff_eq(Vec3::ZERO, 1e-5));
    }

    #[test]
    fn model_view_applies_model_first() {
        let tr = Transform::from_position(Vec3::new(1.0, 2.0, 3.0))
            .with_rotation(Vec3::new(10.0, 20.0, 30.0))
            .with_scale(2.0);
        let view = build_view(Vec3::new(-3.0, 4.0, 9.0), Vec3::new(15.0, -40.0, 0.0));
        let p = Vec3::new(0.5, -1.0, 2.0);

        let expected = view.transform_point3(tr.matrix().transform_point3(p));
        let actual = build_model_view(&tr, &view).transform_point3(p);
        assert!(actual.abs_diff_eq(expected, 1e-4));
    }

    #[test]
    fn view_ignores_z_rotation() {
        let a = build_view(Vec3::ONE, Vec3::new(10.0, 20.0, 0.0));
        let b = build_view(Vec3::ONE, Vec3::new(10.0, 20.0, 75.0));
        assert!(a.abs_diff_eq(b, 1e-6));
    }

    #[test]
    fn light_view_looks_along_negative_direction() {
        let direction = Vec3::new(0.0, 1.0, 1.0).normalize();
        let view = build_light_view(light_eye(direction, 10.0), light_angles(direction));
        let toward_light = view.transform_vector3(direction);
        assert!(toward_light.abs_diff_eq(Vec3::Z, 1e-5));
    }

    #[test]
    fn ortho_maps_near_far_to_unit_depth() {
        let ortho = build_ortho(-2.0, 2.0, -1.0, 1.0, 1.0, 5.0);
        let near = ortho.project_point3(Vec3::new(0.0, 0.0, -1.0));
        let far = ortho.project_point3(Vec3::new(0.0, 0.0, -5.0));
        assert!((near.z - 0.0).abs() < 1e-6);
        assert!((far.z - 1.0).abs() < 1e-6);
    }
}
