use glam::{Mat4, Vec3};

use super::transform::build_view;

/// First-person camera: position plus Euler rotation in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl Camera {
    pub fn new(position: Vec3, rotation: Vec3) -> Self {
        Self { position, rotation }
    }

    pub fn view_matrix(&self) -> Mat4 {
        build_view(self.position, self.rotation)
    }

    /// Moves relative to the current heading: `z` walks forward/backward,
    /// `x` strafes and `y` is world-up.
    pub fn move_by(&mut self, offset: Vec3) {
        if offset.x != 0.0 {
            let yaw = (self.rotation.y - 90.0).to_radians();
            self.position.x += -yaw.sin() * offset.x;
            self.position.z += yaw.cos() * offset.x;
        }
        self.position.y += offset.y;
        if offset.z != 0.0 {
            let yaw = self.rotation.y.to_radians();
            self.position.x += -yaw.sin() * offset.z;
            self.position.z += yaw.cos() * offset.z;
        }
    }

    pub fn rotate_by(&mut self, delta: Vec3) {
        self.rotation += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_is_invertible() {
        let cam = Camera::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(20.0, 40.0, 0.0));
        let view = cam.view_matrix();
        assert!((view * view.inverse()).abs_diff_eq(Mat4::IDENTITY, 1e-4));
    }

    #[test]
    fn forward_move_follows_view_direction() {
        let mut cam = Camera::default();
        cam.move_by(Vec3::new(0.0, 0.0, -1.0));
        assert!(cam.position.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-6));

        let mut turned = Camera::new(Vec3::ZERO, Vec3::new(0.0, 90.0, 0.0));
        turned.move_by(Vec3::new(0.0, 0.0, -1.0));
        assert!(turned.position.abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-5));
        // The eye looks along the direction it walked.
        let ahead = turned.view_matrix().transform_point3(turned.position + Vec3::X);
        assert!(ahead.z < 0.0);
    }

    #[test]
    fn strafe_is_perpendicular_to_forward() {
        let mut cam = Camera::default();
        cam.move_by(Vec3::new(1.0, 0.0, 0.0));
        assert!(cam.position.abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-5));
    }
}
