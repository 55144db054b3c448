use std::ops::Range;

use glam::Mat4;

use super::cascades::{CameraLens, ShadowCascadeSet};
use super::uniforms::{rotation_only, ObjectData, SceneInputs, SceneUniforms, SkyUniforms};
use crate::asset::Handle;
use crate::renderer::MeshBatch;
use crate::scene::transform::build_projection;
use crate::scene::{Camera, GameItem, Scene, Sky};
use crate::settings::RenderSettings;

/// What a single frame has to do, decided before any GPU work is encoded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FramePlan {
    /// The shadow maps are re-rendered this frame.
    pub render_shadow_pass: bool,
    /// Shadow lookups are enabled in the colour passes.
    pub shadows_enabled: bool,
    pub viewport: (u32, u32),
    pub view: Mat4,
    pub projection: Mat4,
}

/// CPU half of the frame: cascade fitting, projection and uniform assembly.
#[derive(Clone, Debug)]
pub struct FrameState {
    cascades: ShadowCascadeSet,
    projection: Mat4,
    fov_y: f32,
    z_near: f32,
    z_far: f32,
    specular_power: f32,
}

impl FrameState {
    pub fn new(settings: &RenderSettings) -> Self {
        Self {
            cascades: ShadowCascadeSet::new(
                settings.z_near,
                &settings.cascade_splits(),
                settings.cascade_margin,
            ),
            projection: Mat4::IDENTITY,
            fov_y: settings.fov_radians(),
            z_near: settings.z_near,
            z_far: settings.z_far,
            specular_power: settings.specular_power,
        }
    }

    /// Refits the cascades when shadows are on and the scene moved, then
    /// rebuilds the projection for the current viewport.
    pub fn prepare(
        &mut self,
        width: u32,
        height: u32,
        camera: &Camera,
        scene: &Scene,
        scene_changed: bool,
    ) -> FramePlan {
        let view = camera.view_matrix();
        let render_shadow_pass = scene.render_shadows() && scene_changed;
        if render_shadow_pass {
            let lens = CameraLens::new(self.fov_y, width, height);
            self.cascades.update(&view, &lens, &scene.lights().directional);
        }

        self.projection = build_projection(self.fov_y, width, height, self.z_near, self.z_far);

        FramePlan {
            render_shadow_pass,
            shadows_enabled: scene.render_shadows(),
            viewport: (width.max(1), height.max(1)),
            view,
            projection: self.projection,
        }
    }

    pub fn cascades(&self) -> &ShadowCascadeSet {
        &self.cascades
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn z_far(&self) -> f32 {
        self.z_far
    }

    pub fn scene_uniforms(&self, plan: &FramePlan, scene: &Scene) -> SceneUniforms {
        SceneUniforms::new(&SceneInputs {
            view: plan.view,
            projection: plan.projection,
            cascades: &self.cascades,
            lights: scene.lights(),
            fog: scene.fog(),
            render_shadows: plan.shadows_enabled,
            specular_power: self.specular_power,
        })
    }

    pub fn sky_uniforms(&self, plan: &FramePlan, sky: &Sky) -> SkyUniforms {
        SkyUniforms::new(sky, &rotation_only(&plan.view), &plan.projection)
    }
}

/// Instances of one mesh occupying a contiguous run of object slots.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawBatch {
    pub mesh: Handle<MeshBatch>,
    pub instances: Range<u32>,
}

/// Flattened per-frame object data plus the slots each draw refers to.
#[derive(Clone, Debug, Default)]
pub struct DrawList {
    pub batches: Vec<DrawBatch>,
    pub terrain: Option<(Handle<MeshBatch>, u32)>,
    pub objects: Vec<ObjectData>,
}

impl DrawList {
    /// Walks every scene instance, asking `model_of` for its model matrix.
    pub fn from_scene(scene: &Scene, mut model_of: impl FnMut(&GameItem) -> Mat4) -> Self {
        let mut list = Self::default();
        for (mesh, items) in scene.game_meshes() {
            if items.is_empty() {
                continue;
            }
            let start = list.objects.len() as u32;
            list.objects
                .extend(items.iter().map(|item| ObjectData::from(model_of(item))));
            list.batches.push(DrawBatch {
                mesh,
                instances: start..list.objects.len() as u32,
            });
        }

        if let Some(terrain) = scene.terrain() {
            let slot = list.objects.len() as u32;
            list.objects.push(ObjectData::from(model_of(terrain)));
            list.terrain = Some((terrain.mesh.handle(), slot));
        }
        list
    }

    pub fn instance_count(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::MeshId;
    use crate::renderer::MaterialKind;
    use crate::scene::{DirectionalLight, SceneLights, Transform};
    use glam::Vec3;

    fn scene_with_sun() -> Scene {
        let mut scene = Scene::new();
        scene.set_lights(SceneLights::new(
            Vec3::splat(0.3),
            DirectionalLight::new(Vec3::new(0.0, 1.0, 1.0).normalize(), Vec3::ONE, 1.0),
        ));
        scene
    }

    #[test]
    fn cascades_stay_put_without_changes() {
        let mut state = FrameState::new(&RenderSettings::default());
        let scene = scene_with_sun();
        let camera = Camera::default();

        let plan = state.prepare(800, 600, &camera, &scene, false);
        assert!(!plan.render_shadow_pass);
        for cascade in state.cascades().cascades() {
            assert_eq!(cascade.ortho(), Mat4::IDENTITY);
        }
    }

    #[test]
    fn disabled_shadows_skip_the_pass() {
        let mut state = FrameState::new(&RenderSettings::default());
        let mut scene = scene_with_sun();
        scene.set_render_shadows(false);

        let plan = state.prepare(800, 600, &Camera::default(), &scene, true);
        assert!(!plan.render_shadow_pass);
        assert!(!plan.shadows_enabled);
        assert_eq!(state.scene_uniforms(&plan, &scene).params[1], 0.0);
    }

    #[test]
    fn projection_follows_aspect_ratio() {
        let mut state = FrameState::new(&RenderSettings::default());
        let scene = scene_with_sun();
        let wide = state.prepare(1600, 800, &Camera::default(), &scene, false).projection;
        let square = state.prepare(800, 800, &Camera::default(), &scene, false).projection;
        assert!((square.x_axis.x / wide.x_axis.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn draw_list_assigns_contiguous_slots() {
        let a = MeshId::new(Handle::new(0), MaterialKind::Simple);
        let terrain = MeshId::new(Handle::new(1), MaterialKind::Multilayer);
        let mut scene = Scene::new();
        scene.set_game_items([
            GameItem::new(a),
            GameItem::new(a).with_transform(Transform::from_position(Vec3::X)),
            GameItem::new(terrain),
        ]);

        let list = DrawList::from_scene(&scene, |item| item.transform.matrix());
        assert_eq!(list.batches.len(), 1);
        assert_eq!(list.batches[0].instances, 0..2);
        assert_eq!(list.terrain, Some((terrain.handle(), 2)));
        assert_eq!(list.instance_count(), 3);
        assert_eq!(
            list.objects[1],
            ObjectData::from(Mat4::from_translation(Vec3::X))
        );
    }
}
