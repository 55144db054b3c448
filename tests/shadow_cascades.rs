use glam::{Mat4, Vec3};
use skyshade::asset::{Handle, MeshId};
use skyshade::renderer::{FrameState, MaterialKind, NUM_CASCADES};
use skyshade::scene::{Camera, DirectionalLight, GameItem, Scene, SceneLights, Transform};
use skyshade::settings::RenderSettings;

const EPSILON: f32 = 1e-4;

fn sunlit_scene() -> Scene {
    let mut scene = Scene::new();
    scene.set_lights(SceneLights::new(
        Vec3::splat(0.2),
        DirectionalLight::new(Vec3::new(0.0, 1.0, 1.0).normalize(), Vec3::ONE, 1.0)
            .with_shadow_pos_mult(20.0),
    ));
    scene
}

fn frustum_corners_world(camera: &Camera, near: f32, far: f32, fov_y: f32, aspect: f32) -> Vec<Vec3> {
    let camera_to_world = camera.view_matrix().inverse();
    let tan_half = (fov_y * 0.5).tan();
    let mut corners = Vec::with_capacity(8);
    for distance in [near, far] {
        let h = distance * tan_half;
        let w = h * aspect;
        for (x, y) in [(-w, -h), (w, -h), (w, h), (-w, h)] {
            corners.push(camera_to_world.transform_point3(Vec3::new(x, y, -distance)));
        }
    }
    corners
}

#[test]
fn changed_scene_fits_every_cascade_around_its_slice() {
    let settings = RenderSettings::default();
    let mut state = FrameState::new(&settings);
    let scene = sunlit_scene();
    let camera = Camera::new(Vec3::new(3.0, 5.0, 10.0), Vec3::new(10.0, 20.0, 0.0));

    let plan = state.prepare(1280, 720, &camera, &scene, true);
    assert!(plan.render_shadow_pass);
    assert_eq!(state.cascades().len(), NUM_CASCADES);

    let aspect = 1280.0 / 720.0;
    for cascade in state.cascades().cascades() {
        assert_ne!(cascade.ortho(), Mat4::IDENTITY);
        assert!(cascade.light_view_proj().determinant().abs() > 0.0);

        let corners =
            frustum_corners_world(&camera, cascade.near(), cascade.far(), settings.fov_radians(), aspect);
        for corner in corners {
            let ndc = cascade.light_view_proj().project_point3(corner);
            assert!(ndc.x.abs() <= 1.0 + EPSILON, "{ndc:?}");
            assert!(ndc.y.abs() <= 1.0 + EPSILON, "{ndc:?}");
            assert!(ndc.z >= -EPSILON && ndc.z <= 1.0 + EPSILON, "{ndc:?}");
        }
    }
}

#[test]
fn cascade_slices_are_contiguous_and_increasing() {
    let settings = RenderSettings::default();
    let state = FrameState::new(&settings);
    let cascades = state.cascades().cascades();

    assert!((cascades[0].near() - settings.z_near).abs() < EPSILON);
    for pair in cascades.windows(2) {
        assert_eq!(pair[0].far(), pair[1].near());
        assert!(pair[0].far() > pair[0].near());
    }
    let planes = state.cascades().far_planes();
    assert!(planes[0] < planes[1] && planes[1] < planes[2]);
}

#[test]
fn unchanged_frames_reuse_the_previous_fit() {
    let mut state = FrameState::new(&RenderSettings::default());
    let mut scene = sunlit_scene();
    let camera = Camera::default();

    state.prepare(800, 600, &camera, &scene, true);
    let fitted: Vec<_> = state.cascades().cascades().to_vec();

    // A light change without a change flag must not refit.
    scene.lights_mut().directional.direction = Vec3::new(1.0, 1.0, 0.0).normalize();
    let plan = state.prepare(800, 600, &camera, &scene, false);
    assert!(!plan.render_shadow_pass);
    assert!(plan.shadows_enabled);
    assert_eq!(state.cascades().cascades(), fitted.as_slice());
}

#[test]
fn draw_list_puts_terrain_after_object_batches() {
    let plain = MeshId::new(Handle::new(0), MaterialKind::Simple);
    let terrain = MeshId::new(Handle::new(1), MaterialKind::Multilayer);

    let mut scene = sunlit_scene();
    scene.set_game_items([
        GameItem::new(plain).with_transform(Transform::from_position(Vec3::X)),
        GameItem::new(plain).with_transform(Transform::from_position(Vec3::Y)),
        GameItem::new(terrain).with_transform(Transform::default().with_scale(50.0)),
    ]);

    let mut state = FrameState::new(&RenderSettings::default());
    let plan = state.prepare(640, 480, &Camera::default(), &scene, scene.is_changed());
    assert!(plan.render_shadow_pass);

    let list = skyshade::renderer::DrawList::from_scene(&scene, |item| item.transform.matrix());
    assert_eq!(list.instance_count(), 3);
    assert_eq!(list.batches.len(), 1);
    assert_eq!(list.batches[0].instances, 0..2);
    assert_eq!(list.terrain, Some((terrain.handle(), 2)));
    assert_eq!(
        list.objects[2].model,
        Mat4::from_scale(Vec3::splat(50.0)).to_cols_array_2d()
    );
}

#[test]
fn first_cascade_never_inverts_for_configured_splits() {
    for json in [
        r#"{ "z_near": 5.0, "z_far": 100.0, "cascade_split_fractions": [0.01, 0.5, 1.0] }"#,
        r#"{ "z_near": 2.0, "z_far": 100.0, "cascade_split_fractions": [0.01, 0.5, 1.0] }"#,
    ] {
        let settings = RenderSettings::from_json(json).expect("valid json");
        let state = FrameState::new(&settings);
        for cascade in state.cascades().cascades() {
            assert!(cascade.near() < cascade.far(), "{json}: {cascade:?}");
        }
    }
}
