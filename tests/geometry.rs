use std::collections::HashSet;

use glam::{Mat4, Vec3};
use skyshade::renderer::{
    procedural_sphere, terrain_from_heights, to_view_space, Geometry, HeightMap, SphereParams,
};
use skyshade::scene::transform::build_model;
use skyshade::scene::{Attenuation, PointLight, SpotLight, Transform};

const EPSILON: f32 = 1e-4;

fn referenced(geometry: &Geometry) -> HashSet<usize> {
    geometry.indices.iter().map(|&i| i as usize).collect()
}

fn assert_tangent_frames(geometry: &Geometry) {
    let mesh = geometry.build();
    for index in referenced(geometry) {
        let vertex = &mesh.vertices[index];
        let normal = Vec3::from(vertex.normal);
        let tangent = Vec3::from(vertex.tangent);
        let bitangent = Vec3::from(vertex.bitangent);

        assert!((tangent.length() - 1.0).abs() < EPSILON, "vertex {index}: {tangent:?}");
        assert!(normal.dot(tangent).abs() < EPSILON, "vertex {index}");
        assert!(normal.cross(tangent).dot(bitangent) >= -EPSILON, "vertex {index}");
    }
}

#[test]
fn sphere_grid_counts() {
    let sphere = procedural_sphere(&SphereParams::full(1.0, 4, 4));
    assert_eq!(sphere.vertex_count(), 25);
    // Pole rows contribute a single triangle per segment.
    assert_eq!(sphere.indices.len(), 72);
    for position in &sphere.positions {
        assert!((position.length() - 1.0).abs() < EPSILON);
    }
}

#[test]
fn inward_sphere_reverses_winding() {
    let outward = procedural_sphere(&SphereParams::full(2.0, 8, 6));
    let inward = procedural_sphere(&SphereParams::full(2.0, 8, 6).inward());
    assert_eq!(outward.indices.len(), inward.indices.len());

    let facing = |geometry: &Geometry| -> f32 {
        geometry
            .indices
            .chunks_exact(3)
            .map(|tri| {
                let [a, b, c] = [0, 1, 2].map(|k| geometry.positions[tri[k] as usize]);
                (b - a).cross(c - a).dot((a + b + c) / 3.0)
            })
            .sum()
    };
    assert!(facing(&outward) > 0.0);
    assert!(facing(&inward) < 0.0);
}

#[test]
fn sphere_tangents_are_orthonormal_and_right_handed() {
    assert_tangent_frames(&procedural_sphere(&SphereParams::full(3.0, 16, 8)));
}

#[test]
fn terrain_spans_unit_square_and_height_range() {
    let heights = HeightMap::from_fn(9, 5, |col, row| (col + row) as f32 / 12.0).expect("height map");
    let terrain = terrain_from_heights(-0.1, 0.1, &heights);

    assert_eq!(terrain.vertex_count(), 45);
    assert_eq!(terrain.indices.len(), 8 * 4 * 6);

    let first = terrain.positions[0];
    let last = terrain.positions[44];
    assert!(first.abs_diff_eq(Vec3::new(-0.5, -0.1, -0.5), EPSILON));
    assert!(last.abs_diff_eq(Vec3::new(0.5, 0.1, 0.5), EPSILON));
    for normal in &terrain.normals {
        assert!(normal.y > 0.0);
    }
    assert_tangent_frames(&terrain);
}

#[test]
fn height_map_rejects_bad_dimensions() {
    assert!(HeightMap::new(1, 4, vec![0.0; 4]).is_none());
    assert!(HeightMap::new(3, 3, vec![0.0; 8]).is_none());
    assert!(HeightMap::new(2, 2, vec![0.0; 4]).is_some());
}

#[test]
fn model_matrix_places_scales_and_rotates() {
    let transform = Transform::from_position(Vec3::new(1.0, 2.0, 3.0))
        .with_rotation(Vec3::new(0.0, 90.0, 0.0))
        .with_scale(2.0);
    let model = build_model(&transform);

    // Ry(-90) turns +X into +Z.
    let p = model.transform_point3(Vec3::X);
    assert!(p.abs_diff_eq(Vec3::new(1.0, 2.0, 5.0), EPSILON), "{p:?}");
    assert!(model.inverse().transform_point3(p).abs_diff_eq(Vec3::X, EPSILON));
}

#[test]
fn model_matrices_invert_across_all_axes() {
    let cases = [
        (Vec3::new(-4.0, 0.5, 12.0), Vec3::new(30.0, -45.0, 60.0), 0.25),
        (Vec3::new(100.0, -20.0, 3.0), Vec3::new(-170.0, 85.0, 10.0), 3.5),
        (Vec3::new(0.0, 7.0, -7.0), Vec3::new(90.0, 90.0, -90.0), 1.0),
        (Vec3::ZERO, Vec3::new(12.5, 200.0, 359.0), 60.0),
    ];

    for (position, rotation, scale) in cases {
        let transform = Transform::from_position(position)
            .with_rotation(rotation)
            .with_scale(scale);
        let model = build_model(&transform);

        assert!(
            (model * model.inverse()).abs_diff_eq(Mat4::IDENTITY, EPSILON),
            "{position:?} {rotation:?} {scale}"
        );
        assert!(model.transform_point3(Vec3::ZERO).abs_diff_eq(position, EPSILON));
        let local = Vec3::new(1.0, -2.0, 0.5);
        let back = model.inverse().transform_point3(model.transform_point3(local));
        assert!(back.abs_diff_eq(local, EPSILON));
    }
}

#[test]
fn view_space_lights_leave_scene_lights_untouched() {
    let view = Mat4::from_translation(Vec3::new(0.0, -2.0, -5.0));
    let spot = SpotLight::from_angle(
        PointLight::new(Vec3::new(1.0, 4.0, 0.0), Vec3::ONE, 1.0)
            .with_attenuation(Attenuation::new(0.0, 0.0, 0.02)),
        Vec3::NEG_Y,
        30.0,
    );

    let first = to_view_space(&spot, &view);
    let second = to_view_space(&spot, &view);
    assert_eq!(first, second);
    assert!(first
        .point_light
        .position
        .abs_diff_eq(Vec3::new(1.0, 2.0, -5.0), EPSILON));
    assert!(first.cone_direction.abs_diff_eq(Vec3::NEG_Y, EPSILON));
    assert!(spot.point_light.position.abs_diff_eq(Vec3::new(1.0, 4.0, 0.0), EPSILON));
}
