use glam::{Vec3, Vec4};
use image::{Rgba, RgbaImage};
use log::info;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use skyshade::asset::MeshId;
use skyshade::renderer::{
    procedural_sphere, terrain_from_heights, FrameRenderer, HeightMap, MultilayerMaterial,
    SimpleMaterial, SphereParams, Texture,
};
use skyshade::scene::{
    Attenuation, DirectionalLight, Fog, GameItem, Gradient, PointLight, SceneLights, Sky,
    SpotLight, Transform,
};
use skyshade::{GameLogic, RenderError, Result, SetupContext, UpdateContext};
use winit::keyboard::KeyCode;

const MOVE_SPEED: f32 = 8.0;
const MOUSE_SENSITIVITY: f32 = 0.2;
const SUN_SPEED: f32 = 0.05;
const TERRAIN_SCALE: f32 = 60.0;
const SPHERE_COUNT: usize = 24;

/// Textured sphere, a ring of instanced spheres on a blended terrain, under
/// an atmospheric sky whose sun drives the directional light.
pub struct DemoScene {
    sun_tint: Option<Gradient>,
    spinning: Option<MeshId>,
    spot_angle: f32,
    spin: f32,
}

impl DemoScene {
    pub fn new() -> Self {
        Self {
            sun_tint: Gradient::from_rgb(vec![
                [255, 120, 60],
                [255, 200, 150],
                [255, 250, 235],
                [255, 200, 150],
                [255, 120, 60],
            ]),
            spinning: None,
            spot_angle: 0.0,
            spin: 0.0,
        }
    }

    fn sun_color(&self, azimuth: f32) -> Vec3 {
        self.sun_tint
            .as_ref()
            .map_or(Vec3::ONE, |gradient| gradient.color_at(azimuth))
    }
}

fn checker(size: u32, cells: u32, a: [u8; 3], b: [u8; 3]) -> RgbaImage {
    let cell = (size / cells).max(1);
    RgbaImage::from_fn(size, size, |x, y| {
        let [r, g, bl] = if ((x / cell) + (y / cell)) % 2 == 0 { a } else { b };
        Rgba([r, g, bl, 255])
    })
}

fn speckled(size: u32, base: [u8; 3], rng: &mut SmallRng) -> RgbaImage {
    RgbaImage::from_fn(size, size, |_, _| {
        let jitter: i16 = rng.gen_range(-24..=24);
        let [r, g, b] = base.map(|c| (c as i16 + jitter).clamp(0, 255) as u8);
        Rgba([r, g, b, 255])
    })
}

/// Tangent-space bumps encoded as RGB.
fn bumpy_normals(size: u32, frequency: f32) -> RgbaImage {
    RgbaImage::from_fn(size, size, |x, y| {
        let u = x as f32 / size as f32 * std::f32::consts::TAU * frequency;
        let v = y as f32 / size as f32 * std::f32::consts::TAU * frequency;
        let normal = Vec3::new(0.3 * u.cos(), 0.3 * v.cos(), 1.0).normalize();
        let encoded = (normal * 0.5 + 0.5) * 255.0;
        Rgba([encoded.x as u8, encoded.y as u8, encoded.z as u8, 255])
    })
}

fn terrain_height(col: u32, row: u32) -> f32 {
    let x = col as f32 * 0.08;
    let z = row as f32 * 0.08;
    0.5 + 0.25 * (x.sin() * z.cos()) + 0.15 * (x * 0.37 + z * 0.21).sin()
}

/// Low ground is sand (r), the middle grass (g), high ground rock (b); the
/// remainder goes to the last layer.
fn blend_mask(heights: &HeightMap) -> RgbaImage {
    RgbaImage::from_fn(heights.width(), heights.height(), |x, y| {
        let h = heights.value(x, y);
        let sand = (1.0 - h * 2.5).clamp(0.0, 1.0);
        let rock = ((h - 0.6) * 4.0).clamp(0.0, 1.0);
        let grass = (1.0 - sand - rock).clamp(0.0, 1.0) * 0.9;
        let to_byte = |w: f32| (w * 255.0) as u8;
        Rgba([to_byte(sand), to_byte(grass), to_byte(rock), 0])
    })
}

fn terrain_material(
    renderer: &FrameRenderer,
    heights: &HeightMap,
    rng: &mut SmallRng,
) -> MultilayerMaterial {
    let layer = |image: RgbaImage, label: &str| -> Option<Texture> {
        Some(renderer.texture_from_image(&image, label))
    };
    MultilayerMaterial::new()
        .with_layer(0, layer(speckled(64, [194, 178, 128], rng), "Sand"), None)
        .with_layer(
            1,
            layer(speckled(64, [70, 120, 50], rng), "Grass"),
            layer(bumpy_normals(64, 4.0), "GrassNormal"),
        )
        .with_layer(
            2,
            layer(speckled(64, [110, 105, 100], rng), "Rock"),
            layer(bumpy_normals(64, 8.0), "RockNormal"),
        )
        .with_layer(4, layer(speckled(64, [90, 70, 50], rng), "Dirt"), None)
        .with_rgba_map(renderer.texture_from_image(&blend_mask(heights), "TerrainMask"))
        .with_layer_tiling(40.0)
        .with_reflectance(0.1)
}

impl GameLogic for DemoScene {
    fn title(&self) -> &str {
        "skyshade demo"
    }

    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<()> {
        let renderer = ctx.renderer;
        let mut rng = SmallRng::seed_from_u64(7);

        let sphere_mesh = procedural_sphere(&SphereParams::full(1.0, 32, 16)).build();
        let textured = ctx.assets.add_mesh(renderer.create_mesh(
            &sphere_mesh,
            SimpleMaterial::new()
                .with_diffuse_map(
                    renderer.texture_from_image(&checker(256, 8, [230, 80, 60], [240, 240, 240]), "Checker"),
                )
                .with_normal_map(renderer.texture_from_image(&bumpy_normals(128, 6.0), "SphereNormal"))
                .with_reflectance(1.0),
        ));
        let plain = ctx.assets.add_mesh(renderer.create_mesh(
            &sphere_mesh,
            SimpleMaterial::new()
                .with_color(Vec4::new(0.2, 0.5, 0.8, 1.0))
                .with_reflectance(0.5),
        ));

        let heights = HeightMap::from_fn(128, 128, terrain_height)
            .ok_or_else(|| RenderError::Initialization("empty terrain height map".into()))?;
        let terrain_mesh = terrain_from_heights(-0.1, 0.1, &heights).build();
        let terrain = ctx.assets.add_mesh(
            renderer.create_mesh(&terrain_mesh, terrain_material(renderer, &heights, &mut rng)),
        );

        let mut items = vec![
            GameItem::new(textured)
                .with_transform(Transform::from_position(Vec3::new(0.0, 8.0, -10.0)).with_scale(2.0)),
            GameItem::new(terrain).with_transform(
                Transform::from_position(Vec3::new(0.0, 0.0, 0.0)).with_scale(TERRAIN_SCALE),
            ),
        ];
        for index in 0..SPHERE_COUNT {
            let angle = index as f32 / SPHERE_COUNT as f32 * std::f32::consts::TAU;
            let radius = rng.gen_range(12.0..18.0);
            let scale = rng.gen_range(0.4..1.2);
            let position = Vec3::new(angle.cos() * radius, rng.gen_range(7.0..10.0), angle.sin() * radius - 10.0);
            items.push(GameItem::new(plain).with_transform(Transform::from_position(position).with_scale(scale)));
        }
        ctx.scene.set_game_items(items);
        self.spinning = Some(textured);

        let dome = procedural_sphere(
            &SphereParams::full(1.0, Sky::DOME_WIDTH_SEGMENTS, Sky::DOME_HEIGHT_SEGMENTS).inward(),
        )
        .build();
        let dome = ctx.assets.add_mesh(renderer.create_mesh(&dome, SimpleMaterial::new()));
        let mut sky = Sky::new(dome).with_radius(renderer.settings().z_far * 0.9);
        sky.inclination = 0.3;
        let sun_direction = sky.sun_position().normalize_or_zero();
        let sun_color = self.sun_color(sky.azimuth);
        ctx.scene.set_sky(sky);

        let mut lights = SceneLights::new(
            Vec3::splat(0.3),
            DirectionalLight::new(sun_direction, sun_color, 0.8).with_shadow_pos_mult(50.0),
        );
        lights.add_point_light(
            PointLight::new(Vec3::new(0.0, 12.0, -10.0), Vec3::new(1.0, 0.9, 0.7), 1.0)
                .with_attenuation(Attenuation::new(0.0, 0.0, 0.02)),
        );
        for x in [-8.0, 8.0] {
            lights.add_spot_light(SpotLight::from_angle(
                PointLight::new(Vec3::new(x, 14.0, -10.0), Vec3::new(0.6, 0.8, 1.0), 1.0)
                    .with_attenuation(Attenuation::new(0.0, 0.0, 0.01)),
                Vec3::NEG_Y,
                20.0,
            ));
        }
        ctx.scene.set_lights(lights);
        ctx.scene.set_fog(Fog::new(Vec3::splat(0.5), 0.0025));

        ctx.camera.position = Vec3::new(0.0, 10.0, 12.0);
        ctx.camera.rotation = Vec3::new(15.0, 0.0, 0.0);

        info!("Demo scene built with {} sphere instances", SPHERE_COUNT + 1);
        Ok(())
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        let input = ctx.input;
        let step = MOVE_SPEED * ctx.dt;

        let mut offset = Vec3::ZERO;
        if input.is_pressed(KeyCode::KeyW) {
            offset.z -= step;
        }
        if input.is_pressed(KeyCode::KeyS) {
            offset.z += step;
        }
        if input.is_pressed(KeyCode::KeyA) {
            offset.x -= step;
        }
        if input.is_pressed(KeyCode::KeyD) {
            offset.x += step;
        }
        if input.is_pressed(KeyCode::KeyZ) {
            offset.y -= step;
        }
        if input.is_pressed(KeyCode::KeyX) {
            offset.y += step;
        }
        if offset != Vec3::ZERO {
            ctx.camera.move_by(offset);
            ctx.scene.mark_changed();
        }

        let drag = input.drag_delta();
        if drag != glam::Vec2::ZERO {
            ctx.camera
                .rotate_by(Vec3::new(drag.y, drag.x, 0.0) * MOUSE_SENSITIVITY);
            ctx.scene.mark_changed();
        }

        let mut sun_delta = 0.0;
        if input.is_pressed(KeyCode::KeyN) {
            sun_delta -= SUN_SPEED * ctx.dt;
        }
        if input.is_pressed(KeyCode::KeyM) {
            sun_delta += SUN_SPEED * ctx.dt;
        }
        if sun_delta != 0.0 {
            let moved = ctx.scene.sky_mut().map(|sky| {
                sky.azimuth = (sky.azimuth + sun_delta).rem_euclid(1.0);
                (sky.sun_position().normalize_or_zero(), sky.azimuth)
            });
            if let Some((direction, azimuth)) = moved {
                let color = self.sun_color(azimuth);
                let sun = &mut ctx.scene.lights_mut().directional;
                sun.direction = direction;
                sun.color = color;
            }
            ctx.scene.mark_changed();
        }

        self.spot_angle += ctx.dt;
        let sway = self.spot_angle.sin() * 0.5;
        for (index, spot) in ctx.scene.lights_mut().spot_lights_mut().iter_mut().enumerate() {
            let side = if index % 2 == 0 { 1.0 } else { -1.0 };
            spot.cone_direction = Vec3::new(sway * side, -1.0, 0.0).normalize();
        }

        self.spin += ctx.dt * 20.0;
        let spin = self.spin;
        if let Some(items) = self.spinning.and_then(|mesh| ctx.scene.instances_mut(mesh)) {
            for item in items {
                item.transform.rotation.y = spin;
            }
        }
        ctx.scene.mark_changed();
    }
}
