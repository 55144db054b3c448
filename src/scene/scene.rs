use std::collections::HashMap;

use super::fog::Fog;
use super::lights::SceneLights;
use super::sky::Sky;
use super::transform::Transform;
use crate::asset::{Handle, MeshId};
use crate::renderer::MeshBatch;

/// One placed instance of a mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GameItem {
    pub mesh: MeshId,
    pub transform: Transform,
}

impl GameItem {
    pub fn new(mesh: MeshId) -> Self {
        Self {
            mesh,
            transform: Transform::default(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}

pub struct Scene {
    meshes: HashMap<Handle<MeshBatch>, Vec<GameItem>>,
    terrain: Option<GameItem>,
    sky: Option<Sky>,
    lights: SceneLights,
    fog: Fog,
    render_shadows: bool,
    changed: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            meshes: HashMap::new(),
            terrain: None,
            sky: None,
            lights: SceneLights::default(),
            fog: Fog::default(),
            render_shadows: true,
            changed: true,
        }
    }

    /// Adds items grouped by mesh. An item whose mesh carries a multilayer
    /// material becomes the terrain instead (replacing any previous terrain).
    pub fn set_game_items(&mut self, items: impl IntoIterator<Item = GameItem>) {
        for item in items {
            if item.mesh.is_multilayer() {
                self.terrain = Some(item);
            } else {
                self.meshes
                    .entry(item.mesh.handle())
                    .or_default()
                    .push(item);
            }
        }
        self.changed = true;
    }

    /// Instances of every regular mesh.
    pub fn game_meshes(&self) -> impl Iterator<Item = (Handle<MeshBatch>, &[GameItem])> {
        self.meshes
            .iter()
            .map(|(handle, items)| (*handle, items.as_slice()))
    }

    pub fn instances_mut(&mut self, mesh: MeshId) -> Option<&mut Vec<GameItem>> {
        self.meshes.get_mut(&mesh.handle())
    }

    pub fn instance_count(&self) -> usize {
        self.meshes.values().map(Vec::len).sum()
    }

    pub fn terrain(&self) -> Option<&GameItem> {
        self.terrain.as_ref()
    }

    pub fn terrain_mut(&mut self) -> Option<&mut GameItem> {
        self.terrain.as_mut()
    }

    pub fn sky(&self) -> Option<&Sky> {
        self.sky.as_ref()
    }

    pub fn sky_mut(&mut self) -> Option<&mut Sky> {
        self.sky.as_mut()
    }

    pub fn set_sky(&mut self, sky: Sky) {
        self.sky = Some(sky);
        self.changed = true;
    }

    pub fn lights(&self) -> &SceneLights {
        &self.lights
    }

    pub fn lights_mut(&mut self) -> &mut SceneLights {
        &mut self.lights
    }

    pub fn set_lights(&mut self, lights: SceneLights) {
        self.lights = lights;
        self.changed = true;
    }

    pub fn fog(&self) -> &Fog {
        &self.fog
    }

    pub fn set_fog(&mut self, fog: Fog) {
        self.fog = fog;
    }

    pub fn render_shadows(&self) -> bool {
        self.render_shadows
    }

    pub fn set_render_shadows(&mut self, enabled: bool) {
        self.render_shadows = enabled;
        self.changed = true;
    }

    pub fn mark_changed(&mut self) {
        self.changed = true;
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Returns the changed flag and resets it for the next frame.
    pub fn take_changed(&mut self) -> bool {
        std::mem::replace(&mut self.changed, false)
    }
}
