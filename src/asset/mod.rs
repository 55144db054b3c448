pub mod cache;
pub mod handle;

pub use cache::AssetCache;
pub use handle::Handle;

use crate::renderer::{MaterialKind, MeshBatch};

/// Mesh handle tagged with the kind of material the mesh was registered with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshId {
    handle: Handle<MeshBatch>,
    kind: MaterialKind,
}

impl MeshId {
    pub fn new(handle: Handle<MeshBatch>, kind: MaterialKind) -> Self {
        Self { handle, kind }
    }

    pub fn handle(&self) -> Handle<MeshBatch> {
        self.handle
    }

    pub fn kind(&self) -> MaterialKind {
        self.kind
    }

    pub fn is_multilayer(&self) -> bool {
        self.kind == MaterialKind::Multilayer
    }
}

/// Owner of every GPU mesh used by a scene.
#[derive(Default)]
pub struct Assets {
    meshes: AssetCache<MeshBatch>,
}

impl Assets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mesh(&mut self, mesh: MeshBatch) -> MeshId {
        let kind = mesh.material().kind();
        MeshId::new(self.meshes.insert(mesh), kind)
    }

    pub fn mesh(&self, id: MeshId) -> Option<&MeshBatch> {
        self.meshes.get(id.handle())
    }

    pub fn mesh_mut(&mut self, id: MeshId) -> Option<&mut MeshBatch> {
        self.meshes.get_mut(id.handle())
    }

    pub(crate) fn batch(&self, handle: Handle<MeshBatch>) -> Option<&MeshBatch> {
        self.meshes.get(handle)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Releases every mesh buffer and material texture.
    pub fn cleanup(&mut self) {
        let count = self.meshes.len();
        for mesh in self.meshes.drain() {
            mesh.cleanup();
        }
        log::info!("Released {} meshes", count);
    }
}
