pub mod cascades;
pub mod depth;
pub mod frame;
pub mod geometry;
pub(crate) mod internal;
pub mod lights;
pub mod material;
pub mod mesh_batch;
pub mod pipeline_builder;
pub mod renderer;
pub mod texture;
pub mod uniforms;
pub mod vertex;

pub use cascades::{CameraLens, ShadowCascade, ShadowCascadeSet, NUM_CASCADES};
pub use depth::Depth;
pub use frame::{DrawBatch, DrawList, FramePlan, FrameState};
pub use geometry::{
    compute_tangent_basis, procedural_sphere, terrain_from_heights, Geometry, HeightMap, MeshData,
    SphereParams,
};
pub use lights::{to_view_space, LightsUniform, ViewSpace};
pub use material::{
    Material, MaterialColors, MaterialFlags, MaterialKind, MultilayerMaterial, SimpleMaterial,
    MAX_LAYERS,
};
pub use mesh_batch::MeshBatch;
pub use pipeline_builder::{DepthMode, PipelineBuilder};
pub use renderer::FrameRenderer;
pub use texture::Texture;
pub use uniforms::{ObjectData, SceneUniforms, SkyUniforms};
pub use vertex::Vertex;
