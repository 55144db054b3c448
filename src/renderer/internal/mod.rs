pub(crate) mod buffers;
pub(crate) mod context;
pub(crate) mod materials;
pub(crate) mod pipeline;
pub(crate) mod shadows;

pub(crate) use buffers::ObjectsBuffer;
pub(crate) use context::RenderContext;
pub(crate) use materials::MaterialBinder;
pub(crate) use pipeline::ColorPipelines;
pub(crate) use shadows::ShadowPass;
