use super::vertex::Vertex;

/// How a pipeline interacts with the depth attachment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DepthMode {
    /// `Less` test with writes.
    Opaque,
    /// `LessEqual` test without writes, for geometry pinned to the far plane.
    Background,
    /// Depth-only caster with a constant and slope-scaled bias.
    Caster { constant: i32, slope_scale: f32 },
}

impl DepthMode {
    fn state(self, format: wgpu::TextureFormat) -> wgpu::DepthStencilState {
        let (depth_write_enabled, depth_compare, bias) = match self {
            DepthMode::Opaque => (true, wgpu::CompareFunction::Less, Default::default()),
            DepthMode::Background => (false, wgpu::CompareFunction::LessEqual, Default::default()),
            DepthMode::Caster {
                constant,
                slope_scale,
            } => (
                true,
                wgpu::CompareFunction::LessEqual,
                wgpu::DepthBiasState {
                    constant,
                    slope_scale,
                    clamp: 0.0,
                },
            ),
        };
        wgpu::DepthStencilState {
            format,
            depth_write_enabled,
            depth_compare,
            stencil: wgpu::StencilState::default(),
            bias,
        }
    }
}

/// Render pipeline over the shared [`Vertex`] layout. Shaders expose
/// `vs_main` and, unless the pipeline is depth-only, `fs_main`.
pub struct PipelineBuilder<'a> {
    device: &'a wgpu::Device,
    label: &'a str,
    layout: &'a wgpu::PipelineLayout,
    shader: &'a wgpu::ShaderModule,
    color_format: Option<wgpu::TextureFormat>,
    depth: Option<(wgpu::TextureFormat, DepthMode)>,
    cull_mode: Option<wgpu::Face>,
}

impl<'a> PipelineBuilder<'a> {
    pub fn new(
        device: &'a wgpu::Device,
        label: &'a str,
        layout: &'a wgpu::PipelineLayout,
        shader: &'a wgpu::ShaderModule,
    ) -> Self {
        Self {
            device,
            label,
            layout,
            shader,
            color_format: None,
            depth: None,
            cull_mode: Some(wgpu::Face::Back),
        }
    }

    /// Adds `fs_main` writing a single opaque target.
    pub fn color(mut self, format: wgpu::TextureFormat) -> Self {
        self.color_format = Some(format);
        self
    }

    pub fn depth(mut self, format: wgpu::TextureFormat, mode: DepthMode) -> Self {
        self.depth = Some((format, mode));
        self
    }

    /// Disables face culling.
    pub fn double_sided(mut self) -> Self {
        self.cull_mode = None;
        self
    }

    pub fn build(self) -> wgpu::RenderPipeline {
        let targets = [self.color_format.map(|format| wgpu::ColorTargetState {
            format,
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::ALL,
        })];
        let fragment = self.color_format.map(|_| wgpu::FragmentState {
            module: self.shader,
            entry_point: Some("fs_main"),
            targets: &targets,
            compilation_options: Default::default(),
        });

        self.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(self.label),
                layout: Some(self.layout),
                vertex: wgpu::VertexState {
                    module: self.shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::layout()],
                    compilation_options: Default::default(),
                },
                fragment,
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: self.cull_mode,
                    ..Default::default()
                },
                depth_stencil: self.depth.map(|(format, mode)| mode.state(format)),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_depth_tests_without_writing() {
        let state = DepthMode::Background.state(wgpu::TextureFormat::Depth24Plus);
        assert!(!state.depth_write_enabled);
        assert_eq!(state.depth_compare, wgpu::CompareFunction::LessEqual);
    }

    #[test]
    fn caster_depth_carries_bias() {
        let state = DepthMode::Caster {
            constant: 2,
            slope_scale: 2.0,
        }
        .state(wgpu::TextureFormat::Depth32Float);
        assert!(state.depth_write_enabled);
        assert_eq!(state.bias.constant, 2);
        assert_eq!(state.bias.slope_scale, 2.0);
    }
}
