use bytemuck::Zeroable;

use crate::renderer::depth::DEPTH_FORMAT;
use crate::renderer::internal::buffers::{uniform_buffer, uniform_entry};
use crate::renderer::internal::{MaterialBinder, ObjectsBuffer, RenderContext, ShadowPass};
use crate::renderer::uniforms::{SceneUniforms, SkyUniforms};
use crate::renderer::{DepthMode, PipelineBuilder};

const SCENE_SHADER: &str = concat!(
    include_str!("../../shader/common.wgsl"),
    include_str!("../../shader/scene.wgsl")
);
const TERRAIN_SHADER: &str = concat!(
    include_str!("../../shader/common.wgsl"),
    include_str!("../../shader/terrain.wgsl")
);
const SKY_SHADER: &str = include_str!("../../shader/sky.wgsl");

/// Colour-pass pipelines and the per-frame uniforms they share.
pub(crate) struct ColorPipelines {
    pub(crate) scene: wgpu::RenderPipeline,
    pub(crate) terrain: wgpu::RenderPipeline,
    pub(crate) sky: wgpu::RenderPipeline,
    pub(crate) scene_bind_group: wgpu::BindGroup,
    pub(crate) sky_bind_group: wgpu::BindGroup,
    scene_buffer: wgpu::Buffer,
    sky_buffer: wgpu::Buffer,
}

impl ColorPipelines {
    pub(crate) fn new(
        context: &RenderContext,
        objects: &ObjectsBuffer,
        materials: &MaterialBinder,
        shadows: &ShadowPass,
    ) -> Self {
        let device = &context.device;
        let color_format = context.config.format;
        let stages = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;

        let scene_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("SceneUniformLayout"),
            entries: &[
                uniform_entry(0, stages),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2Array,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });
        let scene_buffer = uniform_buffer(device, "SceneUniformBuffer", &SceneUniforms::zeroed());
        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("SceneUniformBindGroup"),
            layout: &scene_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: scene_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(shadows.array_view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(shadows.sampler()),
                },
            ],
        });

        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("SceneShader"),
            source: wgpu::ShaderSource::Wgsl(SCENE_SHADER.into()),
        });
        let scene_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("ScenePipelineLayout"),
            bind_group_layouts: &[&scene_layout, &objects.bind_layout, &materials.simple_layout],
            push_constant_ranges: &[],
        });
        let scene = PipelineBuilder::new(device, "ScenePipeline", &scene_pipeline_layout, &scene_shader)
            .color(color_format)
            .depth(DEPTH_FORMAT, DepthMode::Opaque)
            .build();

        let terrain_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("TerrainShader"),
            source: wgpu::ShaderSource::Wgsl(TERRAIN_SHADER.into()),
        });
        let terrain_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("TerrainPipelineLayout"),
                bind_group_layouts: &[&scene_layout, &objects.bind_layout, &materials.terrain_layout],
                push_constant_ranges: &[],
            });
        let terrain =
            PipelineBuilder::new(device, "TerrainPipeline", &terrain_pipeline_layout, &terrain_shader)
                .color(color_format)
                .depth(DEPTH_FORMAT, DepthMode::Opaque)
                .build();

        let sky_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("SkyUniformLayout"),
            entries: &[uniform_entry(0, stages)],
        });
        let sky_buffer = uniform_buffer(device, "SkyUniformBuffer", &SkyUniforms::zeroed());
        let sky_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("SkyUniformBindGroup"),
            layout: &sky_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: sky_buffer.as_entire_binding(),
            }],
        });
        let sky_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("SkyShader"),
            source: wgpu::ShaderSource::Wgsl(SKY_SHADER.into()),
        });
        let sky_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("SkyPipelineLayout"),
            bind_group_layouts: &[&sky_layout],
            push_constant_ranges: &[],
        });
        // Seen from inside.
        let sky = PipelineBuilder::new(device, "SkyPipeline", &sky_pipeline_layout, &sky_shader)
            .color(color_format)
            .depth(DEPTH_FORMAT, DepthMode::Background)
            .double_sided()
            .build();

        log::info!("Scene, terrain and sky pipelines created");

        Self {
            scene,
            terrain,
            sky,
            scene_bind_group,
            sky_bind_group,
            scene_buffer,
            sky_buffer,
        }
    }

    pub(crate) fn write_scene(&self, queue: &wgpu::Queue, uniforms: &SceneUniforms) {
        queue.write_buffer(&self.scene_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    pub(crate) fn write_sky(&self, queue: &wgpu::Queue, uniforms: &SkyUniforms) {
        queue.write_buffer(&self.sky_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    pub(crate) fn cleanup(self) {
        self.scene_buffer.destroy();
        self.sky_buffer.destroy();
    }
}
