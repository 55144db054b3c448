use std::mem;

use crate::asset::Assets;
use crate::renderer::cascades::{ShadowCascadeSet, NUM_CASCADES};
use crate::renderer::frame::DrawList;
use crate::renderer::internal::buffers::uniform_entry;
use crate::renderer::internal::{ObjectsBuffer, RenderContext};
use crate::renderer::uniforms::CascadeUniform;
use crate::renderer::{DepthMode, PipelineBuilder};

pub(crate) const SHADOW_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

struct ShadowArray {
    texture: wgpu::Texture,
    array_view: wgpu::TextureView,
    layer_views: Vec<wgpu::TextureView>,
}

impl ShadowArray {
    fn new(device: &wgpu::Device, label: &str, layers: u32, size: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: layers,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SHADOW_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let array_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&format!("{label}ArrayView")),
            format: Some(SHADOW_FORMAT),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            aspect: wgpu::TextureAspect::All,
            base_array_layer: 0,
            array_layer_count: Some(layers),
            ..Default::default()
        });

        let layer_views = (0..layers)
            .map(|layer| {
                texture.create_view(&wgpu::TextureViewDescriptor {
                    label: Some(&format!("{label}Layer{layer}")),
                    format: Some(SHADOW_FORMAT),
                    dimension: Some(wgpu::TextureViewDimension::D2),
                    aspect: wgpu::TextureAspect::All,
                    base_array_layer: layer,
                    array_layer_count: Some(1),
                    ..Default::default()
                })
            })
            .collect();

        Self {
            texture,
            array_view,
            layer_views,
        }
    }
}

/// Depth-only render of every opaque instance and the terrain into one
/// array layer per cascade.
pub(crate) struct ShadowPass {
    maps: ShadowArray,
    sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    staging_buffer: wgpu::Buffer,
    pipeline: wgpu::RenderPipeline,
    map_size: u32,
}

impl ShadowPass {
    pub(crate) fn new(device: &wgpu::Device, objects: &ObjectsBuffer, map_size: u32) -> Self {
        let maps = ShadowArray::new(device, "CascadeShadowMap", NUM_CASCADES as u32, map_size);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("ShadowSampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let uniform_size = mem::size_of::<CascadeUniform>() as u64;
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ShadowUniformLayout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
        });
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("ShadowUniformBuffer"),
            size: uniform_size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("ShadowStagingBuffer"),
            size: uniform_size * NUM_CASCADES as u64,
            usage: wgpu::BufferUsages::COPY_SRC | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ShadowUniformBindGroup"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("DepthShader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../shader/depth.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("ShadowPipelineLayout"),
            bind_group_layouts: &[&uniform_layout, &objects.bind_layout],
            push_constant_ranges: &[],
        });
        let pipeline = PipelineBuilder::new(device, "ShadowPipeline", &pipeline_layout, &shader)
            .depth(
                SHADOW_FORMAT,
                DepthMode::Caster {
                    constant: 2,
                    slope_scale: 2.0,
                },
            )
            .build();

        log::info!(
            "Shadow pass ready: {} cascades at {}x{}",
            NUM_CASCADES,
            map_size,
            map_size
        );

        Self {
            maps,
            sampler,
            uniform_buffer,
            uniform_bind_group,
            staging_buffer,
            pipeline,
            map_size,
        }
    }

    pub(crate) fn array_view(&self) -> &wgpu::TextureView {
        &self.maps.array_view
    }

    pub(crate) fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    pub(crate) fn render(
        &self,
        context: &RenderContext,
        encoder: &mut wgpu::CommandEncoder,
        cascades: &ShadowCascadeSet,
        assets: &Assets,
        draws: &DrawList,
        objects: &ObjectsBuffer,
    ) {
        let uniform_size = mem::size_of::<CascadeUniform>() as u64;
        for (index, cascade) in cascades.cascades().iter().enumerate() {
            context.queue.write_buffer(
                &self.staging_buffer,
                index as u64 * uniform_size,
                bytemuck::bytes_of(&CascadeUniform::from_cascade(cascade)),
            );
        }

        for (index, target) in self.maps.layer_views.iter().enumerate() {
            encoder.copy_buffer_to_buffer(
                &self.staging_buffer,
                index as u64 * uniform_size,
                &self.uniform_buffer,
                0,
                uniform_size,
            );
            self.render_cascade(encoder, target, assets, draws, objects);
        }
    }

    fn render_cascade(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        assets: &Assets,
        draws: &DrawList,
        objects: &ObjectsBuffer,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("ShadowPass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let size = self.map_size as f32;
        pass.set_viewport(0.0, 0.0, size, size, 0.0, 1.0);
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        pass.set_bind_group(1, &objects.bind_group, &[]);

        for batch in &draws.batches {
            if let Some(mesh) = assets.batch(batch.mesh) {
                mesh.render_list(&mut pass, batch.instances.clone());
            }
        }
        if let Some((handle, slot)) = draws.terrain {
            if let Some(mesh) = assets.batch(handle) {
                mesh.render(&mut pass, slot);
            }
        }
    }

    pub(crate) fn cleanup(self) {
        self.uniform_buffer.destroy();
        self.staging_buffer.destroy();
        self.maps.texture.destroy();
    }
}
