use crate::renderer::internal::buffers::{texture_entry, uniform_entry};
use crate::renderer::material::{Material, MultilayerMaterial, SimpleMaterial, MAX_LAYERS};
use crate::renderer::Texture;

const TERRAIN_DIFFUSE_BINDING: u32 = 2;
const TERRAIN_NORMAL_BINDING: u32 = TERRAIN_DIFFUSE_BINDING + MAX_LAYERS as u32;
const TERRAIN_MASK_BINDING: u32 = TERRAIN_NORMAL_BINDING + MAX_LAYERS as u32;

/// Bind group layouts for both material kinds plus the fallback textures
/// bound in place of missing maps.
pub(crate) struct MaterialBinder {
    pub(crate) simple_layout: wgpu::BindGroupLayout,
    pub(crate) terrain_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white: Texture,
    flat_normal: Texture,
}

impl MaterialBinder {
    pub(crate) fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let material_visibility = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;
        let sampler_entry = wgpu::BindGroupLayoutEntry {
            binding: 1,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        };

        let simple_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("SimpleMaterialLayout"),
            entries: &[
                uniform_entry(0, material_visibility),
                sampler_entry,
                texture_entry(2),
                texture_entry(3),
            ],
        });

        let mut terrain_entries = vec![uniform_entry(0, material_visibility), sampler_entry];
        terrain_entries.extend((TERRAIN_DIFFUSE_BINDING..=TERRAIN_MASK_BINDING).map(texture_entry));
        let terrain_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("MultilayerMaterialLayout"),
            entries: &terrain_entries,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("MaterialSampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            simple_layout,
            terrain_layout,
            sampler,
            white: Texture::solid(device, queue, [255, 255, 255, 255], "WhiteTexture"),
            flat_normal: Texture::solid(device, queue, [128, 128, 255, 255], "FlatNormalTexture"),
        }
    }

    pub(crate) fn bind(
        &self,
        device: &wgpu::Device,
        material: &Material,
        uniform: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        match material {
            Material::Simple(material) => self.bind_simple(device, material, uniform),
            Material::Multilayer(material) => self.bind_multilayer(device, material, uniform),
        }
    }

    fn bind_simple(
        &self,
        device: &wgpu::Device,
        material: &SimpleMaterial,
        uniform: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        let diffuse = material.diffuse_map.as_ref().unwrap_or(&self.white);
        let normal = material.normal_map.as_ref().unwrap_or(&self.flat_normal);
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("SimpleMaterialBindGroup"),
            layout: &self.simple_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&diffuse.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&normal.view),
                },
            ],
        })
    }

    fn bind_multilayer(
        &self,
        device: &wgpu::Device,
        material: &MultilayerMaterial,
        uniform: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        let mut entries = vec![
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&self.sampler),
            },
        ];

        for (layer, map) in material.diffuse_maps.iter().enumerate() {
            let texture = map.as_ref().unwrap_or(&self.white);
            entries.push(wgpu::BindGroupEntry {
                binding: TERRAIN_DIFFUSE_BINDING + layer as u32,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            });
        }
        for (layer, map) in material.normal_maps.iter().enumerate() {
            let texture = map.as_ref().unwrap_or(&self.flat_normal);
            entries.push(wgpu::BindGroupEntry {
                binding: TERRAIN_NORMAL_BINDING + layer as u32,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            });
        }
        let mask = material.rgba_map.as_ref().unwrap_or(&self.white);
        entries.push(wgpu::BindGroupEntry {
            binding: TERRAIN_MASK_BINDING,
            resource: wgpu::BindingResource::TextureView(&mask.view),
        });

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("MultilayerMaterialBindGroup"),
            layout: &self.terrain_layout,
            entries: &entries,
        })
    }

    pub(crate) fn cleanup(self) {
        self.white.cleanup();
        self.flat_normal.cleanup();
    }
}
