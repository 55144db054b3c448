use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};
use glam::Vec4;

use super::texture::Texture;

/// Number of diffuse/normal pairs a multilayer material can blend.
pub const MAX_LAYERS: usize = 5;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MaterialFlags: u32 {
        const DIFFUSE_MAP = 1 << 0;
        const NORMAL_MAP = 1 << 1;
        const RGBA_MAP = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    Simple,
    Multilayer,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialColors {
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub specular: Vec4,
}

impl Default for MaterialColors {
    fn default() -> Self {
        Self::splat(Vec4::ONE)
    }
}

impl MaterialColors {
    pub fn splat(color: Vec4) -> Self {
        Self {
            ambient: color,
            diffuse: color,
            specular: color,
        }
    }
}

/// Colours plus an optional diffuse and normal map.
#[derive(Debug, Default)]
pub struct SimpleMaterial {
    pub colors: MaterialColors,
    pub diffuse_map: Option<Texture>,
    pub normal_map: Option<Texture>,
    pub reflectance: f32,
}

impl SimpleMaterial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_color(mut self, color: Vec4) -> Self {
        self.colors = MaterialColors::splat(color);
        self
    }

    pub fn with_diffuse_map(mut self, texture: Texture) -> Self {
        self.diffuse_map = Some(texture);
        self
    }

    pub fn with_normal_map(mut self, texture: Texture) -> Self {
        self.normal_map = Some(texture);
        self
    }

    pub fn with_reflectance(mut self, reflectance: f32) -> Self {
        self.reflectance = reflectance;
        self
    }

    pub fn flags(&self) -> MaterialFlags {
        let mut flags = MaterialFlags::empty();
        flags.set(MaterialFlags::DIFFUSE_MAP, self.diffuse_map.is_some());
        flags.set(MaterialFlags::NORMAL_MAP, self.normal_map.is_some());
        flags
    }
}

/// Terrain material: up to [`MAX_LAYERS`] diffuse/normal pairs blended by the
/// channels of an RGBA mask.
#[derive(Debug)]
pub struct MultilayerMaterial {
    pub colors: MaterialColors,
    pub diffuse_maps: [Option<Texture>; MAX_LAYERS],
    pub normal_maps: [Option<Texture>; MAX_LAYERS],
    pub rgba_map: Option<Texture>,
    pub reflectance: f32,
    /// How many times layer textures repeat across the mesh UV range.
    pub layer_tiling: f32,
}

impl Default for MultilayerMaterial {
    fn default() -> Self {
        Self {
            colors: MaterialColors::default(),
            diffuse_maps: Default::default(),
            normal_maps: Default::default(),
            rgba_map: None,
            reflectance: 0.0,
            layer_tiling: 1.0,
        }
    }
}

impl MultilayerMaterial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maps of one layer. Indices past [`MAX_LAYERS`] are ignored.
    pub fn with_layer(mut self, index: usize, diffuse: Option<Texture>, normal: Option<Texture>) -> Self {
        if index >= MAX_LAYERS {
            log::warn!("Layer {} ignored: at most {} layers are supported", index, MAX_LAYERS);
            return self;
        }
        self.diffuse_maps[index] = diffuse;
        self.normal_maps[index] = normal;
        self
    }

    pub fn with_rgba_map(mut self, texture: Texture) -> Self {
        self.rgba_map = Some(texture);
        self
    }

    pub fn with_reflectance(mut self, reflectance: f32) -> Self {
        self.reflectance = reflectance;
        self
    }

    pub fn with_layer_tiling(mut self, tiling: f32) -> Self {
        self.layer_tiling = tiling;
        self
    }

    pub fn diffuse_layer_mask(&self) -> u32 {
        layer_mask(&self.diffuse_maps)
    }

    pub fn normal_layer_mask(&self) -> u32 {
        layer_mask(&self.normal_maps)
    }

    pub fn flags(&self) -> MaterialFlags {
        let mut flags = MaterialFlags::empty();
        flags.set(MaterialFlags::DIFFUSE_MAP, self.diffuse_layer_mask() != 0);
        flags.set(MaterialFlags::NORMAL_MAP, self.normal_layer_mask() != 0);
        flags.set(MaterialFlags::RGBA_MAP, self.rgba_map.is_some());
        flags
    }
}

/// Bit `i` is set when layer `i` has a map.
fn layer_mask<T>(maps: &[Option<T>]) -> u32 {
    maps.iter()
        .enumerate()
        .filter(|(_, map)| map.is_some())
        .fold(0, |mask, (index, _)| mask | (1 << index))
}

#[derive(Debug)]
pub enum Material {
    Simple(SimpleMaterial),
    Multilayer(MultilayerMaterial),
}

impl From<SimpleMaterial> for Material {
    fn from(material: SimpleMaterial) -> Self {
        Material::Simple(material)
    }
}

impl From<MultilayerMaterial> for Material {
    fn from(material: MultilayerMaterial) -> Self {
        Material::Multilayer(material)
    }
}

impl Material {
    pub fn kind(&self) -> MaterialKind {
        match self {
            Material::Simple(_) => MaterialKind::Simple,
            Material::Multilayer(_) => MaterialKind::Multilayer,
        }
    }

    pub fn is_multilayer(&self) -> bool {
        self.kind() == MaterialKind::Multilayer
    }

    pub fn reflectance(&self) -> f32 {
        match self {
            Material::Simple(material) => material.reflectance,
            Material::Multilayer(material) => material.reflectance,
        }
    }

    pub fn uniform(&self) -> MaterialUniform {
        match self {
            Material::Simple(material) => MaterialUniform {
                ambient: material.colors.ambient.to_array(),
                diffuse: material.colors.diffuse.to_array(),
                specular: material.colors.specular.to_array(),
                params: [material.reflectance, 1.0, 0.0, 0.0],
                flags: [material.flags().bits(), 0, 0, 0],
            },
            Material::Multilayer(material) => MaterialUniform {
                ambient: material.colors.ambient.to_array(),
                diffuse: material.colors.diffuse.to_array(),
                specular: material.colors.specular.to_array(),
                params: [material.reflectance, material.layer_tiling, 0.0, 0.0],
                flags: [
                    material.flags().bits(),
                    material.diffuse_layer_mask(),
                    material.normal_layer_mask(),
                    0,
                ],
            },
        }
    }

    /// Releases every texture owned by the material.
    pub fn cleanup(self) {
        match self {
            Material::Simple(material) => {
                material.diffuse_map.into_iter().for_each(Texture::cleanup);
                material.normal_map.into_iter().for_each(Texture::cleanup);
            }
            Material::Multilayer(material) => {
                let MultilayerMaterial {
                    diffuse_maps,
                    normal_maps,
                    rgba_map,
                    ..
                } = material;
                diffuse_maps
                    .into_iter()
                    .chain(normal_maps)
                    .chain(std::iter::once(rgba_map))
                    .flatten()
                    .for_each(Texture::cleanup);
            }
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct MaterialUniform {
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    /// x = reflectance, y = layer tiling
    pub params: [f32; 4],
    /// x = [`MaterialFlags`], y = diffuse layer mask, z = normal layer mask
    pub flags: [u32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_default_to_opaque_white() {
        let material = SimpleMaterial::new();
        assert_eq!(material.colors.ambient, Vec4::ONE);
        assert_eq!(material.colors.diffuse, Vec4::ONE);
        assert_eq!(material.colors.specular, Vec4::ONE);
        assert_eq!(material.reflectance, 0.0);
        assert_eq!(MultilayerMaterial::new().colors, MaterialColors::default());
    }

    #[test]
    fn kind_tracks_variant() {
        let simple: Material = SimpleMaterial::new().into();
        let terrain: Material = MultilayerMaterial::new().into();
        assert!(!simple.is_multilayer());
        assert!(terrain.is_multilayer());
        assert_eq!(terrain.kind(), MaterialKind::Multilayer);
    }

    #[test]
    fn uniform_carries_reflectance_and_flags() {
        let material: Material = SimpleMaterial::new()
            .with_color(Vec4::new(0.2, 0.5, 0.5, 1.0))
            .with_reflectance(0.5)
            .into();
        let uniform = material.uniform();
        assert_eq!(uniform.params[0], 0.5);
        assert_eq!(uniform.flags[0], 0);
        assert_eq!(uniform.diffuse, [0.2, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn multilayer_uniform_carries_tiling() {
        let material: Material = MultilayerMaterial::new().with_layer_tiling(40.0).into();
        let uniform = material.uniform();
        assert_eq!(uniform.params[1], 40.0);
        assert_eq!(uniform.flags, [0, 0, 0, 0]);
    }

    #[test]
    fn layer_mask_sets_one_bit_per_present_map() {
        assert_eq!(layer_mask::<()>(&[None, None, None, None, None]), 0);
        assert_eq!(layer_mask(&[Some(()), None, Some(()), None, Some(())]), 0b10101);
        assert_eq!(layer_mask(&[None, Some(()), None, None, None]), 0b00010);
    }

    #[test]
    fn uniform_size_is_aligned() {
        assert_eq!(std::mem::size_of::<MaterialUniform>() % 16, 0);
    }
}
