use std::path::Path;

use image::imageops::FilterType;
use image::RgbaImage;

use crate::error::{RenderError, Result};

/// Sampled RGBA8 texture with a full mip chain.
#[derive(Debug)]
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl Texture {
    /// Calculate the number of mip levels for a given texture size
    fn calculate_mip_levels(width: u32, height: u32) -> u32 {
        let max_dimension = width.max(height).max(1);
        u32::BITS - max_dimension.leading_zeros()
    }

    /// Load texture from file path with mipmaps
    pub fn from_path(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: impl AsRef<Path>,
    ) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading texture: {:?}", path);

        let img = image::open(path).map_err(|e| RenderError::resource(path, e))?;
        let label = path.to_string_lossy();
        Ok(Self::from_image(device, queue, &img.to_rgba8(), Some(&label)))
    }

    /// Uploads an image and a box-filtered mip chain generated on the CPU.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &RgbaImage,
        label: Option<&str>,
    ) -> Self {
        let (width, height) = image.dimensions();
        let mip_level_count = Self::calculate_mip_levels(width, height);

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let mut level_image = image.clone();
        for mip_level in 0..mip_level_count {
            if mip_level > 0 {
                let w = (width >> mip_level).max(1);
                let h = (height >> mip_level).max(1);
                level_image = image::imageops::resize(&level_image, w, h, FilterType::Triangle);
            }
            Self::write_level(queue, &texture, mip_level, &level_image);
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    /// 1x1 texture filled with a single colour.
    pub fn solid(device: &wgpu::Device, queue: &wgpu::Queue, rgba: [u8; 4], label: &str) -> Self {
        let image = RgbaImage::from_pixel(1, 1, image::Rgba(rgba));
        Self::from_image(device, queue, &image, Some(label))
    }

    fn write_level(queue: &wgpu::Queue, texture: &wgpu::Texture, mip_level: u32, image: &RgbaImage) {
        let (width, height) = image.dimensions();
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }

    pub fn cleanup(self) {
        self.texture.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_levels_cover_largest_dimension() {
        assert_eq!(Texture::calculate_mip_levels(1, 1), 1);
        assert_eq!(Texture::calculate_mip_levels(256, 256), 9);
        assert_eq!(Texture::calculate_mip_levels(300, 17), 9);
        assert_eq!(Texture::calculate_mip_levels(0, 0), 1);
    }
}
