use std::path::Path;

use glam::Vec3;

use crate::error::{RenderError, Result};

/// Horizontal strip of colours sampled by a parameter in `[0, 1]`.
#[derive(Clone, Debug)]
pub struct Gradient {
    rgb: Vec<[u8; 3]>,
}

impl Gradient {
    pub fn from_rgb(rgb: Vec<[u8; 3]>) -> Option<Self> {
        if rgb.is_empty() {
            return None;
        }
        Some(Self { rgb })
    }

    /// Uses the first row of an image as the colour strip.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|e| RenderError::resource(path, e))?
            .to_rgb8();
        let rgb = (0..image.width())
            .map(|x| image.get_pixel(x, 0).0)
            .collect();
        Self::from_rgb(rgb).ok_or_else(|| RenderError::resource(path, "gradient image is empty"))
    }

    pub fn width(&self) -> usize {
        self.rgb.len()
    }

    pub fn color_at(&self, t: f32) -> Vec3 {
        let last = (self.rgb.len() - 1) as f32;
        let index = lerp(0.0, last, t.clamp(0.0, 1.0)) as usize;
        let [r, g, b] = self.rgb[index];
        Vec3::new(r as f32, g as f32, b as f32) / 255.0
    }
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    (1.0 - t) * from + t * to
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip() -> Gradient {
        Gradient::from_rgb(vec![[0, 0, 0], [255, 0, 0], [0, 255, 0], [0, 0, 255]]).unwrap()
    }

    #[test]
    fn endpoints_map_to_first_and_last_texel() {
        let gradient = strip();
        assert_eq!(gradient.color_at(0.0), Vec3::ZERO);
        assert_eq!(gradient.color_at(1.0), Vec3::Z);
    }

    #[test]
    fn lookup_truncates_towards_lower_texel() {
        // lerp(0, 3, 0.5) = 1.5 -> texel 1
        assert_eq!(strip().color_at(0.5), Vec3::X);
    }

    #[test]
    fn empty_strip_is_rejected() {
        assert!(Gradient::from_rgb(Vec::new()).is_none());
    }
}
