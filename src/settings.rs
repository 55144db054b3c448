use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::renderer::NUM_CASCADES;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    #[serde(default = "RenderSettings::default_shadow_map_size")]
    pub shadow_map_size: u32,
    #[serde(default)]
    pub resolution: Resolution,
    #[serde(default)]
    pub present_mode: PresentModeSetting,
    #[serde(default = "RenderSettings::default_fov_degrees")]
    pub fov_degrees: f32,
    #[serde(default = "RenderSettings::default_z_near")]
    pub z_near: f32,
    #[serde(default = "RenderSettings::default_z_far")]
    pub z_far: f32,
    /// Far plane of each cascade as a fraction of `z_far`.
    #[serde(default = "RenderSettings::default_cascade_split_fractions")]
    pub cascade_split_fractions: [f32; NUM_CASCADES],
    #[serde(default = "RenderSettings::default_cascade_margin")]
    pub cascade_margin: f32,
    #[serde(default = "RenderSettings::default_specular_power")]
    pub specular_power: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            shadow_map_size: Self::default_shadow_map_size(),
            resolution: Resolution::default(),
            present_mode: PresentModeSetting::default(),
            fov_degrees: Self::default_fov_degrees(),
            z_near: Self::default_z_near(),
            z_far: Self::default_z_far(),
            cascade_split_fractions: Self::default_cascade_split_fractions(),
            cascade_margin: Self::default_cascade_margin(),
            specular_power: Self::default_specular_power(),
        }
    }
}

impl RenderSettings {
    pub fn load() -> Self {
        Self::load_from_path("settings.json")
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Self {
        use std::fs;

        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|err| {
                warn!(
                    "Failed to parse {:?} ({}). Falling back to default render settings.",
                    path, err
                );
                RenderSettings::default()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "Render settings file {:?} not found. Using default settings.",
                    path
                );
                RenderSettings::default()
            }
            Err(err) => {
                warn!(
                    "Failed to read {:?} ({}). Falling back to default render settings.",
                    path, err
                );
                RenderSettings::default()
            }
        }
    }

    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        let settings = serde_json::from_str::<RenderSettings>(contents)?;
        Ok(settings.validate())
    }

    fn validate(mut self) -> Self {
        if self.shadow_map_size == 0 {
            warn!("Shadow map size must be greater than zero. Using default value.");
            self.shadow_map_size = Self::default_shadow_map_size();
        }

        if self.resolution.width == 0 || self.resolution.height == 0 {
            warn!("Resolution must be greater than zero. Using default resolution.");
            self.resolution = Resolution::default();
        }

        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            warn!(
                "Field of view {} is outside (0, 180). Using default value.",
                self.fov_degrees
            );
            self.fov_degrees = Self::default_fov_degrees();
        }

        if !(self.z_near > 0.0 && self.z_near < self.z_far) {
            warn!(
                "Clip planes near={} far={} are invalid. Using default planes.",
                self.z_near, self.z_far
            );
            self.z_near = Self::default_z_near();
            self.z_far = Self::default_z_far();
        }

        let fractions = self.cascade_split_fractions;
        let increasing = fractions.windows(2).all(|pair| pair[0] < pair[1]);
        let ends_at_far = (fractions[NUM_CASCADES - 1] - 1.0).abs() <= f32::EPSILON;
        if fractions[0] <= 0.0 || !increasing || !ends_at_far {
            warn!(
                "Cascade splits {:?} must be positive, strictly increasing and end at 1.0. Using default splits.",
                fractions
            );
            self.cascade_split_fractions = Self::default_cascade_split_fractions();
        }

        if self.cascade_split_fractions[0] * self.z_far <= self.z_near {
            warn!(
                "First cascade split {} lies inside the near plane {}. Using default splits.",
                self.cascade_split_fractions[0] * self.z_far,
                self.z_near
            );
            self.cascade_split_fractions = Self::default_cascade_split_fractions();
            if self.cascade_split_fractions[0] * self.z_far <= self.z_near {
                warn!("Default splits still overlap the near plane. Using default planes.");
                self.z_near = Self::default_z_near();
                self.z_far = Self::default_z_far();
            }
        }

        if !(self.cascade_margin >= 0.0) {
            warn!("Cascade margin must not be negative. Using default value.");
            self.cascade_margin = Self::default_cascade_margin();
        }

        if !(self.specular_power > 0.0) {
            warn!("Specular power must be positive. Using default value.");
            self.specular_power = Self::default_specular_power();
        }

        self
    }

    /// View-space far distance of every cascade.
    pub fn cascade_splits(&self) -> [f32; NUM_CASCADES] {
        self.cascade_split_fractions
            .map(|fraction| fraction * self.z_far)
    }

    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }

    pub fn vsync(&self) -> bool {
        matches!(
            self.present_mode,
            PresentModeSetting::Fifo | PresentModeSetting::FifoRelaxed | PresentModeSetting::AutoVsync
        )
    }

    pub fn present_mode(&self, available: &[wgpu::PresentMode]) -> wgpu::PresentMode {
        let desired = self.present_mode.to_wgpu();
        if available.contains(&desired) {
            return desired;
        }

        warn!(
            "Requested present mode {:?} is not supported. Falling back to FIFO.",
            desired
        );

        if available.contains(&wgpu::PresentMode::Fifo) {
            wgpu::PresentMode::Fifo
        } else {
            available
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo)
        }
    }

    const fn default_shadow_map_size() -> u32 {
        2048
    }

    const fn default_fov_degrees() -> f32 {
        60.0
    }

    const fn default_z_near() -> f32 {
        0.1
    }

    const fn default_z_far() -> f32 {
        1000.0
    }

    const fn default_cascade_split_fractions() -> [f32; NUM_CASCADES] {
        [1.0 / 20.0, 1.0 / 10.0, 1.0]
    }

    const fn default_cascade_margin() -> f32 {
        1.0
    }

    const fn default_specular_power() -> f32 {
        10.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentModeSetting {
    #[default]
    Fifo,
    FifoRelaxed,
    Immediate,
    Mailbox,
    AutoVsync,
    AutoNoVsync,
}

impl PresentModeSetting {
    fn to_wgpu(&self) -> wgpu::PresentMode {
        match self {
            PresentModeSetting::Fifo => wgpu::PresentMode::Fifo,
            PresentModeSetting::FifoRelaxed => wgpu::PresentMode::FifoRelaxed,
            PresentModeSetting::Immediate => wgpu::PresentMode::Immediate,
            PresentModeSetting::Mailbox => wgpu::PresentMode::Mailbox,
            PresentModeSetting::AutoVsync => wgpu::PresentMode::AutoVsync,
            PresentModeSetting::AutoNoVsync => wgpu::PresentMode::AutoNoVsync,
        }
    }
}
