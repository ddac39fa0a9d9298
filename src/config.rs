//! Start-up configuration passed to [`crate::run`].
//!
//! Every default is the value the garden was designed with, so
//! `Config::default()` reproduces the intended scene.

use std::path::PathBuf;

use crate::data_structures::color::Color;

/// Filtering applied when sampling the spot light's shadow map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ShadowMapKind {
    /// A single comparison per fragment.
    Basic,
    Pcf,
    /// Wider PCF kernel with softer edges.
    #[default]
    PcfSoft,
}

impl ShadowMapKind {
    /// Offset between PCF taps, in shadow map texels.
    pub fn pcf_radius(&self) -> f32 {
        match self {
            ShadowMapKind::Basic => 0.0,
            ShadowMapKind::Pcf => 1.0,
            ShadowMapKind::PcfSoft => 1.5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowConfig {
    pub enabled: bool,
    pub kind: ShadowMapKind,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            kind: ShadowMapKind::PcfSoft,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 300.0,
            position: [0.0, 10.0, 20.0],
            target: [0.0, 5.0, 0.0],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FogConfig {
    pub color: Color,
    pub near: f32,
    pub far: f32,
}

impl Default for FogConfig {
    fn default() -> Self {
        Self {
            color: Color::from_hex(0xcdfab6),
            near: 50.0,
            far: 100.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub title: String,
    /// Directory the native build reads assets from.
    pub asset_root: PathBuf,
    /// Id of the canvas the web build renders into.
    pub canvas_id: String,
    pub loading_selector: String,
    pub progress_selector: String,
    pub shadows: ShadowConfig,
    pub camera: CameraConfig,
    pub fog: FogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "Pagoda Garden".to_string(),
            asset_root: PathBuf::from("assets"),
            canvas_id: "c".to_string(),
            loading_selector: "#loading".to_string(),
            progress_selector: ".progressbar".to_string(),
            shadows: ShadowConfig::default(),
            camera: CameraConfig::default(),
            fog: FogConfig::default(),
        }
    }
}
