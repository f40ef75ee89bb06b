//! Configuration handling for the FoldRec CLI
//!
//! Supports loading configuration from foldrec.toml files with CLI argument overrides.

use anyhow::{Result, Context};
use foldrec_core::triangle::{TriangleHalf, TriangleShading};
use foldrec_core::types::DEFAULT_STEP;
use foldrec_core::{GenomicPos, ValueMode};
use foldrec_render::ExportConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub color: ColorConfig,
    #[serde(default)]
    pub triangle: TriangleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Bin size in base pairs
    #[serde(default = "default_step")]
    pub step: GenomicPos,

    /// Value mode used when --mode is not given
    #[serde(default)]
    pub mode: ValueMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Default width
    #[serde(default = "default_width")]
    pub width: u32,

    /// Default height
    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default = "default_true")]
    pub legend: bool,

    #[serde(default = "default_true")]
    pub axes: bool,

    /// Timestamped provenance line at the bottom of SVG output
    #[serde(default = "default_true")]
    pub footer: bool,

    #[serde(default = "default_background")]
    pub background: String,

    #[serde(default = "default_font_family")]
    pub font_family: String,

    #[serde(default = "default_font_size")]
    pub font_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorConfig {
    /// Fixed lower end of the color range; the mode default otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Fixed upper end of the color range; the mode default otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    /// Gradient intervals in the legend
    #[serde(default = "default_legend_intervals")]
    pub legend_intervals: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriangleConfig {
    /// Container size in pixels
    #[serde(default = "default_triangle_size")]
    pub size: u32,

    #[serde(default)]
    pub half: TriangleHalf,

    #[serde(default)]
    pub shading: TriangleShading,

    /// Desired tick count along the triangle axis
    #[serde(default = "default_triangle_ticks")]
    pub ticks: usize,
}

// Default value functions
fn default_step() -> GenomicPos { DEFAULT_STEP }
fn default_true() -> bool { true }
fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 800 }
fn default_background() -> String { "#ffffff".to_string() }
fn default_font_family() -> String { "Arial, sans-serif".to_string() }
fn default_font_size() -> u32 { 12 }
fn default_legend_intervals() -> usize { 10 }
fn default_triangle_size() -> u32 { 800 }
fn default_triangle_ticks() -> usize { 6 }

impl Default for ViewConfig {
    fn default() -> Self {
        Self { step: default_step(), mode: ValueMode::default() }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            legend: true,
            axes: true,
            footer: true,
            background: default_background(),
            font_family: default_font_family(),
            font_size: default_font_size(),
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self { min: None, max: None, legend_intervals: default_legend_intervals() }
    }
}

impl Default for TriangleConfig {
    fn default() -> Self {
        Self {
            size: default_triangle_size(),
            half: TriangleHalf::default(),
            shading: TriangleShading::default(),
            ticks: default_triangle_ticks(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                // Try to find foldrec.toml in current directory
                let default_path = PathBuf::from("foldrec.toml");
                if default_path.exists() {
                    log::info!("Loading configuration from: foldrec.toml");
                    Self::load_from_file(&default_path)?
                } else {
                    log::debug!("Using default configuration");
                    Self::default()
                }
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// Generate example configuration file content
    pub fn example_toml() -> Result<String> {
        toml::to_string_pretty(&Self::default())
            .context("Failed to serialize default configuration")
    }

    /// Export settings for a `width` x `height` picture.
    pub fn export_config(&self, width: u32, height: u32) -> ExportConfig {
        ExportConfig {
            width,
            height,
            show_legend: self.render.legend,
            show_axes: self.render.axes,
            show_footer: self.render.footer,
            background_color: self.render.background.clone(),
            font_family: self.render.font_family.clone(),
            font_size: self.render.font_size,
            legend_intervals: self.color.legend_intervals,
            triangle_ticks: self.triangle.ticks,
            ..ExportConfig::default()
        }
    }
}
