//! Mosaic Configuration - Immutable Per Invocation

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::pipeline::MosaicError;

pub const CONFIG_ENV: &str = "MOSAIC_CONFIG";
pub const FFMPEG_ENV: &str = "FFMPEG_PATH";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanvasSpec {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasSpec {
    fn default() -> Self {
        Self { width: 1242, height: 2688 }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GridSpec {
    pub columns: u32,
    pub rows: u32,
}

impl GridSpec {
    pub fn cells(&self) -> u64 {
        self.columns as u64 * self.rows as u64
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self { columns: 5, rows: 8 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MosaicConfig {
    #[serde(default)]
    pub canvas: CanvasSpec,
    #[serde(default)]
    pub grid: GridSpec,
    #[serde(default = "default_required_count")]
    pub required_count: usize,
    /// Base layer colour, any ffmpeg colour name or `0xRRGGBB`
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,
    /// ffmpeg `-q:v` value
    #[serde(default = "default_quality")]
    pub quality: u8,
}

fn default_required_count() -> usize { 40 }
fn default_background() -> String { "black".to_string() }
fn default_ffmpeg_path() -> PathBuf { PathBuf::from("ffmpeg") }
fn default_quality() -> u8 { 2 }

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasSpec::default(),
            grid: GridSpec::default(),
            required_count: default_required_count(),
            background: default_background(),
            ffmpeg_path: default_ffmpeg_path(),
            quality: default_quality(),
        }
    }
}

impl MosaicConfig {
    pub fn load(path: &Path) -> Result<Self, MosaicError> {
        let content = fs::read_to_string(path).map_err(|e| {
            MosaicError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            MosaicError::InvalidConfig(format!("invalid {}: {}", path.display(), e))
        })
    }

    /// Default preset, overlaid with an optional JSON file then an optional
    /// ffmpeg binary
    pub fn from_sources(
        config_path: Option<&Path>,
        ffmpeg_path: Option<PathBuf>,
    ) -> Result<Self, MosaicError> {
        let mut config = match config_path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(ffmpeg) = ffmpeg_path {
            config.ffmpeg_path = ffmpeg;
        }
        Ok(config)
    }

    /// `from_sources` fed by `MOSAIC_CONFIG` and `FFMPEG_PATH`
    pub fn from_env() -> Result<Self, MosaicError> {
        let config_path = std::env::var_os(CONFIG_ENV)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        let ffmpeg_path = std::env::var_os(FFMPEG_ENV)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        Self::from_sources(config_path.as_deref(), ffmpeg_path)
    }

    pub fn with_required_count(mut self, required_count: usize) -> Self {
        self.required_count = required_count;
        self
    }

    /// Applies a count override when one was given; otherwise keeps the
    /// configured count
    pub fn with_count_override(self, required_count: Option<usize>) -> Self {
        match required_count {
            Some(count) => self.with_required_count(count),
            None => self,
        }
    }
}
