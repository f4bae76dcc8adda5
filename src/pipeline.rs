//! Mosaic Pipeline - Single Entry Point
//!
//! CRITICAL: config validation runs before any filesystem or subprocess
//! work. Every failure halts the run; there is no partial mosaic.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::MosaicConfig;
use crate::discovery::list_candidates;
use crate::hashing::{compute_job_hash, compute_plan_hash};
use crate::layout::plan_grid;
use crate::plan::build_plan;
use crate::render::{render, MediaTool, SystemTool};
use crate::selection::select;
use crate::validation::{ValidationResult, Validator, ViolationSeverity};
use crate::ENGINE_VERSION;

#[derive(Debug, Error)]
pub enum MosaicError {
    #[error("Grid does not match required image count: {columns}x{rows} != {required}")]
    ConfigMismatch { columns: u32, rows: u32, required: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not enough images. Found {found}, required {required}.")]
    InsufficientInput { found: usize, required: usize },

    #[error("Plan mismatch: {images} images for {placements} placements")]
    PlanMismatch { images: usize, placements: usize },

    #[error("Output directory is not writable: {} ({})", .path.display(), .reason)]
    DirectoryNotWritable { path: PathBuf, reason: String },

    #[error("FFmpeg failed while generating mosaic: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MosaicReport {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub engine_version: String,
    pub output_path: PathBuf,
    pub images: Vec<PathBuf>,
    pub tile_size: u32,
    pub plan_hash: String,
    pub job_hash: String,
}

/// The mosaic pipeline - select, lay out, plan, render
pub struct MosaicPipeline {
    config: MosaicConfig,
    validator: Validator,
    tool: Box<dyn MediaTool>,
}

impl MosaicPipeline {
    pub fn new(config: MosaicConfig, tool: Box<dyn MediaTool>) -> Self {
        Self {
            config,
            validator: Validator::new(),
            tool,
        }
    }

    /// Pipeline backed by the binary named in `config.ffmpeg_path`
    pub fn with_system_tool(config: MosaicConfig) -> Self {
        let tool = SystemTool::new(config.ffmpeg_path.clone());
        Self::new(config, Box::new(tool))
    }

    pub fn config(&self) -> &MosaicConfig {
        &self.config
    }

    pub fn validate_config(&self) -> Result<ValidationResult, MosaicError> {
        let result = self.validator.validate(&self.config);

        for v in &result.violations {
            match v.severity {
                ViolationSeverity::Warning => warn!(rule = %v.rule, "{}", v.message),
                ViolationSeverity::Info => info!(rule = %v.rule, "{}", v.message),
                ViolationSeverity::Error => {}
            }
        }

        if result.violated("grid_count") {
            return Err(MosaicError::ConfigMismatch {
                columns: self.config.grid.columns,
                rows: self.config.grid.rows,
                required: self.config.required_count,
            });
        }
        if result.has_errors() {
            let messages: Vec<_> = result.errors()
                .map(|v| format!("{}: {}", v.rule, v.message))
                .collect();
            return Err(MosaicError::InvalidConfig(messages.join("; ")));
        }

        Ok(result)
    }

    /// Generate a mosaic from `folder` into `output`
    pub fn generate(&self, folder: &Path, output: &Path) -> Result<MosaicReport, MosaicError> {
        self.generate_with_rng(folder, output, &mut rand::thread_rng())
    }

    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        folder: &Path,
        output: &Path,
        rng: &mut R,
    ) -> Result<MosaicReport, MosaicError> {
        self.validate_config()?;
        let config = &self.config;

        let candidates = list_candidates(folder)?;
        debug!(folder = %folder.display(), found = candidates.len(), "listed candidates");
        let images = select(&candidates, config.required_count, rng)?;

        let layout = plan_grid(&config.canvas, &config.grid, config.required_count)?;
        debug!(
            tile_size = layout.tile_size,
            gap_x = layout.spacing.gap_x,
            gap_y = layout.spacing.gap_y,
            "grid planned"
        );

        let plan = build_plan(
            &images,
            layout.tile_size,
            &layout.placements,
            &config.canvas,
            &config.background,
        )?;
        let plan_hash = compute_plan_hash(&plan)?;

        let output_path = render(self.tool.as_ref(), &plan, &images, output, config.quality)?;
        let job_hash = compute_job_hash(&images, &plan_hash, ENGINE_VERSION)?;

        Ok(MosaicReport {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            engine_version: ENGINE_VERSION.to_string(),
            output_path,
            images,
            tile_size: layout.tile_size,
            plan_hash,
            job_hash,
        })
    }
}

impl Default for MosaicPipeline {
    fn default() -> Self {
        Self::with_system_tool(MosaicConfig::default())
    }
}
