//! Mosaic Core - Grid Mosaic Compositor
//!
//! # Pipeline
//! 1. Sorted Pool, Random Sample
//! 2. Square Tiles Sized From Width
//! 3. Linear Overlay Chain
//! 4. ffmpeg Does The Pixels
//! 5. Exit Status And Output File Both Checked

pub mod config;
pub mod discovery;
pub mod selection;
pub mod layout;
pub mod plan;
pub mod render;
pub mod validation;
pub mod hashing;
pub mod pipeline;

pub use config::{CanvasSpec, GridSpec, MosaicConfig};
pub use selection::{select, select_random};
pub use layout::{plan_grid, GridLayout, Placement, Spacing};
pub use plan::{build_plan, CompositePlan, Layer, OverlayOp, TransformOp};
pub use render::{render, MediaTool, SystemTool, ToolOutput};
pub use validation::{ValidationResult, ValidationRule, ValidationViolation, ViolationSeverity};
pub use hashing::{compute_job_hash, compute_plan_hash, canonical_json};
pub use pipeline::{MosaicError, MosaicPipeline, MosaicReport};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
