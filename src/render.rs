//! Render Executor - ffmpeg Bridge
//!
//! Turns a `CompositePlan` into one ffmpeg invocation. Success means the
//! tool exited cleanly AND the output file exists afterwards.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::plan::CompositePlan;
use crate::pipeline::MosaicError;

/// Result of one external tool run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub success: bool,
    pub code: Option<i32>,
    /// stdout followed by stderr
    pub diagnostics: String,
}

/// The external pixel engine
pub trait MediaTool {
    fn run(&self, args: &[OsString]) -> Result<ToolOutput, MosaicError>;
}

/// Runs a real binary, `ffmpeg` by default
#[derive(Debug, Clone)]
pub struct SystemTool {
    program: PathBuf,
}

impl SystemTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for SystemTool {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl MediaTool for SystemTool {
    fn run(&self, args: &[OsString]) -> Result<ToolOutput, MosaicError> {
        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                MosaicError::Render(format!(
                    "failed to spawn {} (is it installed and on PATH?): {}",
                    self.program.display(),
                    e
                ))
            })?;

        let mut diagnostics = String::from_utf8_lossy(&output.stdout).into_owned();
        diagnostics.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(ToolOutput {
            success: output.status.success(),
            code: output.status.code(),
            diagnostics,
        })
    }
}

/// Serializes the plan as an ffmpeg `-filter_complex` graph
pub fn filter_graph(plan: &CompositePlan) -> String {
    let mut chains = Vec::with_capacity(plan.transforms.len() + plan.overlays.len() + 1);

    for t in &plan.transforms {
        chains.push(format!(
            "[{input}:v]scale={s}:{s}:force_original_aspect_ratio=increase,crop={s}:{s},setsar=1[{out}]",
            input = t.input,
            s = t.size,
            out = t.output,
        ));
    }

    chains.push(format!(
        "color=c={}:s={}x{}:d=1[{}]",
        plan.background,
        plan.canvas.width,
        plan.canvas.height,
        crate::plan::Layer::Base,
    ));

    for o in &plan.overlays {
        chains.push(format!("[{}][{}]overlay={}:{}[{}]", o.below, o.tile, o.x, o.y, o.output));
    }

    chains.join(";")
}

/// Full ffmpeg argument list: inputs in plan order, the graph, one output frame
pub fn ffmpeg_args(
    plan: &CompositePlan,
    images: &[PathBuf],
    output: &Path,
    quality: u8,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![];
    for image in images {
        args.push("-i".into());
        args.push(image.clone().into_os_string());
    }
    args.push("-filter_complex".into());
    args.push(filter_graph(plan).into());
    args.push("-map".into());
    args.push(format!("[{}]", plan.output).into());
    for arg in ["-frames:v", "1", "-update", "1", "-q:v"] {
        args.push(arg.into());
    }
    args.push(quality.to_string().into());
    args.push("-y".into());
    args.push(output.as_os_str().to_os_string());
    args
}

/// Creates the parent directory of `output` if needed and proves it writable
pub fn ensure_output_dir(output: &Path) -> Result<PathBuf, MosaicError> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    if !dir.is_dir() {
        debug!(dir = %dir.display(), "creating output directory");
        fs::create_dir_all(&dir).map_err(|e| MosaicError::DirectoryNotWritable {
            path: dir.clone(),
            reason: e.to_string(),
        })?;
    }

    tempfile::Builder::new()
        .prefix(".mosaic-write-check")
        .tempfile_in(&dir)
        .map_err(|e| MosaicError::DirectoryNotWritable {
            path: dir.clone(),
            reason: e.to_string(),
        })?;

    Ok(dir)
}

#[tracing::instrument(skip(tool, plan, images), fields(inputs = images.len()))]
pub fn render(
    tool: &dyn MediaTool,
    plan: &CompositePlan,
    images: &[PathBuf],
    output: &Path,
    quality: u8,
) -> Result<PathBuf, MosaicError> {
    if images.len() != plan.input_count() {
        return Err(MosaicError::PlanMismatch {
            images: images.len(),
            placements: plan.overlays.len(),
        });
    }

    ensure_output_dir(output)?;

    let args = ffmpeg_args(plan, images, output, quality);
    debug!(args = args.len(), "invoking media tool");
    let result = tool.run(&args)?;

    if !result.success {
        let status = result
            .code
            .map_or_else(|| "signal".to_string(), |c| c.to_string());
        return Err(MosaicError::Render(format!(
            "exit status {}: {}",
            status,
            result.diagnostics
        )));
    }
    if !output.exists() {
        return Err(MosaicError::Render(format!(
            "no output written to {}: {}",
            output.display(),
            result.diagnostics
        )));
    }

    info!(output = %output.display(), "mosaic rendered");
    Ok(output.to_path_buf())
}
