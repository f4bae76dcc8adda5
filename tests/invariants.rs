//! Contract Invariant Tests
//!
//! These tests verify the non-negotiable guarantees of a mosaic run.

use std::cell::RefCell;
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use mosaic_core::{
    CanvasSpec, GridSpec, MediaTool, MosaicConfig, MosaicError, MosaicPipeline, ToolOutput,
};

type Calls = Rc<RefCell<Vec<Vec<OsString>>>>;

/// Records every invocation; optionally writes the output file like ffmpeg would
struct RecordingTool {
    calls: Calls,
    exit_ok: bool,
    write_output: bool,
    diagnostics: &'static str,
}

impl MediaTool for RecordingTool {
    fn run(&self, args: &[OsString]) -> Result<ToolOutput, MosaicError> {
        self.calls.borrow_mut().push(args.to_vec());
        if self.write_output {
            if let Some(out) = args.last() {
                fs::write(out, b"\xff\xd8\xff").unwrap();
            }
        }
        Ok(ToolOutput {
            success: self.exit_ok,
            code: Some(if self.exit_ok { 0 } else { 1 }),
            diagnostics: self.diagnostics.to_string(),
        })
    }
}

fn create_test_config() -> MosaicConfig {
    MosaicConfig {
        canvas: CanvasSpec { width: 300, height: 500 },
        grid: GridSpec { columns: 3, rows: 2 },
        required_count: 6,
        ..MosaicConfig::default()
    }
}

fn create_pipeline(config: MosaicConfig, exit_ok: bool, write_output: bool) -> (MosaicPipeline, Calls) {
    let calls: Calls = Rc::new(RefCell::new(vec![]));
    let tool = RecordingTool {
        calls: calls.clone(),
        exit_ok,
        write_output,
        diagnostics: "frame=1 fps=0.0 q=2.0 Lsize=N/A",
    };
    (MosaicPipeline::new(config, Box::new(tool)), calls)
}

fn seed_images(dir: &Path, n: usize) -> Vec<PathBuf> {
    let mut paths = vec![];
    for i in 0..n {
        let ext = ["jpg", "PNG", "webp", "gif", "JPEG"][i % 5];
        let path = dir.join(format!("pic{:02}.{}", i, ext));
        fs::write(&path, b"img").unwrap();
        paths.push(path);
    }
    fs::write(dir.join("readme.txt"), b"not an image").unwrap();
    paths
}

fn input_args(args: &[OsString]) -> Vec<PathBuf> {
    args.windows(2)
        .filter(|w| w[0] == "-i")
        .map(|w| PathBuf::from(&w[1]))
        .collect()
}

#[test]
fn invariant_successful_run_renders_once() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let pool = seed_images(input.path(), 9);
    let output = out.path().join("mosaic.jpg");

    let (pipeline, calls) = create_pipeline(create_test_config(), true, true);
    let report = pipeline
        .generate_with_rng(input.path(), &output, &mut StdRng::seed_from_u64(1))
        .unwrap();

    assert_eq!(report.output_path, output);
    assert_eq!(report.tile_size, 100);
    assert_eq!(report.images.len(), 6);
    assert_eq!(report.plan_hash.len(), 64);
    assert!(!report.id.is_empty());

    let unique: HashSet<_> = report.images.iter().collect();
    assert_eq!(unique.len(), 6);
    assert!(report.images.iter().all(|p| pool.contains(p)));

    let calls = calls.borrow();
    assert_eq!(calls.len(), 1);
    // Inputs are passed in paint order
    assert_eq!(input_args(&calls[0]), report.images);
}

#[test]
fn invariant_config_mismatch_touches_nothing() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    seed_images(input.path(), 9);
    let output = out.path().join("never/created/mosaic.jpg");

    let config = create_test_config().with_required_count(5);
    let (pipeline, calls) = create_pipeline(config, true, true);
    let err = pipeline.generate(input.path(), &output).unwrap_err();

    assert!(matches!(err, MosaicError::ConfigMismatch { columns: 3, rows: 2, required: 5 }));
    assert!(calls.borrow().is_empty());
    assert!(!out.path().join("never").exists());
}

#[test]
fn invariant_insufficient_input_before_render() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    seed_images(input.path(), 4);
    let output = out.path().join("sub/mosaic.jpg");

    let (pipeline, calls) = create_pipeline(create_test_config(), true, true);
    let err = pipeline.generate(input.path(), &output).unwrap_err();

    assert!(matches!(err, MosaicError::InsufficientInput { found: 4, required: 6 }));
    assert!(err.to_string().contains("Found 4, required 6"));
    assert!(calls.borrow().is_empty());
    assert!(!out.path().join("sub").exists());
}

#[test]
fn invariant_missing_folder_reports_zero_found() {
    let out = tempfile::tempdir().unwrap();
    let (pipeline, calls) = create_pipeline(create_test_config(), true, true);
    let err = pipeline
        .generate(&out.path().join("no-such-folder"), &out.path().join("m.jpg"))
        .unwrap_err();

    assert!(matches!(err, MosaicError::InsufficientInput { found: 0, required: 6 }));
    assert!(calls.borrow().is_empty());
}

#[test]
fn invariant_output_dir_created_before_render() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    seed_images(input.path(), 6);
    let output = out.path().join("storage/ugc/temp/mosaic.jpg");

    let (pipeline, calls) = create_pipeline(create_test_config(), true, true);
    let report = pipeline.generate(input.path(), &output).unwrap();

    assert!(output.parent().unwrap().is_dir());
    assert!(report.output_path.exists());
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn invariant_tool_failure_surfaces_diagnostics() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    seed_images(input.path(), 6);
    let output = out.path().join("mosaic.jpg");

    let (pipeline, calls) = create_pipeline(create_test_config(), false, false);
    let err = pipeline.generate(input.path(), &output).unwrap_err();

    assert!(matches!(err, MosaicError::Render(_)));
    assert!(err.to_string().contains("FFmpeg failed while generating mosaic"));
    assert!(err.to_string().contains("Lsize=N/A"));
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn invariant_clean_exit_without_output_fails() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    seed_images(input.path(), 6);

    let (pipeline, _calls) = create_pipeline(create_test_config(), true, false);
    let err = pipeline
        .generate(input.path(), &out.path().join("mosaic.jpg"))
        .unwrap_err();

    assert!(matches!(err, MosaicError::Render(_)));
}

#[test]
fn invariant_filter_graph_uses_portrait_geometry() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    seed_images(input.path(), 40);

    let (pipeline, calls) = create_pipeline(MosaicConfig::default(), true, true);
    pipeline
        .generate(input.path(), &out.path().join("mosaic.jpg"))
        .unwrap();

    let calls = calls.borrow();
    let args = &calls[0];
    let pos = args.iter().position(|a| a == "-filter_complex").unwrap();
    let graph = args[pos + 1].to_string_lossy();

    assert!(graph.contains("[0:v]scale=248:248:force_original_aspect_ratio=increase,crop=248:248,setsar=1[img0]"));
    assert!(graph.contains("color=c=black:s=1242x2688:d=1[base]"));
    assert!(graph.contains("[base][img0]overlay=0:78[tmp0]"));
    assert!(graph.contains("[tmp3][img4]overlay=994:78[tmp4]"));
    assert!(graph.ends_with("[tmp38][img39]overlay=994:2362[out]"));
}

#[test]
fn invariant_same_seed_same_job_hash() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    seed_images(input.path(), 12);
    let output = out.path().join("mosaic.jpg");

    let (pipeline, _calls) = create_pipeline(create_test_config(), true, true);
    let a = pipeline
        .generate_with_rng(input.path(), &output, &mut StdRng::seed_from_u64(9))
        .unwrap();
    let b = pipeline
        .generate_with_rng(input.path(), &output, &mut StdRng::seed_from_u64(9))
        .unwrap();

    assert_eq!(a.images, b.images);
    assert_eq!(a.plan_hash, b.plan_hash);
    assert_eq!(a.job_hash, b.job_hash);
    assert_ne!(a.id, b.id);
}

#[test]
fn invariant_invalid_canvas_rejected_before_io() {
    let input = tempfile::tempdir().unwrap();
    seed_images(input.path(), 6);
    let config = MosaicConfig {
        canvas: CanvasSpec { width: 2, height: 500 },
        ..create_test_config()
    };

    let (pipeline, calls) = create_pipeline(config, true, true);
    let err = pipeline
        .generate(input.path(), &input.path().join("m.jpg"))
        .unwrap_err();

    assert!(matches!(err, MosaicError::InvalidConfig(_)));
    assert!(calls.borrow().is_empty());
}

#[test]
fn invariant_config_file_count_applies_without_override() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    seed_images(input.path(), 4);
    let config_path = out.path().join("mosaic.json");
    fs::write(
        &config_path,
        r#"{"canvas": {"width": 200, "height": 200}, "grid": {"columns": 2, "rows": 2}, "requiredCount": 4}"#,
    )
    .unwrap();

    let config = MosaicConfig::from_sources(Some(config_path.as_path()), None)
        .unwrap()
        .with_count_override(None);
    let (pipeline, calls) = create_pipeline(config, true, true);
    let report = pipeline
        .generate(input.path(), &out.path().join("m.jpg"))
        .unwrap();

    assert_eq!(report.images.len(), 4);
    assert_eq!(report.tile_size, 100);
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn invariant_unsafe_background_rejected_before_io() {
    let input = tempfile::tempdir().unwrap();
    seed_images(input.path(), 6);
    let config = MosaicConfig {
        background: "black:s=1x1[base];[0:v]null".to_string(),
        ..create_test_config()
    };

    let (pipeline, calls) = create_pipeline(config, true, true);
    let err = pipeline
        .generate(input.path(), &input.path().join("m.jpg"))
        .unwrap_err();

    assert!(matches!(err, MosaicError::InvalidConfig(_)));
    assert!(err.to_string().contains("background"));
    assert!(calls.borrow().is_empty());
}
