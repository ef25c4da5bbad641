//! Labelwarp: pixel-accurate annotation coordinates for augmented images.
//!
//! Labelwarp recomputes bounding-box and polygon annotation coordinates for
//! a configured sequence of image-space transforms (resize variants,
//! rotate, flip, crop, affine, shear), so that exported YOLO labels stay
//! aligned with the correspondingly-augmented pixels. The pipeline threads
//! a canvas whose size changes mid-sequence and drops geometry that
//! degenerates along the way instead of failing the batch.
//!
//! # Modules
//!
//! - [`geometry`]: canonical value types (boxes, polygons, canvas, spaces)
//! - [`extract`]: raw annotation records into canonical shapes
//! - [`config`]: transform config ingestion and the fixed execution order
//! - [`transform`]: the geometry transform engine
//! - [`encode`]: YOLO detection/segmentation line emission
//! - [`pipeline`]: per-image orchestration and diagnostics
//! - [`yolo`]: YOLO dataset directory I/O for the CLI
//! - [`error`]: error types for labelwarp operations

pub mod config;
pub mod encode;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod pipeline;
pub mod transform;
pub mod yolo;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use config::TransformConfig;
use pipeline::{report::TransformReport, PipelineOptions};

pub use error::LabelwarpError;

/// The labelwarp CLI application.
#[derive(Parser)]
#[command(name = "labelwarp")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Recompute a YOLO dataset's labels for a transform config.
    Apply(ApplyArgs),

    /// Print the execution order a transform config resolves to.
    Plan(PlanArgs),
}

/// Arguments for the apply subcommand.
#[derive(clap::Args)]
struct ApplyArgs {
    /// Dataset root containing images/ and labels/ (or the labels/ dir).
    input: PathBuf,

    /// Transform config file (.json, .yaml, .yml).
    #[arg(short, long)]
    config: PathBuf,

    /// Output dataset root for the transformed labels.
    #[arg(short, long)]
    output: PathBuf,

    /// Label flavor to emit ('detection' or 'segmentation').
    #[arg(long, default_value = "detection")]
    task: String,
}

/// Arguments for the plan subcommand.
#[derive(clap::Args)]
struct PlanArgs {
    /// Transform config file (.json, .yaml, .yml).
    config: PathBuf,

    /// Output format for the plan ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Run the labelwarp CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), LabelwarpError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Apply(args)) => run_apply(args),
        Some(Commands::Plan(args)) => run_plan(args),
        None => {
            println!("labelwarp {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Pixel-accurate annotation coordinates for augmented images.");
            println!();
            println!("Run 'labelwarp --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the apply subcommand.
fn run_apply(args: ApplyArgs) -> Result<(), LabelwarpError> {
    let options = match args.task.as_str() {
        "detection" => PipelineOptions::detection(),
        "segmentation" => PipelineOptions::segmentation(),
        other => {
            return Err(LabelwarpError::UnsupportedFormat(format!(
                "task '{}' (supported: detection, segmentation)",
                other
            )));
        }
    };

    let config = TransformConfig::from_file(&args.config)?;
    let layout = yolo::discover_layout(&args.input)?;
    let class_map = yolo::read_class_map(&layout)?;
    let images = yolo::collect_images(&layout)?;

    let output_labels = args.output.join("labels");
    std::fs::create_dir_all(&output_labels).map_err(LabelwarpError::Io)?;
    std::fs::create_dir_all(args.output.join("images")).map_err(LabelwarpError::Io)?;

    let class_count = (!class_map.is_empty()).then_some(class_map.len());

    let mut images_done = 0usize;
    let mut lines_written = 0usize;
    let mut dropped = 0usize;
    let mut warnings = 0usize;

    for image in &images {
        let label_path = yolo::label_path_for(&layout, image);
        let annotations = yolo::read_labels(&label_path, class_count)?;

        let outcome = pipeline::transform_image(
            &annotations,
            image.width,
            image.height,
            &config,
            options,
            None,
        )?;

        let out_path = output_labels
            .join(&image.rel_path)
            .with_extension("txt");
        yolo::write_labels(&out_path, &outcome.lines)?;

        images_done += 1;
        lines_written += outcome.lines.len();
        dropped += outcome.report.dropped_count();
        warnings += outcome.report.warning_count();
        print_image_entries(&image.rel_path, &outcome.report);
    }

    yolo::write_data_yaml(&args.output, &class_map.names)?;

    println!(
        "Transformed {} image(s): {} label line(s) written, {} annotation(s) dropped, {} warning(s)",
        images_done, lines_written, dropped, warnings
    );

    Ok(())
}

fn print_image_entries(rel_path: &str, report: &TransformReport) {
    for entry in &report.entries {
        println!("  {}: {}", rel_path, entry);
    }
}

/// Execute the plan subcommand.
fn run_plan(args: PlanArgs) -> Result<(), LabelwarpError> {
    let config = TransformConfig::from_file(&args.config)?;
    let mut report = TransformReport::new();
    let steps = config.execution_order(&mut report)?;

    match args.output.as_str() {
        "json" => {
            let entries: Vec<serde_json::Value> = report
                .entries
                .iter()
                .map(|entry| {
                    serde_json::json!({
                        "severity": format!("{:?}", entry.severity),
                        "code": format!("{:?}", entry.code),
                        "message": entry.message,
                        "context": entry.context.to_string(),
                    })
                })
                .collect();
            let payload = serde_json::json!({
                "steps": serde_json::to_value(&steps)?,
                "report": entries,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        _ => {
            if steps.is_empty() {
                println!("No coordinate-affecting transforms enabled");
            } else {
                println!("Execution order ({} step(s)):", steps.len());
                for (index, step) in steps.iter().enumerate() {
                    println!("  {}. {}", index + 1, step);
                }
            }
            if !report.is_clean() {
                println!();
                for entry in &report.entries {
                    println!("  {}", entry);
                }
            }
        }
    }

    Ok(())
}
