//! CLI application for cascade object detection on still images.
//!
//! Usage:
//!   quick-face <image> --model cascade.bin       # Human-readable output
//!   quick-face <image> --model cascade.bin --json
//!   quick-face <image> --model cascade.bin -o detections.json

use clap::Parser;
use quick_face::{CascadeModel, DetectParams, Detector, luma_from_rgba};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "quick-face")]
#[command(author, version, about = "Attentional-cascade object detection", long_about = None)]
struct Args {
    /// Input image file
    #[arg(required = true)]
    image: PathBuf,

    /// Cascade model path
    #[arg(short, long, default_value = "cascade.bin")]
    model: PathBuf,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pyramid growth ratio between scales
    #[arg(long, default_value = "1.2")]
    scale_factor: f32,

    /// Smallest patch height searched, in pixels
    #[arg(long, default_value = "50")]
    min_height: f32,

    /// Cap on the number of reported detections
    #[arg(long, default_value = "256")]
    max_detections: usize,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Output structure for JSON serialization
#[derive(Serialize)]
struct Output {
    image: String,
    width: u32,
    height: u32,
    elapsed_ms: f64,
    detections: Vec<DetectionOutput>,
}

#[derive(Serialize)]
struct DetectionOutput {
    /// Detection index (1-based), in scan order
    index: usize,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    conf: f32,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    if args.verbose {
        eprintln!("Loading cascade from {:?}...", args.model);
    }
    let model = CascadeModel::load(&args.model)?;
    if args.verbose {
        eprintln!(
            "Cascade: {} trees of depth {}, patch ratio {:.3}",
            model.tree_count(),
            model.tree_depth(),
            model.wh_ratio()
        );
    }

    let detector = Detector::with_params(
        model,
        DetectParams {
            scale_factor: args.scale_factor,
            min_height: args.min_height,
            max_detections: args.max_detections,
        },
    );

    if args.verbose {
        eprintln!("Loading image {:?}...", args.image);
    }
    let img = image::open(&args.image)?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let gray = luma_from_rgba(rgba.as_raw(), width, height);

    if args.verbose {
        eprintln!("Detecting...");
    }
    let started = Instant::now();
    let detections = detector.detect(&gray.view())?;
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

    if args.verbose {
        eprintln!("Found {} detection(s) in {:.1} ms", detections.len(), elapsed_ms);
    }

    let output = Output {
        image: args.image.display().to_string(),
        width,
        height,
        elapsed_ms,
        detections: detections
            .iter()
            .enumerate()
            .map(|(i, d)| DetectionOutput {
                index: i + 1,
                x: d.x,
                y: d.y,
                w: d.w,
                h: d.h,
                conf: d.conf,
            })
            .collect(),
    };

    let output_str = if args.json {
        serde_json::to_string_pretty(&output)?
    } else {
        format_human_readable(&output)
    };

    if let Some(ref path) = args.output {
        std::fs::write(path, &output_str)?;
        if args.verbose {
            eprintln!("Output written to {:?}", path);
        }
    } else {
        println!("{}", output_str);
    }

    Ok(())
}

fn format_human_readable(output: &Output) -> String {
    let mut s = String::new();

    s.push_str(&format!(
        "Image: {} ({}x{})\n",
        output.image, output.width, output.height
    ));
    s.push_str(&format!(
        "Detections: {} ({:.1} ms)\n",
        output.detections.len(),
        output.elapsed_ms
    ));

    if output.detections.is_empty() {
        s.push_str("\nNothing found.\n");
        return s;
    }

    s.push('\n');
    for det in &output.detections {
        s.push_str(&format!(
            "  #{:<3} {}x{} at ({}, {})  conf {:.3}\n",
            det.index, det.w, det.h, det.x, det.y, det.conf
        ));
    }

    s
}
