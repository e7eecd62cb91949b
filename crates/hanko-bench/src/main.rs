//! hanko-bench: CLI tool for stamp pipeline experimentation and diagnostics.
//!
//! Runs the stamp pipeline on a given image file with identity
//! background removal (no model — the input is treated as already
//! matted), printing per-stage timings. Useful for:
//!
//! - Measuring per-stage durations to identify bottlenecks
//! - Inspecting how an ink color renders on a given subject
//! - Watching the event stream a browser caller would receive
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin hanko-bench -- [OPTIONS] <IMAGE_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use hanko_pipeline::{
    Dimensions, IdentityRemover, InkColor, JobEvent, JobInput, ProgressSink, encode, stamp,
};
use serde::Serialize;
use web_time::{Duration, Instant};

/// Stamp pipeline experimentation and diagnostics for hanko.
///
/// Runs the stamp pipeline on a given image and prints per-stage
/// timing diagnostics.
#[derive(Parser)]
#[command(name = "hanko-bench", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Ink color as #RRGGBB.
    #[arg(long, default_value = "#B3001B")]
    color: String,

    /// Write the stamped PNG to this path.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output diagnostics as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,

    /// Print the job event stream as JSON lines (what a browser caller
    /// would receive), then exit.
    #[arg(long)]
    events: bool,
}

/// Per-stage durations for one pipeline run.
#[derive(Debug, Default, Clone, Copy, Serialize)]
struct StageTimings {
    decode_ms: f64,
    render_ms: f64,
    encode_ms: f64,
    total_ms: f64,
}

impl StageTimings {
    fn accumulate(&mut self, other: Self) {
        self.decode_ms += other.decode_ms;
        self.render_ms += other.render_ms;
        self.encode_ms += other.encode_ms;
        self.total_ms += other.total_ms;
    }

    #[allow(clippy::cast_precision_loss)]
    fn averaged(mut self, runs: usize) -> Self {
        let n = runs as f64;
        self.decode_ms /= n;
        self.render_ms /= n;
        self.encode_ms /= n;
        self.total_ms /= n;
        self
    }
}

/// Full diagnostics payload for `--json` output.
#[derive(Debug, Serialize)]
struct Diagnostics {
    source: Dimensions,
    stamp: Dimensions,
    inked_pixels: u64,
    transparent_pixels: u64,
    png_bytes: usize,
    runs: usize,
    timings: StageTimings,
}

/// Sink that prints each event as a JSON line, summarizing the PNG
/// payload instead of dumping megabytes of bytes.
struct JsonLineSink;

impl ProgressSink for JsonLineSink {
    fn emit(&mut self, event: JobEvent) {
        let line = match &event {
            JobEvent::Complete { file } => serde_json::json!({
                "type": "complete",
                "bytes": file.len(),
            }),
            other => serde_json::json!(other),
        };
        println!("{line}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let ink = InkColor::parse(&cli.color).map_err(|e| e.to_string())?;
    let file = std::fs::read(&cli.image_path)
        .map_err(|e| format!("cannot read {}: {e}", cli.image_path.display()))?;

    if cli.events {
        pollster::block_on(hanko_pipeline::job::run(
            JobInput {
                file,
                color_hex: cli.color.clone(),
            },
            &IdentityRemover,
            JsonLineSink,
        ));
        return Ok(());
    }

    let mut totals = StageTimings::default();
    let mut last_run = None;

    for _ in 0..cli.runs {
        let (timings, diagnostics, png) = timed_run(&file, ink)?;
        totals.accumulate(timings);
        last_run = Some((diagnostics, png));
    }

    let Some((mut diagnostics, png)) = last_run else {
        return Err("no runs executed".to_string());
    };
    diagnostics.runs = cli.runs;
    diagnostics.timings = totals.averaged(cli.runs);

    if let Some(output) = &cli.output {
        std::fs::write(output, &png)
            .map_err(|e| format!("cannot write {}: {e}", output.display()))?;
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&diagnostics)
            .map_err(|e| format!("diagnostics serialization failed: {e}"))?;
        println!("{json}");
    } else {
        print_report(&diagnostics, cli.output.as_deref());
    }
    Ok(())
}

/// One timed pipeline run: decode, render, encode.
fn timed_run(file: &[u8], ink: InkColor) -> Result<(StageTimings, Diagnostics, Vec<u8>), String> {
    let total_start = Instant::now();

    let start = Instant::now();
    let decoded = image::load_from_memory(file).map_err(|e| e.to_string())?;
    let decode_ms = millis(start.elapsed());
    let source = Dimensions {
        width: decoded.width(),
        height: decoded.height(),
    };

    let start = Instant::now();
    let rendered = stamp::render(&decoded, ink);
    let render_ms = millis(start.elapsed());

    let start = Instant::now();
    let png = encode::encode_png(&rendered).map_err(|e| e.to_string())?;
    let encode_ms = millis(start.elapsed());

    let inked_pixels = rendered.pixels().filter(|p| p.0[3] > 0).count() as u64;
    let total_pixels = u64::from(rendered.width()) * u64::from(rendered.height());

    let diagnostics = Diagnostics {
        source,
        stamp: Dimensions {
            width: rendered.width(),
            height: rendered.height(),
        },
        inked_pixels,
        transparent_pixels: total_pixels - inked_pixels,
        png_bytes: png.len(),
        runs: 1,
        timings: StageTimings::default(),
    };

    let timings = StageTimings {
        decode_ms,
        render_ms,
        encode_ms,
        total_ms: millis(total_start.elapsed()),
    };
    Ok((timings, diagnostics, png))
}

fn print_report(diagnostics: &Diagnostics, output: Option<&std::path::Path>) {
    println!(
        "source    {}x{}",
        diagnostics.source.width, diagnostics.source.height,
    );
    println!(
        "stamp     {}x{} ({} inked / {} transparent pixels)",
        diagnostics.stamp.width,
        diagnostics.stamp.height,
        diagnostics.inked_pixels,
        diagnostics.transparent_pixels,
    );
    println!("png       {} bytes", diagnostics.png_bytes);
    println!(
        "timings   decode {:.2} ms | render {:.2} ms | encode {:.2} ms | total {:.2} ms (avg of {})",
        diagnostics.timings.decode_ms,
        diagnostics.timings.render_ms,
        diagnostics.timings.encode_ms,
        diagnostics.timings.total_ms,
        diagnostics.runs,
    );
    if let Some(path) = output {
        println!("written   {}", path.display());
    }
}

#[allow(clippy::cast_precision_loss)]
fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
