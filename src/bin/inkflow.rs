use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use inkflow::{
    BrushConfig, CanvasOpts, FrameDriver, FrameReport, InkCanvas, InputHub, LayerSize,
    PointerEvent, Rgba8Premul, StampGeometry, SurfaceHandoff,
};

#[derive(Parser, Debug)]
#[command(name = "inkflow", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a pointer script through the engine, one frame per step.
    Replay(ReplayArgs),
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    /// Input script JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Write the final presented frame as PNG.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Write per-frame statistics as JSON.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Write the committed strokes as JSON.
    #[arg(long)]
    strokes: Option<PathBuf>,
}

#[derive(serde::Deserialize, Debug)]
struct Script {
    size: LayerSize,
    #[serde(default)]
    opts: CanvasOpts,
    steps: Vec<Step>,
}

#[derive(serde::Deserialize, Debug)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Step {
    Pointer { event: PointerEvent },
    Brush { brush: BrushConfig },
    Color { rgba: [u8; 4] },
    Resize { size: LayerSize },
    Abort,
}

#[derive(serde::Serialize, Debug, Default)]
struct Report {
    frames: usize,
    presented: usize,
    dirty_px_total: u64,
    dirty_px_max: u64,
    strokes: usize,
    per_frame: Vec<FrameReport>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Replay(args) => cmd_replay(args),
    }
}

fn cmd_replay(args: ReplayArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.in_path)
        .with_context(|| format!("read script '{}'", args.in_path.display()))?;
    let script: Script = serde_json::from_str(&text)
        .with_context(|| format!("parse script '{}'", args.in_path.display()))?;

    let canvas = Arc::new(InkCanvas::new(StampGeometry::new(), script.opts)?);
    let hub = InputHub::new();
    let capture = canvas.start_capture(&hub);
    let mut driver = FrameDriver::new();
    let mut surface = SurfaceHandoff {
        generation: 1,
        size: script.size,
    };

    let mut report = Report::default();
    let mut tick = |report: &mut Report, surface: SurfaceHandoff| -> anyhow::Result<()> {
        let frame = driver.tick(&canvas, Some(surface))?;
        let px = u64::from(frame.dirty.width()) * u64::from(frame.dirty.height());
        report.frames += 1;
        report.presented += usize::from(frame.presented);
        report.dirty_px_total += px;
        report.dirty_px_max = report.dirty_px_max.max(px);
        report.per_frame.push(frame);
        Ok(())
    };

    tick(&mut report, surface)?;
    for step in script.steps {
        match step {
            Step::Pointer { event } => {
                hub.dispatch(&event);
            }
            Step::Brush { brush } => canvas.set_brush(brush),
            Step::Color { rgba: [r, g, b, a] } => {
                canvas.set_color(Rgba8Premul::from_straight_rgba(r, g, b, a));
            }
            Step::Resize { size } => {
                surface = SurfaceHandoff {
                    generation: surface.generation + 1,
                    size,
                };
            }
            Step::Abort => {
                canvas.abort_stroke()?;
            }
        }
        tick(&mut report, surface)?;
    }
    capture.stop();

    let strokes = canvas.strokes();
    report.strokes = strokes.len();
    eprintln!(
        "frames={} presented={} dirty_px_total={} dirty_px_max={} strokes={}",
        report.frames,
        report.presented,
        report.dirty_px_total,
        report.dirty_px_max,
        report.strokes
    );

    if let Some(path) = &args.report {
        write_json(path, &report)?;
    }
    if let Some(path) = &args.strokes {
        write_json(path, &strokes)?;
    }
    if let Some(path) = &args.out {
        let layer = driver
            .presented()
            .context("no surface was presented")?;
        let size = layer.size();
        let straight: Vec<u8> = layer
            .data()
            .chunks_exact(4)
            .flat_map(|p| {
                Rgba8Premul {
                    r: p[0],
                    g: p[1],
                    b: p[2],
                    a: p[3],
                }
                .to_straight_rgba()
            })
            .collect();
        ensure_parent(path)?;
        image::save_buffer_with_format(
            path,
            &straight,
            size.width,
            size.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("write json '{}'", path.display()))
}
