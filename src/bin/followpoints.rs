use std::{
    fs::File,
    io::{BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use followpoints::{FollowPointRenderer, Playfield, PointSnapshot, TargetId, TargetSource as _};

#[derive(Parser, Debug)]
#[command(name = "followpoints", version)]
struct Cli {
    /// Enable debug logging on stderr.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the connection chain.
    Chain(ChainArgs),
    /// Print every follow point visible at a given time.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct ChainArgs {
    /// Input playfield JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output JSON path (stdout if omitted).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input playfield JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Time to sample, in milliseconds.
    #[arg(long)]
    at: f64,

    /// Tick interval used to advance the renderer up to `--at`, in milliseconds.
    #[arg(long, default_value_t = 16.0)]
    step: f64,

    /// Output JSON path (stdout if omitted).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(serde::Serialize)]
struct ChainLink {
    start: TargetId,
    end: Option<TargetId>,
    lifetime_start: f64,
    lifetime_end: Option<f64>,
    points: usize,
}

#[derive(serde::Serialize)]
struct FrameOut {
    at: f64,
    ticks: u64,
    points: Vec<PointSnapshot>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Chain(args) => cmd_chain(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn read_playfield(path: &Path) -> anyhow::Result<Playfield> {
    let playfield = Playfield::from_path(path)
        .with_context(|| format!("load playfield '{}'", path.display()))?;
    Ok(playfield)
}

fn cmd_chain(args: ChainArgs) -> anyhow::Result<()> {
    let playfield = read_playfield(&args.in_path)?;
    let mut renderer = playfield.build_renderer()?;
    // Nothing is alive before any target, so this tick only computes lifetimes.
    renderer.update(&playfield, f64::NEG_INFINITY);

    let opts = *renderer.opts();
    let links: Vec<ChainLink> = renderer
        .entries()
        .iter()
        .map(|entry| {
            let plans = match (playfield.target(entry.start()), entry.end()) {
                (Some(start), Some(end)) => playfield
                    .target(end)
                    .map(|end| followpoints::plan_points(start, end, opts.spacing, &opts.timing))
                    .unwrap_or_default(),
                _ => Vec::new(),
            };
            let lifetime_end = plans
                .iter()
                .map(|p| p.fade.fade_out + p.fade_duration)
                .reduce(f64::max);
            ChainLink {
                start: entry.start(),
                end: entry.end(),
                lifetime_start: entry.lifetime_start(),
                lifetime_end,
                points: plans.len(),
            }
        })
        .collect();

    write_json(args.out.as_deref(), &links)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.step.is_finite() && args.step > 0.0,
        "--step must be a positive number of milliseconds"
    );
    anyhow::ensure!(args.at.is_finite(), "--at must be finite");

    let playfield = read_playfield(&args.in_path)?;
    let mut renderer = playfield.build_renderer()?;
    let ticks = run_until(&mut renderer, &playfield, args.at, args.step);

    let out = FrameOut {
        at: args.at,
        ticks,
        points: renderer.visible_points(args.at),
    };
    write_json(args.out.as_deref(), &out)
}

/// Upper bound on the ticks run before the sampled one.
const MAX_TICKS: u64 = 100_000;

/// Tick from before the earliest possible fade-in up to and including `at`.
///
/// At most [`MAX_TICKS`] ticks run before `at`. Starting later only skips connections that have
/// already expired by the first tick, so the points visible at `at` are the same.
fn run_until(renderer: &mut FollowPointRenderer, playfield: &Playfield, at: f64, step: f64) -> u64 {
    let first = playfield
        .earliest_time()
        .map_or(at, |t| t - renderer.opts().timing.base_preempt)
        .max(at - step * MAX_TICKS as f64)
        .min(at);

    let mut ticks = 0;
    for i in 0..MAX_TICKS {
        let t = first + i as f64 * step;
        if t >= at {
            break;
        }
        renderer.update(playfield, t);
        ticks += 1;
    }
    renderer.update(playfield, at);
    ticks + 1
}

fn write_json<T: serde::Serialize>(out: Option<&Path>, value: &T) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            let f = File::create(path)
                .with_context(|| format!("create output '{}'", path.display()))?;
            let mut w = BufWriter::new(f);
            serde_json::to_writer_pretty(&mut w, value).context("write JSON")?;
            w.write_all(b"\n")?;
            w.flush()?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut w = stdout.lock();
            serde_json::to_writer_pretty(&mut w, value).context("write JSON")?;
            w.write_all(b"\n")?;
        }
    }
    Ok(())
}
