use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use sha2::Digest as _;
use tracing_subscriber::EnvFilter;

use qrfeed::{EventFeed, FfmpegSink, FfmpegSinkOpts, Pipeline, PipelineConfig, SidePair};

#[derive(Parser, Debug)]
#[command(name = "qrfeed", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one event's frame as a PNG.
    Frame(FrameArgs),
    /// Render the whole feed to a video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct InputArgs {
    /// Game feed JSON (array of events, in play order).
    #[arg(long)]
    events: PathBuf,

    /// Side metadata JSON (`away`/`home` or `side_a`/`side_b`).
    #[arg(long)]
    sides: PathBuf,

    /// Pipeline config JSON; omitted fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Event index (0-based).
    #[arg(long)]
    index: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output video path.
    #[arg(long)]
    out: PathBuf,

    /// Refuse to replace an existing output file.
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,

    /// ffmpeg executable to run.
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: PathBuf,
}

struct Loaded {
    pipeline: Pipeline,
    feed: EventFeed,
    sides: SidePair,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn load(input: &InputArgs) -> anyhow::Result<Loaded> {
    let cfg = match input.config.as_deref() {
        Some(path) => PipelineConfig::from_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => PipelineConfig::default(),
    };
    let pipeline = Pipeline::new(cfg)?;
    let feed = EventFeed::from_path(&input.events)?;
    let sides = SidePair::from_path(&input.sides)?;
    eprintln!("{} away, {} home", sides.side_a.name, sides.side_b.name);
    Ok(Loaded {
        pipeline,
        feed,
        sides,
    })
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let Loaded {
        pipeline,
        feed,
        sides,
    } = load(&args.input)?;

    let (tier, frame) =
        pipeline.render_single(feed.events(), args.index, &sides.side_a, &sides.side_b)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    frame
        .to_rgb_image()?
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {} (tier {tier:?})", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let Loaded {
        pipeline,
        feed,
        sides,
    } = load(&args.input)?;

    let mut sink = FfmpegSink::new(FfmpegSinkOpts {
        out_path: args.out.clone(),
        overwrite: !args.no_overwrite,
        ffmpeg: args.ffmpeg,
    });
    let stats = pipeline.run(feed.events(), &sides.side_a, &sides.side_b, &mut sink)?;

    let digest = sha256_file(&args.out)?;
    eprintln!(
        "wrote {} ({} frames, {:.1}s), sha256 {digest}",
        args.out.display(),
        stats.frames,
        pipeline.config().video.fps.frames_to_secs(stats.frames)
    );
    Ok(())
}

fn sha256_file(path: &Path) -> anyhow::Result<String> {
    let file = File::open(path).with_context(|| format!("open '{}'", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut hasher = sha2::Sha256::new();
    std::io::copy(&mut reader, &mut hasher)
        .with_context(|| format!("hash '{}'", path.display()))?;
    Ok(format!("{:x}", hasher.finalize()))
}
