use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "stagegrid", version)]
struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the collage still as a PNG.
    Collage(CollageArgs),
    /// Render one animation frame as a PNG.
    Frame(FrameArgs),
    /// Render the reveal animation (requires `ffmpeg` on PATH).
    Video(VideoArgs),
    /// Write the collage, the single stills and the animation into a directory.
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct ProjectArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Override the project's shuffle seed.
    #[arg(long)]
    seed: Option<u32>,
}

#[derive(Args, Debug)]
struct CollageArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// Frame index (0-based); indexes past the end show the finished collage.
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct VideoArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// Output video path.
    #[arg(long)]
    out: PathBuf,

    /// Container; defaults to the project's `video_format`.
    #[arg(long, value_enum)]
    format: Option<FormatChoice>,

    /// Pace frames in wall-clock time instead of rendering as fast as possible.
    #[arg(long, default_value_t = false)]
    realtime: bool,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// Output directory.
    #[arg(long)]
    out_dir: PathBuf,

    /// Container; defaults to the project's `video_format`.
    #[arg(long, value_enum)]
    format: Option<FormatChoice>,

    /// Skip the animation and write stills only.
    #[arg(long, default_value_t = false)]
    stills_only: bool,

    /// Pace frames in wall-clock time instead of rendering as fast as possible.
    #[arg(long, default_value_t = false)]
    realtime: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Webm,
    Mp4,
}

impl From<FormatChoice> for stagegrid::VideoFormat {
    fn from(value: FormatChoice) -> Self {
        match value {
            FormatChoice::Webm => stagegrid::VideoFormat::Webm,
            FormatChoice::Mp4 => stagegrid::VideoFormat::Mp4,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Collage(args) => cmd_collage(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Video(args) => cmd_video(args),
        Command::Export(args) => cmd_export(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn load_studio(args: &ProjectArgs) -> anyhow::Result<stagegrid::Studio> {
    let project = stagegrid::ProjectConfig::from_path(&args.in_path)?;
    let root = args.in_path.parent().unwrap_or_else(|| Path::new("."));
    let (mut studio, report) = project
        .into_studio(root)
        .with_context(|| format!("load project '{}'", args.in_path.display()))?;
    for failure in &report.failed {
        eprintln!("skipped {}: {}", failure.name, failure.error);
    }
    if let Some(seed) = args.seed {
        studio.set_seed(seed);
    }
    Ok(studio)
}

fn write_png(path: &Path, surface: &stagegrid::Surface) -> anyhow::Result<()> {
    stagegrid::ensure_parent_dir(path)?;
    let bytes = stagegrid::encode_png(surface)?;
    std::fs::write(path, bytes).with_context(|| format!("write png '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("start async runtime")
}

fn pacing(realtime: bool) -> stagegrid::Pacing {
    if realtime {
        stagegrid::Pacing::RealTime
    } else {
        stagegrid::Pacing::Offline
    }
}

fn sink_for(studio: &stagegrid::Studio, format: Option<FormatChoice>) -> stagegrid::FfmpegSink {
    let format = format
        .map(stagegrid::VideoFormat::from)
        .unwrap_or(studio.settings().video_format);
    stagegrid::FfmpegSink::new(stagegrid::FfmpegSinkOpts::new(format))
}

fn cmd_collage(args: CollageArgs) -> anyhow::Result<()> {
    let studio = load_studio(&args.project)?;
    write_png(&args.out, &studio.collage()?)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let studio = load_studio(&args.project)?;
    let renderer = studio.renderer()?;
    let frame = renderer.draw_frame(stagegrid::FrameIndex(args.frame));
    write_png(&args.out, &frame)
}

fn cmd_video(args: VideoArgs) -> anyhow::Result<()> {
    let studio = load_studio(&args.project)?;
    let mut sink = sink_for(&studio, args.format);
    let video = runtime()?.block_on(studio.render_video(&mut sink, pacing(args.realtime)))?;

    stagegrid::ensure_parent_dir(&args.out)?;
    std::fs::write(&args.out, &video.bytes)
        .with_context(|| format!("write video '{}'", args.out.display()))?;
    eprintln!(
        "wrote {} ({} frames)",
        args.out.display(),
        video.frame_count
    );
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let studio = load_studio(&args.project)?;
    let mut writer = stagegrid::DirWriter::new(&args.out_dir);

    let summary = if args.stills_only {
        studio.export_stills(&mut writer)?
    } else {
        let mut sink = sink_for(&studio, args.format);
        runtime()?.block_on(studio.export_all(&mut writer, &mut sink, pacing(args.realtime)))?
    };

    for name in &summary.files {
        eprintln!("wrote {}", args.out_dir.join(name).display());
    }
    Ok(())
}
