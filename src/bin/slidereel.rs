use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{ArgAction, Args, Parser, Subcommand};

use slidereel::encode::{AudioCodec, ContainerFormat, QualityPreset, VideoCodec};
use slidereel::{
    Canvas, EncoderAdapter, FfmpegEngine, Fps, FrameIndex, ParseOptions, RenderRequest,
    SynthOptions, TimelineOptions, ValidationOptions,
};

#[derive(Parser, Debug)]
#[command(name = "slidereel", version)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run structural checks on a deck and print the JSON report.
    Validate(ValidateArgs),
    /// Parse a deck and write its document model as JSON.
    Parse(ParseArgs),
    /// Print slide count, title and thumbnail candidates without parsing slides.
    Preview(DeckIn),
    /// Print the plain text of every slide.
    Text(DeckIn),
    /// Derive a default scene timeline from a deck.
    Timeline(TimelineArgs),
    /// Render a single timeline frame as a PNG.
    Frame(FrameArgs),
    /// Render a timeline to video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Parse a deck, derive its timeline and render it to video in one go.
    DeckVideo(DeckVideoArgs),
}

#[derive(Args, Debug)]
struct DeckIn {
    /// Input deck (.pptx).
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    #[command(flatten)]
    deck: DeckIn,

    /// Maximum accepted file size in bytes.
    #[arg(long)]
    max_file_size: Option<u64>,

    /// Maximum accepted slide count.
    #[arg(long)]
    max_slides: Option<usize>,
}

#[derive(Args, Debug)]
struct Parallelism {
    /// Disable parallel slide parsing / frame synthesis.
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Dedicated rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,

    /// Work items per chunk.
    #[arg(long)]
    chunk_size: Option<usize>,
}

impl Parallelism {
    fn parse_options(&self) -> ParseOptions {
        let d = ParseOptions::default();
        ParseOptions {
            parallel: !self.sequential,
            chunk_size: self.chunk_size.unwrap_or(d.chunk_size),
            threads: self.threads,
        }
    }

    fn synth_options(&self) -> SynthOptions {
        let d = SynthOptions::default();
        SynthOptions {
            parallel: !self.sequential,
            chunk_size: self.chunk_size.unwrap_or(d.chunk_size),
            threads: self.threads,
        }
    }
}

#[derive(Args, Debug)]
struct ParseArgs {
    #[command(flatten)]
    deck: DeckIn,

    /// Output JSON path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,

    #[command(flatten)]
    par: Parallelism,
}

#[derive(Args, Debug)]
struct TimelineArgs {
    #[command(flatten)]
    deck: DeckIn,

    /// Output scenes JSON.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Seconds per slide.
    #[arg(long, default_value_t = 5.0)]
    scene_duration: f64,
}

#[derive(Args, Debug)]
struct FrameArgs {
    /// Input scenes JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,

    #[arg(long, default_value_t = 30)]
    fps: u32,
}

#[derive(Args, Debug)]
struct EncodeFlags {
    #[arg(long, default_value = "medium")]
    preset: QualityPreset,

    #[arg(long, default_value = "h264")]
    codec: VideoCodec,

    #[arg(long, default_value = "mp4")]
    format: ContainerFormat,

    #[arg(long, default_value = "aac")]
    audio_codec: AudioCodec,

    /// Audio track to mux in.
    #[arg(long)]
    audio: Option<PathBuf>,

    /// Path to the ffmpeg binary.
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// Also write the JPEG thumbnail here.
    #[arg(long)]
    thumbnail: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Input scenes JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output video path.
    #[arg(long)]
    out: PathBuf,

    /// Synthesis rate; the preset rate when omitted.
    #[arg(long)]
    fps: Option<u32>,

    #[command(flatten)]
    encode: EncodeFlags,

    #[command(flatten)]
    par: Parallelism,
}

#[derive(Args, Debug)]
struct DeckVideoArgs {
    #[command(flatten)]
    deck: DeckIn,

    /// Output video path.
    #[arg(long)]
    out: PathBuf,

    /// Seconds per slide.
    #[arg(long, default_value_t = 5.0)]
    scene_duration: f64,

    #[command(flatten)]
    encode: EncodeFlags,

    #[command(flatten)]
    par: Parallelism,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Parse(args) => cmd_parse(args),
        Command::Preview(args) => cmd_preview(args),
        Command::Text(args) => cmd_text(args),
        Command::Timeline(args) => cmd_timeline(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
        Command::DeckVideo(args) => cmd_deck_video(args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn read_bytes(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("read '{}'", path.display()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_scenes(path: &Path) -> anyhow::Result<Vec<slidereel::Scene>> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read '{}'", path.display()))?;
    Ok(slidereel::scenes_from_json(&text)?)
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let bytes = read_bytes(&args.deck.in_path)?;
    let d = ValidationOptions::default();
    let options = ValidationOptions {
        max_file_size: args.max_file_size.unwrap_or(d.max_file_size),
        max_slides: args.max_slides.unwrap_or(d.max_slides),
        ..d
    };
    let report = slidereel::validate(&bytes, &options);
    print_json(&report)?;
    if !report.is_valid {
        anyhow::bail!("deck failed validation with {} error(s)", report.errors.len());
    }
    Ok(())
}

fn cmd_parse(args: ParseArgs) -> anyhow::Result<()> {
    let bytes = read_bytes(&args.deck.in_path)?;
    let mut log_progress = |p: f64| tracing::debug!(progress = p, "parsing");
    let doc = slidereel::parse_file_with(
        &bytes,
        &file_name(&args.deck.in_path),
        &args.par.parse_options(),
        Some(&mut log_progress),
    )?;
    match args.out {
        Some(out) => write_output(&out, serde_json::to_string_pretty(&doc)?.as_bytes()),
        None => print_json(&doc),
    }
}

fn cmd_preview(args: DeckIn) -> anyhow::Result<()> {
    let bytes = read_bytes(&args.in_path)?;
    print_json(&slidereel::quick_preview(&bytes)?)
}

fn cmd_text(args: DeckIn) -> anyhow::Result<()> {
    let bytes = read_bytes(&args.in_path)?;
    for (i, text) in slidereel::extract_all_text(&bytes)?.iter().enumerate() {
        println!("--- slide {} ---", i + 1);
        println!("{text}");
    }
    Ok(())
}

fn timeline_options(scene_duration: f64) -> TimelineOptions {
    TimelineOptions {
        scene_duration,
        ..TimelineOptions::default()
    }
}

fn deck_scenes(
    path: &Path,
    canvas: Canvas,
    scene_duration: f64,
    parse: &ParseOptions,
) -> anyhow::Result<Vec<slidereel::Scene>> {
    let bytes = read_bytes(path)?;
    let doc = slidereel::parse_file_with(&bytes, &file_name(path), parse, None)?;
    let archive = slidereel::package::Archive::open(bytes)?;
    Ok(slidereel::scenes_from_document(
        &doc,
        Some(&archive),
        canvas,
        &timeline_options(scene_duration),
    ))
}

fn cmd_timeline(args: TimelineArgs) -> anyhow::Result<()> {
    let canvas = Canvas::new(args.width, args.height)?;
    let scenes = deck_scenes(
        &args.deck.in_path,
        canvas,
        args.scene_duration,
        &ParseOptions::default(),
    )?;
    write_output(&args.out, slidereel::timeline::scenes_to_json(&scenes)?.as_bytes())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let scenes = read_scenes(&args.in_path)?;
    let frame = slidereel::synthesize_frame(
        &scenes,
        Fps::integer(args.fps)?,
        Canvas::new(args.width, args.height)?,
        FrameIndex(args.frame),
    )?;
    write_output(&args.out, &frame.image_bytes)
}

fn encode_scenes(
    scenes: &[slidereel::Scene],
    fps: Fps,
    out: &Path,
    flags: &EncodeFlags,
    par: &Parallelism,
) -> anyhow::Result<()> {
    let target = flags.preset.spec();
    let canvas = Canvas::new(target.width, target.height)?;
    let mut synth_progress = |p: f64| tracing::debug!(progress = p, "synthesizing");
    let frames = slidereel::synthesize(
        scenes,
        fps,
        canvas,
        None,
        &par.synth_options(),
        Some(&mut synth_progress),
    )?;

    let audio = flags.audio.as_deref().map(read_bytes).transpose()?;
    let request = RenderRequest {
        preset: flags.preset,
        codec: flags.codec,
        format: flags.format,
        audio_codec: flags.audio_codec,
        input_fps: Some(fps.num),
        duration_secs: None,
    };
    let mut adapter = EncoderAdapter::new(FfmpegEngine::with_binary(&flags.ffmpeg));
    adapter.init()?;
    let mut encode_progress = |p: f64| tracing::debug!(progress = p, "encoding");
    let video = adapter.render(
        &frames,
        audio.as_deref(),
        &request,
        Some(&mut encode_progress),
    )?;

    write_output(out, &video.bytes)?;
    if let Some(thumb) = &flags.thumbnail {
        write_output(thumb, &video.thumbnail)?;
    }
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let scenes = read_scenes(&args.in_path)?;
    let fps = Fps::integer(args.fps.unwrap_or(args.encode.preset.spec().fps))?;
    encode_scenes(&scenes, fps, &args.out, &args.encode, &args.par)
}

fn cmd_deck_video(args: DeckVideoArgs) -> anyhow::Result<()> {
    let target = args.encode.preset.spec();
    let canvas = Canvas::new(target.width, target.height)?;
    let scenes = deck_scenes(
        &args.deck.in_path,
        canvas,
        args.scene_duration,
        &args.par.parse_options(),
    )?;
    let fps = Fps::integer(target.fps)?;
    encode_scenes(&scenes, fps, &args.out, &args.encode, &args.par)
}
