use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "vo3", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a WebM slideshow (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render one slide as a PNG.
    Frame(FrameArgs),
    /// Fact-check a title and subtitles with Gemini (reads `API_KEY`).
    Factcheck(FactcheckArgs),
}

/// Either a project file or an inline project built from flags.
#[derive(Args, Debug)]
struct ProjectArgs {
    /// Project JSON; asset paths are relative to its directory.
    #[arg(long = "in", conflicts_with_all = ["images", "logo", "audio", "text"])]
    in_path: Option<PathBuf>,

    /// Slide image (repeatable, in display order).
    #[arg(long = "image")]
    images: Vec<PathBuf>,

    /// Seconds each slide is shown.
    #[arg(long, default_value_t = vo3::DEFAULT_SECONDS_PER_IMAGE)]
    seconds: f64,

    /// Logo drawn in the bottom-right corner.
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Soundtrack.
    #[arg(long)]
    audio: Option<PathBuf>,

    /// Caption text.
    #[arg(long)]
    text: Option<String>,

    /// Caption position, e.g. `top-left` or `bottom-center`.
    #[arg(long, default_value = "bottom-center")]
    position: vo3::OverlayPosition,

    /// Caption font size in pixels.
    #[arg(long, default_value_t = 48)]
    font_size: u32,

    /// Caption fill color (CSS hex or rgb()).
    #[arg(long, default_value = "#FFFFFF")]
    color: String,

    /// Caption font file.
    #[arg(long)]
    font: Option<PathBuf>,
}

impl ProjectArgs {
    fn load(&self) -> anyhow::Result<vo3::RenderRequest> {
        if let Some(path) = &self.in_path {
            let project = vo3::ProjectConfig::from_path(path)?;
            let root = path.parent().unwrap_or_else(|| Path::new("."));
            return Ok(project.into_request(root)?);
        }

        let images = self
            .images
            .iter()
            .map(|p| vo3::ImageAsset::from_path(p))
            .collect::<vo3::StudioResult<Vec<_>>>()?;
        let mut request = vo3::RenderRequest::new(images, self.seconds);
        request.logo = self
            .logo
            .as_deref()
            .map(vo3::ImageAsset::from_path)
            .transpose()?;
        request.audio = self
            .audio
            .as_deref()
            .map(vo3::AudioSource::from_path)
            .transpose()?;
        request.overlay = vo3::TextOverlayConfig {
            text: self.text.clone().unwrap_or_default(),
            position: self.position,
            font_size: self.font_size,
            color: self.color.clone(),
            font_path: self.font.clone(),
        };
        Ok(request)
    }
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// Output WebM path.
    #[arg(long)]
    out: PathBuf,

    /// Hold each slide for its real duration, like a live capture.
    #[arg(long, default_value_t = false)]
    realtime: bool,

    /// VP9 constant quality (0..=63).
    #[arg(long, default_value_t = 32)]
    crf: u8,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// Slide index (0-based).
    #[arg(long, default_value_t = 0)]
    slide: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct FactcheckArgs {
    /// Project JSON to take the title and subtitles from.
    #[arg(long = "in", conflicts_with_all = ["title", "subtitles"])]
    in_path: Option<PathBuf>,

    #[arg(long, default_value = "")]
    title: String,

    #[arg(long, default_value = "")]
    subtitles: String,
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
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Factcheck(args) => cmd_factcheck(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let request = args.project.load()?;

    let encoder = vo3::WebmEncoder::new(vo3::WebmEncoderOpts {
        crf: args.crf,
        ..Default::default()
    });
    let mut simulated = vo3::SimulatedClock::new();
    let mut realtime = vo3::RealtimeClock::new();
    let clock: &mut dyn vo3::Clock = if args.realtime {
        &mut realtime
    } else {
        &mut simulated
    };

    let cancel = vo3::CancellationToken::new();
    let mut report = |p: vo3::RenderProgress| tracing::info!("{}", p.status_line());
    let artifact = vo3::generate_video(&request, encoder, clock, &cancel, &mut report)?;
    artifact.save_as(&args.out)?;

    eprintln!(
        "wrote {} ({} frames, {:.2}s)",
        args.out.display(),
        artifact.frame_count,
        artifact.duration_secs
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let request = args.project.load()?;
    let frame = vo3::render_frame(&request, args.slide)?;
    let img = frame.to_rgba_image()?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    img.save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_factcheck(args: FactcheckArgs) -> anyhow::Result<()> {
    let (title, subtitles) = match &args.in_path {
        Some(path) => {
            let project = vo3::ProjectConfig::from_path(path)?;
            (project.title, project.subtitles)
        }
        None => (args.title, args.subtitles),
    };

    let outcome: vo3::FactCheckOutcome = vo3::ensure_content(&title, &subtitles)
        .and_then(|()| vo3::GeminiClient::from_env())
        .and_then(|client| {
            use vo3::ContentAnalyzer as _;
            client.analyze(&title, &subtitles)
        })
        .into();

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    if matches!(outcome, vo3::FactCheckOutcome::Failed { .. }) {
        std::process::exit(1);
    }
    Ok(())
}
