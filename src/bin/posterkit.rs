use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "posterkit", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a scene JSON to a PNG or JPEG.
    Render(RenderArgs),
    /// Parse and validate a scene JSON without drawing it.
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output image path; `.jpg`/`.jpeg` selects JPEG, anything else PNG.
    #[arg(long)]
    out: PathBuf,

    /// Directory image and font sources are resolved against (defaults to the scene's directory).
    #[arg(long)]
    assets_root: Option<PathBuf>,

    /// Directory of extra fonts to make available by family name. May be repeated.
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,

    /// Device pixels per logical pixel, unless the scene sets `pixelRatio`.
    #[arg(long, default_value_t = 1.0)]
    pixel_ratio: f64,

    /// JPEG quality in 0..=1.
    #[arg(long)]
    quality: Option<f32>,

    /// Fail when any node was skipped.
    #[arg(long)]
    strict: bool,

    /// Worker threads for image and font loads (default: one per core).
    #[arg(long)]
    load_threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let config = posterkit::PosterConfig::from_json_file(&args.in_path)?;
    let options = posterkit::PosterOptions {
        pixel_ratio: args.pixel_ratio,
        ..posterkit::PosterOptions::default()
    };

    let mut surface = posterkit::CpuSurface::new(1, 1)?;
    for dir in &args.font_dirs {
        let n = surface
            .load_font_dir(dir)
            .with_context(|| format!("load fonts from '{}'", dir.display()))?;
        eprintln!("loaded {n} font file(s) from {}", dir.display());
    }

    let assets_root = args
        .assets_root
        .clone()
        .unwrap_or_else(|| scene_dir(&args.in_path).to_path_buf());

    let loader = match args.load_threads {
        Some(n) => posterkit::FsAssetLoader::with_threads(assets_root, n)?,
        None => posterkit::FsAssetLoader::new(assets_root),
    };
    let mut poster = posterkit::Poster::new(surface, options)
        .with_loader(loader)
        .with_exporter(posterkit::FileExporter::new("."));

    let report = pollster::block_on(poster.render(&config))?;
    for skipped in &report.skipped {
        eprintln!("skipped {:?}: {:?}", skipped.kind, skipped.reason);
    }
    if args.strict && !report.is_complete() {
        anyhow::bail!("{} node(s) skipped", report.skipped.len());
    }

    let file_type = match args
        .out
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg" | "jpeg") => posterkit::FileType::Jpg,
        _ => posterkit::FileType::Png,
    };
    let export = posterkit::ExportOptions {
        file_type,
        quality: args.quality,
        path: Some(args.out.clone()),
        ..posterkit::ExportOptions::default()
    };
    let written = pollster::block_on(poster.export(&export))?;

    eprintln!(
        "wrote {} ({}x{}, {} node(s) drawn)",
        written.path.display(),
        written.width,
        written.height,
        report.drawn
    );
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let config = posterkit::PosterConfig::from_json_file(&args.in_path)?;
    let canvas = config.canvas(&posterkit::PosterOptions::default())?;

    let mut counts = [0usize; 3];
    count_nodes(&config.children, &mut counts);
    let (width, height) = canvas.pixel_dims();
    println!(
        "ok: {width}x{height} px, {} container(s), {} image(s), {} text node(s)",
        counts[0], counts[1], counts[2]
    );
    Ok(())
}

fn count_nodes(nodes: &[posterkit::SceneNode], counts: &mut [usize; 3]) {
    for node in nodes {
        match node {
            posterkit::SceneNode::Container(c) => {
                counts[0] += 1;
                count_nodes(&c.children, counts);
            }
            posterkit::SceneNode::Image(_) => counts[1] += 1,
            posterkit::SceneNode::Text(_) => counts[2] += 1,
        }
    }
}

fn scene_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}
