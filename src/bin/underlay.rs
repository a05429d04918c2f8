use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "underlay", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Flatten an image + cutout + text layers to a PNG.
    Flatten(FlattenArgs),
    /// Print the live preview stack for an image as JSON.
    Preview(PreviewArgs),
}

#[derive(Parser, Debug)]
struct FlattenArgs {
    /// Uploaded photo (PNG/JPEG/WebP).
    #[arg(long)]
    image: PathBuf,

    /// Background-removed cutout (transparent PNG).
    #[arg(long)]
    cutout: PathBuf,

    /// Text layers as a JSON array.
    #[arg(long)]
    layers: Option<PathBuf>,

    /// Container width the layers were edited against, in CSS pixels.
    #[arg(long, default_value_t = 800.0)]
    container_width: f64,

    /// Register a font as `family=path/to/font.ttf` (repeatable; the first
    /// one is the fallback).
    #[arg(long = "font", value_parser = parse_font_arg)]
    fonts: Vec<(String, PathBuf)>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Uploaded photo (PNG/JPEG/WebP).
    #[arg(long)]
    image: PathBuf,

    /// Optional cutout (transparent PNG).
    #[arg(long)]
    cutout: Option<PathBuf>,

    /// Text layers as a JSON array.
    #[arg(long)]
    layers: Option<PathBuf>,

    /// Width available to the preview container, in CSS pixels.
    #[arg(long, default_value_t = 800.0)]
    available_width: f64,
}

fn parse_font_arg(raw: &str) -> Result<(String, PathBuf), String> {
    let (family, path) = raw
        .split_once('=')
        .ok_or_else(|| "expected family=path".to_owned())?;
    if family.is_empty() {
        return Err("font family must be non-empty".to_owned());
    }
    Ok((family.to_owned(), PathBuf::from(path)))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Flatten(args) => cmd_flatten(args),
        Command::Preview(args) => cmd_preview(args),
    }
}

fn load_layers(path: Option<&PathBuf>) -> anyhow::Result<Vec<underlay::TextLayer>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let bytes = std::fs::read(path).with_context(|| format!("read layers '{}'", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parse layers '{}'", path.display()))
}

fn load_image(path: &PathBuf) -> anyhow::Result<underlay::PreparedImage> {
    let bytes = std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    underlay::render::decode_image(&bytes)
        .with_context(|| format!("decode image '{}'", path.display()))
}

fn cmd_flatten(args: FlattenArgs) -> anyhow::Result<()> {
    let original = load_image(&args.image)?;
    let cutout = load_image(&args.cutout)?;
    let layers = load_layers(args.layers.as_ref())?;

    let mut fonts = underlay::FontStore::new();
    for (family, path) in &args.fonts {
        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        fonts.register(family.as_str(), bytes);
    }

    let mut compositor = underlay::Compositor::new(fonts);
    let png = compositor.flatten_png(&underlay::FlattenRequest {
        original: &original,
        cutout: &cutout,
        layers: &layers,
        container_width_at_edit: args.container_width,
    })?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, png).with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let original = load_image(&args.image)?;
    let layers = load_layers(args.layers.as_ref())?;

    let mut session = underlay::EditSession::new();
    let natural = original.size();
    let ticket = session.set_original(original);
    if let Some(path) = &args.cutout {
        session.attach_cutout(ticket, load_image(path)?);
    }
    for layer in &layers {
        session.apply_text_at(&layer.text, layer.position, layer.style.clone())?;
    }

    let container = underlay::ContainerSize::from_available_width(natural, args.available_width)?;
    let stack = underlay::render_preview(&session, container)?;
    println!("{}", serde_json::to_string_pretty(&stack)?);
    Ok(())
}
