use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use lumen_engine::raster::{composite, Offset, RasterImage};

#[derive(Args, Debug)]
pub struct CompositeArgs {
    /// Image blended onto (any format `image` can decode).
    #[arg(short, long, value_name = "FILE")]
    background: PathBuf,

    /// Image blended on top.
    #[arg(short, long, value_name = "FILE")]
    foreground: PathBuf,

    /// Multiplier on the foreground alpha. Not clamped.
    #[arg(long, default_value_t = 1.0)]
    opacity: f32,

    /// Foreground origin X in background pixels (may be negative).
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    x: i32,

    /// Foreground origin Y in background pixels (may be negative).
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    y: i32,

    /// Output file; the format follows the extension.
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,
}

pub fn run(args: &CompositeArgs) -> Result<()> {
    let mut background = load(&args.background)?;
    let foreground = load(&args.foreground)?;

    composite(
        &mut background,
        &foreground,
        args.opacity,
        Offset::new(args.x, args.y),
    );

    let out = image::RgbaImage::try_from(background)?;
    out.save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    log::info!(
        "composited {} over {} -> {}",
        args.foreground.display(),
        args.background.display(),
        args.output.display()
    );
    Ok(())
}

fn load(path: &Path) -> Result<RasterImage> {
    let img = image::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(RasterImage::from(&img))
}
