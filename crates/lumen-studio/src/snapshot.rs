use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use lumen_engine::device::{GpuInit, HeadlessGpu};
use lumen_engine::render::MeshDrawer;

use crate::scene::{OrbitCamera, ShadingArgs, CLEAR};

#[derive(Args, Debug)]
pub struct SnapshotArgs {
    #[command(flatten)]
    shading: ShadingArgs,

    #[arg(long, default_value_t = 640)]
    width: u32,

    #[arg(long, default_value_t = 480)]
    height: u32,

    /// Rotation about X in radians.
    #[arg(long, allow_hyphen_values = true)]
    rotate_x: Option<f32>,

    /// Rotation about Y in radians.
    #[arg(long, allow_hyphen_values = true)]
    rotate_y: Option<f32>,

    /// Distance from the camera to the mesh centre.
    #[arg(long)]
    distance: Option<f32>,

    /// Force the fallback (usually software) adapter. Fails when the
    /// platform has none.
    #[arg(long)]
    fallback_adapter: bool,

    /// Output file; the format follows the extension.
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,
}

impl SnapshotArgs {
    fn camera(&self) -> OrbitCamera {
        let default = OrbitCamera::default();
        OrbitCamera {
            rotation_x: self.rotate_x.unwrap_or(default.rotation_x),
            rotation_y: self.rotate_y.unwrap_or(default.rotation_y),
            distance: self.distance.unwrap_or(default.distance),
        }
    }

    fn gpu_init(&self) -> GpuInit {
        GpuInit {
            force_fallback_adapter: self.fallback_adapter,
            ..GpuInit::default()
        }
    }
}

pub fn run(args: &SnapshotArgs) -> Result<()> {
    let gpu = pollster::block_on(HeadlessGpu::new(args.width, args.height, args.gpu_init()))?;

    let mut drawer = MeshDrawer::with_config(args.shading.shading_config());
    {
        let ctx = gpu.render_ctx();
        drawer.set_mesh(&ctx, &args.shading.mesh());
        if let Some(texture) = args.shading.load_texture()? {
            drawer.set_texture(&ctx, &texture)?;
        }
    }

    let aspect = args.width as f32 / args.height as f32;
    let (mvp, mv, nm) = args.camera().matrices(aspect);

    gpu.render(CLEAR, |ctx, target| drawer.draw(ctx, target, &mvp, &mv, &nm))?;

    let image = gpu.read_rgba()?;
    image
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    log::info!("snapshot {}x{} -> {}", args.width, args.height, args.output.display());
    Ok(())
}
