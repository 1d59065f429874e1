use anyhow::Result;
use clap::Args;
use lumen_engine::core::{App, AppControl, FrameCtx};
use lumen_engine::coords::Vec3;
use lumen_engine::device::GpuInit;
use lumen_engine::input::{InputFrame, InputState, Key, MouseButton};
use lumen_engine::mesh::Mesh;
use lumen_engine::render::MeshDrawer;
use lumen_engine::shading::Light;
use lumen_engine::window::{LogicalSize, Runtime, RuntimeConfig};

use crate::scene::{light_for, OrbitCamera, ShadingArgs, CLEAR, DEFAULT_LIGHT};

/// Shininess change per second while Up/Down is held.
const SHININESS_RATE: f32 = 60.0;
const MIN_SHININESS: f32 = 1.0;
const MAX_SHININESS: f32 = 512.0;

#[derive(Args, Debug)]
pub struct ViewArgs {
    #[command(flatten)]
    shading: ShadingArgs,

    #[arg(long, default_value_t = 960.0)]
    width: f64,

    #[arg(long, default_value_t = 720.0)]
    height: f64,
}

pub fn run(args: ViewArgs) -> Result<()> {
    let config = RuntimeConfig {
        title: "lumen viewer".to_string(),
        initial_size: LogicalSize::new(args.width, args.height),
    };
    let viewer = Viewer::new(&args.shading)?;

    log::info!(
        "controls: drag = rotate, wheel = distance, T texture, S swap Y/Z, \
         L world/view light, Up/Down shininess, R reset, Esc quit"
    );

    Runtime::run(config, GpuInit::default(), viewer)
}

struct Viewer {
    drawer: MeshDrawer,
    camera: OrbitCamera,

    /// Direction the light travels; reinterpreted when switching modes.
    light_travel: Vec3,

    /// CPU data waiting for the first frame's device.
    pending_mesh: Option<Mesh>,
    pending_texture: Option<image::DynamicImage>,
}

impl Viewer {
    fn new(args: &ShadingArgs) -> Result<Self> {
        Ok(Self {
            drawer: MeshDrawer::with_config(args.shading_config()),
            camera: OrbitCamera::default(),
            light_travel: args.light.unwrap_or(DEFAULT_LIGHT),
            pending_mesh: Some(args.mesh()),
            pending_texture: args.load_texture()?,
        })
    }

    fn world_light(&self) -> bool {
        matches!(self.drawer.light(), Light::World(_))
    }

    /// Applies one frame of input. GPU-free so it can be driven directly.
    fn handle_input(&mut self, input: &InputState, frame: &InputFrame, dt: f32) -> AppControl {
        if frame.key_pressed(Key::Escape) {
            return AppControl::Exit;
        }

        if frame.key_pressed(Key::T) {
            self.drawer.set_show_texture(!self.drawer.show_texture());
            log::info!("texture: {}", self.drawer.show_texture());
        }
        if frame.key_pressed(Key::S) {
            self.drawer.set_swap_yz(!self.drawer.swap_yz());
            log::info!("swap Y/Z: {}", self.drawer.swap_yz());
        }
        if frame.key_pressed(Key::L) {
            let world = !self.world_light();
            let v = self.light_travel;
            match light_for(v, world) {
                Light::World(d) => self.drawer.set_world_light(d.x, d.y, d.z),
                Light::View(_) => self.drawer.set_light_dir(v.x, v.y, v.z),
            }
            log::info!("light: {}", if world { "world" } else { "view" });
        }
        if frame.key_pressed(Key::R) {
            self.camera = OrbitCamera::default();
        }

        let mut shininess = self.drawer.shininess();
        if input.key_down(Key::ArrowUp) {
            shininess += SHININESS_RATE * dt;
        }
        if input.key_down(Key::ArrowDown) {
            shininess -= SHININESS_RATE * dt;
        }
        if shininess != self.drawer.shininess() {
            self.drawer
                .set_shininess(shininess.clamp(MIN_SHININESS, MAX_SHININESS));
        }

        if input.button_down(MouseButton::Left) {
            let (dx, dy) = frame.pointer_delta;
            self.camera.drag(dx, dy);
        }
        if frame.wheel_lines != 0.0 {
            self.camera.zoom(frame.wheel_lines);
        }

        AppControl::Continue
    }
}

impl App for Viewer {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.handle_input(ctx.input, ctx.input_frame, ctx.time.dt) == AppControl::Exit {
            return AppControl::Exit;
        }

        let (w, h) = ctx.window.physical_size();
        let aspect = if h > 0 { w as f32 / h as f32 } else { 1.0 };
        let (mvp, mv, nm) = self.camera.matrices(aspect);

        let Self {
            drawer,
            pending_mesh,
            pending_texture,
            ..
        } = self;

        ctx.render(CLEAR, |rctx, target| {
            if let Some(mesh) = pending_mesh.take() {
                drawer.set_mesh(rctx, &mesh);
            }
            if let Some(texture) = pending_texture.take() {
                if let Err(e) = drawer.set_texture(rctx, &texture) {
                    log::error!("texture upload failed: {e:#}");
                }
            }
            if let Err(e) = drawer.draw(rctx, target, &mvp, &mv, &nm) {
                log::error!("mesh draw failed: {e:#}");
            }
        })
    }
}
