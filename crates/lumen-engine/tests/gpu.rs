//! End-to-end rendering through a real adapter.
//!
//! Needs a GPU (or a software adapter); run with `cargo test -- --ignored`.

use lumen_engine::coords::{ColorRgba, Vec3};
use lumen_engine::device::{GpuInit, HeadlessGpu};
use lumen_engine::mesh::{primitives, Mesh};
use lumen_engine::render::MeshDrawer;
use lumen_engine::transform::{build_model_view, framing_projection, normal_matrix};

const SIZE: u32 = 64;

fn gpu() -> HeadlessGpu {
    lumen_engine::logging::init_logging(Default::default());
    pollster::block_on(HeadlessGpu::new(SIZE, SIZE, GpuInit::default()))
        .expect("headless GPU")
}

fn draw(gpu: &HeadlessGpu, drawer: &mut MeshDrawer, distance: f32) -> image::RgbaImage {
    let t = Vec3::new(0.0, 0.0, distance);
    let mv = build_model_view(t, 0.0, 0.0);
    let mvp = framing_projection(1.0, distance) * mv;
    let nm = normal_matrix(&mv);

    gpu.render(ColorRgba::black(), |ctx, target| drawer.draw(ctx, target, &mvp, &mv, &nm))
        .expect("render");
    gpu.read_rgba().expect("readback")
}

#[test]
#[ignore = "needs a GPU adapter"]
fn clear_only_without_mesh() {
    let gpu = gpu();
    let mut drawer = MeshDrawer::new();
    let img = draw(&gpu, &mut drawer, 3.0);
    assert_eq!(img.dimensions(), (SIZE, SIZE));
    assert!(img.pixels().all(|p| p.0 == [0, 0, 0, 255]));
}

#[test]
#[ignore = "needs a GPU adapter"]
fn cube_covers_the_centre_not_the_corners() {
    let gpu = gpu();
    let mut drawer = MeshDrawer::new();
    drawer.set_mesh(&gpu.render_ctx(), &primitives::cube(0.5));

    let img = draw(&gpu, &mut drawer, 3.0);
    assert_ne!(img.get_pixel(SIZE / 2, SIZE / 2).0, [0, 0, 0, 255]);
    assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
}

/// One camera-facing quad at z = 0 (two triangles) with UV (0, 0) at the
/// top-left.
fn quad(normals: Option<Vec<f32>>) -> Mesh {
    let positions = vec![
        -1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 1.0, 1.0, 0.0, //
        -1.0, -1.0, 0.0, 1.0, 1.0, 0.0, -1.0, 1.0, 0.0,
    ];
    let uvs = vec![0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0];
    Mesh::new(positions, uvs, normals).expect("quad")
}

fn assert_near(px: [u8; 4], want: [u8; 4], tolerance: u8) {
    for (got, want) in px.iter().zip(want) {
        assert!(got.abs_diff(want) <= tolerance, "{px:?} vs {want:?}");
    }
}

#[test]
#[ignore = "needs a GPU adapter"]
fn unlit_texture_is_shown_verbatim() {
    let gpu = gpu();
    let ctx = gpu.render_ctx();

    let mut drawer = MeshDrawer::new();
    drawer.set_mesh(&ctx, &quad(None));
    drawer.set_show_texture(true);
    let texture = image::RgbaImage::from_pixel(4, 4, image::Rgba([200, 40, 90, 255]));
    drawer.set_texture_rgba(&ctx, &texture).expect("texture");

    let img = draw(&gpu, &mut drawer, 3.0);
    assert_near(img.get_pixel(SIZE / 2, SIZE / 2).0, [200, 40, 90, 255], 2);
}

#[test]
#[ignore = "needs a GPU adapter"]
fn uv_gradient_is_written_without_encoding() {
    let gpu = gpu();
    let mut drawer = MeshDrawer::new();
    drawer.set_mesh(&gpu.render_ctx(), &quad(None));

    // (u, v) = (0.5, 0.5) at the centre: 0.5 stores as byte 128.
    let img = draw(&gpu, &mut drawer, 3.0);
    assert_near(img.get_pixel(SIZE / 2, SIZE / 2).0, [128, 128, 0, 255], 3);
}

#[test]
#[ignore = "needs a GPU adapter"]
fn ambient_only_scales_stored_texel_and_drops_alpha() {
    let gpu = gpu();
    let ctx = gpu.render_ctx();

    let mut drawer = MeshDrawer::new();
    drawer.set_mesh(&ctx, &quad(Some(vec![0.0, 0.0, 1.0].repeat(6))));
    drawer.set_show_texture(true);
    // Travelling along the normal: back-lit, so only the ambient term.
    drawer.set_light_dir(0.0, 0.0, 1.0);
    let texture = image::RgbaImage::from_pixel(4, 4, image::Rgba([128, 128, 128, 77]));
    drawer.set_texture_rgba(&ctx, &texture).expect("texture");

    // 0.1 * 128 = 12.8 -> 13; alpha is always 1.
    let img = draw(&gpu, &mut drawer, 3.0);
    assert_near(img.get_pixel(SIZE / 2, SIZE / 2).0, [13, 13, 13, 255], 1);
}
