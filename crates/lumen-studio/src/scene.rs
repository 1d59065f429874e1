//! Mesh, light and camera setup shared by `snapshot` and `view`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use lumen_engine::coords::{ColorRgba, Vec3};
use lumen_engine::mesh::{primitives, Mesh};
use lumen_engine::shading::{Light, ShadingConfig};
use lumen_engine::transform::{
    build_model_view, build_model_view_projection, framing_projection, normal_matrix, Mat3, Mat4,
};

pub const CLEAR: ColorRgba = ColorRgba::new(0.06, 0.06, 0.08, 1.0);

/// Direction the default light travels: away from the camera, down and right.
pub const DEFAULT_LIGHT: Vec3 = Vec3::new(0.3, -0.5, 1.0);

const ROTATE_PER_PIXEL: f32 = 0.01;
const DISTANCE_PER_LINE: f32 = 0.25;
const MIN_DISTANCE: f32 = 1.8;
const MAX_DISTANCE: f32 = 20.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum MeshKind {
    Cube,
    Sphere,
}

impl MeshKind {
    pub fn build(self) -> Mesh {
        match self {
            MeshKind::Cube => primitives::cube(0.5),
            MeshKind::Sphere => primitives::uv_sphere(0.8, 48, 24),
        }
    }
}

/// Options common to every mesh-drawing command.
#[derive(Args, Debug, Clone)]
pub struct ShadingArgs {
    /// Built-in mesh to draw.
    #[arg(long, value_enum, default_value_t = MeshKind::Cube)]
    pub mesh: MeshKind,

    /// Texture image; enables texturing when given.
    #[arg(long, value_name = "FILE")]
    pub texture: Option<PathBuf>,

    /// Swap Y and Z of positions and normals (Z-up assets).
    #[arg(long)]
    pub swap_yz: bool,

    /// Specular exponent.
    #[arg(long, default_value_t = 32.0)]
    pub shininess: f32,

    /// Direction the light travels, as `x,y,z`.
    #[arg(long, value_name = "X,Y,Z", value_parser = parse_vec3, allow_hyphen_values = true)]
    pub light: Option<Vec3>,

    /// Fix the light in world space so it stays put while the mesh rotates.
    #[arg(long)]
    pub world_light: bool,

    /// Drop the mesh normals and draw unlit.
    #[arg(long)]
    pub unlit: bool,
}

impl ShadingArgs {
    pub fn shading_config(&self) -> ShadingConfig {
        ShadingConfig {
            shininess: self.shininess,
            light: light_for(self.light.unwrap_or(DEFAULT_LIGHT), self.world_light),
            swap_yz: self.swap_yz,
            show_texture: self.texture.is_some(),
        }
    }

    pub fn mesh(&self) -> Mesh {
        let mesh = self.mesh.build();
        if !self.unlit {
            return mesh;
        }
        // Primitives are always well-formed; rebuilding without normals cannot fail.
        Mesh::new(mesh.positions().to_vec(), mesh.tex_coords().to_vec(), None).unwrap_or(mesh)
    }

    pub fn load_texture(&self) -> Result<Option<image::DynamicImage>> {
        let Some(path) = self.texture.as_ref() else { return Ok(None) };
        let img = image::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        log::info!("texture {}: {}x{}", path.display(), img.width(), img.height());
        Ok(Some(img))
    }
}

/// Light for a travel direction. The world variant points back along it, so
/// both modes light the unrotated mesh the same way.
pub fn light_for(travel: Vec3, world: bool) -> Light {
    if world {
        Light::world(-travel.x, -travel.y, -travel.z)
    } else {
        Light::from_travel_direction(travel.x, travel.y, travel.z)
    }
}

/// Parses `x,y,z` (whitespace around components allowed).
pub fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected three comma-separated numbers, got {s:?}"));
    };
    let num = |v: &str| v.parse::<f32>().map_err(|e| format!("{v:?}: {e}"));
    Ok(Vec3::new(num(*x)?, num(*y)?, num(*z)?))
}

/// Turntable camera: the mesh rotates about X then Y and sits `distance`
/// units down +Z.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrbitCamera {
    pub rotation_x: f32,
    pub rotation_y: f32,
    pub distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            rotation_x: 0.4,
            rotation_y: -0.6,
            distance: 3.0,
        }
    }
}

impl OrbitCamera {
    /// Horizontal drag spins about Y, vertical drag about X.
    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.rotation_y += dx * ROTATE_PER_PIXEL;
        self.rotation_x += dy * ROTATE_PER_PIXEL;
    }

    /// Positive lines (wheel away) move closer.
    pub fn zoom(&mut self, lines: f32) {
        self.distance = (self.distance - lines * DISTANCE_PER_LINE).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// `(mvp, model_view, normal_matrix)` for a target of the given aspect.
    pub fn matrices(&self, aspect: f32) -> (Mat4, Mat4, Mat3) {
        let translation = Vec3::new(0.0, 0.0, self.distance);
        let mv = build_model_view(translation, self.rotation_x, self.rotation_y);
        let mvp = build_model_view_projection(
            framing_projection(aspect, self.distance),
            translation,
            self.rotation_x,
            self.rotation_y,
        );
        (mvp, mv, normal_matrix(&mv))
    }
}
