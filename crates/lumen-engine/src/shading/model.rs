use crate::coords::{ColorRgba, Vec2, Vec3, Vec3Swizzles, Vec4};
use crate::transform::{Mat3, Mat4};

/// Constant ambient term.
pub const AMBIENT: f32 = 0.1;
/// Weight of the Lambert term.
pub const DIFFUSE_WEIGHT: f32 = 0.7;
/// Colour of the specular highlight (orange).
pub const SPECULAR_COLOR: Vec3 = Vec3::new(1.0, 0.5, 0.0);
/// Specular intensity multiplier.
pub const SPECULAR_GAIN: f32 = 3.0;
/// Fixed view direction used for highlights.
pub const VIEW_DIR: Vec3 = Vec3::new(0.0, 0.0, 1.0);

/// Lambert term `max(N · L, 0)` on normalized inputs.
#[inline]
pub fn diffuse(normal: Vec3, light: Vec3) -> f32 {
    normal.normalize_or_zero().dot(light.normalize_or_zero()).max(0.0)
}

/// Phong highlight against [`VIEW_DIR`].
///
/// Zero wherever the Lambert term is zero, so back-lit surfaces never glint.
pub fn specular(normal: Vec3, light: Vec3, shininess: f32) -> f32 {
    let n = normal.normalize_or_zero();
    let l = light.normalize_or_zero();
    if n.dot(l) <= 0.0 {
        return 0.0;
    }
    // reflect(-L, N)
    let r = n * (2.0 * n.dot(l)) - l;
    VIEW_DIR.dot(r).max(0.0).powf(shininess)
}

/// Lit colour of a fragment: ambient + diffuse on `base`, plus an orange
/// highlight. Alpha is `base.a`.
pub fn shade(base: ColorRgba, normal: Vec3, light: Vec3, shininess: f32) -> ColorRgba {
    let d = diffuse(normal, light);
    let s = specular(normal, light, shininess);
    let k = AMBIENT + DIFFUSE_WEIGHT * d;
    let hi = SPECULAR_COLOR * (s * SPECULAR_GAIN);

    ColorRgba::new(base.r * k + hi.x, base.g * k + hi.y, base.b * k + hi.z, base.a)
}

/// Base colour when no texture is shown: `(u, v, 0, 1)`.
#[inline]
pub fn uv_gradient(uv: Vec2) -> ColorRgba {
    ColorRgba::new(uv.x, uv.y, 0.0, 1.0)
}

/// Vertex stage output.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VertexOutput {
    pub clip: Vec4,
    pub uv: Vec2,
    /// View-space normal, normalized. Zero for unlit meshes.
    pub normal: Vec3,
}

/// Per-draw state consumed by both shader stages.
///
/// `render::MeshDrawer::uniforms` builds one of these; the GPU copy is a
/// byte-for-byte packing of the same fields.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawUniforms {
    pub mvp: Mat4,
    pub normal_matrix: Mat3,
    /// View-space direction toward the light (not necessarily unit length).
    pub light_dir: Vec3,
    pub shininess: f32,
    pub swap_yz: bool,
    pub show_texture: bool,
    /// False for meshes uploaded without normals.
    pub lighting: bool,
}

impl DrawUniforms {
    /// CPU mirror of `vs_main`.
    pub fn vertex_stage(&self, position: Vec3, uv: Vec2, normal: Vec3) -> VertexOutput {
        let (p, n) = if self.swap_yz {
            (position.xzy(), normal.xzy())
        } else {
            (position, normal)
        };

        VertexOutput {
            clip: self.mvp * p.extend(1.0),
            uv,
            normal: (self.normal_matrix * n).normalize_or_zero(),
        }
    }

    /// CPU mirror of `fs_main`. `texel` is what the sampler returned at
    /// `input.uv`; it is ignored unless textures are shown, and its alpha is
    /// always replaced by 1.
    pub fn fragment_stage(&self, input: &VertexOutput, texel: ColorRgba) -> ColorRgba {
        let base = if self.show_texture {
            ColorRgba::new(texel.r, texel.g, texel.b, 1.0)
        } else {
            uv_gradient(input.uv)
        };
        if !self.lighting {
            return base;
        }
        shade(base, input.normal, self.light_dir, self.shininess)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{build_model_view, normal_matrix};

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    fn uniforms() -> DrawUniforms {
        DrawUniforms {
            mvp: Mat4::IDENTITY,
            normal_matrix: Mat3::IDENTITY,
            light_dir: Vec3::new(0.0, 0.0, 1.0),
            shininess: 8.0,
            swap_yz: false,
            show_texture: false,
            lighting: true,
        }
    }

    // ── terms ─────────────────────────────────────────────────────────────

    #[test]
    fn facing_light_is_full_diffuse() {
        assert!(close(diffuse(Vec3::new(0.0, 0.0, 2.0), Vec3::new(0.0, 0.0, 5.0)), 1.0));
    }

    #[test]
    fn back_lit_has_no_diffuse_or_specular() {
        let n = Vec3::new(0.0, 0.0, 1.0);
        for l in [Vec3::new(0.0, 0.0, -1.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.3, 0.2, -0.9)] {
            assert_eq!(diffuse(n, l), 0.0);
            assert_eq!(specular(n, l, 4.0), 0.0);
        }
    }

    #[test]
    fn head_on_light_reflects_into_view() {
        // N = L = V: R = reflect(-L, N) = V.
        let n = Vec3::new(0.0, 0.0, 1.0);
        assert!(close(specular(n, n, 50.0), 1.0));
    }

    #[test]
    fn higher_shininess_tightens_highlight() {
        let n = Vec3::new(0.0, 0.0, 1.0);
        let l = Vec3::new(0.3, 0.0, 1.0);
        assert!(specular(n, l, 64.0) < specular(n, l, 4.0));
    }

    #[test]
    fn shade_combines_terms() {
        let base = ColorRgba::new(0.5, 0.5, 0.5, 0.25);
        let n = Vec3::new(0.0, 0.0, 1.0);

        // Full diffuse + full specular.
        let c = shade(base, n, n, 1.0);
        assert!(close(c.r, 0.5 * 0.8 + 3.0));
        assert!(close(c.g, 0.5 * 0.8 + 1.5));
        assert!(close(c.b, 0.5 * 0.8));
        assert_eq!(c.a, 0.25);

        // Back-lit: ambient only.
        let c = shade(base, n, -n, 1.0);
        assert!(close(c.r, 0.05) && close(c.g, 0.05) && close(c.b, 0.05));
    }

    // ── stages ────────────────────────────────────────────────────────────

    #[test]
    fn gradient_is_uv() {
        let u = uniforms();
        let out = u.vertex_stage(Vec3::ZERO, Vec2::new(0.25, 0.75), Vec3::new(0.0, 0.0, -1.0));
        // Back-lit: ambient of (u, v, 0).
        let c = u.fragment_stage(&out, ColorRgba::white());
        assert!(close(c.r, 0.025) && close(c.g, 0.075) && close(c.b, 0.0));
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn texture_replaces_gradient() {
        let mut u = uniforms();
        u.show_texture = true;
        u.lighting = false;
        let out = u.vertex_stage(Vec3::ZERO, Vec2::new(0.25, 0.75), Vec3::ZERO);
        let texel = ColorRgba::new(0.1, 0.2, 0.3, 1.0);
        assert_eq!(u.fragment_stage(&out, texel), texel);
    }

    #[test]
    fn texture_alpha_is_dropped() {
        let mut u = uniforms();
        u.show_texture = true;
        let out = u.vertex_stage(Vec3::ZERO, Vec2::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let unlit = DrawUniforms { lighting: false, ..u };
        let c = unlit.fragment_stage(&out, ColorRgba::new(0.5, 0.5, 0.5, 0.2));
        assert_eq!(c, ColorRgba::new(0.5, 0.5, 0.5, 1.0));

        let lit = u.fragment_stage(&out, ColorRgba::new(0.5, 0.5, 0.5, 0.0));
        assert_eq!(lit.a, 1.0);
    }

    #[test]
    fn unlit_outputs_base() {
        let mut u = uniforms();
        u.lighting = false;
        let out = u.vertex_stage(Vec3::ZERO, Vec2::new(0.5, 1.0), Vec3::ZERO);
        assert_eq!(u.fragment_stage(&out, ColorRgba::black()), ColorRgba::new(0.5, 1.0, 0.0, 1.0));
    }

    #[test]
    fn swap_applies_to_positions_and_normals() {
        let mut u = uniforms();
        u.swap_yz = true;
        let out = u.vertex_stage(Vec3::new(1.0, 2.0, 3.0), Vec2::ZERO, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(out.clip, Vec4::new(1.0, 3.0, 2.0, 1.0));
        assert_eq!(out.normal, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn swapping_data_cancels_swap_flag() {
        let mv = build_model_view(Vec3::new(0.0, 0.0, 3.0), 0.4, -1.1);
        let mut u = uniforms();
        u.mvp = mv;
        u.normal_matrix = normal_matrix(&mv);

        let p = Vec3::new(0.2, -0.7, 0.5);
        let n = Vec3::new(0.0, 0.6, 0.8);
        let plain = u.vertex_stage(p, Vec2::ZERO, n);

        u.swap_yz = true;
        let swapped = u.vertex_stage(p.xzy(), Vec2::ZERO, n.xzy());

        assert_eq!(plain, swapped);
    }

    #[test]
    fn normals_are_renormalized() {
        let mut u = uniforms();
        u.normal_matrix = Mat3::from_cols_array(&[2.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 2.0]);
        let out = u.vertex_stage(Vec3::ZERO, Vec2::ZERO, Vec3::new(0.0, 3.0, 0.0));
        assert!(close(out.normal.length(), 1.0));
    }
}
