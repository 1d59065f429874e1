use super::Light;

/// Initial state of a `render::MeshDrawer`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShadingConfig {
    /// Specular exponent. Not validated.
    pub shininess: f32,

    /// Initial light.
    pub light: Light,

    /// Swap Y and Z of positions and normals (Z-up assets).
    pub swap_yz: bool,

    /// Sample the bound texture instead of the UV gradient.
    pub show_texture: bool,
}

impl Default for ShadingConfig {
    fn default() -> Self {
        Self {
            shininess: 32.0,
            // Travels away from the camera, slightly downward and to the right.
            light: Light::from_travel_direction(0.3, -0.5, 1.0),
            swap_yz: false,
            show_texture: false,
        }
    }
}
