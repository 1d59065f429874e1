use crate::coords::Vec3;
use crate::transform::Mat4;

/// Light direction used by the shading model.
///
/// Both variants store the direction pointing *from* the surface *toward*
/// the light.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Light {
    /// Already in view space; used as-is every draw.
    View(Vec3),

    /// In world space; rotated into view space by the model view's 3×3 block
    /// and normalized on every draw, so it stays put while the model moves.
    World(Vec3),
}

impl Light {
    /// View-space light from the direction the light *travels*.
    ///
    /// The stored vector is the negation: `(x, y, z)` travelling means the
    /// light sits toward `(-x, -y, -z)`.
    #[inline]
    pub fn from_travel_direction(x: f32, y: f32, z: f32) -> Self {
        Light::View(Vec3::new(-x, -y, -z))
    }

    /// World-space light, stored as given.
    #[inline]
    pub fn world(x: f32, y: f32, z: f32) -> Self {
        Light::World(Vec3::new(x, y, z))
    }

    /// Direction toward the light in view space for this draw.
    pub fn view_direction(&self, model_view: &Mat4) -> Vec3 {
        match *self {
            Light::View(dir) => dir,
            Light::World(dir) => {
                let view = model_view.transform_vector3(dir).normalize_or_zero();
                log::trace!("world light {dir:?} -> view {view:?}");
                view
            }
        }
    }
}
