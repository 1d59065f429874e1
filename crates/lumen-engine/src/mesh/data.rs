use anyhow::Result;

use crate::coords::{Vec2, Vec3};

/// Vertex attribute arrays for a triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    positions: Vec<f32>,
    tex_coords: Vec<f32>,
    normals: Option<Vec<f32>>,
}

impl Mesh {
    /// Validates and wraps attribute arrays.
    ///
    /// Positions must hold a whole number of `xyz` triples; texture
    /// coordinates and (when present) normals must describe the same number of
    /// vertices. A vertex count that is not a multiple of three is accepted;
    /// the trailing vertices are simply not part of any triangle.
    pub fn new(positions: Vec<f32>, tex_coords: Vec<f32>, normals: Option<Vec<f32>>) -> Result<Self> {
        anyhow::ensure!(
            positions.len() % 3 == 0,
            "position array length {} is not a multiple of 3",
            positions.len()
        );
        let vertices = positions.len() / 3;

        anyhow::ensure!(
            tex_coords.len() == vertices * 2,
            "expected {} texture coordinates for {vertices} vertices, got {}",
            vertices * 2,
            tex_coords.len()
        );

        if let Some(n) = &normals {
            anyhow::ensure!(
                n.len() == vertices * 3,
                "expected {} normal components for {vertices} vertices, got {}",
                vertices * 3,
                n.len()
            );
        }

        if vertices % 3 != 0 {
            log::warn!("mesh has {vertices} vertices; the last {} form no triangle", vertices % 3);
        }

        Ok(Self { positions, tex_coords, normals })
    }

    /// Skips validation for generators whose arrays are consistent by
    /// construction.
    pub(crate) fn from_parts(positions: Vec<f32>, tex_coords: Vec<f32>, normals: Option<Vec<f32>>) -> Self {
        debug_assert_eq!(positions.len() / 3 * 2, tex_coords.len());
        Self { positions, tex_coords, normals }
    }

    #[inline]
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    #[inline]
    pub fn tex_coords(&self) -> &[f32] {
        &self.tex_coords
    }

    #[inline]
    pub fn normals(&self) -> Option<&[f32]> {
        self.normals.as_deref()
    }

    #[inline]
    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Position of `vertex`, or `None` past the end.
    pub fn position(&self, vertex: usize) -> Option<Vec3> {
        let p = attribute(&self.positions, vertex, 3)?;
        Some(Vec3::from_slice(p))
    }

    /// Texture coordinate of `vertex`, or `None` past the end.
    pub fn tex_coord(&self, vertex: usize) -> Option<Vec2> {
        let t = attribute(&self.tex_coords, vertex, 2)?;
        Some(Vec2::from_slice(t))
    }

    /// Normal of `vertex`; `None` past the end or for a mesh without normals.
    pub fn normal(&self, vertex: usize) -> Option<Vec3> {
        let n = attribute(self.normals.as_deref()?, vertex, 3)?;
        Some(Vec3::from_slice(n))
    }
}

/// Components `[vertex * width, vertex * width + width)` of a flat array.
fn attribute(data: &[f32], vertex: usize, width: usize) -> Option<&[f32]> {
    let start = vertex.checked_mul(width)?;
    data.get(start..start.checked_add(width)?)
}
