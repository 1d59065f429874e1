//! Built-in meshes with texture coordinates and normals.
//!
//! Both shapes are centered on the origin and fit inside a sphere of radius
//! √3, which is what `transform::framing_projection` frames.

use core::f32::consts::{PI, TAU};

use crate::coords::Vec3;

use super::Mesh;

/// Axis-aligned cube with half-extent `half`, one quad (two triangles) per
/// face, each face mapped to the full `[0, 1]²` texture.
pub fn cube(half: f32) -> Mesh {
    // (normal, u axis, v axis) per face; u × v == normal so windings match.
    let faces = [
        (Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 1.0, 0.0)),
        (Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 1.0, 0.0)),
        (Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0)),
        (Vec3::new(0.0, -1.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0)),
        (Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
        (Vec3::new(0.0, 0.0, -1.0), Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
    ];

    // Corner order within a face: two CCW triangles over (u, v) ∈ {0, 1}².
    const CORNERS: [(f32, f32); 6] = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0), (1.0, 1.0), (0.0, 1.0)];

    let mut positions = Vec::with_capacity(faces.len() * 6 * 3);
    let mut tex_coords = Vec::with_capacity(faces.len() * 6 * 2);
    let mut normals = Vec::with_capacity(faces.len() * 6 * 3);

    for (n, u, v) in faces {
        for (cu, cv) in CORNERS {
            let p = (n + u * (cu * 2.0 - 1.0) + v * (cv * 2.0 - 1.0)) * half;
            positions.extend_from_slice(&p.to_array());
            tex_coords.extend_from_slice(&[cu, 1.0 - cv]);
            normals.extend_from_slice(&n.to_array());
        }
    }

    Mesh::from_parts(positions, tex_coords, Some(normals))
}

/// Latitude/longitude sphere. `segments` around the equator, `rings` from
/// pole to pole; both are raised to a sane minimum.
pub fn uv_sphere(radius: f32, segments: u32, rings: u32) -> Mesh {
    let segments = segments.max(3);
    let rings = rings.max(2);

    let point = |seg: u32, ring: u32| -> (Vec3, [f32; 2]) {
        let u = seg as f32 / segments as f32;
        let v = ring as f32 / rings as f32;
        let theta = u * TAU;
        let phi = v * PI;
        let n = Vec3::new(phi.sin() * theta.cos(), phi.cos(), -phi.sin() * theta.sin());
        (n, [u, v])
    };

    let quads = (segments * rings) as usize;
    let mut positions = Vec::with_capacity(quads * 6 * 3);
    let mut tex_coords = Vec::with_capacity(quads * 6 * 2);
    let mut normals = Vec::with_capacity(quads * 6 * 3);

    for ring in 0..rings {
        for seg in 0..segments {
            let a = point(seg, ring);
            let b = point(seg, ring + 1);
            let c = point(seg + 1, ring + 1);
            let d = point(seg + 1, ring);

            for (n, uv) in [a, b, c, a, c, d] {
                positions.extend_from_slice(&(n * radius).to_array());
                tex_coords.extend_from_slice(&uv);
                normals.extend_from_slice(&n.to_array());
            }
        }
    }

    Mesh::from_parts(positions, tex_coords, Some(normals))
}
