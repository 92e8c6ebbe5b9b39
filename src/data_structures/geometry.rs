//! Parametric primitives: sphere, plane and torus.
//!
//! Vertex order, UV layout and triangle winding follow the common web-3D
//! conventions (counter-clockwise front faces, v pointing up in UV space). UVs
//! are flipped to wgpu's top-left texture origin when the vertices are built.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Vector2, Vector3};

use crate::data_structures::model::ModelVertex;

/// What a [`Geometry`] was generated from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GeometryKind {
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Plane {
        width: f32,
        height: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
    },
}

impl GeometryKind {
    pub fn build(self) -> Geometry {
        match self {
            GeometryKind::Sphere {
                radius,
                width_segments,
                height_segments,
            } => Geometry::sphere(radius, width_segments, height_segments),
            GeometryKind::Plane {
                width,
                height,
                width_segments,
                height_segments,
            } => Geometry::plane(width, height, width_segments, height_segments),
            GeometryKind::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
            } => Geometry::torus(radius, tube, radial_segments, tubular_segments),
        }
    }
}

/// CPU-side triangle list ready to be uploaded as a [`Mesh`](super::model::Mesh).
#[derive(Clone, Debug)]
pub struct Geometry {
    pub kind: GeometryKind,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

fn vertex(position: Vector3<f32>, normal: Vector3<f32>, u: f32, v: f32) -> ModelVertex {
    ModelVertex {
        position: position.into(),
        tex_coords: [u, 1.0 - v],
        normal: normal.into(),
        // We'll calculate these later
        tangent: [0.0; 3],
        bitangent: [0.0; 3],
    }
}

impl Geometry {
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);
        let mut vertices = Vec::new();
        let mut grid = Vec::new();

        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            // Pole vertices sit half a segment off so the pole triangles get a
            // centred texture coordinate.
            let u_offset = if iy == 0 {
                0.5 / width_segments as f32
            } else if iy == height_segments {
                -0.5 / width_segments as f32
            } else {
                0.0
            };
            let mut row = Vec::new();
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let (phi, theta) = (u * 2.0 * PI, v * PI);
                let position = Vector3::new(
                    -radius * phi.cos() * theta.sin(),
                    radius * theta.cos(),
                    radius * phi.sin() * theta.sin(),
                );
                let normal = if position.magnitude2() > 0.0 {
                    position.normalize()
                } else {
                    Vector3::unit_y()
                };
                row.push(vertices.len() as u32);
                vertices.push(vertex(position, normal, u + u_offset, 1.0 - v));
            }
            grid.push(row);
        }

        let mut indices = Vec::new();
        for iy in 0..height_segments as usize {
            for ix in 0..width_segments as usize {
                let a = grid[iy][ix + 1];
                let b = grid[iy][ix];
                let c = grid[iy + 1][ix];
                let d = grid[iy + 1][ix + 1];
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments as usize - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self::with_tangents(
            GeometryKind::Sphere {
                radius,
                width_segments,
                height_segments,
            },
            vertices,
            indices,
        )
    }

    /// A plane in the xy-plane facing +z, centred on the origin.
    pub fn plane(width: f32, height: f32, width_segments: u32, height_segments: u32) -> Self {
        let grid_x = width_segments.max(1);
        let grid_y = height_segments.max(1);
        let segment_width = width / grid_x as f32;
        let segment_height = height / grid_y as f32;
        let normal = Vector3::unit_z();

        let mut vertices = Vec::with_capacity(((grid_x + 1) * (grid_y + 1)) as usize);
        for iy in 0..=grid_y {
            let y = iy as f32 * segment_height - height / 2.0;
            for ix in 0..=grid_x {
                let x = ix as f32 * segment_width - width / 2.0;
                vertices.push(vertex(
                    Vector3::new(x, -y, 0.0),
                    normal,
                    ix as f32 / grid_x as f32,
                    1.0 - iy as f32 / grid_y as f32,
                ));
            }
        }

        let row = grid_x + 1;
        let mut indices = Vec::with_capacity((grid_x * grid_y * 6) as usize);
        for iy in 0..grid_y {
            for ix in 0..grid_x {
                let a = ix + row * iy;
                let b = ix + row * (iy + 1);
                let c = (ix + 1) + row * (iy + 1);
                let d = (ix + 1) + row * iy;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Self::with_tangents(
            GeometryKind::Plane {
                width,
                height,
                width_segments: grid_x,
                height_segments: grid_y,
            },
            vertices,
            indices,
        )
    }

    /// A torus around the z axis.
    pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Self {
        let radial_segments = radial_segments.max(3);
        let tubular_segments = tubular_segments.max(3);

        let mut vertices = Vec::new();
        for j in 0..=radial_segments {
            for i in 0..=tubular_segments {
                let u = i as f32 / tubular_segments as f32 * 2.0 * PI;
                let v = j as f32 / radial_segments as f32 * 2.0 * PI;
                let position = Vector3::new(
                    (radius + tube * v.cos()) * u.cos(),
                    (radius + tube * v.cos()) * u.sin(),
                    tube * v.sin(),
                );
                let center = Vector3::new(radius * u.cos(), radius * u.sin(), 0.0);
                let normal = (position - center).normalize();
                vertices.push(vertex(
                    position,
                    normal,
                    i as f32 / tubular_segments as f32,
                    j as f32 / radial_segments as f32,
                ));
            }
        }

        let row = tubular_segments + 1;
        let mut indices = Vec::new();
        for j in 1..=radial_segments {
            for i in 1..=tubular_segments {
                let a = row * j + i - 1;
                let b = row * (j - 1) + i - 1;
                let c = row * (j - 1) + i;
                let d = row * j + i;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Self::with_tangents(
            GeometryKind::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
            },
            vertices,
            indices,
        )
    }

    fn with_tangents(kind: GeometryKind, mut vertices: Vec<ModelVertex>, indices: Vec<u32>) -> Self {
        compute_tangents(&mut vertices, &indices);
        Self {
            kind,
            vertices,
            indices,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Generated primitives don't come with tangents and bitangents so they have to be
/// calculated for normal maps to work correctly.
///
/// Triangles with a degenerate UV mapping (the sphere poles) contribute nothing;
/// vertices that only touch such triangles get a tangent frame built from their normal.
pub fn compute_tangents(vertices: &mut [ModelVertex], indices: &[u32]) {
    let mut triangles_included = vec![0u32; vertices.len()];

    for c in indices.chunks_exact(3) {
        let v0 = vertices[c[0] as usize];
        let v1 = vertices[c[1] as usize];
        let v2 = vertices[c[2] as usize];

        let pos0: Vector3<f32> = v0.position.into();
        let pos1: Vector3<f32> = v1.position.into();
        let pos2: Vector3<f32> = v2.position.into();

        let uv0: Vector2<f32> = v0.tex_coords.into();
        let uv1: Vector2<f32> = v1.tex_coords.into();
        let uv2: Vector2<f32> = v2.tex_coords.into();

        // Calculate the edges of the triangle
        let delta_pos1 = pos1 - pos0;
        let delta_pos2 = pos2 - pos0;
        let delta_uv1 = uv1 - uv0;
        let delta_uv2 = uv2 - uv0;

        // Solving the following system of equations gives tangent and bitangent:
        //     delta_pos1 = delta_uv1.x * T + delta_uv1.y * B
        //     delta_pos2 = delta_uv2.x * T + delta_uv2.y * B
        let det = delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x;
        if det.abs() <= f32::EPSILON {
            continue;
        }
        let r = 1.0 / det;
        let tangent = (delta_pos1 * delta_uv2.y - delta_pos2 * delta_uv1.y) * r;
        // We flip the bitangent to enable right-handed normal
        // maps with wgpu texture coordinate system
        let bitangent = (delta_pos2 * delta_uv1.x - delta_pos1 * delta_uv2.x) * -r;

        for &idx in c {
            let v = &mut vertices[idx as usize];
            v.tangent = (tangent + Vector3::from(v.tangent)).into();
            v.bitangent = (bitangent + Vector3::from(v.bitangent)).into();
            triangles_included[idx as usize] += 1;
        }
    }

    // Average the tangents/bitangents
    for (v, n) in vertices.iter_mut().zip(triangles_included) {
        if n == 0 {
            let normal = Vector3::from(v.normal);
            let helper = if normal.x.abs() < 0.9 {
                Vector3::unit_x()
            } else {
                Vector3::unit_y()
            };
            let tangent = helper.cross(normal).normalize();
            v.tangent = tangent.into();
            v.bitangent = normal.cross(tangent).into();
            continue;
        }
        let denom = 1.0 / n as f32;
        v.tangent = (Vector3::from(v.tangent) * denom).into();
        v.bitangent = (Vector3::from(v.bitangent) * denom).into();
    }
}
