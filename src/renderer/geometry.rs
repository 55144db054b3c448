use std::f32::consts::PI;
use std::path::Path;

use glam::{Vec2, Vec3};

use super::vertex::Vertex;
use crate::error::{RenderError, Result};

/// Raw, unindexed-by-type geometry: flat attribute streams plus triangle indices.
#[derive(Clone, Debug, Default)]
pub struct Geometry {
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

/// Interleaved vertices ready for upload.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Geometry {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Derives the tangent basis and interleaves every attribute.
    ///
    /// Every attribute stream must hold one entry per position and every index
    /// must reference an existing vertex.
    pub fn build(&self) -> MeshData {
        debug_assert!(
            self.uvs.len() == self.positions.len() && self.normals.len() == self.positions.len(),
            "attribute streams differ in length: {} positions, {} uvs, {} normals",
            self.positions.len(),
            self.uvs.len(),
            self.normals.len()
        );
        debug_assert!(
            self.indices.iter().all(|&i| (i as usize) < self.positions.len()),
            "index out of range for {} vertices",
            self.positions.len()
        );
        let (tangents, bitangents) =
            compute_tangent_basis(&self.positions, &self.uvs, &self.normals, &self.indices);

        let vertices = (0..self.positions.len())
            .map(|i| Vertex {
                pos: self.positions[i].to_array(),
                uv: self.uvs[i].to_array(),
                normal: self.normals[i].to_array(),
                tangent: tangents[i].to_array(),
                bitangent: bitangents[i].to_array(),
            })
            .collect();

        MeshData {
            vertices,
            indices: self.indices.clone(),
        }
    }
}

/// Per-triangle tangent frames.
///
/// Each vertex receives the tangent of the last triangle that references it,
/// orthonormalised against its own normal and flipped to keep
/// `dot(cross(N, T), B) >= 0`. The bitangent is the raw per-triangle value and
/// is overwritten, not accumulated, by later triangles sharing the vertex.
/// Triangles with a degenerate UV mapping produce non-finite tangents.
pub fn compute_tangent_basis(
    positions: &[Vec3],
    uvs: &[Vec2],
    normals: &[Vec3],
    indices: &[u32],
) -> (Vec<Vec3>, Vec<Vec3>) {
    let mut tangents = vec![Vec3::ZERO; positions.len()];
    let mut bitangents = vec![Vec3::ZERO; positions.len()];

    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        ];

        let e1 = positions[i1] - positions[i0];
        let e2 = positions[i2] - positions[i0];
        let d1 = uvs[i1] - uvs[i0];
        let d2 = uvs[i2] - uvs[i0];

        let r = 1.0 / (d1.x * d2.y - d1.y * d2.x);
        let tangent = (e1 * d2.y - e2 * d1.y) * r;
        let bitangent = (e2 * d1.x - e1 * d2.x) * r;

        for index in [i0, i1, i2] {
            let normal = normals[index];
            let mut t = (tangent - normal * normal.dot(tangent)).normalize();
            if normal.cross(t).dot(bitangent) < 0.0 {
                t = -t;
            }
            tangents[index] = t;
            bitangents[index] = bitangent;
        }
    }

    (tangents, bitangents)
}

/// Parameters of a (partial) sphere over spherical coordinates.
#[derive(Clone, Copy, Debug)]
pub struct SphereParams {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    pub phi_start: f32,
    pub phi_length: f32,
    pub theta_start: f32,
    pub theta_length: f32,
    /// Counter-clockwise winding seen from outside; `false` faces inward.
    pub ccw: bool,
}

impl SphereParams {
    pub fn full(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        Self {
            radius,
            width_segments,
            height_segments,
            phi_start: 0.0,
            phi_length: PI * 2.0,
            theta_start: 0.0,
            theta_length: PI,
            ccw: true,
        }
    }

    pub fn inward(mut self) -> Self {
        self.ccw = false;
        self
    }
}

pub fn procedural_sphere(params: &SphereParams) -> Geometry {
    let width = params.width_segments.max(3);
    let height = params.height_segments.max(2);
    let theta_end = params.theta_start + params.theta_length;

    let mut geometry = Geometry::default();
    let mut grid: Vec<Vec<u32>> = Vec::with_capacity(height as usize + 1);

    for iy in 0..=height {
        let v = iy as f32 / height as f32;
        let theta = params.theta_start + v * params.theta_length;
        let mut row = Vec::with_capacity(width as usize + 1);

        for ix in 0..=width {
            let u = ix as f32 / width as f32;
            let phi = params.phi_start + u * params.phi_length;

            let position = Vec3::new(
                -params.radius * phi.cos() * theta.sin(),
                params.radius * theta.cos(),
                params.radius * phi.sin() * theta.sin(),
            );

            row.push(geometry.positions.len() as u32);
            geometry.positions.push(position);
            geometry.normals.push(position.normalize_or_zero());
            geometry.uvs.push(Vec2::new(u, 1.0 - v));
        }

        grid.push(row);
    }

    for iy in 0..height as usize {
        for ix in 0..width as usize {
            let a = grid[iy][ix + 1];
            let b = grid[iy][ix];
            let c = grid[iy + 1][ix];
            let d = grid[iy + 1][ix + 1];

            if iy != 0 || params.theta_start > 0.0 {
                if params.ccw {
                    geometry.indices.extend_from_slice(&[a, b, d]);
                } else {
                    geometry.indices.extend_from_slice(&[d, b, a]);
                }
            }
            if iy != height as usize - 1 || theta_end < PI {
                if params.ccw {
                    geometry.indices.extend_from_slice(&[b, c, d]);
                } else {
                    geometry.indices.extend_from_slice(&[d, c, b]);
                }
            }
        }
    }

    geometry
}

/// Grid of normalised heights in `[0, 1]`, row-major.
#[derive(Clone, Debug)]
pub struct HeightMap {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl HeightMap {
    pub fn new(width: u32, height: u32, values: Vec<f32>) -> Option<Self> {
        if width < 2 || height < 2 || values.len() != (width * height) as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            values,
        })
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> f32) -> Option<Self> {
        let mut values = Vec::with_capacity((width * height) as usize);
        for row in 0..height {
            for col in 0..width {
                values.push(f(col, row).clamp(0.0, 1.0));
            }
        }
        Self::new(width, height, values)
    }

    /// Decodes an image and uses its luminance as height.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading height map: {:?}", path);
        let image = image::open(path)
            .map_err(|e| RenderError::resource(path, e))?
            .to_luma8();
        let (width, height) = image.dimensions();
        let values = image.pixels().map(|p| p.0[0] as f32 / 255.0).collect();
        Self::new(width, height, values)
            .ok_or_else(|| RenderError::resource(path, "height map must be at least 2x2"))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn value(&self, col: u32, row: u32) -> f32 {
        let col = col.min(self.width - 1);
        let row = row.min(self.height - 1);
        self.values[(row * self.width + col) as usize]
    }
}

/// Terrain on `[-0.5, 0.5]` in X and Z with heights between `min_y` and `max_y`.
pub fn terrain_from_heights(min_y: f32, max_y: f32, heights: &HeightMap) -> Geometry {
    let (w, h) = (heights.width(), heights.height());
    let step_x = 1.0 / (w - 1) as f32;
    let step_z = 1.0 / (h - 1) as f32;
    let position = |col: u32, row: u32| {
        Vec3::new(
            -0.5 + col as f32 * step_x,
            min_y + heights.value(col, row) * (max_y - min_y),
            -0.5 + row as f32 * step_z,
        )
    };

    let mut geometry = Geometry::default();
    for row in 0..h {
        for col in 0..w {
            geometry.positions.push(position(col, row));
            geometry.uvs.push(Vec2::new(
                col as f32 / (w - 1) as f32,
                row as f32 / (h - 1) as f32,
            ));

            let dx = position((col + 1).min(w - 1), row) - position(col.saturating_sub(1), row);
            let dz = position(col, (row + 1).min(h - 1)) - position(col, row.saturating_sub(1));
            geometry.normals.push(dz.cross(dx).normalize_or_zero());
        }
    }

    for row in 0..h - 1 {
        for col in 0..w - 1 {
            let top_left = row * w + col;
            let top_right = top_left + 1;
            let bottom_left = top_left + w;
            let bottom_right = bottom_left + 1;

            geometry
                .indices
                .extend_from_slice(&[top_left, bottom_left, top_right]);
            geometry
                .indices
                .extend_from_slice(&[top_right, bottom_left, bottom_right]);
        }
    }

    geometry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_counts_look_right() {
        let geometry = procedural_sphere(&SphereParams::full(1.0, 4, 4));
        assert_eq!(geometry.vertex_count(), 25);
        assert_eq!(geometry.indices.len(), 2 * 4 * (4 - 1) * 3);
    }

    #[test]
    fn sphere_segments_are_clamped() {
        let geometry = procedural_sphere(&SphereParams::full(1.0, 1, 1));
        assert_eq!(geometry.vertex_count(), 4 * 3);
    }

    #[test]
    fn outward_sphere_faces_outward() {
        let geometry = procedural_sphere(&SphereParams::full(2.0, 8, 6));
        for tri in geometry.indices.chunks_exact(3) {
            let [a, b, c] = [
                geometry.positions[tri[0] as usize],
                geometry.positions[tri[1] as usize],
                geometry.positions[tri[2] as usize],
            ];
            let face_normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(face_normal.dot(centroid) > 0.0);
        }
    }

    #[test]
    fn inward_sphere_reverses_winding() {
        let outward = procedural_sphere(&SphereParams::full(1.0, 6, 4));
        let inward = procedural_sphere(&SphereParams::full(1.0, 6, 4).inward());
        assert_eq!(outward.indices.len(), inward.indices.len());
        assert_eq!(outward.indices[0], inward.indices[2]);
        assert_eq!(outward.indices[2], inward.indices[0]);
    }

    #[test]
    fn bitangent_is_last_writer() {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        ];
        let uvs = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 2.0),
        ];
        let normals = vec![Vec3::Z; 4];
        let indices = vec![0, 1, 2, 1, 3, 2];

        let (_, bitangents) = compute_tangent_basis(&positions, &uvs, &normals, &indices);

        // second triangle: e1 = (0,1,0), e2 = (-1,1,0), d1 = (0,2), d2 = (-1,1)
        // r = 1 / (0*1 - 2*-1) = 0.5, B = r * (0*e2 - (-1)*e1) = (0, 0.5, 0)
        assert!(bitangents[1].abs_diff_eq(Vec3::new(0.0, 0.5, 0.0), 1e-6));
        assert!(bitangents[0].abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn terrain_grid_layout() {
        let heights = HeightMap::from_fn(3, 4, |col, row| (col + row) as f32 / 5.0).unwrap();
        let geometry = terrain_from_heights(-1.0, 1.0, &heights);

        assert_eq!(geometry.vertex_count(), 12);
        assert_eq!(geometry.indices.len(), 2 * 3 * 2 * 3);
        assert!(geometry.positions[0].abs_diff_eq(Vec3::new(-0.5, -1.0, -0.5), 1e-6));
        assert!(geometry.positions[11].abs_diff_eq(Vec3::new(0.5, 1.0, 0.5), 1e-6));
        assert!(geometry.normals.iter().all(|n| n.y > 0.0));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "attribute streams differ in length")]
    fn build_rejects_short_uv_stream() {
        let geometry = Geometry {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Z],
            uvs: vec![Vec2::ZERO, Vec2::X],
            normals: vec![Vec3::Y; 3],
            indices: vec![0, 2, 1],
        };
        geometry.build();
    }

    #[test]
    fn height_map_decodes_luminance() {
        let path = std::env::temp_dir().join(format!("skyshade-heights-{}.png", std::process::id()));
        image::GrayImage::from_fn(3, 2, |x, y| image::Luma([(x * 100 + y * 51) as u8]))
            .save(&path)
            .unwrap();

        let heights = HeightMap::from_path(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!((heights.width(), heights.height()), (3, 2));
        assert_eq!(heights.value(0, 0), 0.0);
        assert!((heights.value(2, 1) - 251.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn height_map_reports_missing_file() {
        let err = HeightMap::from_path("does/not/exist.png").unwrap_err();
        assert!(matches!(err, RenderError::Resource { .. }));
    }

    #[test]
    fn height_map_rejects_mismatched_data() {
        assert!(HeightMap::new(2, 2, vec![0.0; 3]).is_none());
        assert!(HeightMap::new(1, 4, vec![0.0; 4]).is_none());
    }
}
