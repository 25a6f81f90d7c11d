//! Immutable convex polyhedra.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::math::EPSILON;
use crate::transform::Transform3d;

/// One face of a convex polyhedron: vertex indices in counter-clockwise order as seen from
/// outside, plus the precomputed outward normal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    /// Indices into the owning [`Convex`]'s `vertices` list.
    pub indices: Vec<usize>,
    /// Outward-facing unit normal.
    pub normal: Vector3<f64>,
}

/// An immutable convex polyhedron: faces, a flattened vertex list, deduplicated edge
/// directions, deduplicated face normals, a center point, and a volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Convex {
    /// Faces, each with vertices in CCW winding as seen from outside.
    pub faces: Vec<Face>,
    /// All vertices referenced by `faces`, in local coordinates.
    pub vertices: Vec<Vector3<f64>>,
    /// Deduplicated unique edge directions (no two with `cross` length < epsilon).
    pub unique_edges: Vec<Vector3<f64>>,
    /// Deduplicated unique face normals.
    pub unique_normals: Vec<Vector3<f64>>,
    /// Local center (origin) of the polyhedron.
    pub center: Vector3<f64>,
    /// Volume of the polyhedron.
    pub volume: f64,
}

/// Inserts `direction` into `into` unless some existing entry is parallel or anti-parallel to
/// it within `epsilon` (on the cross-product length).
fn push_unique_direction(into: &mut Vec<Vector3<f64>>, direction: Vector3<f64>, epsilon: f64) {
    let is_duplicate = into
        .iter()
        .any(|existing| existing.cross(&direction).norm() < epsilon);
    if !is_duplicate {
        into.push(direction);
    }
}

impl Convex {
    /// Builds a convex polyhedron from a list of faces (vertex indices, CCW from outside) and
    /// a shared vertex array. Face normals, unique edges, and unique normals are derived;
    /// `center` and `volume` are computed from the geometry.
    pub fn init(face_indices: Vec<Vec<usize>>, vertices: Vec<Vector3<f64>>) -> Self {
        let mut faces = Vec::with_capacity(face_indices.len());
        let mut unique_normals = Vec::new();
        let mut unique_edges = Vec::new();

        for indices in &face_indices {
            let v1 = vertices[indices[0]];
            let v2 = vertices[indices[1]];
            let v3 = vertices[indices[2]];
            let normal = (v1 - v2).cross(&(v3 - v2)).normalize();
            push_unique_direction(&mut unique_normals, normal, EPSILON);

            for i in 0..indices.len() {
                let a = vertices[indices[i]];
                let b = vertices[indices[(i + 1) % indices.len()]];
                let edge = (b - a).normalize();
                push_unique_direction(&mut unique_edges, edge, EPSILON);
            }

            faces.push(Face {
                indices: indices.clone(),
                normal,
            });
        }

        let center = centroid(&vertices);
        let volume = convex_volume(&faces, &vertices, &center);

        Self {
            faces,
            vertices,
            unique_edges,
            unique_normals,
            center,
            volume,
        }
    }

    /// The unit block (axis-aligned rectangular prism) with the given half-extents: 8
    /// vertices, 6 faces, 3 unique (axis-aligned) edges, 3 unique normals.
    pub fn from_block(half_x: f64, half_y: f64, half_z: f64) -> Self {
        let (hx, hy, hz) = (half_x, half_y, half_z);
        let vertices = vec![
            Vector3::new(-hx, -hy, -hz),
            Vector3::new(hx, -hy, -hz),
            Vector3::new(hx, hy, -hz),
            Vector3::new(-hx, hy, -hz),
            Vector3::new(-hx, -hy, hz),
            Vector3::new(hx, -hy, hz),
            Vector3::new(hx, hy, hz),
            Vector3::new(-hx, hy, hz),
        ];
        let face_indices = vec![
            vec![3, 2, 1, 0], // -z
            vec![4, 5, 6, 7], // +z
            vec![0, 1, 5, 4], // -y
            vec![2, 3, 7, 6], // +y
            vec![1, 2, 6, 5], // +x
            vec![3, 0, 4, 7], // -x
        ];
        Self::init(face_indices, vertices)
    }

    /// Returns a new `Convex` with all geometry (faces, vertices, edges, normals, center)
    /// transformed by `t`; volume is unchanged since rigid transforms preserve it.
    pub fn place_in<From, To>(&self, t: &Transform3d<From, To>) -> Self {
        let vertices: Vec<_> = self.vertices.iter().map(|v| t.point_place_in(v)).collect();
        let faces: Vec<_> = self
            .faces
            .iter()
            .map(|f| Face {
                indices: f.indices.clone(),
                normal: t.direction_place_in(&f.normal),
            })
            .collect();
        let unique_edges = self
            .unique_edges
            .iter()
            .map(|e| t.direction_place_in(e))
            .collect();
        let unique_normals = self
            .unique_normals
            .iter()
            .map(|n| t.direction_place_in(n))
            .collect();
        let center = t.point_place_in(&self.center);

        Self {
            faces,
            vertices,
            unique_edges,
            unique_normals,
            center,
            volume: self.volume,
        }
    }

    /// `max(current_radius, max(‖v‖ for v in vertices))`.
    pub fn expand_bounding_sphere_radius(&self, current_radius: f64) -> f64 {
        self.vertices
            .iter()
            .map(|v| v.norm())
            .fold(current_radius, f64::max)
    }

    /// Ray-vs-convex intersection by face projection: for each front-facing face, compute the
    /// plane intersection parameter and accept it if it lies inside every edge of that face.
    /// Returns the closest (distance, point, normal) hit.
    pub fn raycast(
        &self,
        origin: &Vector3<f64>,
        direction: &Vector3<f64>,
    ) -> Option<(f64, Vector3<f64>, Vector3<f64>)> {
        let mut best: Option<(f64, Vector3<f64>, Vector3<f64>)> = None;

        for face in &self.faces {
            let denom = direction.dot(&face.normal);
            if denom >= 0.0 {
                continue; // not front-facing
            }
            let p = self.vertices[face.indices[0]];
            let t = (p - origin).dot(&face.normal) / denom;
            if t < 0.0 {
                continue;
            }
            let hit = origin + direction * t;

            let inside = face.indices.iter().enumerate().all(|(i, &vi)| {
                let vj = self.vertices[face.indices[(i + 1) % face.indices.len()]];
                let vi_pos = self.vertices[vi];
                let edge = vj - vi_pos;
                edge.cross(&face.normal).dot(&(hit - vi_pos)) > -EPSILON
            });

            if inside && best.as_ref().map_or(true, |(bt, ..)| t < *bt) {
                best = Some((t, hit, face.normal));
            }
        }

        best
    }
}

fn centroid(vertices: &[Vector3<f64>]) -> Vector3<f64> {
    if vertices.is_empty() {
        return Vector3::zeros();
    }
    let sum: Vector3<f64> = vertices.iter().sum();
    sum / vertices.len() as f64
}

/// Volume of a convex polyhedron by summing tetrahedra from `center` to each face triangle.
fn convex_volume(faces: &[Face], vertices: &[Vector3<f64>], center: &Vector3<f64>) -> f64 {
    let mut volume = 0.0;
    for face in faces {
        for i in 1..face.indices.len() - 1 {
            let v0 = vertices[face.indices[0]] - center;
            let v1 = vertices[face.indices[i]] - center;
            let v2 = vertices[face.indices[i + 1]] - center;
            volume += v0.dot(&v1.cross(&v2)).abs() / 6.0;
        }
    }
    volume
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn unit_block_has_expected_topology() {
        let block = Convex::from_block(1.0, 1.0, 1.0);
        assert_eq!(block.vertices.len(), 8);
        assert_eq!(block.faces.len(), 6);
        assert_eq!(block.unique_edges.len(), 3);
        assert_eq!(block.unique_normals.len(), 3);
        assert_relative_eq!(block.volume, 8.0, epsilon = 1e-9);
    }

    #[test]
    fn unique_edges_never_near_parallel() {
        let block = Convex::from_block(1.0, 2.0, 3.0);
        for i in 0..block.unique_edges.len() {
            for j in (i + 1)..block.unique_edges.len() {
                let cross_len = block.unique_edges[i].cross(&block.unique_edges[j]).norm();
                assert!(cross_len >= EPSILON);
            }
        }
    }

    #[test]
    fn expand_bounding_sphere_radius_covers_all_vertices() {
        let block = Convex::from_block(1.0, 1.0, 1.0);
        let radius = block.expand_bounding_sphere_radius(0.0);
        for v in &block.vertices {
            assert!(v.norm() <= radius + 1e-9);
        }
    }

    #[test]
    fn raycast_hits_top_face_of_unit_block() {
        let block = Convex::from_block(1.0, 1.0, 1.0);
        let origin = Vector3::new(0.0, 0.0, 5.0);
        let direction = Vector3::new(0.0, 0.0, -1.0);
        let (t, point, normal) = block.raycast(&origin, &direction).expect("should hit");
        assert_relative_eq!(t, 4.0, epsilon = 1e-9);
        assert_relative_eq!(point, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-9);
        assert_relative_eq!(normal, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-9);
    }

    #[test]
    fn raycast_misses_when_offset_past_the_block() {
        let block = Convex::from_block(1.0, 1.0, 1.0);
        let origin = Vector3::new(5.0, 0.0, 5.0);
        let direction = Vector3::new(0.0, 0.0, -1.0);
        assert!(block.raycast(&origin, &direction).is_none());
    }
}
