//! Subdivision
//!
//! Level generation for the multiresolution ladder. The interpolation rule is
//! chosen per call through [`SubdivisionMode`]; there is no shared toggle.

use ahash::AHashMap;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::MeshResult;
use crate::mesh::{Face, Geometry};

/// Interpolation rule for one subdivision step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubdivisionMode {
    /// Limit-surface smoothing
    #[default]
    Smooth,
    /// New points at centroids and midpoints, cage vertices unchanged
    Linear,
}

impl SubdivisionMode {
    /// `Linear` when `linear` is set, `Smooth` otherwise
    pub fn from_linear(linear: bool) -> Self {
        if linear { Self::Linear } else { Self::Smooth }
    }
}

/// Produces the next finer detail level from the current finest one
pub trait Subdivider {
    /// Build a finer copy of `geometry`
    fn add_level(&self, geometry: &Geometry, mode: SubdivisionMode) -> MeshResult<Geometry>;
}

/// Catmull-Clark subdivision over mixed triangle/quad cages
///
/// Every n-gon becomes n quads, so each step multiplies the face count by
/// three or four.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatmullClark;

#[derive(Debug, Clone)]
struct Edge {
    a: u32,
    b: u32,
    faces: SmallVec<[u32; 2]>,
}

impl Edge {
    fn is_boundary(&self) -> bool {
        self.faces.len() < 2
    }
}

/// Edge table of a cage, keyed by sorted vertex pair
struct Topology {
    edges: Vec<Edge>,
    lookup: AHashMap<(u32, u32), u32>,
}

impl Topology {
    fn build(faces: &[Face]) -> Self {
        let mut edges: Vec<Edge> = Vec::new();
        let mut lookup = AHashMap::with_capacity(faces.len() * 2);

        for (face_index, face) in faces.iter().enumerate() {
            let indices = face.indices();
            for i in 0..indices.len() {
                let a = indices[i];
                let b = indices[(i + 1) % indices.len()];
                let key = (a.min(b), a.max(b));
                let edge = *lookup.entry(key).or_insert_with(|| {
                    edges.push(Edge {
                        a: key.0,
                        b: key.1,
                        faces: SmallVec::new(),
                    });
                    (edges.len() - 1) as u32
                });
                edges[edge as usize].faces.push(face_index as u32);
            }
        }

        Self { edges, lookup }
    }

    fn edge(&self, a: u32, b: u32) -> u32 {
        // Every consecutive pair of a face was registered in `build`.
        self.lookup[&(a.min(b), a.max(b))]
    }
}

impl Subdivider for CatmullClark {
    fn add_level(&self, geometry: &Geometry, mode: SubdivisionMode) -> MeshResult<Geometry> {
        let positions = geometry.positions();
        let faces = geometry.faces();
        let topology = Topology::build(faces);

        let vertex_count = positions.len();
        let face_base = vertex_count as u32;
        let edge_base = face_base + faces.len() as u32;

        let face_points: Vec<Vec3> = faces
            .iter()
            .map(|face| {
                let indices = face.indices();
                indices.iter().map(|&i| positions[i as usize]).sum::<Vec3>() / indices.len() as f32
            })
            .collect();

        let edge_points: Vec<Vec3> = topology
            .edges
            .iter()
            .map(|edge| {
                let midpoint = (positions[edge.a as usize] + positions[edge.b as usize]) * 0.5;
                match mode {
                    SubdivisionMode::Smooth if !edge.is_boundary() => {
                        let faces_avg = (face_points[edge.faces[0] as usize]
                            + face_points[edge.faces[1] as usize])
                            * 0.5;
                        (midpoint + faces_avg) * 0.5
                    }
                    _ => midpoint,
                }
            })
            .collect();

        let vertex_points = match mode {
            SubdivisionMode::Linear => positions.to_vec(),
            SubdivisionMode::Smooth => smooth_vertices(positions, faces, &face_points, &topology),
        };

        let mut new_positions = Vec::with_capacity(vertex_count + faces.len() + topology.edges.len());
        new_positions.extend(vertex_points);
        new_positions.extend(face_points);
        new_positions.extend(edge_points);

        let mut new_faces = Vec::with_capacity(faces.iter().map(Face::arity).sum());
        for (face_index, face) in faces.iter().enumerate() {
            let indices = face.indices();
            let n = indices.len();
            let center = face_base + face_index as u32;
            for i in 0..n {
                let prev = indices[(i + n - 1) % n];
                let current = indices[i];
                let next = indices[(i + 1) % n];
                new_faces.push(Face::Quad([
                    current,
                    edge_base + topology.edge(current, next),
                    center,
                    edge_base + topology.edge(prev, current),
                ]));
            }
        }

        Geometry::new(new_positions, new_faces)
    }
}

fn smooth_vertices(
    positions: &[Vec3],
    faces: &[Face],
    face_points: &[Vec3],
    topology: &Topology,
) -> Vec<Vec3> {
    let count = positions.len();
    let mut face_sum = vec![Vec3::ZERO; count];
    let mut face_count = vec![0u32; count];
    let mut mid_sum = vec![Vec3::ZERO; count];
    let mut valence = vec![0u32; count];
    let mut boundary_sum = vec![Vec3::ZERO; count];
    let mut boundary_count = vec![0u32; count];

    for (face, point) in faces.iter().zip(face_points) {
        for &i in face.indices() {
            face_sum[i as usize] += *point;
            face_count[i as usize] += 1;
        }
    }

    for edge in &topology.edges {
        let (a, b) = (edge.a as usize, edge.b as usize);
        let midpoint = (positions[a] + positions[b]) * 0.5;
        mid_sum[a] += midpoint;
        mid_sum[b] += midpoint;
        valence[a] += 1;
        valence[b] += 1;
        if edge.is_boundary() {
            boundary_sum[a] += positions[b];
            boundary_sum[b] += positions[a];
            boundary_count[a] += 1;
            boundary_count[b] += 1;
        }
    }

    (0..count)
        .map(|v| {
            let p = positions[v];
            match boundary_count[v] {
                0 if valence[v] >= 3 && face_count[v] > 0 => {
                    let n = valence[v] as f32;
                    let f = face_sum[v] / face_count[v] as f32;
                    let r = mid_sum[v] / n;
                    (f + 2.0 * r + (n - 3.0) * p) / n
                }
                2 => p * 0.75 + boundary_sum[v] * 0.125,
                // Isolated, corner-like or non-manifold vertices stay put.
                _ => p,
            }
        })
        .collect()
}
