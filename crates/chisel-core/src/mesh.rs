//! Mesh and Geometry
//!
//! Drawable meshes with stable identities. Every mesh carries a
//! multiresolution ladder; a plain mesh is simply a ladder with one level.

use std::sync::atomic::{AtomicU32, Ordering};

use bitflags::bitflags;
use glam::{Mat4, Vec3};

use crate::math::{Aabb, Drawable};
use crate::multires::MultiresMesh;
use crate::{MeshError, MeshResult};

static NEXT_MESH_ID: AtomicU32 = AtomicU32::new(1);

/// Stable mesh identity, unique within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(u32);

impl MeshId {
    /// Allocate a fresh identity
    pub fn fresh() -> Self {
        Self(NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for MeshId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "mesh#{}", self.0)
    }
}

bitflags! {
    /// Per-mesh display state
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DisplayFlags: u8 {
        const VISIBLE = 0b0001;
        const TRANSPARENT = 0b0010;
        const WIREFRAME = 0b0100;
    }
}

impl Default for DisplayFlags {
    fn default() -> Self {
        Self::VISIBLE
    }
}

/// A polygon of the control cage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Tri([u32; 3]),
    Quad([u32; 4]),
}

impl Face {
    /// Vertex indices in winding order
    pub fn indices(&self) -> &[u32] {
        match self {
            Face::Tri(indices) => &indices[..],
            Face::Quad(indices) => &indices[..],
        }
    }

    /// Number of corners
    pub fn arity(&self) -> usize {
        self.indices().len()
    }
}

/// Vertex and face buffers of one detail level
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    positions: Vec<Vec3>,
    faces: Vec<Face>,
}

impl Geometry {
    /// Build geometry, checking every face index against the vertex buffer
    pub fn new(positions: Vec<Vec3>, faces: Vec<Face>) -> MeshResult<Self> {
        if positions.is_empty() || faces.is_empty() {
            return Err(MeshError::EmptyGeometry);
        }

        let vertex_count = positions.len();
        for (face_index, face) in faces.iter().enumerate() {
            if let Some(&index) = face.indices().iter().find(|&&i| i as usize >= vertex_count) {
                return Err(MeshError::FaceIndexOutOfRange {
                    face: face_index,
                    index,
                    vertex_count,
                });
            }
        }

        Ok(Self { positions, faces })
    }

    /// Build geometry whose indices are known to be valid
    pub(crate) fn from_parts(positions: Vec<Vec3>, faces: Vec<Face>) -> Self {
        Self { positions, faces }
    }

    /// Vertex positions in local space
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Faces
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Local-space bounds
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(&self.positions)
    }

    /// Number of triangles submitted when drawing this geometry
    pub fn triangle_count(&self) -> usize {
        self.faces.iter().map(|face| face.arity() - 2).sum()
    }
}

/// A drawable mesh registered in the scene
///
/// Cloning keeps the identity; use [`Mesh::duplicate`] for a copy with a
/// fresh one. Detail-level buffers are shared between clones.
#[derive(Debug, Clone)]
pub struct Mesh {
    id: MeshId,
    /// Display name
    pub name: String,
    /// Local-to-world transform
    pub matrix: Mat4,
    /// Display state
    pub flags: DisplayFlags,
    multires: MultiresMesh,
    world_bounds: Aabb,
    model_view: Mat4,
    mvp: Mat4,
}

impl Mesh {
    /// Wrap a ladder into a new mesh with a fresh identity
    pub fn new(name: impl Into<String>, multires: MultiresMesh) -> Self {
        let mut mesh = Self {
            id: MeshId::fresh(),
            name: name.into(),
            matrix: Mat4::IDENTITY,
            flags: DisplayFlags::default(),
            multires,
            world_bounds: Aabb::EMPTY,
            model_view: Mat4::IDENTITY,
            mvp: Mat4::IDENTITY,
        };
        mesh.world_bounds = mesh.compute_world_bound();
        mesh
    }

    /// Single-level mesh from raw geometry
    pub fn from_geometry(name: impl Into<String>, geometry: Geometry) -> Self {
        Self::new(name, MultiresMesh::new(geometry))
    }

    /// Copy with a fresh identity
    pub fn duplicate(&self) -> Self {
        Self {
            id: MeshId::fresh(),
            ..self.clone()
        }
    }

    /// Stable identity
    pub fn id(&self) -> MeshId {
        self.id
    }

    /// The detail ladder
    pub fn multires(&self) -> &MultiresMesh {
        &self.multires
    }

    /// Mutable access to the detail ladder
    pub fn multires_mut(&mut self) -> &mut MultiresMesh {
        &mut self.multires
    }

    /// Geometry of the active detail level
    pub fn geometry(&self) -> &Geometry {
        self.multires.active().geometry()
    }

    /// Face count of the active detail level
    pub fn face_count(&self) -> usize {
        self.multires.face_count()
    }

    pub fn is_transparent(&self) -> bool {
        self.flags.contains(DisplayFlags::TRANSPARENT)
    }

    pub fn shows_wireframe(&self) -> bool {
        self.flags.contains(DisplayFlags::WIREFRAME)
    }

    /// Apply a flag change
    pub fn set_flag(&mut self, flag: DisplayFlags, enabled: bool) {
        self.flags.set(flag, enabled);
    }

    /// Bounds of the active level under the current matrix
    pub fn compute_world_bound(&self) -> Aabb {
        self.multires.active().local_bounds().transform(self.matrix)
    }

    /// World bounds cached by the last [`Mesh::update_matrices`]
    pub fn cached_world_bounds(&self) -> Aabb {
        self.world_bounds
    }

    /// Refresh camera-dependent matrices and the cached world bounds
    pub fn update_matrices(&mut self, view: Mat4, projection: Mat4) {
        self.model_view = view * self.matrix;
        self.mvp = projection * self.model_view;
        self.world_bounds = self.compute_world_bound();
    }

    /// Model-view matrix from the last update
    pub fn model_view(&self) -> Mat4 {
        self.model_view
    }

    /// Model-view-projection matrix from the last update
    pub fn mvp(&self) -> Mat4 {
        self.mvp
    }
}

impl Drawable for Mesh {
    fn is_visible(&self) -> bool {
        self.flags.contains(DisplayFlags::VISIBLE)
    }

    fn world_bounds(&self) -> Aabb {
        self.compute_world_bound()
    }
}
