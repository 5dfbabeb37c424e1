//! Mesh Registry
//!
//! Ordered collection of the scene's top-level meshes. Order is insertion
//! order and is what the renderer's opaque/transparent partition preserves.
//! Lookup by identity is a linear scan; scenes hold dozens of meshes.

use chisel_core::{Mesh, MeshId};

/// A mesh taken out of the registry, with the index it occupied
#[derive(Debug, Clone)]
pub struct RemovedMesh {
    /// Index in the registry before the removal
    pub index: usize,
    pub mesh: Mesh,
}

/// The scene's meshes in insertion order
#[derive(Debug, Default)]
pub struct MeshRegistry {
    meshes: Vec<Mesh>,
}

impl MeshRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Position of a mesh
    pub fn index_of(&self, id: MeshId) -> Option<usize> {
        self.meshes.iter().position(|mesh| mesh.id() == id)
    }

    pub fn contains(&self, id: MeshId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn get(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.iter().find(|mesh| mesh.id() == id)
    }

    pub fn get_mut(&mut self, id: MeshId) -> Option<&mut Mesh> {
        self.meshes.iter_mut().find(|mesh| mesh.id() == id)
    }

    /// Meshes in insertion order
    pub fn as_slice(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Mutable access for per-frame updates; the slice cannot be reordered
    /// in length
    pub fn as_mut_slice(&mut self) -> &mut [Mesh] {
        &mut self.meshes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Mesh> {
        self.meshes.iter()
    }

    pub fn ids(&self) -> Vec<MeshId> {
        self.meshes.iter().map(Mesh::id).collect()
    }

    /// Append a mesh; returns `None` if its identity is already registered
    pub fn push(&mut self, mesh: Mesh) -> Option<MeshId> {
        let id = mesh.id();
        if self.contains(id) {
            return None;
        }
        self.meshes.push(mesh);
        Some(id)
    }

    /// Remove every registered mesh among `ids`
    ///
    /// Unknown identities are ignored. The result is ordered by the original
    /// index, ascending.
    pub fn remove_many(&mut self, ids: &[MeshId]) -> Vec<RemovedMesh> {
        let mut indices: Vec<usize> = ids.iter().filter_map(|&id| self.index_of(id)).collect();
        indices.sort_unstable();
        indices.dedup();

        let mut removed: Vec<RemovedMesh> = indices
            .into_iter()
            .rev()
            .map(|index| RemovedMesh {
                index,
                mesh: self.meshes.remove(index),
            })
            .collect();
        removed.reverse();
        removed
    }

    /// Put previously removed meshes back at their original relative order
    ///
    /// Meshes whose identity is already present are skipped. Returns the
    /// identities that were reinserted.
    pub fn restore(&mut self, mut removed: Vec<RemovedMesh>) -> Vec<MeshId> {
        removed.sort_by_key(|entry| entry.index);
        let mut restored = Vec::with_capacity(removed.len());
        for RemovedMesh { index, mesh } in removed {
            let id = mesh.id();
            if self.contains(id) {
                continue;
            }
            let index = index.min(self.meshes.len());
            self.meshes.insert(index, mesh);
            restored.push(id);
        }
        restored
    }

    /// Swap `old` for `new` in place, returning the replaced mesh
    pub fn replace(&mut self, old: MeshId, new: Mesh) -> Option<Mesh> {
        let index = self.index_of(old)?;
        Some(std::mem::replace(&mut self.meshes[index], new))
    }

    /// Drop every mesh
    pub fn clear(&mut self) -> Vec<Mesh> {
        std::mem::take(&mut self.meshes)
    }
}
