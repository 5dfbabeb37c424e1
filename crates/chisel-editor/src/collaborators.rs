//! Collaborators
//!
//! Narrow contracts the scene orchestrator drives: the undo-redo log, the GUI
//! and the active sculpting tool. Each comes with a do-nothing implementation
//! and, where useful, a recording one for headless sessions.

use std::cell::RefCell;
use std::rc::Rc;

use chisel_core::{Aabb, Mesh, MeshId};
use chisel_renderer::{GraphicsContext, RedrawHandle};

use crate::registry::RemovedMesh;

/// Undo-redo command log
///
/// Called exactly once per add or remove operation with the meshes that
/// operation changed.
pub trait UndoLog {
    fn push_add(&mut self, added: &[MeshId]);
    fn push_remove(&mut self, removed: &[RemovedMesh]);
    fn reset(&mut self);
}

/// GUI notified of the primary selection after every selection change
pub trait Gui {
    fn update_mesh(&mut self, primary: Option<&Mesh>);
}

/// The active sculpting tool, as far as rendering is concerned
pub trait SculptTool {
    /// Bounds of in-progress overlay geometry, [`Aabb::EMPTY`] when idle
    fn overlay_bounds(&self) -> Aabb {
        Aabb::EMPTY
    }

    /// Draw transient overlays after every scene pass
    ///
    /// Geometry updates made here should call `redraw.request_redraw()`; the
    /// request arms exactly one more frame.
    fn post_render(&mut self, _context: &mut dyn GraphicsContext, _redraw: &RedrawHandle) {}
}

/// Undo log that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullUndo;

impl UndoLog for NullUndo {
    fn push_add(&mut self, _added: &[MeshId]) {}
    fn push_remove(&mut self, _removed: &[RemovedMesh]) {}
    fn reset(&mut self) {}
}

/// GUI that ignores notifications
#[derive(Debug, Default, Clone, Copy)]
pub struct NullGui;

impl Gui for NullGui {
    fn update_mesh(&mut self, _primary: Option<&Mesh>) {}
}

/// Tool with no overlays
#[derive(Debug, Default, Clone, Copy)]
pub struct IdleTool;

impl SculptTool for IdleTool {}

/// Entry recorded by [`UndoJournal`]
#[derive(Debug, Clone)]
pub enum UndoEntry {
    Add(Vec<MeshId>),
    Remove(Vec<RemovedMesh>),
}

impl UndoEntry {
    /// Identities the entry refers to
    pub fn ids(&self) -> Vec<MeshId> {
        match self {
            UndoEntry::Add(ids) => ids.clone(),
            UndoEntry::Remove(removed) => removed.iter().map(|r| r.mesh.id()).collect(),
        }
    }
}

#[derive(Debug, Default)]
struct JournalState {
    entries: Vec<UndoEntry>,
    resets: usize,
}

/// In-memory undo log
///
/// Clones share the same journal, so a handle kept by the caller sees what
/// the scene pushed.
#[derive(Debug, Clone, Default)]
pub struct UndoJournal {
    state: Rc<RefCell<JournalState>>,
}

impl UndoJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries since the last reset, oldest first
    pub fn entries(&self) -> Vec<UndoEntry> {
        self.state.borrow().entries.clone()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many times the log was reset
    pub fn resets(&self) -> usize {
        self.state.borrow().resets
    }

    /// Remove and return the newest entry
    pub fn pop(&self) -> Option<UndoEntry> {
        self.state.borrow_mut().entries.pop()
    }
}

impl UndoLog for UndoJournal {
    fn push_add(&mut self, added: &[MeshId]) {
        self.state.borrow_mut().entries.push(UndoEntry::Add(added.to_vec()));
    }

    fn push_remove(&mut self, removed: &[RemovedMesh]) {
        self.state.borrow_mut().entries.push(UndoEntry::Remove(removed.to_vec()));
    }

    fn reset(&mut self) {
        let mut state = self.state.borrow_mut();
        state.entries.clear();
        state.resets += 1;
    }
}

/// GUI stand-in recording every primary-selection notification
#[derive(Debug, Clone, Default)]
pub struct RecordingGui {
    updates: Rc<RefCell<Vec<Option<MeshId>>>>,
}

impl RecordingGui {
    pub fn new() -> Self {
        Self::default()
    }

    /// Primary identity passed with each notification
    pub fn updates(&self) -> Vec<Option<MeshId>> {
        self.updates.borrow().clone()
    }
}

impl Gui for RecordingGui {
    fn update_mesh(&mut self, primary: Option<&Mesh>) {
        self.updates.borrow_mut().push(primary.map(Mesh::id));
    }
}
