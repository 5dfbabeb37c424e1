//! Scene Selection
//!
//! Selected mesh identities plus the primary one. The primary, when set, is
//! always a member. Members may remain without a primary after the primary
//! mesh is removed from the scene.

use chisel_core::MeshId;
use smallvec::SmallVec;

/// Selected meshes, in selection order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    members: SmallVec<[MeshId; 8]>,
    primary: Option<MeshId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primary(&self) -> Option<MeshId> {
        self.primary
    }

    pub fn members(&self) -> &[MeshId] {
        &self.members
    }

    pub fn contains(&self, id: MeshId) -> bool {
        self.members.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn clear(&mut self) {
        self.members.clear();
        self.primary = None;
    }

    /// Replace the selection with `id` alone
    pub fn select_only(&mut self, id: MeshId) {
        self.members.clear();
        self.members.push(id);
        self.primary = Some(id);
    }

    /// Multi-select toggle
    ///
    /// An unselected mesh joins and becomes primary. A selected mesh leaves;
    /// the primary then stays if it is still a member, otherwise the first
    /// remaining member takes over (none if the set emptied).
    pub fn toggle(&mut self, id: MeshId) {
        if let Some(position) = self.members.iter().position(|&m| m == id) {
            self.members.remove(position);
            self.repair_primary();
        } else {
            self.members.push(id);
            self.primary = Some(id);
        }
    }

    /// Drop the given identities; returns whether anything changed
    ///
    /// A removed primary is cleared, not handed to another member.
    pub fn remove(&mut self, ids: &[MeshId]) -> bool {
        let before = self.members.len();
        self.members.retain(|id| !ids.contains(id));
        if self.members.len() == before {
            return false;
        }
        if self.primary.is_some_and(|p| ids.contains(&p)) {
            self.primary = None;
        }
        true
    }

    /// Substitute `new` for `old`; returns whether `old` was selected
    pub fn replace(&mut self, old: MeshId, new: MeshId) -> bool {
        let Some(position) = self.members.iter().position(|&m| m == old) else {
            return false;
        };
        if self.members.contains(&new) {
            self.members.remove(position);
        } else {
            self.members[position] = new;
        }
        if self.primary == Some(old) {
            self.primary = Some(new);
        }
        true
    }

    fn repair_primary(&mut self) {
        let primary_kept = self.primary.is_some_and(|p| self.members.contains(&p));
        if !primary_kept {
            self.primary = self.members.first().copied();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(count: usize) -> Vec<MeshId> {
        (0..count).map(|_| MeshId::fresh()).collect()
    }

    fn assert_consistent(selection: &Selection) {
        if let Some(primary) = selection.primary() {
            assert!(selection.contains(primary));
        }
        if selection.is_empty() {
            assert_eq!(selection.primary(), None);
        }
    }

    #[test]
    fn test_select_only() {
        let ids = ids(2);
        let mut selection = Selection::new();
        selection.select_only(ids[0]);
        selection.select_only(ids[1]);
        assert_eq!(selection.members(), &[ids[1]]);
        assert_eq!(selection.primary(), Some(ids[1]));
    }

    #[test]
    fn test_toggle_adds_as_primary() {
        let ids = ids(2);
        let mut selection = Selection::new();
        selection.select_only(ids[0]);
        selection.toggle(ids[1]);
        assert_eq!(selection.members(), &[ids[0], ids[1]]);
        assert_eq!(selection.primary(), Some(ids[1]));
    }

    #[test]
    fn test_toggle_off_promotes_last_member() {
        let ids = ids(2);
        let mut selection = Selection::new();
        selection.select_only(ids[0]);
        selection.toggle(ids[1]);
        selection.toggle(ids[1]);
        assert_eq!(selection.members(), &[ids[0]]);
        assert_eq!(selection.primary(), Some(ids[0]));
    }

    #[test]
    fn test_toggle_off_sole_member_empties() {
        let ids = ids(1);
        let mut selection = Selection::new();
        selection.select_only(ids[0]);
        selection.toggle(ids[0]);
        assert!(selection.is_empty());
        assert_eq!(selection.primary(), None);
    }

    #[test]
    fn test_toggle_off_non_primary_keeps_primary() {
        let ids = ids(3);
        let mut selection = Selection::new();
        selection.select_only(ids[0]);
        selection.toggle(ids[1]);
        selection.toggle(ids[2]);
        selection.toggle(ids[0]);
        assert_eq!(selection.primary(), Some(ids[2]));

        selection.toggle(ids[2]);
        assert_eq!(selection.primary(), Some(ids[1]));
        assert_consistent(&selection);
    }

    #[test]
    fn test_remove_clears_primary() {
        let ids = ids(2);
        let mut selection = Selection::new();
        selection.select_only(ids[0]);
        selection.toggle(ids[1]);

        assert!(selection.remove(&[ids[1]]));
        assert_eq!(selection.members(), &[ids[0]]);
        assert_eq!(selection.primary(), None);
        assert!(selection.remove(&[ids[0]]));
        assert!(selection.is_empty());
        assert!(!selection.remove(&[ids[0]]));
    }

    #[test]
    fn test_remove_non_primary_keeps_primary() {
        let ids = ids(3);
        let mut selection = Selection::new();
        selection.select_only(ids[0]);
        selection.toggle(ids[1]);
        selection.toggle(ids[2]);

        assert!(selection.remove(&[ids[0]]));
        assert_eq!(selection.members(), &[ids[1], ids[2]]);
        assert_eq!(selection.primary(), Some(ids[2]));
    }

    #[test]
    fn test_replace_without_primary_keeps_none() {
        let ids = ids(3);
        let mut selection = Selection::new();
        selection.select_only(ids[0]);
        selection.toggle(ids[1]);
        selection.remove(&[ids[1]]);

        assert!(selection.replace(ids[0], ids[2]));
        assert_eq!(selection.members(), &[ids[2]]);
        assert_eq!(selection.primary(), None);
    }

    #[test]
    fn test_replace_moves_primary() {
        let ids = ids(3);
        let mut selection = Selection::new();
        selection.select_only(ids[0]);
        selection.toggle(ids[1]);

        assert!(selection.replace(ids[1], ids[2]));
        assert_eq!(selection.members(), &[ids[0], ids[2]]);
        assert_eq!(selection.primary(), Some(ids[2]));
        assert!(!selection.replace(ids[1], ids[2]));
    }

    #[test]
    fn test_arbitrary_sequence_stays_consistent() {
        let ids = ids(4);
        let mut selection = Selection::new();
        for step in 0..40 {
            let id = ids[(step * 7 + 3) % ids.len()];
            match step % 4 {
                0 => selection.select_only(id),
                3 => {
                    selection.remove(&[id]);
                }
                _ => selection.toggle(id),
            }
            assert_consistent(&selection);
        }
    }
}
