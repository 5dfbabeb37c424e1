//! Multiresolution Ladder
//!
//! A mesh's stack of detail levels, coarsest first. Levels strictly increase
//! in face count and exactly one of them is active at a time.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::math::Aabb;
use crate::mesh::Geometry;
use crate::subdivision::{SubdivisionMode, Subdivider};
use crate::{MeshError, MeshResult, SculptConfig};

/// One subdivision depth's worth of geometry
#[derive(Debug, Clone)]
pub struct DetailLevel {
    geometry: Arc<Geometry>,
    local_bounds: Aabb,
}

impl DetailLevel {
    /// Wrap geometry, caching its local bounds
    pub fn new(geometry: Geometry) -> Self {
        let local_bounds = geometry.bounds();
        Self {
            geometry: Arc::new(geometry),
            local_bounds,
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn local_bounds(&self) -> Aabb {
        self.local_bounds
    }

    pub fn face_count(&self) -> usize {
        self.geometry.face_count()
    }
}

/// Parameters of one subdivision-clamp run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClampParams {
    /// Grow until the finest level has at least this many faces
    pub face_threshold: usize,
    /// Levels retained afterwards
    pub max_levels: usize,
    /// Interpolation rule for every step of this run
    pub mode: SubdivisionMode,
}

impl ClampParams {
    /// Threshold and level budget from the session configuration
    pub fn from_config(config: &SculptConfig, mode: SubdivisionMode) -> Self {
        Self {
            face_threshold: config.face_threshold,
            max_levels: config.max_levels,
            mode,
        }
    }
}

impl Default for ClampParams {
    fn default() -> Self {
        Self {
            face_threshold: 50_000,
            max_levels: 4,
            mode: SubdivisionMode::Smooth,
        }
    }
}

/// What a subdivision-clamp run did to the ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClampOutcome {
    /// Levels appended
    pub added: usize,
    /// Coarse levels evicted
    pub evicted: usize,
    /// Face count of the finest level afterwards
    pub finest_faces: usize,
}

/// Stack of detail levels with one active level
#[derive(Debug, Clone)]
pub struct MultiresMesh {
    levels: SmallVec<[DetailLevel; 4]>,
    active: usize,
}

impl MultiresMesh {
    /// Ladder with a single base level
    pub fn new(base: Geometry) -> Self {
        let mut levels = SmallVec::new();
        levels.push(DetailLevel::new(base));
        Self { levels, active: 0 }
    }

    /// Number of retained levels
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Index of the active level
    pub fn active_level(&self) -> usize {
        self.active
    }

    /// Select the active level
    pub fn set_active_level(&mut self, level: usize) -> MeshResult<()> {
        if level >= self.levels.len() {
            return Err(MeshError::LevelOutOfRange {
                level,
                count: self.levels.len(),
            });
        }
        self.active = level;
        Ok(())
    }

    /// The active level
    pub fn active(&self) -> &DetailLevel {
        &self.levels[self.active]
    }

    /// The finest (last) level
    pub fn finest(&self) -> &DetailLevel {
        // A ladder is never empty: eviction always keeps at least one level.
        &self.levels[self.levels.len() - 1]
    }

    /// All levels, coarsest first
    pub fn levels(&self) -> &[DetailLevel] {
        &self.levels
    }

    /// Face count of the active level
    pub fn face_count(&self) -> usize {
        self.active().face_count()
    }

    /// Face count of the finest level
    pub fn finest_face_count(&self) -> usize {
        self.finest().face_count()
    }

    /// Face counts of every level, coarsest first
    pub fn level_face_counts(&self) -> Vec<usize> {
        self.levels.iter().map(DetailLevel::face_count).collect()
    }

    /// Append a finer level and make it active
    ///
    /// Rejects geometry that is not strictly finer than the current finest level.
    pub fn push_level(&mut self, geometry: Geometry) -> MeshResult<()> {
        let previous = self.finest_face_count();
        if geometry.face_count() <= previous {
            return Err(MeshError::SubdivisionStalled { faces: previous });
        }
        self.levels.push(DetailLevel::new(geometry));
        self.active = self.levels.len() - 1;
        Ok(())
    }

    /// Subdivide the finest level once and append the result
    pub fn add_level(&mut self, subdivider: &dyn Subdivider, mode: SubdivisionMode) -> MeshResult<()> {
        let geometry = subdivider.add_level(self.finest().geometry(), mode)?;
        self.push_level(geometry)
    }

    /// Evict the coarsest levels beyond `max_levels` and activate the finest
    ///
    /// Returns the number of evicted levels.
    pub fn retain_finest(&mut self, max_levels: usize) -> usize {
        let max_levels = max_levels.max(1);
        let excess = self.levels.len().saturating_sub(max_levels);
        if excess > 0 {
            self.levels.drain(..excess);
        }
        self.active = self.levels.len() - 1;
        excess
    }

    /// Grow the ladder until the finest level reaches the face threshold, then
    /// clamp it to the level budget
    ///
    /// The interpolation mode applies to this call only.
    pub fn subdivide_clamp(
        &mut self,
        subdivider: &dyn Subdivider,
        params: ClampParams,
    ) -> MeshResult<ClampOutcome> {
        if params.max_levels == 0 {
            return Err(MeshError::InvalidConfig("max_levels must be at least 1".into()));
        }

        let _span = tracing::debug_span!(
            "subdivide_clamp",
            threshold = params.face_threshold,
            max_levels = params.max_levels
        )
        .entered();

        let mut added = 0;
        while self.finest_face_count() < params.face_threshold {
            self.add_level(subdivider, params.mode)?;
            added += 1;
            tracing::debug!(level = self.level_count() - 1, faces = self.finest_face_count(), "level added");
        }

        let evicted = self.retain_finest(params.max_levels);
        if evicted > 0 {
            log::debug!("evicted {} coarse detail levels", evicted);
        }

        Ok(ClampOutcome {
            added,
            evicted,
            finest_faces: self.finest_face_count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives;
    use crate::subdivision::CatmullClark;

    #[test]
    fn test_new_ladder() {
        let ladder = MultiresMesh::new(primitives::cube());
        assert_eq!(ladder.level_count(), 1);
        assert_eq!(ladder.active_level(), 0);
        assert_eq!(ladder.face_count(), 6);
    }

    #[test]
    fn test_subdivide_clamp_default_budget() {
        let mut ladder = MultiresMesh::new(primitives::cube());
        let outcome = ladder
            .subdivide_clamp(&CatmullClark, ClampParams::default())
            .unwrap();

        assert!(ladder.level_count() <= 4);
        assert!(ladder.finest_face_count() >= 50_000);
        assert_eq!(ladder.active_level(), ladder.level_count() - 1);
        assert_eq!(outcome.added, 7);
        assert_eq!(outcome.evicted, 4);
        assert_eq!(ladder.level_face_counts(), vec![1536, 6144, 24576, 98304]);
    }

    #[test]
    fn test_levels_strictly_increase() {
        let mut ladder = MultiresMesh::new(primitives::cylinder(12));
        let params = ClampParams {
            face_threshold: 2_000,
            max_levels: 8,
            mode: SubdivisionMode::Linear,
        };
        ladder.subdivide_clamp(&CatmullClark, params).unwrap();

        let counts = ladder.level_face_counts();
        assert!(counts.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_already_above_threshold_adds_nothing() {
        let mut ladder = MultiresMesh::new(primitives::cube());
        let params = ClampParams {
            face_threshold: 4,
            max_levels: 4,
            mode: SubdivisionMode::Smooth,
        };
        let outcome = ladder.subdivide_clamp(&CatmullClark, params).unwrap();
        assert_eq!(outcome.added, 0);
        assert_eq!(outcome.evicted, 0);
        assert_eq!(ladder.level_count(), 1);
    }

    #[test]
    fn test_eviction_runs_without_growth() {
        let mut ladder = MultiresMesh::new(primitives::cube());
        for _ in 0..3 {
            ladder.add_level(&CatmullClark, SubdivisionMode::Linear).unwrap();
        }
        ladder.set_active_level(0).unwrap();

        let params = ClampParams {
            face_threshold: 10,
            max_levels: 2,
            mode: SubdivisionMode::Linear,
        };
        let outcome = ladder.subdivide_clamp(&CatmullClark, params).unwrap();
        assert_eq!(outcome.added, 0);
        assert_eq!(outcome.evicted, 2);
        assert_eq!(ladder.level_face_counts(), vec![96, 384]);
        assert_eq!(ladder.active_level(), 1);
    }

    #[test]
    fn test_budget_above_count_keeps_everything() {
        let mut ladder = MultiresMesh::new(primitives::cube());
        let params = ClampParams {
            face_threshold: 100,
            max_levels: 10,
            mode: SubdivisionMode::Smooth,
        };
        let outcome = ladder.subdivide_clamp(&CatmullClark, params).unwrap();
        assert_eq!(outcome.evicted, 0);
        assert_eq!(ladder.level_face_counts(), vec![6, 24, 96, 384]);
    }

    #[test]
    fn test_zero_budget_rejected() {
        let mut ladder = MultiresMesh::new(primitives::cube());
        let params = ClampParams {
            face_threshold: 100,
            max_levels: 0,
            mode: SubdivisionMode::Smooth,
        };
        assert!(ladder.subdivide_clamp(&CatmullClark, params).is_err());
        assert_eq!(ladder.level_count(), 1);
    }

    #[test]
    fn test_push_level_rejects_coarser_geometry() {
        let mut ladder = MultiresMesh::new(primitives::cube());
        let result = ladder.push_level(primitives::cube());
        assert_eq!(result, Err(MeshError::SubdivisionStalled { faces: 6 }));
    }

    #[test]
    fn test_set_active_level_bounds() {
        let mut ladder = MultiresMesh::new(primitives::cube());
        ladder.add_level(&CatmullClark, SubdivisionMode::Smooth).unwrap();
        assert!(ladder.set_active_level(0).is_ok());
        assert_eq!(ladder.face_count(), 6);
        assert_eq!(
            ladder.set_active_level(2),
            Err(MeshError::LevelOutOfRange { level: 2, count: 2 })
        );
    }
}
