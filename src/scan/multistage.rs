//! Several inline passes over the same object, combined into one scan.
//!
//! Each stage is an ordinary [`ScanStageConfig`]; what changes from one stage
//! to the next (direction, height, tilt) is decided by a [`StagePolicy`].

use std::ops::Range;

use itertools::Itertools;
use log::{debug, info};

use geometry::Pose3;
use units::{deg, deg_, Angle, Lengthf32};

use crate::engine::{ProjectionGeometry, VolumeGeometry};
use crate::error::ConfigError;
use crate::pose_table::PoseTable;
use super::{ScanStageConfig, TraversalDirection};

/// Maps a stage index to the configuration of that stage.
pub trait StagePolicy {
    fn stage(&self, index: usize) -> ScanStageConfig;
}

impl<F> StagePolicy for F
where
    F: Fn(usize) -> ScanStageConfig,
{
    fn stage(&self, index: usize) -> ScanStageConfig { self(index) }
}

/// The usual multi-stage scan: the object goes back and forth under the
/// scanner, raised a little more on every pass.
///
/// Stage `z` sweeps `Left` when `z` is even and `Right` when it is odd, is
/// shifted vertically by `base_shift + shift_step · z` and rotated by
/// `base_rotation + rotation_step · z`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlternatingStages {
    pub template: ScanStageConfig,
    pub base_shift: Lengthf32,
    pub shift_step: Lengthf32,
    pub base_rotation: Angle,
    pub rotation_step: Angle,
}

impl AlternatingStages {

    pub fn new(template: ScanStageConfig) -> Self {
        Self {
            template,
            base_shift: -50.0,
            shift_step:  25.0,
            base_rotation: deg(0.0),
            rotation_step: deg(0.0),
        }
    }
}

impl StagePolicy for AlternatingStages {
    fn stage(&self, index: usize) -> ScanStageConfig {
        let z = index as f32;
        let direction = if index % 2 == 0 { TraversalDirection::Left } else { TraversalDirection::Right };
        self.template
            .with_direction(direction)
            .with_vertical_shift(self.base_shift + self.shift_step * z)
            .with_rotation(self.base_rotation + self.rotation_step * z)
    }
}

/// Poses of all stages, laid end to end in stage order, remembering where
/// each stage starts and ends.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiStageGeometry {
    poses: PoseTable<Pose3>,
    stages: Vec<Range<usize>>,
    detector_cells: usize,
    volume: VolumeGeometry,
}

impl MultiStageGeometry {

    /// Build `count` stages as dictated by `policy`.
    ///
    /// All stages must share one detector, as they end up in a single
    /// projection geometry, and one volume, whose depth places every stage's
    /// source and detector.
    pub fn build(count: usize, policy: &impl StagePolicy) -> Result<Self, ConfigError> {
        if count == 0 { return Err(ConfigError::NoStages) }

        let configs = (0..count).map(|z| policy.stage(z)).collect_vec();
        let detector_cells = configs[0].detector_cells;
        if let Some((stage, c)) = configs.iter().find_position(|c| c.detector_cells != detector_cells) {
            return Err(ConfigError::InconsistentStages { stage, expected: detector_cells, actual: c.detector_cells })
        }
        let volume = configs[0].volume;
        if let Some((stage, c)) = configs.iter().find_position(|c| c.volume != volume) {
            return Err(ConfigError::InconsistentStageVolume { stage, expected: volume, actual: c.volume })
        }

        let tables = configs.iter()
            .map(ScanStageConfig::poses)
            .collect::<Result<Vec<_>, _>>()?;

        let stages = tables.iter()
            .scan(0, |start, t| {
                let range = *start..*start + t.len();
                *start = range.end;
                Some(range)
            })
            .collect_vec();

        for (z, (c, r)) in configs.iter().zip(&stages).enumerate() {
            debug!("stage {z}: poses {r:?}, {:?}, shift {}, rotation {}°",
                   c.direction, c.vertical_shift, deg_(c.rotation));
        }

        let poses = PoseTable::concat(tables);
        info!("multi-stage geometry: {count} stages, {} poses", poses.len());
        Ok(Self { poses, stages, detector_cells, volume })
    }

    pub fn poses(&self) -> &PoseTable<Pose3> { &self.poses }

    pub fn into_poses(self) -> PoseTable<Pose3> { self.poses }

    pub fn stage_count(&self) -> usize { self.stages.len() }

    /// Range of rows of the combined table that belong to stage `z`
    pub fn stage_range(&self, z: usize) -> Option<Range<usize>> { self.stages.get(z).cloned() }

    /// The poses of stage `z` alone
    pub fn stage(&self, z: usize) -> Option<&[Pose3]> {
        self.stage_range(z).map(|r| &self.poses.as_slice()[r])
    }

    pub fn detector_cells(&self) -> usize { self.detector_cells }

    /// The volume shared by all stages
    pub fn volume(&self) -> VolumeGeometry { self.volume }

    pub fn projection_geometry(&self) -> ProjectionGeometry {
        ProjectionGeometry::ConeVec {
            rows : self.detector_cells,
            cols : self.detector_cells,
            poses: self.poses.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;
    #[allow(unused)] use pretty_assertions::{assert_eq, assert_ne};
    use rstest::rstest;

    fn template() -> ScanStageConfig {
        ScanStageConfig::new(deg(60.0), 400, 40, VolumeGeometry::new_3d(200, 200, 100))
    }

    #[test]
    fn ten_alternating_stages() {
        let policy = AlternatingStages::new(template());
        let geometry = MultiStageGeometry::build(10, &policy).unwrap();
        assert_eq!(geometry.poses().len(), 400);
        assert_eq!(geometry.stage_count(), 10);

        for z in 0..10 {
            let stage = geometry.stage(z).unwrap();
            assert_eq!(stage.len(), 40);
            let expected_shift = -50.0 + 25.0 * z as f32;
            let (first, last) = (stage[0], stage[39]);
            for pose in stage {
                assert_float_eq!(pose.source.y,   expected_shift, abs <= 1e-4);
                assert_float_eq!(pose.detector.y, expected_shift, abs <= 1e-4);
            }
            // even stages sweep leftwards, odd ones rightwards
            if z % 2 == 0 { assert!(first.source.x > last.source.x) }
            else          { assert!(first.source.x < last.source.x) }
        }
    }

    #[test]
    fn stages_are_recovered_from_the_combined_table() {
        let policy = AlternatingStages::new(template());
        let geometry = MultiStageGeometry::build(4, &policy).unwrap();
        for z in 0..4 {
            let alone = policy.stage(z).poses().unwrap();
            assert_eq!(geometry.stage(z).unwrap(), alone.as_slice());
            assert_eq!(geometry.stage_range(z), Some(z * 40 .. (z + 1) * 40));
        }
        assert_eq!(geometry.stage(4), None);
    }

    #[test]
    fn closures_are_policies() {
        let policy = |z: usize| template().with_projections(10 + z);
        let geometry = MultiStageGeometry::build(3, &policy).unwrap();
        assert_eq!(geometry.poses().len(), 10 + 11 + 12);
        assert_eq!(geometry.stage_range(2), Some(21..33));
    }

    #[test]
    fn no_stages() {
        let policy = AlternatingStages::new(template());
        assert_eq!(MultiStageGeometry::build(0, &policy), Err(ConfigError::NoStages));
    }

    #[test]
    fn stages_must_share_the_detector() {
        let policy = |z: usize| ScanStageConfig { detector_cells: 400 + z, ..template() };
        assert_eq!(MultiStageGeometry::build(3, &policy),
                   Err(ConfigError::InconsistentStages { stage: 1, expected: 400, actual: 401 }));
    }

    #[test]
    fn stages_must_share_the_volume() {
        let deeper = VolumeGeometry::new_3d(200, 200, 140);
        let policy = |z: usize| if z == 2 { ScanStageConfig { volume: deeper, ..template() } } else { template() };
        assert_eq!(MultiStageGeometry::build(3, &policy),
                   Err(ConfigError::InconsistentStageVolume { stage: 2, expected: template().volume, actual: deeper }));
        assert_eq!(MultiStageGeometry::build(2, &policy).unwrap().volume(), template().volume);
    }

    #[test]
    fn invalid_stage_is_reported() {
        let policy = |z: usize| if z == 2 { template().with_projections(0) } else { template() };
        assert!(matches!(MultiStageGeometry::build(3, &policy), Err(ConfigError::NotPositive { .. })));
    }

    #[rstest(/**/ step, z, expected,
             case( 0.0, 7,  0.0),
             case(10.0, 0,  0.0),
             case(10.0, 3, 30.0),
    )]
    fn rotation_progression(step: f32, z: usize, expected: f32) {
        let policy = AlternatingStages { rotation_step: deg(step), ..AlternatingStages::new(template()) };
        assert_float_eq!(deg_(policy.stage(z).rotation), expected, abs <= 1e-4);
    }
}
