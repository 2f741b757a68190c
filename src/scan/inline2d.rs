//! 2D fan-beam version of the inline scanner.
//!
//! Same sweep as the cone-beam stage, restricted to the plane of the belt.
//! Optionally the object also spins while it travels (as it might on a
//! turntable riding the belt): by instant `p` it has turned through
//! `p · ω_total / N`, so in the object's frame the pose at instant `p` is
//! rotated by that angle about the object centre.

use log::debug;

use geometry::{Point2, Pose2, Vector2};
use units::{deg, deg_, half_angle_tan, Angle, Lengthf32};

use crate::engine::{ProjectionGeometry, VolumeGeometry};
use crate::error::{finite, positive, ConfigError};
use crate::pose_table::PoseTable;
use super::{check_opening_angle, TraversalDirection};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InlineScan2D {
    /// Full opening angle of the fan
    pub fan_angle: Angle,
    pub detector_cells: usize,
    pub projections: usize,
    /// 2D reconstruction grid; its rows give the depth extent
    pub volume: VolumeGeometry,
    pub direction: TraversalDirection,
    /// Total object rotation over the whole scan
    pub total_rotation: Angle,
}

impl InlineScan2D {

    pub fn new(fan_angle: Angle, detector_cells: usize, projections: usize, volume: VolumeGeometry) -> Self {
        Self {
            fan_angle, detector_cells, projections, volume,
            direction: TraversalDirection::default(),
            total_rotation: deg(0.0),
        }
    }

    pub fn with_total_rotation(self, total_rotation: Angle) -> Self { Self { total_rotation, ..self } }
    pub fn with_direction(self, direction: TraversalDirection) -> Self { Self { direction, ..self } }
    pub fn with_projections(self, projections: usize) -> Self { Self { projections, ..self } }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_opening_angle(self.fan_angle)?;
        positive("detector cells", self.detector_cells)?;
        positive("projections"   , self.projections)?;
        self.volume.validate()?;
        finite("total rotation", deg_(self.total_rotation))?;
        Ok(())
    }

    pub fn source_standoff(&self) -> Lengthf32 {
        (self.detector_cells as Lengthf32 / 2.0) / half_angle_tan(self.fan_angle)
    }

    /// Object rotation between consecutive instants
    pub fn rotation_step(&self) -> Angle { self.total_rotation / self.projections as f32 }

    pub fn poses(&self) -> Result<PoseTable<Pose2>, ConfigError> {
        self.validate()?;
        let h = self.source_standoff();
        let half_depth = self.volume.depth_extent() as Lengthf32 / 2.0;
        let step = self.rotation_step();
        debug!("inline 2D scan: {} poses, standoff {h:.2}, object rotation {}° per instant",
               self.projections, deg_(step));
        Ok(self.direction.sweep(self.detector_cells, self.projections)
            .map(|x| Pose2::new(Point2::new(x, h - half_depth), Point2::new(x, -half_depth), Vector2::x()))
            .enumerate()
            .map(|(p, pose)| pose.rotated(step * p as f32))
            .collect())
    }

    pub fn projection_geometry(&self) -> Result<ProjectionGeometry, ConfigError> {
        Ok(ProjectionGeometry::FanFlatVec { cells: self.detector_cells, poses: self.poses()? })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;
    use proptest::prelude::*;

    fn scan() -> InlineScan2D {
        InlineScan2D::new(deg(60.0), 200, 50, VolumeGeometry::new_2d(100, 120))
    }

    #[test]
    fn without_rotation_matches_the_cone_beam_sweep() {
        let poses = scan().poses().unwrap();
        let h = 100.0 / (30.0_f32).to_radians().tan();
        assert_eq!(poses.len(), 50);
        assert_float_eq!(poses.get( 0).unwrap().source.x, -100.0, abs <= 1e-4);
        assert_float_eq!(poses.get(49).unwrap().source.x,  100.0, abs <= 1e-4);
        for pose in &poses {
            assert_float_eq!(pose.source.y, h - 50.0, rmax <= 1e-5);
            assert_eq!(pose.detector.y, -50.0);
            assert_eq!(pose.u, Vector2::x());
        }
    }

    #[test]
    fn single_leftward_projection_sits_at_left_extreme() {
        let poses = scan().with_direction(TraversalDirection::Left).with_projections(1).poses().unwrap();
        assert_eq!(poses.len(), 1);
        assert_eq!(poses.get(0).unwrap().source.x, -100.0);
    }

    #[test]
    fn object_rotation_accumulates() {
        let poses = scan().with_total_rotation(deg(100.0)).poses().unwrap();
        // 2° per instant
        let p = 10;
        let pose = *poses.get(p).unwrap();
        let angle = (20.0_f32).to_radians();
        assert_float_eq!((pose.u.x, pose.u.y), (angle.cos(), angle.sin()), abs <= (1e-6, 1e-6));
        let first = *poses.get(0).unwrap();
        assert_eq!(first.u, Vector2::x());
    }

    proptest! {
        #[test]
        fn rotation_is_rigid(total in -720.0 .. (720.0 as f32), n in 1 .. 60_usize) {
            let plain   = scan().with_projections(n).poses().unwrap();
            let rotated = scan().with_projections(n).with_total_rotation(deg(total)).poses().unwrap();
            for (a, b) in plain.iter().zip(rotated.iter()) {
                prop_assert!((b.u.norm() - 1.0).abs() < 1e-5);
                let before = (a.source - a.detector).norm();
                let after  = (b.source - b.detector).norm();
                prop_assert!((before - after).abs() < 1e-2);
                // detector stays perpendicular to the central ray
                prop_assert!(b.u.dot(&(b.source - b.detector)).abs() < 1e-2);
            }
        }
    }
}
