//! 2D object riding a semi-circular conveyor belt between a fixed fan-beam
//! source and detector.
//!
//! In the lab the source sits at `(src, 0)`, the detector at `(-det, 0)` and
//! the belt is a circle of radius `R` centred on `(-R, 0)`. At belt angle `α`
//! the object centre is at `c(α) = (R sin α - R, R cos α)` and, carried by
//! the belt, the object has turned through `90° - α`. The pose at `α` is the
//! lab setup expressed in the object's frame:
//!
//! ```text
//! p_obj = Rot(90° - α) · (p_lab - c(α))
//! ```
//!
//! so the object passes straight through the beam at `α = 90°`.

use log::debug;

use geometry::{rotate_in_plane, Point2, Pose2, Vector2};
use units::{deg, deg_, half_angle_tan, radian, radian_, Angle, Lengthf32};

use crate::engine::ProjectionGeometry;
use crate::error::{positive, positive_f32, ConfigError};
use crate::pose_table::PoseTable;
use super::{check_opening_angle, linspace};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SemiCircularBelt {
    pub radius: Lengthf32,
    pub projections: usize,
    /// From the belt's crossing point to the source
    pub source_distance: Lengthf32,
    /// From the belt's crossing point to the detector
    pub detector_distance: Lengthf32,
    /// Full opening angle of the fan
    pub fan_angle: Angle,
    /// Belt angles of the first and last acquisitions
    pub arc: (Angle, Angle),
}

impl SemiCircularBelt {

    pub fn new(radius: Lengthf32, projections: usize, source_distance: Lengthf32, detector_distance: Lengthf32, fan_angle: Angle) -> Self {
        Self {
            radius, projections, source_distance, detector_distance, fan_angle,
            arc: (deg(60.0), deg(120.0)),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive_f32("belt radius"      , self.radius)?;
        positive    ("projections"      , self.projections)?;
        positive_f32("source distance"  , self.source_distance)?;
        positive_f32("detector distance", self.detector_distance)?;
        check_opening_angle(self.fan_angle)?;
        Ok(())
    }

    /// Detector cells needed to catch the whole fan at the far end of the
    /// belt
    pub fn detector_cells(&self) -> usize {
        let reach = self.radius + self.source_distance + self.detector_distance;
        (2.0 * half_angle_tan(self.fan_angle) * reach) as usize
    }

    pub fn poses(&self) -> Result<PoseTable<Pose2>, ConfigError> {
        self.validate()?;
        let r = self.radius;
        let source   = Point2::new( self.source_distance  , 0.0);
        let detector = Point2::new(-self.detector_distance, 0.0);
        let u        = Vector2::new(0.0, -1.0);
        let (first, last) = self.arc;
        debug!("semi-circular belt: {} poses over {}° .. {}°, {} detector cells",
               self.projections, deg_(first), deg_(last), self.detector_cells());

        Ok(linspace(radian_(first), radian_(last), self.projections)
            .map(|alpha| {
                let centre = Vector2::new(r * alpha.sin() - r, r * alpha.cos());
                let turn: Angle = deg(90.0) - radian(alpha);
                let to_object = |p: Point2| rotate_in_plane(p - centre, turn);
                let u = nalgebra::Rotation2::new(radian_(turn)) * u;
                Pose2::new(to_object(source), to_object(detector), u)
            })
            .collect())
    }

    pub fn projection_geometry(&self) -> Result<ProjectionGeometry, ConfigError> {
        Ok(ProjectionGeometry::FanFlatVec { cells: self.detector_cells(), poses: self.poses()? })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;
    use rstest::rstest;

    fn belt() -> SemiCircularBelt { SemiCircularBelt::new(15.0, 45, 5.0, 5.0, deg(30.0)) }

    #[rstest(/**/ radius, src, det, fan, expected,
             case( 15.0,   5.0,   5.0, 30.0,  13),
             case(250.0, 200.0, 100.0, 45.0, 455),
    )]
    fn detector_size(radius: f32, src: f32, det: f32, fan: f32, expected: usize) {
        let belt = SemiCircularBelt::new(radius, 10, src, det, deg(fan));
        assert_eq!(belt.detector_cells(), expected);
    }

    #[test]
    fn object_crosses_the_beam_halfway() {
        let poses = belt().poses().unwrap();
        assert_eq!(poses.len(), 45);
        let middle = *poses.get(22).unwrap();
        assert_float_eq!((middle.source.x,   middle.source.y  ), ( 5.0, 0.0), abs <= (1e-5, 1e-5));
        assert_float_eq!((middle.detector.x, middle.detector.y), (-5.0, 0.0), abs <= (1e-5, 1e-5));
        assert_float_eq!((middle.u.x,        middle.u.y       ), ( 0.0,-1.0), abs <= (1e-6, 1e-6));
    }

    #[test]
    fn detector_orientation_follows_the_belt() {
        let poses = belt().poses().unwrap();
        let first = *poses.get(0).unwrap();
        let a = (60.0_f32).to_radians();
        assert_float_eq!((first.u.x, first.u.y), (a.cos(), -a.sin()), abs <= (1e-6, 1e-6));
    }

    #[test]
    fn setup_moves_rigidly() {
        for pose in &belt().poses().unwrap() {
            let ray = pose.source - pose.detector;
            assert_float_eq!(ray.norm(), 10.0, abs <= 1e-4);
            assert_float_eq!(ray.dot(&pose.u), 0.0, abs <= 1e-4);
            assert_float_eq!(pose.u.norm(), 1.0, abs <= 1e-6);
        }
    }

    #[test]
    fn bad_radius() {
        let belt = SemiCircularBelt { radius: 0.0, ..belt() };
        assert!(matches!(belt.poses(), Err(ConfigError::NotPositive { what: "belt radius", .. })));
    }
}
