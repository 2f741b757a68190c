//! One pass of an object through an inline (conveyor-belt) cone-beam
//! scanner.
//!
//! The source and the flat-panel detector stay put while the object is
//! carried past them along the scan axis. In the object's frame this looks
//! like a source/detector pair sliding the other way, which is what the pose
//! sequence describes: at instant `i` both sit at the same horizontal
//! position, swept linearly across the width of the detector.
//!
//! ```text
//!                 source (x, 0, h - e/2)
//!                   /|\
//!                  / | \      opening angle α
//!                 /  |  \
//!        --------+---+---+--------  object, depth extent e
//!                |   |   |
//!     ===========+===+===+=========  detector (x, 0, -e/2), D cells wide
//! ```
//!
//! `h = (D/2) / tan(α/2)` is chosen so that the outermost rays of the cone
//! just reach the edges of the detector.

use log::debug;
use serde::{Deserialize, Serialize};

use geometry::{Point, Pose3, Vector};
use units::{deg, deg_, half_angle_tan, Angle, Lengthf32};

use crate::engine::{ProjectionGeometry, VolumeGeometry};
use crate::error::{finite, oversampled, positive, ConfigError};
use crate::pose_table::PoseTable;
use super::{check_opening_angle, linspace};

/// Which way the source/detector pair sweeps across the object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraversalDirection {
    /// From `+D/2` down to `-D/2`
    Left,
    /// From `-D/2` up to `+D/2`
    #[default]
    Right,
}

impl TraversalDirection {

    /// First and last horizontal positions of the sweep across `cells`
    pub(crate) fn extremes(self, cells: usize) -> (Lengthf32, Lengthf32) {
        let half = cells as Lengthf32 / 2.0;
        match self {
            Self::Left  => ( half, -half),
            Self::Right => (-half,  half),
        }
    }

    /// `n` horizontal positions across `cells`, both extremes included. A
    /// single sample sits at the left extreme `-D/2` whatever the direction.
    pub(crate) fn sweep(self, cells: usize, n: usize) -> impl Iterator<Item = Lengthf32> {
        let (start, stop) = if n == 1 { Self::Right.extremes(cells) } else { self.extremes(cells) };
        linspace(start, stop, n)
    }

    pub fn reversed(self) -> Self {
        match self {
            Self::Left  => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Everything needed to produce the poses of one inline stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScanStageConfig {
    /// Full opening angle of the cone beam
    pub fan_angle: Angle,
    /// Width (and height) of the square detector, in cells
    pub detector_cells: usize,
    /// Number of acquisition instants in this stage
    pub projections: usize,
    pub volume: VolumeGeometry,
    /// Added to the vertical coordinate of source and detector, after
    /// rotation
    pub vertical_shift: Lengthf32,
    pub direction: TraversalDirection,
    /// Rigid rotation of the whole stage about the scan axis
    pub rotation: Angle,
}

impl ScanStageConfig {

    pub fn new(fan_angle: Angle, detector_cells: usize, projections: usize, volume: VolumeGeometry) -> Self {
        Self {
            fan_angle, detector_cells, projections, volume,
            vertical_shift: 0.0,
            direction: TraversalDirection::default(),
            rotation: deg(0.0),
        }
    }

    pub fn with_vertical_shift(self, vertical_shift: Lengthf32) -> Self { Self { vertical_shift, ..self } }
    pub fn with_direction(self, direction: TraversalDirection) -> Self { Self { direction, ..self } }
    pub fn with_rotation (self, rotation: Angle              ) -> Self { Self { rotation , ..self } }
    pub fn with_projections(self, projections: usize        ) -> Self { Self { projections, ..self } }

    /// The same stage sampled `oversampling` times more densely
    pub fn oversampled(self, oversampling: usize) -> Result<Self, ConfigError> {
        Ok(self.with_projections(oversampled("projections", self.projections, oversampling)?))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_opening_angle(self.fan_angle)?;
        positive("detector cells", self.detector_cells)?;
        positive("projections"   , self.projections)?;
        self.volume.validate()?;
        finite("vertical shift", self.vertical_shift)?;
        finite("rotation"      , deg_(self.rotation))?;
        Ok(())
    }

    /// Distance from the source to the detector plane: `(D/2) / tan(α/2)`
    pub fn source_standoff(&self) -> Lengthf32 {
        (self.detector_cells as Lengthf32 / 2.0) / half_angle_tan(self.fan_angle)
    }

    /// The poses of this stage, in acquisition order.
    pub fn poses(&self) -> Result<PoseTable<Pose3>, ConfigError> {
        self.validate()?;
        let h = self.source_standoff();
        let half_depth = self.volume.depth_extent() as Lengthf32 / 2.0;
        let (start, stop) = self.direction.extremes(self.detector_cells);
        debug!("inline stage: {} poses, standoff {h:.2}, sweep {start} -> {stop}, shift {}, rotation {}°",
               self.projections, self.vertical_shift, deg_(self.rotation));
        Ok(self.direction.sweep(self.detector_cells, self.projections)
            .map(|x| Pose3::new(
                Point ::new(x, 0.0, h - half_depth),
                Point ::new(x, 0.0,   - half_depth),
                Vector::new(1.0, 0.0, 0.0),
                Vector::new(0.0, 1.0, 0.0),
            ))
            .map(|pose| pose.rotated_about_scan_axis(self.rotation))
            .map(|pose| pose.shifted_vertically(self.vertical_shift))
            .collect())
    }

    /// Cone-beam geometry of this stage alone
    pub fn projection_geometry(&self) -> Result<ProjectionGeometry, ConfigError> {
        Ok(ProjectionGeometry::ConeVec {
            rows : self.detector_cells,
            cols : self.detector_cells,
            poses: self.poses()?,
        })
    }
}
