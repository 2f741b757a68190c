//! Classic rotational scans, described by one angle per acquisition.

use units::{deg, radian_, Angle, Lengthf32};

use crate::engine::ProjectionGeometry;
use crate::error::{positive, positive_f32, ConfigError};

/// `n` angles (radians) evenly covering `[0, arc)`
pub fn evenly_spaced_angles(n: usize, arc: Angle) -> Vec<f32> {
    let step = radian_(arc) / n.max(1) as f32;
    (0..n).map(|i| step * i as f32).collect()
}

/// Parallel beam, object rotating about the vertical axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircularParallel {
    pub angles: usize,
    pub arc: Angle,
    pub detector: (usize, usize),
    pub spacing: (Lengthf32, Lengthf32),
}

impl CircularParallel {

    pub fn new(angles: usize, arc: Angle, detector: (usize, usize)) -> Self {
        Self { angles, arc, detector, spacing: (1.0, 1.0) }
    }

    pub fn projection_geometry(&self) -> Result<ProjectionGeometry, ConfigError> {
        positive("angles", self.angles)?;
        let (rows, cols) = self.detector;
        Ok(ProjectionGeometry::Parallel3d {
            spacing: self.spacing,
            rows: positive("detector rows", rows)?,
            cols: positive("detector cols", cols)?,
            angles: evenly_spaced_angles(self.angles, self.arc),
        })
    }
}

/// Cone beam on a circular orbit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircularCone {
    pub angles: usize,
    pub arc: Angle,
    pub detector: (usize, usize),
    pub spacing: (Lengthf32, Lengthf32),
    pub source_origin: Lengthf32,
    pub origin_detector: Lengthf32,
}

impl CircularCone {

    pub fn new(angles: usize, detector: (usize, usize), source_origin: Lengthf32, origin_detector: Lengthf32) -> Self {
        Self { angles, arc: deg(180.0), detector, spacing: (1.0, 1.0), source_origin, origin_detector }
    }

    pub fn projection_geometry(&self) -> Result<ProjectionGeometry, ConfigError> {
        positive("angles", self.angles)?;
        let (rows, cols) = self.detector;
        Ok(ProjectionGeometry::Cone {
            spacing: self.spacing,
            rows: positive("detector rows", rows)?,
            cols: positive("detector cols", cols)?,
            angles: evenly_spaced_angles(self.angles, self.arc),
            source_origin  : positive_f32("source-origin distance"  , self.source_origin)?,
            origin_detector: positive_f32("origin-detector distance", self.origin_detector)?,
        })
    }
}
