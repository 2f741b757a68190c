//! Plain-value descriptions of volumes and projection geometries, as handed
//! to the engine.

use ndarray::Axis;
use serde::{Deserialize, Serialize};

use geometry::{Pose2, Pose3};
use units::Lengthf32;

use crate::error::{positive, ConfigError};
use crate::pose_table::{check_divisible, PoseTable};

/// Extents of the reconstruction volume, in voxels (one voxel per detector
/// cell).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeGeometry {
    pub rows: usize,
    pub cols: usize,
    /// `None` for 2D reconstructions
    pub slices: Option<usize>,
}

impl VolumeGeometry {

    pub fn new_2d(rows: usize, cols: usize) -> Self { Self { rows, cols, slices: None } }

    pub fn new_3d(rows: usize, cols: usize, slices: usize) -> Self {
        Self { rows, cols, slices: Some(slices) }
    }

    pub fn is_3d(&self) -> bool { self.slices.is_some() }

    /// Shape of the array holding this volume: `[slices, rows, cols]` or
    /// `[rows, cols]`
    pub fn array_shape(&self) -> Vec<usize> {
        match self.slices {
            Some(slices) => vec![slices, self.rows, self.cols],
            None         => vec![self.rows, self.cols],
        }
    }

    /// Extent along the depth (`z`) axis of the scanner frame
    pub fn depth_extent(&self) -> usize { self.slices.unwrap_or(self.rows) }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("volume rows", self.rows)?;
        positive("volume cols", self.cols)?;
        if let Some(slices) = self.slices { positive("volume slices", slices)?; }
        Ok(())
    }

    /// Does an array with `shape` fit this volume?
    pub fn check_array(&self, shape: &[usize]) -> Result<(), ConfigError> {
        let expected = self.array_shape();
        if shape != expected.as_slice() {
            return Err(ConfigError::Shape { what: "phantom", expected, actual: shape.to_vec() })
        }
        Ok(())
    }
}

/// Where the detector was at each acquisition instant.
///
/// The vector variants carry one pose per instant; the angle variants one
/// angle (radians) per instant.
#[derive(Clone, Debug, PartialEq)]
pub enum ProjectionGeometry {
    /// 3D cone beam, arbitrary pose per instant
    ConeVec    { rows: usize, cols: usize, poses: PoseTable<Pose3> },
    /// 2D fan beam, arbitrary pose per instant
    FanFlatVec { cells: usize, poses: PoseTable<Pose2> },
    /// 3D parallel beam rotating about the vertical axis
    Parallel3d { spacing: (Lengthf32, Lengthf32), rows: usize, cols: usize, angles: Vec<f32> },
    /// 3D cone beam on a circular orbit
    Cone {
        spacing: (Lengthf32, Lengthf32),
        rows: usize,
        cols: usize,
        angles: Vec<f32>,
        source_origin: Lengthf32,
        origin_detector: Lengthf32,
    },
}

impl ProjectionGeometry {

    /// Engine name of this kind of geometry
    pub fn kind(&self) -> &'static str {
        use ProjectionGeometry::*;
        match self {
            ConeVec    { .. } => "cone_vec",
            FanFlatVec { .. } => "fanflat_vec",
            Parallel3d { .. } => "parallel3d",
            Cone       { .. } => "cone",
        }
    }

    /// Number of acquisition instants
    pub fn instants(&self) -> usize {
        use ProjectionGeometry::*;
        match self {
            ConeVec    { poses , .. } => poses.len(),
            FanFlatVec { poses , .. } => poses.len(),
            Parallel3d { angles, .. } => angles.len(),
            Cone       { angles, .. } => angles.len(),
        }
    }

    pub fn is_3d(&self) -> bool { !matches!(self, Self::FanFlatVec { .. }) }

    /// `(rows, cols)` of the detector; 2D detectors have a single row
    pub fn detector(&self) -> (usize, usize) {
        use ProjectionGeometry::*;
        match *self {
            ConeVec    { rows, cols, .. } |
            Parallel3d { rows, cols, .. } |
            Cone       { rows, cols, .. } => (rows, cols),
            FanFlatVec { cells, .. }      => (1, cells),
        }
    }

    /// Sinogram axis along which acquisition instants are laid out
    pub fn acquisition_axis(&self) -> Axis {
        if self.is_3d() { Axis(1) } else { Axis(0) }
    }

    /// `[rows, instants, cols]` in 3D, `[instants, cells]` in 2D
    pub fn sinogram_shape(&self) -> Vec<usize> {
        let n = self.instants();
        match (self.is_3d(), self.detector()) {
            (true , (rows, cols)) => vec![rows, n, cols],
            (false, (_   , cols)) => vec![n, cols],
        }
    }

    /// The same setup, keeping only instants `offset`, `offset + step`, ...
    pub fn subsample(&self, offset: usize, step: usize) -> Self {
        use ProjectionGeometry::*;
        let pick = |angles: &Vec<f32>| -> Vec<f32> {
            angles.iter().copied().skip(offset).step_by(step.max(1)).collect()
        };
        match self {
            ConeVec    { rows, cols, poses } => ConeVec    { rows: *rows, cols: *cols, poses: poses.subsample(offset, step) },
            FanFlatVec { cells,      poses } => FanFlatVec { cells: *cells,            poses: poses.subsample(offset, step) },
            Parallel3d { spacing, rows, cols, angles } =>
                Parallel3d { spacing: *spacing, rows: *rows, cols: *cols, angles: pick(angles) },
            Cone { spacing, rows, cols, angles, source_origin, origin_detector } =>
                Cone { spacing: *spacing, rows: *rows, cols: *cols, angles: pick(angles),
                       source_origin: *source_origin, origin_detector: *origin_detector },
        }
    }

    /// Temporal midpoint of every block of `oversampling` consecutive
    /// instants
    pub fn midpoints(&self, oversampling: usize) -> Result<Self, ConfigError> {
        check_divisible(oversampling, self.instants())?;
        Ok(self.subsample(oversampling / 2, oversampling))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let (rows, cols) = self.detector();
        positive("detector rows", rows)?;
        positive("detector cols", cols)?;
        if self.instants() == 0 { return Err(ConfigError::EmptyPoseTable) }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geometry::{Point2, Vector2};
    #[allow(unused)] use pretty_assertions::{assert_eq, assert_ne};
    use rstest::rstest;

    fn fan(n: usize) -> ProjectionGeometry {
        let poses = (0..n)
            .map(|i| Pose2::new(Point2::new(i as f32, 10.0), Point2::new(i as f32, -1.0), Vector2::x()))
            .collect();
        ProjectionGeometry::FanFlatVec { cells: 64, poses }
    }

    fn parallel(n: usize) -> ProjectionGeometry {
        let angles = (0..n).map(|i| i as f32).collect();
        ProjectionGeometry::Parallel3d { spacing: (1.0, 1.0), rows: 8, cols: 16, angles }
    }

    #[test]
    fn volume_array_shapes() {
        assert_eq!(VolumeGeometry::new_3d(565, 547, 187).array_shape(), vec![187, 565, 547]);
        assert_eq!(VolumeGeometry::new_2d(100, 120).array_shape(), vec![100, 120]);
        assert_eq!(VolumeGeometry::new_3d(565, 547, 187).depth_extent(), 187);
        assert_eq!(VolumeGeometry::new_2d(100, 120).depth_extent(), 100);
        assert!(VolumeGeometry::new_3d(1, 0, 1).validate().is_err());
    }

    #[test]
    fn phantom_shape_must_match() {
        let v = VolumeGeometry::new_3d(4, 5, 6);
        assert!(v.check_array(&[6, 4, 5]).is_ok());
        assert_eq!(v.check_array(&[4, 5, 6]),
                   Err(ConfigError::Shape { what: "phantom", expected: vec![6, 4, 5], actual: vec![4, 5, 6] }));
    }

    #[rstest(/**/ geometry,     shape,          axis,
             case(fan(30),      vec![30, 64],    0),
             case(parallel(12), vec![8, 12, 16], 1),
    )]
    fn sinogram_layout(geometry: ProjectionGeometry, shape: Vec<usize>, axis: usize) {
        assert_eq!(geometry.sinogram_shape(), shape);
        assert_eq!(geometry.acquisition_axis(), Axis(axis));
    }

    #[test]
    fn midpoints_of_angle_based_scan() {
        let reduced = parallel(12).midpoints(4).unwrap();
        match reduced {
            ProjectionGeometry::Parallel3d { angles, rows, cols, .. } => {
                assert_eq!(angles, vec![2.0, 6.0, 10.0]);
                assert_eq!((rows, cols), (8, 16));
            }
            other => panic!("kind changed: {}", other.kind()),
        }
        assert!(parallel(12).midpoints(5).is_err());
    }

    #[test]
    fn midpoints_of_fan_scan() {
        let reduced = fan(9).midpoints(3).unwrap();
        assert_eq!(reduced.instants(), 3);
        assert_eq!(reduced.kind(), "fanflat_vec");
    }

    #[test]
    fn empty_geometry_is_invalid() {
        assert_eq!(fan(0).validate(), Err(ConfigError::EmptyPoseTable));
        assert!(fan(3).validate().is_ok());
    }
}
