//! Portable binary record of a scan geometry.
//!
//! Layout (little-endian):
//!
//! ```text
//! b"CTGEOM01"
//! kind                 u8     0 cone_vec, 1 fanflat_vec, 2 parallel3d, 3 cone
//! detector_rows        u32
//! detector_cols        u32
//! volume_shape         [u32; 3]   rows, cols, slices (0 in 2D)
//! desired_projections  u32
//! oversampling         u32
//! parameters           [f32; 4]   spacing (2), source-origin, origin-detector
//! components           u32        12, 6, or 1 (one angle per row)
//! n_discrete           u32
//! discrete             [f32; n_discrete × components]
//! n_blurred            u32
//! blurred              [f32; n_blurred × components]
//! ```
//!
//! The discrete table holds every oversampled instant; the blurred table one
//! row per aggregated projection.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use binrw::{binrw, BinRead, BinWrite};
use ndarray::ArrayView2;

use geometry::{Pose, Pose2, Pose3};

use crate::engine::{ProjectionGeometry, VolumeGeometry};
use crate::error::{ConfigError, Result};
use crate::pose_table::PoseTable;
use crate::scanning::ScanningObject;

#[binrw]
#[brw(repr = u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    ConeVec    = 0,
    FanFlatVec = 1,
    Parallel3d = 2,
    Cone       = 3,
}

impl GeometryKind {

    fn of(geometry: &ProjectionGeometry) -> Self {
        match geometry {
            ProjectionGeometry::ConeVec    { .. } => Self::ConeVec,
            ProjectionGeometry::FanFlatVec { .. } => Self::FanFlatVec,
            ProjectionGeometry::Parallel3d { .. } => Self::Parallel3d,
            ProjectionGeometry::Cone       { .. } => Self::Cone,
        }
    }

    /// Values per row of the pose tables
    pub fn components(self) -> u32 {
        match self {
            Self::ConeVec    => Pose3::COMPONENTS as u32,
            Self::FanFlatVec => Pose2::COMPONENTS as u32,
            Self::Parallel3d | Self::Cone => 1,
        }
    }
}

#[binrw]
#[brw(little, magic = b"CTGEOM01")]
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryRecord {
    pub kind: GeometryKind,
    pub detector_rows: u32,
    pub detector_cols: u32,
    pub volume_shape: [u32; 3],
    pub desired_projections: u32,
    pub oversampling: u32,
    pub parameters: [f32; 4],

    #[br(assert(components == kind.components()))]
    pub components: u32,

    #[br(temp)]
    #[bw(calc = rows_in(discrete, *components))]
    n_discrete: u32,

    #[br(count = n_discrete as usize * components as usize)]
    pub discrete: Vec<f32>,

    #[br(temp)]
    #[bw(calc = rows_in(blurred, *components))]
    n_blurred: u32,

    #[br(count = n_blurred as usize * components as usize)]
    pub blurred: Vec<f32>,
}

fn rows_in(values: &[f32], components: u32) -> u32 {
    (values.len() / components.max(1) as usize) as u32
}

fn fit(what: &'static str, value: usize) -> std::result::Result<u32, ConfigError> {
    u32::try_from(value).map_err(|_| ConfigError::RecordOverflow { what, value })
}

/// The table of a geometry, flattened row by row
fn flatten(geometry: &ProjectionGeometry) -> Vec<f32> {
    use ProjectionGeometry::*;
    match geometry {
        ConeVec    { poses , .. } => poses.to_matrix().into_raw_vec(),
        FanFlatVec { poses , .. } => poses.to_matrix().into_raw_vec(),
        Parallel3d { angles, .. } |
        Cone       { angles, .. } => angles.clone(),
    }
}

impl GeometryRecord {

    pub fn new(scan: &ScanningObject) -> Result<Self> {
        let discrete = scan.projection_geometry();
        let blurred  = scan.reduced_geometry()?;
        let kind = GeometryKind::of(discrete);
        let (rows, cols) = discrete.detector();
        let volume = scan.volume_geometry();
        let parameters = match *discrete {
            ProjectionGeometry::Parallel3d { spacing: (sx, sy), .. } => [sx, sy, 0.0, 0.0],
            ProjectionGeometry::Cone { spacing: (sx, sy), source_origin, origin_detector, .. } =>
                [sx, sy, source_origin, origin_detector],
            _ => [0.0; 4],
        };
        Ok(Self {
            kind,
            detector_rows: fit("detector rows", rows)?,
            detector_cols: fit("detector cols", cols)?,
            volume_shape: [
                fit("volume rows"  , volume.rows)?,
                fit("volume cols"  , volume.cols)?,
                fit("volume slices", volume.slices.unwrap_or(0))?,
            ],
            desired_projections: fit("desired projections", scan.desired_projections())?,
            oversampling: fit("oversampling", scan.oversampling())?,
            parameters,
            components: kind.components(),
            discrete: flatten(discrete),
            blurred : flatten(&blurred),
        })
    }

    pub fn volume_geometry(&self) -> VolumeGeometry {
        let [rows, cols, slices] = self.volume_shape.map(|n| n as usize);
        if slices == 0 { VolumeGeometry::new_2d(rows, cols) }
        else           { VolumeGeometry::new_3d(rows, cols, slices) }
    }

    /// Geometry of all oversampled instants
    pub fn discrete_geometry(&self) -> std::result::Result<ProjectionGeometry, ConfigError> {
        self.geometry(&self.discrete)
    }

    /// Geometry of the aggregated projections
    pub fn blurred_geometry(&self) -> std::result::Result<ProjectionGeometry, ConfigError> {
        self.geometry(&self.blurred)
    }

    fn geometry(&self, values: &[f32]) -> std::result::Result<ProjectionGeometry, ConfigError> {
        let rows = self.detector_rows as usize;
        let cols = self.detector_cols as usize;
        let [sx, sy, source_origin, origin_detector] = self.parameters;
        let width = self.components as usize;
        let matrix = ArrayView2::from_shape((values.len() / width.max(1), width), values)
            .map_err(|_| ConfigError::Shape {
                what: "geometry record table",
                expected: vec![values.len() / width.max(1), width],
                actual: vec![values.len()],
            })?;
        Ok(match self.kind {
            GeometryKind::ConeVec    => ProjectionGeometry::ConeVec    { rows, cols, poses: PoseTable::from_matrix(matrix)? },
            GeometryKind::FanFlatVec => ProjectionGeometry::FanFlatVec { cells: cols, poses: PoseTable::from_matrix(matrix)? },
            GeometryKind::Parallel3d => ProjectionGeometry::Parallel3d { spacing: (sx, sy), rows, cols, angles: values.to_vec() },
            GeometryKind::Cone       => ProjectionGeometry::Cone {
                spacing: (sx, sy), rows, cols, angles: values.to_vec(), source_origin, origin_detector,
            },
        })
    }
}

impl fmt::Display for GeometryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let w = self.components.max(1) as usize;
        writeln!(f, "geometry            : {:?}", self.kind)?;
        writeln!(f, "detector            : {} x {}", self.detector_rows, self.detector_cols)?;
        writeln!(f, "volume (r, c, s)    : {:?}", self.volume_shape)?;
        writeln!(f, "desired projections : {}", self.desired_projections)?;
        writeln!(f, "oversampling        : {}", self.oversampling)?;
        writeln!(f, "discrete rows       : {}", self.discrete.len() / w)?;
        write!  (f, "blurred rows        : {}", self.blurred .len() / w)
    }
}

pub fn write_record(path: &Path, record: &GeometryRecord) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    record.write(&mut file)?;
    Ok(())
}

pub fn read_record(path: &Path) -> Result<GeometryRecord> {
    let mut file = BufReader::new(File::open(path)?);
    Ok(GeometryRecord::read(&mut file)?)
}
