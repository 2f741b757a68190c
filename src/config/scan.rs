//! Configuration file parser for simulated scans

use std::fs;
use std::path::Path;

use serde::Deserialize;

use units::deg;

use crate::batch::OnError;
use crate::engine::VolumeGeometry;
use crate::error::{oversampled, Result};
use crate::reconstruction::ReconstructionAlgorithm;
use crate::scan::{AlternatingStages, InlineScan2D, ScanStageConfig, SemiCircularBelt, TraversalDirection};
use crate::scanning::ScanningObject;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {

    pub scan: Scan,

    #[serde(default)]
    pub reconstruction: ReconstructionAlgorithm,

    #[serde(default)]
    pub batch: Batch,
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Batch {
    #[serde(default)]
    pub on_error: OnError,
}

/// The acquisition geometry. All angles are in degrees; all lengths in
/// detector cells.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case", deny_unknown_fields)]
pub enum Scan {

    /// Object carried once past a cone-beam scanner
    Inline {
        fan_angle: f32,
        detector_cells: usize,
        /// Number of measured projections
        projections: usize,
        /// rows, cols, slices
        volume: (usize, usize, usize),
        #[serde(default = "default_inline_oversampling")]
        oversampling: usize,
        #[serde(default)]
        vertical_shift: f32,
        #[serde(default)]
        direction: TraversalDirection,
        #[serde(default)]
        rotation: f32,
    },

    /// Back-and-forth passes, raised a little on every pass
    MultiStage {
        stages: usize,
        #[serde(default = "default_multistage_fan_angle")]
        fan_angle: f32,
        detector_cells: usize,
        /// Measured projections per stage
        projections: usize,
        volume: (usize, usize, usize),
        #[serde(default = "one")]
        oversampling: usize,
        #[serde(default = "default_base_shift")]
        base_shift: f32,
        #[serde(default = "default_shift_step")]
        shift_step: f32,
        #[serde(default)]
        base_rotation: f32,
        #[serde(default)]
        rotation_step: f32,
    },

    /// Fan-beam inline scan, object optionally spinning as it goes
    Inline2d {
        fan_angle: f32,
        detector_cells: usize,
        projections: usize,
        /// rows, cols
        volume: (usize, usize),
        #[serde(default = "one")]
        oversampling: usize,
        #[serde(default)]
        total_rotation: f32,
        #[serde(default)]
        direction: TraversalDirection,
    },

    SemiCircular {
        radius: f32,
        projections: usize,
        source_distance: f32,
        detector_distance: f32,
        fan_angle: f32,
        volume: (usize, usize),
    },

    CircularParallel {
        angles: usize,
        #[serde(default = "default_parallel_arc")]
        arc: f32,
        /// rows, cols
        detector: (usize, usize),
        volume: (usize, usize, usize),
        #[serde(default = "one")]
        oversampling: usize,
    },

    CircularCone {
        angles: usize,
        #[serde(default = "default_cone_arc")]
        arc: f32,
        detector: (usize, usize),
        source_origin: f32,
        origin_detector: f32,
        volume: (usize, usize, usize),
        #[serde(default = "one")]
        oversampling: usize,
    },
}

fn one() -> usize { 1 }
fn default_inline_oversampling() -> usize { 10 }
fn default_multistage_fan_angle() -> f32 { 60.0 }
fn default_base_shift() -> f32 { -50.0 }
fn default_shift_step() -> f32 {  25.0 }
fn default_parallel_arc() -> f32 {  90.0 }
fn default_cone_arc    () -> f32 { 180.0 }

impl Config {

    /// Build the scan described by this configuration. All geometry
    /// validation happens here.
    pub fn scanning_object(&self) -> Result<ScanningObject> {
        use Scan::*;
        let algorithm = self.reconstruction;
        let volume_3d = |(rows, cols, slices): (usize, usize, usize)| VolumeGeometry::new_3d(rows, cols, slices);
        match self.scan {
            Inline { fan_angle, detector_cells, projections, volume, oversampling, vertical_shift, direction, rotation } => {
                let stage = ScanStageConfig::new(deg(fan_angle), detector_cells, projections, volume_3d(volume))
                    .with_vertical_shift(vertical_shift)
                    .with_direction(direction)
                    .with_rotation(deg(rotation));
                ScanningObject::inline_continuous(stage, oversampling, algorithm)
            }
            MultiStage { stages, fan_angle, detector_cells, projections, volume, oversampling,
                         base_shift, shift_step, base_rotation, rotation_step } => {
                let template = ScanStageConfig::new(deg(fan_angle), detector_cells, projections, volume_3d(volume));
                let policy = AlternatingStages {
                    base_shift, shift_step,
                    base_rotation: deg(base_rotation),
                    rotation_step: deg(rotation_step),
                    ..AlternatingStages::new(template)
                };
                ScanningObject::multi_stage(stages, &policy, oversampling, algorithm)
            }
            Inline2d { fan_angle, detector_cells, projections, volume: (rows, cols), oversampling, total_rotation, direction } => {
                let scan = InlineScan2D::new(deg(fan_angle), detector_cells, projections, VolumeGeometry::new_2d(rows, cols))
                    .with_total_rotation(deg(total_rotation))
                    .with_direction(direction);
                ScanningObject::inline_2d(scan, oversampling, algorithm)
            }
            SemiCircular { radius, projections, source_distance, detector_distance, fan_angle, volume: (rows, cols) } => {
                let belt = SemiCircularBelt::new(radius, projections, source_distance, detector_distance, deg(fan_angle));
                ScanningObject::semicircular(belt, VolumeGeometry::new_2d(rows, cols), algorithm)
            }
            CircularParallel { angles, arc, detector, volume, oversampling } => {
                let instants = oversampled("angles", angles, oversampling)?;
                let scan = crate::scan::CircularParallel::new(instants, deg(arc), detector);
                ScanningObject::new(scan.projection_geometry()?, volume_3d(volume), oversampling, algorithm)
            }
            CircularCone { angles, arc, detector, source_origin, origin_detector, volume, oversampling } => {
                let instants = oversampled("angles", angles, oversampling)?;
                let scan = crate::scan::CircularCone {
                    arc: deg(arc),
                    ..crate::scan::CircularCone::new(instants, detector, source_origin, origin_detector)
                };
                ScanningObject::new(scan.projection_geometry()?, volume_3d(volume), oversampling, algorithm)
            }
        }
    }
}

pub fn parse_config(text: &str) -> Result<Config> { Ok(toml::from_str(text)?) }

pub fn read_config_file(path: &Path) -> Result<Config> {
    let text = fs::read_to_string(path)?;
    parse_config(&text)
}
