//! Acquisition geometries: where source and detector are, relative to the
//! object, at every acquisition instant.
//!
//! + `inline`: object translating on a straight conveyor belt past a fixed
//!   cone-beam source/detector pair (the `PoseSequence` of one stage)
//! + `multistage`: several inline passes concatenated into one scan
//! + `inline2d`: 2D fan-beam version of `inline`, with optional progressive
//!   object rotation
//! + `semicircular`: 2D object riding a semi-circular belt
//! + `circular`: classic rotational scans described by a list of angles

pub mod inline;
pub mod multistage;
pub mod inline2d;
pub mod semicircular;
pub mod circular;

pub use inline::{ScanStageConfig, TraversalDirection};
pub use multistage::{AlternatingStages, MultiStageGeometry, StagePolicy};
pub use inline2d::InlineScan2D;
pub use semicircular::SemiCircularBelt;
pub use circular::{CircularCone, CircularParallel};

use units::{deg_, Angle, Lengthf32};
use crate::error::ConfigError;

/// `n` evenly spaced values from `start` to `stop`, both included. A single
/// sample sits at `start`.
pub(crate) fn linspace(start: Lengthf32, stop: Lengthf32, n: usize) -> impl Iterator<Item = Lengthf32> {
    let step = if n > 1 { (stop - start) / (n - 1) as f32 } else { 0.0 };
    (0..n).map(move |i| if n > 1 && i == n - 1 { stop } else { start + step * i as f32 })
}

/// Opening angles of fan and cone beams must lie in (0°, 180°)
pub(crate) fn check_opening_angle(angle: Angle) -> Result<Angle, ConfigError> {
    let degrees = deg_(angle);
    if degrees > 0.0 && degrees < 180.0 { Ok(angle) }
    else                                { Err(ConfigError::OpeningAngle { degrees }) }
}
