//! Points, vectors and detector poses in the scanner frame.
//!
//! The frame used throughout:
//!
//! + `x`: horizontal, along the conveyor belt (the scan axis)
//! + `y`: vertical
//! + `z`: depth, along the central ray from the source towards the detector
//!        (the source sits at positive `z`)
//!
//! All lengths are in detector cells.

mod pose;
mod rotation;

pub use nalgebra;

pub use pose::{Pose, Pose2, Pose3};
pub use rotation::{scan_axis_rotation, rotate_in_plane, unit_at};

use units::Lengthf32;

pub type Point   = nalgebra::Point3 <Lengthf32>;
pub type Vector  = nalgebra::Vector3<Lengthf32>;
pub type Point2  = nalgebra::Point2 <Lengthf32>;
pub type Vector2 = nalgebra::Vector2<Lengthf32>;
