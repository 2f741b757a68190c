//! Position and orientation of source and detector at one acquisition
//! instant.

use std::fmt::Debug;
use units::{Angle, Lengthf32};

use crate::{scan_axis_rotation, rotate_in_plane, Point, Point2, Vector, Vector2};

/// Anything that can be written as one row of the engine's vector-geometry
/// matrix.
pub trait Pose: Copy + Debug + PartialEq + Send + Sync + 'static {

    /// Number of `f32`s in one row of the geometry matrix
    const COMPONENTS: usize;

    /// The row, in the order expected by the engine
    fn components(&self) -> Vec<Lengthf32>;

    /// Inverse of `components`. `None` if `row` has the wrong length.
    fn from_components(row: &[Lengthf32]) -> Option<Self>;
}

// ----- 3D: cone beam ------------------------------------------------------------------------------

/// Cone-beam pose: `(src, d, u, v)`, 12 components.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose3 {
    /// X-ray source
    pub source: Point,
    /// Centre of the detector
    pub detector: Point,
    /// From the centre of detector pixel (0,0) to that of pixel (0,1)
    pub u: Vector,
    /// From the centre of detector pixel (0,0) to that of pixel (1,0)
    pub v: Vector,
}

impl Pose3 {

    pub fn new(source: Point, detector: Point, u: Vector, v: Vector) -> Self {
        Self { source, detector, u, v }
    }

    /// Rotate source, detector and both bases rigidly about the scan axis.
    pub fn rotated_about_scan_axis(self, angle: Angle) -> Self {
        let r = scan_axis_rotation(angle);
        Self {
            source  : r * self.source,
            detector: r * self.detector,
            u       : r * self.u,
            v       : r * self.v,
        }
    }

    pub fn shifted_vertically(self, dy: Lengthf32) -> Self {
        let shift = Vector::new(0.0, dy, 0.0);
        Self { source: self.source + shift, detector: self.detector + shift, ..self }
    }

    /// Detector plane normal `u × v`
    pub fn normal(&self) -> Vector { self.u.cross(&self.v) }

    /// Are `u` and `v` unit length and mutually orthogonal, within `tol`?
    pub fn is_orthonormal(&self, tol: f32) -> bool {
        (self.u.norm() - 1.0).abs() <= tol &&
        (self.v.norm() - 1.0).abs() <= tol &&
        self.u.dot(&self.v).abs()   <= tol
    }
}

impl Pose for Pose3 {
    const COMPONENTS: usize = 12;

    fn components(&self) -> Vec<Lengthf32> {
        let Self { source: s, detector: d, u, v } = self;
        vec![s.x, s.y, s.z,  d.x, d.y, d.z,  u.x, u.y, u.z,  v.x, v.y, v.z]
    }

    fn from_components(row: &[Lengthf32]) -> Option<Self> {
        match *row {
            [sx, sy, sz, dx, dy, dz, ux, uy, uz, vx, vy, vz] => Some(Self::new(
                Point ::new(sx, sy, sz),
                Point ::new(dx, dy, dz),
                Vector::new(ux, uy, uz),
                Vector::new(vx, vy, vz),
            )),
            _ => None,
        }
    }
}

// ----- 2D: fan beam -------------------------------------------------------------------------------

/// Fan-beam pose: `(src, d, u)`, 6 components.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose2 {
    pub source: Point2,
    pub detector: Point2,
    /// From the centre of detector pixel 0 to that of pixel 1
    pub u: Vector2,
}

impl Pose2 {

    pub fn new(source: Point2, detector: Point2, u: Vector2) -> Self {
        Self { source, detector, u }
    }

    /// Rotate the whole pose anticlockwise about the origin.
    pub fn rotated(self, angle: Angle) -> Self {
        let r = nalgebra::Rotation2::new(units::radian_(angle));
        Self {
            source  : rotate_in_plane(self.source, angle),
            detector: rotate_in_plane(self.detector, angle),
            u       : r * self.u,
        }
    }
}

impl Pose for Pose2 {
    const COMPONENTS: usize = 6;

    fn components(&self) -> Vec<Lengthf32> {
        let Self { source: s, detector: d, u } = self;
        vec![s.x, s.y,  d.x, d.y,  u.x, u.y]
    }

    fn from_components(row: &[Lengthf32]) -> Option<Self> {
        match *row {
            [sx, sy, dx, dy, ux, uy] => Some(Self::new(
                Point2 ::new(sx, sy),
                Point2 ::new(dx, dy),
                Vector2::new(ux, uy),
            )),
            _ => None,
        }
    }
}
