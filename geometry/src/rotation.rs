use nalgebra::{Rotation2, Rotation3, Vector3};
use units::{radian_, Angle};

use crate::{Point2, Vector2};

/// Rigid rotation about the horizontal scan axis (`x`).
///
/// The (depth, vertical) = (`z`, `y`) pair of any point or vector is rotated
/// by `angle` as a standard 2D rotation:
///
/// ```text
/// z' = z cos θ - y sin θ
/// y' = z sin θ + y cos θ
/// ```
///
/// which is a rotation by `-θ` about `+x` in nalgebra's convention.
pub fn scan_axis_rotation(angle: Angle) -> Rotation3<f32> {
    Rotation3::from_axis_angle(&Vector3::x_axis(), -radian_(angle))
}

/// Anticlockwise rotation of a 2D point about the origin.
pub fn rotate_in_plane(p: Point2, angle: Angle) -> Point2 {
    Rotation2::new(radian_(angle)) * p
}

/// Unit vector at `angle` anticlockwise from `+x`.
pub fn unit_at(angle: Angle) -> Vector2 {
    let a = radian_(angle);
    Vector2::new(a.cos(), a.sin())
}
