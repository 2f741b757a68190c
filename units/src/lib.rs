//! Units used to describe scan geometries.
//!
//! Angles are `uom` quantities. Lengths in a scan geometry are measured in
//! detector cells, which `uom` has no notion of, so they are plain `f32`
//! aliases living in [`todo`].

pub mod todo;

pub use uom;
pub use float_eq;

pub use uom::si::f32::{Angle, Ratio};
pub use todo::{Lengthf32, Intensityf32};

mod units {
  pub use uom::si::{angle::{degree, radian, revolution},
                    ratio::ratio,
  };
}

// Making values from float literals seems to be very long-winded, so provide
// some pithily-named convenience constructors.

/// Generate a function called NAME which returns QUANTITY by interpreting its
/// argument as UNIT
///
/// wrap!(NAME QUANTITY UNIT);
macro_rules! wrap {
  ($name:ident $quantity:ident $unit:ident ) => {
    pub fn $name(x: f32) -> $quantity { $quantity::new::<units::$unit>(x) }
  };
}

wrap!(deg    Angle     degree);
wrap!(radian Angle     radian);
wrap!(turn   Angle revolution);
wrap!(ratio  Ratio      ratio);

// Reverse direction of the above.
pub fn deg_   (x: Angle) -> f32 { x.get::<units::degree>() }
pub fn radian_(x: Angle) -> f32 { x.get::<units::radian>() }
pub fn turn_  (x: Angle) -> f32 { x.get::<units::revolution>() }
pub fn ratio_ (x: Ratio) -> f32 { x.get::<units::ratio>() }

/// Tangent of half of `angle`: the slope of the outermost ray of a fan or
/// cone beam with full opening `angle`.
pub fn half_angle_tan(angle: Angle) -> f32 { (radian_(angle) / 2.0).tan() }

#[macro_export]
macro_rules! assert_uom_eq {
  ($unit:ident, $lhs:expr, $rhs:expr, $algo:ident <= $tol:expr) => {
    $crate::float_eq::assert_float_eq!($lhs.get::<$unit>(), $rhs.get::<$unit>(), $algo <= $tol)
  };
}
