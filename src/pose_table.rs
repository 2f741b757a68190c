//! Ordered sequence of poses, one per acquisition instant.
//!
//! The order is acquisition-time order: row `i` of the table belongs to slice
//! `i` along the acquisition axis of the sinogram made with it. Nothing in
//! here reorders poses.

use ndarray::{Array2, ArrayView2};

use geometry::{Pose, Pose3};
use units::Angle;

use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq)]
pub struct PoseTable<P>(Vec<P>);

impl<P: Pose> PoseTable<P> {

    pub fn new(poses: Vec<P>) -> Self { Self(poses) }

    pub fn len     (&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool  { self.0.is_empty() }

    pub fn iter(&self) -> std::slice::Iter<P> { self.0.iter() }
    pub fn as_slice(&self) -> &[P] { &self.0 }
    pub fn get(&self, i: usize) -> Option<&P> { self.0.get(i) }

    /// Stage tables laid end to end, each keeping its internal order
    pub fn concat(tables: impl IntoIterator<Item = Self>) -> Self {
        Self(tables.into_iter().flat_map(|t| t.0).collect())
    }

    /// Poses at `offset`, `offset + step`, `offset + 2 step`, ...
    pub fn subsample(&self, offset: usize, step: usize) -> Self {
        Self(self.0.iter().copied().skip(offset).step_by(step.max(1)).collect())
    }

    /// One pose per block of `oversampling` consecutive poses: the one at the
    /// temporal midpoint `⌊S/2⌋` of the block.
    pub fn midpoints(&self, oversampling: usize) -> Result<Self, ConfigError> {
        check_divisible(oversampling, self.len())?;
        Ok(self.subsample(oversampling / 2, oversampling))
    }

    /// The engine's vector-geometry matrix: one row of `P::COMPONENTS` values
    /// per pose
    pub fn to_matrix(&self) -> Array2<f32> {
        let data = self.0.iter().flat_map(P::components).collect();
        // Every pose contributes exactly COMPONENTS values, so the shape is right
        Array2::from_shape_vec((self.len(), P::COMPONENTS), data)
            .unwrap_or_else(|_| unreachable!("pose components do not match P::COMPONENTS"))
    }

    pub fn from_matrix(matrix: ArrayView2<f32>) -> Result<Self, ConfigError> {
        let (rows, cols) = matrix.dim();
        if cols != P::COMPONENTS {
            return Err(ConfigError::Shape {
                what: "geometry matrix",
                expected: vec![rows, P::COMPONENTS],
                actual: vec![rows, cols],
            })
        }
        let poses = matrix.rows().into_iter()
            .map(|row| row.to_vec())
            .filter_map(|row| P::from_components(&row))
            .collect();
        Ok(Self(poses))
    }
}

impl PoseTable<Pose3> {
    /// Every pose rotated rigidly about the scan axis
    pub fn rotated_about_scan_axis(&self, angle: Angle) -> Self {
        self.0.iter().map(|p| p.rotated_about_scan_axis(angle)).collect()
    }
}

pub(crate) fn check_divisible(oversampling: usize, instants: usize) -> Result<(), ConfigError> {
    if oversampling == 0 || instants % oversampling != 0 {
        return Err(ConfigError::Oversampling { oversampling, instants })
    }
    Ok(())
}

impl<P> FromIterator<P> for PoseTable<P> {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self { Self(iter.into_iter().collect()) }
}

impl<P> IntoIterator for PoseTable<P> {
    type Item = P;
    type IntoIter = std::vec::IntoIter<P>;
    fn into_iter(self) -> Self::IntoIter { self.0.into_iter() }
}

impl<'a, P: Copy> IntoIterator for &'a PoseTable<P> {
    type Item = P;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, P>>;
    fn into_iter(self) -> Self::IntoIter { self.0.iter().copied() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geometry::{Point, Vector};
    #[allow(unused)] use pretty_assertions::{assert_eq, assert_ne};
    use rstest::rstest;

    /// Pose whose source `x` records its position in the table
    fn tagged(i: usize) -> Pose3 {
        Pose3::new(Point::new(i as f32, 0.0, 10.0),
                   Point::new(i as f32, 0.0, -1.0),
                   Vector::x(), Vector::y())
    }

    fn table(n: usize) -> PoseTable<Pose3> { (0..n).map(tagged).collect() }

    fn tags(t: &PoseTable<Pose3>) -> Vec<usize> { t.iter().map(|p| p.source.x as usize).collect() }

    #[rstest(/**/ n, s, expected,
             case(10, 10, vec![5]),
             case(20, 10, vec![5, 15]),
             case( 9,  3, vec![1, 4, 7]),
             case( 8,  2, vec![1, 3, 5, 7]),
             case( 4,  1, vec![0, 1, 2, 3]),
             case( 0,  4, vec![]),
    )]
    fn midpoint_of_each_block(n: usize, s: usize, expected: Vec<usize>) {
        assert_eq!(tags(&table(n).midpoints(s).unwrap()), expected);
    }

    #[test]
    fn midpoints_need_exact_division() {
        assert_eq!(table(10).midpoints(3),
                   Err(ConfigError::Oversampling { oversampling: 3, instants: 10 }));
        assert_eq!(table(10).midpoints(0),
                   Err(ConfigError::Oversampling { oversampling: 0, instants: 10 }));
    }

    #[test]
    fn concatenation_keeps_stage_order() {
        let joined = PoseTable::concat([table(3), table(2)]);
        assert_eq!(tags(&joined), vec![0, 1, 2, 0, 1]);
    }

    #[test]
    fn geometry_matrix() {
        let m = table(3).to_matrix();
        assert_eq!(m.dim(), (3, 12));
        assert_eq!(m[[2, 0]], 2.0);
        assert_eq!(m[[1, 5]], -1.0);
        assert_eq!(PoseTable::<Pose3>::from_matrix(m.view()).unwrap(), table(3));
    }

    #[test]
    fn matrix_with_wrong_width_is_rejected() {
        let m = Array2::<f32>::zeros((4, 6));
        assert!(matches!(PoseTable::<Pose3>::from_matrix(m.view()),
                         Err(ConfigError::Shape { .. })));
    }
}
