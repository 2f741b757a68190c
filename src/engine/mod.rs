//! The boundary to the external tomography engine.
//!
//! Forward projection and the iterative solvers live in the engine, which
//! is driven through the [`Engine`] trait. The engine hands out integer
//! handles for the data and algorithm objects it owns; these must be released
//! explicitly, which the guards in [`scoped`] take care of.

pub mod geometry;
pub mod scoped;

#[cfg(test)]
pub(crate) mod testing;

pub use self::geometry::{ProjectionGeometry, VolumeGeometry};
pub use scoped::{ScopedAlgorithm, ScopedData};

use ndarray::{ArrayD, ArrayViewD};

use crate::error::EngineError;
use crate::reconstruction::ReconstructionAlgorithm;
use crate::types::{Intensityf32, Sinogram};

/// Handle to a data object (volume or sinogram) living in the engine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataId(pub u32);

/// Handle to an algorithm object living in the engine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlgorithmId(pub u32);

/// What a data object is, and how it is laid out.
#[derive(Clone, Copy, Debug)]
pub enum DataGeometry<'g> {
    Volume    (&'g VolumeGeometry),
    Projection(&'g ProjectionGeometry),
}

impl DataGeometry<'_> {
    /// Shape of the array backing a data object of this geometry
    pub fn array_shape(&self) -> Vec<usize> {
        match self {
            Self::Volume    (v) => v.array_shape(),
            Self::Projection(p) => p.sinogram_shape(),
        }
    }
}

/// Everything an engine needs to set up a solver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlgorithmConfig {
    pub algorithm: ReconstructionAlgorithm,
    /// Volume the solver writes its estimate into
    pub reconstruction: DataId,
    /// Measured sinogram
    pub projection: DataId,
}

/// Operations of a tomography engine, as used by this crate.
///
/// All calls are blocking. Implementations must not retry failed operations;
/// any failure is reported as an [`EngineError`] and propagated unchanged.
pub trait Engine {

    /// Project `volume` through `projection`, returning the handle of the
    /// data object holding the result, together with a host copy of it.
    /// The caller owns the handle.
    fn forward_project(
        &self,
        volume    : ArrayViewD<Intensityf32>,
        projection: &ProjectionGeometry,
        geometry  : &VolumeGeometry,
    ) -> Result<(DataId, Sinogram), EngineError>;

    /// Allocate a data object; zero-filled when `data` is `None`.
    fn create_data(
        &self,
        geometry: DataGeometry<'_>,
        data: Option<ArrayViewD<Intensityf32>>,
    ) -> Result<DataId, EngineError>;

    fn create_algorithm(&self, config: &AlgorithmConfig) -> Result<AlgorithmId, EngineError>;

    fn run_algorithm(&self, id: AlgorithmId, iterations: usize) -> Result<(), EngineError>;

    /// Host copy of the contents of a data object
    fn get_data(&self, id: DataId) -> Result<ArrayD<Intensityf32>, EngineError>;

    fn delete_data(&self, id: DataId) -> Result<(), EngineError>;

    fn delete_algorithm(&self, id: AlgorithmId) -> Result<(), EngineError>;
}
