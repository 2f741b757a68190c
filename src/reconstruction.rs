//! Running one of the engine's solvers on an acquired sinogram.

use std::time::{Duration, Instant};

use log::info;
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

use crate::engine::{AlgorithmConfig, DataGeometry, Engine, ProjectionGeometry, ScopedAlgorithm, ScopedData, VolumeGeometry};
use crate::error::{ConfigError, Result};
use crate::types::{Sinogram, Volume};
use crate::utils::group_digits;

fn default_iterations() -> usize { 100 }

/// Solvers the engine is asked to run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "kebab-case", deny_unknown_fields)]
pub enum ReconstructionAlgorithm {
    /// Simultaneous iterative reconstruction technique
    Sirt { #[serde(default = "default_iterations")] iterations: usize },
    /// Conjugate gradient least squares
    Cgls { #[serde(default = "default_iterations")] iterations: usize },
    /// Filtered back-projection (FDK in 3D); a single pass
    Fbp,
    /// Primal-dual solver with total-variation regularization
    PrimalDualTv {
        #[serde(default = "default_iterations")] iterations: usize,
        lambda: f32,
    },
}

impl Default for ReconstructionAlgorithm {
    fn default() -> Self { Self::Sirt { iterations: default_iterations() } }
}

impl ReconstructionAlgorithm {

    /// Iteration budget handed to the engine
    pub fn iterations(&self) -> usize {
        use ReconstructionAlgorithm::*;
        match *self {
            Sirt { iterations } | Cgls { iterations } | PrimalDualTv { iterations, .. } => iterations,
            Fbp => 1,
        }
    }

    pub fn name(&self) -> &'static str {
        use ReconstructionAlgorithm::*;
        match self {
            Sirt         { .. } => "SIRT",
            Cgls         { .. } => "CGLS",
            Fbp                 => "FBP",
            PrimalDualTv { .. } => "PDTV",
        }
    }
}

/// Output of a reconstruction.
#[derive(Clone, Debug, PartialEq)]
pub struct Reconstruction {
    pub volume: Volume,
    /// Wall-clock time spent in the solver itself
    pub elapsed: Duration,
    /// The sinogram that was reconstructed
    pub sinogram: Sinogram,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Reconstructor {
    pub algorithm: ReconstructionAlgorithm,
}

impl Reconstructor {

    pub fn new(algorithm: ReconstructionAlgorithm) -> Self { Self { algorithm } }

    /// Reconstruct `sinogram`, acquired with `projection`, onto `volume`.
    ///
    /// Every engine handle acquired here is released before returning,
    /// whatever the outcome.
    pub fn reconstruct<E: Engine + ?Sized>(
        &self,
        engine    : &E,
        sinogram  : Sinogram,
        projection: &ProjectionGeometry,
        volume    : &VolumeGeometry,
    ) -> Result<Reconstruction> {
        check_shape("sinogram", &projection.sinogram_shape(), sinogram.shape())?;
        volume.validate()?;

        let measured = ScopedData::create(engine, DataGeometry::Projection(projection), Some(sinogram.view()))?;
        let estimate = ScopedData::create(engine, DataGeometry::Volume(volume), None)?;
        let solver   = ScopedAlgorithm::create(engine, &AlgorithmConfig {
            algorithm     : self.algorithm,
            reconstruction: estimate.id(),
            projection    : measured.id(),
        })?;

        let iterations = self.algorithm.iterations();
        let start = Instant::now();
        solver.run(iterations)?;
        let elapsed = start.elapsed();

        let reconstructed: ArrayD<f32> = estimate.get()?;
        check_shape("reconstructed volume", &volume.array_shape(), reconstructed.shape())?;
        info!("{} ({iterations} iterations) on {} projections: {} ms",
              self.algorithm.name(), projection.instants(), group_digits(elapsed.as_millis()));
        Ok(Reconstruction { volume: reconstructed, elapsed, sinogram })
    }
}

fn check_shape(what: &'static str, expected: &[usize], actual: &[usize]) -> std::result::Result<(), ConfigError> {
    if expected != actual {
        return Err(ConfigError::Shape { what, expected: expected.to_vec(), actual: actual.to_vec() })
    }
    Ok(())
}
