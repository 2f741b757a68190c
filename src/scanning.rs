//! A complete simulated scan: geometry, oversampling and solver, run against
//! an engine for any number of phantoms.

use std::time::Duration;

use log::info;
use ndarray::ArrayViewD;

use crate::acquisition::{Acquisition, ContinuousAcquisition};
use crate::engine::{Engine, ProjectionGeometry, VolumeGeometry};
use crate::error::{oversampled, ConfigError, Result};
use crate::reconstruction::{ReconstructionAlgorithm, Reconstructor};
use crate::scan::{InlineScan2D, MultiStageGeometry, ScanStageConfig, SemiCircularBelt, StagePolicy};
use crate::types::{Intensityf32, Sinogram, Volume};

#[derive(Clone, Debug, PartialEq)]
pub struct ScanningObject {
    /// All `S × M` instants
    projection: ProjectionGeometry,
    volume: VolumeGeometry,
    acquisition: ContinuousAcquisition,
    reconstructor: Reconstructor,
}

/// What one scan of one phantom produces.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanOutput {
    pub volume: Volume,
    /// Time spent in the solver
    pub elapsed: Duration,
    /// The `M` aggregated projections
    pub sinogram: Sinogram,
    /// One pose (or angle) per aggregated projection
    pub geometry: ProjectionGeometry,
}

impl ScanningObject {

    /// `projection` must describe every oversampled instant
    pub fn new(
        projection  : ProjectionGeometry,
        volume      : VolumeGeometry,
        oversampling: usize,
        algorithm   : ReconstructionAlgorithm,
    ) -> Result<Self> {
        let acquisition = ContinuousAcquisition::new(oversampling)?;
        projection.validate()?;
        volume.validate()?;
        if projection.is_3d() != volume.is_3d() {
            return Err(ConfigError::Shape {
                what: "volume (dimensionality differs from projection geometry)",
                expected: vec![if projection.is_3d() { 3 } else { 2 }],
                actual  : vec![volume.array_shape().len()],
            }.into())
        }
        // Fail now rather than at the first phantom
        projection.midpoints(oversampling)?;
        Ok(Self { projection, volume, acquisition, reconstructor: Reconstructor::new(algorithm) })
    }

    /// Object carried once past the scanner, with `stage.projections`
    /// measured projections each integrated over `oversampling` instants
    pub fn inline_continuous(stage: ScanStageConfig, oversampling: usize, algorithm: ReconstructionAlgorithm) -> Result<Self> {
        let projection = stage.oversampled(oversampling)?.projection_geometry()?;
        Self::new(projection, stage.volume, oversampling, algorithm)
    }

    /// `count` passes as dictated by `policy`; each stage config gives the
    /// number of measured projections of that stage
    pub fn multi_stage(count: usize, policy: &impl StagePolicy, oversampling: usize, algorithm: ReconstructionAlgorithm) -> Result<Self> {
        let configs = (0..count)
            .map(|z| policy.stage(z).oversampled(oversampling))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let stages = MultiStageGeometry::build(count, &|z: usize| configs[z])?;
        Self::new(stages.projection_geometry(), stages.volume(), oversampling, algorithm)
    }

    pub fn inline_2d(scan: InlineScan2D, oversampling: usize, algorithm: ReconstructionAlgorithm) -> Result<Self> {
        let instants = oversampled("projections", scan.projections, oversampling)?;
        let projection = scan.with_projections(instants).projection_geometry()?;
        Self::new(projection, scan.volume, oversampling, algorithm)
    }

    pub fn semicircular(belt: SemiCircularBelt, volume: VolumeGeometry, algorithm: ReconstructionAlgorithm) -> Result<Self> {
        Self::new(belt.projection_geometry()?, volume, 1, algorithm)
    }

    pub fn projection_geometry(&self) -> &ProjectionGeometry { &self.projection }
    pub fn volume_geometry    (&self) -> &VolumeGeometry     { &self.volume }
    pub fn oversampling       (&self) -> usize               { self.acquisition.oversampling() }
    pub fn algorithm          (&self) -> ReconstructionAlgorithm { self.reconstructor.algorithm }

    /// Number of measured projections `M`
    pub fn desired_projections(&self) -> usize { self.projection.instants() / self.oversampling() }

    /// Geometry of the measured projections, as handed to the solver
    pub fn reduced_geometry(&self) -> Result<ProjectionGeometry> {
        Ok(self.projection.midpoints(self.oversampling())?)
    }

    /// Simulate the acquisition of `phantom` and reconstruct it.
    pub fn run<E: Engine + ?Sized>(&self, engine: &E, phantom: ArrayViewD<Intensityf32>) -> Result<ScanOutput> {
        info!("scanning {:?} phantom: {} instants, S = {}, {}",
              phantom.shape(), self.projection.instants(), self.oversampling(), self.reconstructor.algorithm.name());
        let Acquisition { sinogram, geometry } =
            self.acquisition.simulate(engine, phantom, &self.projection, &self.volume)?;
        let reconstruction = self.reconstructor.reconstruct(engine, sinogram, &geometry, &self.volume)?;
        Ok(ScanOutput {
            volume  : reconstruction.volume,
            elapsed : reconstruction.elapsed,
            sinogram: reconstruction.sinogram,
            geometry,
        })
    }
}
