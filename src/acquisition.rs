//! Simulation of continuous-motion acquisition.
//!
//! A real detector integrates while the object moves. This is modelled by
//! oversampling the motion `S` times, projecting at every one of the `S × M`
//! instants, and summing each block of `S` consecutive projections into one
//! measured projection. The pose assigned to a measured projection is the
//! one at the temporal midpoint of its block.

use std::ops::Range;

use log::{debug, info};
use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn, Slice};
use rayon::prelude::*;

use crate::engine::{Engine, ProjectionGeometry, ScopedData, VolumeGeometry};
use crate::error::{positive, ConfigError, EngineError, Result};
use crate::pose_table::check_divisible;
use crate::types::{Intensityf32, Sinogram};

/// Raw instants that make up measured instant `j`
pub fn block(j: usize, oversampling: usize) -> Range<usize> {
    j * oversampling .. (j + 1) * oversampling
}

/// Sum every `oversampling` consecutive slices of `raw` along `axis`.
///
/// Slice `j` of the result is the sum of raw slices `jS .. jS + S`. No
/// normalization is applied.
pub fn aggregate(raw: ArrayViewD<Intensityf32>, axis: Axis, oversampling: usize) -> std::result::Result<Sinogram, ConfigError> {
    if axis.index() >= raw.ndim() {
        return Err(ConfigError::Shape {
            what: "raw sinogram (acquisition axis out of range)",
            expected: vec![axis.index() + 1],
            actual: vec![raw.ndim()],
        })
    }
    let instants = raw.len_of(axis);
    check_divisible(oversampling, instants)?;

    let mut shape = raw.shape().to_vec();
    shape[axis.index()] = instants / oversampling;
    let mut aggregated = ArrayD::zeros(IxDyn(&shape));
    aggregated.axis_iter_mut(axis)
        .into_par_iter()
        .enumerate()
        .for_each(|(j, mut slice)| {
            let b = block(j, oversampling);
            let window = raw.slice_axis(axis, Slice::from(b.start as isize .. b.end as isize));
            slice.assign(&window.sum_axis(axis));
        });
    Ok(aggregated)
}

/// Result of a simulated continuous acquisition.
#[derive(Clone, Debug, PartialEq)]
pub struct Acquisition {
    /// `M` measured projections
    pub sinogram: Sinogram,
    /// One pose (or angle) per measured projection
    pub geometry: ProjectionGeometry,
}

/// Continuous-motion acquisition with `S`-fold oversampling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContinuousAcquisition {
    oversampling: usize,
}

impl ContinuousAcquisition {

    pub fn new(oversampling: usize) -> std::result::Result<Self, ConfigError> {
        Ok(Self { oversampling: positive("oversampling", oversampling)? })
    }

    pub fn oversampling(&self) -> usize { self.oversampling }

    /// Checks that can be made without touching the engine
    pub fn validate(&self, projection: &ProjectionGeometry, volume: &VolumeGeometry, phantom: &[usize]) -> std::result::Result<(), ConfigError> {
        projection.validate()?;
        volume.validate()?;
        check_divisible(self.oversampling, projection.instants())?;
        volume.check_array(phantom)
    }

    /// Project `phantom` at every instant of `projection` (which holds `S × M`
    /// instants) in a single engine call, and reduce to `M` measured
    /// projections.
    pub fn simulate<E: Engine + ?Sized>(
        &self,
        engine    : &E,
        phantom   : ArrayViewD<Intensityf32>,
        projection: &ProjectionGeometry,
        volume    : &VolumeGeometry,
    ) -> Result<Acquisition> {
        self.validate(projection, volume, phantom.shape())?;
        let s = self.oversampling;
        debug!("forward projecting {} instants ({} geometry)", projection.instants(), projection.kind());

        let (id, raw) = engine.forward_project(phantom, projection, volume)?;
        let raw_handle = ScopedData::adopt(engine, id);
        let expected = projection.sinogram_shape();
        if raw.shape() != expected.as_slice() {
            return Err(EngineError::Failed(format!(
                "forward projection has shape {:?}, expected {expected:?}", raw.shape())).into())
        }
        drop(raw_handle);

        let sinogram = aggregate(raw.view(), projection.acquisition_axis(), s)?;
        let geometry = projection.midpoints(s)?;
        info!("continuous acquisition: {} raw instants -> {} projections (S = {s})",
              projection.instants(), geometry.instants());
        Ok(Acquisition { sinogram, geometry })
    }
}
