//! In-memory engine that records what is done to it.
//!
//! Its forward projection is not a physical projection; it produces values
//! that make every acquisition instant identifiable:
//!
//! ```text
//! value(row, instant, col) = (instant + 1) · Σ phantom + (row · cols + col)
//! ```
//!
//! Any single operation can be made to fail.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use ndarray::{ArrayD, ArrayViewD, IxDyn};

use crate::error::EngineError;
use crate::types::{Intensityf32, Sinogram};
use super::{AlgorithmConfig, AlgorithmId, DataGeometry, DataId, Engine, ProjectionGeometry, VolumeGeometry};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Failure {
    ForwardProject,
    CreateData,
    /// Only `create_data` calls for a volume
    CreateVolume,
    CreateAlgorithm,
    RunAlgorithm,
    GetData,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Handle {
    Data(DataId),
    Algorithm(AlgorithmId),
}

#[derive(Default)]
struct State {
    next: u32,
    data: BTreeMap<DataId, ArrayD<Intensityf32>>,
    algorithms: BTreeMap<AlgorithmId, AlgorithmConfig>,
    released: Vec<Handle>,
    forward_projections: usize,
    runs: Vec<(AlgorithmConfig, usize)>,
}

#[derive(Default)]
pub(crate) struct RecordingEngine {
    state: RefCell<State>,
    failure: Cell<Option<Failure>>,
}

impl RecordingEngine {

    pub fn failing(failure: Failure) -> Self {
        let engine = Self::default();
        engine.failure.set(Some(failure));
        engine
    }

    /// Handles currently allocated
    pub fn live(&self) -> usize {
        let state = self.state.borrow();
        state.data.len() + state.algorithms.len()
    }

    /// Handles released so far, in order of release
    pub fn released(&self) -> Vec<Handle> { self.state.borrow().released.clone() }

    pub fn forward_projections(&self) -> usize { self.state.borrow().forward_projections }

    pub fn runs(&self) -> Vec<(AlgorithmConfig, usize)> { self.state.borrow().runs.clone() }

    /// The fake projection of `phantom` through `projection`
    pub fn expected_projection(phantom: ArrayViewD<Intensityf32>, projection: &ProjectionGeometry) -> Sinogram {
        let total = phantom.sum();
        let shape = projection.sinogram_shape();
        let axis = projection.acquisition_axis().index();
        let cols = projection.detector().1;
        ArrayD::from_shape_fn(IxDyn(&shape), |ix| {
            let instant = ix[axis];
            let (row, col) = if shape.len() == 3 { (ix[0], ix[2]) } else { (0, ix[1]) };
            (instant + 1) as f32 * total + (row * cols + col) as f32
        })
    }

    fn check(&self, operation: Failure) -> Result<(), EngineError> {
        if self.failure.get() == Some(operation) {
            Err(EngineError::Failed(format!("injected failure in {operation:?}")))
        } else {
            Ok(())
        }
    }

    fn store(&self, data: ArrayD<Intensityf32>) -> DataId {
        let mut state = self.state.borrow_mut();
        state.next += 1;
        let id = DataId(state.next);
        state.data.insert(id, data);
        id
    }
}

impl Engine for RecordingEngine {

    fn forward_project(
        &self,
        volume    : ArrayViewD<Intensityf32>,
        projection: &ProjectionGeometry,
        geometry  : &VolumeGeometry,
    ) -> Result<(DataId, Sinogram), EngineError> {
        self.check(Failure::ForwardProject)?;
        geometry.check_array(volume.shape()).map_err(|e| EngineError::Geometry(e.to_string()))?;
        self.state.borrow_mut().forward_projections += 1;
        let sinogram = Self::expected_projection(volume, projection);
        let id = self.store(sinogram.clone());
        Ok((id, sinogram))
    }

    fn create_data(&self, geometry: DataGeometry<'_>, data: Option<ArrayViewD<Intensityf32>>) -> Result<DataId, EngineError> {
        self.check(Failure::CreateData)?;
        if let DataGeometry::Volume(_) = geometry { self.check(Failure::CreateVolume)? }
        let shape = geometry.array_shape();
        let array = match data {
            None => ArrayD::zeros(IxDyn(&shape)),
            Some(data) if data.shape() == shape.as_slice() => data.to_owned(),
            Some(data) => return Err(EngineError::Geometry(
                format!("data of shape {:?} for geometry of shape {shape:?}", data.shape()))),
        };
        Ok(self.store(array))
    }

    fn create_algorithm(&self, config: &AlgorithmConfig) -> Result<AlgorithmId, EngineError> {
        self.check(Failure::CreateAlgorithm)?;
        let mut state = self.state.borrow_mut();
        for id in [config.reconstruction, config.projection] {
            if !state.data.contains_key(&id) {
                return Err(EngineError::UnknownHandle { kind: "data", id: id.0 })
            }
        }
        state.next += 1;
        let id = AlgorithmId(state.next);
        state.algorithms.insert(id, *config);
        Ok(id)
    }

    /// Fills the reconstruction with the mean of the projection data
    fn run_algorithm(&self, id: AlgorithmId, iterations: usize) -> Result<(), EngineError> {
        self.check(Failure::RunAlgorithm)?;
        let mut state = self.state.borrow_mut();
        let config = *state.algorithms.get(&id)
            .ok_or(EngineError::UnknownHandle { kind: "algorithm", id: id.0 })?;
        let mean = state.data.get(&config.projection)
            .and_then(|p| p.mean())
            .unwrap_or(0.0);
        let estimate = state.data.get_mut(&config.reconstruction)
            .ok_or(EngineError::UnknownHandle { kind: "data", id: config.reconstruction.0 })?;
        estimate.fill(mean);
        state.runs.push((config, iterations));
        Ok(())
    }

    fn get_data(&self, id: DataId) -> Result<ArrayD<Intensityf32>, EngineError> {
        self.check(Failure::GetData)?;
        self.state.borrow().data.get(&id).cloned()
            .ok_or(EngineError::UnknownHandle { kind: "data", id: id.0 })
    }

    fn delete_data(&self, id: DataId) -> Result<(), EngineError> {
        let mut state = self.state.borrow_mut();
        state.data.remove(&id).ok_or(EngineError::UnknownHandle { kind: "data", id: id.0 })?;
        state.released.push(Handle::Data(id));
        Ok(())
    }

    fn delete_algorithm(&self, id: AlgorithmId) -> Result<(), EngineError> {
        let mut state = self.state.borrow_mut();
        state.algorithms.remove(&id).ok_or(EngineError::UnknownHandle { kind: "algorithm", id: id.0 })?;
        state.released.push(Handle::Algorithm(id));
        Ok(())
    }
}
