//! Engine handles that release themselves.
//!
//! A guard is created immediately before its handle is needed and releases it
//! when dropped, whether the enclosing function returns normally, returns an
//! error through `?` or unwinds. Release failures cannot be reported from
//! `drop`, so they are logged.

use log::{error, trace};
use ndarray::{ArrayD, ArrayViewD};

use crate::error::EngineError;
use crate::types::Intensityf32;
use super::{AlgorithmConfig, AlgorithmId, DataGeometry, DataId, Engine};

/// Owns one engine data handle.
pub struct ScopedData<'e, E: Engine + ?Sized> {
    engine: &'e E,
    id: DataId,
}

impl<'e, E: Engine + ?Sized> ScopedData<'e, E> {

    pub fn create(engine: &'e E, geometry: DataGeometry<'_>, data: Option<ArrayViewD<Intensityf32>>) -> Result<Self, EngineError> {
        let id = engine.create_data(geometry, data)?;
        trace!("acquired data handle {}", id.0);
        Ok(Self { engine, id })
    }

    /// Take over a handle that the engine has already allocated
    pub fn adopt(engine: &'e E, id: DataId) -> Self {
        trace!("adopted data handle {}", id.0);
        Self { engine, id }
    }

    pub fn id(&self) -> DataId { self.id }

    pub fn get(&self) -> Result<ArrayD<Intensityf32>, EngineError> { self.engine.get_data(self.id) }
}

impl<E: Engine + ?Sized> Drop for ScopedData<'_, E> {
    fn drop(&mut self) {
        match self.engine.delete_data(self.id) {
            Ok(())  => trace!("released data handle {}", self.id.0),
            Err(e) => error!("failed to release data handle {}: {e}", self.id.0),
        }
    }
}

/// Owns one engine algorithm handle.
pub struct ScopedAlgorithm<'e, E: Engine + ?Sized> {
    engine: &'e E,
    id: AlgorithmId,
}

impl<'e, E: Engine + ?Sized> ScopedAlgorithm<'e, E> {

    pub fn create(engine: &'e E, config: &AlgorithmConfig) -> Result<Self, EngineError> {
        let id = engine.create_algorithm(config)?;
        trace!("acquired algorithm handle {}", id.0);
        Ok(Self { engine, id })
    }

    pub fn id(&self) -> AlgorithmId { self.id }

    pub fn run(&self, iterations: usize) -> Result<(), EngineError> {
        self.engine.run_algorithm(self.id, iterations)
    }
}

impl<E: Engine + ?Sized> Drop for ScopedAlgorithm<'_, E> {
    fn drop(&mut self) {
        match self.engine.delete_algorithm(self.id) {
            Ok(())  => trace!("released algorithm handle {}", self.id.0),
            Err(e) => error!("failed to release algorithm handle {}: {e}", self.id.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{Handle, RecordingEngine};
    use crate::engine::VolumeGeometry;
    use crate::reconstruction::ReconstructionAlgorithm;

    #[test]
    fn data_released_on_drop() {
        let engine = RecordingEngine::default();
        let volume = VolumeGeometry::new_2d(4, 4);
        {
            let a = ScopedData::create(&engine, DataGeometry::Volume(&volume), None).unwrap();
            let b = ScopedData::create(&engine, DataGeometry::Volume(&volume), None).unwrap();
            assert_ne!(a.id(), b.id());
            assert_eq!(engine.live(), 2);
        }
        assert_eq!(engine.live(), 0);
    }

    #[test]
    fn released_in_reverse_order_of_acquisition() {
        let engine = RecordingEngine::default();
        let volume = VolumeGeometry::new_2d(4, 4);
        {
            let data = ScopedData::create(&engine, DataGeometry::Volume(&volume), None).unwrap();
            let config = AlgorithmConfig {
                algorithm: ReconstructionAlgorithm::default(),
                reconstruction: data.id(),
                projection: data.id(),
            };
            let _algorithm = ScopedAlgorithm::create(&engine, &config).unwrap();
        }
        let released = engine.released();
        assert!(matches!(released.as_slice(), [Handle::Algorithm(_), Handle::Data(_)]));
    }

    #[test]
    fn release_failure_does_not_panic() {
        let engine = RecordingEngine::default();
        let orphan = ScopedData::adopt(&engine, DataId(999));
        drop(orphan);
        assert_eq!(engine.live(), 0);
    }

    #[test]
    fn adopted_handle_is_released() {
        let engine = RecordingEngine::default();
        let volume = VolumeGeometry::new_2d(2, 3);
        let id = engine.create_data(DataGeometry::Volume(&volume), None).unwrap();
        assert_eq!(engine.live(), 1);
        drop(ScopedData::adopt(&engine, id));
        assert_eq!(engine.live(), 0);
    }
}
