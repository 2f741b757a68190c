//! Error types.
//!
//! Configuration problems are detected before the engine is touched; engine
//! failures are passed through unchanged. Nothing is ever retried.

use thiserror::Error;

use crate::engine::VolumeGeometry;

/// Invalid geometry or run parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("fan/cone opening angle must lie strictly between 0° and 180°, got {degrees}°")]
    OpeningAngle { degrees: f32 },

    #[error("{what} must be positive, got {value}")]
    NotPositive { what: &'static str, value: f64 },

    #[error("{what} must be finite, got {value}")]
    NotFinite { what: &'static str, value: f32 },

    #[error("pose table is empty")]
    EmptyPoseTable,

    #[error("a multi-stage scan needs at least one stage")]
    NoStages,

    #[error("oversampling factor {oversampling} does not divide the {instants} acquisition instants")]
    Oversampling { oversampling: usize, instants: usize },

    #[error("shape mismatch for {what}: expected {expected:?}, got {actual:?}")]
    Shape { what: &'static str, expected: Vec<usize>, actual: Vec<usize> },

    #[error("stage {stage} has {actual} detector cells where stage 0 has {expected}")]
    InconsistentStages { stage: usize, expected: usize, actual: usize },

    #[error("stage {stage} has volume {actual:?} where stage 0 has {expected:?}")]
    InconsistentStageVolume { stage: usize, expected: VolumeGeometry, actual: VolumeGeometry },

    #[error("{count} {what} oversampled {oversampling} times overflows")]
    TooManyInstants { what: &'static str, count: usize, oversampling: usize },

    #[error("{what} = {value} does not fit in a geometry record")]
    RecordOverflow { what: &'static str, value: usize },
}

/// Failure reported by the reconstruction engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("unknown {kind} handle {id}")]
    UnknownHandle { kind: &'static str, id: u32 },

    #[error("engine rejected geometry: {0}")]
    Geometry(String),

    #[error("engine does not support {0}")]
    Unsupported(String),

    #[error("engine failure: {0}")]
    Failed(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("malformed geometry record: {0}")]
    Record(#[from] binrw::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

// ----- Validation helpers used by the geometry builders --------------------------------------------

pub(crate) fn positive(what: &'static str, value: usize) -> std::result::Result<usize, ConfigError> {
    if value > 0 { Ok(value) }
    else         { Err(ConfigError::NotPositive { what, value: value as f64 }) }
}

pub(crate) fn positive_f32(what: &'static str, value: f32) -> std::result::Result<f32, ConfigError> {
    let value = finite(what, value)?;
    if value > 0.0 { Ok(value) }
    else           { Err(ConfigError::NotPositive { what, value: value as f64 }) }
}

/// Number of acquisition instants when each of `count` is sampled `oversampling` times
pub(crate) fn oversampled(what: &'static str, count: usize, oversampling: usize) -> std::result::Result<usize, ConfigError> {
    count.checked_mul(oversampling)
        .ok_or(ConfigError::TooManyInstants { what, count, oversampling })
}

pub(crate) fn finite(what: &'static str, value: f32) -> std::result::Result<f32, ConfigError> {
    if value.is_finite() { Ok(value) }
    else                 { Err(ConfigError::NotFinite { what, value }) }
}
