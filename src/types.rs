use ndarray::ArrayD;

pub use units::{Intensityf32, Lengthf32};

/// Reconstruction volume: `(slices, rows, cols)` or `(rows, cols)`
pub type Volume = ArrayD<Intensityf32>;

/// Projection data: `(detector row, instant, detector col)` or
/// `(instant, detector col)`
pub type Sinogram = ArrayD<Intensityf32>;
