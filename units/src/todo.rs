/// Units which are simply type aliases for `f32` rather than having an
/// implementation as a `uom` `Quantity`.
///
/// Scan geometries measure distance in detector-cell-equivalent units (the
/// pitch of one detector element is 1), which is not an SI unit, so we use
/// plain `f32`s, but still want some clues in the source as to what they
/// represent.

pub type Lengthf32    = f32; // in detector cells
pub type Intensityf32 = f32; // line integral of attenuation, or sum thereof
