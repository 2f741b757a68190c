pub mod record;

pub use record::{read_record, write_record, GeometryKind, GeometryRecord};
