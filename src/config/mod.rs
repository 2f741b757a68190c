pub mod scan;

pub use scan::{read_config_file, parse_config, Config, Scan};
