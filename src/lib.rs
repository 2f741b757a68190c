//! Inline and continuous-motion CT acquisition geometries, and the plumbing
//! that drives an external tomography engine through simulated scans.

mod exports;
pub use exports::*;

pub mod types;
pub mod error;
pub mod pose_table;
pub mod scan;
pub mod engine;
pub mod acquisition;
pub mod reconstruction;
pub mod scanning;
pub mod batch;
pub mod config;
pub mod io;
pub mod utils;
