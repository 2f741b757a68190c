pub use crate::types::{Volume, Sinogram, Lengthf32, Intensityf32};
pub use crate::error::{ConfigError, EngineError, Error, Result};
pub use crate::pose_table::PoseTable;

pub use geometry::{Pose, Pose2, Pose3, Point, Vector, Point2, Vector2};

pub use units::{Angle, deg, deg_, radian, radian_};
