pub mod landmark;

pub use landmark::{Landmark, LandmarkType, Pose};
