//! motiontrace Pose Model
//!
//! Defines the core data contracts for a motion analysis run:
//! - **Skeleton:** Named body joints with normalized coordinates for one frame
//! - **Motion:** The fixed set of 13 motion categories and per-frame flag sets
//! - **Stream:** The JSONL pose stream consumed from an external pose estimator
//! - **Activity:** The per-second activity log produced by a run
//!
//! x/y coordinates are normalized to `[0.0, 1.0]` relative to the frame;
//! z is a unitless relative depth where more negative means closer.

pub mod activity;
pub mod motion;
pub mod skeleton;
pub mod stream;

pub use activity::*;
pub use motion::*;
pub use skeleton::*;
pub use stream::*;
