//! Pose metric extraction.
//!
//! Reduces a skeleton to the handful of quantities the frame classifier
//! looks at: hip depth, wrist separation, and both wrist positions.

use std::ops::Sub;

use motiontrace_pose_model::skeleton::{Joint, Landmark, Skeleton};
use serde::{Deserialize, Serialize};

/// Joints that must be present for a frame to be classified.
pub const REQUIRED_JOINTS: [Joint; 4] = [
    Joint::LeftHip,
    Joint::RightHip,
    Joint::LeftWrist,
    Joint::RightWrist,
];

/// A point in normalized pose space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length over all three axes.
    pub fn norm(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Distance in the image plane, ignoring depth.
    pub fn planar_distance(self, other: Vec3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl From<&Landmark> for Vec3 {
    fn from(landmark: &Landmark) -> Self {
        Vec3::new(landmark.x, landmark.y, landmark.z)
    }
}

/// Derived metrics for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameMetrics {
    /// Mean z of the two hips.
    pub hip_depth: f64,
    /// xy distance between the wrists.
    pub wrist_separation: f64,
    pub left_wrist_pos: Vec3,
    pub right_wrist_pos: Vec3,
}

/// Why a skeleton could not be reduced to metrics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetricsError {
    #[error("incomplete skeleton: missing {}", format_joints(.missing))]
    MissingJoints { missing: Vec<Joint> },
}

fn format_joints(joints: &[Joint]) -> String {
    joints
        .iter()
        .map(|j| j.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Extract classifier metrics from a skeleton.
///
/// Pure: the same skeleton always yields the same metrics. Fails when any of
/// [`REQUIRED_JOINTS`] is absent, listing every missing joint.
pub fn extract(skeleton: &Skeleton) -> Result<FrameMetrics, MetricsError> {
    let (Some(left_hip), Some(right_hip), Some(left_wrist), Some(right_wrist)) = (
        skeleton.joint(Joint::LeftHip),
        skeleton.joint(Joint::RightHip),
        skeleton.joint(Joint::LeftWrist),
        skeleton.joint(Joint::RightWrist),
    ) else {
        let missing = REQUIRED_JOINTS
            .iter()
            .copied()
            .filter(|joint| skeleton.joint(*joint).is_none())
            .collect();
        return Err(MetricsError::MissingJoints { missing });
    };

    let left_wrist_pos = Vec3::from(left_wrist);
    let right_wrist_pos = Vec3::from(right_wrist);

    Ok(FrameMetrics {
        hip_depth: (left_hip.z + right_hip.z) / 2.0,
        wrist_separation: left_wrist_pos.planar_distance(right_wrist_pos),
        left_wrist_pos,
        right_wrist_pos,
    })
}
