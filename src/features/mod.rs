//! Per-frame geometric features.
//!
//! Every frame maps to exactly one feature row, including frames where no
//! pose was detected (those become zero rows), so row `i` of a feature
//! matrix always describes frame `i` of the recording.

use crate::{
    error::Error,
    pose::{self, LandmarkFrame, NUM_KEYPOINTS},
};
use ndarray::{Array1, Array2};
use std::str::FromStr;

mod point;
pub(crate) use point::Point;

/// x, y, z and visibility for every keypoint.
pub(crate) const RAW_FEATURE_DIM: usize = NUM_KEYPOINTS * 4;

/// Returned by [`angle`] when either arm of the angle has zero length.
pub(crate) const DEGENERATE_ANGLE: f32 = 0.0;

/// Angle in degrees at `vertex` formed by the segments to `a` and `c`.
///
/// The result is always within `[0, 180]`. Coincident points or non-finite
/// coordinates yield [`DEGENERATE_ANGLE`].
pub(crate) fn angle(a: Point, vertex: Point, c: Point) -> f32 {
    let ba = a - vertex;
    let bc = c - vertex;
    let denominator = ba.norm() * bc.norm();
    if !(denominator > f32::EPSILON) {
        return DEGENERATE_ANGLE;
    }
    let cosine = ba.dot(bc) / denominator;
    if !cosine.is_finite() {
        return DEGENERATE_ANGLE;
    }
    // floating point drift can push |cosine| slightly past one
    cosine.clamp(-1.0, 1.0).acos().to_degrees()
}

pub(crate) fn landmarks_to_vector(frame: Option<&LandmarkFrame>) -> Array1<f32> {
    match frame {
        None => Array1::zeros(RAW_FEATURE_DIM),
        Some(frame) => frame
            .landmarks()
            .iter()
            .flat_map(|landmark| {
                [landmark.x, landmark.y, landmark.z, landmark.visibility]
            })
            .collect(),
    }
}

pub(crate) fn joint_angles(frame: Option<&LandmarkFrame>) -> Array1<f32> {
    let triplets = &pose::constants::JOINT_ANGLE_TRIPLETS;
    match frame {
        None => Array1::zeros(triplets.len()),
        Some(frame) => triplets
            .iter()
            .map(|&(a, vertex, c)| {
                angle(
                    frame.landmark(a).position(),
                    frame.landmark(vertex).position(),
                    frame.landmark(c).position(),
                )
            })
            .collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FeatureKind {
    /// Raw coordinates and visibility of every keypoint.
    Raw,
    /// Angles at the joints listed in [`pose::constants::JOINT_ANGLE_TRIPLETS`].
    JointAngles,
}

impl Default for FeatureKind {
    fn default() -> Self {
        Self::Raw
    }
}

impl FromStr for FeatureKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(Self::Raw),
            "angles" => Ok(Self::JointAngles),
            other => Err(Error::UnknownFeatureKind(other.to_owned())),
        }
    }
}

impl FeatureKind {
    pub(crate) fn dim(self) -> usize {
        match self {
            Self::Raw => RAW_FEATURE_DIM,
            Self::JointAngles => pose::constants::JOINT_ANGLE_TRIPLETS.len(),
        }
    }

    pub(crate) fn extract(self, frame: Option<&LandmarkFrame>) -> Array1<f32> {
        match self {
            Self::Raw => landmarks_to_vector(frame),
            Self::JointAngles => joint_angles(frame),
        }
    }
}

/// One feature row per frame, in frame order.
pub(crate) fn feature_matrix(frames: &[Option<LandmarkFrame>], kind: FeatureKind) -> Array2<f32> {
    let mut matrix = Array2::zeros((frames.len(), kind.dim()));
    for (mut row, frame) in matrix.outer_iter_mut().zip(frames) {
        if let Some(frame) = frame {
            row.assign(&kind.extract(Some(frame)));
        }
    }
    matrix
}
