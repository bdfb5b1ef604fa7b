use crate::{error::Error, features::Point};
use std::convert::TryFrom;

/// Body keypoints in detector output order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum KeypointKind {
    Nose,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
    MouthLeft,
    MouthRight,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftPinky,
    RightPinky,
    LeftIndex,
    RightIndex,
    LeftThumb,
    RightThumb,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

impl KeypointKind {
    /// Every keypoint, in detector output order.
    pub(crate) const ALL: [KeypointKind; 33] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    #[inline]
    pub(crate) fn idx(self) -> usize {
        self as usize
    }
}

pub(crate) const NUM_KEYPOINTS: usize = KeypointKind::ALL.len();

#[derive(Debug, Copy, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub(crate) struct Landmark {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) z: f32,
    #[serde(default)]
    pub(crate) visibility: f32,
}

impl Landmark {
    /// Position in the image plane.
    #[inline]
    pub(crate) fn point(self) -> Point {
        Point::planar(self.x, self.y)
    }

    #[inline]
    pub(crate) fn position(self) -> Point {
        Point::new(self.x, self.y, self.z)
    }

    #[inline]
    pub(crate) fn is_visible(self, threshold: f32) -> bool {
        self.visibility > threshold
    }
}

pub(crate) type Landmarks = [Landmark; NUM_KEYPOINTS];

/// One detected pose: every keypoint, always complete.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LandmarkFrame {
    landmarks: Landmarks,
}

impl LandmarkFrame {
    pub(crate) fn new(landmarks: Landmarks) -> Self {
        Self { landmarks }
    }

    #[inline]
    pub(crate) fn landmark(&self, kind: KeypointKind) -> Landmark {
        self.landmarks[kind.idx()]
    }

    pub(crate) fn landmarks(&self) -> &Landmarks {
        &self.landmarks
    }

    /// Whether every one of `kinds` is seen with visibility above `threshold`.
    pub(crate) fn all_visible(&self, kinds: &[KeypointKind], threshold: f32) -> bool {
        kinds
            .iter()
            .all(|&kind| self.landmark(kind).is_visible(threshold))
    }

    #[cfg(test)]
    pub(crate) fn with_visibility(mut self, kind: KeypointKind, visibility: f32) -> Self {
        self.landmarks[kind.idx()].visibility = visibility;
        self
    }
}

impl TryFrom<Vec<Landmark>> for LandmarkFrame {
    type Error = Error;

    fn try_from(landmarks: Vec<Landmark>) -> Result<Self, Self::Error> {
        let len = landmarks.len();
        <Landmarks>::try_from(landmarks)
            .map(Self::new)
            .map_err(|_| Error::KeypointCount(NUM_KEYPOINTS, len))
    }
}

pub(crate) mod constants {
    use crate::pose::KeypointKind::{self, *};

    /// (end, vertex, end) triplets used for joint-angle features.
    pub(crate) const JOINT_ANGLE_TRIPLETS: [(KeypointKind, KeypointKind, KeypointKind); 5] = [
        (LeftShoulder, LeftElbow, LeftWrist),
        (RightShoulder, RightElbow, RightWrist),
        (LeftHip, LeftKnee, LeftAnkle),
        (RightHip, RightKnee, RightAnkle),
        (LeftShoulder, RightShoulder, RightElbow),
    ];
}
