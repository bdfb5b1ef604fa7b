//! Per-exercise form rules.
//!
//! Every rule reads the left side of the body in normalized image
//! coordinates, where y grows downward.

use crate::{
    features::{self, Point},
    form::FeedbackSet,
    pose::{KeypointKind, LandmarkFrame},
};

pub(crate) mod chest_fly;
pub(crate) mod lat_pulldown;
pub(crate) mod lateral_raise;
pub(crate) mod leg_extension;
pub(crate) mod preacher_curl;
pub(crate) mod push_up;
pub(crate) mod rear_delt_fly;
pub(crate) mod shoulder_press;
pub(crate) mod squat;
pub(crate) mod tricep_pushdown;
pub(crate) mod upper_back_row;

pub(crate) trait RuleGroup: Sync {
    /// Joints that must all be visible for the group to run on a frame.
    fn required_joints(&self) -> &'static [KeypointKind];

    /// Check one frame, adding a message to `feedback` for every rule it breaks.
    fn evaluate(&self, joints: &Joints<'_>, feedback: &mut FeedbackSet);
}

/// Planar view of a frame for rule evaluation.
pub(crate) struct Joints<'a> {
    frame: &'a LandmarkFrame,
    visibility_threshold: f32,
}

impl<'a> Joints<'a> {
    pub(crate) fn new(frame: &'a LandmarkFrame, visibility_threshold: f32) -> Self {
        Self {
            frame,
            visibility_threshold,
        }
    }

    #[inline]
    pub(crate) fn point(&self, kind: KeypointKind) -> Point {
        self.frame.landmark(kind).point()
    }

    pub(crate) fn is_visible(&self, kind: KeypointKind) -> bool {
        self.frame
            .landmark(kind)
            .is_visible(self.visibility_threshold)
    }

    /// Angle in degrees at `vertex`.
    pub(crate) fn angle(&self, a: KeypointKind, vertex: KeypointKind, c: KeypointKind) -> f32 {
        features::angle(self.point(a), self.point(vertex), self.point(c))
    }
}
