use crate::{
    form::{
        rules::{Joints, RuleGroup},
        FeedbackSet,
    },
    pose::KeypointKind::{self, *},
};

pub(crate) const PIN_ELBOWS: &str = "Keep elbows pinned close to your sides.";
pub(crate) const STILL_UPPER_ARMS: &str =
    "Upper arms must stay still; only forearms should move.";
pub(crate) const FULL_EXTENSION: &str =
    "Extend elbows fully at the bottom, but don't hyperextend.";
pub(crate) const NO_SWINGING: &str = "Avoid using momentum or swinging torso.";
pub(crate) const NEUTRAL_WRISTS: &str = "Keep wrists neutral, not bent or broken.";

pub(crate) struct TricepPushdown;

impl RuleGroup for TricepPushdown {
    fn required_joints(&self) -> &'static [KeypointKind] {
        &[LeftShoulder, LeftElbow, LeftWrist]
    }

    fn evaluate(&self, joints: &Joints<'_>, feedback: &mut FeedbackSet) {
        let shoulder = joints.point(LeftShoulder);
        let elbow = joints.point(LeftElbow);
        let wrist = joints.point(LeftWrist);

        if (elbow.x() - shoulder.x()).abs() > 0.08 {
            feedback.insert(PIN_ELBOWS);
        }
        if (elbow.y() - shoulder.y()).abs() > 0.10 {
            feedback.insert(STILL_UPPER_ARMS);
        }
        if joints.angle(LeftShoulder, LeftElbow, LeftWrist) < 160.0 {
            feedback.insert(FULL_EXTENSION);
        }
        if (shoulder.y() - wrist.y()).abs() > 0.25 {
            feedback.insert(NO_SWINGING);
        }
        if (wrist.x() - elbow.x()).abs() > 0.10 {
            feedback.insert(NEUTRAL_WRISTS);
        }
    }
}
