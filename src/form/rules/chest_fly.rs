use crate::{
    form::{
        rules::{Joints, RuleGroup},
        FeedbackSet,
    },
    pose::KeypointKind::{self, *},
};

pub(crate) const SLIGHT_BEND: &str = "Keep elbows slightly bent (~10–20°) throughout.";
pub(crate) const WIDE_ARC: &str = "Arms should move in a wide arc, not overstretched.";
pub(crate) const CONSTANT_TENSION: &str = "Maintain constant tension through the full range.";
pub(crate) const HANDS_APART: &str = "Don't let hands crash together or touch at the top.";
pub(crate) const SHOULDERS_BACK: &str = "Keep shoulders pressed back and down.";

pub(crate) struct ChestFly;

impl RuleGroup for ChestFly {
    fn required_joints(&self) -> &'static [KeypointKind] {
        &[LeftShoulder, LeftElbow, LeftWrist]
    }

    fn evaluate(&self, joints: &Joints<'_>, feedback: &mut FeedbackSet) {
        let shoulder = joints.point(LeftShoulder);
        let elbow = joints.point(LeftElbow);
        let wrist = joints.point(LeftWrist);

        let elbow_angle = joints.angle(LeftShoulder, LeftElbow, LeftWrist);
        if elbow_angle > 30.0 && elbow_angle < 160.0 {
            feedback.insert(SLIGHT_BEND);
        }
        let reach = (wrist.x() - shoulder.x()).abs();
        if reach > 0.45 {
            feedback.insert(WIDE_ARC);
        }
        if (wrist.x() - elbow.x()).abs() < 0.10 {
            feedback.insert(CONSTANT_TENSION);
        }
        if reach < 0.05 {
            feedback.insert(HANDS_APART);
        }
        if shoulder.y() > elbow.y() + 0.10 {
            feedback.insert(SHOULDERS_BACK);
        }
    }
}
