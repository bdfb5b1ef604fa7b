use crate::{
    form::{
        rules::{Joints, RuleGroup},
        FeedbackSet,
    },
    pose::KeypointKind::{self, *},
};

pub(crate) const BELOW_SHOULDER: &str = "Raise arms just below shoulder level; not higher.";
pub(crate) const SLIGHT_BEND: &str = "Maintain a slight bend at the elbows throughout.";
pub(crate) const WRISTS_IN_LINE: &str = "Keep wrists in line with elbows; avoid tilting.";
pub(crate) const NO_MOMENTUM: &str = "No swinging or momentum; slow and controlled lift.";
pub(crate) const LEAD_WITH_ELBOWS: &str = "Focus on leading with the elbows, not the hands.";

pub(crate) struct LateralRaise;

impl RuleGroup for LateralRaise {
    fn required_joints(&self) -> &'static [KeypointKind] {
        &[LeftShoulder, LeftElbow, LeftWrist]
    }

    fn evaluate(&self, joints: &Joints<'_>, feedback: &mut FeedbackSet) {
        let shoulder = joints.point(LeftShoulder);
        let elbow = joints.point(LeftElbow);
        let wrist = joints.point(LeftWrist);

        if wrist.y() < shoulder.y() - 0.05 {
            feedback.insert(BELOW_SHOULDER);
        }
        if joints.angle(LeftShoulder, LeftElbow, LeftWrist) < 150.0 {
            feedback.insert(SLIGHT_BEND);
        }
        if (wrist.y() - elbow.y()).abs() > 0.08 {
            feedback.insert(WRISTS_IN_LINE);
        }
        if (shoulder.x() - wrist.x()).abs() > 0.20 {
            feedback.insert(NO_MOMENTUM);
        }
        if elbow.y() > wrist.y() {
            feedback.insert(LEAD_WITH_ELBOWS);
        }
    }
}
