use crate::{
    form::{
        rules::{Joints, RuleGroup},
        FeedbackSet,
    },
    pose::KeypointKind::{self, *},
};

pub(crate) const ELBOWS_BELOW_WRISTS: &str = "Start with elbows below wrists, press straight up.";
pub(crate) const LOCKOUT_OVER_SHOULDERS: &str =
    "Lockout should be directly over shoulders, not behind head.";
pub(crate) const NO_ARCHING: &str = "Avoid arching lower back; keep core tight.";
pub(crate) const ELBOW_FLARE: &str = "Elbows should not flare excessively.";
pub(crate) const VERTICAL_PATH: &str = "Keep the bar/dumbbells moving in a vertical line.";

pub(crate) struct ShoulderPress;

impl RuleGroup for ShoulderPress {
    fn required_joints(&self) -> &'static [KeypointKind] {
        &[LeftShoulder, LeftElbow, LeftWrist]
    }

    fn evaluate(&self, joints: &Joints<'_>, feedback: &mut FeedbackSet) {
        let shoulder = joints.point(LeftShoulder);
        let elbow = joints.point(LeftElbow);
        let wrist = joints.point(LeftWrist);

        if elbow.y() < wrist.y() {
            feedback.insert(ELBOWS_BELOW_WRISTS);
        }
        if wrist.y() > shoulder.y() - 0.05 {
            feedback.insert(LOCKOUT_OVER_SHOULDERS);
        }
        // the arching and bar-path checks share a measurement
        let drift = (wrist.x() - shoulder.x()).abs();
        if drift > 0.10 {
            feedback.insert(NO_ARCHING);
            feedback.insert(VERTICAL_PATH);
        }
        if (elbow.x() - shoulder.x()).abs() > 0.10 {
            feedback.insert(ELBOW_FLARE);
        }
    }
}
