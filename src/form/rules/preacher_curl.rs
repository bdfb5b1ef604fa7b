use crate::{
    form::{
        rules::{Joints, RuleGroup},
        FeedbackSet,
    },
    pose::KeypointKind::{self, *},
};

pub(crate) const ARMS_ON_PAD: &str =
    "Upper arms should stay glued to the pad; no movement at the shoulder.";
pub(crate) const FULL_RANGE: &str = "Curl through full range (fully extend and contract).";
pub(crate) const STRAIGHT_WRISTS: &str =
    "Wrists remain straight; don't let them break at the bottom.";
pub(crate) const CONTROL_NEGATIVE: &str = "Control the negative; no dropping the weight.";
pub(crate) const NO_JERKING: &str = "Avoid jerking or using hips/back to lift.";

pub(crate) struct PreacherCurl;

impl RuleGroup for PreacherCurl {
    fn required_joints(&self) -> &'static [KeypointKind] {
        &[LeftShoulder, LeftElbow, LeftWrist]
    }

    fn evaluate(&self, joints: &Joints<'_>, feedback: &mut FeedbackSet) {
        let shoulder = joints.point(LeftShoulder);
        let elbow = joints.point(LeftElbow);
        let wrist = joints.point(LeftWrist);

        if (shoulder.x() - elbow.x()).abs() > 0.08 {
            feedback.insert(ARMS_ON_PAD);
        }
        let elbow_angle = joints.angle(LeftShoulder, LeftElbow, LeftWrist);
        if !(30.0..=160.0).contains(&elbow_angle) {
            feedback.insert(FULL_RANGE);
        }
        if (wrist.x() - elbow.x()).abs() > 0.10 {
            feedback.insert(STRAIGHT_WRISTS);
        }
        if (wrist.y() - elbow.y()).abs() > 0.20 {
            feedback.insert(CONTROL_NEGATIVE);
        }
        if (elbow.y() - shoulder.y()).abs() > 0.10 {
            feedback.insert(NO_JERKING);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{form::rules::testing::evaluate, pose::testing::frame};

    #[test]
    fn clean_frame() {
        let f = frame(&[
            (LeftShoulder, 0.5, 0.5),
            (LeftElbow, 0.45, 0.58),
            (LeftWrist, 0.4, 0.45),
        ]);
        assert!(evaluate(&PreacherCurl, &f).is_empty());
    }

    #[test]
    fn dropped_weight() {
        let f = frame(&[
            (LeftShoulder, 0.5, 0.5),
            (LeftElbow, 0.45, 0.58),
            (LeftWrist, 0.45, 0.85),
        ]);
        let feedback = evaluate(&PreacherCurl, &f);
        assert_eq!(feedback.len(), 1);
        assert!(feedback.contains(CONTROL_NEGATIVE));
    }
}
