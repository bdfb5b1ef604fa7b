use crate::{
    form::{
        rules::{Joints, RuleGroup},
        FeedbackSet,
    },
    pose::KeypointKind::{self, *},
};

pub(crate) const HIP_HINGE: &str =
    "Hinge at the hips and maintain a fixed torso angle (~45–90° bent over).";
pub(crate) const REVERSE_ARC: &str = "Arms move outward in a reverse arc; don't swing up.";
pub(crate) const FIXED_ELBOWS: &str = "Elbows slightly bent and stay fixed throughout.";
pub(crate) const NO_MOMENTUM: &str = "No momentum; control both lifting and lowering.";
pub(crate) const NO_SHRUG: &str = "Squeeze rear delts at the top without shrugging.";

pub(crate) struct RearDeltFly;

impl RuleGroup for RearDeltFly {
    fn required_joints(&self) -> &'static [KeypointKind] {
        &[LeftShoulder, LeftElbow, LeftWrist, LeftHip]
    }

    fn evaluate(&self, joints: &Joints<'_>, feedback: &mut FeedbackSet) {
        let shoulder = joints.point(LeftShoulder);
        let elbow = joints.point(LeftElbow);
        let wrist = joints.point(LeftWrist);

        let torso = joints.angle(LeftShoulder, LeftHip, LeftWrist);
        if !(45.0..=90.0).contains(&torso) {
            feedback.insert(HIP_HINGE);
        }
        let reach = (wrist.x() - shoulder.x()).abs();
        if reach < 0.10 {
            feedback.insert(REVERSE_ARC);
        }
        if joints.angle(LeftShoulder, LeftElbow, LeftWrist) < 150.0 {
            feedback.insert(FIXED_ELBOWS);
        }
        if reach > 0.20 {
            feedback.insert(NO_MOMENTUM);
        }
        if (shoulder.y() - elbow.y()).abs() < 0.05 {
            feedback.insert(NO_SHRUG);
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
            (LeftShoulder, 0.3, 0.45),
            (LeftElbow, 0.39, 0.35),
            (LeftWrist, 0.48, 0.25),
            (LeftHip, 0.5, 0.6),
        ]);
        assert!(evaluate(&RearDeltFly, &f).is_empty());
    }

    #[test]
    fn shrugging() {
        let f = frame(&[
            (LeftShoulder, 0.3, 0.45),
            (LeftElbow, 0.39, 0.43),
            (LeftWrist, 0.48, 0.25),
            (LeftHip, 0.5, 0.6),
        ]);
        assert!(evaluate(&RearDeltFly, &f).contains(NO_SHRUG));
    }

    #[test]
    fn upright_torso() {
        let f = frame(&[
            (LeftShoulder, 0.5, 0.2),
            (LeftElbow, 0.55, 0.3),
            (LeftWrist, 0.65, 0.4),
            (LeftHip, 0.5, 0.6),
        ]);
        assert!(evaluate(&RearDeltFly, &f).contains(HIP_HINGE));
    }
}
