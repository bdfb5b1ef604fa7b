use crate::{
    form::{
        rules::{Joints, RuleGroup},
        FeedbackSet,
    },
    pose::KeypointKind::{self, *},
};

pub(crate) const THIGHS_DOWN: &str = "Thighs should stay glued to the seat; no hip lift.";
pub(crate) const FULL_LOCKOUT: &str = "Extend legs to full lockout without snapping.";
pub(crate) const CONTROL_LOWERING: &str = "Control the lowering phase; don't let the weight drop.";
pub(crate) const SIT_UPRIGHT: &str = "Sit upright with back against pad.";
pub(crate) const ISOLATE_QUADS: &str = "Avoid excessive swinging; isolate the quads.";

pub(crate) struct LegExtension;

impl RuleGroup for LegExtension {
    fn required_joints(&self) -> &'static [KeypointKind] {
        &[LeftHip, LeftKnee, LeftAnkle]
    }

    fn evaluate(&self, joints: &Joints<'_>, feedback: &mut FeedbackSet) {
        let hip = joints.point(LeftHip);
        let knee = joints.point(LeftKnee);
        let ankle = joints.point(LeftAnkle);

        if hip.y() < knee.y() - 0.05 {
            feedback.insert(THIGHS_DOWN);
        }
        if joints.angle(LeftHip, LeftKnee, LeftAnkle) < 160.0 {
            feedback.insert(FULL_LOCKOUT);
        }
        if (ankle.y() - knee.y()).abs() > 0.20 {
            feedback.insert(CONTROL_LOWERING);
        }
        if hip.x() < knee.x() - 0.05 {
            feedback.insert(SIT_UPRIGHT);
        }
        if (ankle.x() - knee.x()).abs() > 0.10 {
            feedback.insert(ISOLATE_QUADS);
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
            (LeftHip, 0.5, 0.7),
            (LeftKnee, 0.5, 0.5),
            (LeftAnkle, 0.5, 0.35),
        ]);
        assert!(evaluate(&LegExtension, &f).is_empty());
    }

    #[test]
    fn short_of_lockout() {
        let f = frame(&[
            (LeftHip, 0.5, 0.7),
            (LeftKnee, 0.5, 0.5),
            (LeftAnkle, 0.65, 0.5),
        ]);
        let feedback = evaluate(&LegExtension, &f);
        assert_eq!(feedback.len(), 2);
        assert!(feedback.contains(FULL_LOCKOUT));
        assert!(feedback.contains(ISOLATE_QUADS));
    }
}
