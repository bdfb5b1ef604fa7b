use crate::{
    form::{
        rules::{Joints, RuleGroup},
        FeedbackSet,
    },
    pose::KeypointKind::{self, *},
};

pub(crate) const FIXED_TORSO: &str =
    "Torso should be leaned forward but fixed; no bouncing or swinging.";
pub(crate) const PULL_WITH_ELBOWS: &str = "Pull with elbows; elbows should go past the torso.";
pub(crate) const SQUEEZE_BLADES: &str = "Squeeze shoulder blades together at the top.";
pub(crate) const NEUTRAL_SPINE: &str = "Keep spine neutral; no excessive rounding or arching.";
pub(crate) const NO_SHRUG: &str = "Don't shrug shoulders; use lats and mid-back.";

pub(crate) struct UpperBackRow;

impl RuleGroup for UpperBackRow {
    fn required_joints(&self) -> &'static [KeypointKind] {
        &[LeftShoulder, LeftElbow, LeftWrist, LeftHip]
    }

    fn evaluate(&self, joints: &Joints<'_>, feedback: &mut FeedbackSet) {
        let shoulder = joints.point(LeftShoulder);
        let elbow = joints.point(LeftElbow);
        let hip = joints.point(LeftHip);

        let torso = joints.angle(LeftShoulder, LeftHip, LeftWrist);
        if !(120.0..=160.0).contains(&torso) {
            feedback.insert(FIXED_TORSO);
        }
        if elbow.x() < hip.x() {
            feedback.insert(PULL_WITH_ELBOWS);
        }
        if (shoulder.x() - elbow.x()).abs() < 0.05 {
            feedback.insert(SQUEEZE_BLADES);
        }
        if (shoulder.y() - hip.y()).abs() > 0.20 {
            feedback.insert(NEUTRAL_SPINE);
        }
        if shoulder.y() < elbow.y() - 0.10 {
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
            (LeftShoulder, 0.6, 0.45),
            (LeftElbow, 0.5, 0.5),
            (LeftWrist, 0.2, 0.6),
            (LeftHip, 0.4, 0.6),
        ]);
        assert!(evaluate(&UpperBackRow, &f).is_empty());
    }

    #[test]
    fn elbows_short_of_torso() {
        let f = frame(&[
            (LeftShoulder, 0.6, 0.45),
            (LeftElbow, 0.3, 0.5),
            (LeftWrist, 0.2, 0.6),
            (LeftHip, 0.4, 0.6),
        ]);
        let feedback = evaluate(&UpperBackRow, &f);
        assert_eq!(feedback.len(), 1);
        assert!(feedback.contains(PULL_WITH_ELBOWS));
    }

    #[test]
    fn upright_torso() {
        let f = frame(&[
            (LeftShoulder, 0.4, 0.2),
            (LeftElbow, 0.5, 0.4),
            (LeftWrist, 0.4, 0.5),
            (LeftHip, 0.4, 0.6),
        ]);
        let feedback = evaluate(&UpperBackRow, &f);
        assert!(feedback.contains(FIXED_TORSO));
        assert!(feedback.contains(NEUTRAL_SPINE));
    }
}
