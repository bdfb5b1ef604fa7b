use crate::{
    form::{
        rules::{Joints, RuleGroup},
        FeedbackSet,
    },
    pose::KeypointKind::{self, *},
};

pub(crate) const GO_DEEPER: &str = "Go deeper: hips should drop to at least knee level.";
pub(crate) const KNEE_TRACKING: &str = "Keep knees tracking over toes; avoid caving in/out.";
pub(crate) const UPRIGHT_TORSO: &str = "Keep torso more upright and maintain a neutral spine.";
pub(crate) const HEELS_DOWN: &str = "Keep heels flat on the ground; avoid rising onto toes.";
pub(crate) const KNEES_PAST_TOES: &str =
    "Don't let knees travel excessively past toes at the bottom.";

pub(crate) struct Squat;

impl RuleGroup for Squat {
    fn required_joints(&self) -> &'static [KeypointKind] {
        &[LeftHip, LeftKnee, LeftAnkle, LeftShoulder]
    }

    fn evaluate(&self, joints: &Joints<'_>, feedback: &mut FeedbackSet) {
        let hip = joints.point(LeftHip);
        let knee = joints.point(LeftKnee);
        let ankle = joints.point(LeftAnkle);

        if hip.y() > knee.y() + 0.02 {
            feedback.insert(GO_DEEPER);
        }
        if (knee.x() - ankle.x()).abs() > 0.12 && (knee.x() < ankle.x() || knee.x() > hip.x()) {
            feedback.insert(KNEE_TRACKING);
        }
        if joints.angle(LeftShoulder, LeftHip, LeftAnkle) < 160.0 {
            feedback.insert(UPRIGHT_TORSO);
        }
        if ankle.y() < knee.y() - 0.08 {
            feedback.insert(HEELS_DOWN);
        }
        if knee.y() < ankle.y() - 0.05 {
            feedback.insert(KNEES_PAST_TOES);
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
            (LeftShoulder, 0.5, 0.2),
            (LeftHip, 0.5, 0.6),
            (LeftKnee, 0.5, 0.62),
            (LeftAnkle, 0.5, 0.64),
        ]);
        assert!(evaluate(&Squat, &f).is_empty());
    }

    #[test]
    fn shallow() {
        let f = frame(&[
            (LeftShoulder, 0.5, 0.2),
            (LeftHip, 0.5, 0.66),
            (LeftKnee, 0.5, 0.63),
            (LeftAnkle, 0.5, 0.67),
        ]);
        let feedback = evaluate(&Squat, &f);
        assert_eq!(feedback.len(), 1);
        assert!(feedback.contains(GO_DEEPER));
    }

    #[test]
    fn knees_caving() {
        let f = frame(&[
            (LeftShoulder, 0.5, 0.2),
            (LeftHip, 0.5, 0.6),
            (LeftKnee, 0.3, 0.62),
            (LeftAnkle, 0.5, 0.64),
        ]);
        let feedback = evaluate(&Squat, &f);
        assert_eq!(feedback.len(), 1);
        assert!(feedback.contains(KNEE_TRACKING));
    }

    #[test]
    fn leaning_torso() {
        let f = frame(&[
            (LeftShoulder, 0.2, 0.4),
            (LeftHip, 0.5, 0.6),
            (LeftKnee, 0.5, 0.62),
            (LeftAnkle, 0.5, 0.64),
        ]);
        assert!(evaluate(&Squat, &f).contains(UPRIGHT_TORSO));
    }
}
