use crate::{
    form::{
        rules::{Joints, RuleGroup},
        FeedbackSet,
    },
    pose::KeypointKind::{self, *},
};

pub(crate) const PULL_TO_CHEST: &str = "Pull bar down to upper chest, not behind neck.";
pub(crate) const ELBOWS_BACK: &str = "Elbows should go down and slightly back, not forward.";
pub(crate) const RETRACT_SHOULDERS: &str = "Retract shoulder blades fully at bottom.";
pub(crate) const NO_LEANING: &str = "Avoid leaning back too far to cheat the movement.";
pub(crate) const STRAIGHT_WRISTS: &str = "Keep wrists straight, not bent or curled.";

pub(crate) struct LatPulldown;

impl RuleGroup for LatPulldown {
    fn required_joints(&self) -> &'static [KeypointKind] {
        &[LeftShoulder, LeftElbow, LeftWrist]
    }

    fn evaluate(&self, joints: &Joints<'_>, feedback: &mut FeedbackSet) {
        let shoulder = joints.point(LeftShoulder);
        let elbow = joints.point(LeftElbow);
        let wrist = joints.point(LeftWrist);

        if wrist.y() > shoulder.y() + 0.15 {
            feedback.insert(PULL_TO_CHEST);
        }
        if elbow.x() > shoulder.x() + 0.10 {
            feedback.insert(ELBOWS_BACK);
        }
        if (shoulder.x() - elbow.x()).abs() < 0.05 {
            feedback.insert(RETRACT_SHOULDERS);
        }
        if (shoulder.y() - wrist.y()).abs() > 0.25 {
            feedback.insert(NO_LEANING);
        }
        if (wrist.x() - elbow.x()).abs() > 0.12 {
            feedback.insert(STRAIGHT_WRISTS);
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
            (LeftElbow, 0.43, 0.55),
            (LeftWrist, 0.43, 0.45),
        ]);
        assert!(evaluate(&LatPulldown, &f).is_empty());
    }

    #[test]
    fn elbows_forward() {
        let f = frame(&[
            (LeftShoulder, 0.5, 0.5),
            (LeftElbow, 0.65, 0.55),
            (LeftWrist, 0.6, 0.45),
        ]);
        let feedback = evaluate(&LatPulldown, &f);
        assert_eq!(feedback.len(), 1);
        assert!(feedback.contains(ELBOWS_BACK));
    }

    #[test]
    fn bar_too_low() {
        let f = frame(&[
            (LeftShoulder, 0.5, 0.3),
            (LeftElbow, 0.43, 0.55),
            (LeftWrist, 0.43, 0.62),
        ]);
        let feedback = evaluate(&LatPulldown, &f);
        assert!(feedback.contains(PULL_TO_CHEST));
        assert!(feedback.contains(NO_LEANING));
    }
}
