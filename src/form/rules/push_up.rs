use crate::{
    form::{
        rules::{Joints, RuleGroup},
        FeedbackSet,
    },
    pose::KeypointKind::{self, *},
};

pub(crate) const ELBOW_DEPTH: &str = "Bend elbows to about 90° at the bottom.";
pub(crate) const BODY_LINE: &str = "Keep body in a straight line from shoulders to ankles.";
pub(crate) const ELBOW_FLARE: &str = "Keep elbows at ~45° from torso (not flared out wide).";
pub(crate) const NEUTRAL_HEAD: &str = "Keep head neutral; don't crane forward.";
pub(crate) const ENGAGE_CORE: &str = "Engage core and glutes to keep body straight.";

pub(crate) struct PushUp;

impl RuleGroup for PushUp {
    fn required_joints(&self) -> &'static [KeypointKind] {
        &[LeftShoulder, LeftElbow, LeftWrist, LeftHip, LeftAnkle]
    }

    fn evaluate(&self, joints: &Joints<'_>, feedback: &mut FeedbackSet) {
        let shoulder = joints.point(LeftShoulder);
        let hip = joints.point(LeftHip);
        let ankle = joints.point(LeftAnkle);

        let elbow_angle = joints.angle(LeftShoulder, LeftElbow, LeftWrist);
        if !(70.0..=100.0).contains(&elbow_angle) {
            feedback.insert(ELBOW_DEPTH);
        }

        let heights = [shoulder.y(), hip.y(), ankle.y()];
        let lowest = heights.iter().copied().fold(f32::INFINITY, f32::min);
        let highest = heights.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        if highest - lowest > 0.15 {
            feedback.insert(BODY_LINE);
        }

        let flare = joints.angle(LeftElbow, LeftShoulder, LeftHip);
        if !(30.0..=60.0).contains(&flare) {
            feedback.insert(ELBOW_FLARE);
        }

        // nose is optional; the rule only applies when it is seen
        if joints.is_visible(Nose) && (joints.point(Nose).y() - shoulder.y()).abs() > 0.12 {
            feedback.insert(NEUTRAL_HEAD);
        }

        if (hip.y() - shoulder.y()).abs() > 0.12 || (hip.y() - ankle.y()).abs() > 0.12 {
            feedback.insert(ENGAGE_CORE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        form::rules::testing::evaluate,
        pose::{testing::frame, LandmarkFrame},
    };

    fn bottom_position(nose: (f32, f32)) -> LandmarkFrame {
        frame(&[
            (Nose, nose.0, nose.1),
            (LeftShoulder, 0.3, 0.5),
            (LeftElbow, 0.4, 0.6),
            (LeftWrist, 0.3, 0.7),
            (LeftHip, 0.6, 0.52),
            (LeftAnkle, 0.9, 0.55),
        ])
    }

    #[test]
    fn clean_frame() {
        assert!(evaluate(&PushUp, &bottom_position((0.2, 0.5))).is_empty());
    }

    #[test]
    fn head_rule_needs_visible_nose() {
        let dropped_head = bottom_position((0.2, 0.9));
        let feedback = evaluate(&PushUp, &dropped_head);
        assert_eq!(feedback.len(), 1);
        assert!(feedback.contains(NEUTRAL_HEAD));

        let hidden = dropped_head.with_visibility(Nose, 0.1);
        assert!(evaluate(&PushUp, &hidden).is_empty());
    }

    #[test]
    fn sagging_hips() {
        let f = frame(&[
            (Nose, 0.2, 0.5),
            (LeftShoulder, 0.3, 0.5),
            (LeftElbow, 0.4, 0.6),
            (LeftWrist, 0.3, 0.7),
            (LeftHip, 0.6, 0.7),
            (LeftAnkle, 0.9, 0.55),
        ]);
        let feedback = evaluate(&PushUp, &f);
        assert!(feedback.contains(BODY_LINE));
        assert!(feedback.contains(ENGAGE_CORE));
    }
}
