//! Rule-based form feedback.
//!
//! A [`FormSession`] is fed one landmark frame at a time. Frames where the
//! exercise's required joints are all visible run through that exercise's
//! rule group; triggered messages accumulate in a deduplicated set that is
//! turned into a single [`FormReport`] once the recording ends.

use crate::{error::Error, pose::LandmarkFrame};
use std::collections::{btree_set, BTreeSet};
use structopt::StructOpt;
use tracing::{debug, trace};

pub(crate) mod exercise;
mod extrema;
pub(crate) mod rules;

pub(crate) use exercise::ExerciseKey;
pub(crate) use extrema::RangeOfMotion;
use rules::Joints;

pub(crate) const DEFAULT_VISIBILITY_THRESHOLD: f32 = 0.3;
pub(crate) const DEFAULT_MIN_VALID_FRAMES: usize = 5;
pub(crate) const DEFAULT_FRAME_STRIDE: usize = 2;

pub(crate) const GOOD_FORM: &str = "Good form!";

#[derive(Debug, Clone, Copy, StructOpt)]
pub(crate) struct Settings {
    /// Keypoints at or below this visibility are treated as unseen.
    #[structopt(long, default_value = "0.3")]
    pub(crate) visibility_threshold: f32,

    /// Fewer detected poses than this is reported as a failed detection.
    #[structopt(long, default_value = "5")]
    pub(crate) min_valid_frames: usize,

    /// Evaluate every n-th frame of the recording.
    #[structopt(long, default_value = "2")]
    pub(crate) frame_stride: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            visibility_threshold: DEFAULT_VISIBILITY_THRESHOLD,
            min_valid_frames: DEFAULT_MIN_VALID_FRAMES,
            frame_stride: DEFAULT_FRAME_STRIDE,
        }
    }
}

/// Deduplicated, lexicographically ordered feedback messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FeedbackSet(BTreeSet<&'static str>);

impl FeedbackSet {
    pub(crate) fn insert(&mut self, message: &'static str) -> bool {
        self.0.insert(message)
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, message: &str) -> bool {
        self.0.contains(message)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn iter(&self) -> btree_set::Iter<'_, &'static str> {
        self.0.iter()
    }
}

/// Run the rule group of `exercise` against `frame`, adding any triggered
/// messages to `feedback`.
///
/// Returns `false` without evaluating anything if one of the group's required
/// joints is not visible.
pub(crate) fn evaluate_frame(
    exercise: ExerciseKey,
    frame: &LandmarkFrame,
    visibility_threshold: f32,
    feedback: &mut FeedbackSet,
) -> bool {
    let group = exercise.rule_group();
    if !frame.all_visible(group.required_joints(), visibility_threshold) {
        return false;
    }
    group.evaluate(&Joints::new(frame, visibility_threshold), feedback);
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Outcome {
    /// Too few frames contained a pose.
    DetectionFailed,
    UnsupportedExercise,
    /// Poses were found but the exercise's key joints never were.
    InsufficientVisibility,
    GoodForm,
    Corrections,
}

#[derive(Debug, Clone, serde::Serialize)]
pub(crate) struct FormReport {
    pub(crate) exercise: String,
    pub(crate) outcome: Outcome,
    pub(crate) feedback: Vec<String>,
    pub(crate) frames_seen: usize,
    pub(crate) frames: usize,
    pub(crate) valid_frames: usize,
    pub(crate) evaluated_frames: usize,
    pub(crate) range_of_motion: RangeOfMotion,
}

/// Accumulates form feedback across the frames of one recording.
#[derive(Debug)]
pub(crate) struct FormSession {
    exercise: String,
    key: Option<ExerciseKey>,
    settings: Settings,
    feedback: FeedbackSet,
    range_of_motion: RangeOfMotion,
    frames_seen: usize,
    frames: usize,
    valid_frames: usize,
    evaluated_frames: usize,
}

impl FormSession {
    pub(crate) fn new(exercise: &str, settings: Settings) -> Result<Self, Error> {
        if settings.frame_stride == 0 {
            return Err(Error::ZeroFrameStride);
        }
        Ok(Self {
            exercise: exercise.to_owned(),
            key: ExerciseKey::parse(exercise),
            settings,
            feedback: FeedbackSet::default(),
            range_of_motion: RangeOfMotion::default(),
            frames_seen: 0,
            frames: 0,
            valid_frames: 0,
            evaluated_frames: 0,
        })
    }

    pub(crate) fn key(&self) -> Option<ExerciseKey> {
        self.key
    }

    /// Whether the next frame of the recording falls on the stride.
    pub(crate) fn wants_next_frame(&self) -> bool {
        self.frames_seen % self.settings.frame_stride == 0
    }

    /// Account for a frame that is passed over by the stride.
    pub(crate) fn skip_frame(&mut self) {
        self.frames_seen += 1;
    }

    /// Feed one processed frame; `None` means no pose was found in it.
    pub(crate) fn evaluate_frame(&mut self, frame: Option<&LandmarkFrame>) {
        self.frames_seen += 1;
        self.frames += 1;
        let frame = match frame {
            Some(frame) => frame,
            None => return,
        };
        self.valid_frames += 1;

        let threshold = self.settings.visibility_threshold;
        self.range_of_motion.update(frame, threshold);

        if let Some(key) = self.key {
            if evaluate_frame(key, frame, threshold, &mut self.feedback) {
                self.evaluated_frames += 1;
            } else {
                trace!(
                    message = "required joints not visible",
                    exercise = key.key(),
                    frame = self.frames_seen - 1
                );
            }
        }
    }

    pub(crate) fn finish(self) -> FormReport {
        let (outcome, feedback) = if self.valid_frames < self.settings.min_valid_frames {
            (
                Outcome::DetectionFailed,
                vec![format!(
                    "Could not detect a valid {} in the video. Please try again.",
                    self.exercise
                )],
            )
        } else if self.key.is_none() {
            (
                Outcome::UnsupportedExercise,
                vec![format!(
                    "Exercise '{}' is not supported for form analysis.",
                    self.exercise
                )],
            )
        } else if self.evaluated_frames == 0 {
            (
                Outcome::InsufficientVisibility,
                vec![format!(
                    "Key joints were not clearly visible for {}. Please re-record with your full body in frame.",
                    self.exercise
                )],
            )
        } else if self.feedback.is_empty() {
            (Outcome::GoodForm, vec![GOOD_FORM.to_owned()])
        } else {
            (
                Outcome::Corrections,
                self.feedback.iter().map(|&m| m.to_owned()).collect(),
            )
        };

        debug!(
            message = "form analysis finished",
            exercise = %self.exercise,
            ?outcome,
            frames_seen = self.frames_seen,
            frames = self.frames,
            valid_frames = self.valid_frames,
            evaluated_frames = self.evaluated_frames
        );

        FormReport {
            exercise: self.exercise,
            outcome,
            feedback,
            frames_seen: self.frames_seen,
            frames: self.frames,
            valid_frames: self.valid_frames,
            evaluated_frames: self.evaluated_frames,
            range_of_motion: self.range_of_motion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        evaluate_frame, rules::squat, ExerciseKey, FeedbackSet, FormSession, Outcome, Settings,
        GOOD_FORM,
    };
    use crate::pose::{testing::frame, KeypointKind::*, LandmarkFrame};

    fn clean_squat() -> LandmarkFrame {
        frame(&[
            (LeftShoulder, 0.5, 0.2),
            (LeftHip, 0.5, 0.6),
            (LeftKnee, 0.5, 0.62),
            (LeftAnkle, 0.5, 0.64),
        ])
    }

    fn shallow_squat() -> LandmarkFrame {
        frame(&[
            (LeftShoulder, 0.5, 0.2),
            (LeftHip, 0.5, 0.66),
            (LeftKnee, 0.5, 0.63),
            (LeftAnkle, 0.5, 0.67),
        ])
    }

    fn run(exercise: &str, frames: &[Option<LandmarkFrame>]) -> super::FormReport {
        let settings = Settings {
            frame_stride: 1,
            ..Settings::default()
        };
        let mut session = FormSession::new(exercise, settings).unwrap();
        for frame in frames {
            session.evaluate_frame(frame.as_ref());
        }
        session.finish()
    }

    #[test]
    fn feedback_set_is_sorted_and_deduplicated() {
        let mut feedback = FeedbackSet::default();
        assert!(feedback.insert("b"));
        assert!(feedback.insert("a"));
        assert!(!feedback.insert("b"));
        assert_eq!(feedback.iter().copied().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn skipped_when_required_joint_hidden() {
        let hidden = shallow_squat().with_visibility(LeftKnee, 0.1);
        let mut feedback = FeedbackSet::default();
        assert!(!evaluate_frame(ExerciseKey::Squat, &hidden, 0.3, &mut feedback));
        assert!(feedback.is_empty());
        assert!(evaluate_frame(
            ExerciseKey::Squat,
            &shallow_squat(),
            0.3,
            &mut feedback
        ));
        assert!(feedback.contains(squat::GO_DEEPER));
    }

    #[test]
    fn no_pose_anywhere_is_a_detection_failure() {
        let report = run("squat", &vec![None; 100]);
        assert_eq!(report.outcome, Outcome::DetectionFailed);
        assert_eq!(
            report.feedback,
            vec!["Could not detect a valid squat in the video. Please try again."]
        );
        assert_eq!(report.frames, 100);
        assert_eq!(report.valid_frames, 0);
    }

    #[test]
    fn clean_squat_is_good_form() {
        let report = run("Squat", &vec![Some(clean_squat()); 20]);
        assert_eq!(report.outcome, Outcome::GoodForm);
        assert_eq!(report.feedback, vec![GOOD_FORM]);
        assert_eq!(report.evaluated_frames, 20);
    }

    #[test]
    fn messages_are_reported_once() {
        let mut frames = vec![Some(clean_squat()); 10];
        frames.extend(vec![Some(shallow_squat()); 10]);
        let report = run("squat", &frames);
        assert_eq!(report.outcome, Outcome::Corrections);
        assert_eq!(report.feedback, vec![squat::GO_DEEPER]);
    }

    #[test]
    fn few_poses_is_a_detection_failure_even_with_feedback() {
        let mut frames = vec![None; 50];
        frames.extend(vec![Some(shallow_squat()); 4]);
        let report = run("squat", &frames);
        assert_eq!(report.outcome, Outcome::DetectionFailed);
    }

    #[test]
    fn unsupported_exercise() {
        let report = run("deadlift", &vec![Some(clean_squat()); 10]);
        assert_eq!(report.outcome, Outcome::UnsupportedExercise);
        assert_eq!(report.evaluated_frames, 0);
        assert!(report.feedback[0].contains("deadlift"));
    }

    #[test]
    fn hidden_key_joints_are_not_good_form() {
        let hidden = clean_squat().with_visibility(LeftAnkle, 0.0);
        let report = run("squat", &vec![Some(hidden); 10]);
        assert_eq!(report.outcome, Outcome::InsufficientVisibility);
        assert_ne!(report.feedback, vec![GOOD_FORM]);
        assert_eq!(report.valid_frames, 10);
    }

    #[test]
    fn stride_selects_every_other_frame() {
        let mut session = FormSession::new("squat", Settings::default()).unwrap();
        let mut picked = vec![];
        for index in 0..7 {
            if session.wants_next_frame() {
                picked.push(index);
                session.evaluate_frame(Some(&clean_squat()));
            } else {
                session.skip_frame();
            }
        }
        assert_eq!(picked, vec![0, 2, 4, 6]);
        let report = session.finish();
        assert_eq!(report.frames_seen, 7);
        assert_eq!(report.frames, 4);
        assert_eq!(report.outcome, Outcome::DetectionFailed);
    }

    #[test]
    fn zero_stride_is_rejected() {
        let settings = Settings {
            frame_stride: 0,
            ..Settings::default()
        };
        assert!(FormSession::new("squat", settings).is_err());
    }

    #[test]
    fn range_of_motion_is_reported() {
        let report = run("squat", &vec![Some(clean_squat()); 5]);
        assert!(report.range_of_motion.knee_angle.is_some());
    }
}
