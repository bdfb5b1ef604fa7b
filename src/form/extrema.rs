use crate::{
    features,
    pose::{KeypointKind::*, LandmarkFrame},
};

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub(crate) struct Extent {
    pub(crate) min: f32,
    pub(crate) max: f32,
}

fn extend(extent: &mut Option<Extent>, value: f32) {
    *extent = Some(match *extent {
        None => Extent {
            min: value,
            max: value,
        },
        Some(Extent { min, max }) => Extent {
            min: min.min(value),
            max: max.max(value),
        },
    });
}

/// Running extrema of the tracked joints over a recording.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub(crate) struct RangeOfMotion {
    pub(crate) knee_angle: Option<Extent>,
    pub(crate) elbow_angle: Option<Extent>,
    pub(crate) wrist_height: Option<Extent>,
}

impl RangeOfMotion {
    pub(crate) fn update(&mut self, frame: &LandmarkFrame, visibility_threshold: f32) {
        let point = |kind| frame.landmark(kind).point();

        if frame.all_visible(&[LeftHip, LeftKnee, LeftAnkle], visibility_threshold) {
            extend(
                &mut self.knee_angle,
                features::angle(point(LeftHip), point(LeftKnee), point(LeftAnkle)),
            );
        }
        if frame.all_visible(&[LeftShoulder, LeftElbow, LeftWrist], visibility_threshold) {
            extend(
                &mut self.elbow_angle,
                features::angle(point(LeftShoulder), point(LeftElbow), point(LeftWrist)),
            );
        }
        if frame.landmark(LeftWrist).is_visible(visibility_threshold) {
            extend(&mut self.wrist_height, point(LeftWrist).y());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Extent, RangeOfMotion};
    use crate::pose::{testing::frame, KeypointKind::*};
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn tracks_min_and_max() {
        let mut range = RangeOfMotion::default();
        for &wrist_y in &[0.5, 0.2, 0.8] {
            let f = frame(&[
                (LeftShoulder, 0.0, 0.0),
                (LeftElbow, 0.5, 0.0),
                (LeftWrist, 0.5, wrist_y),
            ]);
            range.update(&f, 0.3);
        }
        assert_eq!(range.wrist_height, Some(Extent { min: 0.2, max: 0.8 }));
        let elbow = range.elbow_angle.unwrap();
        assert_approx_eq!(elbow.min, 90.0, 1e-3);
        assert_approx_eq!(elbow.max, 90.0, 1e-3);
    }

    #[test]
    fn ignores_hidden_joints() {
        let mut range = RangeOfMotion::default();
        let f = frame(&[(LeftWrist, 0.5, 0.5)]).with_visibility(LeftWrist, 0.1);
        range.update(&f, 0.3);
        assert_eq!(range.wrist_height, None);
        assert_eq!(range.elbow_angle, None);
        assert!(range.knee_angle.is_some());
    }
}
