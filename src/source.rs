//! Where frames come from and how landmarks are found in them.

use crate::{
    error::Error,
    pose::{Landmark, LandmarkFrame},
};
use std::{convert::TryFrom, fs::File, io::BufReader, path::Path};

/// Yields the frames of one recording in order.
pub(crate) trait FrameSource {
    type Frame;

    /// The next frame, or `None` once the recording is exhausted.
    fn read(&mut self) -> Result<Option<Self::Frame>, Error>;
}

/// Finds the pose in a frame.
pub(crate) trait LandmarkProvider<F> {
    /// `Ok(None)` means the frame holds no detectable pose.
    fn detect(&mut self, frame: &F) -> Result<Option<LandmarkFrame>, Error>;
}

/// One entry of a landmark recording.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub(crate) struct RecordedFrame {
    #[serde(default)]
    pub(crate) frame: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) timestamp: Option<f64>,
    #[serde(default)]
    pub(crate) landmarks: Option<Vec<Landmark>>,
}

impl RecordedFrame {
    #[cfg(test)]
    pub(crate) fn new(frame: usize, landmarks: Option<&LandmarkFrame>) -> Self {
        Self {
            frame,
            timestamp: None,
            landmarks: landmarks.map(|landmarks| landmarks.landmarks().to_vec()),
        }
    }
}

/// Landmarks extracted from a video ahead of time, stored as a JSON array.
#[derive(Debug)]
pub(crate) struct Recording {
    frames: std::vec::IntoIter<RecordedFrame>,
}

impl Recording {
    pub(crate) fn open(path: &Path) -> Result<Self, Error> {
        let file = File::open(path).map_err(|e| Error::OpenRecording(e, path.to_path_buf()))?;
        let frames: Vec<RecordedFrame> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::ParseRecording(e, path.to_path_buf()))?;
        Ok(Self::from_frames(frames))
    }

    pub(crate) fn from_frames(frames: Vec<RecordedFrame>) -> Self {
        Self {
            frames: frames.into_iter(),
        }
    }

    /// Frames not read yet.
    pub(crate) fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for Recording {
    type Frame = RecordedFrame;

    fn read(&mut self) -> Result<Option<Self::Frame>, Error> {
        Ok(self.frames.next())
    }
}

/// Provider for recordings whose landmarks were detected ahead of time.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Replay;

impl LandmarkProvider<RecordedFrame> for Replay {
    fn detect(&mut self, frame: &RecordedFrame) -> Result<Option<LandmarkFrame>, Error> {
        frame
            .landmarks
            .clone()
            .map(LandmarkFrame::try_from)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::{FrameSource, LandmarkProvider, RecordedFrame, Recording, Replay};
    use crate::pose::{testing::frame, KeypointKind, NUM_KEYPOINTS};
    use std::io::Write;

    fn landmark_json(count: usize) -> String {
        let landmark = r#"{"x": 0.5, "y": 0.25, "z": -0.1, "visibility": 0.9}"#;
        format!("[{}]", vec![landmark; count].join(", "))
    }

    #[test]
    fn replays_in_order() {
        let json = format!(
            r#"[
                {{"frame": 0, "timestamp": 0.0, "landmarks": null}},
                {{"frame": 1, "timestamp": 0.033, "landmarks": {}}},
                {{"frame": 2}}
            ]"#,
            landmark_json(NUM_KEYPOINTS)
        );
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let mut recording = Recording::open(file.path()).unwrap();
        assert_eq!(recording.remaining(), 3);
        let mut replay = Replay;
        let mut detected = vec![];
        while let Some(recorded) = recording.read().unwrap() {
            detected.push(replay.detect(&recorded).unwrap());
        }
        assert_eq!(detected.len(), 3);
        assert!(detected[0].is_none());
        assert!(detected[2].is_none());
        let pose = detected[1].as_ref().unwrap();
        let nose = pose.landmark(KeypointKind::Nose);
        assert_eq!((nose.x, nose.y, nose.z, nose.visibility), (0.5, 0.25, -0.1, 0.9));
    }

    #[test]
    fn partial_pose_is_an_error() {
        let json = format!(r#"{{"frame": 0, "landmarks": {}}}"#, landmark_json(17));
        let recorded: RecordedFrame = serde_json::from_str(&json).unwrap();
        assert!(Replay.detect(&recorded).is_err());
    }

    #[test]
    fn unreadable_recordings() {
        let dir = tempfile::tempdir().unwrap();
        let error = Recording::open(&dir.path().join("missing.json")).unwrap_err();
        assert!(error.to_string().starts_with("could not open recording"));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "[{").unwrap();
        assert!(Recording::open(&broken).is_err());
    }

    #[test]
    fn recorded_frame_keeps_landmarks() {
        let pose = frame(&[(KeypointKind::LeftHip, 0.4, 0.6)]);
        let recorded = RecordedFrame::new(7, Some(&pose));
        assert_eq!(Replay.detect(&recorded).unwrap(), Some(pose));
        assert_eq!(Replay.detect(&RecordedFrame::new(8, None)).unwrap(), None);
    }
}
