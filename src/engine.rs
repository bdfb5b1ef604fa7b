use crate::{
    classify::{Ensemble, Prediction},
    error::Error,
    form::{self, exercise::ALL_EXERCISES, FormReport, FormSession},
    pose::LandmarkFrame,
    source::{FrameSource, LandmarkProvider},
};
use indicatif::ProgressBar;
use num_traits::cast::ToPrimitive;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

pub(crate) struct Engine<P> {
    provider: P,
    pub(crate) timing: Timing,
}

#[derive(Debug, Copy, Clone, Default)]
pub(crate) struct Timing {
    pub(crate) detection: Duration,
    /// Frames that went through landmark detection.
    pub(crate) frames: usize,
}

impl Timing {
    /// `None` until some detection time has been measured.
    fn detection_fps(&self) -> Result<Option<f64>, Error> {
        let seconds = self.detection.as_secs_f64();
        if seconds <= 0.0 {
            return Ok(None);
        }
        let frames = self.frames.to_f64().ok_or(Error::ConvertToF64)?;
        Ok(Some(frames / seconds))
    }

    fn progress_message(&self) -> Result<String, Error> {
        let fps = match self.detection_fps()? {
            Some(fps) => format!("{:.1}", fps),
            None => "-".to_owned(),
        };
        Ok(format!("frames: {}, detection FPS: {}", self.frames, fps))
    }
}

impl<P> Engine<P> {
    pub(crate) fn new(provider: P) -> Self {
        Self {
            provider,
            timing: Default::default(),
        }
    }

    fn detect<F>(
        &mut self,
        frame: &F,
        progress: Option<&ProgressBar>,
    ) -> Result<Option<LandmarkFrame>, Error>
    where
        P: LandmarkProvider<F>,
    {
        let start_detection = Instant::now();
        let landmarks = self.provider.detect(frame)?;
        self.timing.detection += start_detection.elapsed();
        self.timing.frames += 1;

        if let Some(progress) = progress {
            progress.set_message(self.timing.progress_message()?);
            progress.inc(1);
        }
        Ok(landmarks)
    }

    /// Detect landmarks in every frame of `source`, keeping frame order.
    pub(crate) fn landmarks<S>(
        &mut self,
        source: &mut S,
        progress: Option<&ProgressBar>,
    ) -> Result<Vec<Option<LandmarkFrame>>, Error>
    where
        S: FrameSource,
        P: LandmarkProvider<S::Frame>,
    {
        let mut landmarks = Vec::new();
        while let Some(frame) = source.read()? {
            landmarks.push(self.detect(&frame, progress)?);
        }
        Ok(landmarks)
    }

    /// Run the form rules of `exercise` over a recording.
    ///
    /// Frames passed over by the stride never reach the landmark provider.
    #[instrument(skip(self, source, settings, progress))]
    pub(crate) fn analyze_form<S>(
        &mut self,
        source: &mut S,
        exercise: &str,
        settings: form::Settings,
        progress: Option<&ProgressBar>,
    ) -> Result<FormReport, Error>
    where
        S: FrameSource,
        P: LandmarkProvider<S::Frame>,
    {
        let mut session = FormSession::new(exercise, settings)?;
        match session.key() {
            Some(key) => info!(message = "analyzing form", exercise = key.key()),
            None => warn!(
                message = "exercise has no form rules",
                exercise,
                supported = ?ALL_EXERCISES.iter().map(|key| key.key()).collect::<Vec<_>>()
            ),
        }

        while let Some(frame) = source.read()? {
            if session.wants_next_frame() {
                let landmarks = self.detect(&frame, progress)?;
                session.evaluate_frame(landmarks.as_ref());
            } else {
                session.skip_frame();
            }
        }

        let report = session.finish();
        info!(
            message = "form analysis complete",
            outcome = ?report.outcome,
            feedback = report.feedback.len(),
            detection_ms = self.timing.detection.as_millis() as u64
        );
        Ok(report)
    }

    /// Classify the exercise performed in a recording.
    #[instrument(skip(self, source, ensemble, progress))]
    pub(crate) fn predict_exercise<S>(
        &mut self,
        source: &mut S,
        ensemble: &Ensemble,
        progress: Option<&ProgressBar>,
    ) -> Result<Prediction, Error>
    where
        S: FrameSource,
        P: LandmarkProvider<S::Frame>,
    {
        let landmarks = self.landmarks(source, progress)?;
        Ok(ensemble.predict(&landmarks))
    }
}
