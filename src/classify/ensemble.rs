use crate::{
    classify::{
        forest::{Forest, ForestSpec},
        label::{self, LabelEncoder},
        sequence::{Network, NetworkSpec},
        vote, Classifier, Model, ModelKind, ModelMetadata, Settings, TrainedModel,
    },
    error::Error,
    features::{feature_matrix, FeatureKind},
    pose::LandmarkFrame,
    window::window,
};
use ndarray::ArrayView3;
use ordered_float::NotNan;
use std::{
    convert::TryFrom,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument, warn};

const METADATA_FILE: &str = "training_results.json";
const ARTIFACT_FILE: &str = "model.json";

/// Outcome of one model on one recording, or of a model that failed to load.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub(crate) struct ModelDetail {
    pub(crate) name: String,
    pub(crate) model_type: Option<ModelKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) prediction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) confidence: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
}

impl ModelDetail {
    fn voted(model: &TrainedModel, prediction: String, confidence: f32) -> Self {
        Self {
            name: model.name.clone(),
            model_type: Some(model.metadata.model_type),
            prediction: Some(prediction),
            confidence: Some(confidence),
            error: None,
        }
    }

    fn failed(name: String, model_type: Option<ModelKind>, error: &Error) -> Self {
        Self {
            name,
            model_type,
            prediction: None,
            confidence: None,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub(crate) struct Prediction {
    pub(crate) prediction: Option<String>,
    pub(crate) confidence: f32,
    pub(crate) model_details: Vec<ModelDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
    pub(crate) num_sequences: usize,
    pub(crate) video_frames: usize,
    pub(crate) frames_with_pose: usize,
}

impl Prediction {
    fn failed(error: &Error, model_details: Vec<ModelDetail>) -> Self {
        Self {
            prediction: None,
            confidence: 0.0,
            model_details,
            error: Some(error.to_string()),
            num_sequences: 0,
            video_frames: 0,
            frames_with_pose: 0,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub(crate) struct ModelSummary {
    pub(crate) name: String,
    pub(crate) model_type: ModelKind,
    pub(crate) class_names: Vec<String>,
    pub(crate) accuracy: Option<f64>,
    pub(crate) loss: Option<f64>,
}

/// What the ensemble holds, and its most accurate model.
#[derive(Debug, Clone, serde::Serialize)]
pub(crate) struct Summary {
    pub(crate) models: Vec<ModelSummary>,
    pub(crate) best_model: Option<String>,
    pub(crate) classes: Option<Vec<String>>,
    pub(crate) load_failures: Vec<ModelDetail>,
}

/// Immutable set of trained models shared by every classification.
#[derive(Debug)]
pub(crate) struct Ensemble {
    models: Vec<TrainedModel>,
    label_encoder: Option<LabelEncoder>,
    load_failures: Vec<ModelDetail>,
    sequence_length: usize,
    features: FeatureKind,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Error> {
    let contents =
        fs::read_to_string(path).map_err(|e| Error::ReadArtifact(e, path.to_path_buf()))?;
    serde_json::from_str(&contents).map_err(|e| Error::ParseArtifact(e, path.to_path_buf()))
}

fn load_model(name: &str, dir: &Path) -> Result<Option<TrainedModel>, (Option<ModelKind>, Error)> {
    let metadata: ModelMetadata = read_json(&dir.join(METADATA_FILE)).map_err(|e| (None, e))?;
    let kind = metadata.model_type;
    let artifact = dir.join(ARTIFACT_FILE);
    let model = match kind {
        ModelKind::Dummy => return Ok(None),
        ModelKind::Forest => read_json::<ForestSpec>(&artifact)
            .and_then(Forest::try_from)
            .map(Model::Forest),
        ModelKind::Sequence => read_json::<NetworkSpec>(&artifact)
            .and_then(Network::from_spec)
            .map(Model::Sequence),
    }
    .map_err(|e| (Some(kind), e))?;

    let names = metadata.class_names.len();
    if names != 0 && names != model.n_classes() {
        return Err((
            Some(kind),
            Error::ClassNameCount(model.n_classes(), names),
        ));
    }

    Ok(Some(TrainedModel {
        name: name.to_owned(),
        metadata,
        model,
    }))
}

impl Ensemble {
    pub(crate) fn new(
        models: Vec<TrainedModel>,
        label_encoder: Option<LabelEncoder>,
        sequence_length: usize,
        features: FeatureKind,
    ) -> Self {
        Self {
            models,
            label_encoder,
            load_failures: Vec::new(),
            sequence_length,
            features,
        }
    }

    /// Load every model below `settings.model_dir`.
    ///
    /// A model that fails to load is logged and reported with every
    /// prediction; it never prevents the others from loading.
    #[instrument(skip(settings), fields(model_dir = ?settings.model_dir))]
    pub(crate) fn load(settings: &Settings) -> Result<Self, Error> {
        let label_encoder = match LabelEncoder::load(&settings.label_encoder) {
            Ok(encoder) => encoder,
            Err(error) => {
                warn!(message = "ignoring label encoder", %error);
                None
            }
        };
        let mut ensemble = Self::new(
            Vec::new(),
            label_encoder,
            settings.sequence_length,
            settings.features,
        );

        if !settings.model_dir.is_dir() {
            warn!(message = "model directory not found", path = ?settings.model_dir);
            return Ok(ensemble);
        }

        let mut dirs = fs::read_dir(&settings.model_dir)
            .map_err(|e| Error::ReadModelDir(e, settings.model_dir.clone()))?
            .map(|entry| entry.map(|entry| entry.path()))
            .collect::<Result<Vec<PathBuf>, _>>()
            .map_err(|e| Error::ReadModelDir(e, settings.model_dir.clone()))?;
        dirs.retain(|path| path.is_dir());
        dirs.sort();

        for dir in dirs {
            let name = dir
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            match load_model(&name, &dir) {
                Ok(Some(model)) => {
                    info!(
                        message = "loaded model",
                        name = %model.name,
                        model_type = ?model.metadata.model_type,
                        accuracy = ?model.metadata.accuracy
                    );
                    ensemble.models.push(model);
                }
                Ok(None) => debug!(message = "skipping model without artifact", %name),
                Err((model_type, error)) => {
                    warn!(message = "failed to load model", %name, %error);
                    ensemble
                        .load_failures
                        .push(ModelDetail::failed(name, model_type, &error));
                }
            }
        }

        info!(
            message = "ensemble ready",
            models = ensemble.models.len(),
            failures = ensemble.load_failures.len(),
            label_encoder = ensemble.label_encoder.is_some()
        );
        Ok(ensemble)
    }

    pub(crate) fn len(&self) -> usize {
        self.models.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub(crate) fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    /// Classify the exercise in a whole recording.
    ///
    /// `frames` holds one entry per video frame, `None` where no pose was
    /// detected. Every failure is reported through [`Prediction::error`].
    pub(crate) fn predict(&self, frames: &[Option<LandmarkFrame>]) -> Prediction {
        let video_frames = frames.len();
        let frames_with_pose = frames.iter().filter(|frame| frame.is_some()).count();
        let fail = |error: Error| Prediction {
            video_frames,
            frames_with_pose,
            ..Prediction::failed(&error, self.load_failures.clone())
        };

        if self.is_empty() {
            return fail(Error::NoModels);
        }
        if frames_with_pose == 0 {
            return fail(Error::NoPose);
        }
        if video_frames < self.sequence_length {
            return fail(Error::VideoTooShort(self.sequence_length));
        }

        let features = feature_matrix(frames, self.features);
        let sequences = match window(features.view(), self.sequence_length) {
            Ok(sequences) => sequences,
            Err(error) => return fail(error),
        };

        Prediction {
            video_frames,
            frames_with_pose,
            ..self.classify_sequences(sequences.view())
        }
    }

    fn label(&self, model: &TrainedModel, class: usize) -> Result<String, Error> {
        label::decode(
            class,
            self.label_encoder.as_ref(),
            &model.metadata.class_names,
        )
    }

    /// Run every model over a `(count, length, dim)` batch and combine the votes.
    pub(crate) fn classify_sequences(&self, sequences: ArrayView3<f32>) -> Prediction {
        let num_sequences = sequences.dim().0;
        let mut votes = Vec::with_capacity(self.models.len());
        let mut model_details = Vec::with_capacity(self.models.len() + self.load_failures.len());

        for model in &self.models {
            let outcome = model
                .model
                .predict(sequences)
                .and_then(|predictions| vote::model_vote(&predictions))
                .and_then(|vote| Ok((self.label(model, vote.class)?, vote.confidence)));
            match outcome {
                Ok((label, confidence)) => {
                    debug!(message = "model vote", name = %model.name, %label, confidence);
                    model_details.push(ModelDetail::voted(model, label.clone(), confidence));
                    votes.push((label, confidence));
                }
                Err(error) => {
                    warn!(message = "model failed to predict", name = %model.name, %error);
                    model_details.push(ModelDetail::failed(
                        model.name.clone(),
                        Some(model.metadata.model_type),
                        &error,
                    ));
                }
            }
        }
        model_details.extend(self.load_failures.iter().cloned());

        match vote::cross_model(&votes) {
            Ok((label, confidence)) => {
                info!(message = "prediction", %label, confidence, num_sequences);
                Prediction {
                    prediction: Some(label),
                    confidence,
                    model_details,
                    error: None,
                    num_sequences,
                    video_frames: 0,
                    frames_with_pose: 0,
                }
            }
            Err(error) => Prediction {
                num_sequences,
                ..Prediction::failed(&error, model_details)
            },
        }
    }

    pub(crate) fn summary(&self) -> Summary {
        let best_model = self
            .models
            .iter()
            .filter_map(|model| {
                let accuracy = NotNan::new(model.metadata.accuracy?).ok()?;
                Some((accuracy, model))
            })
            .fold(None, |best, (accuracy, model)| match best {
                Some((best_accuracy, _)) if best_accuracy >= accuracy => best,
                _ => Some((accuracy, model)),
            })
            .map(|(_, model)| model.name.clone());

        Summary {
            models: self
                .models
                .iter()
                .map(|model| ModelSummary {
                    name: model.name.clone(),
                    model_type: model.metadata.model_type,
                    class_names: model.metadata.class_names.clone(),
                    accuracy: model.metadata.accuracy,
                    loss: model.metadata.loss,
                })
                .collect(),
            best_model,
            classes: self
                .label_encoder
                .as_ref()
                .map(|encoder| encoder.classes().to_vec()),
            load_failures: self.load_failures.clone(),
        }
    }
}
