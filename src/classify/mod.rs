//! Exercise classification over windows of per-frame features.

use crate::{error::Error, features::FeatureKind, window::DEFAULT_SEQUENCE_LENGTH};
use ndarray::{Array1, Array2, ArrayView3};
use std::path::PathBuf;
use structopt::StructOpt;

mod ensemble;
pub(crate) mod forest;
mod label;
pub(crate) mod sequence;
mod vote;

pub(crate) use ensemble::{Ensemble, Prediction};

pub(crate) const DEFAULT_MODEL_DIR: &str = "extracted_data/trained_models";
pub(crate) const DEFAULT_LABEL_ENCODER: &str = "extracted_data/label_encoder.json";

#[derive(Debug, Clone, StructOpt)]
pub(crate) struct Settings {
    /// Directory holding one sub-directory per trained model.
    #[structopt(long, default_value = "extracted_data/trained_models", parse(from_os_str))]
    pub(crate) model_dir: PathBuf,

    /// Class list shared by all models.
    #[structopt(
        long,
        default_value = "extracted_data/label_encoder.json",
        parse(from_os_str)
    )]
    pub(crate) label_encoder: PathBuf,

    /// Number of consecutive frames per classifier input.
    #[structopt(long, default_value = "30")]
    pub(crate) sequence_length: usize,

    /// Per-frame features the models were trained on: raw or angles.
    #[structopt(long, default_value = "raw")]
    pub(crate) features: FeatureKind,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            label_encoder: PathBuf::from(DEFAULT_LABEL_ENCODER),
            sequence_length: DEFAULT_SEQUENCE_LENGTH,
            features: FeatureKind::default(),
        }
    }
}

/// Per-sequence output of a classifier.
#[derive(Debug, Clone)]
pub(crate) struct Predictions {
    pub(crate) classes: Array1<usize>,
    /// One probability row per sequence, when the model provides them.
    pub(crate) probabilities: Option<Array2<f32>>,
}

pub(crate) trait Classifier {
    /// Predict a class index for every sequence in a `(count, length, dim)` batch.
    fn classify(&self, sequences: ArrayView3<f32>) -> Result<Array1<usize>, Error>;

    /// Class probabilities for every sequence, if the model can produce them.
    fn class_probabilities(&self, sequences: ArrayView3<f32>)
        -> Result<Option<Array2<f32>>, Error>;

    fn predict(&self, sequences: ArrayView3<f32>) -> Result<Predictions, Error> {
        Ok(Predictions {
            classes: self.classify(sequences)?,
            probabilities: self.class_probabilities(sequences)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub(crate) enum ModelKind {
    /// Tree ensemble over flattened sequences.
    #[serde(rename = "random_forest", alias = "forest")]
    Forest,
    /// Recurrent network over whole sequences.
    #[serde(rename = "lstm", alias = "sequence")]
    Sequence,
    /// Placeholder entry without a usable artifact.
    #[serde(rename = "dummy")]
    Dummy,
}

/// Contents of a model's `training_results.json`.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub(crate) struct ModelMetadata {
    pub(crate) model_type: ModelKind,
    #[serde(default)]
    pub(crate) class_names: Vec<String>,
    #[serde(default)]
    pub(crate) accuracy: Option<f64>,
    #[serde(default)]
    pub(crate) loss: Option<f64>,
}

#[derive(Debug)]
pub(crate) enum Model {
    Forest(forest::Forest),
    Sequence(sequence::Network),
}

impl Model {
    pub(crate) fn n_classes(&self) -> usize {
        match self {
            Self::Forest(m) => m.n_classes(),
            Self::Sequence(m) => m.n_classes(),
        }
    }
}

impl Classifier for Model {
    fn classify(&self, sequences: ArrayView3<f32>) -> Result<Array1<usize>, Error> {
        match self {
            Self::Forest(m) => m.classify(sequences),
            Self::Sequence(m) => m.classify(sequences),
        }
    }

    fn class_probabilities(
        &self,
        sequences: ArrayView3<f32>,
    ) -> Result<Option<Array2<f32>>, Error> {
        match self {
            Self::Forest(m) => m.class_probabilities(sequences),
            Self::Sequence(m) => m.class_probabilities(sequences),
        }
    }

    fn predict(&self, sequences: ArrayView3<f32>) -> Result<Predictions, Error> {
        match self {
            Self::Forest(m) => m.predict(sequences),
            Self::Sequence(m) => m.predict(sequences),
        }
    }
}

/// A loaded model together with the metadata it was trained with.
#[derive(Debug)]
pub(crate) struct TrainedModel {
    pub(crate) name: String,
    pub(crate) metadata: ModelMetadata,
    pub(crate) model: Model,
}

#[cfg(test)]
mod tests {
    use super::{ModelKind, ModelMetadata};

    #[test]
    fn model_kind_names() {
        for (name, kind) in &[
            ("random_forest", ModelKind::Forest),
            ("forest", ModelKind::Forest),
            ("lstm", ModelKind::Sequence),
            ("sequence", ModelKind::Sequence),
            ("dummy", ModelKind::Dummy),
        ] {
            let parsed: ModelKind = serde_json::from_str(&format!("{:?}", name)).unwrap();
            assert_eq!(parsed, *kind);
        }
        assert!(serde_json::from_str::<ModelKind>("\"svm\"").is_err());
    }

    #[test]
    fn metadata_defaults() {
        let metadata: ModelMetadata = serde_json::from_str(
            r#"{"model_type": "lstm", "accuracy": 0.92, "history": {"loss": [1.0]}}"#,
        )
        .unwrap();
        assert_eq!(metadata.model_type, ModelKind::Sequence);
        assert!(metadata.class_names.is_empty());
        assert_eq!(metadata.accuracy, Some(0.92));
        assert_eq!(metadata.loss, None);
    }
}
