use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("could not open recording: {1:?}")]
    OpenRecording(#[source] std::io::Error, PathBuf),

    #[error("failed to parse recording: {1:?}")]
    ParseRecording(#[source] serde_json::Error, PathBuf),

    #[error("expected {0} keypoints per frame, got {1}")]
    KeypointCount(usize, usize),

    #[error("window length must be at least one frame")]
    ZeroWindowLength,

    #[error("frame stride must be at least one frame")]
    ZeroFrameStride,

    #[error("unknown feature kind {0:?}, expected one of: raw, angles")]
    UnknownFeatureKind(String),

    #[error("no trained models available")]
    NoModels,

    #[error("no pose detected in video")]
    NoPose,

    #[error("video too short, need at least {0} frames")]
    VideoTooShort(usize),

    #[error("all models failed to predict")]
    AllModelsFailed,

    #[error("failed to read model directory: {1:?}")]
    ReadModelDir(#[source] std::io::Error, PathBuf),

    #[error("failed to read model file: {1:?}")]
    ReadArtifact(#[source] std::io::Error, PathBuf),

    #[error("failed to parse model file: {1:?}")]
    ParseArtifact(#[source] serde_json::Error, PathBuf),

    #[error("failed to read label encoder: {1:?}")]
    ReadLabelEncoder(#[source] std::io::Error, PathBuf),

    #[error("failed to parse label encoder: {1:?}")]
    ParseLabelEncoder(#[source] serde_json::Error, PathBuf),

    #[error("model has {0} classes but {1} class names")]
    ClassNameCount(usize, usize),

    #[error("cannot construct a forest without trees")]
    EmptyForest,

    #[error("tree {0} node {1} is malformed: {2}")]
    MalformedTree(usize, usize, &'static str),

    #[error("cannot construct a network without layers")]
    EmptyNetwork,

    #[error("layer {0} is malformed: {1}")]
    MalformedLayer(usize, String),

    #[error("{0} rows have differing lengths")]
    RaggedMatrix(&'static str),

    #[error("expected {0} input features, got {1}")]
    FeatureCount(usize, usize),

    #[error("cannot aggregate an empty batch of predictions")]
    EmptyBatch,

    #[error("got {1} probability rows for {0} predictions")]
    ProbabilityRows(usize, usize),

    #[error("class index {0} is out of range for {1} classes")]
    ClassOutOfRange(usize, usize),

    #[error("label encoder has no class at index {0}")]
    UnknownClass(usize),

    #[error("got an empty probability row")]
    EmptyProbabilities,

    #[error("failed to construct NotNan from f32: {1}")]
    ConstructNotNan(#[source] ordered_float::FloatIsNan, f32),

    #[error("failed to convert value to f32")]
    ConvertToF32,

    #[error("failed to convert value to f64")]
    ConvertToF64,

    #[error("failed to reshape sequence batch")]
    ReshapeSequences(#[source] ndarray::ShapeError),
}
