use crate::{classify::Predictions, error::Error};
use ndarray::ArrayView1;
use num_traits::cast::ToPrimitive;
use ordered_float::NotNan;
use std::collections::BTreeMap;

/// Most frequent item with its count. Ties go to the smallest item.
pub(crate) fn majority<K: Ord>(items: impl IntoIterator<Item = K>) -> Option<(K, usize)> {
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(item).or_insert(0_usize) += 1;
    }
    counts.into_iter().fold(None, |best, (item, count)| match best {
        Some((_, best_count)) if best_count >= count => best,
        _ => Some((item, count)),
    })
}

/// Index of the largest value. Ties go to the first index.
pub(crate) fn argmax(row: ArrayView1<f32>) -> Result<usize, Error> {
    let mut best: Option<(usize, NotNan<f32>)> = None;
    for (i, &value) in row.iter().enumerate() {
        let value = NotNan::new(value).map_err(|e| Error::ConstructNotNan(e, value))?;
        match best {
            Some((_, best_value)) if best_value >= value => {}
            _ => best = Some((i, value)),
        }
    }
    best.map(|(i, _)| i).ok_or(Error::EmptyProbabilities)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ModelVote {
    pub(crate) class: usize,
    pub(crate) confidence: f32,
}

/// Collapse one model's per-sequence predictions into a single vote.
///
/// The confidence is the share of sequences that agree with the majority
/// class, raised to the mean probability of that class when the model
/// reports probabilities.
pub(crate) fn model_vote(predictions: &Predictions) -> Result<ModelVote, Error> {
    let total = predictions.classes.len();
    let (class, count) =
        majority(predictions.classes.iter().copied()).ok_or(Error::EmptyBatch)?;
    let vote_confidence = count.to_f32().ok_or(Error::ConvertToF32)?
        / total.to_f32().ok_or(Error::ConvertToF32)?;

    let confidence = match &predictions.probabilities {
        None => vote_confidence,
        Some(probabilities) => {
            let (rows, classes) = probabilities.dim();
            if rows != total {
                return Err(Error::ProbabilityRows(total, rows));
            }
            if class >= classes {
                return Err(Error::ClassOutOfRange(class, classes));
            }
            let mean_probability = probabilities
                .column(class)
                .mean()
                .ok_or(Error::EmptyProbabilities)?;
            vote_confidence.max(mean_probability)
        }
    };

    Ok(ModelVote { class, confidence })
}

/// Combine per-model `(label, confidence)` votes.
///
/// The most common label wins, ties going to the lexicographically first
/// label; its confidence is the mean over the models that voted for it.
/// Without any votes every model has failed.
pub(crate) fn cross_model(votes: &[(String, f32)]) -> Result<(String, f32), Error> {
    let (label, count) = majority(votes.iter().map(|(label, _)| label.as_str()))
        .ok_or(Error::AllModelsFailed)?;
    let total: f32 = votes
        .iter()
        .filter(|(l, _)| l == label)
        .map(|&(_, confidence)| confidence)
        .sum();
    Ok((
        label.to_owned(),
        total / count.to_f32().ok_or(Error::ConvertToF32)?,
    ))
}
