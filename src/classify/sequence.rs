//! Recurrent network over whole sequences.
//!
//! Supports the layer stack the exercise classifiers are trained with:
//! LSTM layers (gate order input, forget, cell, output), dense layers applied
//! per timestep on sequential input, and dropout, which is the identity at
//! inference time.

use crate::{
    classify::{vote::argmax, Classifier, Predictions},
    error::Error,
};
use ndarray::{s, Array1, Array2, Array3, ArrayView3, Axis};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Activation {
    Softmax,
    Relu,
    Sigmoid,
    Tanh,
    Linear,
}

impl Default for Activation {
    fn default() -> Self {
        Self::Linear
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub(crate) enum LayerSpec {
    Lstm {
        units: usize,
        #[serde(default)]
        return_sequences: bool,
        kernel: Vec<Vec<f32>>,
        recurrent_kernel: Vec<Vec<f32>>,
        bias: Vec<f32>,
    },
    Dense {
        kernel: Vec<Vec<f32>>,
        bias: Vec<f32>,
        #[serde(default)]
        activation: Activation,
    },
    Dropout,
}

/// On-disk layout of a sequence model's `model.json`.
#[derive(Debug, Clone, serde::Deserialize)]
pub(crate) struct NetworkSpec {
    pub(crate) layers: Vec<LayerSpec>,
}

fn matrix(rows: Vec<Vec<f32>>, what: &'static str) -> Result<Array2<f32>, Error> {
    let height = rows.len();
    let width = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|row| row.len() != width) {
        return Err(Error::RaggedMatrix(what));
    }
    Array2::from_shape_vec((height, width), rows.into_iter().flatten().collect())
        .map_err(|_| Error::RaggedMatrix(what))
}

#[inline]
fn sigmoid(v: f32) -> f32 {
    1.0 / (1.0 + (-v).exp())
}

#[derive(Debug)]
struct Lstm {
    units: usize,
    return_sequences: bool,
    /// input x 4 * units
    kernel: Array2<f32>,
    /// units x 4 * units
    recurrent_kernel: Array2<f32>,
    bias: Array1<f32>,
}

impl Lstm {
    fn forward(&self, inputs: &Array3<f32>) -> Activations {
        let (count, steps, _) = inputs.dim();
        let units = self.units;
        let mut hidden = Array2::<f32>::zeros((count, units));
        let mut cell = Array2::<f32>::zeros((count, units));
        let mut outputs = if self.return_sequences {
            Some(Array3::<f32>::zeros((count, steps, units)))
        } else {
            None
        };

        for step in 0..steps {
            let z = inputs.slice(s![.., step, ..]).dot(&self.kernel)
                + hidden.dot(&self.recurrent_kernel)
                + &self.bias;
            let input_gate = z.slice(s![.., ..units]).mapv(sigmoid);
            let forget_gate = z.slice(s![.., units..2 * units]).mapv(sigmoid);
            let candidate = z.slice(s![.., 2 * units..3 * units]).mapv(f32::tanh);
            let output_gate = z.slice(s![.., 3 * units..]).mapv(sigmoid);

            cell = forget_gate * &cell + input_gate * candidate;
            hidden = output_gate * cell.mapv(f32::tanh);

            if let Some(outputs) = outputs.as_mut() {
                outputs.slice_mut(s![.., step, ..]).assign(&hidden);
            }
        }

        match outputs {
            Some(outputs) => Activations::Sequence(outputs),
            None => Activations::Flat(hidden),
        }
    }
}

#[derive(Debug)]
struct Dense {
    /// input x output
    kernel: Array2<f32>,
    bias: Array1<f32>,
    activation: Activation,
}

impl Dense {
    fn apply(&self, inputs: &Array2<f32>) -> Array2<f32> {
        let mut z = inputs.dot(&self.kernel) + &self.bias;
        match self.activation {
            Activation::Linear => {}
            Activation::Relu => z.mapv_inplace(|v| v.max(0.0)),
            Activation::Sigmoid => z.mapv_inplace(sigmoid),
            Activation::Tanh => z.mapv_inplace(f32::tanh),
            Activation::Softmax => {
                for mut row in z.outer_iter_mut() {
                    let max = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
                    row.mapv_inplace(|v| (v - max).exp());
                    let total = row.sum();
                    row /= total;
                }
            }
        }
        z
    }

    fn forward(&self, inputs: Activations) -> Result<Activations, Error> {
        Ok(match inputs {
            Activations::Flat(x) => Activations::Flat(self.apply(&x)),
            Activations::Sequence(x) => {
                let (count, steps, width) = x.dim();
                let flat = x
                    .into_shape((count * steps, width))
                    .map_err(Error::ReshapeSequences)?;
                let out = self.apply(&flat);
                let out_width = out.ncols();
                Activations::Sequence(
                    out.into_shape((count, steps, out_width))
                        .map_err(Error::ReshapeSequences)?,
                )
            }
        })
    }
}

#[derive(Debug)]
enum Layer {
    Lstm(Lstm),
    Dense(Dense),
    Dropout,
}

enum Activations {
    Sequence(Array3<f32>),
    Flat(Array2<f32>),
}

#[derive(Debug)]
pub(crate) struct Network {
    input_width: usize,
    output_width: usize,
    layers: Vec<Layer>,
}

impl Network {
    /// Validate layer shapes against each other and build the network.
    pub(crate) fn from_spec(spec: NetworkSpec) -> Result<Self, Error> {
        let mut width: Option<usize> = None;
        let mut input_width = None;
        let mut sequential = true;
        let mut layers = Vec::with_capacity(spec.layers.len());

        for (layer_i, layer) in spec.layers.into_iter().enumerate() {
            let malformed = |reason: String| Error::MalformedLayer(layer_i, reason);
            let layer = match layer {
                LayerSpec::Dropout => Layer::Dropout,
                LayerSpec::Lstm {
                    units,
                    return_sequences,
                    kernel,
                    recurrent_kernel,
                    bias,
                } => {
                    if units == 0 {
                        return Err(malformed("lstm has zero units".to_owned()));
                    }
                    if !sequential {
                        return Err(malformed("lstm needs sequential input".to_owned()));
                    }
                    let kernel = matrix(kernel, "lstm kernel")?;
                    let recurrent_kernel = matrix(recurrent_kernel, "lstm recurrent kernel")?;
                    let gates = 4 * units;
                    if kernel.ncols() != gates {
                        return Err(malformed(format!(
                            "kernel has {} columns, expected {}",
                            kernel.ncols(),
                            gates
                        )));
                    }
                    if recurrent_kernel.dim() != (units, gates) {
                        return Err(malformed(format!(
                            "recurrent kernel is {:?}, expected {:?}",
                            recurrent_kernel.dim(),
                            (units, gates)
                        )));
                    }
                    if bias.len() != gates {
                        return Err(malformed(format!(
                            "bias has {} values, expected {}",
                            bias.len(),
                            gates
                        )));
                    }
                    sequential = return_sequences;
                    Layer::Lstm(Lstm {
                        units,
                        return_sequences,
                        kernel,
                        recurrent_kernel,
                        bias: Array1::from(bias),
                    })
                }
                LayerSpec::Dense {
                    kernel,
                    bias,
                    activation,
                } => {
                    let kernel = matrix(kernel, "dense kernel")?;
                    if kernel.ncols() == 0 {
                        return Err(malformed("dense layer has no outputs".to_owned()));
                    }
                    if bias.len() != kernel.ncols() {
                        return Err(malformed(format!(
                            "bias has {} values, expected {}",
                            bias.len(),
                            kernel.ncols()
                        )));
                    }
                    Layer::Dense(Dense {
                        kernel,
                        bias: Array1::from(bias),
                        activation,
                    })
                }
            };

            let shape = match &layer {
                Layer::Dropout => None,
                Layer::Lstm(lstm) => Some((lstm.kernel.nrows(), lstm.units)),
                Layer::Dense(dense) => Some(dense.kernel.dim()),
            };
            if let Some((rows, cols)) = shape {
                match width {
                    Some(width) if width != rows => {
                        return Err(malformed(format!(
                            "expects {} inputs, previous layer yields {}",
                            rows, width
                        )));
                    }
                    Some(_) => {}
                    None => input_width = Some(rows),
                }
                width = Some(cols);
            }
            layers.push(layer);
        }

        let (input_width, output_width) = input_width.zip(width).ok_or(Error::EmptyNetwork)?;
        Ok(Self {
            input_width,
            output_width,
            layers,
        })
    }

    /// Width of the final layer's output.
    pub(crate) fn n_classes(&self) -> usize {
        self.output_width
    }

    /// Class scores from the final timestep of every sequence.
    pub(crate) fn forward(&self, sequences: ArrayView3<f32>) -> Result<Array2<f32>, Error> {
        let (_, steps, width) = sequences.dim();
        if width != self.input_width {
            return Err(Error::FeatureCount(self.input_width, width));
        }
        if steps == 0 {
            return Err(Error::EmptyBatch);
        }

        let mut activations = Activations::Sequence(sequences.as_standard_layout().into_owned());
        for (layer_i, layer) in self.layers.iter().enumerate() {
            activations = match (layer, activations) {
                (Layer::Dropout, activations) => activations,
                (Layer::Lstm(lstm), Activations::Sequence(x)) => lstm.forward(&x),
                // rejected when the network is built
                (Layer::Lstm(_), Activations::Flat(_)) => {
                    return Err(Error::MalformedLayer(
                        layer_i,
                        "lstm needs sequential input".to_owned(),
                    ))
                }
                (Layer::Dense(dense), activations) => dense.forward(activations)?,
            };
        }

        Ok(match activations {
            Activations::Flat(scores) => scores,
            Activations::Sequence(scores) => scores.index_axis_move(Axis(1), steps - 1),
        })
    }
}

impl Classifier for Network {
    fn classify(&self, sequences: ArrayView3<f32>) -> Result<Array1<usize>, Error> {
        self.forward(sequences)?
            .outer_iter()
            .map(argmax)
            .collect::<Result<Vec<_>, _>>()
            .map(Array1::from)
    }

    fn class_probabilities(
        &self,
        sequences: ArrayView3<f32>,
    ) -> Result<Option<Array2<f32>>, Error> {
        self.forward(sequences).map(Some)
    }

    fn predict(&self, sequences: ArrayView3<f32>) -> Result<Predictions, Error> {
        let probabilities = self.forward(sequences)?;
        let classes = probabilities
            .outer_iter()
            .map(argmax)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Predictions {
            classes: Array1::from(classes),
            probabilities: Some(probabilities),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::{testing::SIGN_OF_LAST_FRAME, Network, NetworkSpec};
    use crate::classify::Classifier;
    use assert_approx_eq::assert_approx_eq;
    use ndarray::{array, Array3};

    fn parse(json: &str) -> Result<Network, crate::error::Error> {
        Network::from_spec(serde_json::from_str::<NetworkSpec>(json).unwrap())
    }

    fn batch() -> Array3<f32> {
        Array3::from_shape_vec((2, 3, 1), vec![-1.0, -1.0, 1.0, 1.0, 1.0, -1.0]).unwrap()
    }

    #[test]
    fn last_frame_decides() {
        let network = parse(SIGN_OF_LAST_FRAME).unwrap();
        assert_eq!(network.n_classes(), 2);
        let predictions = network.predict(batch().view()).unwrap();
        assert_eq!(predictions.classes, array![0, 1]);
        let probabilities = predictions.probabilities.unwrap();
        for row in probabilities.outer_iter() {
            assert_approx_eq!(row.sum(), 1.0);
            assert!(row.iter().any(|&p| p > 0.99));
        }
    }

    #[test]
    fn sequence_output_keeps_last_timestep() {
        let network = parse(
            r#"{"layers": [
                {"type": "lstm", "units": 1, "return_sequences": true,
                 "kernel": [[0.0, 0.0, 3.0, 0.0]],
                 "recurrent_kernel": [[0.0, 0.0, 0.0, 0.0]],
                 "bias": [20.0, -20.0, 0.0, 20.0]},
                {"type": "dense", "kernel": [[5.0, -5.0]], "bias": [0.0, 0.0], "activation": "softmax"}
            ]}"#,
        )
        .unwrap();
        let flat = parse(SIGN_OF_LAST_FRAME).unwrap();
        let sequential = network.forward(batch().view()).unwrap();
        assert_eq!(sequential.dim(), (2, 2));
        let expected = flat.forward(batch().view()).unwrap();
        for (a, b) in sequential.iter().zip(expected.iter()) {
            assert_approx_eq!(*a, *b);
        }
    }

    #[test]
    fn input_width_is_checked() {
        let network = parse(SIGN_OF_LAST_FRAME).unwrap();
        let wide = Array3::<f32>::zeros((1, 3, 2));
        assert!(network.classify(wide.view()).is_err());
    }

    #[test]
    fn malformed_networks_are_rejected() {
        let cases = [
            r#"{"layers": []}"#,
            r#"{"layers": [{"type": "dropout"}]}"#,
            r#"{"layers": [{"type": "dense", "kernel": [[1.0], [1.0, 2.0]], "bias": [0.0]}]}"#,
            r#"{"layers": [{"type": "dense", "kernel": [[1.0, 2.0]], "bias": [0.0]}]}"#,
            r#"{"layers": [
                {"type": "dense", "kernel": [[1.0, 2.0]], "bias": [0.0, 0.0]},
                {"type": "dense", "kernel": [[1.0]], "bias": [0.0]}
            ]}"#,
            r#"{"layers": [
                {"type": "lstm", "units": 1, "kernel": [[0.0, 0.0, 0.0]],
                 "recurrent_kernel": [[0.0, 0.0, 0.0, 0.0]], "bias": [0.0, 0.0, 0.0, 0.0]}
            ]}"#,
            r#"{"layers": [
                {"type": "lstm", "units": 1, "kernel": [[0.0, 0.0, 0.0, 0.0]],
                 "recurrent_kernel": [[0.0, 0.0, 0.0, 0.0]], "bias": [0.0, 0.0, 0.0, 0.0]},
                {"type": "lstm", "units": 1, "kernel": [[0.0, 0.0, 0.0, 0.0]],
                 "recurrent_kernel": [[0.0, 0.0, 0.0, 0.0]], "bias": [0.0, 0.0, 0.0, 0.0]}
            ]}"#,
        ];
        for case in &cases {
            assert!(parse(case).is_err(), "accepted {}", case);
        }
    }
}
