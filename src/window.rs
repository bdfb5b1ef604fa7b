use crate::error::Error;
use ndarray::{s, Array3, ArrayView2};

/// Default number of frames per classifier input.
pub(crate) const DEFAULT_SEQUENCE_LENGTH: usize = 30;

/// Slide a window of `length` rows over `features` with stride one.
///
/// Returns a `(count, length, dim)` batch where `count = max(0, rows - length + 1)`;
/// window `i` holds rows `i..i + length` in their original order.
pub(crate) fn window(features: ArrayView2<f32>, length: usize) -> Result<Array3<f32>, Error> {
    if length == 0 {
        return Err(Error::ZeroWindowLength);
    }
    let (rows, dim) = features.dim();
    let count = (rows + 1).saturating_sub(length);
    let mut sequences = Array3::zeros((count, length, dim));
    for (start, mut sequence) in sequences.outer_iter_mut().enumerate() {
        sequence.assign(&features.slice(s![start..start + length, ..]));
    }
    Ok(sequences)
}

#[cfg(test)]
mod tests {
    use super::window;
    use ndarray::{s, Array, Array2};

    fn ramp(rows: usize, dim: usize) -> Array2<f32> {
        Array::from_shape_fn((rows, dim), |(r, c)| (r * 10 + c) as f32)
    }

    #[test]
    fn count_and_order() {
        let features = ramp(40, 3);
        let sequences = window(features.view(), 30).unwrap();
        assert_eq!(sequences.dim(), (11, 30, 3));
        for (start, sequence) in sequences.outer_iter().enumerate() {
            assert_eq!(sequence, features.slice(s![start..start + 30, ..]));
        }
    }

    #[test]
    fn exact_length_yields_one_window() {
        let sequences = window(ramp(30, 2).view(), 30).unwrap();
        assert_eq!(sequences.dim(), (1, 30, 2));
    }

    #[test]
    fn short_stream_yields_nothing() {
        let sequences = window(ramp(29, 132).view(), 30).unwrap();
        assert_eq!(sequences.dim().0, 0);
        let sequences = window(ramp(0, 132).view(), 30).unwrap();
        assert_eq!(sequences.dim().0, 0);
    }

    #[test]
    fn zero_length_is_rejected() {
        assert!(window(ramp(5, 2).view(), 0).is_err());
    }
}
