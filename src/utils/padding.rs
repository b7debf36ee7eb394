use serde::{Deserialize, Serialize};

/// How a convolution or pooling window treats the border of its input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Padding {
    /// Zero-pad so that `out = ceil(in / stride)`.
    #[default]
    Same,
    /// No padding, windows that would run past the border are dropped.
    Valid,
}

impl Padding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Padding::Same => "same",
            Padding::Valid => "valid",
        }
    }
}

/// Output length of a strided window (convolution or pooling) along one axis.
///
/// Returns `None` when a `valid` window is larger than the input.
pub fn window_output_len(input: usize, window: usize, stride: usize, padding: Padding) -> Option<usize> {
    if stride == 0 || window == 0 {
        return None;
    }

    match padding {
        Padding::Same => Some(input.div_ceil(stride)),
        Padding::Valid => {
            if window > input {
                None
            } else {
                Some((input - window) / stride + 1)
            }
        }
    }
}

/// Output length of a transposed convolution along one axis when an explicit
/// output padding is given. `None` if the result is empty or overflows.
///
/// `pad` is `kernel / 2` for `same` and zero for `valid`, so a 3-wide kernel
/// with stride 2 and output padding 1 exactly doubles the input.
pub fn transposed_output_len(
    input: usize,
    kernel: usize,
    stride: usize,
    padding: Padding,
    output_padding: usize,
) -> Option<usize> {
    if input == 0 || stride == 0 || kernel == 0 {
        return None;
    }

    let pad = match padding {
        Padding::Same => kernel / 2,
        Padding::Valid => 0,
    };

    (input - 1)
        .checked_mul(stride)?
        .checked_add(kernel)?
        .checked_add(output_padding)?
        .checked_sub(pad.checked_mul(2)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_padding_rounds_up() {
        assert_eq!(window_output_len(256, 3, 1, Padding::Same), Some(256));
        assert_eq!(window_output_len(7, 2, 2, Padding::Same), Some(4));
    }

    #[test]
    fn valid_padding_drops_partial_windows() {
        assert_eq!(window_output_len(256, 2, 2, Padding::Valid), Some(128));
        assert_eq!(window_output_len(7, 2, 2, Padding::Valid), Some(3));
        assert_eq!(window_output_len(1, 3, 1, Padding::Valid), None);
    }

    #[test]
    fn transposed_stride_two_doubles() {
        for input in [1, 2, 5, 64, 128] {
            assert_eq!(
                transposed_output_len(input, 3, 2, Padding::Same, 1),
                Some(input * 2)
            );
        }
    }

    #[test]
    fn transposed_stride_three_triples() {
        assert_eq!(transposed_output_len(64, 3, 3, Padding::Same, 1), Some(192));
    }

    #[test]
    fn transposed_valid() {
        // (4 - 1) * 2 + 3 + 1
        assert_eq!(transposed_output_len(4, 3, 2, Padding::Valid, 1), Some(10));
    }

    #[test]
    fn transposed_overflow_is_none() {
        assert_eq!(transposed_output_len(8, 3, usize::MAX / 2, Padding::Same, 1), None);
        assert_eq!(transposed_output_len(2, usize::MAX, 1, Padding::Valid, 1), None);
    }
}
