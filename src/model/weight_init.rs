use serde::{Deserialize, Serialize};

use crate::tensor::TensorDesc;

/// Kernel initialiser recorded on each convolution. Sampling is left to the
/// runtime that executes the graph, the builder only fixes the distribution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WeightInit {
    #[serde(rename = "glorot_uniform")]
    Xavier,
    #[default]
    #[serde(rename = "he_normal")]
    He,
    #[serde(rename = "lecun_normal")]
    LeCun,
}

impl WeightInit {
    pub fn name(&self) -> &'static str {
        match self {
            WeightInit::Xavier => "glorot_uniform",
            WeightInit::He => "he_normal",
            WeightInit::LeCun => "lecun_normal",
        }
    }

    /// Spread of the distribution for a weight tensor of this shape: the
    /// uniform limit for Xavier, the standard deviation for He and LeCun.
    pub fn scale(&self, weights: &TensorDesc) -> f32 {
        let (fan_in, fan_out) = fan_in_out(weights);

        match self {
            WeightInit::Xavier => (6.0 / fan_in.saturating_add(fan_out) as f32).sqrt(),
            WeightInit::He => (2.0 / fan_in as f32).sqrt(),
            WeightInit::LeCun => (1.0 / fan_in as f32).sqrt(),
        }
    }
}

// weights are laid out [out_channels, in_channels, k1, k2, ...]
fn fan_in_out(weights: &TensorDesc) -> (usize, usize) {
    match weights.dims() {
        [] => (1, 1),
        // For 1D tensors, assume bias vector or similar
        [len] => (1, *len),
        [out_features, in_features, kernel @ ..] => {
            let kernel_size = kernel.iter().fold(1usize, |acc, &d| acc.saturating_mul(d));
            (
                in_features.saturating_mul(kernel_size),
                out_features.saturating_mul(kernel_size),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn he_scale_uses_fan_in() {
        // 16 filters over 3 input channels, 3x3 kernel: fan_in = 27
        let weights = TensorDesc::new(vec![16, 3, 3, 3]);
        let expected = (2.0f32 / 27.0).sqrt();
        assert!((WeightInit::He.scale(&weights) - expected).abs() < 1e-6);
    }

    #[test]
    fn xavier_scale_uses_both_fans() {
        let weights = TensorDesc::new(vec![4, 2, 1, 1]);
        let expected = (6.0f32 / 6.0).sqrt();
        assert!((WeightInit::Xavier.scale(&weights) - expected).abs() < 1e-6);
    }

    #[test]
    fn deserialises_keras_names() {
        let init: WeightInit = serde_json::from_str("\"he_normal\"").unwrap();
        assert_eq!(init, WeightInit::He);
        assert_eq!(init.name(), "he_normal");
    }
}
