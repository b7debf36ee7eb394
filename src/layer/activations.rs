use serde::{Deserialize, Serialize};

/// Activation fused into a convolution's output.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum ActivationType {
    #[serde(rename = "linear")]
    Linear,
    #[default]
    #[serde(rename = "relu")]
    ReLU,
    #[serde(rename = "leaky_relu")]
    LeakyReLU(f32),
    #[serde(rename = "sigmoid")]
    Sigmoid,
    #[serde(rename = "hard_sigmoid")]
    HardSigmoid,
    #[serde(rename = "softmax")]
    Softmax,
    #[serde(rename = "tanh")]
    Tanh,
    #[serde(rename = "gelu")]
    GELU,
    #[serde(rename = "silu")]
    SiLU,
}

impl ActivationType {
    pub fn name(&self) -> String {
        match self {
            ActivationType::Linear => "Linear".to_string(),
            ActivationType::ReLU => "ReLU".to_string(),
            ActivationType::LeakyReLU(_) => "LeakyReLU".to_string(),
            ActivationType::Sigmoid => "Sigmoid".to_string(),
            ActivationType::HardSigmoid => "HardSigmoid".to_string(),
            ActivationType::Softmax => "Softmax".to_string(),
            ActivationType::Tanh => "Tanh".to_string(),
            ActivationType::GELU => "GELU".to_string(),
            ActivationType::SiLU => "SiLU".to_string(),
        }
    }

    pub fn to_config_string(&self) -> String {
        match self {
            ActivationType::LeakyReLU(alpha) => format!("LeakyReLU(α={})", alpha),
            other => other.name(),
        }
    }

    /// Activations whose output lies in `[0, 1]` per element, suitable for a
    /// binary segmentation head.
    pub fn is_sigmoid_family(&self) -> bool {
        matches!(self, ActivationType::Sigmoid | ActivationType::HardSigmoid)
    }
}
