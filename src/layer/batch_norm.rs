use crate::{
    tensor::TensorDesc,
    utils::{Result, UNetError},
};

use super::layer::{Layer, LayerKind, single_image_input};

/// Per-channel batch normalisation.
#[derive(Clone)]
pub struct BatchNormLayer {
    pub channels: usize,
    pub momentum: f32,
    pub epsilon: f32,
}

impl BatchNormLayer {
    pub fn new(channels: usize, momentum: f32) -> Self {
        Self {
            channels,
            momentum,
            epsilon: 1e-3,
        }
    }
}

impl Layer for BatchNormLayer {
    fn output_shapes(&self, _batch_size: usize, input_shapes: &[&TensorDesc]) -> Result<Vec<TensorDesc>> {
        let input_shape = single_image_input("BatchNorm", input_shapes)?;

        if input_shape.dims()[1] != self.channels {
            return Err(UNetError::Layer(format!(
                "BatchNorm expected {} channels, got {}",
                self.channels,
                input_shape.dims()[1]
            )));
        }

        Ok(vec![input_shape.clone()])
    }

    // gamma, beta, moving mean, moving variance
    fn parameter_count(&self, _input_shapes: &[&TensorDesc]) -> usize {
        4 * self.channels
    }

    fn input_requirements(&self) -> (usize, Option<usize>) {
        (1, Some(1))
    }

    fn kind(&self) -> LayerKind {
        LayerKind::BatchNorm
    }

    fn name(&self) -> String {
        "BatchNorm".to_string()
    }

    fn config_string(&self) -> Option<String> {
        Some(format!("momentum={}, epsilon={}", self.momentum, self.epsilon))
    }
}
