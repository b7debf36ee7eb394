use crate::{
    tensor::TensorDesc,
    utils::{Result, UNetError},
};

use super::layer::{Layer, LayerKind};

/// Graph entry point producing `[batch, channels, height, width]`.
#[derive(Clone)]
pub struct InputLayer {
    pub channels: usize,
    pub height: usize,
    pub width: usize,
}

impl InputLayer {
    pub fn new(channels: usize, height: usize, width: usize) -> Self {
        Self {
            channels,
            height,
            width,
        }
    }
}

impl Layer for InputLayer {
    fn output_shapes(&self, batch_size: usize, input_shapes: &[&TensorDesc]) -> Result<Vec<TensorDesc>> {
        // Input layers ignore input_shapes since they're entry points
        if !input_shapes.is_empty() {
            return Err(UNetError::Layer(format!(
                "InputBuffer expects 0 inputs, got {}",
                input_shapes.len()
            )));
        }

        Ok(vec![TensorDesc::image(
            batch_size,
            self.channels,
            self.height,
            self.width,
        )])
    }

    fn input_requirements(&self) -> (usize, Option<usize>) {
        (0, Some(0))
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Input
    }

    fn name(&self) -> String {
        "InputBuffer".to_string()
    }

    fn config_string(&self) -> Option<String> {
        Some(format!("shape=({}, {}, {})", self.height, self.width, self.channels))
    }
}
