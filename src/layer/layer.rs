use crate::{
    tensor::TensorDesc,
    utils::{Result, UNetError},
};

/// Coarse operation category, used for counting layers in a built graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Input,
    Conv,
    ConvTranspose,
    MaxPool,
    BatchNorm,
    Concat,
}

pub trait Layer {
    // Calculate the output shapes for all outputs of this layer
    fn output_shapes(&self, batch_size: usize, input_shapes: &[&TensorDesc]) -> Result<Vec<TensorDesc>>;

    // Return the total number of trainable and non-trainable parameters
    fn parameter_count(&self, _input_shapes: &[&TensorDesc]) -> usize {
        0
    }

    // For graph verification, how many inputs this layer requires (min and max)
    fn input_requirements(&self) -> (usize, Option<usize>);

    fn kind(&self) -> LayerKind;

    // Return a string representation of the layers name
    fn name(&self) -> String;

    // Return optional configuration details for the layer
    fn config_string(&self) -> Option<String> {
        None
    }
}

/// Checks the common preconditions of single-input image layers and returns
/// that input.
pub(crate) fn single_image_input<'a>(name: &str, input_shapes: &[&'a TensorDesc]) -> Result<&'a TensorDesc> {
    if input_shapes.len() != 1 {
        return Err(UNetError::Layer(format!(
            "{} layer requires exactly 1 input, got {}",
            name,
            input_shapes.len()
        )));
    }

    let input = input_shapes[0];
    if !input.is_image() {
        return Err(UNetError::Layer(format!(
            "{} requires a 4D input tensor (N,C,H,W), got {}",
            name, input
        )));
    }

    Ok(input)
}
