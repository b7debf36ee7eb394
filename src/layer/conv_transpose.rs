use crate::{
    model::weight_init::WeightInit,
    tensor::TensorDesc,
    utils::{Padding, Result, UNetError, padding::transposed_output_len},
};

use super::{
    activations::ActivationType,
    layer::{Layer, LayerKind, single_image_input},
};

/// 2D transposed convolution (learned upsampling).
#[derive(Clone)]
pub struct ConvTransposeLayer {
    pub in_features: usize,
    pub out_features: usize,
    pub kernel_size: usize,
    pub stride: usize,
    pub padding: Padding,
    pub output_padding: usize,
    pub activation: ActivationType,
    pub kernel_initializer: WeightInit,
    pub bias: bool,
}

impl ConvTransposeLayer {
    pub fn new_with(
        in_features: usize,
        out_features: usize,
        kernel_size: usize,
        stride: usize,
        padding: Padding,
        output_padding: usize,
        activation: ActivationType,
    ) -> Self {
        Self {
            in_features,
            out_features,
            kernel_size,
            stride,
            padding,
            output_padding,
            activation,
            kernel_initializer: WeightInit::Xavier,
            bias: true,
        }
    }
}

impl Layer for ConvTransposeLayer {
    fn output_shapes(&self, batch_size: usize, input_shapes: &[&TensorDesc]) -> Result<Vec<TensorDesc>> {
        let input_shape = single_image_input("ConvTranspose2D", input_shapes)?;

        let in_channels = input_shape.dims()[1];
        if in_channels != self.in_features {
            return Err(UNetError::Layer(format!(
                "ConvTranspose2D expected {} input channels, got {}",
                self.in_features, in_channels
            )));
        }

        if self.output_padding >= self.stride {
            return Err(UNetError::Layer(format!(
                "ConvTranspose2D output padding {} must be smaller than stride {}",
                self.output_padding, self.stride
            )));
        }

        let mut out_dims = vec![batch_size, self.out_features];
        for &extent in input_shape.spatial() {
            let out = transposed_output_len(
                extent,
                self.kernel_size,
                self.stride,
                self.padding,
                self.output_padding,
            )
            .ok_or_else(|| {
                UNetError::Layer(format!(
                    "ConvTranspose2D kernel {} with stride {} produces an empty output for {}",
                    self.kernel_size, self.stride, input_shape
                ))
            })?;
            out_dims.push(out);
        }

        Ok(vec![TensorDesc::new(out_dims)])
    }

    fn parameter_count(&self, _input_shapes: &[&TensorDesc]) -> usize {
        // weights shape: [in_channels, out_channels, k, k]
        let weight_params = TensorDesc::new(vec![
            self.in_features,
            self.out_features,
            self.kernel_size,
            self.kernel_size,
        ])
        .num_elements();
        let bias_params = if self.bias { self.out_features } else { 0 };

        weight_params.saturating_add(bias_params)
    }

    fn input_requirements(&self) -> (usize, Option<usize>) {
        (1, Some(1))
    }

    fn kind(&self) -> LayerKind {
        LayerKind::ConvTranspose
    }

    fn name(&self) -> String {
        "ConvTranspose2D".to_string()
    }

    fn config_string(&self) -> Option<String> {
        Some(format!(
            "filters={}, kernel={}×{}, stride={}×{}, output_padding={}×{}, padding={}, activation={}",
            self.out_features,
            self.kernel_size,
            self.kernel_size,
            self.stride,
            self.stride,
            self.output_padding,
            self.output_padding,
            self.padding.as_str(),
            self.activation.to_config_string()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upconv(stride: usize, output_padding: usize) -> ConvTransposeLayer {
        ConvTransposeLayer::new_with(
            16,
            16,
            3,
            stride,
            Padding::Same,
            output_padding,
            ActivationType::ReLU,
        )
    }

    #[test]
    fn doubles_resolution() {
        let input = TensorDesc::image(1, 16, 32, 32);
        let out = upconv(2, 1).output_shapes(1, &[&input]).unwrap();
        assert_eq!(out[0].dims(), &[1, 16, 64, 64]);
    }

    #[test]
    fn output_padding_must_be_below_stride() {
        let input = TensorDesc::image(1, 16, 32, 32);
        assert!(upconv(1, 1).output_shapes(1, &[&input]).is_err());
    }

    #[test]
    fn parameter_count() {
        assert_eq!(upconv(2, 1).parameter_count(&[]), 16 * 16 * 9 + 16);
    }
}
