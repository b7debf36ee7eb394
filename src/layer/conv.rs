use crate::{
    model::weight_init::WeightInit,
    tensor::TensorDesc,
    utils::{
        Padding, Result, UNetError,
        padding::window_output_len,
    },
};

use super::{
    activations::ActivationType,
    layer::{Layer, LayerKind, single_image_input},
};

/// 2D convolution with a square kernel and a fused activation.
#[derive(Clone)]
pub struct ConvLayer {
    pub in_features: usize,  // Input channels
    pub out_features: usize, // Output channels
    pub kernel_size: usize,
    pub stride: usize,
    pub padding: Padding,
    pub activation: ActivationType,
    pub kernel_initializer: WeightInit,
    pub bias: bool,
}

impl ConvLayer {
    pub fn new_with(
        in_features: usize,
        out_features: usize,
        kernel_size: usize,
        stride: usize,
        padding: Padding,
        activation: ActivationType,
        kernel_initializer: WeightInit,
    ) -> Self {
        Self {
            in_features,
            out_features,
            kernel_size,
            stride,
            padding,
            activation,
            kernel_initializer,
            bias: true,
        }
    }

    pub fn weights_desc(&self) -> TensorDesc {
        TensorDesc::new(vec![
            self.out_features,
            self.in_features,
            self.kernel_size,
            self.kernel_size,
        ])
    }
}

impl Layer for ConvLayer {
    fn output_shapes(&self, batch_size: usize, input_shapes: &[&TensorDesc]) -> Result<Vec<TensorDesc>> {
        let input_shape = single_image_input("Conv2D", input_shapes)?;

        // Verify input channels match
        let in_channels = input_shape.dims()[1];
        if in_channels != self.in_features {
            return Err(UNetError::Layer(format!(
                "Conv2D expected {} input channels, got {}",
                self.in_features, in_channels
            )));
        }

        let mut out_dims = vec![batch_size, self.out_features];
        for &extent in input_shape.spatial() {
            let out = window_output_len(extent, self.kernel_size, self.stride, self.padding)
                .ok_or_else(|| {
                    UNetError::Layer(format!(
                        "Conv2D kernel {} with stride {} does not fit input {}",
                        self.kernel_size, self.stride, input_shape
                    ))
                })?;
            out_dims.push(out);
        }

        Ok(vec![TensorDesc::new(out_dims)])
    }

    fn parameter_count(&self, _input_shapes: &[&TensorDesc]) -> usize {
        let weight_params = self.weights_desc().num_elements();
        let bias_params = if self.bias { self.out_features } else { 0 };

        weight_params.saturating_add(bias_params)
    }

    fn input_requirements(&self) -> (usize, Option<usize>) {
        (1, Some(1))
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Conv
    }

    fn name(&self) -> String {
        "Conv2D".to_string()
    }

    fn config_string(&self) -> Option<String> {
        Some(format!(
            "filters={}, kernel={}×{}, stride={}×{}, padding={}, activation={}, init={}({:.4})",
            self.out_features,
            self.kernel_size,
            self.kernel_size,
            self.stride,
            self.stride,
            self.padding.as_str(),
            self.activation.to_config_string(),
            self.kernel_initializer.name(),
            self.kernel_initializer.scale(&self.weights_desc())
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relu_conv(in_features: usize, out_features: usize) -> ConvLayer {
        ConvLayer::new_with(
            in_features,
            out_features,
            3,
            1,
            Padding::Same,
            ActivationType::ReLU,
            WeightInit::He,
        )
    }

    #[test]
    fn same_padding_keeps_resolution() {
        let conv = relu_conv(3, 16);
        let input = TensorDesc::image(1, 3, 256, 256);
        let out = conv.output_shapes(1, &[&input]).unwrap();
        assert_eq!(out[0].dims(), &[1, 16, 256, 256]);
    }

    #[test]
    fn valid_padding_with_stride() {
        let conv = ConvLayer::new_with(
            3,
            8,
            3,
            2,
            Padding::Valid,
            ActivationType::ReLU,
            WeightInit::He,
        );
        let input = TensorDesc::image(2, 3, 9, 9);
        let out = conv.output_shapes(2, &[&input]).unwrap();
        assert_eq!(out[0].dims(), &[2, 8, 4, 4]);
    }

    #[test]
    fn rejects_wrong_channel_count() {
        let conv = relu_conv(4, 16);
        let input = TensorDesc::image(1, 3, 32, 32);
        assert!(matches!(
            conv.output_shapes(1, &[&input]),
            Err(UNetError::Layer(_))
        ));
    }

    #[test]
    fn config_reports_initialiser_scale() {
        // fan_in = 3 * 3 * 3 = 27, sqrt(2 / 27)
        let config = relu_conv(3, 16).config_string().unwrap();
        assert!(config.contains("init=he_normal(0.2722)"), "{}", config);
    }

    #[test]
    fn parameter_count_includes_bias() {
        let conv = relu_conv(3, 16);
        assert_eq!(conv.parameter_count(&[]), 16 * 3 * 3 * 3 + 16);
    }
}
