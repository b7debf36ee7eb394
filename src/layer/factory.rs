use crate::{model::weight_init::WeightInit, utils::Padding};

use super::{
    activations::ActivationType, batch_norm::BatchNormLayer, concat::ConcatLayer, conv::ConvLayer,
    conv_transpose::ConvTransposeLayer, input_buffer::InputLayer, layer::Layer,
    maxpool::MaxPoolLayer,
};

pub struct Layers;

impl Layers {
    pub fn input_buffer(channels: usize, height: usize, width: usize) -> Box<dyn Layer> {
        Box::new(InputLayer::new(channels, height, width))
    }

    pub fn conv_with(
        in_features: usize,
        out_features: usize,
        kernel_size: usize,
        stride: usize,
        padding: Padding,
        activation: ActivationType,
        kernel_initializer: WeightInit,
    ) -> Box<dyn Layer> {
        Box::new(ConvLayer::new_with(
            in_features,
            out_features,
            kernel_size,
            stride,
            padding,
            activation,
            kernel_initializer,
        ))
    }

    pub fn conv_transpose_with(
        in_features: usize,
        out_features: usize,
        kernel_size: usize,
        stride: usize,
        padding: Padding,
        output_padding: usize,
        activation: ActivationType,
    ) -> Box<dyn Layer> {
        Box::new(ConvTransposeLayer::new_with(
            in_features,
            out_features,
            kernel_size,
            stride,
            padding,
            output_padding,
            activation,
        ))
    }

    pub fn max_pool_with(pool_size: usize, stride: usize, padding: Padding) -> Box<dyn Layer> {
        Box::new(MaxPoolLayer::new_with(pool_size, stride, padding))
    }

    pub fn batch_norm(channels: usize, momentum: f32) -> Box<dyn Layer> {
        Box::new(BatchNormLayer::new(channels, momentum))
    }

    pub fn concat_channels() -> Box<dyn Layer> {
        Box::new(ConcatLayer::channels())
    }
}
