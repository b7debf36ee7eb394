use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    layer::activations::ActivationType,
    model::weight_init::WeightInit,
    utils::{Padding, Result, UNetError, padding::window_output_len},
};

/// Arguments of the final 1×1 classification convolution.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputArgs {
    pub kernel_size: usize,
    pub activation: ActivationType,
    pub padding: Padding,
    pub kernel_initializer: WeightInit,
}

impl Default for OutputArgs {
    fn default() -> Self {
        Self {
            kernel_size: 1,
            activation: ActivationType::Sigmoid,
            padding: Padding::Same,
            kernel_initializer: WeightInit::Xavier,
        }
    }
}

/// Every parameter of one U-Net build.
///
/// `input_shape` is `(height, width, channels)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub input_shape: (usize, usize, usize),
    pub num_classes: usize,
    pub num_layers: usize,
    pub filters: usize,
    pub upconv_filters: usize,
    pub kernel_size: usize,
    pub activation: ActivationType,
    pub strides: usize,
    pub padding: Padding,
    pub kernel_initializer: WeightInit,
    pub batchnorm_momentum: f32,
    pub pool_size: usize,
    pub pool_strides: usize,
    pub pool_padding: Padding,
    pub transpose_stride: usize,
    pub output_padding: usize,
    pub output: OutputArgs,
    pub batch_size: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            input_shape: (256, 256, 3),
            num_classes: 1,
            num_layers: 2,
            filters: 16,
            upconv_filters: 32,
            kernel_size: 3,
            activation: ActivationType::ReLU,
            strides: 1,
            padding: Padding::Same,
            kernel_initializer: WeightInit::He,
            batchnorm_momentum: 0.99,
            pool_size: 2,
            pool_strides: 2,
            pool_padding: Padding::Valid,
            transpose_stride: 2,
            output_padding: 1,
            output: OutputArgs::default(),
            batch_size: 1,
        }
    }
}

impl BuildConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: BuildConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn height(&self) -> usize {
        self.input_shape.0
    }

    pub fn width(&self) -> usize {
        self.input_shape.1
    }

    pub fn channels(&self) -> usize {
        self.input_shape.2
    }

    pub fn validate(&self) -> Result<()> {
        let (height, width, channels) = self.input_shape;
        if height == 0 || width == 0 || channels == 0 {
            return Err(UNetError::Configuration(format!(
                "Input shape must be positive, got {:?}",
                self.input_shape
            )));
        }

        let positive = [
            ("num_classes", self.num_classes),
            ("filters", self.filters),
            ("upconv_filters", self.upconv_filters),
            ("kernel_size", self.kernel_size),
            ("strides", self.strides),
            ("pool_size", self.pool_size),
            ("pool_strides", self.pool_strides),
            ("transpose_stride", self.transpose_stride),
            ("output.kernel_size", self.output.kernel_size),
            ("batch_size", self.batch_size),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(UNetError::Configuration(format!("{} must be at least 1", name)));
        }

        self.check_pool_depth()?;

        if !(self.batchnorm_momentum > 0.0 && self.batchnorm_momentum <= 1.0) {
            return Err(UNetError::Configuration(format!(
                "Batch-norm momentum must lie in (0, 1], got {}",
                self.batchnorm_momentum
            )));
        }

        if self.output_padding >= self.transpose_stride {
            return Err(UNetError::Configuration(format!(
                "Output padding {} must be smaller than transpose stride {}",
                self.output_padding, self.transpose_stride
            )));
        }

        if !self.output.activation.is_sigmoid_family() {
            return Err(UNetError::Configuration(format!(
                "Binary segmentation head needs a sigmoid-family activation, got {}",
                self.output.activation.name()
            )));
        }

        Ok(())
    }

    // The stem and every encoder level pool once, each pool needs a full window.
    fn check_pool_depth(&self) -> Result<()> {
        let (mut height, mut width) = (self.height(), self.width());

        for step in 0..=self.num_layers {
            let pooled = window_output_len(height, self.pool_size, self.pool_strides, self.pool_padding)
                .zip(window_output_len(width, self.pool_size, self.pool_strides, self.pool_padding));

            let Some((next_height, next_width)) = pooled else {
                return Err(UNetError::Configuration(format!(
                    "Input {}×{} is too small for {} pooling steps, step {} sees {}×{} with pool size {}",
                    self.height(),
                    self.width(),
                    self.num_layers.saturating_add(1),
                    step,
                    height,
                    width,
                    self.pool_size
                )));
            };

            // same padding settles at 1×1 and can never fail from there
            if (next_height, next_width) == (height, width) {
                break;
            }
            height = next_height;
            width = next_width;
        }

        Ok(())
    }
}
