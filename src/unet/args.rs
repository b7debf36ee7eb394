use crate::{
    layer::{activations::ActivationType, factory::Layers, layer::Layer},
    model::weight_init::WeightInit,
    utils::Padding,
};

use super::config::{BuildConfig, OutputArgs};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConvArgs {
    pub kernel_size: usize,
    pub activation: ActivationType,
    pub strides: usize,
    pub padding: Padding,
    pub kernel_initializer: WeightInit,
}

impl ConvArgs {
    pub fn layer(&self, in_features: usize, filters: usize) -> Box<dyn Layer> {
        Layers::conv_with(
            in_features,
            filters,
            self.kernel_size,
            self.strides,
            self.padding,
            self.activation,
            self.kernel_initializer,
        )
    }
}

impl From<OutputArgs> for ConvArgs {
    fn from(output: OutputArgs) -> Self {
        Self {
            kernel_size: output.kernel_size,
            activation: output.activation,
            strides: 1,
            padding: output.padding,
            kernel_initializer: output.kernel_initializer,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConvTransposeArgs {
    pub kernel_size: usize,
    pub activation: ActivationType,
    pub strides: usize,
    pub padding: Padding,
    pub output_padding: usize,
}

impl ConvTransposeArgs {
    pub fn layer(&self, in_features: usize, filters: usize) -> Box<dyn Layer> {
        Layers::conv_transpose_with(
            in_features,
            filters,
            self.kernel_size,
            self.strides,
            self.padding,
            self.output_padding,
            self.activation,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoolArgs {
    pub pool_size: usize,
    pub strides: usize,
    pub padding: Padding,
}

impl PoolArgs {
    pub fn layer(&self) -> Box<dyn Layer> {
        Layers::max_pool_with(self.pool_size, self.strides, self.padding)
    }
}

/// The three argument bundles shared by every block of one build.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerGroupSpec {
    conv: ConvArgs,
    conv_transpose: ConvTransposeArgs,
    pool: PoolArgs,
}

impl LayerGroupSpec {
    pub fn from_config(config: &BuildConfig) -> Self {
        let conv = ConvArgs {
            kernel_size: config.kernel_size,
            activation: config.activation,
            strides: config.strides,
            padding: config.padding,
            kernel_initializer: config.kernel_initializer,
        };

        let conv_transpose = ConvTransposeArgs {
            kernel_size: config.kernel_size,
            activation: config.activation,
            strides: config.transpose_stride,
            padding: config.padding,
            output_padding: config.output_padding,
        };

        let pool = PoolArgs {
            pool_size: config.pool_size,
            strides: config.pool_strides,
            padding: config.pool_padding,
        };

        Self {
            conv,
            conv_transpose,
            pool,
        }
    }

    pub fn conv(&self) -> &ConvArgs {
        &self.conv
    }

    pub fn conv_transpose(&self) -> &ConvTransposeArgs {
        &self.conv_transpose
    }

    pub fn pool(&self) -> &PoolArgs {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_bundles_from_config() {
        let config = BuildConfig {
            kernel_size: 5,
            pool_size: 3,
            pool_strides: 3,
            ..Default::default()
        };
        let spec = LayerGroupSpec::from_config(&config);

        assert_eq!(spec.conv().kernel_size, 5);
        assert_eq!(spec.conv().kernel_initializer, WeightInit::He);
        assert_eq!(spec.conv_transpose().kernel_size, 5);
        assert_eq!(spec.conv_transpose().strides, 2);
        assert_eq!(spec.conv_transpose().output_padding, 1);
        assert_eq!(spec.pool().pool_size, 3);
        assert_eq!(spec.pool().strides, 3);
    }

    #[test]
    fn derivation_is_deterministic() {
        let config = BuildConfig::default();
        assert_eq!(
            LayerGroupSpec::from_config(&config),
            LayerGroupSpec::from_config(&config)
        );
    }

    #[test]
    fn output_args_become_unit_stride_conv() {
        let args = ConvArgs::from(OutputArgs::default());
        assert_eq!(args.kernel_size, 1);
        assert_eq!(args.strides, 1);
        assert_eq!(args.activation, ActivationType::Sigmoid);
    }
}
