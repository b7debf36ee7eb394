use log::{debug, info};

use crate::{
    layer::factory::Layers,
    model::{
        compile::CompileConfig, graph_model::GraphModel, layer_connection::LayerId,
        stats::model_summary,
    },
    tensor::TensorDesc,
    utils::{Result, UNetError},
};

use super::{
    args::{ConvArgs, LayerGroupSpec},
    blocks::{channels_of, conv_block, upconv_block},
    config::BuildConfig,
    skip_stack::{SkipStack, SkipStats},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildReport {
    pub skip: SkipStats,
    /// Whether every encoder level had been consumed when the decoder loop
    /// finished, before the stem concatenation.
    pub stack_empty_before_head: bool,
}

/// A verified and compiled U-Net graph with its single input and output.
pub struct UNetModel {
    pub model: GraphModel,
    pub input: LayerId,
    pub output: LayerId,
    pub report: BuildReport,
}

impl UNetModel {
    pub fn input_shape(&self) -> Result<&TensorDesc> {
        self.model.output_shape(self.input)
    }

    pub fn output_shape(&self) -> Result<&TensorDesc> {
        self.model.output_shape(self.output)
    }

    pub fn summary(&self) -> Result<String> {
        model_summary(&self.model)
    }
}

/// Builds the U-Net described by `config`.
pub fn build_unet(config: &BuildConfig) -> Result<UNetModel> {
    TopologyBuilder::new(config)?.build()
}

/// Assembles the encoder-decoder graph one phase at a time.
///
/// Each phase takes the id of the current tensor and returns the id of the
/// tensor it ends on.
pub struct TopologyBuilder<'a> {
    config: &'a BuildConfig,
    spec: LayerGroupSpec,
    model: GraphModel,
}

impl<'a> TopologyBuilder<'a> {
    pub fn new(config: &'a BuildConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            spec: LayerGroupSpec::from_config(config),
            model: GraphModel::new(config.batch_size),
        })
    }

    pub fn build(mut self) -> Result<UNetModel> {
        let input = self.model.add_layer(Layers::input_buffer(
            self.config.channels(),
            self.config.height(),
            self.config.width(),
        ))?;

        let (stem, x) = self.stem(input)?;
        let mut skips = SkipStack::new(stem);

        let x = self.encoder(x, &mut skips)?;
        let x = self.bottleneck(x)?;
        let x = self.decoder(x, &mut skips)?;

        let stack_empty_before_head = skips.is_empty();
        let (stem, skip) = skips.finish()?;
        let output = self.head(x, stem)?;

        let report = BuildReport {
            skip,
            stack_empty_before_head,
        };

        self.bind(input, output, report)
    }

    /// Plain convolution on the raw input, two conv blocks and a pool.
    /// Returns the stem skip tensor and the pooled tensor.
    fn stem(&mut self, input: LayerId) -> Result<(LayerId, LayerId)> {
        let filters = self.config.filters;
        let momentum = self.config.batchnorm_momentum;

        let in_channels = channels_of(&self.model, input)?;
        let x = self
            .model
            .add_layer_with(self.spec.conv().layer(in_channels, filters), vec![input.into()])?;

        let stem = conv_block(&mut self.model, x, filters, momentum, self.spec.conv())?;
        let x = conv_block(&mut self.model, stem, filters, momentum, self.spec.conv())?;
        let x = self.pool(x)?;

        debug!("stem done, skip at {}", self.model.output_shape(stem)?);
        Ok((stem, x))
    }

    /// `num_layers` levels of three conv blocks and a pool, capturing the
    /// tensor after the second block of each level.
    fn encoder(&mut self, mut x: LayerId, skips: &mut SkipStack) -> Result<LayerId> {
        let filters = self.config.filters;
        let momentum = self.config.batchnorm_momentum;

        for level in 0..self.config.num_layers {
            x = conv_block(&mut self.model, x, filters, momentum, self.spec.conv())?;
            x = conv_block(&mut self.model, x, filters, momentum, self.spec.conv())?;
            skips.push(x);
            x = conv_block(&mut self.model, x, filters, momentum, self.spec.conv())?;
            x = self.pool(x)?;

            debug!(
                "encoder level {} skip depth {}, now at {}",
                level,
                skips.depth(),
                self.model.output_shape(x)?
            );
        }

        Ok(x)
    }

    fn bottleneck(&mut self, x: LayerId) -> Result<LayerId> {
        let filters = self.config.filters;
        let momentum = self.config.batchnorm_momentum;

        let x = conv_block(&mut self.model, x, filters, momentum, self.spec.conv())?;
        let x = conv_block(&mut self.model, x, filters, momentum, self.spec.conv())?;
        let x = upconv_block(&mut self.model, x, filters, momentum, self.spec.conv_transpose())?;

        debug!("bottleneck upsampled to {}", self.model.output_shape(x)?);
        Ok(x)
    }

    /// One level per encoder level, consuming skips most recent first.
    fn decoder(&mut self, mut x: LayerId, skips: &mut SkipStack) -> Result<LayerId> {
        let filters = self.config.filters;
        let momentum = self.config.batchnorm_momentum;

        for level in 0..self.config.num_layers {
            let skip = skips.pop(level)?;
            x = self.concat(x, skip, format!("decoder level {} skip concatenation", level))?;
            x = conv_block(&mut self.model, x, self.config.upconv_filters, momentum, self.spec.conv())?;
            x = conv_block(&mut self.model, x, filters, momentum, self.spec.conv())?;
            x = upconv_block(&mut self.model, x, filters, momentum, self.spec.conv_transpose())?;

            debug!("decoder level {} now at {}", level, self.model.output_shape(x)?);
        }

        Ok(x)
    }

    /// Stem concatenation, two conv blocks and the classification conv.
    fn head(&mut self, x: LayerId, stem: LayerId) -> Result<LayerId> {
        let momentum = self.config.batchnorm_momentum;

        let x = self.concat(x, stem, "stem skip concatenation".to_string())?;
        let x = conv_block(&mut self.model, x, self.config.upconv_filters, momentum, self.spec.conv())?;
        let x = conv_block(&mut self.model, x, self.config.filters, momentum, self.spec.conv())?;

        let output_args = ConvArgs::from(self.config.output);
        let channels = channels_of(&self.model, x)?;
        self.model.add_layer_with(
            output_args.layer(channels, self.config.num_classes),
            vec![x.into()],
        )
    }

    fn pool(&mut self, x: LayerId) -> Result<LayerId> {
        self.model.add_layer_with(self.spec.pool().layer(), vec![x.into()])
    }

    fn concat(&mut self, x: LayerId, skip: LayerId, context: String) -> Result<LayerId> {
        self.model
            .add_layer_with(Layers::concat_channels(), vec![x.into(), skip.into()])
            .map_err(|err| match err {
                UNetError::ShapeMismatch { left, right, .. } => UNetError::ShapeMismatch {
                    context,
                    left,
                    right,
                },
                other => other,
            })
    }

    fn bind(mut self, input: LayerId, output: LayerId, report: BuildReport) -> Result<UNetModel> {
        let verified = self.model.verify()?;
        if verified.entry_points != [input] || verified.exit_points != [output] {
            return Err(UNetError::GraphModel(format!(
                "Expected a single input {} and output {}, found entries {:?} and exits {:?}",
                input, output, verified.entry_points, verified.exit_points
            )));
        }

        self.model.compile(CompileConfig::default())?;

        info!(
            "built U-Net with {} layers, depth {}, output {}",
            self.model.len(),
            self.config.num_layers,
            self.model.output_shape(output)?
        );

        Ok(UNetModel {
            model: self.model,
            input,
            output,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::layer::LayerKind;

    fn config(num_layers: usize, size: usize) -> BuildConfig {
        BuildConfig {
            input_shape: (size, size, 3),
            num_layers,
            filters: 4,
            upconv_filters: 8,
            ..Default::default()
        }
    }

    #[test]
    fn reference_scenario() {
        let config = BuildConfig {
            input_shape: (256, 256, 3),
            num_classes: 1,
            num_layers: 2,
            filters: 16,
            upconv_filters: 32,
            kernel_size: 3,
            strides: 1,
            pool_size: 2,
            pool_strides: 2,
            ..Default::default()
        };
        let unet = build_unet(&config).unwrap();

        assert_eq!(unet.output_shape().unwrap().dims(), &[1, 1, 256, 256]);
        assert_eq!(unet.report.skip.max_depth, 2);
        assert_eq!(unet.report.skip.pushes, 2);
        assert_eq!(unet.report.skip.pops, 2);
        assert!(unet.report.stack_empty_before_head);
        assert_eq!(unet.model.compiled, Some(CompileConfig::default()));
    }

    #[test]
    fn zero_layers_still_builds() {
        let unet = build_unet(&config(0, 64)).unwrap();

        assert_eq!(unet.output_shape().unwrap().dims(), &[1, 1, 64, 64]);
        assert_eq!(unet.report.skip.pushes, 0);
        assert_eq!(unet.model.count(LayerKind::Concat), 1);
        assert_eq!(unet.model.count(LayerKind::MaxPool), 1);
        assert_eq!(unet.model.count(LayerKind::ConvTranspose), 1);
    }

    #[test]
    fn decoder_channels_follow_upconv_filters() {
        let unet = build_unet(&config(1, 32)).unwrap();

        // every conv right after a concat's batch-norm widens to upconv_filters
        for layer in unet.model.layers.values() {
            if layer.layer.kind() != LayerKind::Concat {
                continue;
            }
            let norm = layer.output_connections[0].get_layerid();
            let conv = unet.model.layer(norm).unwrap().output_connections[0].get_layerid();
            assert_eq!(unet.model.output_shape(conv).unwrap().channels(), Some(8));
        }
    }

    #[test]
    fn mismatched_transpose_stride_is_a_shape_mismatch() {
        let config = BuildConfig {
            transpose_stride: 3,
            ..config(1, 256)
        };

        match build_unet(&config) {
            Err(UNetError::ShapeMismatch { context, .. }) => {
                assert!(context.contains("decoder level 0"), "{}", context);
            }
            Err(other) => panic!("expected shape mismatch, got {}", other),
            Ok(_) => panic!("expected shape mismatch, build succeeded"),
        }
    }

    #[test]
    fn odd_input_is_not_cropped() {
        assert!(matches!(
            build_unet(&config(0, 63)),
            Err(UNetError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn invalid_config_fails_before_building() {
        let config = BuildConfig {
            filters: 0,
            ..Default::default()
        };
        assert!(matches!(
            TopologyBuilder::new(&config),
            Err(UNetError::Configuration(_))
        ));
    }

    #[test]
    fn fifo_decoding_breaks_the_graph() {
        let config = config(2, 64);
        let mut builder = TopologyBuilder::new(&config).unwrap();
        let input = builder
            .model
            .add_layer(Layers::input_buffer(3, 64, 64))
            .unwrap();

        let (stem, x) = builder.stem(input).unwrap();
        let mut skips = SkipStack::new(stem);
        let x = builder.encoder(x, &mut skips).unwrap();
        let x = builder.bottleneck(x).unwrap();

        // oldest skip is at 32×32, the bottleneck output at 16×16
        let oldest = skips.pop_oldest(0).unwrap();
        assert!(matches!(
            builder.concat(x, oldest, "fifo".to_string()),
            Err(UNetError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn decoder_underflow_is_reported() {
        let config = config(1, 32);
        let mut builder = TopologyBuilder::new(&config).unwrap();
        let input = builder
            .model
            .add_layer(Layers::input_buffer(3, 32, 32))
            .unwrap();

        let (stem, x) = builder.stem(input).unwrap();
        let mut skips = SkipStack::new(stem);
        let x = builder.bottleneck(x).unwrap();

        assert!(matches!(
            builder.decoder(x, &mut skips),
            Err(UNetError::StackUnderflow { level: 0 })
        ));
    }

    #[test]
    fn summary_lists_compile_setup() {
        let unet = build_unet(&config(1, 32)).unwrap();
        let summary = unet.summary().unwrap();
        assert!(summary.contains("optimizer=Adam"));
        assert!(summary.contains("iou_thresholded"));
        assert!(summary.contains("ConvTranspose2D"));
    }
}
