use crate::{
    layer::factory::Layers,
    model::{graph_model::GraphModel, layer_connection::LayerId},
    utils::{Result, UNetError},
};

use super::args::{ConvArgs, ConvTransposeArgs};

pub(crate) fn channels_of(model: &GraphModel, id: LayerId) -> Result<usize> {
    let shape = model.output_shape(id)?;
    shape.channels().ok_or_else(|| {
        UNetError::GraphModel(format!("Layer {} output {} has no channel axis", id, shape))
    })
}

/// Batch-norm followed by a convolution with `filters` output channels.
pub fn conv_block(
    model: &mut GraphModel,
    input: LayerId,
    filters: usize,
    momentum: f32,
    args: &ConvArgs,
) -> Result<LayerId> {
    let channels = channels_of(model, input)?;
    let norm = model.add_layer_with(Layers::batch_norm(channels, momentum), vec![input.into()])?;
    model.add_layer_with(args.layer(channels, filters), vec![norm.into()])
}

/// Batch-norm followed by a transposed convolution with `filters` output
/// channels.
pub fn upconv_block(
    model: &mut GraphModel,
    input: LayerId,
    filters: usize,
    momentum: f32,
    args: &ConvTransposeArgs,
) -> Result<LayerId> {
    let channels = channels_of(model, input)?;
    let norm = model.add_layer_with(Layers::batch_norm(channels, momentum), vec![input.into()])?;
    model.add_layer_with(args.layer(channels, filters), vec![norm.into()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        layer::layer::LayerKind,
        unet::{args::LayerGroupSpec, config::BuildConfig},
    };

    fn setup() -> (GraphModel, LayerId, LayerGroupSpec) {
        let mut model = GraphModel::new(1);
        let input = model.add_layer(Layers::input_buffer(3, 32, 32)).unwrap();
        let spec = LayerGroupSpec::from_config(&BuildConfig::default());
        (model, input, spec)
    }

    #[test]
    fn conv_block_sets_channel_count() {
        let (mut model, input, spec) = setup();
        let out = conv_block(&mut model, input, 24, 0.99, spec.conv()).unwrap();

        assert_eq!(model.output_shape(out).unwrap().dims(), &[1, 24, 32, 32]);
        assert_eq!(model.count(LayerKind::BatchNorm), 1);
        assert_eq!(model.count(LayerKind::Conv), 1);

        let conv = model.layer(out).unwrap();
        let norm = conv.input_connections[0].get_layerid();
        assert_eq!(model.layer(norm).unwrap().layer.kind(), LayerKind::BatchNorm);
    }

    #[test]
    fn upconv_block_doubles_resolution() {
        let (mut model, input, spec) = setup();
        let out = upconv_block(&mut model, input, 16, 0.99, spec.conv_transpose()).unwrap();

        assert_eq!(model.output_shape(out).unwrap().dims(), &[1, 16, 64, 64]);
        assert_eq!(model.count(LayerKind::ConvTranspose), 1);
    }
}
