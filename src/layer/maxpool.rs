use crate::{
    tensor::TensorDesc,
    utils::{Padding, Result, UNetError, padding::window_output_len},
};

use super::layer::{Layer, LayerKind, single_image_input};

#[derive(Clone)]
pub struct MaxPoolLayer {
    pub pool_size: usize,
    pub stride: usize,
    pub padding: Padding,
}

impl MaxPoolLayer {
    pub fn new_with(pool_size: usize, stride: usize, padding: Padding) -> Self {
        Self {
            pool_size,
            stride,
            padding,
        }
    }
}

impl Layer for MaxPoolLayer {
    fn output_shapes(&self, batch_size: usize, input_shapes: &[&TensorDesc]) -> Result<Vec<TensorDesc>> {
        let input_shape = single_image_input("MaxPool2D", input_shapes)?;

        let channels = input_shape.dims()[1];
        let mut out_dims = vec![batch_size, channels];
        for &extent in input_shape.spatial() {
            let out = window_output_len(extent, self.pool_size, self.stride, self.padding)
                .ok_or_else(|| {
                    UNetError::Layer(format!(
                        "MaxPool2D window {} with stride {} does not fit input {}",
                        self.pool_size, self.stride, input_shape
                    ))
                })?;
            out_dims.push(out);
        }

        Ok(vec![TensorDesc::new(out_dims)])
    }

    fn input_requirements(&self) -> (usize, Option<usize>) {
        (1, Some(1))
    }

    fn kind(&self) -> LayerKind {
        LayerKind::MaxPool
    }

    fn name(&self) -> String {
        "MaxPool2D".to_string()
    }

    fn config_string(&self) -> Option<String> {
        Some(format!(
            "pool={}×{}, stride={}×{}, padding={}",
            self.pool_size,
            self.pool_size,
            self.stride,
            self.stride,
            self.padding.as_str()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halves_resolution() {
        let pool = MaxPoolLayer::new_with(2, 2, Padding::Valid);
        let input = TensorDesc::image(1, 16, 256, 256);
        let out = pool.output_shapes(1, &[&input]).unwrap();
        assert_eq!(out[0].dims(), &[1, 16, 128, 128]);
    }

    #[test]
    fn odd_input_floors_with_valid_padding() {
        let pool = MaxPoolLayer::new_with(2, 2, Padding::Valid);
        let input = TensorDesc::image(1, 4, 15, 15);
        let out = pool.output_shapes(1, &[&input]).unwrap();
        assert_eq!(out[0].spatial(), &[7, 7]);
    }

    #[test]
    fn odd_input_rounds_up_with_same_padding() {
        let pool = MaxPoolLayer::new_with(2, 2, Padding::Same);
        let input = TensorDesc::image(1, 4, 15, 15);
        let out = pool.output_shapes(1, &[&input]).unwrap();
        assert_eq!(out[0].spatial(), &[8, 8]);
    }
}
