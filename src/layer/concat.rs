use crate::{
    tensor::TensorDesc,
    utils::{Result, UNetError},
};

use super::layer::{Layer, LayerKind};

pub struct ConcatLayer {
    pub dim: usize,
}

impl ConcatLayer {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    /// Concatenation along the channel axis of NCHW tensors.
    pub fn channels() -> Self {
        Self::new(1)
    }
}

impl Layer for ConcatLayer {
    fn output_shapes(&self, _batch_size: usize, input_shapes: &[&TensorDesc]) -> Result<Vec<TensorDesc>> {
        if input_shapes.len() < 2 {
            return Err(UNetError::Layer(format!(
                "Concat layer requires at least 2 inputs, got {}",
                input_shapes.len()
            )));
        }

        let first = input_shapes[0];
        let ndim = first.ndim();

        // Check that concatenation dimension is valid
        if self.dim >= ndim {
            return Err(UNetError::Layer(format!(
                "Concat dimension {} out of range for {}-dimensional tensors",
                self.dim, ndim
            )));
        }

        // For all dimensions except concat_dim, sizes must match. Nothing is
        // cropped or padded to make them fit.
        for shape in input_shapes.iter().skip(1) {
            let aligned = shape.ndim() == ndim
                && (0..ndim)
                    .filter(|&d| d != self.dim)
                    .all(|d| shape.dims()[d] == first.dims()[d]);

            if !aligned {
                return Err(UNetError::shape_mismatch(
                    format!("Concat along dim {}", self.dim),
                    first.dims(),
                    shape.dims(),
                ));
            }
        }

        let mut output_dims = first.dims().to_vec();

        // Sum the sizes along the concat dimension
        output_dims[self.dim] = input_shapes.iter().map(|shape| shape.dims()[self.dim]).sum();

        Ok(vec![TensorDesc::new(output_dims)])
    }

    fn input_requirements(&self) -> (usize, Option<usize>) {
        (2, None) // At least 2 inputs, no maximum
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Concat
    }

    fn name(&self) -> String {
        "Concat".to_string()
    }

    fn config_string(&self) -> Option<String> {
        Some(format!("dim={}", self.dim))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_channels() {
        let a = TensorDesc::image(1, 16, 64, 64);
        let b = TensorDesc::image(1, 32, 64, 64);
        let out = ConcatLayer::channels().output_shapes(1, &[&a, &b]).unwrap();
        assert_eq!(out[0].dims(), &[1, 48, 64, 64]);
    }

    #[test]
    fn spatial_mismatch_is_reported_not_resolved() {
        let a = TensorDesc::image(1, 16, 64, 64);
        let b = TensorDesc::image(1, 16, 32, 32);
        match ConcatLayer::channels().output_shapes(1, &[&a, &b]) {
            Err(UNetError::ShapeMismatch { left, right, .. }) => {
                assert_eq!(left, vec![1, 16, 64, 64]);
                assert_eq!(right, vec![1, 16, 32, 32]);
            }
            other => panic!("expected shape mismatch, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn needs_two_inputs() {
        let a = TensorDesc::image(1, 16, 64, 64);
        assert!(matches!(
            ConcatLayer::channels().output_shapes(1, &[&a]),
            Err(UNetError::Layer(_))
        ));
    }
}
