use std::fmt::{Display, Formatter, Result as FmtResult};

/// Shape of one node in the graph, `[batch, channels, height, width]`.
///
/// Descriptors carry no data. The graph owns them, layers only read them to
/// work out the shape of what they produce.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TensorDesc {
    dims: Vec<usize>,
}

impl TensorDesc {
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    pub fn image(batch: usize, channels: usize, height: usize, width: usize) -> Self {
        Self::new(vec![batch, channels, height, width])
    }

    // saturates instead of overflowing on absurd shapes
    pub fn num_elements(&self) -> usize {
        self.dims.iter().fold(1, |acc, &d| acc.saturating_mul(d))
    }

    // assuming f32 elements
    pub fn size_in_bytes(&self) -> usize {
        self.num_elements().saturating_mul(std::mem::size_of::<f32>())
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Batch size, `None` for an empty descriptor.
    pub fn batch(&self) -> Option<usize> {
        self.dims.first().copied()
    }

    /// Channel count, `None` for descriptors without a channel axis.
    pub fn channels(&self) -> Option<usize> {
        self.dims.get(1).copied()
    }

    /// Spatial extent (everything after the channel axis).
    pub fn spatial(&self) -> &[usize] {
        if self.dims.len() > 2 { &self.dims[2..] } else { &[] }
    }

    pub fn is_image(&self) -> bool {
        self.dims.len() == 4
    }
}

impl Display for TensorDesc {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let dims = self
            .dims
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join("×");
        write!(f, "{}", dims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_accessors() {
        let desc = TensorDesc::image(1, 16, 128, 64);
        assert_eq!(desc.batch(), Some(1));
        assert_eq!(desc.channels(), Some(16));
        assert_eq!(desc.spatial(), &[128, 64]);
        assert_eq!(desc.num_elements(), 16 * 128 * 64);
        assert_eq!(desc.size_in_bytes(), 16 * 128 * 64 * 4);
        assert_eq!(desc.to_string(), "1×16×128×64");
    }

    #[test]
    fn vectors_have_no_spatial_axes() {
        let desc = TensorDesc::new(vec![8]);
        assert!(desc.spatial().is_empty());
        assert_eq!(desc.channels(), None);
        assert!(!desc.is_image());
    }

    #[test]
    fn empty_descriptor_is_inert() {
        let desc = TensorDesc::new(Vec::new());
        assert_eq!(desc.batch(), None);
        assert_eq!(desc.channels(), None);
        assert!(desc.spatial().is_empty());
        assert_eq!(desc.to_string(), "");
    }

    #[test]
    fn huge_shapes_saturate() {
        let desc = TensorDesc::new(vec![usize::MAX, 2, 2, 2]);
        assert_eq!(desc.num_elements(), usize::MAX);
        assert_eq!(desc.size_in_bytes(), usize::MAX);
    }
}
