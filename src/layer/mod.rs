pub mod activations;
pub mod batch_norm;
pub mod concat;
pub mod conv;
pub mod conv_transpose;
pub mod factory;
pub mod input_buffer;
pub mod layer;
pub mod maxpool;
