//! unet-graph - Graph topology builder for U-Net segmentation models
//!
//! Describes an encoder-decoder network as a shape-checked layer graph, with
//! skip connections wired through an explicit stack, and stages training
//! imagery from an object store.

pub mod layer;

pub mod metrics;

pub mod model;

pub mod storage;

pub mod tensor;

pub mod unet;

pub mod utils;

pub use layer::{factory::Layers, layer::LayerKind};
pub use model::{
    compile::CompileConfig, graph_model::GraphModel, layer_connection::LayerConnection,
};
pub use unet::{BuildConfig, BuildReport, OutputArgs, TopologyBuilder, UNetModel, build_unet};
pub use utils::{Result, UNetError};
