pub mod args;
pub mod blocks;
pub mod builder;
pub mod config;
pub mod skip_stack;

pub use builder::{BuildReport, TopologyBuilder, UNetModel, build_unet};
pub use config::{BuildConfig, OutputArgs};
