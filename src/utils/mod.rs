pub mod error;
pub mod padding;

pub use error::{Result, UNetError};
pub use padding::Padding;
