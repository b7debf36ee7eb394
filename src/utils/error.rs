use thiserror::Error;

pub type Result<T> = std::result::Result<T, UNetError>;

#[derive(Error, Debug)]
pub enum UNetError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Shape mismatch in {context}: {left:?} vs {right:?}")]
    ShapeMismatch {
        context: String,
        left: Vec<usize>,
        right: Vec<usize>,
    },

    #[error("Skip stack underflow at decoder level {level}")]
    StackUnderflow { level: usize },

    #[error("Graph Model error: {0}")]
    GraphModel(String),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),
}

impl UNetError {
    pub fn shape_mismatch(context: impl Into<String>, left: &[usize], right: &[usize]) -> Self {
        UNetError::ShapeMismatch {
            context: context.into(),
            left: left.to_vec(),
            right: right.to_vec(),
        }
    }
}
