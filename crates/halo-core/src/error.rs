use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Attention shape {layers}x{heads}x{context_length} overflows")]
    ShapeOverflow {
        layers: usize,
        heads: usize,
        context_length: usize,
    },

    #[error("Attention payload has {actual} values, shape expects {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Config error: {0}")]
    Config(String),
}
