use halo_capture::CaptureError;

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("Invalid strategy config: {0}")]
    InvalidConfig(String),

    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),
}
