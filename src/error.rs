use thiserror::Error;

#[derive(Error, Debug)]
pub enum FusionError {
    #[error("Input contract violation: {0}")]
    InputContractViolation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FusionError>;

// Helper functions for creating errors
impl FusionError {
    pub fn input_contract(msg: impl Into<String>) -> Self {
        FusionError::InputContractViolation(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        FusionError::Configuration(msg.into())
    }

    /// Whether the error rejects a single frame rather than the whole setup.
    pub fn is_frame_local(&self) -> bool {
        matches!(self, FusionError::InputContractViolation(_))
    }
}
