use thiserror::Error;

/// A result type for kernel evaluation and GP inference
pub type Result<T> = std::result::Result<T, GpError>;

/// An error when evaluating distances, kernels or an [`ExactInferenceGp`](crate::ExactInferenceGp)
#[derive(Error, Debug)]
pub enum GpError {
    /// When two point sets (or a mean and a covariance) do not have compatible shapes
    #[error("Shape mismatch error: {0}")]
    ShapeMismatchError(String),
    /// When a value cannot be interpreted as a numeric scalar or a rectangular array
    #[error("Type conversion error: {0}")]
    TypeConversionError(String),
    /// When an unknown mean function or kernel variant is requested
    #[error("Invalid configuration error: {0}")]
    InvalidConfigurationError(String),
    /// When error due to a bad value
    #[error("InvalidValue error: {0}")]
    InvalidValueError(String),
    #[error(transparent)]
    /// When linear algebra computation fails
    LinalgError(#[from] linfa_linalg::LinalgError),
    /// When a linfa error occurs
    #[error(transparent)]
    LinfaError(#[from] linfa::error::Error),
}
