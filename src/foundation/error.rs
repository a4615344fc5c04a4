/// Convenience result type used across Reelforge.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error taxonomy used by engine APIs.
///
/// The fatal/recoverable split is decided by callers: `ImageLoad`, `Config`
/// and `Render` are recovered per scene inside the engine, while `Input`,
/// `Encode` and `Cancelled` abort the assembly.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Missing or unreadable required input (audio, images, captions).
    #[error("input error: {0}")]
    Input(String),

    /// A single image failed to decode or resize.
    #[error("image load error: {0}")]
    ImageLoad(String),

    /// Invalid configuration or scene timing data.
    #[error("config error: {0}")]
    Config(String),

    /// A frame transform or composition step failed.
    #[error("render error: {0}")]
    Render(String),

    /// The final video writer failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// The assembly was cancelled between frame batches.
    #[error("assembly cancelled")]
    Cancelled,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Input`] value.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Build a [`ReelError::ImageLoad`] value.
    pub fn image_load(msg: impl Into<String>) -> Self {
        Self::ImageLoad(msg.into())
    }

    /// Build a [`ReelError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`ReelError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`ReelError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}
