use std::time::Duration;

/// Convenience result type used across panelcraft.
pub type PanelResult<T> = Result<T, PanelError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Only [`PanelError::Configuration`] is fatal to a batch. Every other variant is handled at job
/// granularity by the orchestrator and surfaces in the [`crate::BatchSummary`].
#[derive(thiserror::Error, Debug)]
pub enum PanelError {
    /// Malformed campaign, format, override or request data.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A source image could not be decoded or analyzed.
    #[error("image analysis failure: {0}")]
    ImageAnalysis(String),

    /// Rasterization, encoding or output write failed.
    #[error("render failure: {0}")]
    Render(String),

    /// The rasterizer ran out of resources (allocation failure, crashed render thread).
    #[error("resource exhaustion: {0}")]
    ResourceExhaustion(String),

    /// A render call exceeded its per-job deadline.
    #[error("render timed out after {0:?}")]
    Timeout(Duration),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PanelError {
    /// Build a [`PanelError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`PanelError::ImageAnalysis`] value.
    pub fn image_analysis(msg: impl Into<String>) -> Self {
        Self::ImageAnalysis(msg.into())
    }

    /// Build a [`PanelError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`PanelError::ResourceExhaustion`] value.
    pub fn resource_exhaustion(msg: impl Into<String>) -> Self {
        Self::ResourceExhaustion(msg.into())
    }

    /// Build a [`PanelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for errors that must abort a whole batch.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Return `true` for errors that warrant reinitializing the rasterizer and retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ResourceExhaustion(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
