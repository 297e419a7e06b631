use std::fmt;

/// One of the two stages of the silk program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Vertex,
    Fragment,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Vertex => f.write_str("vertex"),
            StageKind::Fragment => f.write_str("fragment"),
        }
    }
}

/// Failure while turning GLSL sources into a usable program.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("{stage} stage failed to compile: {diagnostic}")]
    StageCompileFailed { stage: StageKind, diagnostic: String },
    #[error("program failed to link: {diagnostic}")]
    LinkFailed { diagnostic: String },
}

/// Everything that can stop a renderer instance from producing frames.
///
/// None of these are fatal to the host; the instance simply renders nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RendererError {
    #[error("GPU rendering context unavailable: {0}")]
    ContextUnavailable(String),
    #[error("{stage} stage failed to compile: {diagnostic}")]
    StageCompileFailed { stage: StageKind, diagnostic: String },
    #[error("program failed to link: {diagnostic}")]
    LinkFailed { diagnostic: String },
    #[error("GPU allocation failed: {0}")]
    AllocationFailed(String),
}

impl From<BuildError> for RendererError {
    fn from(value: BuildError) -> Self {
        match value {
            BuildError::StageCompileFailed { stage, diagnostic } => {
                RendererError::StageCompileFailed { stage, diagnostic }
            }
            BuildError::LinkFailed { diagnostic } => RendererError::LinkFailed { diagnostic },
        }
    }
}

/// Per-frame draw failure reported by a rendering context.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// Transient; the frame is dropped and the loop keeps running.
    #[error("frame skipped: {0}")]
    Skip(String),
    /// The context cannot draw again (e.g. out of memory).
    #[error("fatal frame error: {0}")]
    Fatal(String),
}
