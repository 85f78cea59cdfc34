use thiserror::Error;

/// Failures raised by the analysis core.
///
/// Surface mode recovers from member failures by skipping the member with an
/// alert; on a single topography every error propagates.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A line scan whose positions are not strictly increasing.
    #[error("reentrant line scan: position {position} at index {index} does not exceed its predecessor")]
    ReentrantData { index: usize, position: f64 },

    #[error("invalid bin specification: {0}")]
    InvalidBins(String),

    #[error("malformed height data: {0}")]
    MalformedInput(String),

    #[error("surface '{0}' contains no topographies")]
    EmptySurface(String),

    #[error("workflow '{workflow}' does not support this subject: {reason}")]
    UnsupportedSubject {
        workflow: &'static str,
        reason: &'static str,
    },

    #[error("unknown workflow '{0}'")]
    UnknownWorkflow(String),

    #[error("invalid workflow parameters: {0}")]
    InvalidParameters(#[from] serde_json::Error),
}

impl AnalysisError {
    pub fn is_reentrant(&self) -> bool {
        matches!(self, AnalysisError::ReentrantData { .. })
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
