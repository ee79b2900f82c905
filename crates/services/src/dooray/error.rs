use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// Which upstream call an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Drives,
    Folders,
    Files,
    Member,
    Meta,
    Download,
    Upload,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Drives => "drives",
            Step::Folders => "folders",
            Step::Files => "files",
            Step::Member => "member",
            Step::Meta => "meta",
            Step::Download => "download",
            Step::Upload => "upload",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{step}: request failed: {source}")]
    Transport {
        step: Step,
        #[source]
        source: reqwest::Error,
    },
    #[error("{step}: upstream answered {status}: {body}")]
    Status {
        step: Step,
        status: StatusCode,
        body: String,
    },
    #[error("{step}: upstream rejected the call ({code}): {message}")]
    Rejected {
        step: Step,
        code: i64,
        message: String,
    },
    #[error("{step}: malformed response: {detail}")]
    Malformed { step: Step, detail: String },
}

impl UpstreamError {
    pub fn step(&self) -> Step {
        match self {
            UpstreamError::Transport { step, .. }
            | UpstreamError::Status { step, .. }
            | UpstreamError::Rejected { step, .. }
            | UpstreamError::Malformed { step, .. } => *step,
        }
    }

    /// HTTP status the upstream answered with, when it answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            UpstreamError::Transport { source, .. } => source.status(),
            _ => None,
        }
    }

    /// The upstream refused the token itself.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN)
        )
    }

    pub(crate) fn transport(step: Step) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| UpstreamError::Transport { step, source }
    }

    pub(crate) fn malformed(step: Step, detail: impl Into<String>) -> Self {
        UpstreamError::Malformed {
            step,
            detail: detail.into(),
        }
    }
}
