use thiserror::Error;

pub type Result<T> = std::result::Result<T, IngestError>;

/// Coarse category used by callers to pick a response (bad request, upstream failure, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Decode,
    ExternalTool,
    Container,
    Io,
}

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Invalid repository URL: {url} (expected a URL starting with {expected_prefix})")]
    InvalidRepositoryUrl {
        url: String,
        expected_prefix: String,
    },

    #[error("No files selected")]
    NoFilesSelected,

    #[error("Upload too large: {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: u64, limit: u64 },

    #[error("No supported files found")]
    NoEligibleFiles,

    #[error("File {path} is not valid UTF-8 text")]
    Decode { path: String },

    #[error("Failed to clone repository: {stderr}")]
    CloneFailed { stderr: String },

    #[error("Repository clone timed out after {secs}s")]
    CloneTimeout { secs: u64 },

    #[error("Could not run git: {0}")]
    GitUnavailable(#[source] std::io::Error),

    #[error("Invalid zip archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRepositoryUrl { .. }
            | Self::NoFilesSelected
            | Self::PayloadTooLarge { .. }
            | Self::NoEligibleFiles
            | Self::InvalidConfig(_) => ErrorKind::Validation,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::CloneFailed { .. } | Self::CloneTimeout { .. } | Self::GitUnavailable(_) => {
                ErrorKind::ExternalTool
            }
            Self::Archive(_) => ErrorKind::Container,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn decode(path: impl Into<String>) -> Self {
        Self::Decode { path: path.into() }
    }
}
