use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CocodeError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "the report {} already exists, change the name of the report or remove the existing file",
        .0.display()
    )]
    ReportExists(PathBuf),

    #[error("can't find the report {}", .0.display())]
    ReportMissing(PathBuf),

    #[error("malformed report {}: {message}", .path.display())]
    ReportParse { path: PathBuf, message: String },

    #[error("failed to serialize report {}: {message}", .path.display())]
    ReportWrite { path: PathBuf, message: String },

    #[error("failed to load the C++ grammar: {0}")]
    Language(String),

    #[error("tree-sitter produced no syntax tree")]
    ParseFailed,
}

impl CocodeError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CocodeError::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, CocodeError>;
