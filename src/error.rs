//! Errors from the loading edges of the crate
//!
//! The simulation itself never fails; only reading settings and level
//! campaigns can.

use std::fmt;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Io { path: PathBuf, source: std::io::Error },
    Json(serde_json::Error),
    UnknownLevel { index: u32, count: u32 },
    InvalidLayout(String),
    InvalidSettings(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read {}: {source}", path.display()),
            Self::Json(err) => write!(f, "malformed JSON: {err}"),
            Self::UnknownLevel { index, count } => {
                write!(f, "level {index} does not exist (campaign has {count})")
            }
            Self::InvalidLayout(reason) => write!(f, "invalid level layout: {reason}"),
            Self::InvalidSettings(reason) => write!(f, "invalid settings: {reason}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Read a file to string, tagging failures with the path
pub(crate) fn read_to_string(path: &std::path::Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_unknown_level() {
        let err = Error::UnknownLevel { index: 7, count: 5 };
        assert_eq!(err.to_string(), "level 7 does not exist (campaign has 5)");
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = read_to_string(std::path::Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
