use std::path::PathBuf;

use thiserror::Error;

/// Failure to read a qrels or run file. Line numbers are 1-based.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed qrels line {line} in {path}: {reason}")]
    Qrels {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("malformed run line {line} in {path}: {reason}")]
    Run {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

impl ParseError {
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Io { .. } => None,
            Self::Qrels { line, .. } | Self::Run { line, .. } => Some(*line),
        }
    }
}

/// Problems with the command inputs. Detected before anything is written.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("qrels file does not exist: {0}")]
    QrelsMissing(PathBuf),

    #[error("qrels path is not a file: {0}")]
    QrelsNotAFile(PathBuf),

    #[error("input directory does not exist: {0}")]
    InputMissing(PathBuf),

    #[error("input path is not a directory: {0}")]
    InputNotADirectory(PathBuf),

    #[error("output directory does not exist: {0}")]
    OutputMissing(PathBuf),

    #[error("output path is not a directory: {0}")]
    OutputNotADirectory(PathBuf),

    #[error("output directory is not empty: {0}")]
    OutputNotEmpty(PathBuf),
}
