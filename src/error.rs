// src/error.rs

//! Error types for godeb
//!
//! Every failure aborts the current operation; nothing here is retried.

use std::io;
use thiserror::Error;

/// Result type for godeb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while listing, translating or installing releases
#[derive(Error, Debug)]
pub enum Error {
    /// Source stream is not gzip data
    #[error("cannot uncompress upstream tarball: {0}")]
    Uncompress(#[source] io::Error),

    /// Source stream is not a readable tar archive, or is truncated
    #[error("cannot read upstream tarball: {0}")]
    ReadSource(#[source] io::Error),

    /// An entry lies outside the expected top-level directory
    #[error("upstream tarball has file in unexpected path: {0}")]
    UnexpectedLayout(String),

    /// An entry kind other than file, directory or symlink
    #[error("upstream tarball has unsupported entry {path} of type {kind}")]
    UnsupportedEntry { path: String, kind: String },

    /// Name does not fit the selected tar header dialect
    #[error("path too long for {dialect} tar header: {path}")]
    PathTooLong { dialect: &'static str, path: String },

    /// Write failure at a named emission point
    #[error("cannot write {stage}: {source}")]
    Write {
        stage: String,
        #[source]
        source: io::Error,
    },

    /// The go package is not installed (or dpkg is not available)
    #[error("package go is not installed")]
    NotInstalled,

    /// A required external tool could not be run
    #[error("{tool} is not available: {message}")]
    ToolMissing { tool: String, message: String },

    /// An external command ran but failed
    #[error("{0}")]
    Command(String),

    #[error("go version {0} is already installed")]
    AlreadyInstalled(String),

    #[error("version {version} not available at {sources}")]
    VersionNotFound { version: String, sources: String },

    #[error("no downloads available at {0}")]
    NoReleases(String),

    #[error("download failed: {0}")]
    Download(String),

    #[error("cannot parse {0}")]
    Parse(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a write error for the given emission stage
    pub fn write(stage: impl Into<String>, source: io::Error) -> Self {
        Self::Write {
            stage: stage.into(),
            source,
        }
    }

    /// True for the informational "not installed" condition
    pub fn is_not_installed(&self) -> bool {
        matches!(self, Self::NotInstalled)
    }
}
