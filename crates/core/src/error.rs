use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibrarianError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to spawn {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        source: std::io::Error,
    },
    #[error("duplicate category: {0}")]
    DuplicateCategory(String),
    #[error("duplicate field {field} in category {category}")]
    DuplicateField { category: String, field: String },
    #[error("wire key {0} is used by more than one field")]
    DuplicateWireKey(String),
    #[error("schema names must not be empty")]
    EmptyName,
    #[error("expected {expected} filter descriptors, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },
    #[error("render error: {0}")]
    Render(#[from] askama::Error),
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LibrarianError>;
