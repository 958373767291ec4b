use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Dockerfile is not readable: {path}: {message}")]
    DockerfileUnreadable { path: PathBuf, message: String },

    #[error("Failed to construct build context archive: {0}")]
    ArchiveConstruction(String),

    #[error("Build timed out after {0} seconds")]
    BuildTimeout(u64),

    #[error("Build failed: {0}")]
    BuildFailed(String),

    #[error("Tag operation timed out after {0} seconds")]
    TagTimeout(u64),

    #[error("Failed to tag image: {0}")]
    TagFailed(String),

    #[error("Push failed: {0}")]
    PushFailed(String),

    #[error("Pull failed: {0}")]
    PullFailed(String),

    #[error("Docker connection error: {0}")]
    DockerConnection(#[from] bollard::errors::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ImageResult<T> = std::result::Result<T, ImageError>;
