use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("unknown color scheme: {name} (expected \"light\" or \"dark\")")]
    UnknownScheme { name: String },

    #[error("source directory not found: {}", path.display())]
    MissingSource { path: PathBuf },

    #[error(
        "output directory {} contains source directory {}",
        output_dir.display(),
        source_dir.display()
    )]
    OutputOverlapsSource {
        output_dir: PathBuf,
        source_dir: PathBuf,
    },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
