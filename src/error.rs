use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("no company tuples matched in {} (unexpected SQL format?)", .0.display())]
    ZeroMatches(PathBuf),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("interrupted by user")]
    Interrupted,

    #[error("PDF extraction failed for {}: {message}", path.display())]
    Pdf { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, SeedError>;
