use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is absent or empty
    #[error("Required environment variable not found: {0}")]
    MissingEnv(&'static str),

    /// The setup file could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The setup file is not valid JSON or misses a field
    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The polling policy has a zero interval, timeout or attempt count
    #[error("Invalid poll policy: {0}")]
    InvalidPollPolicy(&'static str),
}
