//! CLI error type with process exit codes

use std::path::PathBuf;

/// Errors surfaced to the CLI user
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The settings file could not be read
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        /// Path the user supplied
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid TOML
    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        /// Path the user supplied
        path: PathBuf,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },

    /// The stats capability is absent on this host
    #[error("stats source not available")]
    Unavailable,

    /// JSON output could not be produced
    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code for this error
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigRead { .. } | Self::ConfigParse { .. } => 2,
            Self::Unavailable => 3,
            Self::Serialize(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Unavailable.exit_code(), 3);
        let err = CliError::ConfigRead {
            path: PathBuf::from("/tmp/missing.toml"),
            source: std::io::Error::other("nope"),
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_unavailable_message() {
        assert_eq!(
            CliError::Unavailable.to_string(),
            hostscope_core::SOURCE_UNAVAILABLE_ERROR
        );
    }
}
