//! Crate-level error types.

use std::path::PathBuf;

use crate::clustering::ClusterError;
use crate::config::ConfigError;

/// Failure while writing logs, telemetry, or snapshots to disk.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl ExportError {
    pub(crate) fn io(path: &std::path::Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Errors that abort a run before or after the tick loop.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("{} configuration error(s): {}", .0.len(), join(.0))]
    Config(Vec<ConfigError>),

    #[error(transparent)]
    Clustering(#[from] ClusterError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl From<ConfigError> for SimError {
    fn from(err: ConfigError) -> Self {
        Self::Config(vec![err])
    }
}

fn join(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_are_listed() {
        let err = SimError::Config(vec![
            ConfigError {
                field: "a".into(),
                message: "bad".into(),
            },
            ConfigError {
                field: "b".into(),
                message: "worse".into(),
            },
        ]);
        let text = err.to_string();
        assert!(text.starts_with("2 configuration error(s)"));
        assert!(text.contains("config error: b: worse"));
    }

    #[test]
    fn cluster_errors_pass_through() {
        let err: SimError = ClusterError::Empty.into();
        assert_eq!(err.to_string(), "clustering produced no microgrids");
    }
}
