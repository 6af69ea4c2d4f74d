//! Subscriber bootstrap for host binaries and test harnesses.
//!
//! The engine itself only emits `tracing` events. Hosts that have no
//! subscriber of their own can call [`init_tracing`] once at startup.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{EngineError, EngineResult};

pub const DEFAULT_DIRECTIVE: &str = "danci_pathway=info";
pub const LOG_FILE_PREFIX: &str = "pathway.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// `EnvFilter` directive, e.g. `danci_pathway=debug`.
    pub directive: String,
    /// Directory for the daily rolling file; stdout only when `None`.
    pub file_dir: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            directive: DEFAULT_DIRECTIVE.to_string(),
            file_dir: None,
        }
    }
}

impl LogSettings {
    /// Reads `RUST_LOG`, `PATHWAY_FILE_LOGS` and `PATHWAY_LOG_DIR`.
    pub fn from_env() -> Self {
        let directive = std::env::var("RUST_LOG")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DIRECTIVE.to_string());

        let file_dir = file_logging_enabled().then(|| {
            PathBuf::from(std::env::var("PATHWAY_LOG_DIR").unwrap_or_else(|_| "./logs".to_string()))
        });

        Self { directive, file_dir }
    }

    pub fn with_file_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.file_dir = Some(dir.into());
        self
    }
}

/// Keeps the non-blocking file writer flushing; drop it at shutdown.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

pub fn file_logging_enabled() -> bool {
    matches!(
        std::env::var("PATHWAY_FILE_LOGS").as_deref(),
        Ok("true") | Ok("1")
    )
}

/// Installs the global subscriber.
///
/// Returns `Ok(None)` when another subscriber is already installed or no file
/// layer was requested.
pub fn init_tracing(settings: &LogSettings) -> EngineResult<Option<FileLogGuard>> {
    let filter = EnvFilter::try_new(&settings.directive).map_err(|e| {
        EngineError::InvalidConfig(format!("log directive {:?}: {e}", settings.directive))
    })?;

    let (file_layer, guard) = match &settings.file_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| {
                EngineError::InvalidConfig(format!("log directory {}: {e}", dir.display()))
            })?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(FileLogGuard { _guard: guard }))
        }
        None => (None, None),
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .try_init()
        .is_ok();

    Ok(if installed { guard } else { None })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_directive_is_invalid_config() {
        let settings = LogSettings {
            directive: "danci_pathway=loudest".to_string(),
            file_dir: None,
        };
        assert!(matches!(
            init_tracing(&settings),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_repeated_init_is_harmless() {
        let _first = init_tracing(&LogSettings::default()).unwrap();
        let second = init_tracing(&LogSettings::default()).unwrap();
        assert!(second.is_none());
        tracing::info!(component = "logging", "subscriber installed");
    }

    #[test]
    fn test_with_file_dir() {
        let settings = LogSettings::default().with_file_dir("/tmp/pathway-logs");
        assert_eq!(settings.file_dir, Some(PathBuf::from("/tmp/pathway-logs")));
        assert_eq!(settings.directive, DEFAULT_DIRECTIVE);
    }
}
