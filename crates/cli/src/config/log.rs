use std::{fs::OpenOptions, path::PathBuf};

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use tracing_subscriber::{
    layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt, Layer,
};

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LogConfig {
    #[serde(default = "LogConfig::default_file_path")]
    pub file_path: Option<PathBuf>,

    #[serde(default = "LogConfig::default_emit_journald")]
    pub emit_journald: bool,

    #[serde(default = "LogConfig::default_emit_stdout")]
    pub emit_stdout: bool,

    #[serde(default = "LogConfig::default_emit_stderr")]
    pub emit_stderr: bool,

    #[serde(default = "LogConfig::default_log_level")]
    #[serde_as(as = "DisplayFromStr")]
    pub level: tracing::Level,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file_path: Self::default_file_path(),
            emit_journald: Self::default_emit_journald(),
            emit_stdout: Self::default_emit_stdout(),
            emit_stderr: Self::default_emit_stderr(),
            level: Self::default_log_level(),
        }
    }
}

impl LogConfig {
    #[inline]
    #[must_use]
    pub const fn default_log_level() -> tracing::Level { tracing::Level::WARN }

    #[inline]
    #[must_use]
    pub const fn default_file_path() -> Option<PathBuf> { None }

    #[inline]
    #[must_use]
    pub const fn default_emit_journald() -> bool { false }

    #[inline]
    #[must_use]
    pub const fn default_emit_stdout() -> bool { false }

    #[inline]
    #[must_use]
    pub const fn default_emit_stderr() -> bool { true }

    /// Installs the global subscriber.
    ///
    /// Outputs which cannot be opened are skipped and reported once the others are up.
    pub fn registry(&self) {
        let Self { emit_journald, file_path, emit_stdout, emit_stderr, level: log_level } = self;

        let filter_layer = tracing_subscriber::filter::LevelFilter::from_level(*log_level);
        let mut failures = Vec::new();

        tracing_subscriber::registry()
            .with(filter_layer)
            .with(emit_journald.then_some(LogDriver::Journald).and_then(|d| d.open(&mut failures)))
            .with(file_path.clone().and_then(|path| LogDriver::File(path).open(&mut failures)))
            .with(emit_stdout.then_some(LogDriver::Stdout).and_then(|d| d.open(&mut failures)))
            .with(emit_stderr.then_some(LogDriver::Stderr).and_then(|d| d.open(&mut failures)))
            .init();

        for failure in failures {
            tracing::warn!("Could not open log output {failure}");
        }
    }
}

#[derive(Clone, Debug)]
enum LogDriver {
    Stdout,
    Stderr,
    Journald,
    File(PathBuf),
}

impl LogDriver {
    #[allow(clippy::type_repetition_in_bounds)]
    fn open<S>(
        self,
        failures: &mut Vec<String>,
    ) -> Option<Box<dyn Layer<S> + Send + Sync + 'static>>
    where
        S: tracing::Subscriber,
        for<'a> S: LookupSpan<'a>,
    {
        let name = match &self {
            Self::File(path) => format!("`{}`", path.display()),
            driver => format!("{driver:?}"),
        };
        self.layer().map_err(|err| failures.push(format!("{name}, error: {err}"))).ok()
    }

    #[allow(clippy::type_repetition_in_bounds)]
    fn layer<S>(self) -> std::io::Result<Box<dyn Layer<S> + Send + Sync + 'static>>
    where
        S: tracing::Subscriber,
        for<'a> S: LookupSpan<'a>,
    {
        // Shared configuration regardless of where logs are output to.
        let fmt =
            tracing_subscriber::fmt::layer().pretty().with_thread_ids(true).with_thread_names(true);

        match self {
            Self::Stdout => Ok(Box::new(fmt.with_writer(std::io::stdout))),
            Self::Stderr => Ok(Box::new(fmt.with_writer(std::io::stderr))),
            Self::File(path) => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                Ok(Box::new(fmt.with_writer(file)))
            }
            Self::Journald => Ok(Box::new(tracing_journald::layer()?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LogConfig;

    #[test]
    fn test_default_values_fill_missing_keys() {
        let config: LogConfig = toml::from_str("level = \"debug\"").unwrap();
        assert_eq!(config.level, tracing::Level::DEBUG);
        assert!(config.emit_stderr);
        assert!(!config.emit_journald);
        assert!(config.file_path.is_none());

        let config: LogConfig = toml::from_str("").unwrap();
        assert_eq!(config.level, LogConfig::default_log_level());
    }
}
