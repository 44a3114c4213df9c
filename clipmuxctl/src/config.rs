use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use clipmux_client::ServiceOptions;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "Config::default_durable")]
    pub durable: bool,

    #[serde(default = "Config::default_filename_prefix")]
    pub filename_prefix: String,

    #[serde(default = "Config::default_registry_store_name")]
    pub registry_store_name: String,

    #[serde(default = "Config::default_authority")]
    pub authority: String,

    #[serde(default = "Config::default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "Config::default_cache_dir")]
    pub cache_dir: PathBuf,

    #[serde(default = "Config::default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "Config::default_reset_session_on_clear")]
    pub reset_session_on_clear: bool,

    #[serde(default)]
    pub log: clipmux_cli::config::LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            durable: Self::default_durable(),
            filename_prefix: Self::default_filename_prefix(),
            registry_store_name: Self::default_registry_store_name(),
            authority: Self::default_authority(),
            data_dir: Self::default_data_dir(),
            cache_dir: Self::default_cache_dir(),
            poll_interval_ms: Self::default_poll_interval_ms(),
            reset_session_on_clear: Self::default_reset_session_on_clear(),
            log: clipmux_cli::config::LogConfig::default(),
        }
    }
}

impl Config {
    #[inline]
    pub fn default_path() -> PathBuf {
        [
            clipmux_base::PROJECT_CONFIG_DIR.to_path_buf(),
            PathBuf::from(clipmux_base::CTL_CONFIG_NAME),
        ]
        .into_iter()
        .collect()
    }

    #[inline]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let data = std::fs::read_to_string(&path)
            .context(OpenConfigSnafu { filename: path.as_ref().to_path_buf() })?;

        toml::from_str(&data).context(ParseConfigSnafu { filename: path.as_ref().to_path_buf() })
    }

    #[inline]
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(&path) {
            Ok(config) => config,
            Err(Error::OpenConfig { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Self::default()
            }
            Err(err) => {
                eprintln!("{err}, fall back to default configuration");
                Self::default()
            }
        }
    }

    #[inline]
    pub const fn default_durable() -> bool { true }

    #[inline]
    pub fn default_filename_prefix() -> String {
        clipmux_base::DEFAULT_FILENAME_PREFIX.to_string()
    }

    #[inline]
    pub fn default_registry_store_name() -> String {
        clipmux_base::DEFAULT_REGISTRY_STORE_NAME.to_string()
    }

    #[inline]
    pub fn default_authority() -> String { clipmux_base::DEFAULT_AUTHORITY.to_string() }

    #[inline]
    pub fn default_data_dir() -> PathBuf { clipmux_base::PROJECT_DATA_DIR.to_path_buf() }

    #[inline]
    pub fn default_cache_dir() -> PathBuf { clipmux_base::PROJECT_CACHE_DIR.to_path_buf() }

    #[inline]
    pub const fn default_poll_interval_ms() -> u64 { 250 }

    #[inline]
    pub const fn default_reset_session_on_clear() -> bool { true }

    #[inline]
    pub const fn poll_interval(&self) -> Duration { Duration::from_millis(self.poll_interval_ms) }

    #[inline]
    pub const fn service_options(&self) -> ServiceOptions {
        ServiceOptions { reset_session_on_clear: self.reset_session_on_clear }
    }
}

impl From<Config> for clipmux_provider::Config {
    fn from(config: Config) -> Self {
        let Config {
            durable,
            filename_prefix,
            registry_store_name,
            authority,
            data_dir,
            cache_dir,
            ..
        } = config;
        Self { durable, filename_prefix, registry_store_name, authority, data_dir, cache_dir }
    }
}

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Could not open config from {}: {source}", filename.display()))]
    OpenConfig { filename: PathBuf, source: std::io::Error },

    #[snafu(display("Could not parse config from {}: {source}", filename.display()))]
    ParseConfig { filename: PathBuf, source: toml::de::Error },
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::Config;

    #[test]
    fn test_missing_keys_take_defaults() {
        let config: Config = toml::from_str(
            r#"
durable = false
authority = "org.example.provider"
data_dir = "/tmp/clipmux/data"

[log]
level = "debug"
"#,
        )
        .unwrap();
        assert!(!config.durable);
        assert_eq!(config.poll_interval_ms, Config::default_poll_interval_ms());
        assert!(config.reset_session_on_clear);
        assert_eq!(config.log.level, tracing::Level::DEBUG);

        let provider_config = clipmux_provider::Config::from(config);
        assert_eq!(provider_config.authority, "org.example.provider");
        assert_eq!(provider_config.data_dir, PathBuf::from("/tmp/clipmux/data"));
        assert_eq!(provider_config.filename_prefix, clipmux_base::DEFAULT_FILENAME_PREFIX);
    }

    #[test]
    fn test_load_or_default() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("clipmuxctl.toml");
        assert_eq!(Config::load_or_default(&file_path).authority, Config::default_authority());

        std::fs::write(&file_path, "poll_interval_ms = 50\n").unwrap();
        assert_eq!(Config::load_or_default(&file_path).poll_interval_ms, 50);

        std::fs::write(&file_path, "poll_interval_ms = \"often\"\n").unwrap();
        assert!(Config::load(&file_path).is_err());
        assert_eq!(
            Config::load_or_default(&file_path).poll_interval_ms,
            Config::default_poll_interval_ms()
        );
    }

    #[test]
    fn test_default_config_is_serializable() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let config: Config = toml::from_str(&text).unwrap();
        assert_eq!(config.registry_store_name, Config::default_registry_store_name());
    }
}
