//! Runtime configuration
//!
//! Built-in defaults, optionally overridden by `$XDG_CONFIG_HOME/chunky/config.toml`
//! (only with the `config` feature), then by command line flags.
//!
//! ```toml
//! chunk_size = 5000
//! theme = "high-contrast"
//!
//! [live]
//! queue_capacity = 4096
//! tick_ms = 20
//! ```

use crate::error::{ChunkyError, Result};
use crate::render::ui::ColorTheme;
use std::time::Duration;

pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Lines per chunk
    pub chunk_size: usize,
    /// Lines per page step; `None` pages by the viewport height
    pub page_size: Option<usize>,
    /// Colour theme name, see [`ColorTheme::by_name`]
    pub theme: String,
    /// Live mode: lines the reader may queue ahead of the display
    pub queue_capacity: usize,
    /// Live mode: most lines moved into the view per tick
    pub live_batch: usize,
    /// Live mode: wait between ingest rounds when the queue is empty
    pub tick: Duration,
    /// Key polling interval of the input thread
    pub input_poll: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            page_size: None,
            theme: "default".to_string(),
            queue_capacity: crate::pipeline::DEFAULT_QUEUE_CAPACITY,
            live_batch: 512,
            tick: Duration::from_millis(10),
            input_poll: Duration::from_millis(50),
        }
    }
}

impl Config {
    /// Defaults merged with the user's config file, if there is one
    ///
    /// # Errors
    /// * `ConfigError` if the file exists but cannot be read or parsed, or
    ///   holds invalid values
    pub fn load() -> Result<Self> {
        #[cfg(feature = "config")]
        {
            file::load()
        }
        #[cfg(not(feature = "config"))]
        {
            Ok(Self::default())
        }
    }

    /// Apply command line overrides
    pub fn with_overrides(mut self, chunk_size: Option<usize>, page_size: Option<usize>) -> Self {
        if let Some(size) = chunk_size {
            log::debug!("config: CLI override chunk_size={size}");
            self.chunk_size = size;
        }
        if page_size.is_some() {
            log::debug!("config: CLI override page_size={page_size:?}");
            self.page_size = page_size;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(ChunkyError::config("chunk_size must be greater than 0"));
        }
        if self.page_size == Some(0) {
            return Err(ChunkyError::config("page_size must be greater than 0"));
        }
        if self.queue_capacity == 0 {
            return Err(ChunkyError::config("queue_capacity must be greater than 0"));
        }
        if self.live_batch == 0 {
            return Err(ChunkyError::config("live batch must be greater than 0"));
        }
        if ColorTheme::by_name(&self.theme).is_none() {
            return Err(ChunkyError::config(format!("unknown theme '{}'", self.theme)));
        }
        Ok(())
    }

    /// The colour theme this configuration names
    pub fn color_theme(&self) -> ColorTheme {
        ColorTheme::by_name(&self.theme).unwrap_or_default()
    }
}

#[cfg(feature = "config")]
mod file {
    use super::Config;
    use crate::error::{ChunkyError, Result};
    use log::{debug, info};
    use serde::Deserialize;
    use std::path::PathBuf;
    use std::time::Duration;

    /// On-disk form; every field is optional
    #[derive(Debug, Default, Deserialize)]
    #[serde(default, deny_unknown_fields)]
    pub(super) struct ConfigFile {
        pub chunk_size: Option<usize>,
        pub page_size: Option<usize>,
        pub theme: Option<String>,
        pub input_poll_ms: Option<u64>,
        pub live: LiveConfigFile,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default, deny_unknown_fields)]
    pub(super) struct LiveConfigFile {
        pub queue_capacity: Option<usize>,
        pub batch: Option<usize>,
        pub tick_ms: Option<u64>,
    }

    impl ConfigFile {
        pub(super) fn resolve(self) -> Result<Config> {
            let defaults = Config::default();
            let config = Config {
                chunk_size: self.chunk_size.unwrap_or(defaults.chunk_size),
                page_size: self.page_size.or(defaults.page_size),
                theme: self.theme.unwrap_or(defaults.theme),
                queue_capacity: self.live.queue_capacity.unwrap_or(defaults.queue_capacity),
                live_batch: self.live.batch.unwrap_or(defaults.live_batch),
                tick: self
                    .live
                    .tick_ms
                    .map_or(defaults.tick, Duration::from_millis),
                input_poll: self
                    .input_poll_ms
                    .map_or(defaults.input_poll, Duration::from_millis),
            };
            config.validate()?;
            Ok(config)
        }
    }

    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("chunky").join("config.toml"))
    }

    pub(super) fn load() -> Result<Config> {
        let Some(path) = config_path() else {
            debug!("config: no config directory, using defaults");
            return Ok(Config::default());
        };

        match std::fs::read_to_string(&path) {
            Ok(text) => {
                info!("config: loaded from {}", path.display());
                let file: ConfigFile = toml::from_str(&text).map_err(|e| {
                    ChunkyError::config(format!("failed to parse {}: {e}", path.display()))
                })?;
                file.resolve()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("config: {} not found, using defaults", path.display());
                Ok(Config::default())
            }
            Err(e) => Err(ChunkyError::config(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

}
