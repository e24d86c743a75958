//! # Server Configuration
//!
//! Loaded once at startup from TOML, then overridden from the command line.
//!
//! ```toml
//! bind_address = "0.0.0.0:8152"
//! width = 240
//! height = 135
//! seed = 42
//!
//! [generator]
//! tries = 24
//!
//! [ecology]
//! growth_chance = 0.5
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use verdance_ecology::EcologyParams;
use verdance_procedural::GeneratorConfig;

use crate::error::{NetworkError, NetworkResult};

/// Default listen address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8152";

/// Everything the server needs to start.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_address: String,
    /// World width in tiles.
    pub width: u32,
    /// World height in tiles.
    pub height: u32,
    /// Seed for the initial world. `None` derives one from the clock.
    pub seed: Option<u64>,
    /// Simulation period.
    pub tick_interval_ms: u64,
    /// Per-connection snapshot period.
    pub broadcast_interval_ms: u64,
    /// Longest a single snapshot send may take before the viewer is dropped.
    pub send_timeout_ms: u64,
    /// Log a tick status line every this many ticks. Zero disables it.
    pub stats_every: u64,
    /// Terrain generation.
    pub generator: GeneratorConfig,
    /// Ecology model.
    pub ecology: EcologyParams,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            width: 240,
            height: 135,
            seed: None,
            tick_interval_ms: 125,
            broadcast_interval_ms: 125,
            send_timeout_ms: 1000,
            stats_every: 480,
            generator: GeneratorConfig::default(),
            ecology: EcologyParams::default(),
        }
    }
}

impl ServerConfig {
    /// Parses and validates a config from TOML. Missing keys keep their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::Config`] on malformed TOML or bad values.
    pub fn from_toml_str(source: &str) -> NetworkResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| NetworkError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a config file.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> NetworkResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Checks dimensions, intervals and the nested sections.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::Config`] describing the first bad value.
    pub fn validate(&self) -> NetworkResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(NetworkError::Config(format!(
                "world dimensions must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        let intervals = [
            ("tick_interval_ms", self.tick_interval_ms),
            ("broadcast_interval_ms", self.broadcast_interval_ms),
            ("send_timeout_ms", self.send_timeout_ms),
        ];
        for (name, value) in intervals {
            if value == 0 {
                return Err(NetworkError::Config(format!("{name} must be > 0")));
            }
        }
        if self.bind_address.trim().is_empty() {
            return Err(NetworkError::Config("bind_address is empty".to_string()));
        }
        self.generator
            .validate()
            .map_err(|e| NetworkError::Config(e.to_string()))?;
        self.ecology
            .validate()
            .map_err(|e| NetworkError::Config(e.to_string()))?;
        Ok(())
    }

    /// Simulation period.
    #[inline]
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Snapshot broadcast period.
    #[inline]
    #[must_use]
    pub fn broadcast_interval(&self) -> Duration {
        Duration::from_millis(self.broadcast_interval_ms)
    }

    /// Send deadline.
    #[inline]
    #[must_use]
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}

/// Command-line overrides for the server binary.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CliArgs {
    /// `--config <path>`
    pub config_path: Option<PathBuf>,
    /// `--bind <addr>`
    pub bind_address: Option<String>,
    /// `--width <n>`
    pub width: Option<u32>,
    /// `--height <n>`
    pub height: Option<u32>,
    /// `--seed <n>`
    pub seed: Option<u64>,
    /// `--help`
    pub help: bool,
}

impl CliArgs {
    /// Parses arguments, not including the program name.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::Config`] for unknown flags, missing values or
    /// values that do not parse.
    pub fn parse<I, S>(args: I) -> NetworkResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let mut parsed = Self::default();

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--config" | "-c" => {
                    parsed.config_path = Some(PathBuf::from(value_of(&args, i)?));
                    i += 1;
                }
                "--bind" | "-b" => {
                    parsed.bind_address = Some(value_of(&args, i)?.to_string());
                    i += 1;
                }
                "--width" => {
                    parsed.width = Some(number_of(&args, i)?);
                    i += 1;
                }
                "--height" => {
                    parsed.height = Some(number_of(&args, i)?);
                    i += 1;
                }
                "--seed" => {
                    parsed.seed = Some(number_of(&args, i)?);
                    i += 1;
                }
                "--help" | "-h" => parsed.help = true,
                other => {
                    return Err(NetworkError::Config(format!("unknown argument `{other}`")));
                }
            }
            i += 1;
        }
        Ok(parsed)
    }

    /// Resolves the final config: file (or defaults), then overrides.
    ///
    /// # Errors
    ///
    /// As [`ServerConfig::load`], or [`NetworkError::Config`] if the
    /// overridden config does not validate.
    pub fn resolve(&self) -> NetworkResult<ServerConfig> {
        let mut config = match &self.config_path {
            Some(path) => ServerConfig::load(path)?,
            None => ServerConfig::default(),
        };
        if let Some(bind) = &self.bind_address {
            config.bind_address.clone_from(bind);
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate()?;
        Ok(config)
    }
}

fn value_of(args: &[String], flag: usize) -> NetworkResult<&str> {
    args.get(flag + 1)
        .map(String::as_str)
        .ok_or_else(|| NetworkError::Config(format!("`{}` needs a value", args[flag])))
}

fn number_of<T: std::str::FromStr>(args: &[String], flag: usize) -> NetworkResult<T> {
    let raw = value_of(args, flag)?;
    raw.parse()
        .map_err(|_| NetworkError::Config(format!("`{}` expects a number, got `{raw}`", args[flag])))
}
