use std::path::{Path, PathBuf};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/keyrules.toml";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Rule script evaluated for every key event.
    pub rules: PathBuf,
    /// Input device to read key events from.
    #[serde(default)]
    pub device: Option<PathBuf>,
    /// Regex matched against input device names when `device` is unset.
    #[serde(default)]
    pub device_match: Option<String>,
    /// Grab the input device so no other program sees its events.
    #[serde(default)]
    pub exclusive: bool,
    /// Text file or FIFO of `<CODE> <VALUE>` lines, used when no device is set.
    #[serde(default)]
    pub events: Option<PathBuf>,
    /// Base URL of the openHAB REST API, without trailing slash.
    #[serde(default)]
    pub openhab: Option<String>,
    #[serde(default)]
    pub speech: SpeechConfig,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpeechConfig {
    pub espeak: PathBuf,
    pub voice: String,
    pub speed: u32,
    pub pitch: u32,
    pub intonation: u32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        SpeechConfig {
            espeak: PathBuf::from("/usr/bin/espeak"),
            voice: String::from("male3"),
            speed: 175,
            pitch: 50,
            intonation: 100,
        }
    }
}

/// Where the event loop takes its key events from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventSource<'a> {
    Device(&'a Path),
    DeviceMatch(&'a str),
    File(&'a Path),
    Stdin,
}

impl Config {
    /// `device` wins over `device_match`, which wins over `events`.
    pub fn event_source(&self) -> EventSource<'_> {
        if let Some(path) = &self.device {
            EventSource::Device(path)
        } else if let Some(pattern) = &self.device_match {
            EventSource::DeviceMatch(pattern)
        } else if let Some(path) = &self.events {
            EventSource::File(path)
        } else {
            EventSource::Stdin
        }
    }

    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let display = path.to_string_lossy().into_owned();

        let source = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: display.clone(), source })?;

        Config::parse(&source).map_err(|source| ConfigError::Toml { path: display, source })
    }

    pub fn parse(source: &str) -> Result<Config, toml::de::Error> {
        let mut config: Config = toml::from_str(source)?;

        if let Some(openhab) = &mut config.openhab {
            while openhab.ends_with('/') {
                openhab.pop();
            }
        }

        Ok(config)
    }
}
