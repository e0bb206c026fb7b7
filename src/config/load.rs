use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, SmuggleError};
use crate::protocol::SpliceMode;

use super::types::*;

// ============= Main Config =============

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub target: TargetConfig,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub splice: SpliceConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Values given on the command line; each one wins over the file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub client_hello: Option<String>,
    pub payload: Option<String>,
    pub mode: Option<SpliceMode>,
    pub out: Option<String>,
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(&path).map_err(|e| SmuggleError::Config(e.to_string()))?;
        toml::from_str(&content).map_err(|e| SmuggleError::Config(e.to_string()))
    }

    /// Load `path`, falling back to defaults when it does not exist and was
    /// not named explicitly.
    pub fn load_or_default<P: AsRef<Path>>(path: P, explicit: bool) -> Result<Self> {
        let path = path.as_ref();
        if !explicit && !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(ref host) = overrides.host {
            self.target.host = host.clone();
        }
        if let Some(port) = overrides.port {
            self.target.port = port;
        }
        if let Some(ref path) = overrides.client_hello {
            self.input.client_hello = path.clone();
        }
        if let Some(ref path) = overrides.payload {
            self.input.payload = path.clone();
        }
        if let Some(mode) = overrides.mode {
            self.splice.mode = mode;
        }
        if let Some(ref out) = overrides.out {
            self.output.file = Some(out.clone());
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.output.file.is_none() {
            if self.target.host.trim().is_empty() {
                return Err(SmuggleError::Config("target.host cannot be empty".to_string()));
            }
            if self.target.port == 0 {
                return Err(SmuggleError::Config("target.port must be > 0".to_string()));
            }
        }

        if self.input.client_hello.trim().is_empty() {
            return Err(SmuggleError::Config(
                "input.client_hello cannot be empty".to_string(),
            ));
        }

        if self.input.payload.trim().is_empty() {
            return Err(SmuggleError::Config("input.payload cannot be empty".to_string()));
        }

        if let Some(ref file) = self.output.file
            && file.trim().is_empty()
        {
            return Err(SmuggleError::Config("output.file cannot be empty".to_string()));
        }

        if self.network.connect_timeout_secs == 0 {
            return Err(SmuggleError::Config(
                "network.connect_timeout_secs must be > 0".to_string(),
            ));
        }

        if !self.network.nodelay {
            warn!("network.nodelay = false; the peer may finish reading the ClientHello before the payload arrives");
        }

        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.network.connect_timeout_secs)
    }

    pub fn response_wait(&self) -> Option<Duration> {
        (self.network.response_wait_secs > 0)
            .then(|| Duration::from_secs(self.network.response_wait_secs))
    }
}
