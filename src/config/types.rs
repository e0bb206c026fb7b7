use serde::{Deserialize, Serialize};

use crate::protocol::SpliceMode;

use super::defaults::*;

// ============= Log Level =============

/// Logging verbosity level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Everything including per-write traces and hex dumps.
    Debug,
    /// Length field changes and connection details.
    Verbose,
    /// One line per step.
    #[default]
    Normal,
    /// Warnings and errors only.
    Silent,
}

impl LogLevel {
    /// Convert to tracing EnvFilter directive string.
    pub fn to_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "trace",
            LogLevel::Verbose => "debug",
            LogLevel::Normal => "info",
            LogLevel::Silent => "warn",
        }
    }

    /// Parse from a loose string (CLI argument).
    pub fn from_str_loose(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "debug" | "trace" => LogLevel::Debug,
            "verbose" => LogLevel::Verbose,
            "normal" | "info" => LogLevel::Normal,
            "silent" | "quiet" | "error" | "warn" => LogLevel::Silent,
            _ => LogLevel::Normal,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Verbose => write!(f, "verbose"),
            LogLevel::Normal => write!(f, "normal"),
            LogLevel::Silent => write!(f, "silent"),
        }
    }
}

// ============= Sub-Configs =============

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default)]
    pub log_level: LogLevel,

    #[serde(default)]
    pub disable_colors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Captured ClientHello record. `.hex` files are read as hex text.
    #[serde(default = "default_client_hello_path")]
    pub client_hello: String,

    /// Bytes to deliver inside the ClientHello.
    #[serde(default = "default_payload_path")]
    pub payload: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            client_hello: default_client_hello_path(),
            payload: default_payload_path(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpliceConfig {
    #[serde(default)]
    pub mode: SpliceMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Disable Nagle so the ClientHello leaves without waiting for the payload.
    #[serde(default = "default_true")]
    pub nodelay: bool,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// How long to wait for the first record header from the peer after
    /// sending. 0 closes the connection right away.
    #[serde(default = "default_response_wait")]
    pub response_wait_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            nodelay: default_true(),
            connect_timeout_secs: default_connect_timeout(),
            response_wait_secs: default_response_wait(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Write the message to this file instead of connecting.
    #[serde(default)]
    pub file: Option<String>,
}
