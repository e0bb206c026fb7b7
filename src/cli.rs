//! Command line parsing and `--init`

use std::path::Path;

use crate::config::{AppConfig, ConfigOverrides, defaults::default_config_path};
use crate::error::{Result, SmuggleError};
use crate::protocol::SpliceMode;

/// Options for a normal run
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub config_path: String,
    /// The config path was given on the command line
    pub config_explicit: bool,
    pub silent: bool,
    pub log_level: Option<String>,
    pub overrides: ConfigOverrides,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            config_path: default_config_path().to_string(),
            config_explicit: false,
            silent: false,
            log_level: None,
            overrides: ConfigOverrides::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    Run(CliArgs),
    /// Write a default config file and exit
    Init { path: String },
    Help,
    Version,
}

fn take_value(args: &[String], i: &mut usize, flag: &str) -> std::result::Result<String, String> {
    *i += 1;
    args.get(*i)
        .cloned()
        .ok_or_else(|| format!("{} requires a value", flag))
}

/// Parse arguments (without the program name).
pub fn parse_args(args: &[String]) -> std::result::Result<CliCommand, String> {
    let mut cli = CliArgs::default();
    let mut init = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--silent" | "-s" => {
                cli.silent = true;
            }
            "--log-level" => {
                cli.log_level = Some(take_value(args, &mut i, "--log-level")?);
            }
            s if s.starts_with("--log-level=") => {
                cli.log_level = Some(s.trim_start_matches("--log-level=").to_string());
            }
            "--host" => {
                cli.overrides.host = Some(take_value(args, &mut i, "--host")?);
            }
            "--port" => {
                let raw = take_value(args, &mut i, "--port")?;
                let port = raw
                    .parse::<u16>()
                    .map_err(|_| format!("invalid port: {}", raw))?;
                cli.overrides.port = Some(port);
            }
            "--hello" => {
                cli.overrides.client_hello = Some(take_value(args, &mut i, "--hello")?);
            }
            "--payload" => {
                cli.overrides.payload = Some(take_value(args, &mut i, "--payload")?);
            }
            "--mode" => {
                let raw = take_value(args, &mut i, "--mode")?;
                let mode = match raw.to_lowercase().as_str() {
                    "padding" => SpliceMode::Padding,
                    "raw" => SpliceMode::Raw,
                    _ => return Err(format!("unknown mode: {} (padding|raw)", raw)),
                };
                cli.overrides.mode = Some(mode);
            }
            "--out" => {
                cli.overrides.out = Some(take_value(args, &mut i, "--out")?);
            }
            "--init" => {
                init = true;
            }
            "--help" | "-h" => return Ok(CliCommand::Help),
            "--version" | "-V" => return Ok(CliCommand::Version),
            s if !s.starts_with('-') => {
                cli.config_path = s.to_string();
                cli.config_explicit = true;
            }
            other => {
                return Err(format!("unknown option: {}", other));
            }
        }
        i += 1;
    }

    if init {
        return Ok(CliCommand::Init { path: cli.config_path });
    }

    Ok(CliCommand::Run(cli))
}

pub fn usage() -> String {
    let lines = [
        "Usage: hellopad [config.toml] [OPTIONS]".to_string(),
        String::new(),
        "Options:".to_string(),
        "  --host <HOST>           Target host (default: www.google.com)".to_string(),
        "  --port <PORT>           Target port (default: 443)".to_string(),
        "  --hello <FILE>          Captured ClientHello (.hex for hex text)".to_string(),
        "  --payload <FILE>        Payload to deliver".to_string(),
        "  --mode <MODE>           padding|raw".to_string(),
        "  --out <FILE>            Write the message to FILE instead of connecting".to_string(),
        "  --silent, -s            Suppress info logs".to_string(),
        "  --log-level <LEVEL>     debug|verbose|normal|silent".to_string(),
        format!("  --init                  Write a default config ({})", default_config_path()),
        "  --help, -h              Show this help".to_string(),
        "  --version, -V           Show version".to_string(),
    ];
    lines.join("\n")
}

/// Write a default config to `path`. Existing files are left alone.
pub fn run_init(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Err(SmuggleError::Config(format!(
            "{} already exists, not overwriting",
            path.display()
        )));
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| SmuggleError::Config(e.to_string()))?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_args_runs_with_defaults() {
        assert_eq!(parse_args(&[]).unwrap(), CliCommand::Run(CliArgs::default()));
    }

    #[test]
    fn test_full_command_line() {
        let cmd = parse_args(&args(&[
            "custom.toml",
            "--host",
            "example.com",
            "--port",
            "8443",
            "--hello",
            "ch.hex",
            "--payload",
            "secret.bin",
            "--mode",
            "RAW",
            "--log-level=debug",
            "-s",
        ]))
        .unwrap();

        let CliCommand::Run(cli) = cmd else {
            panic!("expected run command");
        };
        assert_eq!(cli.config_path, "custom.toml");
        assert!(cli.config_explicit);
        assert!(cli.silent);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.overrides.host.as_deref(), Some("example.com"));
        assert_eq!(cli.overrides.port, Some(8443));
        assert_eq!(cli.overrides.client_hello.as_deref(), Some("ch.hex"));
        assert_eq!(cli.overrides.payload.as_deref(), Some("secret.bin"));
        assert_eq!(cli.overrides.mode, Some(SpliceMode::Raw));
    }

    #[test]
    fn test_bad_values_are_errors() {
        assert!(parse_args(&args(&["--port", "70000"])).is_err());
        assert!(parse_args(&args(&["--port"])).is_err());
        assert!(parse_args(&args(&["--mode", "stuffing"])).is_err());
        assert!(parse_args(&args(&["--frobnicate"])).is_err());
    }

    #[test]
    fn test_help_and_version_short_circuit() {
        assert_eq!(parse_args(&args(&["--port", "1", "-h"])).unwrap(), CliCommand::Help);
        assert_eq!(parse_args(&args(&["-V"])).unwrap(), CliCommand::Version);
        assert!(usage().contains("--payload"));
    }

    #[test]
    fn test_init_uses_config_path() {
        assert_eq!(
            parse_args(&args(&["--init", "x.toml"])).unwrap(),
            CliCommand::Init { path: "x.toml".to_string() }
        );
        assert_eq!(
            parse_args(&args(&["--init"])).unwrap(),
            CliCommand::Init { path: "hellopad.toml".to_string() }
        );
    }

    #[test]
    fn test_init_writes_loadable_config_once() {
        let path = std::env::temp_dir().join(format!("hellopad_init_{}.toml", std::process::id()));
        let _ = std::fs::remove_file(&path);

        run_init(&path).unwrap();
        let cfg = AppConfig::load(&path).unwrap();
        assert_eq!(cfg.target.host, "www.google.com");
        assert!(run_init(&path).is_err());

        let _ = std::fs::remove_file(path);
    }
}
