//! hellopad — ClientHello padding smuggling client

use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use hellopad::cli::{self, CliArgs, CliCommand};
use hellopad::config::{AppConfig, LogLevel};

fn parse_cli() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match cli::parse_args(&args) {
        Ok(CliCommand::Run(cli_args)) => cli_args,
        Ok(CliCommand::Init { path }) => {
            if let Err(e) = cli::run_init(&path) {
                eprintln!("[hellopad] Init failed: {}", e);
                std::process::exit(1);
            }
            eprintln!("[hellopad] Created default config at {}", path);
            std::process::exit(0);
        }
        Ok(CliCommand::Help) => {
            eprintln!("{}", cli::usage());
            std::process::exit(0);
        }
        Ok(CliCommand::Version) => {
            println!("hellopad {}", env!("CARGO_PKG_VERSION"));
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("[hellopad] {}", e);
            eprintln!("{}", cli::usage());
            std::process::exit(2);
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli_args = parse_cli();

    let mut config = match AppConfig::load_or_default(&cli_args.config_path, cli_args.config_explicit) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[hellopad] Error: {}", e);
            std::process::exit(1);
        }
    };
    config.apply_overrides(&cli_args.overrides);

    let effective_log_level = if cli_args.silent {
        LogLevel::Silent
    } else if let Some(ref s) = cli_args.log_level {
        LogLevel::from_str_loose(s)
    } else {
        config.general.log_level.clone()
    };

    // RUST_LOG wins over the configured level
    let filter_layer = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(effective_log_level.to_filter_str()));
    let fmt_layer = fmt::Layer::default().with_ansi(!config.general.disable_colors);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    if let Err(e) = config.validate() {
        error!("Invalid config: {}", e);
        std::process::exit(1);
    }

    info!("hellopad v{}", env!("CARGO_PKG_VERSION"));
    info!("Log level: {}", effective_log_level);
    match config.output.file {
        Some(ref file) => info!("Target: file {}", file),
        None => info!("Target: {}:{}", config.target.host, config.target.port),
    }

    match hellopad::run(&config).await {
        Ok(outcome) => {
            info!(
                bytes = outcome.report.total(),
                padding_synthesized = outcome.plan.synthesizes_padding(),
                "Done"
            );
        }
        Err(e) => {
            if e.poisons_connection() {
                warn!("Connection aborted mid-message; peer saw a partial ClientHello");
            }
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
