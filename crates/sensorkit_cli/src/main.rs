//! Sensor table generator CLI.

use std::io::{self, IsTerminal};

use clap::Parser;
use tracing::error;
use tracing::level_filters::LevelFilter;

use sensorkit_cli::cli::{Cli, LogFormatArg, LogLevelArg};
use sensorkit_cli::commands::{
    N_EXIT_FAILURE, derive_error_message, derive_exit_code, derive_success_message, run_generate,
};
use sensorkit_cli::logging::{LogConfig, LogFormat, init_logging};
use sensorkit_table::EnumRunOutcome;

fn main() {
    let cli = Cli::parse();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(N_EXIT_FAILURE);
    }

    let result = run_generate(&cli.table);
    match &result {
        Ok(EnumRunOutcome::Written(report)) => println!("{}", derive_success_message(report)),
        Ok(EnumRunOutcome::Cancelled) => println!("Cancelled."),
        Err(error) => {
            error!(kind = error.kind(), "generation failed: {error}");
            eprintln!("error: {}", derive_error_message(error));
        }
    }
    std::process::exit(derive_exit_code(&result));
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = cli.log_file.is_none() && io::stderr().is_terminal();
    config
}
