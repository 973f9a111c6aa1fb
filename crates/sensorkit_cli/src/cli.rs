//! CLI argument definitions for the sensor table generator.

use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use serde::Deserialize;

use sensorkit_table::EnumHeaderStyle;

#[derive(Parser, Debug)]
#[command(
    name = "sensorkit",
    version,
    about = "Generate an exhaustive sensor state/fault validation workbook",
    long_about = "Enumerate every combination of sensor state bits and fail bits and write \
                  them to a formatted XLSX table with grouped, color-coded headers.\n\n\
                  Sensors come from flags, a TOML config file, or interactive prompts."
)]
pub struct Cli {
    #[command(flatten)]
    pub table: TableArgs,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub struct TableArgs {
    /// Number of sensors.
    ///
    /// Taken as text so that a non-integer count is reported like any other
    /// invalid input.
    #[arg(long = "sensors", value_name = "N")]
    pub sensors: Option<String>,

    /// Sensor name with optional state meanings, e.g. `DOOR=CLOSED,OPEN`.
    ///
    /// Repeat once per sensor, in column order.
    #[arg(long = "sensor", value_name = "NAME[=LABEL0,LABEL1]")]
    pub sensor: Vec<String>,

    /// Meanings of fail bit 0 and 1, shared by all sensors.
    #[arg(long = "fail-labels", value_name = "LABEL0,LABEL1")]
    pub fail_labels: Option<String>,

    /// Column header naming preset.
    #[arg(long = "header-style", value_enum)]
    pub header_style: Option<HeaderStyleArg>,

    /// Band label over the sensor-state columns.
    #[arg(long = "group-title", value_name = "TEXT")]
    pub group_title: Option<String>,

    /// Do not fill `0=` cells green and `1=` cells red.
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Use one fixed height for every row.
    #[arg(long = "uniform-row-height")]
    pub uniform_row_height: bool,

    /// Worksheet name.
    #[arg(long = "sheet-name", value_name = "NAME")]
    pub sheet_name: Option<String>,

    /// Output workbook path.
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Ask for anything not given on the command line.
    #[arg(short = 'i', long = "interactive")]
    pub interactive: bool,

    /// TOML file with the same settings; flags override file values.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// CLI header style choices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderStyleArg {
    Plain,
    Stacked,
}

impl From<HeaderStyleArg> for EnumHeaderStyle {
    fn from(value: HeaderStyleArg) -> Self {
        match value {
            HeaderStyleArg::Plain => EnumHeaderStyle::Plain,
            HeaderStyleArg::Stacked => EnumHeaderStyle::Stacked,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
