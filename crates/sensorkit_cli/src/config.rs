//! Run settings merged from the TOML config file and command-line flags.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use sensorkit_table::{
    C_FILE_OUT_DEFAULT, C_SHEET_NAME_DEFAULT, Result, SpecRenderOptions, TableError,
};

use crate::cli::{HeaderStyleArg, TableArgs};

/// Settings accepted in the `--config` file.
///
/// ```toml
/// sensors = 2
/// header_style = "stacked"
/// group_title = "Downlock"
/// output = "table.xlsx"
///
/// [fail_labels]
/// fail0 = "OK"
/// fail1 = "FAULT"
///
/// [[sensor]]
/// name = "A"
/// state0 = "UP"
/// state1 = "DOWN"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub sensors: Option<i64>,
    pub sensor: Vec<FileSensor>,
    pub fail_labels: Option<FileFailLabels>,
    pub header_style: Option<HeaderStyleArg>,
    pub group_title: Option<String>,
    pub color_code_cells: Option<bool>,
    pub uniform_row_height: Option<bool>,
    pub sheet_name: Option<String>,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSensor {
    pub name: String,
    pub state0: Option<String>,
    pub state1: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileFailLabels {
    pub fail0: String,
    pub fail1: String,
}

impl FileConfig {
    /// Load and parse a config file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|err| {
            TableError::InvalidInput(format!(
                "failed to read config from {}: {err}",
                path.display()
            ))
        })?;
        Self::parse(&contents).map_err(|err| {
            TableError::InvalidInput(format!(
                "failed to parse config from {}: {err}",
                path.display()
            ))
        })
    }

    pub fn parse(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

/// A sensor as given by the user, labels possibly still missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSensorDraft {
    pub name: String,
    pub labels: Option<(String, String)>,
}

/// Everything one run needs, before missing answers are collected.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecRunSettings {
    /// Raw sensor count text, if given.
    pub sensor_count: Option<String>,
    pub sensors: Vec<SpecSensorDraft>,
    pub fail_labels: Option<(String, String)>,
    pub header_style: HeaderStyleArg,
    pub render_options: SpecRenderOptions,
    pub sheet_name: String,
    pub path_file_out: PathBuf,
    pub if_interactive: bool,
}

/// Merge flags over the optional config file.
pub fn derive_run_settings(args: &TableArgs) -> Result<SpecRunSettings> {
    let file = match &args.config {
        Some(path) => FileConfig::load_from(path)?,
        None => FileConfig::default(),
    };
    merge_run_settings(args, file)
}

/// Merge flags over an already-loaded config file; flags win.
pub fn merge_run_settings(args: &TableArgs, file: FileConfig) -> Result<SpecRunSettings> {
    let sensors = if args.sensor.is_empty() {
        file.sensor
            .into_iter()
            .map(draft_from_file_sensor)
            .collect::<Result<Vec<_>>>()?
    } else {
        args.sensor
            .iter()
            .map(|c_arg| parse_sensor_arg(c_arg))
            .collect::<Result<Vec<_>>>()?
    };

    let fail_labels = match &args.fail_labels {
        Some(c_arg) => Some(parse_label_pair(c_arg, "--fail-labels")?),
        None => file.fail_labels.map(|labels| (labels.fail0, labels.fail1)),
    };

    let render_options = SpecRenderOptions {
        color_code_cells: !args.no_color && file.color_code_cells.unwrap_or(true),
        group_title_text: args.group_title.clone().or(file.group_title),
        uniform_row_height: args.uniform_row_height || file.uniform_row_height.unwrap_or(false),
    };

    Ok(SpecRunSettings {
        sensor_count: args
            .sensors
            .clone()
            .or_else(|| file.sensors.map(|n| n.to_string())),
        sensors,
        fail_labels,
        header_style: args
            .header_style
            .or(file.header_style)
            .unwrap_or(HeaderStyleArg::Plain),
        render_options,
        sheet_name: args
            .sheet_name
            .clone()
            .or(file.sheet_name)
            .unwrap_or_else(|| C_SHEET_NAME_DEFAULT.to_string()),
        path_file_out: args
            .output
            .clone()
            .or(file.output)
            .unwrap_or_else(|| PathBuf::from(C_FILE_OUT_DEFAULT)),
        if_interactive: args.interactive,
    })
}

/// Parse `NAME` or `NAME=LABEL0,LABEL1`.
pub fn parse_sensor_arg(text: &str) -> Result<SpecSensorDraft> {
    let (c_name, labels) = match text.split_once('=') {
        Some((c_name, c_labels)) => (c_name, Some(parse_label_pair(c_labels, text)?)),
        None => (text, None),
    };
    if c_name.trim().is_empty() {
        return Err(TableError::InvalidInput(format!(
            "sensor {text:?} has no name."
        )));
    }
    Ok(SpecSensorDraft {
        name: c_name.trim().to_string(),
        labels,
    })
}

/// Parse `LABEL0,LABEL1`.
pub fn parse_label_pair(text: &str, what: &str) -> Result<(String, String)> {
    match text.split_once(',') {
        Some((c_label0, c_label1)) if !c_label1.contains(',') => {
            Ok((c_label0.trim().to_string(), c_label1.trim().to_string()))
        }
        _ => Err(TableError::InvalidInput(format!(
            "{what}: expected exactly two labels as LABEL0,LABEL1, got {text:?}."
        ))),
    }
}

fn draft_from_file_sensor(sensor: FileSensor) -> Result<SpecSensorDraft> {
    let labels = match (sensor.state0, sensor.state1) {
        (Some(c_label0), Some(c_label1)) => Some((c_label0, c_label1)),
        (None, None) => None,
        _ => {
            return Err(TableError::InvalidInput(format!(
                "sensor {:?} in config sets only one of state0/state1.",
                sensor.name
            )));
        }
    };
    Ok(SpecSensorDraft {
        name: sensor.name,
        labels,
    })
}
