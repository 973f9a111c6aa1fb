//! Shared sensor-table specification models.

use std::fmt;
use std::path::PathBuf;

use crate::conf::{C_FAIL_MARKER, N_SENSORS_MAX};
use crate::error::{Result, TableError};

////////////////////////////////////////////////////////////////////////////////
// #region SensorSpecification

/// One sensor with its name and the meaning of each state bit value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSensor {
    /// Uppercase sensor name.
    pub name: String,
    /// Meaning of state bit `0`.
    pub state0_label: String,
    /// Meaning of state bit `1`.
    pub state1_label: String,
}

impl SpecSensor {
    /// Build a sensor, trimming every field and upper-casing name and labels.
    pub fn new(name: &str, state0_label: &str, state1_label: &str) -> Result<Self> {
        let c_name = name.trim().to_uppercase();
        if c_name.is_empty() {
            return Err(TableError::InvalidInput(
                "sensor name must not be empty.".to_string(),
            ));
        }
        let c_label0 = normalize_label(state0_label, &format!("0 label of {c_name}"))?;
        let c_label1 = normalize_label(state1_label, &format!("1 label of {c_name}"))?;

        Ok(Self {
            name: c_name,
            state0_label: c_label0.to_uppercase(),
            state1_label: c_label1.to_uppercase(),
        })
    }

    /// Label selected by a state bit value.
    pub fn label_for(&self, bit: u8) -> &str {
        if bit == 0 {
            &self.state0_label
        } else {
            &self.state1_label
        }
    }
}

/// Meaning of each fail bit value, shared by every sensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecFaultLabels {
    /// Meaning of fail bit `0`.
    pub fail0_label: String,
    /// Meaning of fail bit `1`.
    pub fail1_label: String,
}

impl SpecFaultLabels {
    /// Build fault labels; text is trimmed but keeps the case entered.
    pub fn new(fail0_label: &str, fail1_label: &str) -> Result<Self> {
        Ok(Self {
            fail0_label: normalize_label(fail0_label, "0 label of FAIL")?,
            fail1_label: normalize_label(fail1_label, "1 label of FAIL")?,
        })
    }

    /// Label selected by a fail bit value.
    pub fn label_for(&self, bit: u8) -> &str {
        if bit == 0 {
            &self.fail0_label
        } else {
            &self.fail1_label
        }
    }
}

fn normalize_label(label: &str, what: &str) -> Result<String> {
    let c_label = label.trim();
    if c_label.is_empty() {
        return Err(TableError::InvalidInput(format!("{what} must not be empty.")));
    }
    Ok(c_label.to_string())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region HeaderSpecification

/// Preset header naming styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumHeaderStyle {
    /// One-line headers (`SENSOR 1`, `SENSOR 1 FAIL`).
    #[default]
    Plain,
    /// Two-line headers carrying the sensor name.
    Stacked,
}

/// Column header naming template.
///
/// `state` and `fail` accept `{n}` (1-based sensor number) and `{name}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecHeaderTemplate {
    /// Template for sensor-state headers.
    pub state: String,
    /// Template for fail-state headers.
    pub fail: String,
    /// Header of the first status column.
    pub status_state: String,
    /// Header of the second status column.
    pub status_fail: String,
}

impl Default for SpecHeaderTemplate {
    fn default() -> Self {
        crate::conf::derive_header_template(EnumHeaderStyle::Plain)
    }
}

impl SpecHeaderTemplate {
    /// Render the state header for the sensor at `idx_sensor` (0-based).
    pub fn render_state(&self, idx_sensor: usize, sensor: &SpecSensor) -> String {
        fill_template(&self.state, idx_sensor, &sensor.name)
    }

    /// Render the fail header for the sensor at `idx_sensor` (0-based).
    pub fn render_fail(&self, idx_sensor: usize, sensor: &SpecSensor) -> String {
        fill_template(&self.fail, idx_sensor, &sensor.name)
    }

    /// Reject a sensor name whose state header would carry the fail marker.
    pub fn validate_state_name(&self, idx_sensor: usize, name: &str) -> Result<()> {
        let c_header = fill_template(&self.state, idx_sensor, name);
        if c_header.to_uppercase().contains(&C_FAIL_MARKER.to_uppercase()) {
            return Err(TableError::InvalidInput(format!(
                "state header {c_header:?} of sensor {name} contains {C_FAIL_MARKER:?}."
            )));
        }
        Ok(())
    }
}

fn fill_template(template: &str, idx_sensor: usize, name: &str) -> String {
    template
        .replace("{n}", &(idx_sensor + 1).to_string())
        .replace("{name}", name)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region TableConfiguration

/// Validated input bundle handed from a configuration provider to the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTableConfig {
    /// Sensors in declaration order.
    pub sensors: Vec<SpecSensor>,
    /// Fail labels shared by all sensors.
    pub fault_labels: SpecFaultLabels,
    /// Column header naming.
    pub header_template: SpecHeaderTemplate,
}

impl SpecTableConfig {
    /// Bundle sensors and fault labels, checking the sensor count bounds.
    pub fn new(
        sensors: Vec<SpecSensor>,
        fault_labels: SpecFaultLabels,
        header_template: SpecHeaderTemplate,
    ) -> Result<Self> {
        if sensors.is_empty() {
            return Err(TableError::InvalidInput(
                "at least one sensor is required.".to_string(),
            ));
        }
        if sensors.len() > N_SENSORS_MAX {
            return Err(TableError::InvalidInput(format!(
                "sensor count {} exceeds the supported maximum of {N_SENSORS_MAX}.",
                sensors.len()
            )));
        }
        for (n_idx, sensor) in sensors.iter().enumerate() {
            header_template.validate_state_name(n_idx, &sensor.name)?;
        }
        Ok(Self {
            sensors,
            fault_labels,
            header_template,
        })
    }

    /// Number of sensors.
    pub fn sensor_count(&self) -> usize {
        self.sensors.len()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Style class of one grid cell; each class maps to one format preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumCellStyle {
    /// Merged band cell without fill.
    BandGroup,
    /// Merged band cell with header fill.
    BandGroupFilled,
    /// Blank bordered band cell above a status column.
    BandBlank,
    /// Column header cell.
    Header,
    /// Row index cell.
    Index,
    /// Plain data cell.
    Data,
    /// Data cell starting with `0=`.
    DataSafe,
    /// Data cell starting with `1=`.
    DataAlert,
}

/// Cell format specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,
    /// Text wrap.
    pub text_wrap: Option<bool>,

    /// Background fill color.
    pub bg_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            text_wrap: other.text_wrap.or(self.text_wrap),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RenderOptions

/// Options selecting between the grid rendering variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRenderOptions {
    /// Fill `0=` cells green and `1=` cells red.
    pub color_code_cells: bool,
    /// Band label over the sensor-state columns; blank when `None`.
    pub group_title_text: Option<String>,
    /// Use one fixed height for every row instead of per-line heights.
    pub uniform_row_height: bool,
}

impl Default for SpecRenderOptions {
    fn default() -> Self {
        Self {
            color_code_cells: true,
            group_title_text: None,
            uniform_row_height: false,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetSpecification

/// Concrete sheet part emitted to workbook (after Excel-limit slicing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetSlice {
    /// Actual sheet name in workbook.
    pub sheet_name: String,
    /// Inclusive data row start.
    pub row_start_inclusive: usize,
    /// Exclusive data row end.
    pub row_end_exclusive: usize,
}

/// Horizontal merge plan item for the band row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetHorizontalMerge {
    /// Start grid column index (inclusive).
    pub col_idx_start: usize,
    /// End grid column index (inclusive).
    pub col_idx_end: usize,
    /// Merge display text.
    pub text: String,
    /// Style class of the merged cell.
    pub style: EnumCellStyle,
}

impl SpecSheetHorizontalMerge {
    /// Number of grid columns covered.
    pub fn span(&self) -> usize {
        self.col_idx_end - self.col_idx_start + 1
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Per-run report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecGridReport {
    /// Workbook path written.
    pub path_file_out: PathBuf,
    /// Number of data rows (combinations).
    pub n_rows_data: usize,
    /// Number of grid columns, index column included.
    pub n_cols_grid: usize,
    /// Whether the group header band was created.
    pub if_band: bool,
    /// Sheet slices produced.
    pub sheets: Vec<SpecSheetSlice>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecGridReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} rows={} cols={} sheets={} band={} warnings={}",
            self.n_rows_data,
            self.n_cols_grid,
            self.sheets.len(),
            self.if_band,
            self.warnings.len()
        )
    }
}

impl fmt::Display for SpecGridReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[GRID]"))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
