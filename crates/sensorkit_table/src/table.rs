//! Table assembler: headers plus one formatted row per combination.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::{AnyValue, Column, DataFrame, IntoColumn, NamedFrom, Series};
use tracing::{debug, info};

use crate::conf::N_STATUS_COLS;
use crate::enumerate::{count_combinations, iter_bit_tuples};
use crate::error::{Result, TableError};
use crate::format::format_row;
use crate::spec::SpecTableConfig;

/// Rectangular string table backed by a DataFrame whose column names are the headers.
#[derive(Debug, Clone)]
pub struct Table {
    df: DataFrame,
}

impl Table {
    /// Build a table from headers and row-major cells.
    ///
    /// Fails with [`TableError::SchemaMismatch`] when any row width differs from
    /// the header count or headers repeat.
    pub fn from_rows(headers: &[String], rows: &[Vec<String>]) -> Result<Self> {
        validate_table_schema(headers, rows)?;

        let mut l_columns: Vec<Vec<String>> = vec![Vec::with_capacity(rows.len()); headers.len()];
        for row in rows {
            for (n_idx_col, cell) in row.iter().enumerate() {
                l_columns[n_idx_col].push(cell.clone());
            }
        }
        Self::from_columns(headers, l_columns)
    }

    fn from_columns(headers: &[String], columns: Vec<Vec<String>>) -> Result<Self> {
        validate_unique_columns(headers).map_err(TableError::SchemaMismatch)?;

        let l_cols: Vec<Column> = headers
            .iter()
            .zip(columns)
            .map(|(c_name, values)| Series::new(c_name.as_str().into(), values).into_column())
            .collect();
        let df = DataFrame::new(l_cols)
            .map_err(|err| TableError::SchemaMismatch(format!("Failed to build table: {err}")))?;
        Ok(Self { df })
    }

    /// Column headers in order.
    pub fn headers(&self) -> Vec<String> {
        self.df
            .get_column_names_str()
            .into_iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Number of data rows.
    pub fn n_rows(&self) -> usize {
        self.df.height()
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.df.width()
    }

    /// Text of one cell.
    pub fn cell(&self, row_idx: usize, col_idx: usize) -> Result<String> {
        let Some(col) = self.df.get_columns().get(col_idx) else {
            return Err(TableError::SchemaMismatch(format!(
                "column index {col_idx} out of range."
            )));
        };
        let value = col.get(row_idx).map_err(|err| {
            TableError::SchemaMismatch(format!("Failed to access cell value: {err}"))
        })?;
        Ok(derive_text_from_any_value(value))
    }

    /// Cells of one row.
    pub fn row(&self, row_idx: usize) -> Result<Vec<String>> {
        (0..self.n_cols())
            .map(|col_idx| self.cell(row_idx, col_idx))
            .collect()
    }
}

fn derive_text_from_any_value(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(val) => val.to_string(),
        AnyValue::StringOwned(val) => val.to_string(),
        _ => value.to_string(),
    }
}

/// Build the header row: state headers, fail headers, two status headers.
pub fn derive_table_headers(config: &SpecTableConfig) -> Vec<String> {
    let template = &config.header_template;
    let mut l_headers = Vec::with_capacity(2 * config.sensor_count() + N_STATUS_COLS);
    for (n_idx, sensor) in config.sensors.iter().enumerate() {
        l_headers.push(template.render_state(n_idx, sensor));
    }
    for (n_idx, sensor) in config.sensors.iter().enumerate() {
        l_headers.push(template.render_fail(n_idx, sensor));
    }
    l_headers.push(template.status_state.clone());
    l_headers.push(template.status_fail.clone());
    l_headers
}

/// Enumerate, format and collect every combination into a table.
pub fn assemble_table(config: &SpecTableConfig) -> Result<Table> {
    let n_sensors = config.sensor_count();
    let l_headers = derive_table_headers(config);
    let n_width = l_headers.len();

    let iter_tuples = iter_bit_tuples(n_sensors)?;
    let n_rows_expected = iter_tuples.len();
    info!(n_sensors, n_rows = n_rows_expected, "assembling combination table");

    let mut l_columns: Vec<Vec<String>> = vec![Vec::with_capacity(n_rows_expected); n_width];
    for tuple in iter_tuples {
        let l_cells = format_row(&tuple, &config.sensors, &config.fault_labels)?.into_table_cells();
        if l_cells.len() != n_width {
            return Err(TableError::SchemaMismatch(format!(
                "row {} has {} cells, expected {n_width}.",
                tuple.index(),
                l_cells.len()
            )));
        }
        for (n_idx_col, cell) in l_cells.into_iter().enumerate() {
            l_columns[n_idx_col].push(cell);
        }
    }

    let table = Table::from_columns(&l_headers, l_columns)?;
    validate_table_shape(&table, n_sensors)?;
    debug!(n_rows = table.n_rows(), n_cols = table.n_cols(), "table assembled");
    Ok(table)
}

/// Check that every row has as many cells as there are headers.
pub fn validate_table_schema(headers: &[String], rows: &[Vec<String>]) -> Result<()> {
    for (n_idx_row, row) in rows.iter().enumerate() {
        if row.len() != headers.len() {
            return Err(TableError::SchemaMismatch(format!(
                "row {n_idx_row} has {} cells but there are {} headers.",
                row.len(),
                headers.len()
            )));
        }
    }
    Ok(())
}

/// Check the `2n + 2` columns and `4^n` rows invariants.
pub fn validate_table_shape(table: &Table, sensor_count: usize) -> Result<()> {
    let n_cols_expected = 2 * sensor_count + N_STATUS_COLS;
    if table.n_cols() != n_cols_expected {
        return Err(TableError::SchemaMismatch(format!(
            "table has {} columns, expected {n_cols_expected}.",
            table.n_cols()
        )));
    }
    let n_rows_expected = count_combinations(sensor_count)?;
    if table.n_rows() as u64 != n_rows_expected {
        return Err(TableError::SchemaMismatch(format!(
            "table has {} rows, expected {n_rows_expected}.",
            table.n_rows()
        )));
    }
    Ok(())
}

/// Validate that `columns` has no duplicated names.
pub fn validate_unique_columns(columns: &[String]) -> std::result::Result<(), String> {
    if columns.len() == columns.iter().collect::<BTreeSet<_>>().len() {
        return Ok(());
    }

    let mut dict_pos: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (n_idx, c_name) in columns.iter().enumerate() {
        dict_pos.entry(c_name).or_default().push(n_idx);
    }

    let c_msg = dict_pos
        .iter()
        .filter(|(_, l_pos)| l_pos.len() > 1)
        .map(|(c_name, l_pos)| format!("{c_name:?} x{} at indices {:?}", l_pos.len(), l_pos))
        .collect::<Vec<_>>()
        .join("; ");

    Err(format!("Duplicate column names detected: {c_msg}"))
}
