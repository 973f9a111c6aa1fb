//! End-to-end generation: configuration to saved workbook.

use std::path::Path;

use tracing::info;

use crate::conf::derive_default_grid_formats;
use crate::error::Result;
use crate::layout::render_grid;
use crate::provider::{ConfigurationProvider, EnumCollectOutcome};
use crate::spec::{SpecGridReport, SpecRenderOptions, SpecTableConfig};
use crate::table::assemble_table;
use crate::writer::GridWriter;

/// Outcome of a provider-driven run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumRunOutcome {
    /// Workbook written.
    Written(SpecGridReport),
    /// Provider cancelled; no file was touched.
    Cancelled,
}

/// Enumerate, assemble, render and save one sensor table.
///
/// The workbook is only saved after every earlier stage succeeded, so a failed
/// run leaves no file behind.
pub fn generate_sensor_table(
    config: &SpecTableConfig,
    path_file_out: &Path,
    options: &SpecRenderOptions,
    sheet_name: &str,
) -> Result<SpecGridReport> {
    let table = assemble_table(config)?;
    let grid = render_grid(&table, options)?;

    let mut writer = GridWriter::new(path_file_out.to_path_buf(), &derive_default_grid_formats());
    let report = writer.write_grid(&grid, sheet_name)?;
    writer.close()?;

    info!(
        path = %path_file_out.display(),
        n_rows = report.n_rows_data,
        n_sheets = report.sheets.len(),
        "sensor table generated"
    );
    Ok(report)
}

/// Collect a configuration from `provider` and generate the table unless cancelled.
pub fn run_with_provider(
    provider: &mut dyn ConfigurationProvider,
    path_file_out: &Path,
    options: &SpecRenderOptions,
    sheet_name: &str,
) -> Result<EnumRunOutcome> {
    match provider.collect()? {
        EnumCollectOutcome::Cancelled => {
            info!("configuration cancelled, nothing written");
            Ok(EnumRunOutcome::Cancelled)
        }
        EnumCollectOutcome::Ready(config) => {
            generate_sensor_table(&config, path_file_out, options, sheet_name)
                .map(EnumRunOutcome::Written)
        }
    }
}
