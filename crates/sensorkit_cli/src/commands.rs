use std::io;
use std::path::Path;

use tracing::{info, info_span};

use sensorkit_table::{
    ConfigurationProvider, EnumRunOutcome, Result, SpecGridReport, TableError, run_with_provider,
};

use crate::cli::TableArgs;
use crate::config::{SpecRunSettings, derive_run_settings};
use crate::provider::{ArgsProvider, PromptSession};

/// Exit code for a written workbook or a cancelled session.
pub const N_EXIT_OK: i32 = 0;
/// Exit code for write and internal failures.
pub const N_EXIT_FAILURE: i32 = 1;
/// Exit code for rejected input.
pub const N_EXIT_INVALID_INPUT: i32 = 2;

pub fn run_generate(args: &TableArgs) -> Result<EnumRunOutcome> {
    let settings = derive_run_settings(args)?;
    let span = info_span!("generate", path = %settings.path_file_out.display());
    let _guard = span.enter();

    if settings.if_interactive {
        let stdin = io::stdin();
        let mut provider = PromptSession::new(settings.clone(), stdin.lock(), io::stdout());
        run_settings(&settings, &mut provider)
    } else {
        let mut provider = ArgsProvider::new(settings.clone());
        run_settings(&settings, &mut provider)
    }
}

fn run_settings(
    settings: &SpecRunSettings,
    provider: &mut dyn ConfigurationProvider,
) -> Result<EnumRunOutcome> {
    info!(interactive = settings.if_interactive, "collecting configuration");
    run_with_provider(
        provider,
        &settings.path_file_out,
        &settings.render_options,
        &settings.sheet_name,
    )
}

pub fn derive_exit_code(result: &Result<EnumRunOutcome>) -> i32 {
    match result {
        Ok(_) => N_EXIT_OK,
        Err(TableError::InvalidInput(_)) => N_EXIT_INVALID_INPUT,
        Err(_) => N_EXIT_FAILURE,
    }
}

/// Message shown to the user for a failed run.
pub fn derive_error_message(err: &TableError) -> String {
    match err {
        TableError::InvalidInput(message) => format!("Invalid input: {message}"),
        TableError::SchemaMismatch(message) => format!("Table generation failed: {message}"),
        TableError::OutputWrite { path, message } => format!(
            "Could not write the workbook: {message}\nPlease close '{}' if it's open.",
            file_name_of(path)
        ),
    }
}

/// Message shown to the user for a successful run.
pub fn derive_success_message(report: &SpecGridReport) -> String {
    let path_abs =
        std::path::absolute(&report.path_file_out).unwrap_or_else(|_| report.path_file_out.clone());
    let mut c_message = format!("Excel file created:\n{}", path_abs.display());
    for c_warning in &report.warnings {
        c_message.push_str(&format!("\nwarning: {c_warning}"));
    }
    c_message
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
