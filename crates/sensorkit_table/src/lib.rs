//! `sensorkit_table` v1:
//! Sensor state/fault combination table kernel.
//!
//! Modules, leaf-first:
//! - `conf`      : constants and default presets
//! - `spec`      : specs/models/options
//! - `error`     : error categories
//! - `util`      : pure helper functions
//! - `enumerate` : bit tuple enumeration
//! - `format`    : annotated row formatting
//! - `table`     : table assembly
//! - `layout`    : grid layout rendering
//! - `writer`    : xlsx writer kernel
//! - `provider`  : configuration provider seam
//! - `pipeline`  : one-call orchestration
pub mod conf;
pub mod enumerate;
pub mod error;
pub mod format;
pub mod layout;
pub mod pipeline;
pub mod provider;
pub mod spec;
pub mod table;
pub mod util;
pub mod writer;

pub use conf::{
    C_FILE_OUT_DEFAULT, C_SHEET_NAME_DEFAULT, N_SENSORS_MAX, derive_default_grid_formats,
    derive_header_template,
};
pub use enumerate::{
    BitTuple, BitTupleIter, count_combinations, enumerate_bit_tuples, iter_bit_tuples,
    parse_sensor_count, validate_sensor_count,
};
pub use error::{Result, TableError};
pub use format::{
    SpecFormattedRow, decode_formatted_cell, decode_formatted_row, format_cell, format_row,
};
pub use layout::{
    EnumCellValue, SpecGrid, SpecGridCell, SpecGridLayout, classify_data_cell, plan_group_band,
    render_grid,
};
pub use pipeline::{EnumRunOutcome, generate_sensor_table, run_with_provider};
pub use provider::{ConfigurationProvider, EnumCollectOutcome, StaticProvider};
pub use spec::{
    EnumCellStyle, EnumHeaderStyle, SpecCellFormat, SpecFaultLabels, SpecGridReport,
    SpecHeaderTemplate, SpecRenderOptions, SpecSensor, SpecSheetHorizontalMerge, SpecSheetSlice,
    SpecTableConfig,
};
pub use table::{Table, assemble_table, derive_table_headers};
pub use writer::GridWriter;
