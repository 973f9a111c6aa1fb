//! XLSX writer kernel that lays a rendered grid onto workbook sheets.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use tracing::{debug, info, warn};

use crate::conf::{N_LEN_EXCEL_SHEET_NAME_MAX, N_NROWS_EXCEL_MAX};
use crate::error::{Result, TableError};
use crate::layout::{EnumCellValue, SpecGrid};
use crate::spec::{EnumCellStyle, SpecCellFormat, SpecGridReport, SpecSheetSlice};
use crate::util::{plan_sheet_slices, sanitize_sheet_name};

/// Stateful workbook writer.
pub struct GridWriter {
    path_file_out: PathBuf,
    workbook: Workbook,
    dict_fmt: BTreeMap<EnumCellStyle, Format>,
    fmt_fallback: Format,
    set_sheet_names_existing: BTreeSet<String>,
    n_rows_sheet_max: usize,
    if_closed: bool,
}

impl GridWriter {
    /// Create writer bound to output path and per-style format presets.
    ///
    /// The workbook is buffered in memory until [`Self::close`] is called, so
    /// nothing touches the output path before then.
    pub fn new(path_file_out: PathBuf, formats: &BTreeMap<EnumCellStyle, SpecCellFormat>) -> Self {
        let dict_fmt = formats
            .iter()
            .map(|(style, spec)| (*style, derive_rust_xlsx_format(spec)))
            .collect();
        Self {
            path_file_out,
            workbook: Workbook::new(),
            dict_fmt,
            fmt_fallback: Format::new(),
            set_sheet_names_existing: BTreeSet::new(),
            n_rows_sheet_max: N_NROWS_EXCEL_MAX,
            if_closed: false,
        }
    }

    /// Cap rows per sheet (header rows included) below the Excel limit.
    pub fn with_rows_sheet_max(mut self, n_rows_sheet_max: usize) -> Self {
        self.n_rows_sheet_max = n_rows_sheet_max;
        self
    }

    /// Flush workbook to disk. Idempotent.
    pub fn close(&mut self) -> Result<()> {
        if self.if_closed {
            return Ok(());
        }
        self.workbook
            .save(&self.path_file_out)
            .map_err(|err| self.derive_output_error(err))?;
        self.if_closed = true;
        info!(path = %self.path_file_out.display(), "workbook saved");
        Ok(())
    }

    /// Write one grid, splitting its data rows over several sheets when needed.
    pub fn write_grid(&mut self, grid: &SpecGrid, sheet_name: &str) -> Result<SpecGridReport> {
        if self.if_closed {
            return Err(TableError::OutputWrite {
                path: self.path_file_out.clone(),
                message: "Cannot write after close().".to_string(),
            });
        }

        let mut report = SpecGridReport {
            path_file_out: self.path_file_out.clone(),
            n_rows_data: grid.n_rows_data(),
            n_cols_grid: grid.n_cols(),
            if_band: grid.band().is_some(),
            ..Default::default()
        };

        let l_sheet_parts = plan_sheet_slices(
            grid.n_rows_data(),
            grid.n_rows_header(),
            self.n_rows_sheet_max,
            &sanitize_sheet_name(sheet_name, "_"),
            &mut report,
        )
        .map_err(TableError::SchemaMismatch)?;
        if l_sheet_parts.len() > 1 {
            warn!(n_sheets = l_sheet_parts.len(), "grid split over several sheets");
        }

        for sheet_slice in l_sheet_parts {
            let sheet_name_unique = self.derive_unique_sheet_name(&sheet_slice.sheet_name);
            let worksheet = self.workbook.add_worksheet();
            worksheet
                .set_name(&sheet_name_unique)
                .map_err(derive_xlsx_error_text)
                .map_err(TableError::SchemaMismatch)?;

            write_sheet(
                worksheet,
                grid,
                &sheet_slice,
                &self.dict_fmt,
                &self.fmt_fallback,
            )
            .map_err(|message| TableError::OutputWrite {
                path: self.path_file_out.clone(),
                message,
            })?;
            debug!(
                sheet = %sheet_name_unique,
                row_start = sheet_slice.row_start_inclusive,
                row_end = sheet_slice.row_end_exclusive,
                "sheet written"
            );

            report.sheets.push(SpecSheetSlice {
                sheet_name: sheet_name_unique,
                ..sheet_slice
            });
        }

        Ok(report)
    }

    fn derive_output_error(&self, err: XlsxError) -> TableError {
        TableError::OutputWrite {
            path: self.path_file_out.clone(),
            message: derive_xlsx_error_text(err),
        }
    }

    fn derive_unique_sheet_name(&mut self, name: &str) -> String {
        if !self.set_sheet_names_existing.contains(name) {
            self.set_sheet_names_existing.insert(name.to_string());
            return name.to_string();
        }

        let base_name: String = name
            .chars()
            .take(usize::max(1, N_LEN_EXCEL_SHEET_NAME_MAX - 3))
            .collect();

        let mut n_idx = 2usize;
        loop {
            let candidate: String = format!("{base_name}__{n_idx}")
                .chars()
                .take(N_LEN_EXCEL_SHEET_NAME_MAX)
                .collect();
            if !self.set_sheet_names_existing.contains(&candidate) {
                self.set_sheet_names_existing.insert(candidate.clone());
                return candidate;
            }
            n_idx += 1;
        }
    }
}

fn write_sheet(
    worksheet: &mut Worksheet,
    grid: &SpecGrid,
    sheet_slice: &SpecSheetSlice,
    dict_fmt: &BTreeMap<EnumCellStyle, Format>,
    fmt_fallback: &Format,
) -> std::result::Result<(), String> {
    let fmt_of = |style: EnumCellStyle| dict_fmt.get(&style).unwrap_or(fmt_fallback);
    let layout = grid.layout();
    let n_rows_header = grid.n_rows_header();

    if let Some(l_band) = grid.band() {
        for merge in l_band {
            let fmt_band = fmt_of(merge.style);
            if merge.span() > 1 {
                worksheet
                    .merge_range(
                        0,
                        cast_col_num(merge.col_idx_start)?,
                        0,
                        cast_col_num(merge.col_idx_end)?,
                        &merge.text,
                        fmt_band,
                    )
                    .map_err(derive_xlsx_error_text)?;
            } else {
                let value = if merge.text.is_empty() {
                    EnumCellValue::None
                } else {
                    EnumCellValue::String(merge.text.clone())
                };
                write_cell_with_format(worksheet, 0, merge.col_idx_start, &value, fmt_band)?;
            }
        }
    }

    let n_row_header = grid.row_idx_header();
    for n_idx_col in 0..grid.n_cols() {
        let cell = grid.header_cell(n_idx_col);
        write_cell_with_format(
            worksheet,
            n_row_header,
            n_idx_col,
            &cell.value,
            fmt_of(cell.style),
        )?;
    }

    for n_row_data in sheet_slice.row_start_inclusive..sheet_slice.row_end_exclusive {
        let n_row_sheet = n_rows_header + n_row_data - sheet_slice.row_start_inclusive;
        let l_cells = grid.data_row(n_row_data).map_err(|err| err.to_string())?;
        for (n_idx_col, cell) in l_cells.iter().enumerate() {
            write_cell_with_format(
                worksheet,
                n_row_sheet,
                n_idx_col,
                &cell.value,
                fmt_of(cell.style),
            )?;
        }
        worksheet
            .set_row_height(
                cast_row_num(n_row_sheet)?,
                layout.row_heights[n_rows_header + n_row_data],
            )
            .map_err(derive_xlsx_error_text)?;
    }

    for (n_idx_row, height) in layout.row_heights.iter().take(n_rows_header).enumerate() {
        worksheet
            .set_row_height(cast_row_num(n_idx_row)?, *height)
            .map_err(derive_xlsx_error_text)?;
    }
    for (n_idx_col, n_width) in layout.column_widths.iter().enumerate() {
        worksheet
            .set_column_width(cast_col_num(n_idx_col)?, *n_width as f64)
            .map_err(derive_xlsx_error_text)?;
    }

    worksheet
        .set_freeze_panes(cast_row_num(n_rows_header)?, 1)
        .map_err(derive_xlsx_error_text)?;

    Ok(())
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    format: &Format,
) -> std::result::Result<(), String> {
    match value {
        EnumCellValue::None => {
            worksheet
                .write_blank(cast_row_num(row_idx)?, cast_col_num(col_idx)?, format)
                .map_err(derive_xlsx_error_text)?;
        }
        EnumCellValue::String(val) => {
            worksheet
                .write_string_with_format(
                    cast_row_num(row_idx)?,
                    cast_col_num(col_idx)?,
                    val,
                    format,
                )
                .map_err(derive_xlsx_error_text)?;
        }
        EnumCellValue::Number(val) => {
            worksheet
                .write_number_with_format(
                    cast_row_num(row_idx)?,
                    cast_col_num(col_idx)?,
                    *val,
                    format,
                )
                .map_err(derive_xlsx_error_text)?;
        }
    }
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }

    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.valign
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }

    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }
    if spec.text_wrap.unwrap_or(false) {
        format = format.set_text_wrap();
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    let value = align.trim().to_ascii_lowercase();
    match value.as_str() {
        "center" => Some(FormatAlign::Center),
        "vcenter" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

fn cast_row_num(value: usize) -> std::result::Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("row index overflow: {value}"))
}

fn cast_col_num(value: usize) -> std::result::Result<u16, String> {
    u16::try_from(value).map_err(|_| format!("column index overflow: {value}"))
}

fn derive_xlsx_error_text(err: XlsxError) -> String {
    format!("xlsx write error: {err}")
}
