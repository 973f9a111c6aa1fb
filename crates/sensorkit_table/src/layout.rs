//! Grid layout renderer: band, index column, cell styles and sizing.
//!
//! Rendering is pure; the same table and options always produce the same
//! [`SpecGridLayout`] and the same per-cell style classes. Steps run in a fixed
//! order because sizing reads the final column layout:
//! 1. group header band above the header row,
//! 2. index column inserted at the left,
//! 3. cell style classes,
//! 4. column widths and row heights.

use tracing::debug;

use crate::conf::{
    C_FAIL_GROUP_TITLE, C_FAIL_MARKER, C_PREFIX_ALERT, C_PREFIX_SAFE, N_HEIGHT_LINE_UNIT,
    N_HEIGHT_ROW_UNIFORM, N_STATUS_COLS, N_WIDTH_CELL_MAX, N_WIDTH_CELL_PADDING,
    N_WIDTH_INDEX_COL,
};
use crate::error::{Result, TableError};
use crate::spec::{EnumCellStyle, SpecRenderOptions, SpecSheetHorizontalMerge};
use crate::table::Table;
use crate::util::{count_text_lines, find_marker_column, measure_text_len};

/// Normalized value of one grid cell.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Blank cell (still styled).
    None,
    /// Text value.
    String(String),
    /// Numeric value (row index).
    Number(f64),
}

impl EnumCellValue {
    fn text_len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::String(val) => measure_text_len(val),
            Self::Number(val) => val.to_string().len(),
        }
    }
}

/// One styled grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecGridCell {
    /// Cell value.
    pub value: EnumCellValue,
    /// Style class.
    pub style: EnumCellStyle,
}

/// Structural layout decisions of a rendered grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecGridLayout {
    /// Band cells in grid column coordinates; `None` when the band was skipped.
    pub band: Option<Vec<SpecSheetHorizontalMerge>>,
    /// Header row, blank index header first.
    pub headers: Vec<String>,
    /// Width of every grid column.
    pub column_widths: Vec<usize>,
    /// Height of every grid row, band and header rows first.
    pub row_heights: Vec<f64>,
}

/// Rendered grid: the source table plus its layout and styling decisions.
#[derive(Debug, Clone)]
pub struct SpecGrid {
    table: Table,
    layout: SpecGridLayout,
    if_color_code_cells: bool,
}

impl SpecGrid {
    /// Layout decisions.
    pub fn layout(&self) -> &SpecGridLayout {
        &self.layout
    }

    /// Band cells, if the band was created.
    pub fn band(&self) -> Option<&[SpecSheetHorizontalMerge]> {
        self.layout.band.as_deref()
    }

    /// Header row, index column included.
    pub fn headers(&self) -> &[String] {
        &self.layout.headers
    }

    /// Number of rows above the data (band and header).
    pub fn n_rows_header(&self) -> usize {
        if self.layout.band.is_some() { 2 } else { 1 }
    }

    /// Row offset of the header row.
    pub fn row_idx_header(&self) -> usize {
        self.n_rows_header() - 1
    }

    /// Number of data rows.
    pub fn n_rows_data(&self) -> usize {
        self.table.n_rows()
    }

    /// Number of grid columns, index column included.
    pub fn n_cols(&self) -> usize {
        self.layout.headers.len()
    }

    /// Header cell at a grid column.
    pub fn header_cell(&self, col_idx: usize) -> SpecGridCell {
        let value = match self.layout.headers.get(col_idx) {
            Some(val) if !val.is_empty() => EnumCellValue::String(val.clone()),
            _ => EnumCellValue::None,
        };
        SpecGridCell {
            value,
            style: EnumCellStyle::Header,
        }
    }

    /// Styled cells of one data row, index cell first.
    pub fn data_row(&self, row_idx: usize) -> Result<Vec<SpecGridCell>> {
        let mut l_cells = Vec::with_capacity(self.n_cols());
        l_cells.push(SpecGridCell {
            value: EnumCellValue::Number(row_idx as f64),
            style: EnumCellStyle::Index,
        });
        for c_text in self.table.row(row_idx)? {
            let style = classify_data_cell(&c_text, self.if_color_code_cells);
            let value = if c_text.is_empty() {
                EnumCellValue::None
            } else {
                EnumCellValue::String(c_text)
            };
            l_cells.push(SpecGridCell { value, style });
        }
        Ok(l_cells)
    }
}

/// Style class of a data cell; color coding looks only at the text prefix.
pub fn classify_data_cell(text: &str, if_color_code_cells: bool) -> EnumCellStyle {
    if if_color_code_cells {
        if text.starts_with(C_PREFIX_SAFE) {
            return EnumCellStyle::DataSafe;
        }
        if text.starts_with(C_PREFIX_ALERT) {
            return EnumCellStyle::DataAlert;
        }
    }
    EnumCellStyle::Data
}

/// Plan the band above table headers (table column coordinates).
///
/// Returns `Ok(None)` when no state column precedes a fail-marked header.
/// Fails when the fail-marked headers are not one contiguous block ending at
/// the status columns.
pub fn plan_group_band(
    headers: &[String],
    options: &SpecRenderOptions,
) -> Result<Option<Vec<SpecSheetHorizontalMerge>>> {
    let Some(n_width_groups) = headers.len().checked_sub(N_STATUS_COLS) else {
        debug!(n_cols = headers.len(), "band skipped: too few columns");
        return Ok(None);
    };
    let l_headers_groups = &headers[..n_width_groups];

    let Some(n_fail_start) = find_marker_column(l_headers_groups, C_FAIL_MARKER) else {
        debug!("band skipped: no fail marker in headers");
        return Ok(None);
    };
    if n_fail_start == 0 {
        debug!("band skipped: no sensor-state column before the fail block");
        return Ok(None);
    }

    let c_marker = C_FAIL_MARKER.to_uppercase();
    if let Some(c_header) = l_headers_groups[n_fail_start..]
        .iter()
        .find(|c_header| !c_header.to_uppercase().contains(&c_marker))
    {
        return Err(TableError::SchemaMismatch(format!(
            "header {c_header:?} interrupts the fail-state block starting at column {n_fail_start}."
        )));
    }

    let (c_state_title, style_state) = match options.group_title_text.as_deref() {
        Some(val) if !val.is_empty() => (val.to_string(), EnumCellStyle::BandGroupFilled),
        _ => (String::new(), EnumCellStyle::BandGroup),
    };

    let mut l_band = vec![
        SpecSheetHorizontalMerge {
            col_idx_start: 0,
            col_idx_end: n_fail_start - 1,
            text: c_state_title,
            style: style_state,
        },
        SpecSheetHorizontalMerge {
            col_idx_start: n_fail_start,
            col_idx_end: n_width_groups - 1,
            text: C_FAIL_GROUP_TITLE.to_string(),
            style: EnumCellStyle::BandGroupFilled,
        },
    ];
    for n_idx_col in n_width_groups..headers.len() {
        l_band.push(SpecSheetHorizontalMerge {
            col_idx_start: n_idx_col,
            col_idx_end: n_idx_col,
            text: String::new(),
            style: EnumCellStyle::BandBlank,
        });
    }

    debug!(
        n_fail_start,
        n_fail_end = n_width_groups - 1,
        "band planned"
    );
    Ok(Some(l_band))
}

/// Shift band cells right by the inserted index column.
fn shift_band(
    band: Vec<SpecSheetHorizontalMerge>,
    n_offset: usize,
) -> Vec<SpecSheetHorizontalMerge> {
    band.into_iter()
        .map(|merge| SpecSheetHorizontalMerge {
            col_idx_start: merge.col_idx_start + n_offset,
            col_idx_end: merge.col_idx_end + n_offset,
            ..merge
        })
        .collect()
}

/// Column width rule: `min(max_len + padding, ceiling)`.
pub fn calculate_column_width(n_len_max: usize) -> usize {
    usize::min(n_len_max + N_WIDTH_CELL_PADDING, N_WIDTH_CELL_MAX)
}

/// Row height rule: line count times the line unit.
pub fn calculate_row_height(n_lines_max: usize) -> f64 {
    usize::max(1, n_lines_max) as f64 * N_HEIGHT_LINE_UNIT
}

/// Render a table into a grid.
pub fn render_grid(table: &Table, options: &SpecRenderOptions) -> Result<SpecGrid> {
    let l_headers_table = table.headers();

    // 1. band
    let band = plan_group_band(&l_headers_table, options)?.map(|band| shift_band(band, 1));

    // 2. index column
    let mut l_headers = Vec::with_capacity(l_headers_table.len() + 1);
    l_headers.push(String::new());
    l_headers.extend(l_headers_table);
    let n_cols = l_headers.len();
    let mut l_len_by_col = vec![0usize; n_cols];

    // 3. styles are classified per cell on access, see `SpecGrid::data_row`.
    let mut l_row_heights = Vec::with_capacity(table.n_rows() + 2);

    // 4. sizing
    if let Some(l_band) = &band {
        let mut n_lines_max = 1;
        for merge in l_band {
            l_len_by_col[merge.col_idx_start] =
                usize::max(l_len_by_col[merge.col_idx_start], measure_text_len(&merge.text));
            n_lines_max = usize::max(n_lines_max, count_text_lines(&merge.text));
        }
        l_row_heights.push(n_lines_max);
    }

    let mut n_lines_header = 1;
    for (n_idx_col, c_header) in l_headers.iter().enumerate() {
        l_len_by_col[n_idx_col] = usize::max(l_len_by_col[n_idx_col], measure_text_len(c_header));
        n_lines_header = usize::max(n_lines_header, count_text_lines(c_header));
    }
    l_row_heights.push(n_lines_header);

    for n_idx_row in 0..table.n_rows() {
        l_len_by_col[0] = usize::max(
            l_len_by_col[0],
            EnumCellValue::Number(n_idx_row as f64).text_len(),
        );
        let mut n_lines_max = 1;
        for (n_idx_col, c_text) in table.row(n_idx_row)?.iter().enumerate() {
            l_len_by_col[n_idx_col + 1] =
                usize::max(l_len_by_col[n_idx_col + 1], measure_text_len(c_text));
            n_lines_max = usize::max(n_lines_max, count_text_lines(c_text));
        }
        l_row_heights.push(n_lines_max);
    }

    let mut l_column_widths: Vec<usize> = l_len_by_col
        .iter()
        .map(|n_len_max| calculate_column_width(*n_len_max))
        .collect();
    l_column_widths[0] = usize::max(N_WIDTH_INDEX_COL, l_column_widths[0]);
    let row_heights = if options.uniform_row_height {
        vec![N_HEIGHT_ROW_UNIFORM; l_row_heights.len()]
    } else {
        l_row_heights.into_iter().map(calculate_row_height).collect()
    };

    debug!(
        if_band = band.is_some(),
        n_cols,
        n_rows = row_heights.len(),
        "grid rendered"
    );

    Ok(SpecGrid {
        table: table.clone(),
        layout: SpecGridLayout {
            band,
            headers: l_headers,
            column_widths: l_column_widths,
            row_heights,
        },
        if_color_code_cells: options.color_code_cells,
    })
}
