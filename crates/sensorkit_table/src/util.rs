//! Stateless helper utilities used by the grid renderer and writer.

use crate::conf::{N_LEN_EXCEL_SHEET_NAME_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL};
use crate::spec::{SpecGridReport, SpecSheetSlice};

////////////////////////////////////////////////////////////////////////////////
// #region TextMeasure

/// Displayed length of a cell text, counted in characters.
pub fn measure_text_len(text: &str) -> usize {
    text.chars().count()
}

/// Number of lines in a cell text (`newline count + 1`).
pub fn count_text_lines(text: &str) -> usize {
    text.matches('\n').count() + 1
}

/// Index of the first header containing `marker`, compared case-insensitively.
pub fn find_marker_column(headers: &[String], marker: &str) -> Option<usize> {
    let c_marker = marker.to_uppercase();
    headers
        .iter()
        .position(|c_header| c_header.to_uppercase().contains(&c_marker))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Split data rows into sheet slices of at most `n_rows_sheet_max` rows each,
/// repeating `height_header` rows per sheet.
///
/// `n_rows_sheet_max` is capped at the Excel row limit.
pub fn plan_sheet_slices(
    height_data: usize,
    height_header: usize,
    n_rows_sheet_max: usize,
    sheet_name: &str,
    report: &mut SpecGridReport,
) -> Result<Vec<SpecSheetSlice>, String> {
    if height_header == 0 {
        return Err("height_header must be >= 1.".to_string());
    }

    let n_rows_data_max = usize::min(n_rows_sheet_max, N_NROWS_EXCEL_MAX)
        .checked_sub(height_header)
        .filter(|n_rows| *n_rows > 0)
        .ok_or_else(|| {
            format!(
                "Header too tall: height_header={height_header} leaves no data rows \
                 within {n_rows_sheet_max} rows per sheet."
            )
        })?;

    let mut l_row_slices = Vec::new();
    let mut n_row_start = 0;
    while n_row_start < height_data {
        let n_row_end = usize::min(height_data, n_row_start + n_rows_data_max);
        l_row_slices.push((n_row_start, n_row_end));
        n_row_start = n_row_end;
    }
    if l_row_slices.is_empty() {
        l_row_slices.push((0, 0));
    }

    let n_parts_total = l_row_slices.len();
    let l_sheet_parts: Vec<SpecSheetSlice> = l_row_slices
        .into_iter()
        .enumerate()
        .map(|(n_idx, (row_start, row_end))| SpecSheetSlice {
            sheet_name: if n_parts_total == 1 {
                sheet_name.to_string()
            } else {
                create_sheet_identifier(sheet_name, n_idx + 1)
            },
            row_start_inclusive: row_start,
            row_end_exclusive: row_end,
        })
        .collect();

    if n_parts_total > 1 {
        report.warn(format!(
            "Excel limit overflow: split {height_data} rows into {n_parts_total} sheets."
        ));
    }

    Ok(l_sheet_parts)
}

/// Create suffixed sheet name (`base_1`, `base_2`, ...), respecting length cap.
pub fn create_sheet_identifier(base_name: &str, part_idx_1based: usize) -> String {
    let c_sheet_name_suffix = format!("_{part_idx_1based}");
    let n_len_base_name_max = N_LEN_EXCEL_SHEET_NAME_MAX.saturating_sub(c_sheet_name_suffix.len());

    let c_sheet_name_base: String = base_name
        .chars()
        .take(usize::max(1, n_len_base_name_max))
        .collect();

    format!("{c_sheet_name_base}{c_sheet_name_suffix}")
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_text_lines() {
        assert_eq!(count_text_lines(""), 1);
        assert_eq!(count_text_lines("A"), 1);
        assert_eq!(count_text_lines("A\nB"), 2);
        assert_eq!(count_text_lines("A\nB\n"), 3);
    }

    #[test]
    fn test_find_marker_column_is_case_insensitive() {
        let l_headers = vec![
            "Sensor 1".to_string(),
            "Sensor 1 fail".to_string(),
            "STS".to_string(),
        ];
        assert_eq!(find_marker_column(&l_headers, "FAIL"), Some(1));
        assert_eq!(find_marker_column(&l_headers[..1], "FAIL"), None);
    }

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("a/b:c", "_"), "a_b_c");
        assert_eq!(sanitize_sheet_name("   ", "_"), "Sheet");
        assert_eq!(sanitize_sheet_name(&"x".repeat(40), "_").len(), 31);
    }

    #[test]
    fn test_plan_sheet_slices_single_sheet() {
        let mut report = SpecGridReport::default();
        let l_slices =
            plan_sheet_slices(16, 2, N_NROWS_EXCEL_MAX, "Sheet1", &mut report).expect("slices");
        assert_eq!(
            l_slices,
            vec![SpecSheetSlice {
                sheet_name: "Sheet1".to_string(),
                row_start_inclusive: 0,
                row_end_exclusive: 16,
            }]
        );
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_plan_sheet_slices_splits_at_excel_limit() {
        let mut report = SpecGridReport::default();
        let n_rows = 1usize << 20;
        let l_slices = plan_sheet_slices(n_rows, 2, N_NROWS_EXCEL_MAX, "Sheet1", &mut report)
            .expect("slices");
        assert_eq!(l_slices.len(), 2);
        assert_eq!(l_slices[0].sheet_name, "Sheet1_1");
        assert_eq!(l_slices[0].row_end_exclusive, N_NROWS_EXCEL_MAX - 2);
        assert_eq!(l_slices[1].sheet_name, "Sheet1_2");
        assert_eq!(l_slices[1].row_start_inclusive, N_NROWS_EXCEL_MAX - 2);
        assert_eq!(l_slices[1].row_end_exclusive, n_rows);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_plan_sheet_slices_with_small_sheet_limit() {
        let mut report = SpecGridReport::default();
        let l_slices = plan_sheet_slices(16, 2, 8, "Sheet1", &mut report).expect("slices");
        let l_bounds: Vec<(usize, usize)> = l_slices
            .iter()
            .map(|slice| (slice.row_start_inclusive, slice.row_end_exclusive))
            .collect();
        assert_eq!(l_bounds, vec![(0, 6), (6, 12), (12, 16)]);
        assert_eq!(l_slices[2].sheet_name, "Sheet1_3");
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_plan_sheet_slices_rejects_limit_without_data_rows() {
        let mut report = SpecGridReport::default();
        assert!(plan_sheet_slices(16, 2, 2, "Sheet1", &mut report).is_err());
    }

    #[test]
    fn test_create_sheet_identifier_respects_length_cap() {
        let c_name = create_sheet_identifier(&"y".repeat(31), 12);
        assert_eq!(c_name.len(), 31);
        assert!(c_name.ends_with("_12"));
    }
}
