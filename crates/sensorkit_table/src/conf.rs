//! Grid constants and default preset factories.

use std::collections::BTreeMap;

use crate::spec::{EnumCellStyle, EnumHeaderStyle, SpecCellFormat, SpecHeaderTemplate};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Largest sensor count whose combination index still fits the enumerator.
pub const N_SENSORS_MAX: usize = 31;
/// Sensor counts above this log a growth warning.
pub const N_SENSORS_WARN: usize = 8;

/// Token marking a fail-state header (matched case-insensitively).
pub const C_FAIL_MARKER: &str = "FAIL";
/// Band label over the fail-state columns.
pub const C_FAIL_GROUP_TITLE: &str = "Sensor Fail";
/// Number of trailing status columns.
pub const N_STATUS_COLS: usize = 2;

/// Data cell prefix colored as safe.
pub const C_PREFIX_SAFE: &str = "0=";
/// Data cell prefix colored as alert.
pub const C_PREFIX_ALERT: &str = "1=";

/// Light yellow header fill.
pub const C_COLOR_HEADER_FILL: &str = "#FFF2CC";
/// Green fill for `0=` cells.
pub const C_COLOR_SAFE_FILL: &str = "#C6EFCE";
/// Red fill for `1=` cells.
pub const C_COLOR_ALERT_FILL: &str = "#FFC7CE";

/// Narrowest width of the index column.
pub const N_WIDTH_INDEX_COL: usize = 5;
/// Padding added to the longest text in a column.
pub const N_WIDTH_CELL_PADDING: usize = 4;
/// Column width ceiling.
pub const N_WIDTH_CELL_MAX: usize = 30;
/// Row height per text line.
pub const N_HEIGHT_LINE_UNIT: f64 = 15.0;
/// Row height used by the uniform-height variant.
pub const N_HEIGHT_ROW_UNIFORM: f64 = 22.0;
/// Font size for header and band text.
pub const N_FONT_SIZE_HEADER: i64 = 12;

/// Default output workbook file name.
pub const C_FILE_OUT_DEFAULT: &str = "Sensor_Validation_Table.xlsx";
/// Default worksheet name.
pub const C_SHEET_NAME_DEFAULT: &str = "Sheet1";

/// Build the format preset for every cell style class used by the grid.
pub fn derive_default_grid_formats() -> BTreeMap<EnumCellStyle, SpecCellFormat> {
    let cfg_centered = SpecCellFormat {
        border: Some(1),
        align: Some("center".to_string()),
        valign: Some("vcenter".to_string()),
        ..Default::default()
    };
    let cfg_title = cfg_centered.with_(SpecCellFormat {
        bold: Some(true),
        font_size: Some(N_FONT_SIZE_HEADER),
        text_wrap: Some(true),
        ..Default::default()
    });
    let cfg_data = cfg_centered.with_(SpecCellFormat {
        text_wrap: Some(true),
        ..Default::default()
    });

    let mut dict_fmt = BTreeMap::new();
    dict_fmt.insert(EnumCellStyle::BandGroup, cfg_title.clone());
    dict_fmt.insert(
        EnumCellStyle::BandGroupFilled,
        cfg_title.with_(SpecCellFormat {
            bg_color: Some(C_COLOR_HEADER_FILL.to_string()),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        EnumCellStyle::BandBlank,
        SpecCellFormat {
            border: Some(1),
            ..Default::default()
        },
    );
    dict_fmt.insert(
        EnumCellStyle::Header,
        cfg_title.with_(SpecCellFormat {
            bg_color: Some(C_COLOR_HEADER_FILL.to_string()),
            ..Default::default()
        }),
    );
    dict_fmt.insert(EnumCellStyle::Index, cfg_centered.clone());
    dict_fmt.insert(EnumCellStyle::Data, cfg_data.clone());
    dict_fmt.insert(
        EnumCellStyle::DataSafe,
        cfg_data.with_(SpecCellFormat {
            bg_color: Some(C_COLOR_SAFE_FILL.to_string()),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        EnumCellStyle::DataAlert,
        cfg_data.with_(SpecCellFormat {
            bg_color: Some(C_COLOR_ALERT_FILL.to_string()),
            ..Default::default()
        }),
    );

    dict_fmt
}

/// Header naming template for a preset style.
pub fn derive_header_template(style: EnumHeaderStyle) -> SpecHeaderTemplate {
    match style {
        EnumHeaderStyle::Plain => SpecHeaderTemplate {
            state: "SENSOR {n}".to_string(),
            fail: "SENSOR {n} FAIL".to_string(),
            status_state: "SENSOR STS".to_string(),
            status_fail: "SENSOR FAIL STS".to_string(),
        },
        EnumHeaderStyle::Stacked => SpecHeaderTemplate {
            state: "{name}\nMCU{n}".to_string(),
            fail: "MCU{n}\nSENSOR FAIL{n}".to_string(),
            status_state: "SENSOR STS".to_string(),
            status_fail: "SENSOR FAIL STS".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_style_has_a_preset() {
        let dict_fmt = derive_default_grid_formats();
        for style in [
            EnumCellStyle::BandGroup,
            EnumCellStyle::BandGroupFilled,
            EnumCellStyle::BandBlank,
            EnumCellStyle::Header,
            EnumCellStyle::Index,
            EnumCellStyle::Data,
            EnumCellStyle::DataSafe,
            EnumCellStyle::DataAlert,
        ] {
            assert!(dict_fmt.contains_key(&style), "missing {style:?}");
        }
    }

    #[test]
    fn test_fill_colors_follow_cell_class() {
        let dict_fmt = derive_default_grid_formats();
        assert_eq!(
            dict_fmt[&EnumCellStyle::Header].bg_color.as_deref(),
            Some(C_COLOR_HEADER_FILL)
        );
        assert_eq!(
            dict_fmt[&EnumCellStyle::DataSafe].bg_color.as_deref(),
            Some(C_COLOR_SAFE_FILL)
        );
        assert_eq!(
            dict_fmt[&EnumCellStyle::DataAlert].bg_color.as_deref(),
            Some(C_COLOR_ALERT_FILL)
        );
        assert_eq!(dict_fmt[&EnumCellStyle::Data].bg_color, None);
        assert_eq!(dict_fmt[&EnumCellStyle::Header].bold, Some(true));
        assert_eq!(dict_fmt[&EnumCellStyle::Data].text_wrap, Some(true));
        assert_eq!(dict_fmt[&EnumCellStyle::Index].text_wrap, None);
    }

    #[test]
    fn test_fail_templates_carry_marker() {
        for style in [EnumHeaderStyle::Plain, EnumHeaderStyle::Stacked] {
            let template = derive_header_template(style);
            assert!(template.fail.to_uppercase().contains(C_FAIL_MARKER));
            assert!(!template.state.to_uppercase().contains(C_FAIL_MARKER));
        }
    }
}
