use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use sensorkit_table::{
    EnumHeaderStyle, EnumRunOutcome, GridWriter, SpecFaultLabels, SpecRenderOptions, SpecSensor,
    SpecTableConfig, StaticProvider, TableError, assemble_table, derive_default_grid_formats,
    derive_header_template, generate_sensor_table, render_grid, run_with_provider,
    validate_sensor_count,
};

struct TestDir {
    path: PathBuf,
}

impl TestDir {
    fn new(tag: &str) -> Self {
        let n = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("sensorkit_table_{tag}_{n}"));
        std::fs::create_dir_all(&path).expect("create test dir");
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

fn read_zip_entry(path: &Path, name: &str) -> String {
    let file = std::fs::File::open(path).expect("open workbook");
    let mut archive = zip::ZipArchive::new(file).expect("workbook is a zip archive");
    let mut entry = archive.by_name(name).expect("zip entry");
    let mut text = String::new();
    entry.read_to_string(&mut text).expect("read zip entry");
    text
}

/// Value of `cell_ref` in a worksheet XML, read from its `<v>` element.
fn read_cell_value(sheet_xml: &str, cell_ref: &str) -> Option<String> {
    let n_pos_cell = sheet_xml.find(&format!(r#"<c r="{cell_ref}""#))?;
    let c_rest = &sheet_xml[n_pos_cell..];
    let n_pos_end = c_rest.find("</c>")?;
    let c_cell = &c_rest[..n_pos_end];
    let n_pos_value = c_cell.find("<v>")? + "<v>".len();
    let n_len_value = c_cell[n_pos_value..].find("</v>")?;
    Some(c_cell[n_pos_value..n_pos_value + n_len_value].to_string())
}

fn config_ab(style: EnumHeaderStyle) -> SpecTableConfig {
    SpecTableConfig::new(
        vec![
            SpecSensor::new("A", "UP", "DOWN").expect("sensor"),
            SpecSensor::new("B", "CLOSED", "OPEN").expect("sensor"),
        ],
        SpecFaultLabels::new("OK", "FAULT").expect("labels"),
        derive_header_template(style),
    )
    .expect("config")
}

#[test]
fn generate_two_sensor_workbook() {
    let tmp = TestDir::new("two_sensors");
    let path_out = tmp.path().join("table.xlsx");

    let report = generate_sensor_table(
        &config_ab(EnumHeaderStyle::Plain),
        &path_out,
        &SpecRenderOptions::default(),
        "Sheet1",
    )
    .expect("generate");

    assert!(path_out.exists());
    assert_eq!(report.n_rows_data, 16);
    assert_eq!(report.n_cols_grid, 7);
    assert!(report.if_band);
    assert_eq!(report.sheets.len(), 1);
    assert_eq!(report.sheets[0].sheet_name, "Sheet1");
    assert!(report.warnings.is_empty());

    let c_strings = read_zip_entry(&path_out, "xl/sharedStrings.xml");
    for c_expected in ["0=UP", "1=OPEN", "1=FAULT", "Sensor Fail", "SENSOR 2 FAIL"] {
        assert!(c_strings.contains(c_expected), "missing {c_expected}");
    }

    let c_sheet = read_zip_entry(&path_out, "xl/worksheets/sheet1.xml");
    assert!(c_sheet.contains(r#"ref="B1:C1""#));
    assert!(c_sheet.contains(r#"ref="D1:E1""#));
    assert!(c_sheet.contains(r#"topLeftCell="B3""#));
}

#[test]
fn generate_single_sensor_without_band_merges() {
    let tmp = TestDir::new("one_sensor");
    let path_out = tmp.path().join("one.xlsx");
    let config = SpecTableConfig::new(
        vec![SpecSensor::new("door", "shut", "ajar").expect("sensor")],
        SpecFaultLabels::new("Healthy", "Broken").expect("labels"),
        derive_header_template(EnumHeaderStyle::Stacked),
    )
    .expect("config");

    let report = generate_sensor_table(
        &config,
        &path_out,
        &SpecRenderOptions {
            group_title_text: Some("Downlock".to_string()),
            ..Default::default()
        },
        "Sheet1",
    )
    .expect("generate");

    assert_eq!(report.n_rows_data, 4);
    assert_eq!(report.n_cols_grid, 5);
    assert!(report.if_band);

    let c_strings = read_zip_entry(&path_out, "xl/sharedStrings.xml");
    assert!(c_strings.contains("0=SHUT"));
    assert!(c_strings.contains("1=Broken"));
    assert!(c_strings.contains("Downlock"));

    let c_sheet = read_zip_entry(&path_out, "xl/worksheets/sheet1.xml");
    assert!(!c_sheet.contains("<mergeCell "));
}

#[test]
fn split_sheets_repeat_band_and_header_and_keep_counting() {
    let tmp = TestDir::new("split");
    let path_out = tmp.path().join("split.xlsx");

    let table = assemble_table(&config_ab(EnumHeaderStyle::Plain)).expect("table");
    let grid = render_grid(&table, &SpecRenderOptions::default()).expect("grid");
    let mut writer = GridWriter::new(path_out.clone(), &derive_default_grid_formats())
        .with_rows_sheet_max(10);
    let report = writer.write_grid(&grid, "Sheet1").expect("write");
    writer.close().expect("close");

    assert_eq!(report.sheets.len(), 2);
    assert_eq!(report.sheets[0].sheet_name, "Sheet1_1");
    assert_eq!(report.sheets[0].row_end_exclusive, 8);
    assert_eq!(report.sheets[1].sheet_name, "Sheet1_2");
    assert_eq!(report.sheets[1].row_start_inclusive, 8);
    assert_eq!(report.sheets[1].row_end_exclusive, 16);
    assert_eq!(report.warnings.len(), 1);

    let c_workbook = read_zip_entry(&path_out, "xl/workbook.xml");
    assert!(c_workbook.contains(r#"name="Sheet1_1""#));
    assert!(c_workbook.contains(r#"name="Sheet1_2""#));

    let c_sheet1 = read_zip_entry(&path_out, "xl/worksheets/sheet1.xml");
    assert_eq!(read_cell_value(&c_sheet1, "A3").as_deref(), Some("0"));
    assert_eq!(read_cell_value(&c_sheet1, "A10").as_deref(), Some("7"));
    assert!(!c_sheet1.contains(r#"<c r="A11""#));

    let c_sheet2 = read_zip_entry(&path_out, "xl/worksheets/sheet2.xml");
    assert!(c_sheet2.contains(r#"ref="B1:C1""#));
    assert!(c_sheet2.contains(r#"ref="D1:E1""#));
    assert_eq!(
        read_cell_value(&c_sheet1, "B2"),
        read_cell_value(&c_sheet2, "B2")
    );
    assert!(read_cell_value(&c_sheet2, "G2").is_some());
    assert_eq!(read_cell_value(&c_sheet2, "A3").as_deref(), Some("8"));
    assert_eq!(read_cell_value(&c_sheet2, "A10").as_deref(), Some("15"));
    assert!(c_sheet2.contains(r#"topLeftCell="B3""#));
}

#[test]
fn invalid_sensor_count_writes_nothing() {
    let tmp = TestDir::new("invalid");
    let path_out = tmp.path().join("never.xlsx");

    let err = validate_sensor_count(0).expect_err("zero sensors");
    assert!(matches!(err, TableError::InvalidInput(_)));

    let err = SpecTableConfig::new(
        Vec::new(),
        SpecFaultLabels::new("OK", "FAULT").expect("labels"),
        derive_header_template(EnumHeaderStyle::Plain),
    )
    .expect_err("no sensors");
    assert!(matches!(err, TableError::InvalidInput(_)));
    assert!(!path_out.exists());
}

#[test]
fn unwritable_path_reports_output_write() {
    let tmp = TestDir::new("unwritable");
    let path_out = tmp.path().join("missing_dir").join("table.xlsx");

    let err = generate_sensor_table(
        &config_ab(EnumHeaderStyle::Plain),
        &path_out,
        &SpecRenderOptions::default(),
        "Sheet1",
    )
    .expect_err("parent directory does not exist");

    match err {
        TableError::OutputWrite { path, .. } => assert_eq!(path, path_out),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!path_out.exists());
}

#[test]
fn cancelled_provider_writes_nothing() {
    let tmp = TestDir::new("cancel");
    let path_out = tmp.path().join("cancel.xlsx");

    let outcome = run_with_provider(
        &mut StaticProvider::cancelled(),
        &path_out,
        &SpecRenderOptions::default(),
        "Sheet1",
    )
    .expect("cancel is not an error");

    assert_eq!(outcome, EnumRunOutcome::Cancelled);
    assert!(!path_out.exists());
}

#[test]
fn ready_provider_writes_workbook() {
    let tmp = TestDir::new("ready");
    let path_out = tmp.path().join("ready.xlsx");

    let outcome = run_with_provider(
        &mut StaticProvider::ready(config_ab(EnumHeaderStyle::Stacked)),
        &path_out,
        &SpecRenderOptions::default(),
        "Validation",
    )
    .expect("run");

    let EnumRunOutcome::Written(report) = outcome else {
        panic!("expected a written workbook");
    };
    assert_eq!(report.sheets[0].sheet_name, "Validation");
    assert!(path_out.exists());

    let c_strings = read_zip_entry(&path_out, "xl/sharedStrings.xml");
    assert!(c_strings.contains("MCU2"));
}
