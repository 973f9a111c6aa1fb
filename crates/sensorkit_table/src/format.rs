//! Row formatter: bit tuples to annotated `"<bit>=<label>"` cells.

use crate::conf::N_STATUS_COLS;
use crate::enumerate::BitTuple;
use crate::error::{Result, TableError};
use crate::spec::{SpecFaultLabels, SpecSensor};

/// Annotated cells of one combination, state block before fail block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecFormattedRow {
    /// One cell per sensor-state bit, sensor order.
    pub cells_state: Vec<String>,
    /// One cell per fail-state bit, sensor order.
    pub cells_fail: Vec<String>,
}

impl SpecFormattedRow {
    /// Flatten into table cells, appending the blank status cells.
    pub fn into_table_cells(self) -> Vec<String> {
        let mut l_cells = self.cells_state;
        l_cells.extend(self.cells_fail);
        l_cells.extend(std::iter::repeat_n(String::new(), N_STATUS_COLS));
        l_cells
    }
}

/// Render one annotated cell.
pub fn format_cell(bit: u8, label: &str) -> String {
    format!("{bit}={label}")
}

/// Format one tuple against the sensors and shared fail labels.
///
/// The interleaved tuple is deinterleaved first, so the output reorders bits:
/// all state cells, then all fail cells.
pub fn format_row(
    tuple: &BitTuple,
    sensors: &[SpecSensor],
    fault_labels: &SpecFaultLabels,
) -> Result<SpecFormattedRow> {
    if tuple.len() != 2 * sensors.len() {
        return Err(TableError::InvalidInput(format!(
            "tuple length {} does not match 2 x {} sensors.",
            tuple.len(),
            sensors.len()
        )));
    }
    validate_labels(sensors, fault_labels)?;

    let (l_bits_state, l_bits_fail) = tuple.deinterleave();
    let cells_state = l_bits_state
        .iter()
        .zip(sensors)
        .map(|(bit, sensor)| format_cell(*bit, sensor.label_for(*bit)))
        .collect();
    let cells_fail = l_bits_fail
        .iter()
        .map(|bit| format_cell(*bit, fault_labels.label_for(*bit)))
        .collect();

    Ok(SpecFormattedRow {
        cells_state,
        cells_fail,
    })
}

fn validate_labels(sensors: &[SpecSensor], fault_labels: &SpecFaultLabels) -> Result<()> {
    for sensor in sensors {
        if sensor.state0_label.is_empty() || sensor.state1_label.is_empty() {
            return Err(TableError::InvalidInput(format!(
                "sensor {} has an empty state label.",
                sensor.name
            )));
        }
    }
    if fault_labels.fail0_label.is_empty() || fault_labels.fail1_label.is_empty() {
        return Err(TableError::InvalidInput(
            "fail labels must not be empty.".to_string(),
        ));
    }
    Ok(())
}

/// Split an annotated cell into its bit and label.
pub fn decode_formatted_cell(cell: &str) -> Result<(u8, &str)> {
    let Some((c_bit, c_label)) = cell.split_once('=') else {
        return Err(TableError::InvalidInput(format!(
            "cell {cell:?} is not of the form <bit>=<label>."
        )));
    };
    match c_bit {
        "0" => Ok((0, c_label)),
        "1" => Ok((1, c_label)),
        _ => Err(TableError::InvalidInput(format!(
            "cell {cell:?} does not start with a binary digit."
        ))),
    }
}

/// Recover the interleaved tuple from a formatted row.
pub fn decode_formatted_row(row: &SpecFormattedRow) -> Result<BitTuple> {
    let l_bits_state = row
        .cells_state
        .iter()
        .map(|cell| decode_formatted_cell(cell).map(|(bit, _)| bit))
        .collect::<Result<Vec<_>>>()?;
    let l_bits_fail = row
        .cells_fail
        .iter()
        .map(|cell| decode_formatted_cell(cell).map(|(bit, _)| bit))
        .collect::<Result<Vec<_>>>()?;
    BitTuple::interleave(&l_bits_state, &l_bits_fail)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensors_ab() -> (Vec<SpecSensor>, SpecFaultLabels) {
        (
            vec![
                SpecSensor::new("A", "UP", "DOWN").expect("sensor"),
                SpecSensor::new("B", "CLOSED", "OPEN").expect("sensor"),
            ],
            SpecFaultLabels::new("OK", "FAULT").expect("labels"),
        )
    }

    #[test]
    fn test_format_row_all_zero_and_all_one() {
        let (l_sensors, labels) = sensors_ab();

        let row = format_row(&BitTuple::from_index(0, 4), &l_sensors, &labels).expect("row");
        assert_eq!(row.cells_state, vec!["0=UP", "0=CLOSED"]);
        assert_eq!(row.cells_fail, vec!["0=OK", "0=OK"]);

        let row = format_row(&BitTuple::from_index(15, 4), &l_sensors, &labels).expect("row");
        assert_eq!(row.cells_state, vec!["1=DOWN", "1=OPEN"]);
        assert_eq!(row.cells_fail, vec!["1=FAULT", "1=FAULT"]);
    }

    #[test]
    fn test_format_row_reorders_interleaved_bits() {
        let (l_sensors, labels) = sensors_ab();
        // [sA, fA, sB, fB] = [1, 0, 0, 1]
        let tuple = BitTuple::from_bits(vec![1, 0, 0, 1]).expect("tuple");
        let row = format_row(&tuple, &l_sensors, &labels).expect("row");
        assert_eq!(row.cells_state, vec!["1=DOWN", "0=CLOSED"]);
        assert_eq!(row.cells_fail, vec!["0=OK", "1=FAULT"]);
        assert_eq!(
            row.into_table_cells(),
            vec!["1=DOWN", "0=CLOSED", "0=OK", "1=FAULT", "", ""]
        );
    }

    #[test]
    fn test_format_row_rejects_length_mismatch() {
        let (l_sensors, labels) = sensors_ab();
        let tuple = BitTuple::from_index(0, 2);
        assert!(matches!(
            format_row(&tuple, &l_sensors, &labels),
            Err(TableError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_format_row_rejects_empty_label() {
        let (mut l_sensors, labels) = sensors_ab();
        l_sensors[1].state1_label.clear();
        assert!(matches!(
            format_row(&BitTuple::from_index(0, 4), &l_sensors, &labels),
            Err(TableError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_decode_round_trip() {
        let (l_sensors, labels) = sensors_ab();
        let tuple = BitTuple::from_index(9, 4);
        let row = format_row(&tuple, &l_sensors, &labels).expect("row");
        assert_eq!(decode_formatted_row(&row).expect("decode"), tuple);
    }

    #[test]
    fn test_decode_cell_keeps_label_with_equals_sign() {
        assert_eq!(decode_formatted_cell("1=A=B").expect("cell"), (1, "A=B"));
        assert!(decode_formatted_cell("2=X").is_err());
        assert!(decode_formatted_cell("plain").is_err());
    }
}
