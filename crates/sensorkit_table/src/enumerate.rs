//! Combination enumerator over interleaved sensor/fail bits.
//!
//! Position convention of a [`BitTuple`]: even positions hold sensor-state
//! bits, odd positions hold fail-state bits, paired per sensor in declaration
//! order (`[s0, f0, s1, f1, ...]`).

use tracing::warn;

use crate::conf::{N_SENSORS_MAX, N_SENSORS_WARN};
use crate::error::{Result, TableError};

/// One enumerated combination of `2 × sensor_count` bits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitTuple {
    idx: u64,
    bits: Vec<u8>,
}

impl BitTuple {
    /// Binary expansion of `idx` over `n_bits` positions, most-significant bit first.
    pub fn from_index(idx: u64, n_bits: usize) -> Self {
        let bits = (0..n_bits)
            .map(|pos| ((idx >> (n_bits - 1 - pos)) & 1) as u8)
            .collect();
        Self { idx, bits }
    }

    /// Build from raw bits; every bit must be `0` or `1`.
    pub fn from_bits(bits: Vec<u8>) -> Result<Self> {
        if bits.len() > 64 {
            return Err(TableError::InvalidInput(format!(
                "bit tuple of length {} does not fit a 64-bit index.",
                bits.len()
            )));
        }
        let mut idx = 0u64;
        for bit in &bits {
            if *bit > 1 {
                return Err(TableError::InvalidInput(format!(
                    "bit value {bit} is not binary."
                )));
            }
            idx = (idx << 1) | u64::from(*bit);
        }
        Ok(Self { idx, bits })
    }

    /// 0-based position in counting order.
    pub fn index(&self) -> u64 {
        self.idx
    }

    /// Raw interleaved bits.
    pub fn bits(&self) -> &[u8] {
        &self.bits
    }

    /// Tuple length (`2 × sensor_count`).
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// True for a zero-length tuple.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Split into `(sensor_state_bits, fail_state_bits)` by even/odd position.
    pub fn deinterleave(&self) -> (Vec<u8>, Vec<u8>) {
        let l_bits_state = self.bits.iter().step_by(2).copied().collect();
        let l_bits_fail = self.bits.iter().skip(1).step_by(2).copied().collect();
        (l_bits_state, l_bits_fail)
    }

    /// Inverse of [`Self::deinterleave`].
    pub fn interleave(bits_state: &[u8], bits_fail: &[u8]) -> Result<Self> {
        if bits_state.len() != bits_fail.len() {
            return Err(TableError::InvalidInput(format!(
                "state/fail bit counts differ: {} vs {}.",
                bits_state.len(),
                bits_fail.len()
            )));
        }
        let bits = bits_state
            .iter()
            .zip(bits_fail)
            .flat_map(|(bit_state, bit_fail)| [*bit_state, *bit_fail])
            .collect();
        Self::from_bits(bits)
    }
}

/// Lazy counting-order iterator over all tuples for a sensor count.
#[derive(Debug, Clone)]
pub struct BitTupleIter {
    n_bits: usize,
    idx_next: u64,
    n_total: u64,
}

impl Iterator for BitTupleIter {
    type Item = BitTuple;

    fn next(&mut self) -> Option<Self::Item> {
        if self.idx_next >= self.n_total {
            return None;
        }
        let tuple = BitTuple::from_index(self.idx_next, self.n_bits);
        self.idx_next += 1;
        Some(tuple)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n_left = usize::try_from(self.n_total - self.idx_next).unwrap_or(usize::MAX);
        (n_left, Some(n_left))
    }
}

impl ExactSizeIterator for BitTupleIter {}

/// Parse a sensor count typed by a user; rejects non-integers and values `<= 0`.
pub fn parse_sensor_count(text: &str) -> Result<usize> {
    let n_count = text.trim().parse::<i64>().map_err(|_| {
        TableError::InvalidInput(format!("sensor count {text:?} is not an integer."))
    })?;
    validate_sensor_count(n_count)
}

/// Check a signed sensor count and convert it to `usize`.
pub fn validate_sensor_count(n_count: i64) -> Result<usize> {
    if n_count <= 0 {
        return Err(TableError::InvalidInput(format!(
            "sensor count must be >= 1, got {n_count}."
        )));
    }
    let n_count = usize::try_from(n_count).map_err(|_| {
        TableError::InvalidInput(format!("sensor count {n_count} is out of range."))
    })?;
    if n_count > N_SENSORS_MAX {
        return Err(TableError::InvalidInput(format!(
            "sensor count {n_count} exceeds the supported maximum of {N_SENSORS_MAX}."
        )));
    }
    Ok(n_count)
}

/// Number of combinations for `sensor_count` sensors: `2^(2 × sensor_count)`.
pub fn count_combinations(sensor_count: usize) -> Result<u64> {
    let n_count = validate_sensor_count(i64::try_from(sensor_count).unwrap_or(i64::MAX))?;
    Ok(1u64 << (2 * n_count))
}

/// Iterate every tuple for `sensor_count` sensors in binary counting order.
pub fn iter_bit_tuples(sensor_count: usize) -> Result<BitTupleIter> {
    let n_total = count_combinations(sensor_count)?;
    if sensor_count > N_SENSORS_WARN {
        warn!(
            sensor_count,
            n_total, "large sensor count: combination table grows as 4^n"
        );
    }
    Ok(BitTupleIter {
        n_bits: 2 * sensor_count,
        idx_next: 0,
        n_total,
    })
}

/// Materialize every tuple for `sensor_count` sensors.
pub fn enumerate_bit_tuples(sensor_count: usize) -> Result<Vec<BitTuple>> {
    Ok(iter_bit_tuples(sensor_count)?.collect())
}
