//! Simple Moving Average.
//!
//! SMA(n)[i] = mean(values[i-n+1..=i]). Bars before the window is full, and
//! windows containing an undefined value, are undefined.

use super::Series;

pub fn calculate_sma(values: &[Option<f64>], period: usize) -> Series {
    let period = period.max(1);
    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let window = &values[i + 1 - period..=i];
            let sum = window.iter().copied().sum::<Option<f64>>()?;
            Some(sum / period as f64)
        })
        .collect()
}
