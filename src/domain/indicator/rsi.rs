//! RSI (Relative Strength Index) over a trailing window.
//!
//! Changes are taken bar over bar; gains and losses are averaged with a
//! simple mean over the last n changes. Changes are quartered and each term is
//! divided by n before summing so extreme finite inputs cannot overflow; the
//! scaling cancels in the ratio:
//!
//! RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//!
//! - avg_loss == 0 and avg_gain > 0: RSI = 100
//! - avg_loss == 0 and avg_gain == 0 (flat): RSI = 50
//!
//! Warmup: the first n bars are undefined (n changes are needed).

use super::Series;

const NEUTRAL: f64 = 50.0;

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain > 0.0 { 100.0 } else { NEUTRAL }
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}

pub fn calculate_rsi(values: &[Option<f64>], period: usize) -> Series {
    let period = period.max(1);

    let changes: Vec<Option<f64>> = (0..values.len())
        .map(|i| match (i.checked_sub(1).and_then(|p| values[p]), values[i]) {
            (Some(prev), Some(cur)) => Some(cur / 4.0 - prev / 4.0),
            _ => None,
        })
        .collect();

    (0..values.len())
        .map(|i| {
            if i < period {
                return None;
            }
            let window = &changes[i + 1 - period..=i];
            let n = period as f64;
            let mut avg_gain = 0.0;
            let mut avg_loss = 0.0;
            for change in window {
                let c = (*change)?;
                if c > 0.0 {
                    avg_gain += c / n;
                } else {
                    avg_loss -= c / n;
                }
            }
            Some(rsi_from_averages(avg_gain, avg_loss))
        })
        .collect()
}
