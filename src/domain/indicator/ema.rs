//! Exponential Moving Average.
//!
//! k = 2/(n+1), seeded with the SMA of the first n defined values, then
//! EMA[i] = V[i]*k + EMA[i-1]*(1-k). An undefined input resets the seed.

use super::Series;

pub fn calculate_ema(values: &[Option<f64>], period: usize) -> Series {
    let period = period.max(1);
    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut ema: Option<f64> = None;
    let mut seed_sum = 0.0;
    let mut seed_count = 0usize;

    for value in values {
        let Some(v) = *value else {
            ema = None;
            seed_sum = 0.0;
            seed_count = 0;
            out.push(None);
            continue;
        };

        ema = match ema {
            Some(prev) => Some(v * k + prev * (1.0 - k)),
            None => {
                seed_sum += v;
                seed_count += 1;
                (seed_count == period).then(|| seed_sum / period as f64)
            }
        };
        out.push(ema);
    }

    out
}
