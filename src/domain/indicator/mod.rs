//! Technical indicators over index-aligned numeric series.
//!
//! A series holds one `Option<f64>` per bar; `None` marks a bar where the
//! value is undefined (warmup window, no predecessor bar). Indicators never
//! fail: undefined inputs propagate to undefined outputs.
//!
//! - `sma`: simple moving average
//! - `ema`: exponential moving average, SMA-seeded
//! - `rsi`: relative strength index over a trailing window
//! - `shift`, `crosses_above`, `crosses_below`: bar-alignment helpers

pub mod ema;
pub mod rsi;
pub mod sma;

pub use ema::calculate_ema;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;

/// Numeric series aligned 1:1 with the bar sequence.
pub type Series = Vec<Option<f64>>;

/// Lift a plain column into a fully defined series.
pub fn defined(values: &[f64]) -> Series {
    values.iter().copied().map(Some).collect()
}

/// Shift a series one bar forward: `out[i] = values[i - 1]`, `out[0]` undefined.
pub fn shift(values: &[Option<f64>]) -> Series {
    if values.is_empty() {
        return Vec::new();
    }
    std::iter::once(None)
        .chain(values[..values.len() - 1].iter().copied())
        .collect()
}

/// True at bar i (i >= 1) iff `a[i-1] <= b[i-1]` and `a[i] > b[i]`.
pub fn crosses_above(a: &[Option<f64>], b: &[Option<f64>]) -> Vec<bool> {
    crossings(a, b, |prev_a, prev_b, cur_a, cur_b| {
        prev_a <= prev_b && cur_a > cur_b
    })
}

/// True at bar i (i >= 1) iff `a[i-1] >= b[i-1]` and `a[i] < b[i]`.
pub fn crosses_below(a: &[Option<f64>], b: &[Option<f64>]) -> Vec<bool> {
    crossings(a, b, |prev_a, prev_b, cur_a, cur_b| {
        prev_a >= prev_b && cur_a < cur_b
    })
}

fn crossings(
    a: &[Option<f64>],
    b: &[Option<f64>],
    crossed: impl Fn(f64, f64, f64, f64) -> bool,
) -> Vec<bool> {
    let len = a.len().min(b.len());
    (0..len)
        .map(|i| {
            if i == 0 {
                return false;
            }
            match (a[i - 1], b[i - 1], a[i], b[i]) {
                (Some(pa), Some(pb), Some(ca), Some(cb)) => crossed(pa, pb, ca, cb),
                _ => false,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn shift_moves_values_forward() {
        assert_eq!(
            shift(&defined(&[1.0, 2.0, 3.0])),
            vec![None, Some(1.0), Some(2.0)]
        );
        assert!(shift(&[]).is_empty());
    }

    #[test]
    fn crosses_above_basic() {
        let a = defined(&[1.0, 2.0, 3.0, 2.0, 4.0]);
        let b = defined(&[2.0, 2.0, 2.0, 2.0, 2.0]);
        assert_eq!(crosses_above(&a, &b), vec![false, false, true, false, true]);
    }

    #[test]
    fn crosses_below_basic() {
        let a = defined(&[3.0, 2.0, 1.0, 3.0, 1.0]);
        let b = defined(&[2.0, 2.0, 2.0, 2.0, 2.0]);
        assert_eq!(crosses_below(&a, &b), vec![false, false, true, false, true]);
    }

    #[test]
    fn crosses_false_when_predecessor_undefined() {
        let a = vec![None, Some(1.0), Some(3.0)];
        let b = defined(&[2.0, 2.0, 2.0]);
        assert_eq!(crosses_above(&a, &b), vec![false, false, true]);

        let a = vec![Some(1.0), None, Some(3.0)];
        assert_eq!(crosses_above(&a, &b), vec![false, false, false]);
    }

    #[test]
    fn crosses_never_when_b_always_greater() {
        let a = defined(&[1.0, 5.0, 2.0, 8.0]);
        let b = defined(&[2.0, 6.0, 3.0, 9.0]);
        assert!(crosses_above(&a, &b).iter().all(|&x| !x));
    }

    proptest! {
        #[test]
        fn crosses_above_matches_definition(
            pairs in proptest::collection::vec((-100.0f64..100.0, -100.0f64..100.0), 0..60)
        ) {
            let a: Series = pairs.iter().map(|p| Some(p.0)).collect();
            let b: Series = pairs.iter().map(|p| Some(p.1)).collect();
            let signal = crosses_above(&a, &b);
            prop_assert_eq!(signal.len(), pairs.len());
            for i in 0..pairs.len() {
                let expected = i >= 1
                    && pairs[i - 1].0 <= pairs[i - 1].1
                    && pairs[i].0 > pairs[i].1;
                prop_assert_eq!(signal[i], expected);
            }
        }

        #[test]
        fn crosses_above_false_when_b_dominates(
            base in proptest::collection::vec(-100.0f64..100.0, 0..60),
            gap in 0.001f64..50.0,
        ) {
            let a = defined(&base);
            let b: Series = base.iter().map(|v| Some(v + gap)).collect();
            prop_assert!(crosses_above(&a, &b).iter().all(|&x| !x));
        }
    }
}
