//! Bollinger Bands.
//!
//! - Middle: SMA over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! StdDev is population standard deviation (divides by N, not N-1).
//! Warmup: first (period-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_bollinger(
    bars: &[OhlcvBar],
    period: usize,
    stddev_mult: f64,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Bollinger {
        period,
        stddev_mult,
    };
    let empty = IndicatorValue::Bollinger {
        upper: 0.0,
        middle: 0.0,
        lower: 0.0,
    };

    if period == 0 {
        return IndicatorSeries::invalid(indicator_type, bars.iter().map(|b| b.date), empty);
    }

    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        if i + 1 < period {
            values.push(IndicatorPoint {
                date: bar.date,
                valid: false,
                value: empty,
            });
            continue;
        }

        let window = &bars[i + 1 - period..=i];
        let middle = window.iter().map(|b| b.close).sum::<f64>() / period as f64;
        let variance = window
            .iter()
            .map(|b| {
                let diff = b.close - middle;
                diff * diff
            })
            .sum::<f64>()
            / period as f64;
        let stddev = variance.sqrt();

        values.push(IndicatorPoint {
            date: bar.date,
            valid: true,
            value: IndicatorValue::Bollinger {
                upper: middle + stddev_mult * stddev,
                middle,
                lower: middle - stddev_mult * stddev,
            },
        });
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}
