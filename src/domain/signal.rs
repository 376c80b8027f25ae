//! Composite entry signal scoring.
//!
//! Seven independent predicates, one point each. The score is the count of
//! satisfied predicates; reasons are listed in evaluation order.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::event::{EventOutcome, EventTrackerState};

/// Minimum score that makes a flat strategy eligible to enter.
pub const ENTRY_THRESHOLD: u8 = 3;
pub const MAX_SCORE: u8 = 7;

const RSI_RECOVERY_LOW: f64 = 30.0;
const RSI_RECOVERY_HIGH: f64 = 45.0;
const LOWER_BAND_PROXIMITY: f64 = 1.02;
const EVENT_WINDOW_MIN_DAYS: u32 = 1;
const EVENT_WINDOW_MAX_DAYS: u32 = 5;
const POST_EVENT_MAX_DAYS: u32 = 3;

/// Indicator values for one step. Immutable for the duration of that step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub sma_fast: f64,
    pub sma_slow: f64,
    pub bollinger_lower: f64,
    pub bollinger_middle: f64,
    pub bollinger_upper: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SignalReason {
    OversoldRecovery { rsi: f64 },
    MacdBullish { histogram: f64 },
    SmaUptrend { fast: f64, slow: f64 },
    PriceAboveFastSma,
    NearLowerBand,
    EventImminent { days_to_event: u32 },
    PostEventMomentum { days_since_event: u32 },
}

impl SignalReason {
    pub fn id(&self) -> &'static str {
        match self {
            SignalReason::OversoldRecovery { .. } => "oversold_recovery",
            SignalReason::MacdBullish { .. } => "macd_bullish",
            SignalReason::SmaUptrend { .. } => "sma_uptrend",
            SignalReason::PriceAboveFastSma => "price_above_fast_sma",
            SignalReason::NearLowerBand => "near_lower_band",
            SignalReason::EventImminent { .. } => "event_imminent",
            SignalReason::PostEventMomentum { .. } => "post_event_momentum",
        }
    }
}

impl fmt::Display for SignalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalReason::OversoldRecovery { rsi } => {
                write!(f, "RSI oversold recovery ({:.1})", rsi)
            }
            SignalReason::MacdBullish { histogram } => write!(f, "MACD bullish ({:.4})", histogram),
            SignalReason::SmaUptrend { fast, slow } => {
                write!(f, "SMA uptrend (fast: {:.2} > slow: {:.2})", fast, slow)
            }
            SignalReason::PriceAboveFastSma => write!(f, "Price above fast SMA"),
            SignalReason::NearLowerBand => write!(f, "Near Bollinger lower band"),
            SignalReason::EventImminent { days_to_event } => {
                write!(f, "Event in {} days", days_to_event)
            }
            SignalReason::PostEventMomentum { days_since_event } => {
                write!(f, "Post-event momentum ({}d ago)", days_since_event)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignalScore {
    pub value: u8,
    pub reasons: Vec<SignalReason>,
}

impl SignalScore {
    pub fn is_entry(&self) -> bool {
        self.value >= ENTRY_THRESHOLD
    }

    pub fn reason_strings(&self) -> Vec<String> {
        self.reasons.iter().map(ToString::to_string).collect()
    }
}

pub fn score(
    price: f64,
    indicators: &IndicatorSnapshot,
    tracker: &EventTrackerState,
) -> SignalScore {
    let candidates = [
        (indicators.rsi > RSI_RECOVERY_LOW && indicators.rsi < RSI_RECOVERY_HIGH).then_some(
            SignalReason::OversoldRecovery {
                rsi: indicators.rsi,
            },
        ),
        (indicators.macd > indicators.macd_signal && indicators.macd_histogram > 0.0).then_some(
            SignalReason::MacdBullish {
                histogram: indicators.macd_histogram,
            },
        ),
        (indicators.sma_fast > indicators.sma_slow).then_some(SignalReason::SmaUptrend {
            fast: indicators.sma_fast,
            slow: indicators.sma_slow,
        }),
        (price > indicators.sma_fast).then_some(SignalReason::PriceAboveFastSma),
        (price < indicators.bollinger_lower * LOWER_BAND_PROXIMITY)
            .then_some(SignalReason::NearLowerBand),
        (tracker.upcoming
            && (EVENT_WINDOW_MIN_DAYS..=EVENT_WINDOW_MAX_DAYS).contains(&tracker.days_to_event))
        .then_some(SignalReason::EventImminent {
            days_to_event: tracker.days_to_event,
        }),
        (tracker.days_since_event <= POST_EVENT_MAX_DAYS
            && tracker.last_outcome == Some(EventOutcome::Success))
        .then_some(SignalReason::PostEventMomentum {
            days_since_event: tracker.days_since_event,
        }),
    ];

    let reasons: Vec<SignalReason> = candidates.into_iter().flatten().collect();

    SignalScore {
        value: reasons.len() as u8,
        reasons,
    }
}
