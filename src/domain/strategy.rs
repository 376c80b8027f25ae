//! Per-step strategy orchestration.
//!
//! [`SwingStrategy::step`] sequences the components for one bar: advance the
//! event tracker, roll the governor's week, then either manage the open
//! position or look for an entry. It holds no decision logic of its own.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::SwingError;
use super::event::{EventRecord, EventTracker, EventTrackerState};
use super::governor::{DEFAULT_MAX_TRADES_PER_WEEK, TradeGovernor, TradeGovernorState};
use super::position::{ExitIntent, ExitParams, Position, PositionManager};
use super::signal::{self, IndicatorSnapshot, SignalScore};

#[derive(Debug, Clone, PartialEq)]
pub struct SwingParams {
    pub exit: ExitParams,
    pub max_trades_per_week: u32,
    /// Fraction of available cash committed on entry.
    pub position_fraction: f64,
}

impl Default for SwingParams {
    fn default() -> Self {
        SwingParams {
            exit: ExitParams::default(),
            max_trades_per_week: DEFAULT_MAX_TRADES_PER_WEEK,
            position_fraction: 0.95,
        }
    }
}

/// Everything the strategy sees on one step.
#[derive(Debug, Clone)]
pub struct StepInput<'a> {
    pub date: NaiveDate,
    pub price: f64,
    /// `None` while the indicator provider is still warming up.
    pub indicators: Option<&'a IndicatorSnapshot>,
    pub event: Option<&'a EventRecord>,
    pub available_cash: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Enter {
        date: NaiveDate,
        price: f64,
        shares: u64,
        score: SignalScore,
    },
    Exit {
        date: NaiveDate,
        price: f64,
        intent: ExitIntent,
    },
    /// End-of-run liquidation outside the normal exit priority.
    ForcedExit {
        date: NaiveDate,
        price: f64,
        position: Position,
    },
}

/// Serializable engine state, sufficient to suspend and resume a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    pub tracker: EventTrackerState,
    pub governor: TradeGovernorState,
    pub position: Option<Position>,
}

#[derive(Debug, Clone)]
pub struct SwingStrategy {
    params: SwingParams,
    tracker: EventTracker,
    governor: TradeGovernor,
    positions: PositionManager,
}

impl SwingStrategy {
    pub fn new(params: SwingParams) -> Self {
        SwingStrategy {
            tracker: EventTracker::new(),
            governor: TradeGovernor::new(params.max_trades_per_week),
            positions: PositionManager::new(params.exit.clone()),
            params,
        }
    }

    pub fn restore(params: SwingParams, state: EngineState) -> Self {
        SwingStrategy {
            tracker: EventTracker::from_state(state.tracker),
            governor: TradeGovernor::from_state(params.max_trades_per_week, state.governor),
            positions: PositionManager::with_position(params.exit.clone(), state.position),
            params,
        }
    }

    pub fn snapshot(&self) -> EngineState {
        EngineState {
            tracker: self.tracker.state().clone(),
            governor: self.governor.state().clone(),
            position: self.positions.position().cloned(),
        }
    }

    pub fn position(&self) -> Option<&Position> {
        self.positions.position()
    }

    pub fn step(&mut self, input: &StepInput<'_>) -> Result<Option<Decision>, SwingError> {
        self.tracker.advance(input.event);
        self.governor.check_and_reset(input.date);

        if !input.price.is_finite() || input.price <= 0.0 {
            tracing::warn!(date = %input.date, price = input.price, "non-positive price, skipping step");
            return Ok(None);
        }

        if self.positions.is_open() {
            let decision = self
                .positions
                .evaluate_exit(input.price, input.date)
                .map(|intent| Decision::Exit {
                    date: input.date,
                    price: input.price,
                    intent,
                });
            return Ok(decision);
        }

        if !self.governor.can_trade() {
            tracing::debug!(date = %input.date, "weekly trade cap reached, entry suppressed");
            return Ok(None);
        }

        let Some(indicators) = input.indicators else {
            return Ok(None);
        };

        let score = signal::score(input.price, indicators, self.tracker.state());
        if !score.is_entry() {
            return Ok(None);
        }

        let mut shares = (input.available_cash * self.params.position_fraction / input.price).floor();
        // the division can round up to an order one ulp over cash
        if shares * input.price > input.available_cash {
            shares -= 1.0;
        }
        if !shares.is_finite() || shares < 1.0 {
            tracing::debug!(
                date = %input.date,
                cash = input.available_cash,
                price = input.price,
                "signal qualified but cash buys no shares"
            );
            return Ok(None);
        }
        let shares = shares as u64;

        self.positions.open(input.price, input.date, shares)?;
        self.governor.record_trade();

        Ok(Some(Decision::Enter {
            date: input.date,
            price: input.price,
            shares,
            score,
        }))
    }

    /// Undo the entry of the last step after the broker rejected the order.
    pub fn revert_entry(&mut self) {
        if self.positions.force_close().is_some() {
            self.governor.revert_trade();
        }
    }

    pub fn liquidate(&mut self, price: f64, date: NaiveDate) -> Option<Decision> {
        self.positions
            .force_close()
            .map(|position| Decision::ForcedExit {
                date,
                price,
                position,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::{EventKind, EventOutcome};
    use crate::domain::position::ExitReason;

    fn day(offset: i64) -> NaiveDate {
        // Monday
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap() + chrono::Duration::days(offset)
    }

    /// Exactly three predicates hold at price 10: RSI, MACD, SMA trend.
    fn bullish_snapshot() -> IndicatorSnapshot {
        IndicatorSnapshot {
            rsi: 38.0,
            macd: 0.5,
            macd_signal: 0.3,
            macd_histogram: 0.2,
            sma_fast: 11.0,
            sma_slow: 10.0,
            bollinger_lower: 8.0,
            bollinger_middle: 10.0,
            bollinger_upper: 12.0,
        }
    }

    fn neutral_snapshot() -> IndicatorSnapshot {
        IndicatorSnapshot {
            rsi: 60.0,
            macd: -0.1,
            macd_signal: 0.0,
            macd_histogram: -0.1,
            sma_fast: 11.0,
            sma_slow: 12.0,
            bollinger_lower: 8.0,
            bollinger_middle: 10.0,
            bollinger_upper: 12.0,
        }
    }

    fn input<'a>(
        offset: i64,
        price: f64,
        indicators: Option<&'a IndicatorSnapshot>,
        cash: f64,
    ) -> StepInput<'a> {
        StepInput {
            date: day(offset),
            price,
            indicators,
            event: None,
            available_cash: cash,
        }
    }

    #[test]
    fn qualifying_score_enters_with_floor_sizing() {
        let mut strategy = SwingStrategy::new(SwingParams::default());
        let snapshot = bullish_snapshot();

        let decision = strategy
            .step(&input(0, 10.0, Some(&snapshot), 1000.0))
            .unwrap()
            .unwrap();

        match decision {
            Decision::Enter { shares, score, .. } => {
                // floor(1000 * 0.95 / 10) = 95
                assert_eq!(shares, 95);
                assert_eq!(score.value, 3);
            }
            other => panic!("expected entry, got {other:?}"),
        }
        assert_eq!(strategy.position().unwrap().shares, 95);
        assert_eq!(strategy.snapshot().governor.trades_this_week, 1);
    }

    #[test]
    fn below_threshold_takes_no_action() {
        let mut strategy = SwingStrategy::new(SwingParams::default());
        let snapshot = neutral_snapshot();
        let decision = strategy
            .step(&input(0, 10.0, Some(&snapshot), 1000.0))
            .unwrap();
        assert_eq!(decision, None);
        assert_eq!(strategy.snapshot().governor.trades_this_week, 0);
    }

    #[test]
    fn unready_indicators_take_no_action() {
        let mut strategy = SwingStrategy::new(SwingParams::default());
        let decision = strategy.step(&input(0, 10.0, None, 1000.0)).unwrap();
        assert_eq!(decision, None);
    }

    #[test]
    fn insufficient_cash_does_not_count_as_trade() {
        let mut strategy = SwingStrategy::new(SwingParams::default());
        let snapshot = bullish_snapshot();
        let decision = strategy
            .step(&input(0, 10.0, Some(&snapshot), 10.0))
            .unwrap();
        assert_eq!(decision, None);
        assert!(strategy.position().is_none());
        assert_eq!(strategy.snapshot().governor.trades_this_week, 0);
    }

    #[test]
    fn full_fraction_order_fits_in_cash() {
        let params = SwingParams {
            position_fraction: 1.0,
            ..SwingParams::default()
        };
        let mut strategy = SwingStrategy::new(params);
        let snapshot = bullish_snapshot();

        let decision = strategy
            .step(&input(0, 0.1, Some(&snapshot), 1.7))
            .unwrap();
        let Some(Decision::Enter { shares, .. }) = decision else {
            panic!("expected entry, got {decision:?}");
        };
        assert!(shares >= 16);
        assert!(shares as f64 * 0.1 <= 1.7);
    }

    #[test]
    fn nan_cash_or_price_takes_no_action() {
        let snapshot = bullish_snapshot();

        let mut strategy = SwingStrategy::new(SwingParams::default());
        let decision = strategy
            .step(&input(0, 10.0, Some(&snapshot), f64::NAN))
            .unwrap();
        assert_eq!(decision, None);
        assert!(strategy.position().is_none());
        assert_eq!(strategy.snapshot().governor.trades_this_week, 0);

        let mut strategy = SwingStrategy::new(SwingParams::default());
        let decision = strategy
            .step(&input(0, f64::NAN, Some(&snapshot), 1000.0))
            .unwrap();
        assert_eq!(decision, None);
        assert!(strategy.position().is_none());
    }

    #[test]
    fn reverted_entry_restores_flat_state() {
        let mut strategy = SwingStrategy::new(SwingParams::default());
        let snapshot = bullish_snapshot();
        strategy
            .step(&input(0, 10.0, Some(&snapshot), 1000.0))
            .unwrap();
        assert!(strategy.position().is_some());

        strategy.revert_entry();
        assert!(strategy.position().is_none());
        assert_eq!(strategy.snapshot().governor.trades_this_week, 0);
    }

    #[test]
    fn non_positive_price_still_advances_tracker() {
        let mut strategy = SwingStrategy::new(SwingParams::default());
        let event = EventRecord {
            date: day(0),
            kind: EventKind::Occurred {
                outcome: EventOutcome::Success,
                label: "Mission".into(),
            },
        };
        let step = StepInput {
            event: Some(&event),
            ..input(0, 0.0, None, 1000.0)
        };
        assert_eq!(strategy.step(&step).unwrap(), None);
        assert_eq!(strategy.snapshot().tracker.days_since_event, 0);
    }

    #[test]
    fn open_position_delegates_to_exit_evaluation() {
        let mut strategy = SwingStrategy::new(SwingParams::default());
        let snapshot = bullish_snapshot();
        strategy
            .step(&input(0, 10.0, Some(&snapshot), 1000.0))
            .unwrap();

        // Still qualifying, but an open position never produces a second entry.
        let hold = strategy
            .step(&input(1, 10.1, Some(&snapshot), 50.0))
            .unwrap();
        assert_eq!(hold, None);

        let exit = strategy
            .step(&input(2, 9.4, Some(&snapshot), 50.0))
            .unwrap()
            .unwrap();
        match exit {
            Decision::Exit { intent, .. } => {
                assert_eq!(intent.reason, ExitReason::StopLoss);
                assert_eq!(intent.position.shares, 95);
            }
            other => panic!("expected exit, got {other:?}"),
        }
        assert!(strategy.position().is_none());
    }

    #[test]
    fn exit_step_never_reenters() {
        let mut strategy = SwingStrategy::new(SwingParams::default());
        let snapshot = bullish_snapshot();
        strategy
            .step(&input(0, 10.0, Some(&snapshot), 1000.0))
            .unwrap();
        let decision = strategy
            .step(&input(1, 11.0, Some(&snapshot), 1000.0))
            .unwrap();
        assert!(matches!(decision, Some(Decision::Exit { .. })));
        assert!(strategy.position().is_none());
    }

    #[test]
    fn liquidate_closes_open_position() {
        let mut strategy = SwingStrategy::new(SwingParams::default());
        let snapshot = bullish_snapshot();
        strategy
            .step(&input(0, 10.0, Some(&snapshot), 1000.0))
            .unwrap();

        let forced = strategy.liquidate(10.2, day(1)).unwrap();
        assert!(matches!(forced, Decision::ForcedExit { .. }));
        assert!(strategy.liquidate(10.2, day(1)).is_none());
    }

    #[test]
    fn weekly_cap_suppresses_sixth_entry() {
        let mut strategy = SwingStrategy::new(SwingParams::default());
        let snapshot = bullish_snapshot();
        let mut entries = 0;
        let mut suppressed = 0;

        for _ in 0..6 {
            match strategy
                .step(&input(1, 10.0, Some(&snapshot), 1000.0))
                .unwrap()
            {
                Some(Decision::Enter { .. }) => {
                    entries += 1;
                    strategy.liquidate(10.0, day(1));
                }
                None => suppressed += 1,
                Some(other) => panic!("unexpected {other:?}"),
            }
        }

        assert_eq!(entries, 5);
        assert_eq!(suppressed, 1);

        // Next ISO week resets the counter before evaluation.
        let decision = strategy
            .step(&input(7, 10.0, Some(&snapshot), 1000.0))
            .unwrap();
        assert!(matches!(decision, Some(Decision::Enter { .. })));
        assert_eq!(strategy.snapshot().governor.trades_this_week, 1);
    }

    #[test]
    fn restore_resumes_identically() {
        let params = SwingParams::default();
        let snapshot = bullish_snapshot();
        let prices = [10.0, 10.3, 10.7, 10.2, 9.0, 10.0, 10.4];

        let mut uninterrupted = SwingStrategy::new(params.clone());
        let mut expected = Vec::new();
        for (i, &price) in prices.iter().enumerate() {
            expected.push(
                uninterrupted
                    .step(&input(i as i64, price, Some(&snapshot), 1000.0))
                    .unwrap(),
            );
        }

        let mut first = SwingStrategy::new(params.clone());
        let mut actual = Vec::new();
        for (i, &price) in prices.iter().enumerate().take(2) {
            actual.push(
                first
                    .step(&input(i as i64, price, Some(&snapshot), 1000.0))
                    .unwrap(),
            );
        }
        let mut resumed = SwingStrategy::restore(params, first.snapshot());
        for (i, &price) in prices.iter().enumerate().skip(2) {
            actual.push(
                resumed
                    .step(&input(i as i64, price, Some(&snapshot), 1000.0))
                    .unwrap(),
            );
        }

        assert_eq!(actual, expected);
    }
}
