//! Backtest driver: feeds bars through the strategy one step at a time.
//!
//! Bars dated before `start_date` only warm the indicators. The last stepped
//! bar triggers an end-of-run liquidation of any open position.

use chrono::NaiveDate;

use super::error::SwingError;
use super::indicator::timeline::IndicatorTimeline;
use super::ohlcv::OhlcvBar;
use super::portfolio::Portfolio;
use super::strategy::{Decision, EngineState, StepInput, SwingParams, SwingStrategy};
use super::trade_log::TradeEvent;
use crate::ports::broker_port::BrokerPort;
use crate::ports::event_port::EventPort;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
    pub risk_free_rate: f64,
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub portfolio: Portfolio,
    pub trade_log: Vec<TradeEvent>,
    pub final_state: EngineState,
    pub bars_processed: usize,
}

pub fn run_backtest(
    bars: &[OhlcvBar],
    indicators: &IndicatorTimeline,
    events: &dyn EventPort,
    params: &SwingParams,
    config: &BacktestConfig,
) -> Result<BacktestResult, SwingError> {
    let mut strategy = SwingStrategy::new(params.clone());
    let mut portfolio = Portfolio::new(config.initial_capital);
    let mut trade_log = Vec::new();
    let mut bars_processed = 0;
    let mut last_bar: Option<&OhlcvBar> = None;

    for (i, bar) in bars.iter().enumerate() {
        if bar.date < config.start_date || bar.date > config.end_date {
            continue;
        }

        let snapshot = indicators.snapshot(i);
        let event = events.record_for(last_bar.map(|b| b.date), bar.date);
        let input = StepInput {
            date: bar.date,
            price: bar.close,
            indicators: snapshot.as_ref(),
            event: event.as_ref(),
            available_cash: portfolio.available_cash(),
        };

        if let Some(decision) = strategy.step(&input)? {
            let event = apply_decision(&mut portfolio, &decision).inspect_err(|_| {
                if matches!(decision, Decision::Enter { .. }) {
                    strategy.revert_entry();
                }
            })?;
            trade_log.push(event);
        }

        portfolio.record_equity(bar.date, bar.close);
        bars_processed += 1;
        last_bar = Some(bar);
    }

    if let Some(bar) = last_bar {
        if let Some(decision) = strategy.liquidate(bar.close, bar.date) {
            tracing::info!(date = %bar.date, "end of run, liquidating open position");
            trade_log.push(apply_decision(&mut portfolio, &decision)?);
            if let Some(point) = portfolio.equity_curve.last_mut() {
                point.equity = portfolio.cash;
            }
        }
    }

    Ok(BacktestResult {
        portfolio,
        trade_log,
        final_state: strategy.snapshot(),
        bars_processed,
    })
}

/// Route a decision to the broker and build its log record.
pub fn apply_decision(
    broker: &mut dyn BrokerPort,
    decision: &Decision,
) -> Result<TradeEvent, SwingError> {
    let settled = match decision {
        Decision::Enter {
            date,
            price,
            shares,
            ..
        } => {
            broker.buy(*shares, *price, *date)?;
            None
        }
        Decision::Exit {
            date,
            price,
            intent,
        } => broker.liquidate(*price, *date, Some(intent.reason)),
        Decision::ForcedExit { date, price, .. } => broker.liquidate(*price, *date, None),
    };

    let event = TradeEvent::from_decision(decision, settled.as_ref());
    event.log();
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event_schedule::LaunchSchedule;
    use crate::domain::indicator::timeline::IndicatorParams;
    use crate::domain::trade_log::TradeEventKind;

    fn bars_from(prices: &[f64]) -> Vec<OhlcvBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                code: "RKLB".into(),
                exchange: "NASDAQ".into(),
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    fn config(start: NaiveDate, end: NaiveDate) -> BacktestConfig {
        BacktestConfig {
            start_date: start,
            end_date: end,
            initial_capital: 1000.0,
            risk_free_rate: 0.05,
        }
    }

    #[test]
    fn unready_indicators_never_trade() {
        let bars = bars_from(&[10.0; 20]);
        let timeline = IndicatorTimeline::compute(&bars, &IndicatorParams::default());
        let result = run_backtest(
            &bars,
            &timeline,
            &LaunchSchedule::empty(),
            &SwingParams::default(),
            &config(bars[0].date, bars[19].date),
        )
        .unwrap();

        assert!(result.trade_log.is_empty());
        assert_eq!(result.bars_processed, 20);
        assert_eq!(result.portfolio.equity_curve.len(), 20);
        assert!((result.portfolio.cash - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bars_outside_window_are_not_stepped() {
        let bars = bars_from(&[10.0; 10]);
        let timeline = IndicatorTimeline::compute(&bars, &IndicatorParams::default());
        let result = run_backtest(
            &bars,
            &timeline,
            &LaunchSchedule::empty(),
            &SwingParams::default(),
            &config(bars[3].date, bars[6].date),
        )
        .unwrap();
        assert_eq!(result.bars_processed, 4);
    }

    #[test]
    fn apply_decision_round_trip_through_broker() {
        let mut strategy = SwingStrategy::new(SwingParams::default());
        let mut portfolio = Portfolio::new(1000.0);
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let snapshot = crate::domain::signal::IndicatorSnapshot {
            rsi: 40.0,
            macd: 0.5,
            macd_signal: 0.3,
            macd_histogram: 0.2,
            sma_fast: 11.0,
            sma_slow: 10.0,
            bollinger_lower: 8.0,
            bollinger_middle: 10.0,
            bollinger_upper: 12.0,
        };
        let entry = strategy
            .step(&StepInput {
                date,
                price: 10.0,
                indicators: Some(&snapshot),
                event: None,
                available_cash: portfolio.available_cash(),
            })
            .unwrap()
            .unwrap();
        let event = apply_decision(&mut portfolio, &entry).unwrap();
        assert_eq!(event.event_kind, TradeEventKind::Entry);
        assert_eq!(portfolio.shares_held(), 95);

        let forced = strategy.liquidate(10.5, date.succ_opt().unwrap()).unwrap();
        let event = apply_decision(&mut portfolio, &forced).unwrap();
        assert_eq!(event.event_kind, TradeEventKind::ForcedExit);
        assert!((event.pnl.unwrap() - 47.5).abs() < 1e-9);
        assert!((portfolio.cash - 1047.5).abs() < 1e-9);
    }

    #[test]
    fn full_fraction_entry_is_accepted_by_broker() {
        let params = SwingParams {
            position_fraction: 1.0,
            ..SwingParams::default()
        };
        let mut strategy = SwingStrategy::new(params);
        let mut portfolio = Portfolio::new(1.7);
        let snapshot = crate::domain::signal::IndicatorSnapshot {
            rsi: 40.0,
            macd: 0.5,
            macd_signal: 0.3,
            macd_histogram: 0.2,
            sma_fast: 11.0,
            sma_slow: 10.0,
            bollinger_lower: 8.0,
            bollinger_middle: 10.0,
            bollinger_upper: 12.0,
        };
        let entry = strategy
            .step(&StepInput {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                price: 0.1,
                indicators: Some(&snapshot),
                event: None,
                available_cash: portfolio.available_cash(),
            })
            .unwrap()
            .unwrap();

        let event = apply_decision(&mut portfolio, &entry).unwrap();
        assert_eq!(event.event_kind, TradeEventKind::Entry);
        assert_eq!(portfolio.shares_held(), strategy.position().unwrap().shares);
        assert!(portfolio.cash >= 0.0);
    }

    #[test]
    fn weekend_launch_reaches_the_tracker_on_monday() {
        use crate::domain::event::EventOutcome;
        use crate::domain::event_schedule::Launch;
        use chrono::Datelike;

        let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let bars: Vec<OhlcvBar> = bars_from(&[10.0; 14])
            .into_iter()
            .enumerate()
            .map(|(i, bar)| OhlcvBar {
                date: monday + chrono::Duration::days(i as i64),
                ..bar
            })
            .filter(|bar| bar.date.weekday().number_from_monday() <= 5)
            .collect();
        let schedule = LaunchSchedule::new(
            vec![Launch {
                date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
                mission: "Saturday Mission".into(),
                flight_no: "F9".into(),
                outcome: EventOutcome::Success,
            }],
            5,
            true,
        );

        let timeline = IndicatorTimeline::compute(&bars, &IndicatorParams::default());
        let result = run_backtest(
            &bars,
            &timeline,
            &schedule,
            &SwingParams::default(),
            &config(bars[0].date, bars[bars.len() - 1].date),
        )
        .unwrap();

        // delivered Mon 11th, then Tue..Fri
        let tracker = &result.final_state.tracker;
        assert!(!tracker.upcoming);
        assert_eq!(tracker.last_outcome, Some(EventOutcome::Success));
        assert_eq!(tracker.days_since_event, 4);
    }
}
