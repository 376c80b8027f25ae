//! CSV report adapter implementing ReportPort.
//!
//! Writes one row per trade event to the output path, and a key/value
//! metrics summary next to it as `<stem>_metrics.csv`.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::SwingError;
use crate::domain::metrics::Metrics;
use crate::domain::trade_log::{TradeEvent, TradeEventKind};
use crate::ports::report_port::ReportPort;

pub struct CsvReportAdapter;

#[derive(Debug, Serialize)]
struct TradeRow<'a> {
    event: TradeEventKind,
    date: NaiveDate,
    price: f64,
    shares: u64,
    signal_score: Option<u8>,
    reasons: String,
    exit_reason: &'a str,
    pnl_pct: Option<f64>,
    pnl: Option<f64>,
    days_held: Option<i64>,
}

impl<'a> From<&'a TradeEvent> for TradeRow<'a> {
    fn from(event: &'a TradeEvent) -> Self {
        let exit_reason = match (event.event_kind, event.exit_reason) {
            (_, Some(reason)) => reason.code(),
            (TradeEventKind::ForcedExit, None) => "END_OF_RUN",
            _ => "",
        };
        TradeRow {
            event: event.event_kind,
            date: event.date,
            price: event.price,
            shares: event.shares,
            signal_score: event.signal_score,
            reasons: event.reasons.as_deref().unwrap_or_default().join(" | "),
            exit_reason,
            pnl_pct: event.pnl_pct,
            pnl: event.pnl,
            days_held: event.days_held,
        }
    }
}

fn report_err(path: &Path, e: impl std::fmt::Display) -> SwingError {
    SwingError::Report {
        reason: format!("failed to write {}: {}", path.display(), e),
    }
}

/// Sibling path for the metrics summary, e.g. `out/trades.csv` -> `out/trades_metrics.csv`.
pub fn metrics_path(output_path: &Path) -> PathBuf {
    let stem = output_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    output_path.with_file_name(format!("{}_metrics.csv", stem))
}

impl CsvReportAdapter {
    fn write_trades(&self, trades: &[TradeEvent], path: &Path) -> Result<(), SwingError> {
        let mut writer = csv::Writer::from_path(path).map_err(|e| report_err(path, e))?;
        for event in trades {
            writer
                .serialize(TradeRow::from(event))
                .map_err(|e| report_err(path, e))?;
        }
        writer.flush().map_err(|e| report_err(path, e))
    }

    fn write_metrics(
        &self,
        result: &BacktestResult,
        metrics: &Metrics,
        path: &Path,
    ) -> Result<(), SwingError> {
        let mut writer = csv::Writer::from_path(path).map_err(|e| report_err(path, e))?;
        let mut rows: Vec<(String, String)> = vec![
            ("bars_processed".into(), result.bars_processed.to_string()),
            ("initial_capital".into(), format!("{:.2}", result.portfolio.initial_capital)),
            ("final_equity".into(), format!("{:.2}", metrics.final_equity)),
            ("total_return".into(), format!("{:.6}", metrics.total_return)),
            ("annualized_return".into(), format!("{:.6}", metrics.annualized_return)),
            ("sharpe_ratio".into(), format!("{:.4}", metrics.sharpe_ratio)),
            ("sortino_ratio".into(), format!("{:.4}", metrics.sortino_ratio)),
            ("max_drawdown".into(), format!("{:.6}", metrics.max_drawdown)),
            ("max_drawdown_duration".into(), metrics.max_drawdown_duration.to_string()),
            ("total_trades".into(), metrics.total_trades.to_string()),
            ("win_rate".into(), format!("{:.4}", metrics.win_rate)),
            ("profit_factor".into(), format!("{:.4}", metrics.profit_factor)),
            ("avg_win".into(), format!("{:.2}", metrics.avg_win)),
            ("avg_loss".into(), format!("{:.2}", metrics.avg_loss)),
            ("avg_days_held".into(), format!("{:.2}", metrics.avg_days_held)),
        ];
        rows.extend(
            metrics
                .exits_by_reason
                .iter()
                .map(|(reason, count)| (format!("exits_{}", reason.to_lowercase()), count.to_string())),
        );

        writer
            .write_record(["metric", "value"])
            .map_err(|e| report_err(path, e))?;
        for (key, value) in &rows {
            writer
                .write_record([key, value])
                .map_err(|e| report_err(path, e))?;
        }
        writer.flush().map_err(|e| report_err(path, e))
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        metrics: &Metrics,
        output_path: &str,
    ) -> Result<(), SwingError> {
        let path = Path::new(output_path);
        self.write_trades(&result.trade_log, path)?;
        self.write_metrics(result, metrics, &metrics_path(path))?;
        tracing::info!(path = %path.display(), rows = result.trade_log.len(), "trade log written");
        Ok(())
    }
}
