//! Report output port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::SwingError;
use crate::domain::metrics::Metrics;

/// Port for persisting a finished run.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        metrics: &Metrics,
        output_path: &str,
    ) -> Result<(), SwingError>;
}
