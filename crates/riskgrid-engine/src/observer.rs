//! Step observer that logs run progress.

use riskgrid_core::RiskGrid;
use riskgrid_core::runner::StepObserver;
use riskgrid_types::HistoryRecord;
use tracing::info;

/// Logs the distribution every `interval` steps and on the last step.
pub struct ProgressObserver {
    interval: usize,
    total_steps: usize,
}

impl ProgressObserver {
    /// Create an observer for a run of `total_steps` steps. An interval of 0
    /// disables progress lines.
    pub const fn new(interval: usize, total_steps: usize) -> Self {
        Self {
            interval,
            total_steps,
        }
    }

    fn should_report(&self, step: usize) -> bool {
        if self.interval == 0 {
            return false;
        }
        let is_last = step.checked_add(1) == Some(self.total_steps);
        step.checked_rem(self.interval) == Some(0) || is_last
    }
}

impl StepObserver for ProgressObserver {
    fn on_step(&mut self, record: &HistoryRecord, _grid: &RiskGrid) {
        if !self.should_report(record.step) {
            return;
        }
        info!(
            step = record.step,
            total_steps = self.total_steps,
            sii_0 = record.sii_0,
            sii_1 = record.sii_1,
            sii_2 = record.sii_2,
            sii_3 = record.sii_3,
            "Step progress"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_on_interval_and_last_step() {
        let observer = ProgressObserver::new(10, 25);
        let reported: Vec<usize> = (0..25).filter(|s| observer.should_report(*s)).collect();
        assert_eq!(reported, vec![0, 10, 20, 24]);
    }

    #[test]
    fn zero_interval_is_silent() {
        let observer = ProgressObserver::new(0, 5);
        assert!((0..5).all(|s| !observer.should_report(s)));
    }
}
