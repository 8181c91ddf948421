//! Database metrics collection.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Record the wall-clock duration of a report query set.
pub fn record_report_duration(report: &str, duration_secs: f64) {
    histogram!(
        "analytics_report_duration_seconds",
        "report" => report.to_string()
    )
    .record(duration_secs);
}

/// Record database connection pool metrics.
///
/// Call this function periodically to track pool health.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("database_connections_active").set(active as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Times the assembly of one report and records it on drop-free completion.
pub struct ReportTimer {
    report: String,
    start: Instant,
}

impl ReportTimer {
    pub fn new(report: impl Into<String>) -> Self {
        Self {
            report: report.into(),
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration to metrics.
    pub fn record(self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_report_duration(&self.report, duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_timer_creation() {
        let timer = ReportTimer::new("overview");
        assert_eq!(timer.report, "overview");
    }

    #[test]
    fn test_report_timer_with_string() {
        let name = String::from("trends");
        let timer = ReportTimer::new(name);
        assert_eq!(timer.report, "trends");
    }
}
