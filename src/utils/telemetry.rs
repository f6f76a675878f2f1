// file: src/utils/telemetry.rs
// description: component health probes and timing of long running work
// reference: tracing based observability

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Ordered from best to worst so a report takes the maximum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    fn icon(self) -> &'static str {
        match self {
            HealthStatus::Healthy => "✓",
            HealthStatus::Degraded => "⚠",
            HealthStatus::Unhealthy => "✗",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub component: String,
    pub status: HealthStatus,
    pub message: Option<String>,
    pub response_time_ms: u64,
}

impl HealthCheck {
    fn with_status(
        component: &str,
        status: HealthStatus,
        message: Option<String>,
        response_time: Duration,
    ) -> Self {
        Self {
            component: component.to_string(),
            status,
            message,
            response_time_ms: response_time.as_millis() as u64,
        }
    }

    pub fn healthy(component: &str, response_time: Duration) -> Self {
        Self::with_status(component, HealthStatus::Healthy, None, response_time)
    }

    pub fn degraded(component: &str, message: String, response_time: Duration) -> Self {
        Self::with_status(component, HealthStatus::Degraded, Some(message), response_time)
    }

    pub fn unhealthy(component: &str, message: String, response_time: Duration) -> Self {
        Self::with_status(component, HealthStatus::Unhealthy, Some(message), response_time)
    }

    /// Healthy on `Ok`, unhealthy with the error text otherwise.
    pub fn from_probe<E: std::fmt::Display>(
        component: &str,
        outcome: std::result::Result<(), E>,
        response_time: Duration,
    ) -> Self {
        match outcome {
            Ok(()) => Self::healthy(component, response_time),
            Err(e) => Self::unhealthy(component, e.to_string(), response_time),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub overall_status: HealthStatus,
    pub checks: Vec<HealthCheck>,
    pub timestamp: u64,
    pub version: String,
}

impl HealthReport {
    pub fn new(checks: Vec<HealthCheck>, version: String) -> Self {
        let overall_status = checks
            .iter()
            .map(|c| c.status)
            .max()
            .unwrap_or(HealthStatus::Healthy);

        Self {
            overall_status,
            checks,
            timestamp: chrono::Utc::now().timestamp().max(0) as u64,
            version,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.overall_status == HealthStatus::Healthy
    }

    pub fn format(&self) -> String {
        let checked_at = chrono::DateTime::from_timestamp(self.timestamp as i64, 0)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let mut output = format!(
            "{} docsage {} is {:?}\nChecked: {}\n\n",
            self.overall_status.icon(),
            self.version,
            self.overall_status,
            checked_at
        );

        let width = self
            .checks
            .iter()
            .map(|c| c.component.len())
            .max()
            .unwrap_or(0);

        for check in &self.checks {
            output.push_str(&format!(
                "{} {:<width$} {:>6}ms",
                check.status.icon(),
                check.component,
                check.response_time_ms,
                width = width
            ));
            if let Some(msg) = &check.message {
                output.push_str(&format!("  {}", msg));
            }
            output.push('\n');
        }

        output
    }
}

/// Logs start, checkpoints and completion of a long operation.
pub struct OperationTimer {
    operation: String,
    start: Instant,
    slow_after: Option<Duration>,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        info!("Starting {}", operation);
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
            slow_after: None,
        }
    }

    /// Completion is logged as a warning when it takes longer than `threshold`.
    pub fn with_slow_threshold(mut self, threshold: Duration) -> Self {
        self.slow_after = Some(threshold);
        self
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn checkpoint(&self, message: &str) {
        info!(
            "[{}] {} at {:.2}s",
            self.operation,
            message,
            self.elapsed().as_secs_f64()
        );
    }

    pub fn finish(self) -> Duration {
        let elapsed = self.elapsed();
        self.report(&format!("in {:.2}s", elapsed.as_secs_f64()), elapsed);
        elapsed
    }

    pub fn finish_with_count(self, count: usize) -> Duration {
        let elapsed = self.elapsed();
        let secs = elapsed.as_secs_f64();
        let rate = if secs > 0.0 { count as f64 / secs } else { 0.0 };
        self.report(
            &format!("{} items in {:.2}s ({:.2}/s)", count, secs, rate),
            elapsed,
        );
        elapsed
    }

    fn report(&self, summary: &str, elapsed: Duration) {
        match self.slow_after {
            Some(threshold) if elapsed > threshold => warn!(
                "Finished {} {} (slower than {}s)",
                self.operation,
                summary,
                threshold.as_secs()
            ),
            _ => info!("Finished {} {}", self.operation, summary),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_report_takes_worst_status() {
        let checks = vec![
            HealthCheck::healthy("lancedb", Duration::from_millis(10)),
            HealthCheck::degraded("embeddings", "local fallback".to_string(), Duration::ZERO),
        ];

        let report = HealthReport::new(checks, "0.1.0".to_string());
        assert_eq!(report.overall_status, HealthStatus::Degraded);
        assert!(!report.is_healthy());
        assert!(report.format().contains("local fallback"));

        let probe: Result<(), String> = Err("down".to_string());
        let report = HealthReport::new(
            vec![HealthCheck::from_probe("lancedb", probe, Duration::ZERO)],
            "0.1.0".to_string(),
        );
        assert_eq!(report.overall_status, HealthStatus::Unhealthy);
        assert!(HealthReport::new(vec![], "0.1.0".to_string()).is_healthy());
    }

    #[test]
    fn test_operation_timer() {
        let timer = OperationTimer::new("test").with_slow_threshold(Duration::from_secs(60));
        std::thread::sleep(Duration::from_millis(10));
        timer.checkpoint("halfway");
        let elapsed = timer.finish_with_count(3);
        assert!(elapsed >= Duration::from_millis(10));
    }
}
