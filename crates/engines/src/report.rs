//! Per-batch structured result (spec.md §7 "User-visible behavior" — one
//! structured log line per batch with rows affected and elapsed time).

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub stage: &'static str,
    pub academic_year: Option<String>,
    pub rows_affected: u64,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn log(&self) {
        tracing::info!(
            stage = self.stage,
            academic_year = self.academic_year.as_deref().unwrap_or("*"),
            rows_affected = self.rows_affected,
            elapsed_ms = self.elapsed.as_millis() as u64,
            "stage batch complete"
        );
    }
}
