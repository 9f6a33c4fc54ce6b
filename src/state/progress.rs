use std::fmt;
use std::time::{Duration, Instant};

/// Processed/total counters for a run
///
/// Owned by the scheduler's completion loop; `processed` only ever grows by
/// one per finished item.
#[derive(Debug, Clone)]
pub struct ProgressState {
    processed: usize,
    total: usize,
    started: Instant,
}

/// Progress figures computed after one completion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub processed: usize,
    pub total: usize,
    pub remaining: usize,
    pub elapsed: Duration,
    pub average: Duration,
    pub eta: Duration,
}

impl ProgressState {
    pub fn new(total: usize) -> Self {
        Self::starting_at(total, Instant::now())
    }

    pub(crate) fn starting_at(total: usize, started: Instant) -> Self {
        Self {
            processed: 0,
            total,
            started,
        }
    }

    /// Records one finished item and recomputes elapsed, average, and ETA
    pub fn record_completion(&mut self) -> ProgressSnapshot {
        self.record_completion_at(Instant::now())
    }

    pub(crate) fn record_completion_at(&mut self, now: Instant) -> ProgressSnapshot {
        self.processed += 1;
        if self.processed > self.total {
            tracing::warn!(
                "Progress overflow: {} processed of {} total",
                self.processed,
                self.total
            );
        }

        let elapsed = now.saturating_duration_since(self.started);
        let remaining = self.total.saturating_sub(self.processed);
        let average = elapsed.div_f64(self.processed as f64);
        let eta = average.mul_f64(remaining as f64);

        ProgressSnapshot {
            processed: self.processed,
            total: self.total,
            remaining,
            elapsed,
            average,
            eta,
        }
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn is_complete(&self) -> bool {
        self.processed >= self.total
    }
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Processed: {}/{} | Items left: {} | ETA: {}",
            self.processed,
            self.total,
            self.remaining,
            format_eta(self.eta)
        )
    }
}

/// Formats a duration as `HH:MM:SS`, rounded to the nearest second
pub fn format_eta(duration: Duration) -> String {
    let seconds = duration.as_secs_f64().round() as u64;
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    format!("{:02}:{:02}:{:02}", h, m, s)
}
