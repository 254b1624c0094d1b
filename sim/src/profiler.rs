//! Lightweight per-phase timing.
//!
//! `SimWorld` times each phase schedule under the phase name when profiling
//! is enabled, either with [`crate::SimWorld::enable_profiling`] or by
//! building with the `profile` feature:
//! ```bash
//! cargo run --release --example basic_demo --features profile
//! ```

use std::collections::HashMap;
use std::fmt::Write as _;
use std::time::{Duration, Instant};

/// Statistics for a profiled section
#[derive(Debug, Default, Clone)]
pub struct SectionStats {
    pub total_time: Duration,
    pub call_count: u64,
    pub min_time: Option<Duration>,
    pub max_time: Option<Duration>,
}

impl SectionStats {
    pub fn avg_time(&self) -> Duration {
        if self.call_count == 0 {
            Duration::ZERO
        } else {
            self.total_time / self.call_count as u32
        }
    }

    fn record(&mut self, elapsed: Duration) {
        self.total_time += elapsed;
        self.call_count += 1;
        self.min_time = Some(self.min_time.map_or(elapsed, |m| m.min(elapsed)));
        self.max_time = Some(self.max_time.map_or(elapsed, |m| m.max(elapsed)));
    }
}

/// Accumulates timings for named sections across frames.
#[derive(Debug, Default)]
pub struct Profiler {
    sections: HashMap<&'static str, SectionStats>,
    /// Section names in first-seen order, for stable reports.
    order: Vec<&'static str>,
    frame_count: u64,
}

impl Profiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time `f` and record it under `name`.
    pub fn time_section<F, R>(&mut self, name: &'static str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        self.record(name, start.elapsed());
        result
    }

    pub fn record(&mut self, name: &'static str, elapsed: Duration) {
        if !self.sections.contains_key(name) {
            self.order.push(name);
        }
        self.sections.entry(name).or_default().record(elapsed);
    }

    /// Mark the end of a frame.
    pub fn end_frame(&mut self) {
        self.frame_count += 1;
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn get_section(&self, name: &str) -> Option<&SectionStats> {
        self.sections.get(name)
    }

    /// Section names in the order they were first recorded.
    pub fn section_names(&self) -> &[&'static str] {
        &self.order
    }

    pub fn total_time(&self) -> Duration {
        self.sections.values().map(|s| s.total_time).sum()
    }

    /// Tabular report of every section.
    pub fn summary(&self) -> String {
        let total = self.total_time();
        let mut out = String::new();
        let _ = writeln!(out, "=== Phase timings ({} frames) ===", self.frame_count);
        let _ = writeln!(
            out,
            "{:<12} {:>10} {:>10} {:>10} {:>10} {:>7}",
            "Phase", "Total", "Avg", "Min", "Max", "%"
        );
        for name in &self.order {
            let Some(stats) = self.sections.get(name) else {
                continue;
            };
            let pct = if total.as_nanos() > 0 {
                stats.total_time.as_nanos() as f64 / total.as_nanos() as f64 * 100.0
            } else {
                0.0
            };
            let _ = writeln!(
                out,
                "{:<12} {:>10.2?} {:>10.2?} {:>10.2?} {:>10.2?} {:>6.1}%",
                name,
                stats.total_time,
                stats.avg_time(),
                stats.min_time.unwrap_or_default(),
                stats.max_time.unwrap_or_default(),
                pct
            );
        }
        let _ = writeln!(out, "{:<12} {:>10.2?}", "TOTAL", total);
        out
    }

    pub fn reset(&mut self) {
        self.sections.clear();
        self.order.clear();
        self.frame_count = 0;
    }
}
