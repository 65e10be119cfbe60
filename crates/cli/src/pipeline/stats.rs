//! Run statistics.

use std::sync::Arc;
use std::time::Duration;

use broadcaster::{Broadcaster, MetricsSnapshot};
use contracts::Sample;
use observability::SessionSummary;

/// Statistics from one server run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Total run duration
    pub duration: Duration,

    /// Samples taken from all source queues
    pub samples_received: u64,

    /// Per-series broadcaster counters
    pub series: Vec<(String, MetricsSnapshot)>,

    /// Sessions that ended during the run
    pub sessions: SessionSummary,
}

impl PipelineStats {
    pub fn collect(
        broadcasters: &[Arc<Broadcaster<Sample>>],
        sessions: SessionSummary,
        duration: Duration,
    ) -> Self {
        let series: Vec<_> = broadcasters
            .iter()
            .map(|b| (b.series().to_string(), b.metrics().snapshot()))
            .collect();

        Self {
            duration,
            samples_received: series.iter().map(|(_, s)| s.received).sum(),
            series,
            sessions,
        }
    }

    /// Samples per second across all series
    pub fn sample_rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.samples_received as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Share of subscriber deliveries lost to full queues, in percent
    pub fn drop_rate(&self) -> f64 {
        let (delivered, dropped) = self
            .series
            .iter()
            .fold((0u64, 0u64), |(d, x), (_, s)| (d + s.delivered, x + s.dropped));
        let total = delivered + dropped;
        if total > 0 {
            dropped as f64 / total as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                      Run Statistics                          ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Samples received: {}", self.samples_received);
        println!("   ├─ Sample rate: {:.0}/s", self.sample_rate());
        println!("   └─ Drop rate: {:.2}%", self.drop_rate());

        println!("\n📈 Series");
        for (i, (name, snapshot)) in self.series.iter().enumerate() {
            let prefix = if i == self.series.len() - 1 {
                "└─"
            } else {
                "├─"
            };
            println!(
                "   {} {}: received={}, delivered={}, dropped={}, subscriptions={}",
                prefix,
                name,
                snapshot.received,
                snapshot.delivered,
                snapshot.dropped,
                snapshot.subscribed
            );
        }

        println!("\n🔌 Sessions");
        println!("   ├─ Total: {}", self.sessions.total_sessions);
        println!("   ├─ Flushes: {}", self.sessions.total_flushes);
        println!("   ├─ Samples sent: {}", self.sessions.total_samples_sent);
        println!("   └─ Mean batch size: {}", self.sessions.mean_batch_size);

        if !self.sessions.outcome_counts.is_empty() {
            println!("\n🔚 Session Outcomes");
            for (outcome, count) in &self.sessions.outcome_counts {
                println!("   - {}: {}", outcome, count);
            }
        }

        println!();
    }
}
