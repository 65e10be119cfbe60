//! 会话指标收集模块
//!
//! Prometheus 记录函数 + 进程内聚合统计。

use std::collections::BTreeMap;

use metrics::{counter, gauge, histogram};

/// 记录会话建立
pub fn record_session_opened() {
    counter!("wavecast_sessions_opened_total").increment(1);
}

/// 记录会话结束
///
/// `outcome` 取值: `queue_closed` / `write_failed` / `disconnected`
pub fn record_session_closed(outcome: &str, flushes: u64, samples_sent: u64) {
    counter!(
        "wavecast_sessions_closed_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
    histogram!("wavecast_session_flushes").record(flushes as f64);
    histogram!("wavecast_session_samples_sent").record(samples_sent as f64);
}

/// 记录一次成功 flush 的批次大小 (样本数)
pub fn record_batch_flushed(samples: usize) {
    counter!("wavecast_batches_flushed_total").increment(1);
    counter!("wavecast_samples_sent_total").increment(samples as u64);
    histogram!("wavecast_batch_size").record(samples as f64);
}

/// 记录 sink 写失败
pub fn record_write_failed(sink_name: &str) {
    counter!(
        "wavecast_write_failures_total",
        "sink" => sink_name.to_string()
    )
    .increment(1);
}

/// 记录当前连接数
pub fn record_connections(count: usize) {
    gauge!("wavecast_connections").set(count as f64);
}

/// 会话指标聚合器
///
/// 在内存中汇总已结束会话，便于退出时输出摘要。
#[derive(Debug, Clone, Default)]
pub struct SessionMetricsAggregator {
    /// 已结束会话数
    pub total_sessions: u64,

    /// flush 总数
    pub total_flushes: u64,

    /// 发送样本总数
    pub total_samples_sent: u64,

    /// 各结束原因计数
    pub outcome_counts: BTreeMap<String, u64>,

    /// 每会话 flush 次数统计
    pub flush_stats: RunningStats,

    /// 每会话平均批次大小统计
    pub batch_size_stats: RunningStats,
}

impl SessionMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 合并一个已结束会话
    pub fn update(&mut self, outcome: &str, flushes: u64, samples_sent: u64) {
        self.total_sessions += 1;
        self.total_flushes += flushes;
        self.total_samples_sent += samples_sent;
        *self.outcome_counts.entry(outcome.to_string()).or_insert(0) += 1;

        self.flush_stats.push(flushes as f64);
        if flushes > 0 {
            self.batch_size_stats
                .push(samples_sent as f64 / flushes as f64);
        }
    }

    /// 生成摘要报告
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            total_sessions: self.total_sessions,
            total_flushes: self.total_flushes,
            total_samples_sent: self.total_samples_sent,
            outcome_counts: self.outcome_counts.clone(),
            flushes_per_session: StatsSummary::from(&self.flush_stats),
            mean_batch_size: StatsSummary::from(&self.batch_size_stats),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct SessionSummary {
    pub total_sessions: u64,
    pub total_flushes: u64,
    pub total_samples_sent: u64,
    pub outcome_counts: BTreeMap<String, u64>,
    pub flushes_per_session: StatsSummary,
    pub mean_batch_size: StatsSummary,
}

impl std::fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Session Summary ===")?;
        writeln!(f, "Sessions: {}", self.total_sessions)?;
        writeln!(f, "Flushes: {}", self.total_flushes)?;
        writeln!(f, "Samples sent: {}", self.total_samples_sent)?;
        writeln!(f, "Flushes per session: {}", self.flushes_per_session)?;
        writeln!(f, "Mean batch size: {}", self.mean_batch_size)?;

        if !self.outcome_counts.is_empty() {
            writeln!(f, "Outcomes:")?;
            for (outcome, count) in &self.outcome_counts {
                writeln!(f, "  {}: {}", outcome, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.1}, std={:.1} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            self.m2 += delta * (value - self.mean);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
