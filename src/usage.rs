//! Point-in-time CPU and memory utilisation from the engine's raw counters.
//!
//! The engine reports cumulative CPU time for the container and for the whole host at two
//! instants (`cpu_stats` and `precpu_stats`). Utilisation is the container's share of the host
//! delta, scaled by the number of online CPUs:
//!
//! ```text
//! cpu% = (container_delta / system_delta) * online_cpus * 100
//! ```
//!
//! Memory utilisation is `usage / limit * 100`. A zero or missing limit yields an unavailable
//! reading instead of a division artifact.

use crate::engine::ContainerStatsResponse;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const ZERO_PERCENT: &str = "0%";
const ZERO_MEGABYTES: &str = "0 MB";

/// Raw counters of one stats reading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageSnapshot {
    pub container_cpu: u64,
    pub previous_container_cpu: u64,
    pub system_cpu: u64,
    pub previous_system_cpu: u64,
    pub online_cpus: u32,
    pub memory_usage: u64,
    pub memory_limit: u64,
    pub read_at: Option<String>,
}

impl From<ContainerStatsResponse> for UsageSnapshot {
    fn from(value: ContainerStatsResponse) -> Self {
        let cpu = value.cpu_stats.unwrap_or_default();
        let precpu = value.precpu_stats.unwrap_or_default();
        let memory = value.memory_stats.unwrap_or_default();
        Self {
            container_cpu: cpu.cpu_usage.and_then(|usage| usage.total_usage).unwrap_or(0),
            previous_container_cpu: precpu
                .cpu_usage
                .and_then(|usage| usage.total_usage)
                .unwrap_or(0),
            system_cpu: cpu.system_cpu_usage.unwrap_or(0),
            previous_system_cpu: precpu.system_cpu_usage.unwrap_or(0),
            online_cpus: cpu.online_cpus.unwrap_or(0),
            memory_usage: memory.usage.unwrap_or(0),
            memory_limit: memory.limit.unwrap_or(0),
            read_at: value.read.filter(|read| !read.is_empty()),
        }
    }
}

/// Normalised utilisation computed from a [`UsageSnapshot`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageReport {
    /// Percentage of one CPU times the online CPU count, two decimals.
    pub cpu_percent: f64,
    pub memory_usage_bytes: u64,
    pub memory_limit_bytes: u64,
    /// `None` when the memory limit was zero or unknown.
    pub memory_percent: Option<f64>,
    /// `false` for the zero-equivalent report of a failed read.
    pub sampled: bool,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl UsageReport {
    pub fn compute(snapshot: &UsageSnapshot) -> Self {
        let cpu_delta = snapshot
            .container_cpu
            .saturating_sub(snapshot.previous_container_cpu);
        let system_delta = snapshot
            .system_cpu
            .saturating_sub(snapshot.previous_system_cpu);
        let online_cpus = snapshot.online_cpus.max(1);
        let cpu_percent = if system_delta > 0 {
            round2(cpu_delta as f64 / system_delta as f64 * f64::from(online_cpus) * 100.0)
        } else {
            0.0
        };

        let memory_percent = (snapshot.memory_limit > 0).then(|| {
            let ratio = snapshot.memory_usage as f64 / snapshot.memory_limit as f64;
            round2((ratio * 100.0).min(100.0))
        });

        Self {
            cpu_percent,
            memory_usage_bytes: snapshot.memory_usage,
            memory_limit_bytes: snapshot.memory_limit,
            memory_percent,
            sampled: true,
        }
    }

    /// Zero-equivalent report used when no snapshot could be read.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn memory_available(&self) -> bool {
        self.memory_percent.is_some()
    }

    pub fn cpu_percent_label(&self) -> String {
        if !self.sampled {
            return ZERO_PERCENT.to_owned();
        }
        format_percent(self.cpu_percent)
    }

    pub fn memory_percent_label(&self) -> String {
        match self.memory_percent {
            Some(percent) => format_percent(percent),
            None => ZERO_PERCENT.to_owned(),
        }
    }

    pub fn memory_usage_label(&self) -> String {
        if !self.sampled {
            return ZERO_MEGABYTES.to_owned();
        }
        format_megabytes(self.memory_usage_bytes)
    }

    pub fn memory_limit_label(&self) -> String {
        if !self.sampled {
            return ZERO_MEGABYTES.to_owned();
        }
        format_megabytes(self.memory_limit_bytes)
    }
}

/// `80` -> `80.00%`
pub fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}

/// `104857600` -> `100.00 MB`
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / BYTES_PER_MB)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpu_snapshot(cpu_delta: u64, system_delta: u64, online_cpus: u32) -> UsageSnapshot {
        UsageSnapshot {
            container_cpu: 10_000 + cpu_delta,
            previous_container_cpu: 10_000,
            system_cpu: 500_000 + system_delta,
            previous_system_cpu: 500_000,
            online_cpus,
            ..Default::default()
        }
    }

    #[test]
    fn test_cpu_percent() {
        let report = UsageReport::compute(&cpu_snapshot(200, 1000, 4));
        assert_eq!(report.cpu_percent, 80.0);
        assert_eq!(report.cpu_percent_label(), "80.00%");
    }

    #[test]
    fn test_cpu_percent_rounds_to_two_decimals() {
        let report = UsageReport::compute(&cpu_snapshot(1, 3, 1));
        assert_eq!(report.cpu_percent, 33.33);
    }

    #[test]
    fn test_cpu_percent_zero_without_system_delta() {
        assert_eq!(UsageReport::compute(&cpu_snapshot(200, 0, 4)).cpu_percent, 0.0);

        let mut backwards = cpu_snapshot(200, 0, 4);
        backwards.previous_system_cpu = backwards.system_cpu + 10;
        assert_eq!(UsageReport::compute(&backwards).cpu_percent, 0.0);
    }

    #[test]
    fn test_cpu_counter_reset_is_not_negative() {
        let mut snapshot = cpu_snapshot(0, 1000, 2);
        snapshot.previous_container_cpu = snapshot.container_cpu + 500;
        assert_eq!(UsageReport::compute(&snapshot).cpu_percent, 0.0);
    }

    #[test]
    fn test_online_cpus_defaults_to_one() {
        let report = UsageReport::compute(&cpu_snapshot(100, 1000, 0));
        assert_eq!(report.cpu_percent, 10.0);
    }

    #[test]
    fn test_memory_usage() {
        let snapshot = UsageSnapshot {
            memory_usage: 104_857_600,
            memory_limit: 209_715_200,
            ..Default::default()
        };
        let report = UsageReport::compute(&snapshot);
        assert_eq!(report.memory_usage_label(), "100.00 MB");
        assert_eq!(report.memory_limit_label(), "200.00 MB");
        assert_eq!(report.memory_percent_label(), "50.00%");
        assert!(report.memory_available());
    }

    #[test]
    fn test_memory_zero_limit_is_unavailable() {
        let snapshot = UsageSnapshot {
            memory_usage: 104_857_600,
            memory_limit: 0,
            ..Default::default()
        };
        let report = UsageReport::compute(&snapshot);
        assert_eq!(report.memory_percent, None);
        assert_eq!(report.memory_percent_label(), "0%");
        assert_eq!(report.memory_usage_label(), "100.00 MB");
        assert!(!report.memory_available());
    }

    #[test]
    fn test_memory_percent_capped() {
        let snapshot = UsageSnapshot {
            memory_usage: 300,
            memory_limit: 200,
            ..Default::default()
        };
        assert_eq!(UsageReport::compute(&snapshot).memory_percent, Some(100.0));
    }

    #[test]
    fn test_snapshot_from_stats_json() {
        let data = r#"{
            "read": "2024-05-01T10:00:01Z",
            "cpu_stats": {"cpu_usage": {"total_usage": 1200}, "system_cpu_usage": 11000, "online_cpus": 4},
            "precpu_stats": {"cpu_usage": {"total_usage": 1000}, "system_cpu_usage": 10000},
            "memory_stats": {"usage": 104857600, "limit": 209715200}
        }"#;
        let stats: ContainerStatsResponse = serde_json::from_str(data).unwrap();
        let report = UsageReport::compute(&UsageSnapshot::from(stats));
        assert_eq!(report.cpu_percent_label(), "80.00%");
        assert_eq!(report.memory_percent_label(), "50.00%");
    }

    #[test]
    fn test_snapshot_of_stopped_container() {
        let data = r#"{"read": "0001-01-01T00:00:00Z", "cpu_stats": {"cpu_usage": {"total_usage": 0}},
                       "precpu_stats": {}, "memory_stats": {}}"#;
        let stats: ContainerStatsResponse = serde_json::from_str(data).unwrap();
        let snapshot = UsageSnapshot::from(stats);
        assert_eq!(snapshot.memory_limit, 0);
        assert_eq!(snapshot.online_cpus, 0);
        let report = UsageReport::compute(&snapshot);
        assert_eq!(report.cpu_percent_label(), "0.00%");
        assert!(!report.memory_available());
    }

    #[test]
    fn test_unavailable_report() {
        let report = UsageReport::unavailable();
        assert_eq!(report.cpu_percent_label(), "0%");
        assert_eq!(report.memory_percent_label(), "0%");
        assert_eq!(report.memory_usage_label(), "0 MB");
        assert_eq!(report.memory_limit_label(), "0 MB");
        assert!(!report.memory_available());
    }
}
