//! Resource usage monitoring.
//!
//! A background task samples the daemon's own memory and CPU usage on a
//! fixed interval, logging routine readings at debug level and warning
//! when usage grows past the thresholds. A ticket daemon should stay
//! small; sustained growth points at a leak in connection handling.

use std::process;
use std::time::Duration;

use sysinfo::{Pid, System};
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How often the daemon samples its own resource usage.
pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(30);

/// Memory warning threshold in MB.
pub const MEMORY_WARN_MB: u64 = 64;

/// CPU warning threshold (percentage of one core).
pub const CPU_WARN_PERCENT: f32 = 90.0;

/// One reading of the daemon's resource usage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceSample {
    /// Resident memory in bytes.
    pub memory_bytes: u64,

    /// CPU usage since the previous sample (0.0 - 100.0 per core).
    pub cpu_percent: f32,
}

impl ResourceSample {
    /// Resident memory in whole megabytes.
    pub fn memory_mb(&self) -> u64 {
        self.memory_bytes / (1024 * 1024)
    }
}

/// Samples resource usage of the daemon process via `sysinfo`.
pub struct ResourceMonitor {
    system: System,
    pid: Pid,
}

impl ResourceMonitor {
    /// Creates a monitor bound to the current process.
    pub fn new() -> Self {
        Self {
            system: System::new(),
            pid: Pid::from_u32(process::id()),
        }
    }

    /// Takes a fresh sample.
    ///
    /// CPU usage is computed against the previous refresh, so the first
    /// sample after construction always reports 0.0 CPU. Returns `None`
    /// only if sysinfo cannot see the daemon's own process.
    pub fn sample(&mut self) -> Option<ResourceSample> {
        // A full refresh is required here: refreshing just one process
        // leaves its CPU usage uncomputed.
        self.system.refresh_all();

        self.system.process(self.pid).map(|p| ResourceSample {
            memory_bytes: p.memory(),
            cpu_percent: p.cpu_usage(),
        })
    }
}

impl Default for ResourceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the periodic sampling task.
///
/// The task runs until the token is cancelled and logs every reading;
/// warnings fire when a threshold is crossed.
pub fn spawn_monitor(cancel_token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut monitor = ResourceMonitor::new();
        let mut tick = interval(SAMPLE_INTERVAL);

        // Prime the CPU baseline so the first logged reading is real.
        let _ = monitor.sample();

        info!(
            interval_secs = SAMPLE_INTERVAL.as_secs(),
            memory_warn_mb = MEMORY_WARN_MB,
            "Resource monitor started"
        );

        loop {
            tokio::select! {
                biased;

                _ = cancel_token.cancelled() => {
                    info!("Resource monitor shutting down");
                    break;
                }

                _ = tick.tick() => {
                    match monitor.sample() {
                        Some(sample) => log_sample(&sample),
                        None => warn!("Resource monitor lost sight of its own process"),
                    }
                }
            }
        }
    })
}

fn log_sample(sample: &ResourceSample) {
    let memory_mb = sample.memory_mb();
    if memory_mb > MEMORY_WARN_MB {
        warn!(
            memory_mb,
            threshold_mb = MEMORY_WARN_MB,
            cpu_percent = format!("{:.1}", sample.cpu_percent),
            "Daemon memory usage above threshold"
        );
    } else if sample.cpu_percent > CPU_WARN_PERCENT {
        warn!(
            memory_mb,
            cpu_percent = format!("{:.1}", sample.cpu_percent),
            threshold_percent = CPU_WARN_PERCENT,
            "Daemon CPU usage above threshold"
        );
    } else {
        debug!(
            memory_mb,
            cpu_percent = format!("{:.1}", sample.cpu_percent),
            "Daemon resource usage"
        );
    }
}
