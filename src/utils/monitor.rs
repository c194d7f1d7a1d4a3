//! Resource usage of the smoke run, sampled at scenario boundaries.

#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessesToUpdate, System};

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct ResourceSample {
    pub label: String,
    pub cpu_usage: f32,
    pub memory_mb: u64,
    /// Time since the previous sample (or since start for the first one).
    pub since_previous: Duration,
    pub since_start: Duration,
}

#[cfg(feature = "cli")]
struct MonitorState {
    system: System,
    last_sample: Instant,
    peak_memory_mb: u64,
    slowest: Option<(String, Duration)>,
}

#[cfg(feature = "cli")]
pub struct SystemMonitor {
    state: Mutex<MonitorState>,
    pid: Option<Pid>,
    started: Instant,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let pid = sysinfo::get_current_pid().ok();
        if enabled && pid.is_none() {
            tracing::warn!("Could not resolve current PID, memory figures will read 0");
        }

        let now = Instant::now();
        Self {
            state: Mutex::new(MonitorState {
                system: System::new(),
                last_sample: now,
                peak_memory_mb: 0,
                slowest: None,
            }),
            pid,
            started: now,
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Takes a sample labelled `label` and moves the "previous sample" mark to now.
    pub fn sample(&self, label: &str) -> Option<ResourceSample> {
        if !self.enabled {
            return None;
        }
        let mut state = self.state.lock().ok()?;

        let (cpu_usage, memory_mb) = match self.pid {
            Some(pid) => {
                state
                    .system
                    .refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
                state
                    .system
                    .process(pid)
                    .map(|p| (p.cpu_usage(), p.memory() / 1024 / 1024))
                    .unwrap_or((0.0, 0))
            }
            None => (0.0, 0),
        };
        state.peak_memory_mb = state.peak_memory_mb.max(memory_mb);

        let now = Instant::now();
        let since_previous = now.duration_since(state.last_sample);
        state.last_sample = now;

        let slower = state
            .slowest
            .as_ref()
            .map_or(true, |(_, longest)| since_previous > *longest);
        if slower {
            state.slowest = Some((label.to_string(), since_previous));
        }

        Some(ResourceSample {
            label: label.to_string(),
            cpu_usage,
            memory_mb,
            since_previous,
            since_start: now.duration_since(self.started),
        })
    }

    /// Logs a sample for the scenario that just finished.
    pub fn log_stats(&self, label: &str) {
        if let Some(sample) = self.sample(label) {
            tracing::info!(
                "📊 {}: took {:?}, CPU {:.1}%, memory {}MB (run time {:?})",
                sample.label,
                sample.since_previous,
                sample.cpu_usage,
                sample.memory_mb,
                sample.since_start
            );
        }
    }

    pub fn log_final_stats(&self) {
        if !self.enabled {
            return;
        }
        let Ok(state) = self.state.lock() else {
            return;
        };
        let slowest = state
            .slowest
            .as_ref()
            .map(|(label, took)| format!("{} ({:?})", label, took))
            .unwrap_or_else(|| "-".to_string());
        tracing::info!(
            "📊 Run finished in {:?}, peak memory {}MB, slowest step {}",
            self.started.elapsed(),
            state.peak_memory_mb,
            slowest
        );
    }
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// Without the cli feature there is no sysinfo; monitoring is a no-op.
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn is_enabled(&self) -> bool {
        false
    }

    pub fn log_stats(&self, _label: &str) {}

    pub fn log_final_stats(&self) {}
}
