//! Metric sources.
//!
//! A [`MetricsSource`] produces one [`MetricsSnapshot`] per call. The native
//! source reads OS counters through `sysinfo`; the command source shells out
//! to the platform's introspection tools the way an operator would.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use sysinfo::{CpuRefreshKind, Disks, MemoryRefreshKind, RefreshKind, System};

use super::metrics::{used_percent, MetricsBackend, MetricsSnapshot};
use super::parse;
use crate::error::{NullBatchError, Result};

pub trait MetricsSource: Send {
    fn sample(&mut self) -> Result<MetricsSnapshot>;

    /// Delay before the first sample is meaningful
    fn warmup(&self) -> Duration {
        Duration::ZERO
    }
}

pub fn create_source(backend: MetricsBackend) -> Box<dyn MetricsSource> {
    match backend {
        MetricsBackend::Native => Box::new(NativeSource::new()),
        MetricsBackend::Command => Box::new(CommandSource),
    }
}

/// CPU, memory and root disk usage from `sysinfo`
pub struct NativeSource {
    system: System,
    disks: Disks,
}

impl NativeSource {
    pub fn new() -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::nothing().with_cpu_usage())
            .with_memory(MemoryRefreshKind::nothing().with_ram());

        Self {
            system: System::new_with_specifics(refresh_kind),
            disks: Disks::new_with_refreshed_list(),
        }
    }

    fn root_disk_percent(&self) -> Result<f32> {
        let root = root_mount_point();
        let disk = self
            .disks
            .list()
            .iter()
            .find(|d| d.mount_point() == root)
            .or_else(|| self.disks.list().first())
            .ok_or_else(|| NullBatchError::metric_collection("no mounted disks"))?;

        Ok(used_percent(disk.total_space(), disk.available_space()))
    }
}

impl Default for NativeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsSource for NativeSource {
    fn sample(&mut self) -> Result<MetricsSnapshot> {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();
        self.disks.refresh(true);

        let total = self.system.total_memory();
        if total == 0 {
            return Err(NullBatchError::metric_collection("total memory reported as zero"));
        }

        Ok(MetricsSnapshot {
            timestamp: chrono::Utc::now().timestamp(),
            cpu: self.system.global_cpu_usage(),
            memory: used_percent(total, self.system.available_memory()),
            disk: self.root_disk_percent()?,
        })
    }

    fn warmup(&self) -> Duration {
        sysinfo::MINIMUM_CPU_UPDATE_INTERVAL
    }
}

fn root_mount_point() -> &'static Path {
    if cfg!(windows) {
        Path::new("C:\\")
    } else {
        Path::new("/")
    }
}

/// Shells out to `wmic` on Windows and `top`, `free`, `df` elsewhere
pub struct CommandSource;

impl MetricsSource for CommandSource {
    fn sample(&mut self) -> Result<MetricsSnapshot> {
        let (cpu, memory, disk) = if cfg!(windows) {
            (
                parse::parse_wmic_cpu(&run("wmic", &["cpu", "get", "loadpercentage"])?)?,
                parse::parse_wmic_memory(&run(
                    "wmic",
                    &["OS", "get", "FreePhysicalMemory,TotalVisibleMemorySize", "/Value"],
                )?)?,
                parse::parse_wmic_disk(&run("wmic", &["logicaldisk", "get", "size,freespace"])?)?,
            )
        } else {
            (
                parse::parse_top_cpu(&run("top", &["-bn1"])?)?,
                parse::parse_free_memory(&run("free", &[])?)?,
                parse::parse_df_root(&run("df", &["-P", "/"])?)?,
            )
        };

        Ok(MetricsSnapshot {
            timestamp: chrono::Utc::now().timestamp(),
            cpu,
            memory,
            disk,
        })
    }
}

fn run(program: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(program).args(args).output().map_err(|e| {
        NullBatchError::metric_collection(format!("failed to run `{}`: {}", program, e))
    })?;

    if !output.status.success() {
        return Err(NullBatchError::metric_collection(format!(
            "`{}` exited with {:?}",
            program,
            output.status.code()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
