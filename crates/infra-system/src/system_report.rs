// Render environment report
// reason: sysinfo for cross-platform system inspection

use std::path::PathBuf;
use std::sync::Mutex;

use serde::Serialize;
use sysinfo::System;
use tracing::debug;

use crate::vulkan_icd;

/// Environment variables relevant to graphics backend selection.
const RENDER_VAR_PREFIXES: &[&str] = &["LIBGL_", "WGPU_", "VK_", "MESA_"];

/// Snapshot of everything that influences whether the launched program can
/// bring up a rendering backend on this host.
#[derive(Debug, Clone, Serialize)]
pub struct RenderEnvironment {
    pub cpu_count: usize,
    pub memory_total_mb: u64,
    pub memory_used_mb: u64,
    pub display: Option<String>,
    pub wayland_display: Option<String>,
    /// Graphics-related variables already set in the caller's environment.
    pub render_vars: Vec<(String, String)>,
    /// Vulkan ICD manifests installed on this host.
    pub icd_manifests: Vec<PathBuf>,
    /// Lavapipe manifest the vulkan backend attempt would point at.
    pub lavapipe_icd: Option<PathBuf>,
}

impl RenderEnvironment {
    /// True when some display server is reachable.
    pub fn has_display(&self) -> bool {
        self.display.is_some() || self.wayland_display.is_some()
    }
}

/// Collects [`RenderEnvironment`] snapshots using sysinfo.
pub struct SystemReporter {
    system: Mutex<System>,
}

impl SystemReporter {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new_all()),
        }
    }

    pub fn collect(&self) -> RenderEnvironment {
        let mut sys = self.system.lock().unwrap();
        sys.refresh_all();

        let cpu_count = sys.cpus().len();
        let memory_total_mb = sys.total_memory() / 1024 / 1024;
        let memory_used_mb = sys.used_memory() / 1024 / 1024;
        drop(sys);

        let display = std::env::var("DISPLAY").ok();
        let wayland_display = std::env::var("WAYLAND_DISPLAY").ok();

        let mut render_vars: Vec<(String, String)> = std::env::vars()
            .filter(|(key, _)| RENDER_VAR_PREFIXES.iter().any(|p| key.starts_with(p)))
            .collect();
        render_vars.sort();

        let icd_manifests = vulkan_icd::installed_manifests();
        let lavapipe_icd = vulkan_icd::find_lavapipe_icd();

        let has_display = display.is_some() || wayland_display.is_some();

        debug!(
            cpu_count = %cpu_count,
            mem_total_mb = %memory_total_mb,
            has_display = %has_display,
            icd_manifests = icd_manifests.len(),
            "Render environment collected"
        );

        RenderEnvironment {
            cpu_count,
            memory_total_mb,
            memory_used_mb,
            display,
            wayland_display,
            render_vars,
            icd_manifests,
            lavapipe_icd,
        }
    }
}

impl Default for SystemReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_reports_sane_hardware_numbers() {
        let reporter = SystemReporter::new();
        let report = reporter.collect();

        assert!(report.cpu_count > 0);
        assert!(report.memory_total_mb > 0);
        assert!(report.memory_used_mb <= report.memory_total_mb);
    }

    #[test]
    fn test_render_vars_only_contain_graphics_prefixes() {
        let reporter = SystemReporter::new();
        let report = reporter.collect();

        for (key, _) in &report.render_vars {
            assert!(
                RENDER_VAR_PREFIXES.iter().any(|p| key.starts_with(p)),
                "unexpected key {key}"
            );
        }
    }
}
