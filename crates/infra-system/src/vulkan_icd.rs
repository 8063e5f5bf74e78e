// Vulkan ICD manifest discovery
//
// The lavapipe backend needs VK_ICD_FILENAMES pointed at the software
// rasterizer's ICD manifest. Loader convention puts manifests under the
// icd.d directories scanned here.

use std::path::{Path, PathBuf};

use tracing::debug;

/// Conventional ICD manifest directories, in scan order.
const ICD_SEARCH_DIRS: &[&str] = &[
    "/usr/share/vulkan/icd.d",
    "/usr/local/share/vulkan/icd.d",
    "/etc/vulkan/icd.d",
];

/// Find the lavapipe ICD manifest, scanning the conventional directories.
/// Returns the first match; `None` when no manifest is installed.
pub fn find_lavapipe_icd() -> Option<PathBuf> {
    find_lavapipe_icd_in(&search_dirs())
}

/// All ICD manifests visible on this host, for the doctor report.
pub fn installed_manifests() -> Vec<PathBuf> {
    manifests_in(&search_dirs())
}

fn search_dirs() -> Vec<PathBuf> {
    ICD_SEARCH_DIRS.iter().map(PathBuf::from).collect()
}

/// Scan `dirs` in order for a lavapipe manifest (`lvp_icd*.json`).
/// Entries within a directory are sorted so the result is deterministic.
pub fn find_lavapipe_icd_in(dirs: &[PathBuf]) -> Option<PathBuf> {
    for dir in dirs {
        let mut candidates: Vec<PathBuf> = manifests_in(std::slice::from_ref(dir))
            .into_iter()
            .filter(|p| is_lavapipe_manifest(p))
            .collect();
        candidates.sort();

        if let Some(found) = candidates.into_iter().next() {
            debug!(manifest = %found.display(), "Found lavapipe ICD manifest");
            return Some(found);
        }
    }

    debug!("No lavapipe ICD manifest found");
    None
}

/// All `*.json` manifests under `dirs`, sorted per directory.
pub fn manifests_in(dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut manifests = Vec::new();

    for dir in dirs {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        let mut found: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        found.sort();
        manifests.extend(found);
    }

    manifests
}

fn is_lavapipe_manifest(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with("lvp_icd"))
}
