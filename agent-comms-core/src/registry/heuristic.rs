//! Directory-suffix name heuristic.

use std::path::Path;

use crate::config::AgentNamesConfig;

/// Lowercased basename of a working directory, or `""`.
fn directory_key(cwd: &str) -> String {
    Path::new(cwd)
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Pick a friendly name for a working directory.
///
/// An entry in `dir_map` keyed by the lowercased basename wins. Otherwise the first candidate
/// in `names` (list order is priority) whose lowercase form is the
/// `-suffix` of the basename is chosen, so `taskflow-web` yields `Web`.
pub fn match_directory(cwd: &str, config: &AgentNamesConfig) -> Option<String> {
    let dirname = directory_key(cwd);
    if dirname.is_empty() {
        return None;
    }

    // Keys are lowercase basenames; validation rejects anything else.
    if let Some(name) = config.dir_map.get(&dirname) {
        return Some(name.clone());
    }

    config
        .names
        .iter()
        .find(|name| {
            let suffix = format!("-{}", name.to_lowercase());
            dirname.ends_with(&suffix)
        })
        .cloned()
}
