//! Small shared helpers.

use std::path::PathBuf;

/// Check if a binary is available in PATH.
pub fn check_binary(name: &str) -> bool {
    which::which(name).is_ok()
}

/// Resolve the first of `names` found in PATH.
pub fn find_binary(names: &[&str]) -> Option<PathBuf> {
    names.iter().find_map(|name| which::which(name).ok())
}
