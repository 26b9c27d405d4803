//! Default values for component resolution.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// File name of a component descriptor when none is given
pub const DEFAULT_DESCRIPTOR: &str = "component.yaml";

/// Environment variable overriding the work directory
pub const WORK_DIR_ENV: &str = "COMPONENT_RESOLVER_WORK_DIR";

/// Returns the default work directory.
///
/// Uses the platform-appropriate cache directory:
/// - Linux: `~/.cache/component-resolver` (XDG Base Directory)
/// - macOS: `~/Library/Caches/component-resolver`
/// - Windows: `{FOLDERID_LocalAppData}\component-resolver`
///
/// Falls back to `.component-resolver` in the current directory if the
/// platform cache directory cannot be determined.
///
/// This can be overridden by the `--work-dir` CLI flag or the
/// `COMPONENT_RESOLVER_WORK_DIR` environment variable.
pub fn default_work_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".component-resolver"))
        .join("component-resolver")
}
