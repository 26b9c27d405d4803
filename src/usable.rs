//! Ready-to-read views over fetched components

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::Level;

use crate::component::EnvVars;
use crate::diagnostics::{emit, LogSink};
use crate::matching::MatchingPath;
use crate::path::relative_entry;

/// A short-lived, possibly templated view over a fetched component.
///
/// When `is_templated` is true the root is a copy owned by this value alone
/// and [`release`](Self::release) deletes it. Releasing is idempotent and a
/// no-op for views over the fetched root itself.
pub struct UsableComponent {
    id: String,
    root: PathBuf,
    templated: bool,
    cleanup: Mutex<Option<PathBuf>>,
    env_vars: EnvVars,
    logger: LogSink,
}

impl UsableComponent {
    /// A view over the fetched root, nothing to clean up.
    pub fn fetched(id: &str, root: PathBuf, env_vars: EnvVars, logger: LogSink) -> Self {
        Self {
            id: id.to_string(),
            root,
            templated: false,
            cleanup: Mutex::new(None),
            env_vars,
            logger,
        }
    }

    /// A view over a templated copy, deleted on release.
    pub fn templated(id: &str, root: PathBuf, env_vars: EnvVars, logger: LogSink) -> Self {
        Self {
            id: id.to_string(),
            cleanup: Mutex::new(Some(root.clone())),
            root,
            templated: true,
            env_vars,
            logger,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn root_path(&self) -> &Path {
        &self.root
    }

    pub fn is_templated(&self) -> bool {
        self.templated
    }

    /// Environment variables of the reference this view was created for
    pub fn env_vars(&self) -> &EnvVars {
        &self.env_vars
    }

    /// Returns a match if `name` is a file below the root.
    ///
    /// Names are always taken relative to the root: a leading `/` is
    /// ignored and names climbing out of the root never match.
    pub fn contains_file(self: &Arc<Self>, name: &str) -> Option<MatchingPath> {
        let relative = relative_entry(name)?;
        if self.root.join(&relative).is_file() {
            Some(MatchingPath::new(Arc::clone(self), relative))
        } else {
            None
        }
    }

    /// Returns a match if `name` is a directory below the root.
    pub fn contains_directory(self: &Arc<Self>, name: &str) -> Option<MatchingPath> {
        let relative = relative_entry(name)?;
        if self.root.join(&relative).is_dir() {
            Some(MatchingPath::new(Arc::clone(self), relative))
        } else {
            None
        }
    }

    /// Deletes the templated copy, if any.
    ///
    /// Failures are logged and otherwise ignored.
    pub fn release(&self) {
        let target = match self.cleanup.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        let Some(target) = target else {
            return;
        };

        match fs::remove_dir_all(&target) {
            Ok(()) => emit!(
                self.logger,
                Level::Debug,
                "Removed templated copy of {} at {}",
                self.id,
                target.display()
            ),
            Err(e) => emit!(
                self.logger,
                Level::Warn,
                "Failed to remove templated copy of {} at {}: {}",
                self.id,
                target.display(),
                e
            ),
        }
    }
}

impl std::fmt::Debug for UsableComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsableComponent")
            .field("id", &self.id)
            .field("root", &self.root)
            .field("templated", &self.templated)
            .finish()
    }
}
