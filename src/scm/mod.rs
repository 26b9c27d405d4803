//! # Source Control Handlers
//!
//! Every component repository is materialized through an `ScmHandler`, a
//! four-operation capability:
//!
//! - **`matches`**: whether an existing working copy at a path was produced
//!   from a location and can be refreshed in place.
//! - **`fetch`**: populate an empty path from scratch.
//! - **`update`**: refresh an existing, matching working copy.
//! - **`switch`**: move the working copy to a version reference.
//!
//! The `ScmRegistry` dispatches on the scheme of a repository location. The
//! default registry maps `file` to the copy-based [`FileScmHandler`] and
//! `git`, `http` and `https` to the [`GitScmHandler`]. Handlers can be
//! replaced or added with [`ScmRegistry::register`], which is how tests count
//! handler calls without touching the network.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use url::Url;

use crate::error::{Error, Result};
use crate::repository::{Credentials, Repository};

pub mod file;
pub mod git;

pub use file::FileScmHandler;
pub use git::GitScmHandler;

/// Scheme of local directories
pub const SCHEME_FILE: &str = "file";
/// Native git protocol scheme
pub const SCHEME_GIT: &str = "git";
/// Plain HTTP scheme
pub const SCHEME_HTTP: &str = "http";
/// Secure HTTP scheme
pub const SCHEME_HTTPS: &str = "https";

/// The capability every source control handler implements.
pub trait ScmHandler: Send + Sync {
    /// Returns true if `path` already holds a working copy of `location`
    /// that can be updated in place.
    fn matches(&self, location: &Url, path: &Path) -> bool;

    /// Fetches the content of `location` into `path`.
    fn fetch(&self, location: &Url, path: &Path, auth: &Credentials) -> Result<()>;

    /// Updates the working copy in `path` from `location`.
    fn update(&self, location: &Url, path: &Path, auth: &Credentials) -> Result<()>;

    /// Checks out `reference` in `path`. An empty reference keeps the
    /// current one.
    fn switch(&self, path: &Path, reference: &str) -> Result<()>;
}

/// Scheme to handler dispatch table
#[derive(Clone)]
pub struct ScmRegistry {
    handlers: HashMap<String, Arc<dyn ScmHandler>>,
}

impl ScmRegistry {
    /// Creates a registry without any handler.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers (or replaces) the handler of a scheme.
    pub fn register(&mut self, scheme: &str, handler: Arc<dyn ScmHandler>) -> &mut Self {
        self.handlers.insert(scheme.to_ascii_lowercase(), handler);
        self
    }

    /// Returns the handler able to fetch the given repository.
    pub fn handler_for(&self, repository: &Repository) -> Result<Arc<dyn ScmHandler>> {
        let location = repository.location().ok_or_else(|| Error::Repository {
            message: "repository has no location".to_string(),
        })?;
        self.handlers
            .get(location.scheme())
            .cloned()
            .ok_or_else(|| Error::UnsupportedScheme {
                scheme: location.scheme().to_string(),
                location: location.to_string(),
            })
    }

    pub fn supports(&self, scheme: &str) -> bool {
        self.handlers.contains_key(&scheme.to_ascii_lowercase())
    }
}

impl Default for ScmRegistry {
    fn default() -> Self {
        let git: Arc<dyn ScmHandler> = Arc::new(GitScmHandler);
        let mut registry = Self::empty();
        registry
            .register(SCHEME_FILE, Arc::new(FileScmHandler))
            .register(SCHEME_GIT, git.clone())
            .register(SCHEME_HTTP, git.clone())
            .register(SCHEME_HTTPS, git);
        registry
    }
}

impl std::fmt::Debug for ScmRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut schemes: Vec<&String> = self.handlers.keys().collect();
        schemes.sort();
        f.debug_struct("ScmRegistry")
            .field("schemes", &schemes)
            .finish()
    }
}
