//! Materialization of components below the work directory

use std::fs;
use std::path::{Path, PathBuf};

use log::{Level, Log};

use crate::component::Component;
use crate::diagnostics::emit;
use crate::error::{Error, Result};
use crate::path::component_dir;
use crate::scm::ScmRegistry;

/// One component's single local materialization.
///
/// The root path of an entry never changes once recorded; only the stored
/// component value is updated when it is re-resolved against a model.
#[derive(Debug, Clone)]
pub struct FetchedComponent<C> {
    id: String,
    root_path: PathBuf,
    component: C,
}

impl<C: Component> FetchedComponent<C> {
    pub fn new(component: C, root_path: PathBuf) -> Self {
        Self {
            id: component.component_id().to_string(),
            root_path,
            component,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// The last resolved value of the component
    pub fn component(&self) -> &C {
        &self.component
    }

    /// Replaces the stored component value, keeping identity and root.
    pub(crate) fn set_component(&mut self, component: C) {
        self.component = component;
    }
}

/// Brings `component` into its directory below `work_dir`.
///
/// An existing working copy is updated in place when the handler recognizes
/// it, otherwise it is removed and fetched again. The requested version is
/// checked out last.
pub(crate) fn fetch_through_scm<C: Component>(
    registry: &ScmRegistry,
    work_dir: &Path,
    logger: &dyn Log,
    component: &C,
) -> Result<FetchedComponent<C>> {
    let repository = component.repository();
    let handler = registry.handler_for(repository)?;
    let location = repository.location().ok_or_else(|| Error::Repository {
        message: format!("component {} has no location", component.component_id()),
    })?;

    let id = component.component_id();
    let root = component_dir(work_dir, id);
    let wrap = |e: Error| Error::Fetch {
        component: id.to_string(),
        location: location.to_string(),
        message: e.to_string(),
    };

    if root.exists() {
        if handler.matches(location, &root) {
            emit!(logger, Level::Debug, "Updating {} in {}", id, root.display());
            handler
                .update(location, &root, repository.auth())
                .map_err(wrap)?;
        } else {
            emit!(logger, Level::Debug, "Replacing stale copy of {} in {}", id, root.display());
            fs::remove_dir_all(&root).map_err(|e| wrap(e.into()))?;
            handler
                .fetch(location, &root, repository.auth())
                .map_err(wrap)?;
        }
    } else {
        if let Some(parent) = root.parent() {
            fs::create_dir_all(parent)?;
        }
        handler
            .fetch(location, &root, repository.auth())
            .map_err(wrap)?;
    }

    handler
        .switch(&root, repository.reference())
        .map_err(wrap)?;

    emit!(logger, Level::Info, "Fetched {} from {}", id, repository);
    Ok(FetchedComponent::new(component.clone(), root))
}
