//! # Component Manager
//!
//! The `ComponentManager` resolves a main component into a final model and
//! an ordered set of fetched components, then answers containment searches
//! over them.
//!
//! ## Resolution
//!
//! `init` runs in two phases:
//!
//! 1. **Discovery** walks the parent chain of the main component. Each
//!    component is fetched, its descriptor tells its parent and its declared
//!    references, and its model fragment is merged over the one of its
//!    ancestors. A declared reference is discovered recursively (parent
//!    included) when the configuration gathered so far references it;
//!    otherwise it is only listed. The result is a provisional model and a
//!    candidate list ordered ancestors first, then references, then the
//!    component itself.
//!
//! 2. **Final merge** keeps only the candidates the provisional model
//!    references. Each kept candidate is resolved against the final model
//!    built so far, fetched if it was not already, and its fragment merged.
//!    The loop order is the final order. Every cached component, kept or
//!    not, is finally resolved against the completed model.
//!
//! Any fetch, parse or merge failure aborts `init`. Whatever was fetched
//! before the failure stays in the work directory and in the cache.
//!
//! ## Search
//!
//! `contains_file` and `contains_directory` use every candidate (templating
//! it on the way), keep the ones holding the entry and release the others.
//! A candidate that cannot be used is logged and skipped.
//!
//! The manager is not synchronized: `init` needs `&mut self`, searches only
//! need `&self`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::Level;

use crate::component::{Component, ComponentRef, Model, TemplateContext};
use crate::diagnostics::{default_sink, emit, LogSink};
use crate::error::{Error, Result};
use crate::fetch::{fetch_through_scm, FetchedComponent};
use crate::matching::{MatchingPath, MatchingPaths};
use crate::scm::ScmRegistry;
use crate::template::execute_template;
use crate::usable::UsableComponent;

/// Resolves component trees and keeps their working copies.
pub struct ComponentManager<C: Component> {
    work_dir: PathBuf,
    registry: ScmRegistry,
    logger: LogSink,
    fetched: HashMap<String, FetchedComponent<C>>,
    fetch_order: Vec<String>,
    order: Vec<String>,
}

/// Output of the discovery of one component
struct Discovered<C: Component> {
    model: C::Model,
    components: Vec<C>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Directory,
}

impl<C: Component> ComponentManager<C> {
    /// Creates a manager materializing components below `work_dir`.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            registry: ScmRegistry::default(),
            logger: default_sink(),
            fetched: HashMap::new(),
            fetch_order: Vec::new(),
            order: Vec::new(),
        }
    }

    /// Replaces the diagnostics sink.
    pub fn with_logger(mut self, logger: LogSink) -> Self {
        self.logger = logger;
        self
    }

    /// Replaces the scheme to handler table.
    pub fn with_registry(mut self, registry: ScmRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Resolves `main` and returns the final model.
    pub fn init(&mut self, main: &C, ctx: &dyn TemplateContext) -> Result<C::Model> {
        self.order.clear();
        emit!(
            self.logger,
            Level::Info,
            "Resolving component {}",
            main.component_id()
        );

        let discovered = self.find_components(main, ctx, &mut Vec::new())?;
        let provisional = discovered.model;

        let mut model = C::Model::default();
        for candidate in discovered.components {
            if !provisional.is_referenced(&candidate) {
                emit!(
                    self.logger,
                    Level::Debug,
                    "Skipping unreferenced component {}",
                    candidate.component_id()
                );
                continue;
            }

            let resolved = candidate.resolve(&model)?;
            let root = self.fetch_component(&resolved)?.root_path().to_path_buf();
            if resolved.has_descriptor(&root) {
                let fragment = resolved.parse_model(&root, ctx)?;
                model = model
                    .merge(fragment)
                    .map_err(|e| e.in_merge_of(resolved.component_id()))?;
            }
            self.order.push(resolved.component_id().to_string());
        }

        for id in &self.fetch_order {
            if let Some(entry) = self.fetched.get_mut(id) {
                let resolved = entry.component().resolve(&model)?;
                entry.set_component(resolved);
            }
        }

        emit!(
            self.logger,
            Level::Info,
            "Resolved {} component(s): {}",
            self.order.len(),
            self.order.join(", ")
        );
        Ok(model)
    }

    /// Identities of the resolved components, in merge order
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// True if the referenced component has been fetched
    pub fn is_available(&self, cref: &dyn ComponentRef) -> bool {
        self.fetched.contains_key(cref.component_id())
    }

    /// The working copy of a fetched component
    pub fn fetched_root(&self, cref: &dyn ComponentRef) -> Option<&Path> {
        self.fetched
            .get(cref.component_id())
            .map(FetchedComponent::root_path)
    }

    /// The last resolved value of a fetched component
    pub fn component(&self, cref: &dyn ComponentRef) -> Option<&C> {
        self.fetched
            .get(cref.component_id())
            .map(FetchedComponent::component)
    }

    /// Returns a usable view of a fetched component, templated with a
    /// context scoped to `cref` when the component declares templates.
    ///
    /// The caller must release the returned component.
    pub fn use_component(
        &self,
        cref: &dyn ComponentRef,
        ctx: &dyn TemplateContext,
    ) -> Result<Arc<UsableComponent>> {
        let id = cref.component_id();
        let fetched = self.fetched.get(id).ok_or_else(|| Error::NotAvailable {
            component: id.to_string(),
        })?;

        let env_vars = cref
            .as_env_vars_aware()
            .map(|aware| aware.env_vars().clone())
            .unwrap_or_default();

        let templates = fetched.component().templates();
        if !templates.is_empty() {
            let scoped = ctx.clone_for(cref);
            if let Some(copy) = execute_template(fetched.root_path(), templates, &*scoped)? {
                emit!(
                    self.logger,
                    Level::Debug,
                    "Templated {} into {}",
                    id,
                    copy.display()
                );
                return Ok(Arc::new(UsableComponent::templated(
                    id,
                    copy,
                    env_vars,
                    Arc::clone(&self.logger),
                )));
            }
        }

        Ok(Arc::new(UsableComponent::fetched(
            id,
            fetched.root_path().to_path_buf(),
            env_vars,
            Arc::clone(&self.logger),
        )))
    }

    /// Searches a file in the given components, or in every fetched one
    /// when `refs` is empty.
    pub fn contains_file(
        &self,
        name: &str,
        ctx: &dyn TemplateContext,
        refs: &[&dyn ComponentRef],
    ) -> MatchingPaths {
        self.search(name, EntryKind::File, ctx, refs)
    }

    /// Searches a directory in the given components, or in every fetched
    /// one when `refs` is empty.
    pub fn contains_directory(
        &self,
        name: &str,
        ctx: &dyn TemplateContext,
        refs: &[&dyn ComponentRef],
    ) -> MatchingPaths {
        self.search(name, EntryKind::Directory, ctx, refs)
    }

    fn search(
        &self,
        name: &str,
        kind: EntryKind,
        ctx: &dyn TemplateContext,
        refs: &[&dyn ComponentRef],
    ) -> MatchingPaths {
        let candidates: Vec<&dyn ComponentRef> = if refs.is_empty() {
            self.fetch_order
                .iter()
                .filter_map(|id| self.fetched.get(id))
                .map(|entry| entry.component() as &dyn ComponentRef)
                .collect()
        } else {
            refs.to_vec()
        };

        let mut result = MatchingPaths::default();
        for cref in candidates {
            let usable = match self.use_component(cref, ctx) {
                Ok(usable) => usable,
                Err(e) if e.is_not_available() => {
                    emit!(
                        self.logger,
                        Level::Debug,
                        "Skipping component {} in search for {}: not fetched",
                        cref.component_id(),
                        name
                    );
                    continue;
                }
                Err(e) => {
                    emit!(
                        self.logger,
                        Level::Warn,
                        "Skipping component {} in search for {}: {}",
                        cref.component_id(),
                        name,
                        e
                    );
                    continue;
                }
            };

            let hit: Option<MatchingPath> = match kind {
                EntryKind::File => usable.contains_file(name),
                EntryKind::Directory => usable.contains_directory(name),
            };
            match hit {
                Some(path) => result.push(path),
                None => usable.release(),
            }
        }
        result
    }

    /// Fetches a component once per identity.
    fn fetch_component(&mut self, component: &C) -> Result<&FetchedComponent<C>> {
        let id = component.component_id().to_string();
        if !self.fetched.contains_key(&id) {
            let entry =
                fetch_through_scm(&self.registry, &self.work_dir, &*self.logger, component)?;
            self.fetched.insert(id.clone(), entry);
            self.fetch_order.push(id.clone());
        }
        self.fetched.get(&id).ok_or(Error::NotAvailable { component: id })
    }

    /// Discovers `component`, its ancestors and the references its
    /// configuration needs.
    fn find_components(
        &mut self,
        component: &C,
        ctx: &dyn TemplateContext,
        visiting: &mut Vec<String>,
    ) -> Result<Discovered<C>> {
        let id = component.component_id().to_string();
        if let Some(start) = visiting.iter().position(|v| *v == id) {
            let mut cycle: Vec<&str> = visiting[start..].iter().map(String::as_str).collect();
            cycle.push(&id);
            return Err(Error::CycleDetected {
                cycle: cycle.join(" -> "),
            });
        }

        visiting.push(id.clone());
        let discovered = self.discover(component, ctx, visiting);
        visiting.pop();
        discovered
    }

    fn discover(
        &mut self,
        component: &C,
        ctx: &dyn TemplateContext,
        visiting: &mut Vec<String>,
    ) -> Result<Discovered<C>> {
        let root = self.fetch_component(component)?.root_path().to_path_buf();
        if !component.has_descriptor(&root) {
            emit!(
                self.logger,
                Level::Debug,
                "Component {} has no descriptor {}",
                component.component_id(),
                component.descriptor()
            );
            return Ok(Discovered {
                model: C::Model::default(),
                components: vec![component.clone()],
            });
        }

        let graph = component.parse_components(&root, ctx)?;
        let mut discovered = match &graph.parent {
            Some(parent) => {
                emit!(
                    self.logger,
                    Level::Debug,
                    "Component {} extends {}",
                    component.component_id(),
                    parent.component_id()
                );
                self.find_components(parent, ctx, visiting)?
            }
            None => Discovered {
                model: C::Model::default(),
                components: Vec::new(),
            },
        };

        let own = component.parse_model(&root, ctx)?;

        for reference in graph.references {
            let ref_id = reference.component_id();
            if contains_id(&discovered.components, ref_id) {
                continue;
            }

            let provisional = discovered
                .model
                .clone()
                .merge(own.clone())
                .map_err(|e| e.in_merge_of(component.component_id()))?;
            if !provisional.is_referenced(&reference) {
                if !visiting.iter().any(|v| v == ref_id) {
                    discovered.components.push(reference);
                }
                continue;
            }

            emit!(
                self.logger,
                Level::Debug,
                "Component {} references {}",
                component.component_id(),
                ref_id
            );
            let expanded = self.find_components(&reference, ctx, visiting)?;
            discovered.model = discovered
                .model
                .merge(expanded.model)
                .map_err(|e| e.in_merge_of(ref_id))?;
            for c in expanded.components {
                if !contains_id(&discovered.components, c.component_id()) {
                    discovered.components.push(c);
                }
            }
        }

        discovered.model = discovered
            .model
            .merge(own)
            .map_err(|e| e.in_merge_of(component.component_id()))?;
        if !contains_id(&discovered.components, component.component_id()) {
            discovered.components.push(component.clone());
        }
        Ok(discovered)
    }
}

fn contains_id<C: ComponentRef>(components: &[C], id: &str) -> bool {
    components.iter().any(|c| c.component_id() == id)
}

impl<C: Component> std::fmt::Debug for ComponentManager<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentManager")
            .field("work_dir", &self.work_dir)
            .field("registry", &self.registry)
            .field("fetched", &self.fetch_order)
            .field("order", &self.order)
            .finish()
    }
}
