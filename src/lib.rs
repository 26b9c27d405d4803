//! # Component Resolver Library
//!
//! This library resolves a tree of source-controlled components into a
//! single merged configuration model and a deterministically ordered set of
//! local working copies, then lets callers search and template files inside
//! them. It is used by the `component-resolver` command-line tool but can be
//! embedded in any application working with layered component repositories.
//!
//! ## Quick Example
//!
//! ```no_run
//! use component_resolver::context::VarsContext;
//! use component_resolver::descriptor::YamlComponent;
//! use component_resolver::manager::ComponentManager;
//!
//! let main = YamlComponent::main("https://github.com/org/app", "main").unwrap();
//! let ctx = VarsContext::new().with_var("env", "prod");
//!
//! let mut manager = ComponentManager::new("/tmp/component-resolver");
//! let model = manager.init(&main, &ctx).unwrap();
//! println!("resolved {:?} with {:?}", manager.order(), model.vars());
//!
//! let found = manager.contains_file("conf/app.yaml", &ctx, &[]);
//! println!("{}", found.join_absolute_paths(":"));
//! found.release();
//! ```
//!
//! ## Core Concepts
//!
//! - **Components (`component`)**: The boundary traits. A `Component` knows
//!   its `Repository` and parses its parent, its declared references and its
//!   model fragment from the directory it was fetched into. A `Model` merges
//!   fragments and tells which components the configuration needs.
//! - **Repositories (`repository`)**: Locations, version references and
//!   credentials, with relative child resolution.
//! - **SCM handlers (`scm`)**: Fetch, update and switch working copies, one
//!   handler per location scheme.
//! - **Resolution (`manager`)**: Discovers the component tree, prunes what
//!   the configuration does not reference, merges the final model and keeps
//!   one working copy per component.
//! - **Templating (`template`, `usable`, `matching`)**: Using a component
//!   with template patterns yields a disposable, substituted copy. Searches
//!   return matching paths that own those copies until released.
//! - **YAML descriptors (`descriptor`, `context`)**: A ready-made
//!   implementation of the boundary traits over `component.yaml` files and
//!   `${VAR}` templates.
//!
//! ## Execution Flow
//!
//! 1.  **Discovery**: Fetch the main component and, recursively, its parents
//!     and the references its configuration needs.
//! 2.  **Pruning**: Drop the candidates the provisional model does not
//!     reference.
//! 3.  **Final merge**: Resolve each remaining candidate against the model
//!     built so far, fetch it if needed and merge its fragment.
//! 4.  **Use**: Template and search the fetched components on demand.

pub mod component;
pub mod context;
pub mod defaults;
pub mod descriptor;
pub mod diagnostics;
pub mod error;
pub mod fetch;
pub mod manager;
pub mod matching;
pub mod path;
pub mod repository;
pub mod scm;
pub mod template;
pub mod usable;

#[cfg(test)]
mod path_proptest;
