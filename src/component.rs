//! # Component Boundaries
//!
//! The resolution engine never parses descriptors, merges configuration or
//! substitutes template expressions itself. It drives four abstractions that
//! a domain implementation provides:
//!
//! - **`ComponentRef`**: a reference to a component by identity.
//! - **`Component`**: a self-describing unit with a `Repository`, able to
//!   parse its own model fragment and its reference graph from the directory
//!   it was materialized into.
//! - **`Model`**: the mergeable configuration aggregate.
//! - **`TemplateContext`**: the substitution engine applied to templated
//!   files.
//!
//! `crate::descriptor` and `crate::context` provide a YAML-based
//! implementation of these traits.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;
use crate::repository::Repository;

/// Environment variables attached to a component reference
pub type EnvVars = BTreeMap<String, String>;

/// A reference to a component through its identity.
pub trait ComponentRef {
    /// The referenced component identity
    fn component_id(&self) -> &str;

    /// Returns false for an empty reference
    fn has_component(&self) -> bool {
        !self.component_id().is_empty()
    }

    /// Typed lookup of the environment variables capability.
    fn as_env_vars_aware(&self) -> Option<&dyn EnvVarsAware> {
        None
    }
}

/// Optional capability of references carrying environment variables.
pub trait EnvVarsAware {
    fn env_vars(&self) -> &EnvVars;
}

/// Plain identity reference, used to query the engine by id.
impl ComponentRef for String {
    fn component_id(&self) -> &str {
        self
    }
}

/// The reference graph declared by a component descriptor.
#[derive(Debug, Clone)]
pub struct ComponentGraph<C> {
    /// The component this one inherits from
    pub parent: Option<C>,
    /// Directly declared references, in declaration order
    pub references: Vec<C>,
}

impl<C> ComponentGraph<C> {
    pub fn new(parent: Option<C>, references: Vec<C>) -> Self {
        Self { parent, references }
    }
}

impl<C> Default for ComponentGraph<C> {
    fn default() -> Self {
        Self {
            parent: None,
            references: Vec::new(),
        }
    }
}

/// A component able to describe itself once materialized on disk.
///
/// The identity returned by `component_id` is the cache key and the
/// directory name of the component; it never changes, including across
/// `resolve`.
pub trait Component: ComponentRef + Clone {
    /// The configuration model this component contributes to
    type Model: Model<Self>;

    /// Where the component content lives
    fn repository(&self) -> &Repository;

    /// Path of the descriptor, relative to the materialized root
    fn descriptor(&self) -> &str;

    /// Patterns of the files and directories to template on use
    fn templates(&self) -> &[String];

    /// Parses the model fragment of this component.
    fn parse_model(&self, root: &Path, ctx: &dyn TemplateContext) -> Result<Self::Model>;

    /// Parses the parent and the declared references of this component.
    fn parse_components(
        &self,
        root: &Path,
        ctx: &dyn TemplateContext,
    ) -> Result<ComponentGraph<Self>>;

    /// Re-resolves this component against a model.
    ///
    /// The model may override the repository or the templates of the
    /// component; the identity of the returned component is unchanged.
    fn resolve(&self, model: &Self::Model) -> Result<Self>;

    /// True if the descriptor exists below `root`
    fn has_descriptor(&self, root: &Path) -> bool {
        !self.descriptor().is_empty() && root.join(self.descriptor()).is_file()
    }
}

/// Mergeable configuration aggregate.
///
/// `Default` is the empty model. Merging is applied in order: values of
/// `other` override the ones of `self` for identical keys.
pub trait Model<C>: Clone + Default {
    fn merge(self, other: Self) -> Result<Self>;

    /// Whether the accumulated configuration needs the given component.
    fn is_referenced(&self, component: &C) -> bool;
}

/// Substitution engine applied to templated component files.
pub trait TemplateContext {
    /// Produces a context scoped to the given component reference.
    fn clone_for(&self, cref: &dyn ComponentRef) -> Box<dyn TemplateContext>;

    /// Substitutes the template expressions found in `content`.
    fn execute(&self, content: &str) -> Result<String>;
}
