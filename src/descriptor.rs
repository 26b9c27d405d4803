//! # YAML Component Descriptors
//!
//! A reference implementation of [`Component`] and [`Model`] over YAML
//! descriptor files (`component.yaml` by default):
//!
//! ```yaml
//! parent:
//!   repository: base
//!   ref: main
//! components:
//!   helper:
//!     repository: https://host/org/helper
//!     ref: v1
//!     templates: ["conf/*.tpl"]
//!     env: {REGION: eu}
//!     auth: {user: u, password: p}
//! uses: [helper]
//! vars:
//!   region: eu
//! ```
//!
//! - `parent` names the component this one extends. Its id is the `id` key,
//!   or the last path segment of its repository (`.git` stripped).
//! - `components` declares references, in order. The key is the component
//!   id. A declaration without `repository` only overrides the reference,
//!   credentials, templates or env of a component declared elsewhere.
//! - `uses` lists the ids this configuration needs. A descriptor always
//!   needs its own component and its parent.
//! - `vars` are template variables. Later descriptors override earlier ones.
//!
//! Relative repository locations are resolved against the repository of the
//! component holding the descriptor, the way a relative link is resolved
//! against its page: `base` declared in `file:///srv/app` is
//! `file:///srv/base`.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::component::{
    Component, ComponentGraph, ComponentRef, EnvVars, EnvVarsAware, Model, TemplateContext,
};
use crate::defaults::DEFAULT_DESCRIPTOR;
use crate::error::{Error, Result};
use crate::repository::{Credentials, Repository};

/// Raw content of a descriptor file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Descriptor {
    #[serde(default)]
    pub parent: Option<Declaration>,

    /// Declared references; a mapping keeps declaration order
    #[serde(default)]
    pub components: Mapping,

    #[serde(default)]
    pub uses: Vec<String>,

    #[serde(default)]
    pub vars: BTreeMap<String, Value>,
}

/// Declaration of a component inside a descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    /// Only used for the parent, whose id is otherwise derived
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub repository: Option<String>,

    #[serde(default, rename = "ref")]
    pub reference: Option<String>,

    /// Descriptor file of the declared component
    #[serde(default)]
    pub descriptor: Option<String>,

    #[serde(default)]
    pub templates: Option<Vec<String>>,

    #[serde(default)]
    pub env: EnvVars,

    #[serde(default)]
    pub auth: Credentials,
}

/// Late-bound overrides of one component, accumulated in a `YamlModel`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentOverride {
    pub repository: Repository,
    pub templates: Option<Vec<String>>,
    pub env: EnvVars,
}

impl ComponentOverride {
    fn merge(&mut self, other: ComponentOverride) {
        self.repository.merge(&other.repository);
        if other.templates.is_some() {
            self.templates = other.templates;
        }
        self.env.extend(other.env);
    }
}

/// Configuration merged from YAML descriptors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YamlModel {
    vars: BTreeMap<String, Value>,
    components: BTreeMap<String, ComponentOverride>,
    referenced: BTreeSet<String>,
}

impl YamlModel {
    pub fn vars(&self) -> &BTreeMap<String, Value> {
        &self.vars
    }

    /// Template variables rendered as strings; sequences and mappings are
    /// rendered as YAML.
    pub fn string_vars(&self) -> BTreeMap<String, String> {
        self.vars
            .iter()
            .map(|(k, v)| (k.clone(), value_to_string(v)))
            .collect()
    }

    pub fn component_override(&self, id: &str) -> Option<&ComponentOverride> {
        self.components.get(id)
    }

    pub fn referenced(&self) -> &BTreeSet<String> {
        &self.referenced
    }
}

impl Model<YamlComponent> for YamlModel {
    fn merge(mut self, other: Self) -> Result<Self> {
        self.vars.extend(other.vars);
        for (id, decl) in other.components {
            match self.components.get_mut(&id) {
                Some(existing) => existing.merge(decl),
                None => {
                    self.components.insert(id, decl);
                }
            }
        }
        self.referenced.extend(other.referenced);
        Ok(self)
    }

    fn is_referenced(&self, component: &YamlComponent) -> bool {
        self.referenced.contains(component.component_id())
    }
}

/// A component described by a YAML descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct YamlComponent {
    id: String,
    repository: Repository,
    descriptor: String,
    templates: Vec<String>,
    env_vars: EnvVars,
}

impl YamlComponent {
    pub fn new(id: impl Into<String>, repository: Repository) -> Self {
        Self {
            id: id.into(),
            repository,
            descriptor: DEFAULT_DESCRIPTOR.to_string(),
            templates: Vec::new(),
            env_vars: EnvVars::new(),
        }
    }

    /// Creates the main component of a resolution from its location.
    ///
    /// The id is the last path segment of the location.
    pub fn main(location: &str, reference: &str) -> Result<Self> {
        let repository = Repository::create(location, reference, Credentials::new())?;
        let id = id_from_repository(&repository).ok_or_else(|| Error::Repository {
            message: format!("cannot derive a component id from '{}'", location),
        })?;
        Ok(Self::new(id, repository))
    }

    pub fn with_descriptor(mut self, descriptor: impl Into<String>) -> Self {
        self.descriptor = descriptor.into();
        self
    }

    pub fn with_templates(mut self, templates: Vec<String>) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_env_vars(mut self, env_vars: EnvVars) -> Self {
        self.env_vars = env_vars;
        self
    }

    /// Reads and parses the descriptor below `root`.
    pub fn read_descriptor(&self, root: &Path) -> Result<Descriptor> {
        let path = root.join(&self.descriptor);
        let content = fs::read_to_string(&path).map_err(|e| Error::Parse {
            component: self.id.clone(),
            message: format!("cannot read {}: {}", path.display(), e),
            hint: None,
        })?;
        if content.trim().is_empty() {
            return Ok(Descriptor::default());
        }
        serde_yaml::from_str(&content).map_err(|e| Error::Parse {
            component: self.id.clone(),
            message: e.to_string(),
            hint: Some(format!(
                "{} must be a mapping with optional parent, components, uses and vars keys",
                self.descriptor
            )),
        })
    }

    /// Builds the repository override of a declaration made by this
    /// component.
    fn declared_override(&self, decl: &Declaration) -> Result<ComponentOverride> {
        let reference = decl.reference.as_deref().unwrap_or_default();
        let repository = match &decl.repository {
            Some(location) => {
                self.repository
                    .create_child_repository(location, reference, decl.auth.clone())?
            }
            None => Repository::unlocated(reference, decl.auth.clone()),
        };
        Ok(ComponentOverride {
            repository,
            templates: decl.templates.clone(),
            env: decl.env.clone(),
        })
    }

    /// Builds a component declared by this one.
    fn declared_component(&self, id: Option<&str>, decl: &Declaration) -> Result<YamlComponent> {
        let over = self.declared_override(decl)?;
        if over.repository.location().is_none() {
            return Err(Error::Parse {
                component: self.id.clone(),
                message: format!(
                    "component {} is declared without repository",
                    id.unwrap_or("parent")
                ),
                hint: Some("add a 'repository' key to the declaration".to_string()),
            });
        }

        let id = match id.map(str::to_string).or_else(|| decl.id.clone()) {
            Some(id) => id,
            None => id_from_repository(&over.repository).ok_or_else(|| Error::Parse {
                component: self.id.clone(),
                message: format!("cannot derive an id for {}", over.repository),
                hint: Some("add an 'id' key to the declaration".to_string()),
            })?,
        };

        Ok(YamlComponent {
            id,
            repository: over.repository,
            descriptor: decl
                .descriptor
                .clone()
                .unwrap_or_else(|| DEFAULT_DESCRIPTOR.to_string()),
            templates: over.templates.unwrap_or_default(),
            env_vars: over.env,
        })
    }

    fn parent_component(&self, descriptor: &Descriptor) -> Result<Option<YamlComponent>> {
        descriptor
            .parent
            .as_ref()
            .map(|decl| self.declared_component(None, decl))
            .transpose()
    }

    fn declarations(&self, descriptor: &Descriptor) -> Result<Vec<(String, Declaration)>> {
        descriptor
            .components
            .iter()
            .map(|(key, value)| {
                let id = key.as_str().ok_or_else(|| Error::Parse {
                    component: self.id.clone(),
                    message: format!("component key {:?} is not a string", key),
                    hint: None,
                })?;
                let decl: Declaration = if value.is_null() {
                    Declaration::default()
                } else {
                    serde_yaml::from_value(value.clone()).map_err(|e| Error::Parse {
                        component: self.id.clone(),
                        message: format!("invalid declaration of {}: {}", id, e),
                        hint: None,
                    })?
                };
                Ok((id.to_string(), decl))
            })
            .collect()
    }
}

impl ComponentRef for YamlComponent {
    fn component_id(&self) -> &str {
        &self.id
    }

    fn as_env_vars_aware(&self) -> Option<&dyn EnvVarsAware> {
        Some(self)
    }
}

impl EnvVarsAware for YamlComponent {
    fn env_vars(&self) -> &EnvVars {
        &self.env_vars
    }
}

impl Component for YamlComponent {
    type Model = YamlModel;

    fn repository(&self) -> &Repository {
        &self.repository
    }

    fn descriptor(&self) -> &str {
        &self.descriptor
    }

    fn templates(&self) -> &[String] {
        &self.templates
    }

    fn parse_model(&self, root: &Path, _ctx: &dyn TemplateContext) -> Result<YamlModel> {
        let descriptor = self.read_descriptor(root)?;

        let mut model = YamlModel {
            vars: descriptor.vars.clone(),
            ..Default::default()
        };
        model.referenced.insert(self.id.clone());
        if let Some(parent) = self.parent_component(&descriptor)? {
            model.referenced.insert(parent.id);
        }
        model.referenced.extend(descriptor.uses.iter().cloned());

        for (id, decl) in self.declarations(&descriptor)? {
            let over = self.declared_override(&decl)?;
            model.components.insert(id, over);
        }
        Ok(model)
    }

    fn parse_components(
        &self,
        root: &Path,
        _ctx: &dyn TemplateContext,
    ) -> Result<ComponentGraph<Self>> {
        let descriptor = self.read_descriptor(root)?;
        let parent = self.parent_component(&descriptor)?;
        let references = self
            .declarations(&descriptor)?
            .into_iter()
            .filter(|(_, decl)| decl.repository.is_some())
            .map(|(id, decl)| self.declared_component(Some(id.as_str()), &decl))
            .collect::<Result<Vec<_>>>()?;
        Ok(ComponentGraph::new(parent, references))
    }

    fn resolve(&self, model: &YamlModel) -> Result<Self> {
        let Some(over) = model.component_override(&self.id) else {
            return Ok(self.clone());
        };

        let mut resolved = self.clone();
        resolved.repository.merge(&over.repository);
        if let Some(templates) = &over.templates {
            resolved.templates = templates.clone();
        }
        resolved
            .env_vars
            .extend(over.env.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(resolved)
    }
}

/// Derives a component id from the last path segment of a location.
pub fn id_from_repository(repository: &Repository) -> Option<String> {
    let location = repository.location()?;
    let segment = location
        .path_segments()?
        .filter(|s| !s.is_empty())
        .last()?;
    let id = segment.strip_suffix(".git").unwrap_or(segment);
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
