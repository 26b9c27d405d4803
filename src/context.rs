//! `${VAR}` substitution context for templated component files

use std::collections::BTreeMap;

use regex::{Captures, Regex};

use crate::component::{ComponentRef, TemplateContext};
use crate::error::{Error, Result};

/// Variable names: letters, digits, `_`, `.` and `-`
const VARIABLE_PATTERN: &str = r"\$\{([A-Za-z0-9_.\-]+)(?::-([^}]*))?\}";

/// Variable holding the id of the component being templated
pub const COMPONENT_ID_VAR: &str = "component.id";

/// Substitutes `${NAME}` and `${NAME:-default}` expressions.
///
/// An undefined variable without default is an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VarsContext {
    vars: BTreeMap<String, String>,
}

impl VarsContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Adds every variable of `vars`, replacing existing ones.
    pub fn extend<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.vars
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

impl TemplateContext for VarsContext {
    fn clone_for(&self, cref: &dyn ComponentRef) -> Box<dyn TemplateContext> {
        let mut scoped = self.clone();
        scoped
            .vars
            .insert(COMPONENT_ID_VAR.to_string(), cref.component_id().to_string());
        if let Some(aware) = cref.as_env_vars_aware() {
            scoped.extend(aware.env_vars().clone());
        }
        Box::new(scoped)
    }

    fn execute(&self, content: &str) -> Result<String> {
        let regex = Regex::new(VARIABLE_PATTERN).map_err(Error::Regex)?;

        let mut missing: Option<String> = None;
        let rendered = regex.replace_all(content, |caps: &Captures| {
            let name = &caps[1];
            match (self.vars.get(name), caps.get(2)) {
                (Some(value), _) => value.clone(),
                (None, Some(default)) => default.as_str().to_string(),
                (None, None) => {
                    missing.get_or_insert_with(|| name.to_string());
                    String::new()
                }
            }
        });

        match missing {
            Some(variable) => Err(Error::Template {
                message: format!("undefined variable '{}'", variable),
                variable: Some(variable),
            }),
            None => Ok(rendered.into_owned()),
        }
    }
}
