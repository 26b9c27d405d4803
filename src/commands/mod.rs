//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `component-resolver` command-line tool. Each subcommand is defined in its
//! own file to keep the logic separated and maintainable.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`. Both commands flatten [`ComponentArgs`], which
//!   selects the main component and the work directory.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic, calling into the `component_resolver` library.

pub mod find;
pub mod resolve;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use url::Url;

use component_resolver::context::VarsContext;
use component_resolver::defaults::{default_work_dir, DEFAULT_DESCRIPTOR, WORK_DIR_ENV};
use component_resolver::descriptor::{YamlComponent, YamlModel};
use component_resolver::manager::ComponentManager;

/// Arguments selecting the main component of a resolution
#[derive(Args, Debug)]
pub struct ComponentArgs {
    /// Location of the main component: a URL or a local directory.
    #[arg(value_name = "LOCATION")]
    pub location: String,

    /// Branch, tag or commit of the main component.
    #[arg(long = "ref", value_name = "REF", default_value = "")]
    pub reference: String,

    /// Descriptor file of the main component, relative to its root.
    #[arg(long, value_name = "FILE", default_value = DEFAULT_DESCRIPTOR)]
    pub descriptor: String,

    /// The directory components are fetched into.
    ///
    /// Defaults to the system cache directory (`~/.cache/component-resolver`
    /// on Linux, `~/Library/Caches/component-resolver` on macOS).
    #[arg(long, value_name = "DIR", env = WORK_DIR_ENV)]
    pub work_dir: Option<PathBuf>,

    /// Template variable, overriding the `vars` of the descriptors. Repeatable.
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,
}

impl ComponentArgs {
    /// Builds the main component, turning local paths into absolute ones.
    pub fn main_component(&self) -> Result<YamlComponent> {
        let location = if Url::parse(&self.location).is_ok() {
            self.location.clone()
        } else {
            let path = Path::new(&self.location);
            path.canonicalize()
                .with_context(|| format!("Component directory not found: {}", path.display()))?
                .to_string_lossy()
                .into_owned()
        };

        let main = YamlComponent::main(&location, &self.reference)
            .with_context(|| format!("Invalid component location '{}'", self.location))?;
        Ok(main.with_descriptor(self.descriptor.clone()))
    }

    /// Template context of the command line variables
    pub fn context(&self) -> VarsContext {
        let mut ctx = VarsContext::new();
        ctx.extend(self.vars.iter().cloned());
        ctx
    }

    /// Template context of the resolved model, overridden by the command line
    pub fn model_context(&self, model: &YamlModel) -> VarsContext {
        let mut ctx = VarsContext::new();
        ctx.extend(model.string_vars());
        ctx.extend(self.vars.iter().cloned());
        ctx
    }

    /// Resolves the main component.
    pub fn resolve(&self) -> Result<(ComponentManager<YamlComponent>, YamlModel)> {
        let main = self.main_component()?;
        let work_dir = self.work_dir.clone().unwrap_or_else(default_work_dir);

        let mut manager = ComponentManager::new(work_dir);
        let model = manager
            .init(&main, &self.context())
            .with_context(|| format!("Failed to resolve component {}", self.location))?;
        Ok((manager, model))
    }
}

fn parse_var(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}
