//! Shared test utilities for integration and E2E tests.
//!
//! This module provides a fixture building trees of local components
//! (`file://` repositories with a `component.yaml` descriptor) and helpers to
//! resolve them or run the binary against them.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = ComponentFixture::new()
//!         .with_component("base", "vars: {x: 1}")
//!         .with_component("app", "parent: {repository: base}");
//!     let (manager, model) = fixture.resolve("app");
//! }
//! ```

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_fs::prelude::*;

use component_resolver::context::VarsContext;
use component_resolver::descriptor::{YamlComponent, YamlModel};
use component_resolver::manager::ComponentManager;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    pub use super::ComponentFixture;
}

/// A temporary directory holding component sources and a work directory.
///
/// Components live in `sources/<name>`, so a descriptor refers to a sibling
/// component with a plain relative location (`repository: base`).
pub struct ComponentFixture {
    temp_dir: assert_fs::TempDir,
}

impl ComponentFixture {
    /// Create a new fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a component whose descriptor has the given content.
    pub fn with_component(self, name: &str, descriptor: &str) -> Self {
        self.temp_dir
            .child(format!("sources/{}/component.yaml", name))
            .write_str(descriptor)
            .expect("Failed to write descriptor");
        self
    }

    /// Add a component without descriptor.
    pub fn with_bare_component(self, name: &str) -> Self {
        self.temp_dir
            .child(format!("sources/{}", name))
            .create_dir_all()
            .expect("Failed to create component directory");
        self
    }

    /// Add a file to a component.
    pub fn with_file(self, component: &str, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(format!("sources/{}/{}", component, path))
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Source directory of a component.
    pub fn source(&self, name: &str) -> PathBuf {
        self.path().join("sources").join(name)
    }

    pub fn work_dir(&self) -> PathBuf {
        self.path().join("work")
    }

    /// The main component for a source.
    pub fn component(&self, name: &str) -> YamlComponent {
        YamlComponent::main(&self.source(name).to_string_lossy(), "")
            .expect("Failed to create component")
    }

    pub fn manager(&self) -> ComponentManager<YamlComponent> {
        ComponentManager::new(self.work_dir())
    }

    /// Resolve a component with an empty template context.
    pub fn resolve(&self, name: &str) -> (ComponentManager<YamlComponent>, YamlModel) {
        let mut manager = self.manager();
        let model = manager
            .init(&self.component(name), &VarsContext::new())
            .expect("Failed to resolve component");
        (manager, model)
    }

    /// Number of entries directly below the work directory.
    pub fn work_entries(&self) -> usize {
        fs::read_dir(self.work_dir())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    /// Create a command for the binary with the fixture's work directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("component-resolver");
        cmd.current_dir(self.path())
            .env_remove("RUST_LOG")
            .env("COMPONENT_RESOLVER_WORK_DIR", self.work_dir());
        cmd
    }
}

impl Default for ComponentFixture {
    fn default() -> Self {
        Self::new()
    }
}
