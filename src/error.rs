//! # Error Handling
//!
//! This module defines the centralized error type for component resolution.
//! It uses the `thiserror` library to build a single `Error` enum covering
//! every failure the resolution engine, the fetch layer, the templating
//! engine and the reference descriptor implementation can produce.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Each variant carries the component identity
//!   or location it relates to so that a failed `init` can be traced back to
//!   the component that broke it.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Failures fall into two groups:
//!
//! - Fatal failures (unsupported scheme, fetch, parse, merge, template
//!   execution, cycles) abort the call that triggered them.
//! - `NotAvailable` is local: a containment search treats it as "no match".
//!
//! Cleanup failures of ephemeral template copies are never represented here;
//! they are only logged.

use thiserror::Error;

/// Main error type for component resolution
#[derive(Error, Debug)]
pub enum Error {
    /// The location scheme of a repository has no registered SCM handler.
    #[error("Unsupported SCM scheme '{scheme}' for {location}")]
    UnsupportedScheme { scheme: String, location: String },

    /// An SCM handler failed to fetch, update or switch a component.
    #[error("Fetch error for component {component} ({location}): {message}")]
    Fetch {
        component: String,
        location: String,
        message: String,
    },

    /// An error occurred while executing a Git command.
    #[error("Git command failed for {location}: {command} - {stderr}")]
    GitCommand {
        command: String,
        location: String,
        stderr: String,
    },

    /// A component failed to parse its descriptor (model or references).
    #[error("Parse error in component {component}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Parse {
        component: String,
        message: String,
        /// Optional hint for how to fix the descriptor
        hint: Option<String>,
    },

    /// The model rejected the merge of a component fragment.
    #[error("Model merge error for component {component}: {message}")]
    Merge { component: String, message: String },

    /// An error occurred during template processing.
    ///
    /// May include the name of the problematic variable when applicable.
    #[error("Template processing error: {message}{}", variable.as_ref().map(|v| format!(" (variable: {})", v)).unwrap_or_default())]
    Template {
        message: String,
        /// The template variable that caused the error, if applicable
        variable: Option<String>,
    },

    /// A component was used before being fetched by the engine.
    #[error("Component {component} is not available")]
    NotAvailable { component: String },

    /// A component is reachable from itself through its parents or references.
    #[error("Cycle detected in component references: {cycle}")]
    CycleDetected { cycle: String },

    /// A repository location could not be built.
    #[error("Repository error: {message}")]
    Repository { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// A directory walk error, wrapped from `walkdir::Error`.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl Error {
    /// Returns true for errors a containment search may skip over.
    pub fn is_not_available(&self) -> bool {
        matches!(self, Error::NotAvailable { .. })
    }

    /// Attributes a failed model merge to `component`.
    ///
    /// A `Merge` error that already names its component is kept as-is.
    pub fn in_merge_of(self, component: &str) -> Error {
        match self {
            Error::Merge {
                component: named,
                message,
            } if named.is_empty() => Error::Merge {
                component: component.to_string(),
                message,
            },
            Error::Merge { .. } => self,
            other => Error::Merge {
                component: component.to_string(),
                message: other.to_string(),
            },
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unsupported_scheme() {
        let error = Error::UnsupportedScheme {
            scheme: "svn".to_string(),
            location: "svn://host/repo".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Unsupported SCM scheme"));
        assert!(display.contains("'svn'"));
        assert!(display.contains("svn://host/repo"));
    }

    #[test]
    fn test_error_display_fetch() {
        let error = Error::Fetch {
            component: "core".to_string(),
            location: "https://github.com/test/core".to_string(),
            message: "Authentication failed".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Fetch error"));
        assert!(display.contains("core"));
        assert!(display.contains("Authentication failed"));
    }

    #[test]
    fn test_error_display_git_command() {
        let error = Error::GitCommand {
            command: "checkout v1".to_string(),
            location: "https://github.com/test/repo.git".to_string(),
            stderr: "pathspec 'v1' did not match".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Git command failed"));
        assert!(display.contains("checkout v1"));
        assert!(display.contains("did not match"));
    }

    #[test]
    fn test_error_display_parse_with_hint() {
        let error = Error::Parse {
            component: "main".to_string(),
            message: "missing repository".to_string(),
            hint: Some("Add 'repository:' to the parent block".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("Parse error in component main"));
        assert!(display.contains("hint:"));
        assert!(display.contains("Add 'repository:'"));
    }

    #[test]
    fn test_error_display_parse_without_hint() {
        let error = Error::Parse {
            component: "main".to_string(),
            message: "bad yaml".to_string(),
            hint: None,
        };
        assert!(!format!("{}", error).contains("hint:"));
    }

    #[test]
    fn test_error_display_template_with_variable() {
        let error = Error::Template {
            message: "Undefined variable".to_string(),
            variable: Some("HOST".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("Template processing error"));
        assert!(display.contains("(variable: HOST)"));
    }

    #[test]
    fn test_error_display_cycle_detected() {
        let error = Error::CycleDetected {
            cycle: "a -> b -> a".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Cycle detected"));
        assert!(display.contains("a -> b -> a"));
    }

    #[test]
    fn test_not_available_is_flagged() {
        let error = Error::NotAvailable {
            component: "ghost".to_string(),
        };
        assert!(error.is_not_available());
        assert!(format!("{}", error).contains("ghost"));

        let other = Error::Merge {
            component: "x".to_string(),
            message: "conflict".to_string(),
        };
        assert!(!other.is_not_available());
    }

    #[test]
    fn test_in_merge_of_names_the_component() {
        let anonymous = Error::Merge {
            component: String::new(),
            message: "conflict".to_string(),
        };
        match anonymous.in_merge_of("core") {
            Error::Merge { component, message } => {
                assert_eq!(component, "core");
                assert_eq!(message, "conflict");
            }
            other => panic!("unexpected error: {}", other),
        }

        let named = Error::Merge {
            component: "lib".to_string(),
            message: "conflict".to_string(),
        };
        assert!(named.in_merge_of("core").to_string().contains("component lib"));

        let wrapped = Error::Repository {
            message: "duplicate key".to_string(),
        }
        .in_merge_of("core");
        let display = wrapped.to_string();
        assert!(display.contains("component core"));
        assert!(display.contains("duplicate key"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }

    #[test]
    fn test_error_from_yaml_error() {
        let yaml_error =
            serde_yaml::from_str::<serde_yaml::Value>("invalid: [unclosed").unwrap_err();
        let error: Error = yaml_error.into();
        assert!(format!("{}", error).contains("YAML parsing error"));
    }

    #[test]
    fn test_error_from_url_error() {
        let url_error = url::Url::parse("not a url").unwrap_err();
        let error: Error = url_error.into();
        assert!(format!("{}", error).contains("URL parsing error"));
    }
}
