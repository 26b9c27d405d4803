//! # Component Repositories
//!
//! A `Repository` is the source location of one component: an absolute,
//! URL-like location, an optional version reference (branch, tag or commit)
//! and a credential map handed to the SCM handler that fetches it.
//!
//! Repositories are plain values. Two operations give them their semantics:
//!
//! - **`merge`** overrides the receiver in place with the non-empty fields of
//!   another repository. Credential keys of the override always win.
//! - **`create_child_repository`** resolves a location declared inside a
//!   component against that component's own location, the same way a
//!   relative link is resolved against the page that contains it. A child
//!   location starting with `/` replaces the parent path outright.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use url::Url;

use crate::error::{Error, Result};

/// Credentials passed to SCM handlers (e.g. `user`, `password`, `token`)
pub type Credentials = BTreeMap<String, String>;

/// The source location of a component
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Repository {
    location: Option<Url>,
    reference: String,
    auth: Credentials,
}

impl Repository {
    /// Creates a repository from an absolute location.
    ///
    /// The location is either a URL (`https://host/org/repo`,
    /// `file:///srv/components/base`) or an absolute filesystem path, which
    /// is converted to a `file://` URL. An empty `reference` selects the
    /// default branch of the repository.
    pub fn create(location: &str, reference: &str, auth: Credentials) -> Result<Self> {
        let location = parse_location(location)?;
        Ok(Self {
            location: Some(location),
            reference: reference.to_string(),
            auth,
        })
    }

    /// Creates a repository without location, used to override only the
    /// reference and credentials of another one through `merge`.
    pub fn unlocated(reference: &str, auth: Credentials) -> Self {
        Self {
            location: None,
            reference: reference.to_string(),
            auth,
        }
    }

    /// Creates the repository of a component declared by the component
    /// owning `self`.
    ///
    /// Absolute child locations are used as-is. Relative ones are joined
    /// against the directory of this repository's location, so `../b/c`
    /// declared in `git://host/group/a` resolves to `git://host/b/c`. A
    /// relative location starting with `/` keeps this repository's scheme and
    /// host but replaces its whole path.
    pub fn create_child_repository(
        &self,
        location: &str,
        reference: &str,
        auth: Credentials,
    ) -> Result<Self> {
        let resolved = match Url::parse(location) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.location {
                Some(base) if location.starts_with('/') => {
                    let mut url = base.clone();
                    url.set_path(location);
                    url.set_query(None);
                    url.set_fragment(None);
                    url
                }
                Some(base) => base.join(location)?,
                None => parse_location(location)?,
            },
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            location: Some(resolved),
            reference: reference.to_string(),
            auth,
        })
    }

    /// Overrides this repository with the non-empty fields of `with`.
    pub fn merge(&mut self, with: &Repository) {
        if let Some(location) = &with.location {
            if !location.path().is_empty() {
                self.location = Some(location.clone());
            }
        }
        if !with.reference.is_empty() {
            self.reference = with.reference.clone();
        }
        for (key, value) in &with.auth {
            self.auth.insert(key.clone(), value.clone());
        }
    }

    /// The absolute location, if one was ever assigned
    pub fn location(&self) -> Option<&Url> {
        self.location.as_ref()
    }

    /// The location scheme (`file`, `git`, `https`, ...)
    pub fn scheme(&self) -> Option<&str> {
        self.location.as_ref().map(Url::scheme)
    }

    /// The version reference; empty means the default branch
    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn auth(&self) -> &Credentials {
        &self.auth
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{}@{}", location, self.reference),
            None => Ok(()),
        }
    }
}

fn parse_location(location: &str) -> Result<Url> {
    match Url::parse(location) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) if Path::new(location).is_absolute() => {
            Url::from_file_path(location).map_err(|_| Error::Repository {
                message: format!("invalid file location: {}", location),
            })
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => Err(Error::Repository {
            message: format!(
                "location '{}' is relative and has no parent to resolve against",
                location
            ),
        }),
        Err(e) => Err(e.into()),
    }
}
