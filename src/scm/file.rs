//! Copy-based handler for `file://` component locations

use std::fs;
use std::io;
use std::path::Path;

use url::Url;
use walkdir::WalkDir;

use super::ScmHandler;
use crate::error::{Error, Result};
use crate::repository::Credentials;

/// Fetches local directories by copying them.
///
/// Plain directories carry no revision marker, so an existing copy never
/// matches and is always replaced by a fresh one.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileScmHandler;

impl ScmHandler for FileScmHandler {
    fn matches(&self, _location: &Url, _path: &Path) -> bool {
        false
    }

    fn fetch(&self, location: &Url, path: &Path, _auth: &Credentials) -> Result<()> {
        let source = location.to_file_path().map_err(|_| Error::Repository {
            message: format!("not a local directory location: {}", location),
        })?;
        copy_dir(&source, path)
    }

    fn update(&self, _location: &Url, _path: &Path, _auth: &Credentials) -> Result<()> {
        Ok(())
    }

    fn switch(&self, _path: &Path, _reference: &str) -> Result<()> {
        Ok(())
    }
}

/// Recursively copies `src` into `dst`, creating `dst` if needed.
///
/// Symbolic links are followed and their targets copied.
pub(crate) fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    if !src.is_dir() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("source directory not found: {}", src.display()),
        )));
    }

    fs::create_dir_all(dst)?;

    for entry in WalkDir::new(src).min_depth(1).follow_links(true) {
        let entry = entry?;
        let relative = entry.path().strip_prefix(src).map_err(io::Error::other)?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}
