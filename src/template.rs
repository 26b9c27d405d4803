//! # Templating Engine
//!
//! Templating never touches a fetched component in place. When at least one
//! entry of the component root matches a template pattern, the whole root is
//! copied to a sibling directory named `<root>_<suffix>` and only the matched
//! files of the copy are rewritten through the `TemplateContext`.
//!
//! Patterns are relative to the component root. A pattern is either a
//! literal path (`conf/app.yaml`, `conf`) or a glob (`conf/*.tpl`,
//! `**/*.tpl`). A matched directory templates every file below it.
//!
//! The suffix is a UUIDv7: time-ordered and unique, so concurrent uses of
//! the same component never share a copy. Removing the copy is the caller's
//! job (see `UsableComponent::release`).

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

use crate::component::TemplateContext;
use crate::error::{Error, Result};
use crate::path::{compile_rooted_pattern, templated_dir, TEMPLATE_MATCH_OPTIONS};
use crate::scm::file::copy_dir;

/// Templates the entries of `root` matched by `patterns`.
///
/// Returns the root of the templated copy, or `None` when nothing was
/// templated: either no pattern was given or no entry matched.
pub fn execute_template(
    root: &Path,
    patterns: &[String],
    ctx: &dyn TemplateContext,
) -> Result<Option<PathBuf>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let matched = find_template_files(root, patterns)?;
    if matched.is_empty() {
        return Ok(None);
    }

    let suffix = uuid::Uuid::now_v7().simple().to_string();
    let target = templated_dir(root, &suffix);
    copy_dir(root, &target)?;

    if let Err(e) = render_files(&target, &matched, ctx) {
        // A half-rendered copy is never handed out
        let _ = fs::remove_dir_all(&target);
        return Err(e);
    }

    Ok(Some(target))
}

fn render_files(
    target: &Path,
    files: &BTreeSet<PathBuf>,
    ctx: &dyn TemplateContext,
) -> Result<()> {
    for relative in files {
        let path = target.join(relative);
        let content = fs::read_to_string(&path).map_err(|e| Error::Template {
            message: format!("cannot read {}: {}", relative.display(), e),
            variable: None,
        })?;
        let rendered = ctx.execute(&content)?;
        fs::write(&path, rendered)?;
    }
    Ok(())
}

/// Lists the files below `root` to template, relative to `root`, sorted.
pub fn find_template_files(root: &Path, patterns: &[String]) -> Result<BTreeSet<PathBuf>> {
    let literals: Vec<PathBuf> = patterns
        .iter()
        .map(|p| root.join(p.trim_start_matches('/')))
        .collect();
    let globs: Vec<Pattern> = patterns
        .iter()
        .map(|p| compile_rooted_pattern(root, p))
        .collect::<Result<_>>()?;

    let mut matched = BTreeSet::new();
    let mut walker = WalkDir::new(root).min_depth(1).follow_links(true).into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry?;
        let path = entry.path();
        let is_match = literals.iter().any(|l| l == path)
            || globs
                .iter()
                .any(|g| g.matches_path_with(path, TEMPLATE_MATCH_OPTIONS));
        if !is_match {
            continue;
        }

        if entry.file_type().is_dir() {
            for inner in WalkDir::new(path).min_depth(1).follow_links(true) {
                let inner = inner?;
                if inner.file_type().is_file() {
                    matched.insert(relative_to(root, inner.path())?);
                }
            }
            walker.skip_current_dir();
        } else {
            matched.insert(relative_to(root, path)?);
        }
    }

    Ok(matched)
}

fn relative_to(root: &Path, path: &Path) -> Result<PathBuf> {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .map_err(|e| Error::Io(std::io::Error::other(e)))
}
