//! Path helpers shared by the fetch cache, searches and the templating engine

use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::Result;

/// Glob options used for template patterns: `*` stops at `/`, `**` does not.
pub const TEMPLATE_MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Compile a pattern relative to `root` into an absolute glob.
///
/// The root itself is escaped so that directories containing glob
/// metacharacters (`[`, `*`, ...) only match literally.
pub fn compile_rooted_pattern(root: &Path, pattern: &str) -> Result<Pattern> {
    let root = Pattern::escape(&root.to_string_lossy());
    let joined = format!("{}/{}", root.trim_end_matches('/'), pattern.trim_start_matches('/'));
    Ok(Pattern::new(&joined)?)
}

/// Characters escaped in directory names: everything but ASCII
/// alphanumerics, `.`, `-` and `_`. `%` itself is escaped, so decoding is
/// unambiguous.
const ID_ESCAPES: &AsciiSet = &NON_ALPHANUMERIC.remove(b'.').remove(b'-').remove(b'_');

/// Encode a component identity into a single filesystem-safe directory name.
///
/// Identities are kept readable: ASCII letters, digits, `.`, `-` and `_`
/// are kept, every other byte is percent-escaped. Distinct identities always
/// get distinct names.
pub fn encode_component_id(id: &str) -> String {
    match id {
        "" => "%".to_string(),
        "." => "%2E".to_string(),
        ".." => "%2E%2E".to_string(),
        _ => utf8_percent_encode(id, ID_ESCAPES).to_string(),
    }
}

/// Turns a searched entry name into a path below a component root.
///
/// Leading separators are ignored, so `/conf/app.yaml` and `conf/app.yaml`
/// name the same entry. Returns `None` for names leaving the root (`..`)
/// or naming the root itself.
pub fn relative_entry(name: &str) -> Option<PathBuf> {
    let trimmed = name.trim_start_matches(['/', '\\']);
    let mut relative = PathBuf::new();
    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if relative.as_os_str().is_empty() {
        None
    } else {
        Some(relative)
    }
}

/// The directory a component is materialized into below the work directory
pub fn component_dir(work_dir: &Path, id: &str) -> PathBuf {
    work_dir.join(encode_component_id(id))
}

/// The sibling directory holding a templated copy of `root`
pub fn templated_dir(root: &Path, suffix: &str) -> PathBuf {
    let mut name = root
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push("_");
    name.push(suffix);
    root.with_file_name(name)
}
