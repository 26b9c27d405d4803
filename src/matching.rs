//! Results of containment searches

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::usable::UsableComponent;

/// One search hit: a path relative to the usable component that holds it.
#[derive(Debug, Clone)]
pub struct MatchingPath {
    owner: Arc<UsableComponent>,
    relative: PathBuf,
}

impl MatchingPath {
    pub fn new(owner: Arc<UsableComponent>, relative: impl Into<PathBuf>) -> Self {
        Self {
            owner,
            relative: relative.into(),
        }
    }

    /// The usable component the path was found in
    pub fn owner(&self) -> &Arc<UsableComponent> {
        &self.owner
    }

    pub fn relative_path(&self) -> &Path {
        &self.relative
    }

    /// Owner root joined with the relative path, computed on every call.
    pub fn absolute_path(&self) -> PathBuf {
        self.owner.root_path().join(&self.relative)
    }
}

/// The hits of a containment search, in search order.
///
/// The caller owns the usable components behind the hits and must
/// [`release`](Self::release) them once the paths are no longer read.
#[derive(Debug, Clone, Default)]
pub struct MatchingPaths {
    paths: Vec<MatchingPath>,
}

impl MatchingPaths {
    pub fn new(paths: Vec<MatchingPath>) -> Self {
        Self { paths }
    }

    pub fn push(&mut self, path: MatchingPath) {
        self.paths.push(path);
    }

    pub fn count(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatchingPath> {
        self.paths.iter()
    }

    /// Releases every distinct owner of the hits.
    pub fn release(&self) {
        let mut released: Vec<&Arc<UsableComponent>> = Vec::new();
        for path in &self.paths {
            if released.iter().any(|r| Arc::ptr_eq(r, &path.owner)) {
                continue;
            }
            path.owner.release();
            released.push(&path.owner);
        }
    }

    /// All absolute paths joined with `separator`.
    pub fn join_absolute_paths(&self, separator: &str) -> String {
        self.paths
            .iter()
            .map(|p| p.absolute_path().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Absolute paths, each preceded by `prefix`
    /// (`["-i", "/a", "-i", "/b"]`), in search order.
    pub fn prefix_paths(&self, prefix: &str) -> Vec<String> {
        self.paths
            .iter()
            .flat_map(|p| {
                [
                    prefix.to_string(),
                    p.absolute_path().to_string_lossy().into_owned(),
                ]
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a MatchingPaths {
    type Item = &'a MatchingPath;
    type IntoIter = std::slice::Iter<'a, MatchingPath>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::EnvVars;
    use crate::diagnostics::default_sink;
    use std::fs;
    use tempfile::TempDir;

    fn usable(id: &str, root: &str) -> Arc<UsableComponent> {
        Arc::new(UsableComponent::fetched(
            id,
            PathBuf::from(root),
            EnvVars::new(),
            default_sink(),
        ))
    }

    fn three_paths() -> MatchingPaths {
        MatchingPaths::new(vec![
            MatchingPath::new(usable("c1", "/w/c1"), "path1"),
            MatchingPath::new(usable("c2", "/w/c2"), "path2"),
            MatchingPath::new(usable("c3", "/w/c3"), "path3"),
        ])
    }

    #[test]
    fn test_prefix_paths_interleaves_in_order() {
        let paths = three_paths();
        let args = paths.prefix_paths("-i");
        assert_eq!(
            args,
            vec!["-i", "/w/c1/path1", "-i", "/w/c2/path2", "-i", "/w/c3/path3"]
        );
    }

    #[test]
    fn test_join_absolute_paths() {
        let paths = three_paths();
        assert_eq!(paths.count(), 3);
        assert_eq!(
            paths.join_absolute_paths(":"),
            "/w/c1/path1:/w/c2/path2:/w/c3/path3"
        );
        assert_eq!(MatchingPaths::default().join_absolute_paths(":"), "");
    }

    #[test]
    fn test_absolute_path_follows_owner_root() {
        let path = MatchingPath::new(usable("c1", "/w/c1_0190"), "conf/app.yaml");
        assert_eq!(path.relative_path(), Path::new("conf/app.yaml"));
        assert_eq!(path.absolute_path(), PathBuf::from("/w/c1_0190/conf/app.yaml"));
        assert_eq!(path.owner().id(), "c1");
    }

    #[test]
    fn test_release_handles_shared_owner() {
        let temp = TempDir::new().unwrap();
        let copy = temp.path().join("core_0190");
        fs::create_dir_all(&copy).unwrap();

        let owner = Arc::new(UsableComponent::templated(
            "core",
            copy.clone(),
            EnvVars::new(),
            default_sink(),
        ));
        let paths = MatchingPaths::new(vec![
            MatchingPath::new(owner.clone(), "a"),
            MatchingPath::new(owner, "b"),
        ]);

        paths.release();
        assert!(!copy.exists());
        paths.release();
    }
}
