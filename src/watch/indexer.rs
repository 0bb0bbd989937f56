// src/watch/indexer.rs

//! One-shot traversal that builds the set of directories to watch.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::WatchSection;
use crate::errors::{ReloaderError, Result};
use crate::fs::{EntryKind, FileSystem};
use crate::watch::backend::WatchBackend;

/// Directory names that are never watched, together with everything below them.
#[derive(Debug, Clone)]
pub struct ExclusionRules {
    names: Vec<String>,
    skip_hidden: bool,
}

/// What the traversal should do with a directory it is about to enter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Watch this directory and keep walking into it.
    Descend,
    /// Neither watch it nor look at anything underneath it.
    SkipSubtree,
}

impl ExclusionRules {
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>, skip_hidden: bool) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            skip_hidden,
        }
    }

    pub fn from_config(watch: &WatchSection) -> Self {
        Self::new(watch.exclude_dirs.iter().cloned(), watch.skip_hidden)
    }

    /// Classify a directory by its final path component.
    pub fn visit(&self, dir: &Path) -> Visit {
        let Some(name) = dir.file_name() else {
            return Visit::Descend;
        };
        let name = name.to_string_lossy();
        if self.skip_hidden && name.starts_with('.') {
            return Visit::SkipSubtree;
        }
        if self.names.iter().any(|excluded| excluded.as_str() == &*name) {
            return Visit::SkipSubtree;
        }
        Visit::Descend
    }
}

impl Default for ExclusionRules {
    fn default() -> Self {
        Self::from_config(&WatchSection::default())
    }
}

/// Ordered, immutable list of directories registered with the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchSet {
    dirs: Vec<PathBuf>,
}

impl WatchSet {
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.dirs.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    pub fn contains(&self, dir: &Path) -> bool {
        self.dirs.iter().any(|d| d == dir)
    }
}

/// Walk `root` depth-first (siblings in lexical order) and collect every
/// directory that is not excluded.
///
/// The exclusion rules apply to the root like to any other directory: an
/// excluded root yields an empty set. Files and symlinked directories are
/// never included. Any I/O error aborts the whole walk.
pub fn index_directories(
    fs: &dyn FileSystem,
    root: &Path,
    rules: &ExclusionRules,
) -> Result<WatchSet> {
    if !fs.is_dir(root) {
        return Err(ReloaderError::NotADirectory(root.to_path_buf()));
    }
    if rules.visit(root) == Visit::SkipSubtree {
        warn!("watch root {} is excluded; nothing will be watched", root.display());
        return Ok(WatchSet::default());
    }

    let mut dirs = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let entries = fs
            .read_dir(&dir)
            .map_err(|source| ReloaderError::Traversal {
                path: dir.clone(),
                source,
            })?;

        let mut children: Vec<PathBuf> = entries
            .into_iter()
            .filter(|entry| entry.kind == EntryKind::Dir)
            .map(|entry| entry.path)
            .collect();
        children.sort();

        // Reverse so the lexically first child is popped first.
        for child in children.into_iter().rev() {
            match rules.visit(&child) {
                Visit::Descend => stack.push(child),
                Visit::SkipSubtree => debug!("Skipped dir: {}", child.display()),
            }
        }

        dirs.push(dir);
    }

    Ok(WatchSet { dirs })
}

/// Register every directory of the watch set with the backend.
///
/// Stops at the first failure; the caller treats that as fatal.
pub fn register_watch_set<B: WatchBackend + ?Sized>(
    backend: &mut B,
    watch_set: &WatchSet,
) -> Result<()> {
    for dir in watch_set.iter() {
        backend.register(dir)?;
        debug!("Watching dir: {}", dir.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn sample_tree() -> MockFileSystem {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/a.php");
        fs.add_file("/proj/src/Kernel.php");
        fs.add_file("/proj/src/Controller/Home.php");
        fs.add_file("/proj/vendor/lib/b.php");
        fs.add_file("/proj/var/cache/c.php");
        fs.add_file("/proj/.git/HEAD");
        fs.add_dir("/proj/config/.secret/deep");
        fs.add_dir("/proj/templates");
        fs
    }

    #[test]
    fn visit_rules_match_names_exactly() {
        let rules = ExclusionRules::default();
        assert_eq!(rules.visit(Path::new("/p/var")), Visit::SkipSubtree);
        assert_eq!(rules.visit(Path::new("/p/vendor")), Visit::SkipSubtree);
        assert_eq!(rules.visit(Path::new("/p/.idea")), Visit::SkipSubtree);
        assert_eq!(rules.visit(Path::new("/p/variables")), Visit::Descend);
        assert_eq!(rules.visit(Path::new("/p/Vendor")), Visit::Descend);
        assert_eq!(rules.visit(Path::new("/p/src.d")), Visit::Descend);
    }

    #[test]
    fn hidden_dirs_can_be_kept() {
        let rules = ExclusionRules::new(["var"], false);
        assert_eq!(rules.visit(Path::new("/p/.config")), Visit::Descend);
        assert_eq!(rules.visit(Path::new("/p/vendor")), Visit::Descend);
    }

    #[test]
    fn builds_depth_first_lexical_watch_set() {
        let fs = sample_tree();
        let set = index_directories(&fs, Path::new("/proj"), &ExclusionRules::default()).unwrap();

        let dirs: Vec<&Path> = set.iter().collect();
        assert_eq!(
            dirs,
            vec![
                Path::new("/proj"),
                Path::new("/proj/config"),
                Path::new("/proj/src"),
                Path::new("/proj/src/Controller"),
                Path::new("/proj/templates"),
            ]
        );
    }

    #[test]
    fn excluded_subtrees_are_never_entered() {
        let fs = sample_tree();
        // Unreadable dirs inside excluded subtrees must not abort the walk.
        fs.make_unreadable("/proj/vendor/lib");
        fs.make_unreadable("/proj/.git");

        let set = index_directories(&fs, Path::new("/proj"), &ExclusionRules::default()).unwrap();
        assert!(!set.contains(Path::new("/proj/vendor")));
        assert!(!set.contains(Path::new("/proj/vendor/lib")));
        assert!(!set.contains(Path::new("/proj/var/cache")));
        assert!(!set.contains(Path::new("/proj/config/.secret/deep")));
    }

    #[test]
    fn excluded_root_yields_an_empty_watch_set() {
        let fs = MockFileSystem::new();
        fs.add_dir("/home/dev/vendor/pkg");
        fs.add_dir("/home/dev/.proj/src");

        let rules = ExclusionRules::default();
        let set = index_directories(&fs, Path::new("/home/dev/vendor"), &rules).unwrap();
        assert!(set.is_empty());
        let set = index_directories(&fs, Path::new("/home/dev/.proj"), &rules).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn filesystem_root_is_never_excluded() {
        assert_eq!(ExclusionRules::default().visit(Path::new("/")), Visit::Descend);
    }

    #[test]
    fn symlinked_dirs_are_not_entered() {
        let fs = sample_tree();
        fs.add_symlink("/proj/src/linked");
        let set = index_directories(&fs, Path::new("/proj"), &ExclusionRules::default()).unwrap();
        assert!(!set.contains(Path::new("/proj/src/linked")));
        assert_eq!(set.len(), 5);
    }

    #[test]
    fn entry_type_failure_aborts_indexing() {
        let fs = sample_tree();
        fs.make_unstatable("/proj/templates");
        let err = index_directories(&fs, Path::new("/proj"), &ExclusionRules::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ReloaderError::Traversal { path, .. } if path == Path::new("/proj")
        ));
    }

    #[test]
    fn io_error_aborts_indexing() {
        let fs = sample_tree();
        fs.make_unreadable("/proj/src/Controller");
        let err = index_directories(&fs, Path::new("/proj"), &ExclusionRules::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ReloaderError::Traversal { path, .. } if path == Path::new("/proj/src/Controller")
        ));
    }

    #[test]
    fn non_directory_root_is_rejected() {
        let fs = sample_tree();
        let err = index_directories(&fs, Path::new("/proj/a.php"), &ExclusionRules::default())
            .unwrap_err();
        assert!(matches!(err, ReloaderError::NotADirectory(_)));
    }
}
