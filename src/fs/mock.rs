// src/fs/mock.rs

use super::{DirEntry, EntryKind, FileSystem};
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File,
    Symlink,
    Dir(Vec<String>), // List of child names
}

/// In-memory tree for exercising the indexer without touching disk.
///
/// Paths are used verbatim; tests are expected to use absolute paths.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
    unreadable: Arc<Mutex<HashSet<PathBuf>>>,
    unstatable: Arc<Mutex<HashSet<PathBuf>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>) {
        self.insert_leaf(path.as_ref(), MockEntry::File);
    }

    /// Add a symlink entry. Its target is irrelevant: links are never followed.
    pub fn add_symlink(&self, path: impl AsRef<Path>) {
        self.insert_leaf(path.as_ref(), MockEntry::Symlink);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut entries = self.entries.lock().unwrap();
        ensure_dir(&mut entries, path.as_ref());
    }

    /// Make `read_dir` on this directory fail, like a permission error would.
    pub fn make_unreadable(&self, path: impl AsRef<Path>) {
        self.unreadable
            .lock()
            .unwrap()
            .insert(path.as_ref().to_path_buf());
    }

    /// Make reading the type of this entry fail, so listing its parent fails.
    pub fn make_unstatable(&self, path: impl AsRef<Path>) {
        self.unstatable
            .lock()
            .unwrap()
            .insert(path.as_ref().to_path_buf());
    }

    fn insert_leaf(&self, path: &Path, entry: MockEntry) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(path.to_path_buf(), entry);
        link_to_parent(&mut entries, path);
    }
}

fn ensure_dir(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    if entries.contains_key(path) {
        return;
    }
    entries.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
    link_to_parent(entries, path);
}

fn link_to_parent(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
        return;
    };
    if parent.as_os_str().is_empty() {
        return;
    }
    ensure_dir(entries, parent);
    if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
        let name = name.to_string_lossy().into_owned();
        if !children.contains(&name) {
            children.push(name);
        }
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.entries.lock().unwrap().contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(
            self.entries.lock().unwrap().get(path),
            Some(MockEntry::Dir(_))
        )
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        if self.unreadable.lock().unwrap().contains(path) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }
        let unstatable = self.unstatable.lock().unwrap();
        let entries = self.entries.lock().unwrap();
        let Some(MockEntry::Dir(children)) = entries.get(path) else {
            return Err(anyhow!("Not a directory or not found: {:?}", path));
        };

        let mut out = Vec::with_capacity(children.len());
        for name in children {
            let child = path.join(name);
            if unstatable.contains(&child) {
                return Err(anyhow!("Permission denied: reading file type of {:?}", child));
            }
            let kind = match entries.get(&child) {
                Some(MockEntry::Dir(_)) => EntryKind::Dir,
                Some(MockEntry::Symlink) => EntryKind::Symlink,
                _ => EntryKind::File,
            };
            out.push(DirEntry { path: child, kind });
        }
        Ok(out)
    }
}
