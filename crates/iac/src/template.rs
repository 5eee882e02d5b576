// SPDX-License-Identifier: MIT

//! Template registry: the external collaborator summarized in spec.md §4.6.
//!
//! The core only needs three things from the registry — does a named
//! template exist, where are its files, and a content hash stable across
//! file reordering (for change detection). A full registry service (add,
//! remove, list) is out of scope; this is a minimal trait plus a
//! filesystem-backed implementation so `cadence-iac` has something concrete
//! to call against `<state_root>/templates/<name>/`.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

#[async_trait]
pub trait TemplateRegistry: Send + Sync {
    /// Does a template with this name exist?
    async fn exists(&self, name: &str) -> bool;

    /// Path to the template's source files.
    async fn source_dir(&self, name: &str) -> Option<PathBuf>;

    /// A content hash stable across file reorderings: computed by hashing
    /// sorted `relative_path:sha256(content)` lines (spec.md §4.6).
    async fn content_hash(&self, name: &str) -> Option<String>;
}

/// Filesystem-backed registry rooted at `<state_root>/templates/`.
pub struct FsTemplateRegistry {
    root: PathBuf,
}

impl FsTemplateRegistry {
    pub fn new(state_root: &Path) -> Self {
        Self { root: state_root.join("templates") }
    }

    fn dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

fn walk_files(root: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    if !root.is_dir() {
        return Ok(out);
    }
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else {
                out.push(path.strip_prefix(root).unwrap_or(&path).to_path_buf());
            }
        }
    }
    Ok(out)
}

/// Hash a template directory's contents: one `relative_path:sha256(content)`
/// line per file, sorted by relative path, then SHA-256 of the joined lines.
/// Stable across file reorderings because the lines are sorted before the
/// final digest.
pub fn hash_template_dir(dir: &Path) -> std::io::Result<String> {
    let mut files = walk_files(dir)?;
    files.sort();

    let mut lines = Vec::with_capacity(files.len());
    for rel in &files {
        let contents = std::fs::read(dir.join(rel))?;
        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let digest = hasher.finalize();
        lines.push(format!("{}:{:x}", rel.to_string_lossy(), digest));
    }

    let mut hasher = Sha256::new();
    for line in &lines {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    Ok(format!("{:x}", hasher.finalize()))
}

#[async_trait]
impl TemplateRegistry for FsTemplateRegistry {
    async fn exists(&self, name: &str) -> bool {
        self.dir(name).is_dir()
    }

    async fn source_dir(&self, name: &str) -> Option<PathBuf> {
        let dir = self.dir(name);
        dir.is_dir().then_some(dir)
    }

    async fn content_hash(&self, name: &str) -> Option<String> {
        hash_template_dir(&self.dir(name)).ok()
    }
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
