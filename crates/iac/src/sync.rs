// SPDX-License-Identifier: MIT

//! File sync rules for refreshing a workspace's working directory from its
//! template source, per spec.md §4.5: copy template content in, refresh
//! stale files, but never touch the provisioning tool's own state.

use std::path::{Path, PathBuf};

/// Is `relative_path` one of the files the sync must never overwrite or
/// remove, because it holds the provisioning tool's own persistent state
/// (or the core's own bookkeeping)?
pub fn is_preserved(relative_path: &Path) -> bool {
    if relative_path.components().any(|c| c.as_os_str() == ".terraform") {
        return true;
    }
    let name = relative_path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if name == "terraform.tfstate" || name == "terraform.tfstate.backup" {
        return true;
    }
    if name == ".terraform.lock.hcl" {
        return true;
    }
    if name == ".provisioner-metadata.json" {
        return true;
    }
    if name.ends_with(".tfplan") {
        return true;
    }
    if name.ends_with(".tfvars") || name.ends_with(".tfvars.json") {
        return true;
    }
    false
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

/// Sync template source files into the working directory: copy/overwrite
/// every non-preserved template file, then remove working-directory files
/// that are stale (not preserved, and no longer present in the template).
pub fn sync_template(template_dir: &Path, working_dir: &Path, preserve_extra: &[&str]) -> std::io::Result<()> {
    std::fs::create_dir_all(working_dir)?;

    let is_preserved_here = |rel: &Path| -> bool {
        is_preserved(rel) || preserve_extra.iter().any(|p| rel.to_string_lossy() == *p)
    };

    let template_files = walk_files(template_dir)?;
    for rel in &template_files {
        if is_preserved_here(rel) {
            continue;
        }
        let src = template_dir.join(rel);
        let dst = working_dir.join(rel);
        if let Some(parent) = dst.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(&src, &dst)?;
    }

    let working_files = walk_files(working_dir)?;
    for rel in &working_files {
        if is_preserved_here(rel) {
            continue;
        }
        if !template_files.contains(rel) {
            std::fs::remove_file(working_dir.join(rel))?;
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
