/// Workspace management for per-execution artifacts.
/// Each execution owns a unique directory under the configured root; the
/// directory is removed on every exit path, including drop during a panic.
use crate::config::types::{JudgeError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// One execution's scoped directory.
#[derive(Debug)]
pub struct Workspace {
    dir: PathBuf,
    cleaned: bool,
}

impl Workspace {
    /// Create the directory for an execution id under `root`.
    pub fn create(root: &Path, id: &str) -> Result<Self> {
        let dir = root.join(id);
        fs::create_dir_all(&dir).map_err(|e| {
            JudgeError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to create workspace {}: {}", dir.display(), e),
            ))
        })?;
        Ok(Self {
            dir,
            cleaned: false,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a file into the workspace, returning its full path.
    pub fn write_file(&self, name: &str, content: &[u8]) -> Result<PathBuf> {
        let path = self.dir.join(name);
        fs::write(&path, content).map_err(|e| {
            JudgeError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to write {}: {}", path.display(), e),
            ))
        })?;
        Ok(path)
    }

    /// Remove the workspace directory (idempotent).
    pub fn cleanup(&mut self) {
        if self.cleaned {
            return;
        }
        if self.dir.exists() {
            if let Err(e) = fs::remove_dir_all(&self.dir) {
                log::warn!("failed to remove workspace {}: {}", self.dir.display(), e);
                return;
            }
        }
        self.cleaned = true;
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Creates workspaces and reclaims directories abandoned by a previous
/// process (shutdown mid-judgment leaks them; the startup sweep collects).
pub struct WorkspaceManager {
    root: PathBuf,
}

impl WorkspaceManager {
    pub fn new(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root).map_err(|e| {
            JudgeError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to create workspace root {}: {}", root.display(), e),
            ))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn create(&self, id: &str) -> Result<Workspace> {
        Workspace::create(&self.root, id)
    }

    /// Remove workspace directories older than `max_age`. Returns the count
    /// removed.
    pub fn sweep_stale(&self, max_age: std::time::Duration) -> Result<usize> {
        let mut removed = 0;
        let now = std::time::SystemTime::now();

        for entry in fs::read_dir(&self.root)? {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    log::warn!("failed to read workspace entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            let modified = match entry.metadata().and_then(|m| m.modified()) {
                Ok(m) => m,
                Err(e) => {
                    log::warn!("failed to stat {}: {}", path.display(), e);
                    continue;
                }
            };
            let age = match now.duration_since(modified) {
                Ok(d) => d,
                Err(_) => continue,
            };

            if age > max_age {
                log::info!("sweeping stale workspace {}", path.display());
                match fs::remove_dir_all(&path) {
                    Ok(()) => removed += 1,
                    Err(e) => log::warn!("failed to sweep {}: {}", path.display(), e),
                }
            }
        }

        Ok(removed)
    }
}
