//! Local directory backend
//!
//! Treats a local directory as the server root, e.g. a mounted share.
//! Remote path `/a/b` maps to `<root>/a/b`.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context as _, Result, bail};
use chrono::{DateTime, Utc};
use log::{debug, info};
use walkdir::WalkDir;

use super::{Connector, DirListing, RemoteFs, join};

/// Hands out [LocalFs] sessions for `root`
#[derive(Debug, Clone)]
pub struct LocalConnector {
    root: PathBuf,
}

impl LocalConnector {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Connector for LocalConnector {
    type Session = LocalFs;

    fn connect(&self) -> Result<LocalFs> {
        if !self.root.is_dir() {
            bail!("local root {} is not a directory", self.root.display());
        }
        info!("Using local directory {}", self.root.display());
        Ok(LocalFs {
            root: self.root.clone(),
        })
    }
}

/// Session on a local directory tree
#[derive(Debug)]
pub struct LocalFs {
    root: PathBuf,
}

impl LocalFs {
    fn resolve(&self, remote: &str) -> PathBuf {
        self.root.join(remote.trim_start_matches('/'))
    }
}

impl RemoteFs for LocalFs {
    fn walk(&mut self, folder: &str) -> Result<Vec<DirListing>> {
        let base = self.resolve(folder);
        let mut listings: Vec<DirListing> = Vec::new();
        let mut index: HashMap<PathBuf, usize> = HashMap::new();

        for entry in WalkDir::new(&base).sort_by_file_name() {
            let entry = entry.with_context(|| format!("failed to walk {folder}"))?;
            let path = entry.path();

            if entry.file_type().is_dir() {
                let relative = path.strip_prefix(&base).unwrap_or(path);
                let remote = relative
                    .components()
                    .fold(folder.to_owned(), |acc, c| {
                        join(&acc, &c.as_os_str().to_string_lossy())
                    });
                index.insert(path.to_owned(), listings.len());
                listings.push(DirListing {
                    path: remote,
                    ..Default::default()
                });
            }

            if entry.depth() == 0 {
                continue;
            }

            let Some(parent) = path.parent().and_then(|p| index.get(p)) else {
                continue;
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            let listing = &mut listings[*parent];
            if entry.file_type().is_dir() {
                listing.dirs.push(name);
            } else if entry.file_type().is_file() || entry.file_type().is_symlink() {
                // Links are not followed while walking, stat and copy follow them
                listing.files.push(name);
            } else {
                debug!("Skipping {} which is neither file nor directory", path.display());
            }
        }

        Ok(listings)
    }

    fn modified(&mut self, path: &str) -> Result<DateTime<Utc>> {
        fs::metadata(self.resolve(path))
            .and_then(|m| m.modified())
            .map(DateTime::<Utc>::from)
            .with_context(|| format!("failed to get modification time of {path}"))
    }

    fn download(&mut self, remote: &str, local: &Path) -> Result<()> {
        fs::copy(self.resolve(remote), local)
            .map(|_| ())
            .with_context(|| format!("failed to download {remote}"))
    }

    fn upload(&mut self, local: &Path, remote: &str) -> Result<()> {
        fs::copy(local, self.resolve(remote))
            .map(|_| ())
            .with_context(|| format!("failed to upload {remote}"))
    }
}
