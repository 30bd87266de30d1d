//! Newest file selection
//!
//! Walks a remote folder and finds, for every [Target](crate::naming::Target),
//! the file with the latest modification time the target accepts.

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::{
    naming::Targets,
    remote::{RemoteFs, join},
};

/// File chosen for a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Winner {
    /// Derived output name
    pub name: String,
    /// Absolute remote path of the newest matching file
    pub source: String,
    pub modified: DateTime<Utc>,
}

/// Newest file seen so far for one target
#[derive(Debug, Clone)]
struct Candidate {
    path: String,
    modified: DateTime<Utc>,
}

/// Result of scanning one folder
#[derive(Debug, Default)]
pub struct Scan {
    pub winners: Vec<Winner>,
    /// Files matching the file type that were considered
    pub examined: usize,
    /// Targets without any matching file
    pub empty: Vec<String>,
}

/// Find the newest files below `folder` for all `targets`.
///
/// Files whose name is reserved by `targets` are ignored so our own uploads
/// never win. Ties keep the file seen first.
pub fn find_newest_files<R: RemoteFs + ?Sized>(
    remote: &mut R,
    folder: &str,
    file_type: &str,
    targets: &Targets,
) -> Result<Scan> {
    let mut newest: Vec<Option<Candidate>> = vec![None; targets.len()];
    let mut examined = 0;

    for listing in remote.walk(folder)? {
        for file in &listing.files {
            if !file.ends_with(file_type) {
                continue;
            }
            if targets.is_reserved(file) {
                debug!("Ignoring our own output {}", join(&listing.path, file));
                continue;
            }

            let path = join(&listing.path, file);
            let modified = remote.modified(&path)?;
            examined += 1;
            debug!("{path} modified at {modified}");

            for (target, best) in targets.iter().zip(newest.iter_mut()) {
                if !target.accepts(modified) {
                    continue;
                }
                if best.as_ref().is_none_or(|b| modified > b.modified) {
                    debug!("{path} is the newest file for {} so far", target.name());
                    *best = Some(Candidate {
                        path: path.clone(),
                        modified,
                    });
                }
            }
        }
    }

    let mut scan = Scan {
        examined,
        ..Default::default()
    };
    for (target, best) in targets.iter().zip(newest) {
        match best {
            Some(Candidate { path, modified }) => {
                info!("Newest file for {} under {folder} is {path}", target.name());
                scan.winners.push(Winner {
                    name: target.name().to_owned(),
                    source: path,
                    modified,
                });
            }
            None => {
                debug!("No file for {} under {folder}", target.name());
                scan.empty.push(target.name().to_owned());
            }
        }
    }

    Ok(scan)
}
