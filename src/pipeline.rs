//! Upload the newest files under their derived names
//!
//! Folders are processed one after the other. Each folder gets its own
//! session and its own staging directory. The first error aborts the run;
//! uploads done before it stay in place.

use std::path::Path;

use anyhow::{Context as _, Result};
use log::{info, warn};

use crate::{
    config::{Config, Job, ServerConfig},
    remote::{Connector, FtpConnector, LocalConnector, RemoteFs, join},
    scan::{Winner, find_newest_files},
};

/// Counters of a run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub folders: usize,
    /// Files of the configured type that were considered
    pub examined: usize,
    pub winners: usize,
    pub uploaded: usize,
    /// Targets that had no matching file
    pub empty: usize,
}

/// Validate the configuration and process all folders on the configured server
pub fn run(config: &Config, dry_run: bool) -> Result<Summary> {
    let job = config.job().context("invalid configuration")?;

    match &config.server {
        ServerConfig::Ftp(ftp) => process_folders(&job, &FtpConnector::new(ftp.clone()), dry_run),
        ServerConfig::Local { root } => process_folders(&job, &LocalConnector::new(root), dry_run),
    }
}

/// Process all folders of `job` in order
pub fn process_folders<C: Connector>(job: &Job, connector: &C, dry_run: bool) -> Result<Summary> {
    if dry_run {
        warn!("Dry run, nothing will be uploaded");
    }

    let mut summary = Summary::default();
    for folder in &job.folders {
        process_folder(job, connector, folder, dry_run, &mut summary)
            .with_context(|| format!("failed to process folder {folder}"))?;
        summary.folders += 1;
    }

    info!(
        "Processed {} folders: {} files examined, {} winners, {} uploaded, {} without a file",
        summary.folders, summary.examined, summary.winners, summary.uploaded, summary.empty
    );
    Ok(summary)
}

fn process_folder<C: Connector>(
    job: &Job,
    connector: &C,
    folder: &str,
    dry_run: bool,
    summary: &mut Summary,
) -> Result<()> {
    let mut session = connector.connect()?;
    let scan = find_newest_files(&mut session, folder, &job.file_type, &job.targets)?;

    summary.examined += scan.examined;
    summary.winners += scan.winners.len();
    summary.empty += scan.empty.len();

    if scan.examined == 0 {
        warn!("No {} files found under {folder}", job.file_type);
    }

    if dry_run {
        for winner in &scan.winners {
            info!("Would upload {} as {}", winner.source, join(folder, &winner.name));
        }
        return Ok(());
    }

    let staging = tempfile::Builder::new()
        .prefix("latest-uploader-")
        .tempdir()
        .context("failed to create staging directory")?;

    for winner in &scan.winners {
        upload_winner(&mut session, folder, winner, staging.path())?;
        summary.uploaded += 1;
    }

    Ok(())
}

/// Copy the winning file to `folder` under its derived name, via `staging`
fn upload_winner<R: RemoteFs>(
    remote: &mut R,
    folder: &str,
    winner: &Winner,
    staging: &Path,
) -> Result<()> {
    let local = staging.join(&winner.name);
    info!(
        "File under {folder} ({}) saved temporarily as {}",
        winner.source,
        local.display()
    );
    remote.download(&winner.source, &local)?;

    let target = join(folder, &winner.name);
    remote.upload(&local, &target)?;
    info!("Uploaded {} as {target}", winner.source);

    Ok(())
}
