//! FTP backend
//!
//! Plain FTP with username/password login, binary transfers
//! and passive data connections.

use std::{fs, io, path::Path, str::FromStr as _};

use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use suppaftp::{FtpError, FtpStream, list::File, types::FileType};

use super::{Connector, DirListing, RemoteFs, join};
use crate::config::FtpConfig;

/// Connects to the FTP server described by [FtpConfig]
#[derive(Debug, Clone)]
pub struct FtpConnector {
    config: FtpConfig,
}

impl FtpConnector {
    pub fn new(config: FtpConfig) -> Self {
        Self { config }
    }
}

impl Connector for FtpConnector {
    type Session = FtpSession;

    fn connect(&self) -> Result<FtpSession> {
        FtpSession::connect(&self.config)
    }
}

/// Logged-in FTP session, sends `QUIT` when dropped
pub struct FtpSession {
    stream: FtpStream,
    server: String,
}

impl FtpSession {
    pub fn connect(config: &FtpConfig) -> Result<Self> {
        let server = format!("{}:{}", config.address, config.port);
        info!("Connecting to {server} as {}", config.username);

        let mut stream = FtpStream::connect(server.as_str())
            .with_context(|| format!("failed to connect to {server}"))?;
        // The stream is not wrapped yet, so quit explicitly on failed login
        if let Err(e) = stream.login(config.username.as_str(), config.password.as_str()) {
            if let Err(quit) = stream.quit() {
                debug!("Failed to close session to {server} after failed login: {quit}");
            }
            return Err(e)
                .with_context(|| format!("failed to log in to {server} as {}", config.username));
        }

        let mut session = Self { stream, server };
        session
            .stream
            .transfer_type(FileType::Binary)
            .context("failed to switch to binary transfers")?;

        Ok(session)
    }

    /// List the entries of a single directory
    fn list_dir(&mut self, dir: &str) -> Result<DirListing> {
        self.stream
            .cwd(dir)
            .with_context(|| format!("failed to change into {dir}"))?;
        let lines = self
            .stream
            .list(None)
            .with_context(|| format!("failed to list {dir}"))?;

        parse_listing(dir, &lines)
    }
}

/// Build a [DirListing] from the `LIST` output of `dir`
fn parse_listing(dir: &str, lines: &[String]) -> Result<DirListing> {
    let mut listing = DirListing {
        path: dir.to_owned(),
        ..Default::default()
    };

    for line in lines {
        if line.starts_with("total ") {
            continue;
        }
        let entry = File::from_str(line)
            .with_context(|| format!("failed to parse listing line '{line}' in {dir}"))?;

        match entry.name() {
            "." | ".." => {}
            name if entry.is_directory() => listing.dirs.push(name.to_owned()),
            // MDTM and RETR follow links on the server
            name if entry.is_file() || entry.is_symlink() => {
                listing.files.push(name.to_owned())
            }
            name => debug!("Skipping {} which is neither file nor directory", join(dir, name)),
        }
    }

    Ok(listing)
}

impl RemoteFs for FtpSession {
    fn walk(&mut self, folder: &str) -> Result<Vec<DirListing>> {
        let mut listings = Vec::new();
        let mut pending = vec![folder.to_owned()];

        while let Some(dir) = pending.pop() {
            let listing = self.list_dir(&dir)?;
            // Reversed so that subdirectories are visited in listing order
            pending.extend(listing.dirs.iter().rev().map(|d| join(&dir, d)));
            listings.push(listing);
        }

        Ok(listings)
    }

    fn modified(&mut self, path: &str) -> Result<DateTime<Utc>> {
        // MDTM answers in UTC
        self.stream
            .mdtm(path)
            .map(|t| t.and_utc())
            .with_context(|| format!("failed to get modification time of {path}"))
    }

    fn download(&mut self, remote: &str, local: &Path) -> Result<()> {
        let mut file = fs::File::create(local)
            .with_context(|| format!("failed to create {}", local.display()))?;
        let bytes = self
            .stream
            .retr(remote, |reader| {
                io::copy(reader, &mut file).map_err(FtpError::ConnectionError)
            })
            .with_context(|| format!("failed to download {remote}"))?;
        debug!("Fetched {bytes} bytes from {remote}");
        Ok(())
    }

    fn upload(&mut self, local: &Path, remote: &str) -> Result<()> {
        let mut file = fs::File::open(local)
            .with_context(|| format!("failed to open {}", local.display()))?;
        let bytes = self
            .stream
            .put_file(remote, &mut file)
            .with_context(|| format!("failed to upload {remote}"))?;
        debug!("Stored {bytes} bytes at {remote}");
        Ok(())
    }
}

impl Drop for FtpSession {
    fn drop(&mut self) {
        match self.stream.quit() {
            Ok(()) => debug!("Closed session to {}", self.server),
            Err(e) => warn!("Failed to close session to {}: {e}", self.server),
        }
    }
}
