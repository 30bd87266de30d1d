//! Remote file system access
//!
//! The scanner and the pipeline only talk to the server through
//! [RemoteFs]. A [Connector] opens one session per folder. The session
//! closes when it is dropped.

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};

pub mod ftp;
pub mod local;

pub use ftp::{FtpConnector, FtpSession};
pub use local::{LocalConnector, LocalFs};

/// Content of one walked directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirListing {
    /// Absolute remote path of the directory
    pub path: String,
    /// Names of subdirectories
    pub dirs: Vec<String>,
    /// Names of regular files
    pub files: Vec<String>,
}

/// Operations needed on the server side
pub trait RemoteFs {
    /// Recursively list `folder`, the folder itself first
    fn walk(&mut self, folder: &str) -> Result<Vec<DirListing>>;

    /// Last modification time of the file at `path`
    fn modified(&mut self, path: &str) -> Result<DateTime<Utc>>;

    /// Copy the remote file at `remote` to the local file `local`
    fn download(&mut self, remote: &str, local: &Path) -> Result<()>;

    /// Copy the local file `local` to `remote`, replacing an existing file
    fn upload(&mut self, local: &Path, remote: &str) -> Result<()>;
}

/// Opens sessions on the server
pub trait Connector {
    type Session: RemoteFs;

    fn connect(&self) -> Result<Self::Session>;
}

/// Join a remote directory and a name with `/`
pub fn join(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}
