//! Keep copies of the newest files on a file server under fixed names
//!
//! Each configured folder is scanned recursively for the most recently
//! modified files, optionally per time-of-day [Period]. The winners are
//! uploaded back into the folder as e.g. `recent-morning.jpg`, so consumers
//! can always fetch the latest file without knowing its original name.

pub mod config;
pub mod naming;
pub mod period;
pub mod pipeline;
pub mod remote;
pub mod scan;

pub use config::{Config, ConfigError, Job, ServerConfig};
pub use period::{Period, PeriodError};
pub use pipeline::{Summary, process_folders, run};
pub use scan::{Winner, find_newest_files};
