use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use chrono::{TimeZone as _, Utc};
use latest_uploader::{Config, ServerConfig, Summary, period::RawPeriod, run};
use tempfile::TempDir;

/// Create `path` below `root` with `content`, last modified at `hour:minute` UTC
fn put(root: &Path, path: &str, content: &str, hour: u32, minute: u32) {
    let path = root.join(path.trim_start_matches('/'));
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();

    let modified: SystemTime = Utc
        .with_ymd_and_hms(2024, 5, 17, hour, minute, 0)
        .unwrap()
        .into();
    fs::File::options()
        .write(true)
        .open(&path)
        .unwrap()
        .set_modified(modified)
        .unwrap();
}

fn read(root: &Path, path: &str) -> String {
    fs::read_to_string(root.join(path.trim_start_matches('/'))).unwrap()
}

fn exists(root: &Path, path: &str) -> bool {
    root.join(path.trim_start_matches('/')).exists()
}

fn period(name: &str, start: &str, end: &str) -> RawPeriod {
    RawPeriod {
        name: name.into(),
        start: start.into(),
        end: end.into(),
    }
}

fn config(root: PathBuf, folders: &[&str], periods: Vec<RawPeriod>) -> Config {
    Config {
        server: ServerConfig::Local { root },
        folders: folders.iter().map(|f| f.to_string()).collect(),
        file_type: ".jpg".into(),
        label: "recent".into(),
        target_name: None,
        overall_name: None,
        periods,
    }
}

fn day_periods() -> Vec<RawPeriod> {
    vec![
        period("morning", "04:00", "10:00"),
        period("midday", "10:00", "15:00"),
    ]
}

#[test]
fn uploads_newest_file_per_period() {
    let server = TempDir::new().unwrap();
    put(server.path(), "/cams/a.jpg", "a", 8, 0);
    put(server.path(), "/cams/b.jpg", "b", 12, 0);

    let summary = run(&config(server.path().into(), &["/cams"], day_periods()), false).unwrap();

    assert_eq!(read(server.path(), "/cams/recent-morning.jpg"), "a");
    assert_eq!(read(server.path(), "/cams/recent-midday.jpg"), "b");
    assert_eq!(
        summary,
        Summary {
            folders: 1,
            examined: 2,
            winners: 2,
            uploaded: 2,
            empty: 0,
        }
    );
}

#[test]
fn uploads_single_fixed_name_without_periods() {
    let server = TempDir::new().unwrap();
    put(server.path(), "/cams/x.jpg", "x", 6, 0);
    put(server.path(), "/cams/sub/y.jpg", "y", 7, 0);

    run(&config(server.path().into(), &["/cams"], vec![]), false).unwrap();

    assert_eq!(read(server.path(), "/cams/current.jpg"), "y");
    assert!(!exists(server.path(), "/cams/sub/current.jpg"));
}

#[test]
fn previous_outputs_never_win() {
    let server = TempDir::new().unwrap();
    let cfg = config(server.path().into(), &["/cams"], day_periods());
    put(server.path(), "/cams/a.jpg", "a", 8, 0);

    run(&cfg, false).unwrap();
    assert_eq!(read(server.path(), "/cams/recent-morning.jpg"), "a");

    // An earlier output with a fresh morning timestamp must not be picked up
    put(server.path(), "/cams/recent-morning.jpg", "a", 9, 59);
    put(server.path(), "/cams/c.jpg", "c", 9, 0);

    let summary = run(&cfg, false).unwrap();
    assert_eq!(read(server.path(), "/cams/recent-morning.jpg"), "c");
    assert_eq!(summary.examined, 2);

    // Running again without new files uploads the same content again
    let summary = run(&cfg, false).unwrap();
    assert_eq!(read(server.path(), "/cams/recent-morning.jpg"), "c");
    assert_eq!(summary.uploaded, 1);
}

#[test]
fn overlapping_periods_share_a_file() {
    let server = TempDir::new().unwrap();
    put(server.path(), "/cams/a.jpg", "a", 8, 0);

    let periods = vec![
        period("morning", "04:00", "09:59"),
        period("overall", "00:00", "23:59"),
    ];
    run(&config(server.path().into(), &["/cams"], periods), false).unwrap();

    assert_eq!(read(server.path(), "/cams/recent-morning.jpg"), "a");
    assert_eq!(read(server.path(), "/cams/recent-overall.jpg"), "a");
}

#[test]
fn empty_folder_uploads_nothing() {
    let server = TempDir::new().unwrap();
    fs::create_dir_all(server.path().join("empty")).unwrap();
    put(server.path(), "/empty/notes.txt", "n", 8, 0);

    let summary = run(&config(server.path().into(), &["/empty"], day_periods()), false).unwrap();

    assert_eq!(summary.uploaded, 0);
    assert_eq!(summary.empty, 2);
    assert_eq!(fs::read_dir(server.path().join("empty")).unwrap().count(), 1);
}

#[test]
fn folders_are_independent() {
    let server = TempDir::new().unwrap();
    put(server.path(), "/front/a.jpg", "front", 8, 0);
    put(server.path(), "/back/b.jpg", "back", 9, 0);

    let mut cfg = config(server.path().into(), &["/front", "/back"], vec![]);
    cfg.overall_name = Some("latest.jpg".into());
    let summary = run(&cfg, false).unwrap();

    assert_eq!(read(server.path(), "/front/current.jpg"), "front");
    assert_eq!(read(server.path(), "/front/latest.jpg"), "front");
    assert_eq!(read(server.path(), "/back/current.jpg"), "back");
    assert_eq!(summary.folders, 2);
    assert_eq!(summary.uploaded, 4);
}

#[test]
fn dry_run_changes_nothing() {
    let server = TempDir::new().unwrap();
    put(server.path(), "/cams/a.jpg", "a", 8, 0);

    let summary = run(&config(server.path().into(), &["/cams"], day_periods()), true).unwrap();

    assert_eq!(summary.winners, 1);
    assert_eq!(summary.uploaded, 0);
    assert!(!exists(server.path(), "/cams/recent-morning.jpg"));
}

#[test]
fn missing_folder_aborts_remaining_work() {
    let server = TempDir::new().unwrap();
    put(server.path(), "/later/a.jpg", "a", 8, 0);

    let err = run(&config(server.path().into(), &["/missing", "/later"], vec![]), false)
        .unwrap_err();

    assert!(format!("{err:#}").contains("/missing"));
    assert!(!exists(server.path(), "/later/current.jpg"));
}

#[test]
fn failed_upload_keeps_earlier_uploads_and_stops() {
    let server = TempDir::new().unwrap();
    put(server.path(), "/cams/a.jpg", "a", 8, 0);
    put(server.path(), "/cams/b.jpg", "b", 12, 0);
    put(server.path(), "/later/c.jpg", "c", 8, 0);
    // A directory in place of the midday output makes its upload fail
    fs::create_dir_all(server.path().join("cams/recent-midday.jpg")).unwrap();

    let cfg = config(server.path().into(), &["/cams", "/later"], day_periods());
    let err = run(&cfg, false).unwrap_err();
    let message = format!("{err:#}");

    assert!(message.contains("failed to process folder /cams"), "{message}");
    assert!(message.contains("recent-midday.jpg"), "{message}");
    assert_eq!(read(server.path(), "/cams/recent-morning.jpg"), "a");
    assert!(!exists(server.path(), "/later/recent-morning.jpg"));
}
