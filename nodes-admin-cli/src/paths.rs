//! Where the CLI keeps its logs.
//!
//! Logs live in the per-user cache directory: `~/.cache/nodes-admin` on
//! Linux, `~/Library/Caches/org.desci.nodes-admin` on macOS and
//! `AppData\Local\desci\nodes-admin\cache` on Windows.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use directories::ProjectDirs;

const LATEST_LOG: &str = "latest.log";
const ARCHIVE_PREFIX: &str = "run-";

/// Archived runs kept next to `latest.log`.
const KEEP_ARCHIVED: usize = 25;

pub fn log_dir() -> Option<PathBuf> {
    ProjectDirs::from("org", "desci", "nodes-admin").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// The log file of the current run.
pub fn log_file() -> Option<PathBuf> {
    log_dir().map(|dir| dir.join(LATEST_LOG))
}

/// Moves the previous run's log aside and drops the oldest archives.
///
/// Must run before the logger opens [`log_file`].
pub fn rotate_logs() {
    if let Some(dir) = log_dir() {
        rotate_logs_in(&dir, KEEP_ARCHIVED);
    }
}

fn rotate_logs_in(dir: &Path, keep: usize) {
    let latest = dir.join(LATEST_LOG);
    if latest.is_file() {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S%.3f");
        let archived = dir.join(format!("{}{}.log", ARCHIVE_PREFIX, stamp));
        if let Err(err) = fs::rename(&latest, &archived) {
            eprintln!("warning: cannot archive {}: {}", latest.display(), err);
        }
    }
    prune_archives(dir, keep);
}

/// Archive names embed their timestamp, so name order is age order.
fn prune_archives(dir: &Path, keep: usize) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    let mut archives: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(ARCHIVE_PREFIX) && name.ends_with(".log"))
        })
        .collect();
    archives.sort();

    let excess = archives.len().saturating_sub(keep);
    for path in &archives[..excess] {
        let _ = fs::remove_file(path);
    }
}
