//! Helpers shared by the unit tests.

use std::path::PathBuf;

use tempfile::TempDir;

/// Returns a fresh scratch directory and the path of a state file inside it.
///
/// The directory exists, the file does not. Both are removed once the guard is dropped, so keep
/// it alive for as long as the path is in use.
pub(crate) fn scratch_state_file(label: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::Builder::new()
        .prefix(&format!("gridmaze-{label}-"))
        .tempdir()
        .expect("scratch directory should be creatable");
    let path = dir.path().join("maze_games.json");

    (dir, path)
}
