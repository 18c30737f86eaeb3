//! Where the CLI keeps its state and log.

use std::path::PathBuf;

use directories::ProjectDirs;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "tabula", "tabula")
}

/// Persisted table state, under the platform data directory.
pub fn state_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().join("state.bin"))
}

/// Log of the latest run, under the platform cache directory.
pub fn log_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().join("latest.log"))
}
