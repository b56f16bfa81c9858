//! Purpose: Define the public API client surface for local record stores.
//! Exports: `LocalClient` and the store open/load lifecycle.
//! Role: Stable boundary for programmatic callers; mirrors CLI resolution rules.
//! Invariants: The client performs no terminal I/O; load diagnostics are returned.
//! Invariants: Store state lives in the returned `RecordStore`, never in the client.
#![allow(clippy::result_large_err)]

use crate::core::error::{map_io_error_kind, Error};
use crate::core::store::{LoadStatus, RecordStore, StorePaths};
use crate::store_paths::default_data_dir;
use std::path::{Path, PathBuf};

pub type ApiResult<T> = Result<T, Error>;

#[derive(Clone, Debug)]
pub struct LocalClient {
    data_dir: PathBuf,
}

impl LocalClient {
    pub fn new() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Opens the store over the data directory and bulk-loads both
    /// collections. Absent backing files load empty; the returned
    /// statuses let the caller report them.
    pub fn open_store(&self) -> ApiResult<(RecordStore, Vec<LoadStatus>)> {
        let mut store = RecordStore::new(StorePaths::in_dir(&self.data_dir));
        let students = store.load_students()?;
        let courses = store.load_courses()?;
        Ok((store, vec![students, courses]))
    }

    /// Creates the data directory if needed so write-through saves have
    /// somewhere to land.
    pub fn ensure_data_dir(&self) -> ApiResult<()> {
        std::fs::create_dir_all(&self.data_dir).map_err(|err| {
            Error::new(map_io_error_kind(&err))
                .with_message("failed to create data directory")
                .with_path(&self.data_dir)
                .with_source(err)
        })
    }
}

impl Default for LocalClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::LocalClient;
    use crate::core::record::Student;
    use crate::core::store::LoadStatus;

    #[test]
    fn local_client_defaults_to_working_directory() {
        let client = LocalClient::new();
        assert_eq!(client.data_dir().to_string_lossy(), ".");
    }

    #[test]
    fn open_store_reports_missing_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let client = LocalClient::new().with_data_dir(dir.path());
        let (store, statuses) = client.open_store().expect("open");
        assert!(store.students().is_empty());
        assert!(store.courses().is_empty());
        assert_eq!(statuses.len(), 2);
        assert!(statuses
            .iter()
            .all(|status| matches!(status, LoadStatus::Missing(_))));
    }

    #[test]
    fn open_store_loads_persisted_records() {
        let dir = tempfile::tempdir().expect("tempdir");
        let client = LocalClient::new().with_data_dir(dir.path());
        let (mut store, _) = client.open_store().expect("open");
        store
            .add_student(Student::new("S1", "Ann", 20, "R1", "A"))
            .expect("add");

        let (store, statuses) = client.open_store().expect("reopen");
        assert_eq!(store.students().len(), 1);
        assert_eq!(statuses[0], LoadStatus::Loaded(1));
    }

    #[test]
    fn ensure_data_dir_creates_missing_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("a").join("b");
        let client = LocalClient::new().with_data_dir(&nested);
        client.ensure_data_dir().expect("ensure");
        assert!(nested.is_dir());
    }
}
