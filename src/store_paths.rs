//! Purpose: Shared data-directory and backing-file path resolution helpers.
//! Exports: `STUDENTS_FILE`, `COURSES_FILE`, `default_data_dir`.
//! Role: Keep CLI and API-client path semantics aligned from one source.
//! Invariants: Backing file names stay `students.csv` and `courses.csv`.
//! Invariants: The default data directory is the working directory.

use std::path::PathBuf;

pub const STUDENTS_FILE: &str = "students.csv";
pub const COURSES_FILE: &str = "courses.csv";

pub fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}
