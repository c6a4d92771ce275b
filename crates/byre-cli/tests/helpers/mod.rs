use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test harness for running CLI commands against a throwaway farm document
pub struct CliTestHarness {
    _temp_dir: TempDir,
    data_path: PathBuf,
}

impl CliTestHarness {
    /// Create a new test harness with an empty temporary document
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let data_path = temp_dir.path().join("byre.json");

        Self {
            _temp_dir: temp_dir,
            data_path,
        }
    }

    /// Get a Command instance configured for testing
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("byre").expect("Failed to find byre binary");

        // Point the CLI at the throwaway document and pin the timezone so
        // dates resolve the same on every machine.
        cmd.env("BYRE_DATA_FILE", &self.data_path);
        cmd.env("BYRE_TIMEZONE", "UTC");

        cmd
    }

    /// Get the data file path for this test instance
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Read the saved document back as loose JSON, for digging out ids
    pub fn document(&self) -> serde_json::Value {
        let bytes = std::fs::read(&self.data_path).expect("No document was saved");
        serde_json::from_slice(&bytes).expect("Document is not valid JSON")
    }

    /// Helper to run a command and assert success
    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command()
            .args(args)
            .assert()
            .success()
    }

    /// Helper to run a command and assert failure
    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command()
            .args(args)
            .assert()
            .failure()
    }
}

/// Common test fixtures
pub struct TestFixtures;

impl TestFixtures {
    /// A one-off task for today
    pub fn sample_task_args() -> Vec<&'static str> {
        vec!["add", "Rinse milking cluster", "--category", "hygiene"]
    }

    /// A cow registration with the essentials filled in
    pub fn sample_cow_args() -> Vec<&'static str> {
        vec![
            "cow", "add", "DE-0342",
            "--name", "Bella",
            "--born", "2021-03-15",
            "--weight", "580",
        ]
    }

    /// A self-rescheduling task
    pub fn sample_recurring_task_args() -> Vec<&'static str> {
        vec!["add", "Flush water lines", "--every", "3", "--unit", "days"]
    }
}

/// Utility functions for test assertions
pub mod assertions {
    use predicates::prelude::*;

    /// Predicate to check if output contains occurrence table headers
    pub fn has_task_table_headers() -> impl Predicate<str> {
        predicate::str::contains("ID")
            .and(predicate::str::contains("Title"))
            .and(predicate::str::contains("Status"))
    }

    /// Predicate to check if output indicates successful task creation
    pub fn task_created_successfully() -> impl Predicate<str> {
        predicate::str::contains("✓")
            .and(predicate::str::contains("Added"))
    }

    /// Predicate to check for empty occurrence listings
    pub fn empty_result() -> impl Predicate<str> {
        predicate::str::contains("No tasks found")
    }

    /// Predicate to check for error messages
    pub fn has_error() -> impl Predicate<str> {
        predicate::str::contains("Error")
            .or(predicate::str::contains("error"))
    }
}
