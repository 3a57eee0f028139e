//! File input utilities for reading targets from files
//!
//! Target files are plain text with one address per line. Surrounding
//! whitespace is trimmed, blank lines and `#` comments are skipped. Entries
//! are taken as written (hostnames included) and keep their file order,
//! duplicates too, so the report lines up with the file.

use crate::probe::Target;
use crate::{Result, SweepError};
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// File input handler for line-delimited target files
pub struct FileInputHandler {
    max_targets: usize,
}

/// File input statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileInputStats {
    pub total_lines: usize,
    pub valid_targets: usize,
    pub blank_lines: usize,
    pub comment_lines: usize,
}

/// No cap on the number of entries
impl Default for FileInputHandler {
    fn default() -> Self {
        Self {
            max_targets: usize::MAX,
        }
    }
}

impl FileInputHandler {
    /// Create a new file input handler refusing files with more than `max_targets` entries
    pub fn new(max_targets: usize) -> Self {
        Self { max_targets }
    }

    /// Read targets from a file
    pub fn read_targets_from_file<P: AsRef<Path>>(
        &self,
        file_path: P,
    ) -> Result<(Vec<Target>, FileInputStats)> {
        let path = file_path.as_ref();
        let file = File::open(path).map_err(|e| {
            SweepError::InvalidTarget(format!("Failed to open {}: {}", path.display(), e))
        })?;

        self.read_targets(BufReader::new(file))
    }

    /// Read targets from any line-oriented reader
    pub fn read_targets<R: BufRead>(&self, reader: R) -> Result<(Vec<Target>, FileInputStats)> {
        let mut targets = Vec::new();
        let mut stats = FileInputStats::default();

        for line in reader.lines() {
            stats.total_lines += 1;

            let line = line?;
            let target_str = line.trim();

            if target_str.is_empty() {
                stats.blank_lines += 1;
                continue;
            }

            if target_str.starts_with('#') {
                stats.comment_lines += 1;
                continue;
            }

            if targets.len() >= self.max_targets {
                return Err(SweepError::InvalidTarget(format!(
                    "Target file lists more than {} addresses",
                    self.max_targets
                )));
            }

            targets.push(Target::new(target_str));
            stats.valid_targets += 1;
        }

        Ok((targets, stats))
    }

    /// Validate file before processing
    pub fn validate_file<P: AsRef<Path>>(&self, file_path: P) -> Result<()> {
        let path = file_path.as_ref();

        if !path.exists() {
            return Err(SweepError::InvalidTarget(format!("File does not exist: {}", path.display())));
        }

        if !path.is_file() {
            return Err(SweepError::InvalidTarget(format!("Path is not a file: {}", path.display())));
        }

        Ok(())
    }
}

/// Utility function to create target list from file
pub fn targets_from_file<P: AsRef<Path>>(file_path: P, max_targets: usize) -> Result<Vec<Target>> {
    let handler = FileInputHandler::new(max_targets);

    handler.validate_file(&file_path)?;
    let (targets, stats) = handler.read_targets_from_file(&file_path)?;

    debug!(
        "Read {} targets from {} ({} lines, {} blank, {} comments)",
        stats.valid_targets,
        file_path.as_ref().display(),
        stats.total_lines,
        stats.blank_lines,
        stats.comment_lines
    );

    Ok(targets)
}
