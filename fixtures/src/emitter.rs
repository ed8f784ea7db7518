//! Fixture emitter
//!
//! Writes `config.yaml` for the monitor and `config_<id>.yaml` for every
//! validator. Files are truncated on each run. A failure aborts the run and
//! may leave the files written so far behind.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{FixtureError, FixtureResult};
use crate::fixture::FixtureSet;
use crate::yaml::{render_monitor, render_validator};
use crate::ValidatorId;

/// File read by the monitor
pub const MONITOR_FILE: &str = "config.yaml";

/// File name of a validator fixture
pub fn validator_file_name(id: ValidatorId) -> String {
    format!("config_{}.yaml", id)
}

/// What a run wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitSummary {
    pub monitor: PathBuf,
    pub validators: Vec<PathBuf>,
    pub bytes_written: usize,
}

impl EmitSummary {
    pub fn files_written(&self) -> usize {
        self.validators.len() + 1
    }
}

/// Writes a [`FixtureSet`] into a directory
#[derive(Debug, Clone)]
pub struct FixtureEmitter {
    output_dir: PathBuf,
}

impl FixtureEmitter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn monitor_path(&self) -> PathBuf {
        self.output_dir.join(MONITOR_FILE)
    }

    pub fn validator_path(&self, id: ValidatorId) -> PathBuf {
        self.output_dir.join(validator_file_name(id))
    }

    /// Write the monitor file first, then each validator file in id order
    pub fn emit(&self, fixtures: &FixtureSet) -> FixtureResult<EmitSummary> {
        fs::create_dir_all(&self.output_dir)
            .map_err(|e| FixtureError::io(&self.output_dir, e))?;

        let mut summary = EmitSummary::default();

        let monitor_path = self.monitor_path();
        summary.bytes_written += write_file(&monitor_path, &render_monitor(&fixtures.monitor))?;
        info!(
            path = %monitor_path.display(),
            validators = fixtures.monitor.validators.len(),
            "Wrote monitor fixture"
        );
        summary.monitor = monitor_path;

        for fixture in &fixtures.validators {
            let path = self.validator_path(fixture.id);
            summary.bytes_written += write_file(&path, &render_validator(fixture))?;
            debug!(
                path = %path.display(),
                rounds = fixture.rounds.len(),
                "Wrote validator fixture"
            );
            summary.validators.push(path);
        }

        info!(
            files = summary.files_written(),
            bytes = summary.bytes_written,
            dir = %self.output_dir.display(),
            "Fixture generation complete"
        );

        Ok(summary)
    }
}

fn write_file(path: &Path, content: &str) -> FixtureResult<usize> {
    fs::write(path, content).map_err(|e| FixtureError::io(path, e))?;
    Ok(content.len())
}
