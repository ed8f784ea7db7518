//! Generator configuration
//!
//! Holds the two user-facing knobs (validator count N and round count M) plus
//! the constants baked into the fixture layout: first round, height, base
//! port, monitor timeout and the two conflicting decision values.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{FixtureError, FixtureResult};
use crate::partition::{fault_count, quorum_threshold, DecisionValues};
use crate::{Height, Round, ValidatorId};

/// Configuration for one generator run
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of validators (N)
    pub validator_count: u32,

    /// Number of rounds (M)
    pub round_count: u64,

    /// First round of the configured range
    pub start_round: Round,

    /// Consensus height the vote sets belong to
    pub height: Height,

    /// Validator `id` listens on `base_port + id`
    pub base_port: u16,

    /// Host part of every validator address
    pub host: String,

    /// Monitor timeout, in seconds
    pub timeout: u64,

    /// Data payload of the first decision value
    pub value1: i64,

    /// Data payload of the second, conflicting decision value
    pub value2: i64,

    /// Directory receiving the generated files
    pub output_dir: PathBuf,
}

impl GeneratorConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            validator_count: 4,
            round_count: 1,
            start_round: 1,
            height: 1,
            base_port: 8080,
            host: "127.0.0.1".to_string(),
            timeout: 60,
            value1: 10,
            value2: 20,
            output_dir: PathBuf::from("."),
        }
    }

    /// Set the number of validators
    pub fn with_validators(mut self, count: u32) -> Self {
        self.validator_count = count;
        self
    }

    /// Set the number of rounds
    pub fn with_rounds(mut self, count: u64) -> Self {
        self.round_count = count;
        self
    }

    /// Set the first round of the range
    pub fn with_start_round(mut self, round: Round) -> Self {
        self.start_round = round;
        self
    }

    /// Set the base port used to derive addresses
    pub fn with_base_port(mut self, port: u16) -> Self {
        self.base_port = port;
        self
    }

    /// Set the two conflicting decision values
    pub fn with_values(mut self, value1: i64, value2: i64) -> Self {
        self.value1 = value1;
        self.value2 = value2;
        self
    }

    /// Set the output directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Parse overrides from a TOML document; absent keys keep their defaults
    pub fn from_toml_str(content: &str) -> FixtureResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load overrides from a TOML file
    pub fn from_toml_file(path: &Path) -> FixtureResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| FixtureError::io(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Validate the configuration
    pub fn validate(&self) -> FixtureResult<()> {
        if self.validator_count == 0 {
            return Err(FixtureError::InvalidParameters(
                "Validator count must be positive".to_string(),
            ));
        }

        if self.round_count == 0 {
            return Err(FixtureError::InvalidParameters(
                "Round count must be positive".to_string(),
            ));
        }

        if self.start_round.checked_add(self.round_count - 1).is_none() {
            return Err(FixtureError::InvalidParameters(format!(
                "Round range starting at {} with {} rounds overflows",
                self.start_round, self.round_count
            )));
        }

        let last_port = u32::from(self.base_port).checked_add(self.validator_count);
        if last_port.map_or(true, |port| port > u32::from(u16::MAX)) {
            return Err(FixtureError::InvalidParameters(format!(
                "Base port {} leaves no room for {} validators",
                self.base_port, self.validator_count
            )));
        }

        if self.value1 == self.value2 {
            return Err(FixtureError::InvalidParameters(
                "Decision values must differ".to_string(),
            ));
        }

        if self.host.is_empty() {
            return Err(FixtureError::InvalidParameters(
                "Host must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Last round of the range; only meaningful after `validate`
    pub fn end_round(&self) -> Round {
        self.start_round + self.round_count.saturating_sub(1)
    }

    /// Iterate over every configured round in order
    pub fn rounds(&self) -> impl Iterator<Item = Round> {
        self.start_round..=self.end_round()
    }

    /// Maximum tolerated faulty validators, F = ⌊(N-1)/3⌋
    pub fn fault_count(&self) -> u32 {
        fault_count(self.validator_count)
    }

    /// Quorum split point, T = ⌊(N-2F)/2⌋
    pub fn quorum_threshold(&self) -> u32 {
        quorum_threshold(self.validator_count, self.fault_count())
    }

    /// The two conflicting values
    pub fn values(&self) -> DecisionValues {
        DecisionValues::new(self.value1, self.value2)
    }

    /// Listening port of a validator
    pub fn port(&self, id: ValidatorId) -> u32 {
        u32::from(self.base_port) + id
    }

    /// Network address of a validator, e.g. `127.0.0.1:8081`
    pub fn address(&self, id: ValidatorId) -> String {
        format!("{}:{}", self.host, self.port(id))
    }

    /// Every validator id in ascending order
    pub fn validator_ids(&self) -> impl Iterator<Item = ValidatorId> {
        1..=self.validator_count
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new()
    }
}
