//! # Accountability Fixtures
//!
//! Generates the vote histories that the fork accountability monitor and its
//! validator processes load at start-up.
//!
//! Given N validators and M rounds, every round's validator set is split into
//! contiguous vote groups (see [`partition`]) so that the first round carries
//! just enough PREVOTE/PRECOMMIT messages for a quorum on `value1` and the last
//! round just enough for a quorum on `value2`, with the faulty block voting
//! for both.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use accountability_fixtures::{generate, GeneratorConfig};
//!
//! let config = GeneratorConfig::new()
//!     .with_validators(7)
//!     .with_rounds(3)
//!     .with_output_dir("fixtures-out");
//!
//! let summary = generate(&config)?;
//! assert_eq!(summary.files_written(), 8);
//! # Ok::<(), accountability_fixtures::FixtureError>(())
//! ```

pub mod config;
pub mod emitter;
pub mod error;
pub mod fixture;
pub mod partition;
pub mod yaml;

pub use config::GeneratorConfig;
pub use emitter::{validator_file_name, EmitSummary, FixtureEmitter, MONITOR_FILE};
pub use error::{FixtureError, FixtureResult};
pub use fixture::{
    FixtureSet, MessageType, MonitorFixture, RoundSection, ValidatorFixture, VoteRecord,
};
pub use partition::{
    fault_count, partition, quorum_threshold, DecisionValue, DecisionValues, PartitionPlan,
    QuorumLayout, RoundPlan, ValidatorRange, VoteGroup,
};

/// Validator identifier, also the offset of its port from the base port
pub type ValidatorId = u32;

/// Consensus round number
pub type Round = u64;

/// Consensus height
pub type Height = u64;

/// Plan, accumulate and write all fixtures for `config`.
///
/// Configuration and partition errors are raised before any file is touched.
pub fn generate(config: &GeneratorConfig) -> FixtureResult<EmitSummary> {
    let fixtures = build_fixtures(config)?;
    FixtureEmitter::new(&config.output_dir).emit(&fixtures)
}

/// Plan and accumulate fixtures without writing them
pub fn build_fixtures(config: &GeneratorConfig) -> FixtureResult<FixtureSet> {
    let plan = PartitionPlan::build(config)?;
    tracing::info!(
        validators = plan.validator_count,
        faulty = plan.fault_count,
        threshold = plan.quorum_threshold,
        start_round = plan.start_round,
        end_round = plan.end_round,
        "Partition plan ready"
    );
    FixtureSet::build(config, &plan)
}
