//! Typed fixture records
//!
//! The monitor reads one [`MonitorFixture`] and every validator process reads
//! its own [`ValidatorFixture`]. [`FixtureSet::build`] walks a
//! [`PartitionPlan`] round by round and appends one [`RoundSection`] to each
//! validator's accumulator; nothing is serialized until every round is in.

use std::fmt;

use crate::config::GeneratorConfig;
use crate::error::{FixtureError, FixtureResult};
use crate::partition::{DecisionValue, DecisionValues, PartitionPlan, RoundPlan};
use crate::{Height, Round, ValidatorId};

/// Vote phase of the emulated protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Prevote,
    Precommit,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageType::Prevote => write!(f, "PREVOTE"),
            MessageType::Precommit => write!(f, "PRECOMMIT"),
        }
    }
}

/// A vote asserted to have been sent or received in a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoteRecord {
    pub message_type: MessageType,
    pub sender: ValidatorId,
    pub round: Round,
    pub value: i64,
}

/// The four vote lists a validator holds for one round
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundSection {
    pub round: Round,
    pub received_prevote: Vec<VoteRecord>,
    pub sent_prevote: Vec<VoteRecord>,
    pub received_precommit: Vec<VoteRecord>,
    pub sent_precommit: Vec<VoteRecord>,
}

impl RoundSection {
    /// Empty section for a round
    pub fn empty(round: Round) -> Self {
        Self {
            round,
            ..Default::default()
        }
    }

    /// Section holding the round's votes as received PREVOTEs and PRECOMMITs
    pub fn from_plan(plan: &RoundPlan, values: &DecisionValues) -> Self {
        let record = |message_type: MessageType, (sender, value): (ValidatorId, DecisionValue)| {
            VoteRecord {
                message_type,
                sender,
                round: plan.round,
                value: values.data(value),
            }
        };

        Self {
            round: plan.round,
            received_prevote: plan
                .votes()
                .map(|vote| record(MessageType::Prevote, vote))
                .collect(),
            sent_prevote: Vec::new(),
            received_precommit: plan
                .votes()
                .map(|vote| record(MessageType::Precommit, vote))
                .collect(),
            sent_precommit: Vec::new(),
        }
    }

    /// Every record of the section, list by list
    pub fn records(&self) -> impl Iterator<Item = &VoteRecord> {
        self.received_prevote
            .iter()
            .chain(&self.sent_prevote)
            .chain(&self.received_precommit)
            .chain(&self.sent_precommit)
    }

    pub fn is_empty(&self) -> bool {
        self.records().next().is_none()
    }
}

/// Vote history of one validator at one height
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorFixture {
    pub id: ValidatorId,
    pub address: String,
    pub height: Height,
    pub rounds: Vec<RoundSection>,
}

impl ValidatorFixture {
    pub fn new(id: ValidatorId, address: String, height: Height) -> Self {
        Self {
            id,
            address,
            height,
            rounds: Vec::new(),
        }
    }

    /// Append the next round; rounds must arrive in strictly ascending order
    pub fn push_round(&mut self, section: RoundSection) -> FixtureResult<()> {
        if let Some(last) = self.rounds.last() {
            if section.round <= last.round {
                return Err(FixtureError::InvalidParameters(format!(
                    "Round {} appended to validator {} after round {}",
                    section.round, self.id, last.round
                )));
            }
        }
        self.rounds.push(section);
        Ok(())
    }

    pub fn round(&self, round: Round) -> Option<&RoundSection> {
        self.rounds.iter().find(|section| section.round == round)
    }
}

/// Metadata the monitor needs to collect vote sets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorFixture {
    pub height: Height,
    pub first_decision_round: Round,
    pub second_decision_round: Round,
    pub timeout: u64,
    pub validators: Vec<String>,
}

impl MonitorFixture {
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            height: config.height,
            first_decision_round: config.start_round,
            second_decision_round: config.end_round(),
            timeout: config.timeout,
            validators: config
                .validator_ids()
                .map(|id| config.address(id))
                .collect(),
        }
    }
}

/// Monitor fixture plus one fixture per validator, in id order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureSet {
    pub monitor: MonitorFixture,
    pub validators: Vec<ValidatorFixture>,
}

impl FixtureSet {
    /// Accumulate every round of `plan` into per-validator fixtures
    pub fn build(config: &GeneratorConfig, plan: &PartitionPlan) -> FixtureResult<Self> {
        let monitor = MonitorFixture::from_config(config);

        let mut validators: Vec<ValidatorFixture> = config
            .validator_ids()
            .map(|id| ValidatorFixture::new(id, config.address(id), config.height))
            .collect();

        for round_plan in &plan.rounds {
            let section = RoundSection::from_plan(round_plan, &plan.values);
            for fixture in validators.iter_mut() {
                fixture.push_round(section.clone())?;
            }
        }

        Ok(Self {
            monitor,
            validators,
        })
    }
}
