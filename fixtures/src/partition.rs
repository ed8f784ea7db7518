//! # Quorum Partition
//!
//! Splits the validator set of every round into contiguous vote groups.
//!
//! With N validators, F = ⌊(N-1)/3⌋ and T = ⌊(N-2F)/2⌋ the layout is:
//!
//! ```text
//!   1 ........ 2F | 2F+1 ..... 2F+T | 2F+T+1 ........ N
//!   byzantine     | silent quorum   | trailing
//! ```
//!
//! - **first round**: `[1, 2F+T]` votes `value1`, the trailing block is silent.
//! - **last round**: the byzantine block switches to `value2` and the trailing
//!   block joins it, forming a second quorum on the conflicting value.
//! - **intermediate rounds**: declared but carry no votes.
//!
//! A round that is both first and last gets the first-round groups followed by
//! the last-round groups. Each phase on its own partitions `[1, N]` exactly.

use serde::Serialize;
use std::fmt;
use std::ops::Range;
use tracing::debug;

use crate::config::GeneratorConfig;
use crate::error::{FixtureError, FixtureResult};
use crate::{Round, ValidatorId};

/// Maximum number of faulty validators tolerated by N validators, ⌊(N-1)/3⌋
pub fn fault_count(validators: u32) -> u32 {
    validators.saturating_sub(1) / 3
}

/// Correct validators completing a quorum beyond the faulty set, ⌊(N-2F)/2⌋
pub fn quorum_threshold(validators: u32, faulty: u32) -> u32 {
    validators.saturating_sub(faulty.saturating_mul(2)) / 2
}

/// One of the two conflicting proposals
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DecisionValue {
    Value1,
    Value2,
}

/// Data payloads carried by the two decision values
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct DecisionValues {
    pub value1: i64,
    pub value2: i64,
}

impl DecisionValues {
    pub fn new(value1: i64, value2: i64) -> Self {
        Self { value1, value2 }
    }

    /// Payload of a symbolic value
    pub fn data(&self, value: DecisionValue) -> i64 {
        match value {
            DecisionValue::Value1 => self.value1,
            DecisionValue::Value2 => self.value2,
        }
    }
}

/// Contiguous, half-open range of validator ids `[start, end)`
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub struct ValidatorRange {
    pub start: ValidatorId,
    pub end: ValidatorId,
}

impl ValidatorRange {
    /// Range covering ids `first..=last`; empty when `last < first`
    pub fn inclusive(first: ValidatorId, last: ValidatorId) -> Self {
        Self {
            start: first,
            end: last.saturating_add(1).max(first),
        }
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, id: ValidatorId) -> bool {
        (self.start..self.end).contains(&id)
    }

    /// Ids in ascending order
    pub fn ids(&self) -> Range<ValidatorId> {
        self.start..self.end
    }
}

impl fmt::Display for ValidatorRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "[]")
        } else {
            write!(f, "[{}, {}]", self.start, self.end - 1)
        }
    }
}

/// A validator range and the value it votes for in a round, if any
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub struct VoteGroup {
    pub validators: ValidatorRange,
    pub value: Option<DecisionValue>,
}

impl VoteGroup {
    fn voting(validators: ValidatorRange, value: DecisionValue) -> Self {
        Self {
            validators,
            value: Some(value),
        }
    }

    fn silent(validators: ValidatorRange) -> Self {
        Self {
            validators,
            value: None,
        }
    }
}

/// Block boundaries derived from N and F
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuorumLayout {
    pub validators: u32,
    pub faulty: u32,
    pub threshold: u32,
}

impl QuorumLayout {
    /// Derive and check the layout; fails when a quorum group would be empty
    /// or a block would leave `[1, N]`
    pub fn derive(validators: u32, faulty: u32) -> FixtureResult<Self> {
        let threshold = quorum_threshold(validators, faulty);
        let layout = Self {
            validators,
            faulty,
            threshold,
        };

        let infeasible = |reason: &str| FixtureError::InfeasiblePartition {
            validators,
            faulty,
            threshold,
            reason: reason.to_string(),
        };

        if 2 * u64::from(faulty) >= u64::from(validators) {
            return Err(infeasible("faulty block covers the whole validator set"));
        }
        if layout.quorum_size() == 0 {
            return Err(infeasible("first-round quorum is empty"));
        }
        if layout.quorum_size() > validators {
            return Err(infeasible("first-round quorum exceeds the validator set"));
        }

        Ok(layout)
    }

    /// Size of the first-round quorum, 2F+T
    pub fn quorum_size(&self) -> u32 {
        2 * self.faulty + self.threshold
    }

    /// `[1, 2F]`: validators that double-vote across rounds
    pub fn byzantine(&self) -> ValidatorRange {
        ValidatorRange::inclusive(1, 2 * self.faulty)
    }

    /// `[1, 2F+T]`: first-round quorum on `value1`
    pub fn first_quorum(&self) -> ValidatorRange {
        ValidatorRange::inclusive(1, self.quorum_size())
    }

    /// `[2F+1, 2F+T]`: correct validators silent in the last round
    pub fn silent_quorum(&self) -> ValidatorRange {
        ValidatorRange::inclusive(2 * self.faulty + 1, self.quorum_size())
    }

    /// `[2F+T+1, N]`: validators that only vote in the last round
    pub fn trailing(&self) -> ValidatorRange {
        ValidatorRange::inclusive(self.quorum_size() + 1, self.validators)
    }

    /// Groups of the first round, covering `[1, N]`
    pub fn first_round_groups(&self) -> Vec<VoteGroup> {
        vec![
            VoteGroup::voting(self.first_quorum(), DecisionValue::Value1),
            VoteGroup::silent(self.trailing()),
        ]
    }

    /// Groups of the last round, covering `[1, N]`
    pub fn last_round_groups(&self) -> Vec<VoteGroup> {
        vec![
            VoteGroup::voting(self.byzantine(), DecisionValue::Value2),
            VoteGroup::silent(self.silent_quorum()),
            VoteGroup::voting(self.trailing(), DecisionValue::Value2),
        ]
    }

    /// Groups of an intermediate round: everybody silent
    pub fn intermediate_round_groups(&self) -> Vec<VoteGroup> {
        vec![VoteGroup::silent(ValidatorRange::inclusive(1, self.validators))]
    }
}

/// Ordered vote groups for a single round
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RoundPlan {
    pub round: Round,
    pub is_first: bool,
    pub is_last: bool,
    pub groups: Vec<VoteGroup>,
}

impl RoundPlan {
    /// `(sender, value)` pairs in emission order, skipping silent and empty groups
    pub fn votes(&self) -> impl Iterator<Item = (ValidatorId, DecisionValue)> + '_ {
        self.groups
            .iter()
            .filter_map(|group| group.value.map(|value| (group.validators, value)))
            .flat_map(|(range, value)| range.ids().map(move |id| (id, value)))
    }
}

/// Compute the vote groups of one round.
///
/// T is derived again from `validators` and `faulty` on every call. Groups
/// carry the symbolic [`DecisionValue`]; the `value1`/`value2` payloads are
/// bound later through [`DecisionValues::data`] when
/// `RoundSection::from_plan` turns the plan into vote records.
pub fn partition(
    validators: u32,
    faulty: u32,
    round: Round,
    is_first: bool,
    is_last: bool,
) -> FixtureResult<RoundPlan> {
    let layout = QuorumLayout::derive(validators, faulty)?;

    let mut groups = Vec::new();
    if is_first {
        groups.extend(layout.first_round_groups());
    }
    if is_last {
        groups.extend(layout.last_round_groups());
    }
    if !is_first && !is_last {
        groups.extend(layout.intermediate_round_groups());
    }

    let summary: Vec<(String, Option<DecisionValue>)> = groups
        .iter()
        .map(|group| (group.validators.to_string(), group.value))
        .collect();
    debug!(round, is_first, is_last, groups = ?summary, "Partitioned round");

    Ok(RoundPlan {
        round,
        is_first,
        is_last,
        groups,
    })
}

/// Vote groups for every configured round
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PartitionPlan {
    pub validator_count: u32,
    pub fault_count: u32,
    pub quorum_threshold: u32,
    pub start_round: Round,
    pub end_round: Round,
    pub values: DecisionValues,
    pub rounds: Vec<RoundPlan>,
}

impl PartitionPlan {
    /// Validate the configuration and partition each round in order
    pub fn build(config: &GeneratorConfig) -> FixtureResult<Self> {
        config.validate()?;

        let start_round = config.start_round;
        let end_round = config.end_round();
        let rounds = config
            .rounds()
            .map(|round| {
                partition(
                    config.validator_count,
                    config.fault_count(),
                    round,
                    round == start_round,
                    round == end_round,
                )
            })
            .collect::<FixtureResult<Vec<_>>>()?;

        Ok(Self {
            validator_count: config.validator_count,
            fault_count: config.fault_count(),
            quorum_threshold: config.quorum_threshold(),
            start_round,
            end_round,
            values: config.values(),
            rounds,
        })
    }

    /// Plan as pretty-printed JSON
    pub fn to_json(&self) -> FixtureResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voters(plan: &RoundPlan, value: DecisionValue) -> Vec<ValidatorId> {
        plan.votes()
            .filter(|(_, v)| *v == value)
            .map(|(id, _)| id)
            .collect()
    }

    #[test]
    fn test_fault_count() {
        assert_eq!(fault_count(1), 0);
        assert_eq!(fault_count(3), 0);
        assert_eq!(fault_count(4), 1);
        assert_eq!(fault_count(7), 2);
        assert_eq!(fault_count(10), 3);
        assert_eq!(fault_count(0), 0);
    }

    #[test]
    fn test_quorum_threshold() {
        assert_eq!(quorum_threshold(4, 1), 1);
        assert_eq!(quorum_threshold(7, 2), 1);
        assert_eq!(quorum_threshold(10, 3), 2);
        assert_eq!(quorum_threshold(2, 0), 1);
    }

    #[test]
    fn test_validator_range() {
        let range = ValidatorRange::inclusive(2, 4);
        assert_eq!(range.len(), 3);
        assert!(range.contains(2) && range.contains(4));
        assert!(!range.contains(5));
        assert_eq!(range.to_string(), "[2, 4]");

        let empty = ValidatorRange::inclusive(3, 2);
        assert!(empty.is_empty());
        assert_eq!(empty.ids().count(), 0);
        assert_eq!(empty.to_string(), "[]");

        let from_one_to_zero = ValidatorRange::inclusive(1, 0);
        assert!(from_one_to_zero.is_empty());
    }

    #[test]
    fn test_four_validators_first_round() {
        let plan = partition(4, 1, 1, true, false).unwrap();
        assert_eq!(voters(&plan, DecisionValue::Value1), vec![1, 2, 3]);
        assert!(voters(&plan, DecisionValue::Value2).is_empty());
        assert_eq!(
            plan.groups[1],
            VoteGroup {
                validators: ValidatorRange::inclusive(4, 4),
                value: None
            }
        );
    }

    #[test]
    fn test_seven_validators_three_rounds() {
        let first = partition(7, 2, 1, true, false).unwrap();
        assert_eq!(voters(&first, DecisionValue::Value1), vec![1, 2, 3, 4, 5]);

        let middle = partition(7, 2, 2, false, false).unwrap();
        assert_eq!(middle.votes().count(), 0);

        let last = partition(7, 2, 3, false, true).unwrap();
        assert_eq!(voters(&last, DecisionValue::Value2), vec![1, 2, 3, 4, 6, 7]);
        assert!(voters(&last, DecisionValue::Value1).is_empty());
    }

    #[test]
    fn test_single_round_is_first_and_last() {
        let plan = partition(4, 1, 1, true, true).unwrap();
        let votes: Vec<_> = plan.votes().collect();
        assert_eq!(
            votes,
            vec![
                (1, DecisionValue::Value1),
                (2, DecisionValue::Value1),
                (3, DecisionValue::Value1),
                (1, DecisionValue::Value2),
                (2, DecisionValue::Value2),
                (4, DecisionValue::Value2),
            ]
        );
    }

    #[test]
    fn test_no_faulty_validators() {
        // F = 0: the byzantine block is empty and emits nothing
        let last = partition(3, 0, 2, false, true).unwrap();
        assert_eq!(voters(&last, DecisionValue::Value2), vec![2, 3]);
        assert!(last.groups[0].validators.is_empty());
    }

    #[test]
    fn test_infeasible_single_validator() {
        let result = partition(1, 0, 1, true, true);
        assert!(matches!(
            result,
            Err(FixtureError::InfeasiblePartition { validators: 1, .. })
        ));
    }

    #[test]
    fn test_infeasible_fault_count() {
        let result = QuorumLayout::derive(4, 2);
        assert!(matches!(result, Err(FixtureError::InfeasiblePartition { .. })));
    }

    #[test]
    fn test_plan_build() {
        let config = GeneratorConfig::new().with_validators(7).with_rounds(3);
        let plan = PartitionPlan::build(&config).unwrap();
        assert_eq!(plan.rounds.len(), 3);
        assert_eq!(plan.fault_count, 2);
        assert_eq!(plan.quorum_threshold, 1);
        assert!(plan.rounds[0].is_first && !plan.rounds[0].is_last);
        assert!(plan.rounds[2].is_last);
        assert_eq!(
            plan.rounds.iter().map(|r| r.round).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_plan_rejects_invalid_config() {
        let config = GeneratorConfig::new().with_validators(0);
        assert!(matches!(
            PartitionPlan::build(&config),
            Err(FixtureError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_plan_json() {
        let config = GeneratorConfig::new().with_validators(4).with_rounds(2);
        let json = PartitionPlan::build(&config).unwrap().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["fault_count"], 1);
        assert_eq!(value["rounds"][0]["groups"][0]["value"], "value1");
        assert_eq!(value["rounds"][1]["groups"][0]["value"], "value2");
    }
}
