use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::config::QuestRules;
use crate::constants::MAX_TEAM_SIZE;
use crate::player::PlayerId;

/// Quest teams never exceed five seats, so they stay inline.
pub type QuestTeam = SmallVec<[PlayerId; MAX_TEAM_SIZE]>;
/// Outcome cards played on a single quest.
pub type OutcomeSet = SmallVec<[QuestOutcome; MAX_TEAM_SIZE]>;

/// Secret card played by a quest member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestOutcome {
    Success,
    Fail,
}

impl fmt::Display for QuestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("Success"),
            Self::Fail => f.write_str("Fail"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum QuestResult {
    #[default]
    Pending,
    Success,
    Fail,
}

impl QuestResult {
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for QuestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Success => f.write_str("succeeded"),
            Self::Fail => f.write_str("failed"),
        }
    }
}

/// One of the five rounds of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub id: usize,
    pub team_size: usize,
    pub fails_required: usize,
    #[serde(default)]
    pub result: QuestResult,
    #[serde(default)]
    pub team: QuestTeam,
    #[serde(default)]
    pub outcomes: OutcomeSet,
}

impl Quest {
    #[must_use]
    pub fn new(id: usize, team_size: usize, fails_required: usize) -> Self {
        Self {
            id,
            team_size,
            fails_required,
            result: QuestResult::Pending,
            team: QuestTeam::new(),
            outcomes: OutcomeSet::new(),
        }
    }

    /// Build the five quests of a game from its rule table.
    #[must_use]
    pub fn from_rules(rules: &QuestRules) -> Vec<Self> {
        rules
            .team_sizes
            .iter()
            .zip(rules.fails_required.iter())
            .enumerate()
            .map(|(id, (&size, &fails))| Self::new(id, size, fails))
            .collect()
    }

    /// Result the given cards produce against this quest's threshold.
    #[must_use]
    pub fn judge(&self, outcomes: &[QuestOutcome]) -> QuestResult {
        resolve_outcomes(outcomes, self.fails_required)
    }

    #[must_use]
    pub fn fail_count(&self) -> usize {
        count_fails(&self.outcomes)
    }

    /// Attach the final team, cards and verdict. Only the first call takes effect.
    pub(crate) fn commit(&mut self, team: QuestTeam, outcomes: OutcomeSet) -> QuestResult {
        if self.result.is_resolved() {
            return self.result;
        }
        self.result = self.judge(&outcomes);
        self.team = team;
        self.outcomes = outcomes;
        self.result
    }
}

#[must_use]
pub fn count_fails(outcomes: &[QuestOutcome]) -> usize {
    outcomes
        .iter()
        .filter(|o| **o == QuestOutcome::Fail)
        .count()
}

/// A quest fails once the fail cards reach the threshold; order is irrelevant.
#[must_use]
pub fn resolve_outcomes(outcomes: &[QuestOutcome], fails_required: usize) -> QuestResult {
    if count_fails(outcomes) >= fails_required {
        QuestResult::Fail
    } else {
        QuestResult::Success
    }
}

/// Tally of resolved quests as `(successes, fails)`.
#[must_use]
pub fn tally(quests: &[Quest]) -> (usize, usize) {
    quests.iter().fold((0, 0), |(ok, bad), q| match q.result {
        QuestResult::Success => (ok + 1, bad),
        QuestResult::Fail => (ok, bad + 1),
        QuestResult::Pending => (ok, bad),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::quest_rules_for;
    use smallvec::smallvec;

    use super::QuestOutcome::{Fail, Success};

    #[test]
    fn quests_follow_rule_table() {
        let quests = Quest::from_rules(&quest_rules_for(7).unwrap());
        assert_eq!(quests.len(), 5);
        assert_eq!(quests[3].team_size, 4);
        assert_eq!(quests[3].fails_required, 2);
        assert!(quests.iter().all(|q| q.result == QuestResult::Pending));
        assert_eq!(
            quests.iter().map(|q| q.id).collect::<Vec<_>>(),
            vec![0, 1, 2, 3, 4]
        );
    }

    #[test]
    fn single_fail_sinks_ordinary_quest() {
        assert_eq!(resolve_outcomes(&[Success, Fail], 1), QuestResult::Fail);
        assert_eq!(resolve_outcomes(&[Success, Success], 1), QuestResult::Success);
    }

    #[test]
    fn two_fail_quest_survives_one_fail() {
        assert_eq!(
            resolve_outcomes(&[Fail, Success, Success, Success], 2),
            QuestResult::Success
        );
        assert_eq!(
            resolve_outcomes(&[Success, Fail, Success, Fail], 2),
            QuestResult::Fail
        );
    }

    #[test]
    fn commit_is_write_once() {
        let mut quest = Quest::new(0, 2, 1);
        let first = quest.commit(smallvec![PlayerId(0), PlayerId(1)], smallvec![Fail, Success]);
        assert_eq!(first, QuestResult::Fail);
        let second = quest.commit(smallvec![PlayerId(2), PlayerId(3)], smallvec![Success, Success]);
        assert_eq!(second, QuestResult::Fail);
        assert_eq!(quest.team.as_slice(), &[PlayerId(0), PlayerId(1)]);
        assert_eq!(quest.fail_count(), 1);
    }

    #[test]
    fn tally_counts_only_resolved_quests() {
        let mut quests = Quest::from_rules(&quest_rules_for(5).unwrap());
        quests[0].commit(smallvec![PlayerId(0), PlayerId(1)], smallvec![Success, Success]);
        quests[1].commit(
            smallvec![PlayerId(0), PlayerId(1), PlayerId(2)],
            smallvec![Success, Fail, Success],
        );
        assert_eq!(tally(&quests), (1, 1));
    }
}
