//! Static role and quest tables keyed by player count.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{MAX_PLAYERS, MIN_PLAYERS, QUEST_COUNT};
use crate::roles::Role;
use crate::roles::Role::{
    Agravaine, Assassin, Isolde, LoyalServant, Merlin, Mordred, Morgana, Oberon, Percival,
    Tristan,
};

/// Raised when a table lookup falls outside the supported player range.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported player count {count} (expected {min}..={max})")]
    UnsupportedPlayerCount { count: usize, min: usize, max: usize },
}

impl ConfigError {
    const fn unsupported(count: usize) -> Self {
        Self::UnsupportedPlayerCount {
            count,
            min: MIN_PLAYERS,
            max: MAX_PLAYERS,
        }
    }
}

/// Role multiset for one table, split by team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleConfig {
    pub good: Vec<Role>,
    pub evil: Vec<Role>,
}

impl RoleConfig {
    #[must_use]
    pub fn len(&self) -> usize {
        self.good.len() + self.evil.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.good.is_empty() && self.evil.is_empty()
    }

    /// Good roles followed by evil roles, ready to be shuffled.
    #[must_use]
    pub fn all_roles(&self) -> Vec<Role> {
        let mut roles = Vec::with_capacity(self.len());
        roles.extend_from_slice(&self.good);
        roles.extend_from_slice(&self.evil);
        roles
    }
}

/// Per-round team sizes and fail thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestRules {
    pub team_sizes: [usize; QUEST_COUNT],
    pub fails_required: [usize; QUEST_COUNT],
}

const GOOD_5: &[Role] = &[Merlin, Percival, LoyalServant];
const GOOD_6_7: &[Role] = &[Merlin, Percival, LoyalServant, LoyalServant];
const GOOD_8: &[Role] = &[Merlin, Percival, Tristan, Isolde, LoyalServant];
const GOOD_9_10: &[Role] = &[
    Merlin,
    Percival,
    Tristan,
    Isolde,
    LoyalServant,
    LoyalServant,
];

const EVIL_5_6: &[Role] = &[Morgana, Assassin];
const EVIL_7_9: &[Role] = &[Morgana, Assassin, Mordred];
const EVIL_8: &[Role] = &[Morgana, Assassin, Oberon];
const EVIL_10: &[Role] = &[Morgana, Assassin, Mordred, Oberon];

/// Base role split for the table size, ignoring expansions.
fn base_roles(count: usize) -> Result<(&'static [Role], &'static [Role]), ConfigError> {
    match count {
        5 => Ok((GOOD_5, EVIL_5_6)),
        6 => Ok((GOOD_6_7, EVIL_5_6)),
        7 => Ok((GOOD_6_7, EVIL_7_9)),
        8 => Ok((GOOD_8, EVIL_8)),
        9 => Ok((GOOD_9_10, EVIL_7_9)),
        10 => Ok((GOOD_9_10, EVIL_10)),
        other => Err(ConfigError::unsupported(other)),
    }
}

/// Exact role multiset for `count` players.
///
/// With `expansion` enabled, tables of seven or more swap Mordred for
/// Agravaine when Mordred is dealt; every other table is unchanged.
///
/// # Errors
///
/// Returns [`ConfigError::UnsupportedPlayerCount`] outside 5..=10.
pub fn roles_for(count: usize, expansion: bool) -> Result<RoleConfig, ConfigError> {
    let (good, evil) = base_roles(count)?;
    let mut config = RoleConfig {
        good: good.to_vec(),
        evil: evil.to_vec(),
    };
    if expansion && count >= 7 {
        if let Some(slot) = config.evil.iter_mut().find(|r| **r == Mordred) {
            *slot = Agravaine;
        }
    }
    Ok(config)
}

/// Quest table for `count` players.
///
/// # Errors
///
/// Returns [`ConfigError::UnsupportedPlayerCount`] outside 5..=10.
pub fn quest_rules_for(count: usize) -> Result<QuestRules, ConfigError> {
    let (team_sizes, fails_required) = match count {
        5 => ([2, 3, 2, 3, 3], [1, 1, 1, 1, 1]),
        6 => ([2, 3, 4, 3, 4], [1, 1, 1, 1, 1]),
        7 => ([2, 3, 3, 4, 4], [1, 1, 1, 2, 1]),
        8..=10 => ([3, 4, 4, 5, 5], [1, 1, 1, 2, 1]),
        other => return Err(ConfigError::unsupported(other)),
    };
    Ok(QuestRules {
        team_sizes,
        fails_required,
    })
}

#[must_use]
pub const fn is_supported_player_count(count: usize) -> bool {
    count >= MIN_PLAYERS && count <= MAX_PLAYERS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::Team;

    #[test]
    fn role_counts_match_player_counts() {
        for count in MIN_PLAYERS..=MAX_PLAYERS {
            for expansion in [false, true] {
                let config = roles_for(count, expansion).unwrap();
                assert_eq!(config.len(), count, "count {count}");
                assert!(config.good.iter().all(|r| r.team() == Team::Good));
                assert!(config.evil.iter().all(|r| r.team() == Team::Evil));
                let assassins = config
                    .all_roles()
                    .into_iter()
                    .filter(|r| *r == Assassin)
                    .count();
                assert_eq!(assassins, 1);
                assert_eq!(
                    config.good.iter().filter(|r| **r == Merlin).count(),
                    1,
                    "every table deals exactly one Merlin"
                );
            }
        }
    }

    #[test]
    fn evil_share_follows_table_size() {
        let evil: Vec<usize> = (MIN_PLAYERS..=MAX_PLAYERS)
            .map(|n| roles_for(n, false).unwrap().evil.len())
            .collect();
        assert_eq!(evil, vec![2, 2, 3, 3, 3, 4]);
    }

    #[test]
    fn expansion_swaps_mordred_for_agravaine_from_seven() {
        let seven = roles_for(7, true).unwrap();
        assert_eq!(seven.evil, vec![Morgana, Assassin, Agravaine]);
        let ten = roles_for(10, true).unwrap();
        assert_eq!(ten.evil, vec![Morgana, Assassin, Agravaine, Oberon]);
    }

    #[test]
    fn expansion_leaves_tables_without_mordred_alone() {
        for count in [5, 6, 8] {
            assert_eq!(
                roles_for(count, true).unwrap(),
                roles_for(count, false).unwrap()
            );
        }
    }

    #[test]
    fn unsupported_counts_are_rejected() {
        for count in [0, 4, 11, 42] {
            assert_eq!(
                roles_for(count, false),
                Err(ConfigError::UnsupportedPlayerCount {
                    count,
                    min: 5,
                    max: 10
                })
            );
            assert!(quest_rules_for(count).is_err());
            assert!(!is_supported_player_count(count));
        }
    }

    #[test]
    fn quest_table_matches_rulebook() {
        let five = quest_rules_for(5).unwrap();
        assert_eq!(five.team_sizes, [2, 3, 2, 3, 3]);
        assert_eq!(five.fails_required, [1, 1, 1, 1, 1]);
        let six = quest_rules_for(6).unwrap();
        assert_eq!(six.team_sizes, [2, 3, 4, 3, 4]);
        let seven = quest_rules_for(7).unwrap();
        assert_eq!(seven.team_sizes, [2, 3, 3, 4, 4]);
        assert_eq!(seven.fails_required, [1, 1, 1, 2, 1]);
        for count in 8..=10 {
            let rules = quest_rules_for(count).unwrap();
            assert_eq!(rules.team_sizes, [3, 4, 4, 5, 5]);
            assert_eq!(rules.fails_required, [1, 1, 1, 2, 1]);
        }
    }

    #[test]
    fn error_message_names_the_range() {
        let err = quest_rules_for(3).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported player count 3 (expected 5..=10)"
        );
    }
}
