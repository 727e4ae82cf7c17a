//! Role catalogue: teams, static descriptions, and what each role learns at night.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::player::{Player, PlayerId, find_player, has_role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Good,
    Evil,
}

impl Team {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Evil => "evil",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    // Good
    Merlin,
    Percival,
    LoyalServant,
    Tristan,
    Isolde,
    // Evil
    Morgana,
    Assassin,
    Mordred,
    Oberon,
    // Expansion
    Agravaine,
    Lancelot,
}

impl Role {
    pub const ALL: [Self; 11] = [
        Self::Merlin,
        Self::Percival,
        Self::LoyalServant,
        Self::Tristan,
        Self::Isolde,
        Self::Morgana,
        Self::Assassin,
        Self::Mordred,
        Self::Oberon,
        Self::Agravaine,
        Self::Lancelot,
    ];

    #[must_use]
    pub const fn team(self) -> Team {
        match self {
            Self::Merlin | Self::Percival | Self::LoyalServant | Self::Tristan | Self::Isolde => {
                Team::Good
            }
            Self::Morgana
            | Self::Assassin
            | Self::Mordred
            | Self::Oberon
            | Self::Agravaine
            | Self::Lancelot => Team::Evil,
        }
    }

    /// Machine-friendly identifier, stable across releases.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Merlin => "merlin",
            Self::Percival => "percival",
            Self::LoyalServant => "loyal_servant",
            Self::Tristan => "tristan",
            Self::Isolde => "isolde",
            Self::Morgana => "morgana",
            Self::Assassin => "assassin",
            Self::Mordred => "mordred",
            Self::Oberon => "oberon",
            Self::Agravaine => "agravaine",
            Self::Lancelot => "lancelot",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Merlin => "Merlin",
            Self::Percival => "Percival",
            Self::LoyalServant => "Loyal Servant",
            Self::Tristan => "Tristan",
            Self::Isolde => "Isolde",
            Self::Morgana => "Morgana",
            Self::Assassin => "Assassin",
            Self::Mordred => "Mordred",
            Self::Oberon => "Oberon",
            Self::Agravaine => "Agravaine",
            Self::Lancelot => "Lancelot",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Merlin => {
                "Sees the servants of evil, save Mordred. Guide your side quietly: if the Assassin finds you, all is lost."
            }
            Self::Percival => {
                "Knows the two faces that might be Merlin. One of them is Morgana wearing his mask."
            }
            Self::LoyalServant => {
                "Knows nothing but the cause. Watch the votes and the failed quests."
            }
            Self::Tristan => "Good. Wakes beside Isolde and knows her for certain.",
            Self::Isolde => "Good. Wakes beside Tristan and knows him for certain.",
            Self::Morgana => "Evil. Appears as Merlin to Percival and knows her fellow agents.",
            Self::Assassin => {
                "Evil. If Good wins three quests, names one Good player: if it is Merlin, Evil wins."
            }
            Self::Mordred => "Evil. Hidden from Merlin's sight.",
            Self::Oberon => "Evil, but alone: unknown to the other agents and knowing none of them.",
            Self::Agravaine => "Evil. A plain agent of the expansion set who knows his allies.",
            Self::Lancelot => "Evil. A fallen knight of the expansion set who knows his allies.",
        }
    }

    /// Compute what a player holding this role is told during the reveal.
    #[must_use]
    pub fn knowledge(self, players: &[Player], me: PlayerId) -> RoleKnowledge {
        match self {
            Self::Merlin => RoleKnowledge::SeesEvil {
                players: ids_where(players, |p| p.is_evil() && p.role != Self::Mordred),
                mordred_hidden: has_role(players, Self::Mordred),
            },
            Self::Percival => RoleKnowledge::MerlinCandidates {
                players: ids_where(players, |p| {
                    matches!(p.role, Self::Merlin | Self::Morgana)
                }),
            },
            Self::LoyalServant => RoleKnowledge::Nothing,
            Self::Tristan => RoleKnowledge::Lover {
                partner: ids_where(players, |p| p.role == Self::Isolde).first().copied(),
            },
            Self::Isolde => RoleKnowledge::Lover {
                partner: ids_where(players, |p| p.role == Self::Tristan).first().copied(),
            },
            Self::Oberon => RoleKnowledge::Isolated,
            Self::Morgana | Self::Assassin | Self::Mordred | Self::Agravaine | Self::Lancelot => {
                RoleKnowledge::EvilAllies {
                    players: ids_where(players, |p| {
                        p.is_evil() && p.id != me && p.role != Self::Oberon
                    }),
                    oberon_hidden: has_role(players, Self::Oberon),
                }
            }
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or(())
    }
}

fn ids_where(players: &[Player], pred: impl Fn(&Player) -> bool) -> Vec<PlayerId> {
    players.iter().filter(|p| pred(p)).map(|p| p.id).collect()
}

/// Private information revealed to a single player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoleKnowledge {
    /// Merlin: every Evil player except Mordred.
    SeesEvil {
        players: Vec<PlayerId>,
        mordred_hidden: bool,
    },
    /// Percival: Merlin and Morgana, in seat order.
    MerlinCandidates { players: Vec<PlayerId> },
    /// Tristan and Isolde.
    Lover { partner: Option<PlayerId> },
    /// Evil agents other than Oberon.
    EvilAllies {
        players: Vec<PlayerId>,
        oberon_hidden: bool,
    },
    /// Oberon.
    Isolated,
    Nothing,
}

impl RoleKnowledge {
    /// Render the knowledge as a sentence naming players from `roster`.
    #[must_use]
    pub fn describe(&self, roster: &[Player]) -> String {
        match self {
            Self::SeesEvil {
                players,
                mordred_hidden,
            } => {
                let caveat = if *mordred_hidden {
                    " (Mordred is hidden from you)"
                } else {
                    ""
                };
                format!("The servants of evil{caveat}: {}.", names(roster, players))
            }
            Self::MerlinCandidates { players } => match players.len() {
                0 => "Neither Merlin nor Morgana is in this game.".to_string(),
                1 => format!("Merlin is {}.", names(roster, players)),
                _ => format!(
                    "One of these is Merlin, the other Morgana: {}.",
                    names(roster, players)
                ),
            },
            Self::Lover { partner } => match partner.and_then(|id| find_player(roster, id)) {
                Some(partner) => format!("Your beloved is {}.", partner.name),
                None => "Your beloved is not in this game.".to_string(),
            },
            Self::EvilAllies {
                players,
                oberon_hidden,
            } => {
                let caveat = if *oberon_hidden {
                    " (Oberon is not among them)"
                } else {
                    ""
                };
                if players.is_empty() {
                    format!("You are the only known agent of evil{caveat}.")
                } else {
                    format!("Your fellow agents{caveat}: {}.", names(roster, players))
                }
            }
            Self::Isolated => "You know no one. In the shadows there are no friends.".to_string(),
            Self::Nothing => "Loyalty is the greatest weapon of the good.".to_string(),
        }
    }
}

fn names(roster: &[Player], ids: &[PlayerId]) -> String {
    ids.iter()
        .filter_map(|id| find_player(roster, *id))
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(roles: &[Role]) -> Vec<Player> {
        roles
            .iter()
            .enumerate()
            .map(|(i, role)| Player::new(PlayerId(i), format!("P{i}"), *role))
            .collect()
    }

    #[test]
    fn every_role_has_fixed_team() {
        let evil: Vec<_> = Role::ALL
            .into_iter()
            .filter(|r| r.team() == Team::Evil)
            .collect();
        assert_eq!(
            evil,
            vec![
                Role::Morgana,
                Role::Assassin,
                Role::Mordred,
                Role::Oberon,
                Role::Agravaine,
                Role::Lancelot
            ]
        );
    }

    #[test]
    fn role_ids_round_trip_through_from_str() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert!("sir_not_appearing".parse::<Role>().is_err());
    }

    #[test]
    fn merlin_sees_evil_except_mordred() {
        let players = roster(&[
            Role::Merlin,
            Role::Morgana,
            Role::Mordred,
            Role::Oberon,
            Role::LoyalServant,
        ]);
        let knowledge = Role::Merlin.knowledge(&players, PlayerId(0));
        assert_eq!(
            knowledge,
            RoleKnowledge::SeesEvil {
                players: vec![PlayerId(1), PlayerId(3)],
                mordred_hidden: true,
            }
        );
        assert!(knowledge.describe(&players).contains("Mordred is hidden"));
    }

    #[test]
    fn percival_sees_merlin_and_morgana() {
        let players = roster(&[
            Role::Morgana,
            Role::Percival,
            Role::Merlin,
            Role::Assassin,
            Role::LoyalServant,
        ]);
        assert_eq!(
            Role::Percival.knowledge(&players, PlayerId(1)),
            RoleKnowledge::MerlinCandidates {
                players: vec![PlayerId(0), PlayerId(2)]
            }
        );
    }

    #[test]
    fn lovers_know_each_other() {
        let players = roster(&[Role::Tristan, Role::Isolde, Role::Assassin]);
        assert_eq!(
            Role::Tristan.knowledge(&players, PlayerId(0)),
            RoleKnowledge::Lover {
                partner: Some(PlayerId(1))
            }
        );
        assert_eq!(
            Role::Isolde.knowledge(&players, PlayerId(1)),
            RoleKnowledge::Lover {
                partner: Some(PlayerId(0))
            }
        );
        let alone = roster(&[Role::Tristan, Role::Assassin]);
        let knowledge = Role::Tristan.knowledge(&alone, PlayerId(0));
        assert_eq!(knowledge, RoleKnowledge::Lover { partner: None });
        assert_eq!(knowledge.describe(&alone), "Your beloved is not in this game.");
    }

    #[test]
    fn evil_agents_skip_oberon_and_self() {
        let players = roster(&[
            Role::Morgana,
            Role::Assassin,
            Role::Oberon,
            Role::Merlin,
            Role::Mordred,
        ]);
        assert_eq!(
            Role::Assassin.knowledge(&players, PlayerId(1)),
            RoleKnowledge::EvilAllies {
                players: vec![PlayerId(0), PlayerId(4)],
                oberon_hidden: true,
            }
        );
        assert_eq!(
            Role::Oberon.knowledge(&players, PlayerId(2)),
            RoleKnowledge::Isolated
        );
    }

    #[test]
    fn lone_agent_is_told_so() {
        let players = roster(&[Role::Assassin, Role::Merlin, Role::Oberon]);
        let knowledge = Role::Assassin.knowledge(&players, PlayerId(0));
        assert_eq!(
            knowledge.describe(&players),
            "You are the only known agent of evil (Oberon is not among them)."
        );
    }
}
