use serde::{Deserialize, Serialize};
use std::fmt;

use crate::roles::{Role, Team};

/// Stable seat index assigned at setup; never reused within a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub usize);

impl PlayerId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// A seated player. Created once at setup and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub role: Role,
    pub team: Team,
}

impl Player {
    /// Seat a player; the team always follows from the role.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            team: role.team(),
        }
    }

    #[must_use]
    pub fn is_evil(&self) -> bool {
        self.team == Team::Evil
    }

    #[must_use]
    pub fn is_good(&self) -> bool {
        self.team == Team::Good
    }
}

/// Look up a player by id within a roster.
#[must_use]
pub fn find_player(players: &[Player], id: PlayerId) -> Option<&Player> {
    players.iter().find(|p| p.id == id)
}

/// First player in seat order holding `role`.
#[must_use]
pub fn find_role(players: &[Player], role: Role) -> Option<&Player> {
    players.iter().find(|p| p.role == role)
}

#[must_use]
pub fn has_role(players: &[Player], role: Role) -> bool {
    players.iter().any(|p| p.role == role)
}
