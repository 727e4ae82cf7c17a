//! Status line shown to the table after each transition.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::quest::QuestResult;

/// Structured status message; `Display` renders the English line.
///
/// Rounds and attempts are 1-based for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameMessage {
    ProposalTurn {
        round: usize,
        attempt: u8,
        leader: String,
        team_size: usize,
    },
    ProposalRejected {
        attempt: u8,
        leader: String,
        team_size: usize,
    },
    TeamApproved,
    QuestResolved {
        round: usize,
        result: QuestResult,
        leader: String,
    },
    VoteTrackExhausted,
    EvilQuestVictory,
    AssassinHunt {
        assassin: Option<String>,
    },
    MerlinAssassinated {
        target: String,
    },
    AssassinMissed {
        target: String,
    },
}

impl fmt::Display for GameMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProposalTurn {
                round,
                attempt,
                leader,
                team_size,
            } => write!(
                f,
                "Round {round}, vote {attempt}: {leader}, choose {team_size} players for the quest."
            ),
            Self::ProposalRejected {
                attempt,
                leader,
                team_size,
            } => write!(
                f,
                "The team was rejected. Vote {attempt}: {leader} now leads and must choose {team_size} players."
            ),
            Self::TeamApproved => {
                f.write_str("Team approved! Quest members, play your cards in secret.")
            }
            Self::QuestResolved {
                round,
                result,
                leader,
            } => write!(f, "Quest {round} {result}. New leader: {leader}."),
            Self::VoteTrackExhausted => {
                f.write_str("Five proposals rejected in a row! Evil wins.")
            }
            Self::EvilQuestVictory => f.write_str("Evil has failed three quests and wins!"),
            Self::AssassinHunt { assassin } => match assassin {
                Some(name) => write!(
                    f,
                    "Good has won three quests! {name}, the Assassin, must now find Merlin."
                ),
                None => f.write_str("Good has won three quests! The Assassin must now find Merlin."),
            },
            Self::MerlinAssassinated { target } => {
                write!(f, "The Assassin struck down {target}, who was Merlin. Evil wins!")
            }
            Self::AssassinMissed { target } => write!(
                f,
                "The Assassin chose {target}, who was not Merlin. Good wins!"
            ),
        }
    }
}
