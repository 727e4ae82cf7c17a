//! Roundtable Game Engine
//!
//! Platform-agnostic core logic for a pass-the-device hidden-role quest game.
//! This crate provides the role tables, the state machine and the night
//! narration without any UI or platform-specific dependencies.

pub mod config;
pub mod constants;
pub mod message;
pub mod night;
pub mod player;
pub mod quest;
pub mod rng;
pub mod roles;
pub mod session;
pub mod state;

// Re-export commonly used types
pub use config::{
    ConfigError, QuestRules, RoleConfig, is_supported_player_count, quest_rules_for, roles_for,
};
pub use message::GameMessage;
pub use night::{NarrationStep, NightCue, night_script};
pub use player::{Player, PlayerId};
pub use quest::{OutcomeSet, Quest, QuestOutcome, QuestResult, QuestTeam, resolve_outcomes};
pub use rng::{CountingRng, RngBundle};
pub use roles::{Role, RoleKnowledge, Team};
pub use session::GameSession;
pub use state::{
    Command, Deal, GameError, GamePhase, GameSetup, GameState, Victory, VictoryCause,
};
