//! Centralized rule constants for Roundtable game logic.
//!
//! These values define the fixed shape of every game. Keeping them together
//! ensures the rules can only be adjusted via reviewed code changes rather
//! than through external assets.

// Logging targets ----------------------------------------------------------
pub(crate) const LOG_TARGET_STATE: &str = "roundtable::state";
pub(crate) const LOG_TARGET_SESSION: &str = "roundtable::session";

// Table shape --------------------------------------------------------------
/// Smallest supported table.
pub const MIN_PLAYERS: usize = 5;
/// Largest supported table.
pub const MAX_PLAYERS: usize = 10;
/// Quests played in a full game.
pub const QUEST_COUNT: usize = 5;
/// Largest team any quest can require.
pub const MAX_TEAM_SIZE: usize = 5;

// Win conditions -----------------------------------------------------------
/// Resolved quests of one result needed to decide the quest phase.
pub const QUESTS_TO_WIN: usize = 3;
/// Consecutive rejected proposals that hand the game to Evil.
pub const MAX_REJECTIONS: u8 = 5;

// RNG stream domains -------------------------------------------------------
pub(crate) const RNG_DOMAIN_DEAL: &[u8] = b"deal";
pub(crate) const RNG_DOMAIN_REVEAL: &[u8] = b"reveal";
