//! The game state machine.
//!
//! [`GameState`] is a plain value; every command validates its guard first
//! and only then mutates, so an `Err` always leaves the state untouched.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{ConfigError, RoleConfig, is_supported_player_count, quest_rules_for, roles_for};
use crate::constants::{LOG_TARGET_STATE, MAX_PLAYERS, MAX_REJECTIONS, MIN_PLAYERS, QUESTS_TO_WIN};
use crate::message::GameMessage;
use crate::night::{NarrationStep, night_script};
use crate::player::{Player, PlayerId, find_player, find_role};
use crate::quest::{OutcomeSet, Quest, QuestOutcome, QuestTeam, tally};
use crate::roles::{Role, RoleKnowledge, Team};

const GOOD_OUTCOMES: &[QuestOutcome] = &[QuestOutcome::Success];
const EVIL_OUTCOMES: &[QuestOutcome] = &[QuestOutcome::Success, QuestOutcome::Fail];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    #[default]
    Setup,
    RoleReveal,
    NarratedNight,
    TeamProposal,
    TeamVote,
    QuestExecution,
    QuestResult,
    Assassination,
    GameOver,
}

impl GamePhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::RoleReveal => "role_reveal",
            Self::NarratedNight => "narrated_night",
            Self::TeamProposal => "team_proposal",
            Self::TeamVote => "team_vote",
            Self::QuestExecution => "quest_execution",
            Self::QuestResult => "quest_result",
            Self::Assassination => "assassination",
            Self::GameOver => "game_over",
        }
    }

    /// Only a reset leaves this phase.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver)
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GamePhase {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "setup" => Ok(Self::Setup),
            "role_reveal" => Ok(Self::RoleReveal),
            "narrated_night" => Ok(Self::NarratedNight),
            "team_proposal" => Ok(Self::TeamProposal),
            "team_vote" => Ok(Self::TeamVote),
            "quest_execution" => Ok(Self::QuestExecution),
            "quest_result" => Ok(Self::QuestResult),
            "assassination" => Ok(Self::Assassination),
            "game_over" => Ok(Self::GameOver),
            _ => Err(()),
        }
    }
}

/// Reasons a command is refused. The state is unchanged whenever one is returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("expected {expected} player names, got {actual}")]
    NameCountMismatch { expected: usize, actual: usize },
    #[error("player name at position {index} is empty")]
    EmptyName { index: usize },
    #[error("player name {name:?} is used more than once")]
    DuplicateName { name: String },
    #[error("dealt roles do not match the table for this player count")]
    DealMismatch,
    #[error("leader index {index} is out of range for {players} players")]
    LeaderOutOfRange { index: usize, players: usize },
    #[error("{command} is not allowed during {phase}")]
    WrongPhase {
        command: &'static str,
        phase: GamePhase,
    },
    #[error("quest needs {required} players but {selected} are selected")]
    TeamSizeMismatch { required: usize, selected: usize },
    #[error("no player with id {id}")]
    UnknownPlayer { id: PlayerId },
    #[error("player {id} is not on the current quest")]
    NotOnQuest { id: PlayerId },
    #[error("player {id} may not play that card")]
    IllegalOutcome { id: PlayerId },
    #[error("player {id} is not a legal assassination target")]
    IllegalTarget { id: PlayerId },
    #[error("no quest is laid out for round {round}")]
    MissingQuest { round: usize },
}

/// Why the game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VictoryCause {
    QuestsFailed,
    VoteTrackExhausted,
    MerlinAssassinated,
    AssassinMissed,
}

impl VictoryCause {
    #[must_use]
    pub const fn winner(self) -> Team {
        match self {
            Self::QuestsFailed | Self::VoteTrackExhausted | Self::MerlinAssassinated => Team::Evil,
            Self::AssassinMissed => Team::Good,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::QuestsFailed => "quests_failed",
            Self::VoteTrackExhausted => "vote_track_exhausted",
            Self::MerlinAssassinated => "merlin_assassinated",
            Self::AssassinMissed => "assassin_missed",
        }
    }
}

impl fmt::Display for VictoryCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Victory {
    pub winner: Team,
    pub cause: VictoryCause,
}

impl From<VictoryCause> for Victory {
    fn from(cause: VictoryCause) -> Self {
        Self {
            winner: cause.winner(),
            cause,
        }
    }
}

/// Options chosen before the first role is dealt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSetup {
    pub player_count: usize,
    pub names: Vec<String>,
    #[serde(default)]
    pub narrated_night: bool,
    #[serde(default)]
    pub expansion: bool,
}

impl GameSetup {
    /// Setup for `names.len()` players with both options off.
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        Self {
            player_count: names.len(),
            names,
            narrated_night: false,
            expansion: false,
        }
    }

    #[must_use]
    pub fn with_narrated_night(mut self, enabled: bool) -> Self {
        self.narrated_night = enabled;
        self
    }

    #[must_use]
    pub fn with_expansion(mut self, enabled: bool) -> Self {
        self.expansion = enabled;
        self
    }

    /// Check the options and return the trimmed names.
    ///
    /// # Errors
    ///
    /// Fails for an unsupported player count, a name list of the wrong
    /// length, and empty or repeated names.
    pub fn validate(&self) -> Result<Vec<String>, GameError> {
        if !is_supported_player_count(self.player_count) {
            return Err(ConfigError::UnsupportedPlayerCount {
                count: self.player_count,
                min: MIN_PLAYERS,
                max: MAX_PLAYERS,
            }
            .into());
        }
        if self.names.len() != self.player_count {
            return Err(GameError::NameCountMismatch {
                expected: self.player_count,
                actual: self.names.len(),
            });
        }
        let mut seen = HashSet::with_capacity(self.names.len());
        let mut names = Vec::with_capacity(self.names.len());
        for (index, raw) in self.names.iter().enumerate() {
            let name = raw.trim();
            if name.is_empty() {
                return Err(GameError::EmptyName { index });
            }
            if !seen.insert(name) {
                return Err(GameError::DuplicateName {
                    name: name.to_string(),
                });
            }
            names.push(name.to_string());
        }
        Ok(names)
    }
}

/// Outcome of the two random draws made at setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deal {
    /// Role for each seat, in seat order.
    pub roles: Vec<Role>,
    /// Seat of the opening leader.
    pub leader: usize,
}

impl Deal {
    /// Shuffle the configured roles and draw an opening leader uniformly.
    pub fn shuffled<R: Rng + ?Sized>(config: &RoleConfig, rng: &mut R) -> Self {
        let mut roles = config.all_roles();
        roles.shuffle(rng);
        let leader = if roles.is_empty() {
            0
        } else {
            rng.gen_range(0..roles.len())
        };
        Self { roles, leader }
    }

    fn matches(&self, config: &RoleConfig) -> bool {
        let mut dealt = self.roles.clone();
        let mut expected = config.all_roles();
        dealt.sort_unstable();
        expected.sort_unstable();
        dealt == expected
    }
}

/// Every input the state machine accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Setup(GameSetup),
    AdvanceRoleReveal,
    AdvanceNightPhase,
    FinishNarration,
    SelectTeamMember { player: PlayerId },
    ProposeTeam,
    TeamVote { approved: bool },
    SubmitQuestOutcome { outcome: QuestOutcome },
    ProcessQuestResult,
    Assassinate { target: PlayerId },
    Reset,
}

impl Command {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Setup(_) => "setup_game",
            Self::AdvanceRoleReveal => "advance_role_reveal",
            Self::AdvanceNightPhase => "advance_night_phase",
            Self::FinishNarration => "finish_narration",
            Self::SelectTeamMember { .. } => "select_team_member",
            Self::ProposeTeam => "propose_team",
            Self::TeamVote { .. } => "handle_team_vote",
            Self::SubmitQuestOutcome { .. } => "submit_quest_outcome",
            Self::ProcessQuestResult => "process_quest_result",
            Self::Assassinate { .. } => "assassinate",
            Self::Reset => "reset_game",
        }
    }

    /// Whether this command draws from the random source.
    #[must_use]
    pub const fn is_randomized(&self) -> bool {
        matches!(self, Self::Setup(_) | Self::ProcessQuestResult)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Snapshot of one game, read by every presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GameState {
    pub phase: GamePhase,
    pub players: Vec<Player>,
    pub quests: Vec<Quest>,
    pub current_round: usize,
    pub current_leader_index: usize,
    pub vote_track: u8,
    pub current_quest_team: QuestTeam,
    pub active_player_index: usize,
    pub night_step: usize,
    pub temporary_quest_outcomes: OutcomeSet,
    pub message: Option<GameMessage>,
    pub victory: Option<Victory>,
    pub assassin: Option<PlayerId>,
    pub narrated_night: bool,
    pub expansion: bool,
}

impl GameState {
    /// Empty state waiting in `Setup`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one command against the state.
    ///
    /// # Errors
    ///
    /// Returns the command's rejection; the state is left as it was.
    pub fn apply<R: Rng + ?Sized>(&mut self, command: Command, rng: &mut R) -> Result<(), GameError> {
        let name = command.name();
        let result = match command {
            Command::Setup(setup) => self.setup_game(&setup, rng),
            Command::AdvanceRoleReveal => self.advance_role_reveal(),
            Command::AdvanceNightPhase => self.advance_night_phase(),
            Command::FinishNarration => self.finish_narration(),
            Command::SelectTeamMember { player } => self.select_team_member(player),
            Command::ProposeTeam => self.propose_team(),
            Command::TeamVote { approved } => self.handle_team_vote(approved),
            Command::SubmitQuestOutcome { outcome } => self.submit_quest_outcome(outcome),
            Command::ProcessQuestResult => self.process_quest_result(rng),
            Command::Assassinate { target } => self.assassinate(target),
            Command::Reset => {
                self.reset_game();
                Ok(())
            }
        };
        if let Err(err) = &result {
            log::warn!(target: LOG_TARGET_STATE, "rejected {name} in {}: {err}", self.phase);
        }
        result
    }

    // Commands ---------------------------------------------------------------

    /// Deal roles at random and seat the table.
    ///
    /// # Errors
    ///
    /// Rejects anything outside `Setup` and any invalid [`GameSetup`].
    pub fn setup_game<R: Rng + ?Sized>(&mut self, setup: &GameSetup, rng: &mut R) -> Result<(), GameError> {
        self.require(GamePhase::Setup, "setup_game")?;
        setup.validate()?;
        let config = roles_for(setup.player_count, setup.expansion)?;
        let deal = Deal::shuffled(&config, rng);
        self.setup_game_with_deal(setup, deal)
    }

    /// Seat the table with a predetermined deal.
    ///
    /// # Errors
    ///
    /// Rejects anything outside `Setup`, an invalid [`GameSetup`], a deal
    /// that is not a permutation of the configured roles, or a leader seat
    /// outside the table.
    pub fn setup_game_with_deal(&mut self, setup: &GameSetup, deal: Deal) -> Result<(), GameError> {
        self.require(GamePhase::Setup, "setup_game")?;
        let names = setup.validate()?;
        let config = roles_for(setup.player_count, setup.expansion)?;
        let rules = quest_rules_for(setup.player_count)?;
        if !deal.matches(&config) {
            return Err(GameError::DealMismatch);
        }
        if deal.leader >= names.len() {
            return Err(GameError::LeaderOutOfRange {
                index: deal.leader,
                players: names.len(),
            });
        }

        let players = names
            .into_iter()
            .zip(deal.roles)
            .enumerate()
            .map(|(seat, (name, role))| Player::new(PlayerId(seat), name, role))
            .collect();
        *self = Self {
            phase: GamePhase::RoleReveal,
            players,
            quests: Quest::from_rules(&rules),
            current_leader_index: deal.leader,
            narrated_night: setup.narrated_night,
            expansion: setup.expansion,
            ..Self::default()
        };
        log::debug!(
            target: LOG_TARGET_STATE,
            "seated {} players, leader P{}, narrated_night={}, expansion={}",
            self.players.len(),
            deal.leader,
            self.narrated_night,
            self.expansion
        );
        Ok(())
    }

    /// Pass the device to the next player during the private role reveal.
    ///
    /// # Errors
    ///
    /// Rejects anything outside `RoleReveal`.
    pub fn advance_role_reveal(&mut self) -> Result<(), GameError> {
        self.require(GamePhase::RoleReveal, "advance_role_reveal")?;
        let next = self.active_player_index + 1;
        if next < self.players.len() {
            self.active_player_index = next;
            return Ok(());
        }
        self.active_player_index = 0;
        if self.narrated_night {
            self.phase = GamePhase::NarratedNight;
            self.night_step = 0;
            log::debug!(target: LOG_TARGET_STATE, "roles revealed; narrating the night");
        } else {
            self.begin_proposal();
        }
        Ok(())
    }

    /// Step to the next narration line; past the last one the day begins.
    ///
    /// # Errors
    ///
    /// Rejects anything outside `NarratedNight`.
    pub fn advance_night_phase(&mut self) -> Result<(), GameError> {
        self.require(GamePhase::NarratedNight, "advance_night_phase")?;
        let next = self.night_step + 1;
        if next < self.night_script().len() {
            self.night_step = next;
        } else {
            self.begin_proposal();
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Rejects anything outside `NarratedNight`.
    pub fn finish_narration(&mut self) -> Result<(), GameError> {
        self.require(GamePhase::NarratedNight, "finish_narration")?;
        self.begin_proposal();
        Ok(())
    }

    /// Toggle `player` in the working selection. Size is checked on proposal.
    ///
    /// # Errors
    ///
    /// Rejects anything outside `TeamProposal` and unknown players.
    pub fn select_team_member(&mut self, player: PlayerId) -> Result<(), GameError> {
        self.require(GamePhase::TeamProposal, "select_team_member")?;
        self.player(player)
            .ok_or(GameError::UnknownPlayer { id: player })?;
        if let Some(pos) = self.current_quest_team.iter().position(|id| *id == player) {
            self.current_quest_team.remove(pos);
        } else {
            self.current_quest_team.push(player);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Rejects anything outside `TeamProposal` and a selection whose size
    /// differs from the quest's team size.
    pub fn propose_team(&mut self) -> Result<(), GameError> {
        self.require(GamePhase::TeamProposal, "propose_team")?;
        let required = self.required_team_size();
        let selected = self.current_quest_team.len();
        if selected != required {
            return Err(GameError::TeamSizeMismatch { required, selected });
        }
        self.phase = GamePhase::TeamVote;
        log::debug!(
            target: LOG_TARGET_STATE,
            "round {} attempt {}: proposed {:?}",
            self.current_round + 1,
            self.vote_track + 1,
            self.current_quest_team
        );
        Ok(())
    }

    /// Record the table's verdict on the proposed team.
    ///
    /// # Errors
    ///
    /// Rejects anything outside `TeamVote`.
    pub fn handle_team_vote(&mut self, approved: bool) -> Result<(), GameError> {
        self.require(GamePhase::TeamVote, "handle_team_vote")?;
        if approved {
            self.vote_track = 0;
            self.temporary_quest_outcomes.clear();
            self.active_player_index = self
                .current_quest_team
                .first()
                .map_or(0, |id| id.index());
            self.phase = GamePhase::QuestExecution;
            self.message = Some(GameMessage::TeamApproved);
            log::debug!(target: LOG_TARGET_STATE, "team approved: {:?}", self.current_quest_team);
            return Ok(());
        }

        self.vote_track = self.vote_track.saturating_add(1);
        if self.vote_track >= MAX_REJECTIONS {
            self.end_game(VictoryCause::VoteTrackExhausted);
            self.message = Some(GameMessage::VoteTrackExhausted);
            return Ok(());
        }
        self.rotate_leader();
        self.current_quest_team.clear();
        self.phase = GamePhase::TeamProposal;
        self.message = Some(GameMessage::ProposalRejected {
            attempt: self.vote_track + 1,
            leader: self.leader_name(),
            team_size: self.required_team_size(),
        });
        log::debug!(
            target: LOG_TARGET_STATE,
            "team rejected; vote track at {}",
            self.vote_track
        );
        Ok(())
    }

    /// Play the active quest member's card and pass to the next member.
    ///
    /// # Errors
    ///
    /// Rejects anything outside `QuestExecution`, an active cursor that is
    /// not on the team, and a Fail from a Good player.
    pub fn submit_quest_outcome(&mut self, outcome: QuestOutcome) -> Result<(), GameError> {
        self.require(GamePhase::QuestExecution, "submit_quest_outcome")?;
        let id = PlayerId(self.active_player_index);
        let position = self
            .current_quest_team
            .iter()
            .position(|member| *member == id)
            .ok_or(GameError::NotOnQuest { id })?;
        if !self.legal_outcomes(id).contains(&outcome) {
            return Err(GameError::IllegalOutcome { id });
        }

        self.temporary_quest_outcomes.push(outcome);
        match self.current_quest_team.get(position + 1) {
            Some(next) => self.active_player_index = next.index(),
            None => {
                self.phase = GamePhase::QuestResult;
                log::debug!(
                    target: LOG_TARGET_STATE,
                    "all {} quest cards played",
                    self.temporary_quest_outcomes.len()
                );
            }
        }
        Ok(())
    }

    /// Scramble the played cards, resolve the quest and decide what follows.
    ///
    /// # Errors
    ///
    /// Rejects anything outside `QuestResult`.
    pub fn process_quest_result<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), GameError> {
        self.require(GamePhase::QuestResult, "process_quest_result")?;
        let round = self.current_round;
        if round >= self.quests.len() {
            return Err(GameError::MissingQuest { round });
        }
        let mut outcomes = self.temporary_quest_outcomes.clone();
        outcomes.shuffle(rng);
        let team = self.current_quest_team.clone();
        let result = self.quests[round].commit(team, outcomes);
        let (successes, fails) = tally(&self.quests);
        log::info!(
            target: LOG_TARGET_STATE,
            "quest {} {result}; score {successes}-{fails}",
            round + 1
        );

        if successes >= QUESTS_TO_WIN {
            self.assassin = find_role(&self.players, Role::Assassin).map(|p| p.id);
            self.phase = GamePhase::Assassination;
            self.message = Some(GameMessage::AssassinHunt {
                assassin: self
                    .assassin
                    .and_then(|id| self.player(id))
                    .map(|p| p.name.clone()),
            });
            return Ok(());
        }
        if fails >= QUESTS_TO_WIN {
            self.end_game(VictoryCause::QuestsFailed);
            self.message = Some(GameMessage::EvilQuestVictory);
            return Ok(());
        }

        self.rotate_leader();
        self.current_round += 1;
        self.vote_track = 0;
        self.current_quest_team.clear();
        self.temporary_quest_outcomes.clear();
        self.active_player_index = 0;
        self.phase = GamePhase::TeamProposal;
        self.message = Some(GameMessage::QuestResolved {
            round: round + 1,
            result,
            leader: self.leader_name(),
        });
        Ok(())
    }

    /// The Assassin's final guess.
    ///
    /// # Errors
    ///
    /// Rejects anything outside `Assassination`, unknown players and Evil
    /// targets.
    pub fn assassinate(&mut self, target: PlayerId) -> Result<(), GameError> {
        self.require(GamePhase::Assassination, "assassinate")?;
        let victim = self
            .player(target)
            .ok_or(GameError::UnknownPlayer { id: target })?;
        if !victim.is_good() {
            return Err(GameError::IllegalTarget { id: target });
        }
        let name = victim.name.clone();
        if victim.role == Role::Merlin {
            self.end_game(VictoryCause::MerlinAssassinated);
            self.message = Some(GameMessage::MerlinAssassinated { target: name });
        } else {
            self.end_game(VictoryCause::AssassinMissed);
            self.message = Some(GameMessage::AssassinMissed { target: name });
        }
        Ok(())
    }

    /// Discard everything and return to `Setup`. Always succeeds.
    pub fn reset_game(&mut self) {
        log::debug!(target: LOG_TARGET_STATE, "reset from {}", self.phase);
        *self = Self::default();
    }

    // Queries ----------------------------------------------------------------

    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        find_player(&self.players, id)
    }

    #[must_use]
    pub fn current_leader(&self) -> Option<&Player> {
        self.players.get(self.current_leader_index)
    }

    /// Player holding the device during role reveal or quest execution.
    #[must_use]
    pub fn active_player(&self) -> Option<&Player> {
        match self.phase {
            GamePhase::RoleReveal | GamePhase::QuestExecution => {
                self.players.get(self.active_player_index)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn current_quest(&self) -> Option<&Quest> {
        self.quests.get(self.current_round)
    }

    /// Team size the current quest requires, or zero before setup.
    #[must_use]
    pub fn required_team_size(&self) -> usize {
        self.current_quest().map_or(0, |q| q.team_size)
    }

    #[must_use]
    pub fn is_on_current_team(&self, id: PlayerId) -> bool {
        self.current_quest_team.contains(&id)
    }

    /// Cards `id` may play: Good players only ever get Success.
    #[must_use]
    pub fn legal_outcomes(&self, id: PlayerId) -> &'static [QuestOutcome] {
        match self.player(id) {
            Some(p) if p.is_evil() => EVIL_OUTCOMES,
            Some(_) => GOOD_OUTCOMES,
            None => &[],
        }
    }

    /// Players the Assassin may name.
    #[must_use]
    pub fn assassination_targets(&self) -> Vec<&Player> {
        self.players.iter().filter(|p| p.is_good()).collect()
    }

    /// Resolved quests as `(successes, fails)`.
    #[must_use]
    pub fn score(&self) -> (usize, usize) {
        tally(&self.quests)
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    #[must_use]
    pub fn winner(&self) -> Option<Team> {
        self.victory.map(|v| v.winner)
    }

    /// Night script for the seated roster.
    #[must_use]
    pub fn night_script(&self) -> Vec<NarrationStep> {
        night_script(&self.players)
    }

    /// Narration line currently on screen, if the night is in progress.
    #[must_use]
    pub fn current_narration(&self) -> Option<NarrationStep> {
        if self.phase != GamePhase::NarratedNight {
            return None;
        }
        self.night_script().into_iter().nth(self.night_step)
    }

    /// What `id` learns when their role is revealed.
    #[must_use]
    pub fn knowledge_for(&self, id: PlayerId) -> Option<RoleKnowledge> {
        self.player(id)
            .map(|p| p.role.knowledge(&self.players, p.id))
    }

    // Internals --------------------------------------------------------------

    fn require(&self, phase: GamePhase, command: &'static str) -> Result<(), GameError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(GameError::WrongPhase {
                command,
                phase: self.phase,
            })
        }
    }

    fn leader_name(&self) -> String {
        self.current_leader()
            .map(|p| p.name.clone())
            .unwrap_or_default()
    }

    fn rotate_leader(&mut self) {
        if !self.players.is_empty() {
            self.current_leader_index = (self.current_leader_index + 1) % self.players.len();
        }
    }

    fn begin_proposal(&mut self) {
        self.phase = GamePhase::TeamProposal;
        self.active_player_index = 0;
        self.night_step = 0;
        self.current_quest_team.clear();
        self.message = Some(GameMessage::ProposalTurn {
            round: self.current_round + 1,
            attempt: self.vote_track + 1,
            leader: self.leader_name(),
            team_size: self.required_team_size(),
        });
        log::debug!(
            target: LOG_TARGET_STATE,
            "round {} begins; {} leads",
            self.current_round + 1,
            self.leader_name()
        );
    }

    fn end_game(&mut self, cause: VictoryCause) {
        let victory = Victory::from(cause);
        self.victory = Some(victory);
        self.phase = GamePhase::GameOver;
        log::info!(
            target: LOG_TARGET_STATE,
            "game over: {} wins ({cause})",
            victory.winner
        );
    }
}
