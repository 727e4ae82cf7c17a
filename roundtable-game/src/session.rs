use rand::RngCore;

use crate::constants::LOG_TARGET_SESSION;
use crate::player::PlayerId;
use crate::quest::QuestOutcome;
use crate::rng::RngBundle;
use crate::state::{Command, GameError, GameSetup, GameState};

/// High-level session wrapper binding a game state to its seeded random streams.
///
/// A UI controller or service owns one session per table and drives it with
/// commands; the state is only ever read from outside.
#[derive(Debug, Clone)]
pub struct GameSession {
    state: GameState,
    rng: RngBundle,
}

impl GameSession {
    /// Fresh session in `Setup`, drawing from streams derived from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            state: GameState::new(),
            rng: RngBundle::from_user_seed(seed),
        }
    }

    /// Build a session around an existing snapshot.
    #[must_use]
    pub fn from_state(state: GameState, seed: u64) -> Self {
        Self {
            state,
            rng: RngBundle::from_user_seed(seed),
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Random draws made so far across every stream.
    #[must_use]
    pub const fn rng_draws(&self) -> u64 {
        self.rng.total_draws()
    }

    /// Replace the random streams; the game itself is untouched.
    pub fn reseed(&mut self, seed: u64) {
        log::debug!(target: LOG_TARGET_SESSION, "reseeding session with {seed}");
        self.rng = RngBundle::from_user_seed(seed);
    }

    /// Run one command, drawing from the stream that owns its randomness.
    ///
    /// # Errors
    ///
    /// Returns the state machine's rejection; the state is unchanged.
    pub fn apply(&mut self, command: Command) -> Result<(), GameError> {
        log::trace!(target: LOG_TARGET_SESSION, "{command} in {}", self.state.phase);
        let rng: &mut dyn RngCore = match command {
            Command::Setup(_) => self.rng.deal(),
            _ => self.rng.reveal(),
        };
        self.state.apply(command, rng)
    }

    /// # Errors
    ///
    /// See [`GameState::setup_game`].
    pub fn setup_game(&mut self, setup: GameSetup) -> Result<(), GameError> {
        self.apply(Command::Setup(setup))
    }

    /// # Errors
    ///
    /// See [`GameState::advance_role_reveal`].
    pub fn advance_role_reveal(&mut self) -> Result<(), GameError> {
        self.apply(Command::AdvanceRoleReveal)
    }

    /// # Errors
    ///
    /// See [`GameState::advance_night_phase`].
    pub fn advance_night_phase(&mut self) -> Result<(), GameError> {
        self.apply(Command::AdvanceNightPhase)
    }

    /// # Errors
    ///
    /// See [`GameState::finish_narration`].
    pub fn finish_narration(&mut self) -> Result<(), GameError> {
        self.apply(Command::FinishNarration)
    }

    /// # Errors
    ///
    /// See [`GameState::select_team_member`].
    pub fn select_team_member(&mut self, player: PlayerId) -> Result<(), GameError> {
        self.apply(Command::SelectTeamMember { player })
    }

    /// # Errors
    ///
    /// See [`GameState::propose_team`].
    pub fn propose_team(&mut self) -> Result<(), GameError> {
        self.apply(Command::ProposeTeam)
    }

    /// # Errors
    ///
    /// See [`GameState::handle_team_vote`].
    pub fn handle_team_vote(&mut self, approved: bool) -> Result<(), GameError> {
        self.apply(Command::TeamVote { approved })
    }

    /// # Errors
    ///
    /// See [`GameState::submit_quest_outcome`].
    pub fn submit_quest_outcome(&mut self, outcome: QuestOutcome) -> Result<(), GameError> {
        self.apply(Command::SubmitQuestOutcome { outcome })
    }

    /// # Errors
    ///
    /// See [`GameState::process_quest_result`].
    pub fn process_quest_result(&mut self) -> Result<(), GameError> {
        self.apply(Command::ProcessQuestResult)
    }

    /// # Errors
    ///
    /// See [`GameState::assassinate`].
    pub fn assassinate(&mut self, target: PlayerId) -> Result<(), GameError> {
        self.apply(Command::Assassinate { target })
    }

    /// Return to `Setup`. The random streams keep going so the next deal differs.
    pub fn reset_game(&mut self) {
        self.state.reset_game();
    }

    /// Borrow the current game snapshot.
    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Consume the session and return the owned snapshot.
    #[must_use]
    pub fn into_state(self) -> GameState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::GamePhase;
    use std::sync::Mutex;

    fn setup() -> GameSetup {
        GameSetup::new(["Ann", "Bo", "Cy", "Di", "Ed", "Flo", "Gus"])
    }

    #[test]
    fn same_seed_deals_the_same_table() {
        let mut a = GameSession::new(2024);
        let mut b = GameSession::new(2024);
        a.setup_game(setup()).unwrap();
        b.setup_game(setup()).unwrap();
        assert_eq!(a.state(), b.state());
        assert!(a.rng_draws() > 0);
    }

    #[test]
    fn different_seeds_usually_differ() {
        let deals: Vec<GameState> = (0..8)
            .map(|seed| {
                let mut session = GameSession::new(seed);
                session.setup_game(setup()).unwrap();
                session.into_state()
            })
            .collect();
        assert!(deals.iter().any(|d| d != &deals[0]));
    }

    #[test]
    fn rejected_commands_do_not_draw() {
        let mut session = GameSession::new(1);
        assert!(session.process_quest_result().is_err());
        assert_eq!(session.rng_draws(), 0);
        assert_eq!(session.state().phase, GamePhase::Setup);
    }

    struct WarnCapture(Mutex<Vec<String>>);

    impl log::Log for WarnCapture {
        fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
            metadata.level() <= log::Level::Warn
        }

        fn log(&self, record: &log::Record<'_>) {
            if self.enabled(record.metadata()) {
                if let Ok(mut lines) = self.0.lock() {
                    lines.push(format!("{}: {}", record.target(), record.args()));
                }
            }
        }

        fn flush(&self) {}
    }

    static WARNINGS: WarnCapture = WarnCapture(Mutex::new(Vec::new()));

    #[test]
    fn convenience_rejections_are_logged() {
        let _ = log::set_logger(&WARNINGS);
        log::set_max_level(log::LevelFilter::Warn);

        let mut session = GameSession::new(9);
        let before = session.state().clone();
        let err = session.select_team_member(PlayerId(0)).unwrap_err();
        assert!(matches!(err, GameError::WrongPhase { command: "select_team_member", .. }));
        assert!(session.assassinate(PlayerId(1)).is_err());
        assert_eq!(session.state(), &before);

        let lines = WARNINGS.0.lock().unwrap();
        assert!(lines.iter().any(|l| l.starts_with("roundtable::state: rejected select_team_member")));
        assert!(lines.iter().any(|l| l.contains("rejected assassinate in setup")));
    }

    #[test]
    fn reset_keeps_the_streams_running() {
        let mut session = GameSession::new(77);
        session.setup_game(setup()).unwrap();
        let draws = session.rng_draws();
        session.reset_game();
        assert_eq!(session.state(), &GameState::new());
        session.setup_game(setup()).unwrap();
        assert!(session.rng_draws() > draws);
        assert_eq!(session.seed(), 77);
    }

    #[test]
    fn reseed_replaces_streams_only() {
        let mut session = GameSession::new(3);
        session.setup_game(setup()).unwrap();
        let before = session.state().clone();
        session.reseed(4);
        assert_eq!(session.state(), &before);
        assert_eq!(session.seed(), 4);
        assert_eq!(session.rng_draws(), 0);
    }
}
