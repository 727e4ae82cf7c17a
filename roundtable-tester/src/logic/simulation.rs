use roundtable_game::{
    Command, GamePhase, GameSession, GameSetup, GameState, PlayerId, Team, VictoryCause,
};

use crate::logic::invariants::audit;
use crate::logic::policy::{GameplayStrategy, PlayerPolicy};

const LOG_TARGET: &str = "roundtable::tester";
/// Hard stop for a single game; a full game needs a few hundred commands at most.
pub const DEFAULT_MAX_COMMANDS: usize = 1_000;
/// Violations kept per game before the rest are only counted.
const MAX_VIOLATIONS_KEPT: usize = 20;

/// Configuration for a simulation session.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub seed: u64,
    pub players: usize,
    pub strategy: GameplayStrategy,
    pub narrated_night: bool,
    pub expansion: bool,
    pub max_commands: usize,
}

impl SimulationConfig {
    #[must_use]
    pub fn new(players: usize, strategy: GameplayStrategy, seed: u64) -> Self {
        Self {
            seed,
            players,
            strategy,
            narrated_night: false,
            expansion: false,
            max_commands: DEFAULT_MAX_COMMANDS,
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

    #[must_use]
    pub fn with_max_commands(mut self, max_commands: usize) -> Self {
        self.max_commands = max_commands;
        self
    }

    fn setup(&self) -> GameSetup {
        let names: Vec<String> = (0..self.players).map(|i| format!("Knight {}", i + 1)).collect();
        GameSetup::new(names)
            .with_narrated_night(self.narrated_night)
            .with_expansion(self.expansion)
    }
}

/// One command as the harness issued it.
#[derive(Debug, Clone)]
pub struct CommandRecord {
    pub command: Command,
    pub phase_after: GamePhase,
    pub rejection: Option<String>,
}

/// Everything observed while playing one game.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub players: usize,
    pub strategy: GameplayStrategy,
    pub narrated_night: bool,
    pub expansion: bool,
    pub final_state: GameState,
    pub commands: Vec<CommandRecord>,
    pub violations: Vec<String>,
    pub rejections: Vec<String>,
    pub phases_seen: Vec<GamePhase>,
    pub night_steps: usize,
    pub proposals_rejected: usize,
    pub game_ended: bool,
    pub rng_draws: u64,
}

impl SimulationSummary {
    #[must_use]
    pub fn winner(&self) -> Option<Team> {
        self.final_state.winner()
    }

    #[must_use]
    pub fn cause(&self) -> Option<VictoryCause> {
        self.final_state.victory.map(|v| v.cause)
    }

    #[must_use]
    pub fn visited(&self, phase: GamePhase) -> bool {
        self.phases_seen.contains(&phase)
    }

    /// Last status line shown to the table.
    #[must_use]
    pub fn ending_message(&self) -> String {
        self.final_state
            .message
            .as_ref()
            .map_or_else(|| "no message".to_string(), ToString::to_string)
    }
}

/// Plays one complete game with a bot policy, auditing after every command.
pub struct SimulationSession {
    config: SimulationConfig,
    session: GameSession,
    policy: Box<dyn PlayerPolicy + Send>,
    commands: Vec<CommandRecord>,
    violations: Vec<String>,
    violation_overflow: usize,
    rejections: Vec<String>,
    phases_seen: Vec<GamePhase>,
    night_steps: usize,
    proposals_rejected: usize,
}

impl SimulationSession {
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            session: GameSession::new(config.seed),
            policy: config.strategy.create_policy(config.seed),
            config,
            commands: Vec::new(),
            violations: Vec::new(),
            violation_overflow: 0,
            rejections: Vec::new(),
            phases_seen: vec![GamePhase::Setup],
            night_steps: 0,
            proposals_rejected: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        self.session.state()
    }

    /// Drive the game until it ends, a command is rejected, or the command budget runs out.
    #[must_use]
    pub fn run(mut self) -> SimulationSummary {
        log::debug!(
            target: LOG_TARGET,
            "seed {} players {} strategy {}",
            self.config.seed,
            self.config.players,
            self.policy.name()
        );
        let mut halted = !self.execute(Command::Setup(self.config.setup()));
        while !halted && !self.state().is_over() {
            if self.commands.len() >= self.config.max_commands {
                self.rejections.push(format!(
                    "command budget of {} exhausted in {}",
                    self.config.max_commands,
                    self.state().phase
                ));
                break;
            }
            halted = !self.step();
        }
        self.finish()
    }

    /// Issue the next command(s) the current phase calls for.
    fn step(&mut self) -> bool {
        match self.state().phase {
            GamePhase::Setup => {
                self.rejections.push("game fell back to setup".to_string());
                false
            }
            GamePhase::RoleReveal => self.execute(Command::AdvanceRoleReveal),
            GamePhase::NarratedNight => {
                self.night_steps += 1;
                self.execute(Command::AdvanceNightPhase)
            }
            GamePhase::TeamProposal => self.propose(),
            GamePhase::TeamVote => self.vote(),
            GamePhase::QuestExecution => {
                let player = PlayerId(self.state().active_player_index);
                let outcome = self.policy.play_card(self.session.state(), player);
                self.execute(Command::SubmitQuestOutcome { outcome })
            }
            GamePhase::QuestResult => self.execute(Command::ProcessQuestResult),
            GamePhase::Assassination => {
                let target = self.policy.pick_target(self.session.state());
                self.execute(Command::Assassinate { target })
            }
            GamePhase::GameOver => true,
        }
    }

    fn propose(&mut self) -> bool {
        let Some(leader) = self.state().current_leader().map(|p| p.id) else {
            self.rejections.push("no leader seated".to_string());
            return false;
        };
        let team = self.policy.propose_team(self.session.state(), leader);
        for player in team {
            if !self.execute(Command::SelectTeamMember { player }) {
                return false;
            }
        }
        self.execute(Command::ProposeTeam)
    }

    fn vote(&mut self) -> bool {
        let state = self.session.state();
        let voters: Vec<PlayerId> = state.players.iter().map(|p| p.id).collect();
        let approvals = voters
            .iter()
            .filter(|voter| self.policy.vote(state, **voter))
            .count();
        let approved = approvals * 2 > voters.len();
        if !approved {
            self.proposals_rejected += 1;
        }
        self.execute(Command::TeamVote { approved })
    }

    /// Apply one command and audit the result. Returns false on rejection.
    fn execute(&mut self, command: Command) -> bool {
        let outcome = self.session.apply(command.clone());
        let phase_after = self.state().phase;
        if !self.phases_seen.contains(&phase_after) {
            self.phases_seen.push(phase_after);
        }
        log::trace!(target: LOG_TARGET, "{command} -> {phase_after}");

        let rejection = outcome.err().map(|err| err.to_string());
        if let Some(reason) = &rejection {
            self.rejections.push(format!("{command} rejected: {reason}"));
        }

        let index = self.commands.len() + 1;
        for violation in audit(self.session.state()) {
            if self.violations.len() < MAX_VIOLATIONS_KEPT {
                self.violations
                    .push(format!("after #{index} {command}: {violation}"));
            } else {
                self.violation_overflow += 1;
            }
        }

        self.commands.push(CommandRecord {
            command,
            phase_after,
            rejection: rejection.clone(),
        });
        rejection.is_none()
    }

    fn finish(mut self) -> SimulationSummary {
        if self.violation_overflow > 0 {
            self.violations
                .push(format!("... {} more violations", self.violation_overflow));
        }
        let rng_draws = self.session.rng_draws();
        let final_state = self.session.into_state();
        SimulationSummary {
            seed: self.config.seed,
            players: self.config.players,
            strategy: self.config.strategy,
            narrated_night: self.config.narrated_night,
            expansion: self.config.expansion,
            game_ended: final_state.is_over(),
            final_state,
            commands: self.commands,
            violations: self.violations,
            rejections: self.rejections,
            phases_seen: self.phases_seen,
            night_steps: self.night_steps,
            proposals_rejected: self.proposals_rejected,
            rng_draws,
        }
    }
}
