use anyhow::Result;
use std::sync::Arc;

use crate::logic::policy::GameplayStrategy;
use crate::logic::simulation::{
    DEFAULT_MAX_COMMANDS, SimulationConfig, SimulationSession, SimulationSummary,
};

/// Declarative plan for running a simulation session.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub strategy: GameplayStrategy,
    /// Whether `--strategy` may replace the plan's own strategy.
    pub strategy_pinned: bool,
    pub narrated_night: bool,
    pub expansion: bool,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub fn new(strategy: GameplayStrategy) -> Self {
        Self {
            strategy,
            strategy_pinned: false,
            narrated_night: false,
            expansion: false,
            expectations: Vec::new(),
        }
    }

    /// Keep the strategy even when the CLI asks for another one.
    #[must_use]
    pub const fn pinned(mut self) -> Self {
        self.strategy_pinned = true;
        self
    }

    #[must_use]
    pub const fn with_narrated_night(mut self, enabled: bool) -> Self {
        self.narrated_night = enabled;
        self
    }

    #[must_use]
    pub const fn with_expansion(mut self, enabled: bool) -> Self {
        self.expansion = enabled;
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }

    /// Apply CLI overrides: options only ever switch on, and the strategy
    /// only changes when the plan is not pinned.
    #[must_use]
    pub fn with_overrides(
        mut self,
        strategy: Option<GameplayStrategy>,
        narrated_night: bool,
        expansion: bool,
    ) -> Self {
        if let Some(strategy) = strategy.filter(|_| !self.strategy_pinned) {
            self.strategy = strategy;
        }
        self.narrated_night |= narrated_night;
        self.expansion |= expansion;
        self
    }

    fn config(&self, players: usize, seed: u64, max_commands: usize) -> SimulationConfig {
        SimulationConfig::new(players, self.strategy, seed)
            .with_narrated_night(self.narrated_night)
            .with_expansion(self.expansion)
            .with_max_commands(max_commands)
    }
}

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    /// # Errors
    ///
    /// Returns the expectation's failure.
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// Runs plans game by game.
#[derive(Debug, Clone, Copy)]
pub struct GameTester {
    verbose: bool,
    max_commands: usize,
}

impl GameTester {
    #[must_use]
    pub const fn new(verbose: bool) -> Self {
        Self {
            verbose,
            max_commands: DEFAULT_MAX_COMMANDS,
        }
    }

    /// Cap on commands per game before it counts as stuck.
    #[must_use]
    pub const fn with_max_commands(mut self, max_commands: usize) -> Self {
        self.max_commands = max_commands;
        self
    }

    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    /// Play one game of `plan` at a table of `players`.
    #[must_use]
    pub fn run_plan(&self, plan: &SimulationPlan, players: usize, seed: u64) -> SimulationSummary {
        let summary = SimulationSession::new(plan.config(players, seed, self.max_commands)).run();
        if self.verbose {
            log::info!(
                target: "roundtable::tester",
                "seed {seed}: {} commands, {}",
                summary.commands.len(),
                summary.ending_message()
            );
        }
        summary
    }

    /// First failed expectation, plus any invariant breach or rejected command.
    #[must_use]
    pub fn evaluate(plan: &SimulationPlan, summary: &SimulationSummary) -> Option<String> {
        if let Some(violation) = summary.violations.first() {
            return Some(format!("invariant violated {violation}"));
        }
        if let Some(rejection) = summary.rejections.first() {
            return Some(rejection.clone());
        }
        plan.expectations
            .iter()
            .find_map(|expectation| expectation.evaluate(summary).err())
            .map(|err| err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::ensure;

    #[test]
    fn overrides_respect_pinned_strategies() {
        let free = SimulationPlan::new(GameplayStrategy::Random)
            .with_overrides(Some(GameplayStrategy::Loyal), true, false);
        assert_eq!(free.strategy, GameplayStrategy::Loyal);
        assert!(free.narrated_night);
        assert!(!free.expansion);

        let pinned = SimulationPlan::new(GameplayStrategy::Deadlock)
            .pinned()
            .with_expansion(true)
            .with_overrides(Some(GameplayStrategy::Loyal), false, false);
        assert_eq!(pinned.strategy, GameplayStrategy::Deadlock);
        assert!(pinned.expansion);
    }

    #[test]
    fn evaluate_reports_the_first_failed_expectation() {
        let plan = SimulationPlan::new(GameplayStrategy::Deadlock)
            .with_expectation(|s: &SimulationSummary| {
                ensure!(s.game_ended, "game should end");
                Ok(())
            })
            .with_expectation(|_: &SimulationSummary| -> Result<()> {
                anyhow::bail!("always fails")
            });
        let tester = GameTester::new(false);
        let summary = tester.run_plan(&plan, 5, 11);
        assert_eq!(
            GameTester::evaluate(&plan, &summary),
            Some("always fails".to_string())
        );
    }

    #[test]
    fn command_budget_is_reported_as_a_failure() {
        let plan = SimulationPlan::new(GameplayStrategy::Loyal);
        let summary = GameTester::new(false)
            .with_max_commands(4)
            .run_plan(&plan, 5, 2);
        assert!(!summary.game_ended);
        let failure = GameTester::evaluate(&plan, &summary).unwrap();
        assert!(failure.contains("command budget of 4"));
    }
}
