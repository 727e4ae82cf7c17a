use colored::Colorize;
use roundtable_game::Team;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::common::scenario::TestScenario;
use crate::logic::game_tester::{GameTester, SimulationPlan};
use crate::logic::seeds::iteration_seed;
use crate::logic::simulation::SimulationSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub strategy: String,
    pub players: usize,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub good_wins: usize,
    pub evil_wins: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

pub struct LogicTester {
    tester: GameTester,
}

impl LogicTester {
    pub const fn new(tester: GameTester) -> Self {
        Self { tester }
    }

    /// One result per (table size, seed) pair.
    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        player_counts: &[usize],
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for &players in player_counts {
            for &seed in seeds {
                if self.tester.verbose() {
                    println!(
                        "🧪 Testing scenario: {} (strategy: {} players: {} seed: {})",
                        scenario.name.bright_white(),
                        scenario.plan.strategy.label(),
                        players,
                        seed
                    );
                    println!("   {}", scenario.description.dimmed());
                }
                results.push(self.run_single_scenario(scenario, players, seed, iterations));
            }
        }

        results
    }

    fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        players: usize,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let tally = self.run_simulation_iterations(&scenario.plan, players, seed, iterations);

        let avg_duration = if tally.performance_data.is_empty() {
            Duration::ZERO
        } else {
            tally.performance_data.iter().sum::<Duration>()
                / u32::try_from(tally.performance_data.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            strategy: scenario.plan.strategy.label().to_string(),
            players,
            seed,
            passed: tally.failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: tally.successes,
            good_wins: tally.good_wins,
            evil_wins: tally.evil_wins,
            failures: tally.failures,
            average_duration: avg_duration,
            performance_data: tally.performance_data,
        }
    }

    fn run_simulation_iterations(
        &self,
        plan: &SimulationPlan,
        players: usize,
        seed: u64,
        iterations: usize,
    ) -> IterationTally {
        let mut tally = IterationTally::default();

        for i in 0..iterations {
            let start_time = Instant::now();
            let seed = iteration_seed(seed, i);
            let summary = self.tester.run_plan(plan, players, seed);
            match summary.winner() {
                Some(Team::Good) => tally.good_wins += 1,
                Some(Team::Evil) => tally.evil_wins += 1,
                None => {}
            }

            if let Some(err) = GameTester::evaluate(plan, &summary) {
                let context = summarize_command_path(&summary);
                tally.failures.push(format!(
                    "Iteration {} (players {}, strategy {}, seed {}, commands {}, ending '{}'): {} | {}",
                    i + 1,
                    players,
                    summary.strategy.label(),
                    summary.seed,
                    summary.commands.len(),
                    summary.ending_message(),
                    err,
                    context
                ));

                if self.tester.verbose() {
                    println!(
                        "  ❌ Iteration {}/{} failed: {}",
                        i + 1,
                        iterations,
                        err.red()
                    );
                    println!("     ↳ Seed {} | Last commands: {}", summary.seed, context);
                }
            } else {
                tally.successes += 1;
                let duration = start_time.elapsed();
                tally.performance_data.push(duration);

                if self.tester.verbose() {
                    let (ok, bad) = summary.final_state.score();
                    println!(
                        "  ✅ Iteration {}/{} passed ({duration:?}) quests {ok}-{bad} ending: {}",
                        i + 1,
                        iterations,
                        summary.ending_message()
                    );
                }
            }
        }

        tally
    }
}

#[derive(Debug, Default)]
struct IterationTally {
    successes: usize,
    good_wins: usize,
    evil_wins: usize,
    failures: Vec<String>,
    performance_data: Vec<Duration>,
}

fn summarize_command_path(summary: &SimulationSummary) -> String {
    if summary.commands.is_empty() {
        return "no commands recorded".to_string();
    }

    let mut recent: Vec<String> = summary
        .commands
        .iter()
        .rev()
        .take(3)
        .map(|record| match &record.rejection {
            Some(reason) => format!("{} rejected ({reason})", record.command),
            None => format!("{} -> {}", record.command, record.phase_after),
        })
        .collect();
    recent.reverse();
    recent.join(" | ")
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_micros().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let micros = u128::deserialize(deserializer)?;
        Ok(Duration::from_micros(u64::try_from(micros).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let micros: Vec<u128> = durations.iter().map(Duration::as_micros).collect();
        micros.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let micros = Vec::<u128>::deserialize(deserializer)?;
        Ok(micros
            .into_iter()
            .map(|m| Duration::from_micros(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::scenario::get_scenario;

    #[test]
    fn runs_one_result_per_table_and_seed() {
        let scenario = get_scenario("vote-collapse", None, false, false).unwrap();
        let tester = LogicTester::new(GameTester::new(false));
        let results = tester.run_scenario(&scenario, &[5, 9], &[1, 2, 3], 2);
        assert_eq!(results.len(), 6);
        assert!(results.iter().all(|r| r.passed), "{results:?}");
        assert!(results.iter().all(|r| r.evil_wins == 2 && r.good_wins == 0));
    }

    #[test]
    fn failing_expectations_are_reported_with_context() {
        let scenario = TestScenario::new(
            "Impossible",
            "expects Good to win every game",
            SimulationPlan::new(crate::logic::GameplayStrategy::Deadlock).with_expectation(
                |s: &SimulationSummary| {
                    anyhow::ensure!(s.winner() == Some(Team::Good), "evil won");
                    Ok(())
                },
            ),
        );
        let tester = LogicTester::new(GameTester::new(false));
        let result = &tester.run_scenario(&scenario, &[6], &[4], 1)[0];
        assert!(!result.passed);
        assert_eq!(result.successful_iterations, 0);
        assert!(result.failures[0].contains("evil won"));
        assert!(result.failures[0].contains("handle_team_vote"));
    }

    #[test]
    fn results_serialize_durations_as_micros() {
        let result = ScenarioResult {
            scenario_name: "Smoke".to_string(),
            strategy: "Random".to_string(),
            players: 5,
            seed: 1,
            passed: true,
            iterations_run: 1,
            successful_iterations: 1,
            good_wins: 1,
            evil_wins: 0,
            failures: Vec::new(),
            average_duration: Duration::from_micros(250),
            performance_data: vec![Duration::from_micros(250)],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["average_duration"], 250);
        let back: ScenarioResult = serde_json::from_value(json).unwrap();
        assert_eq!(back.performance_data, result.performance_data);
    }
}
