pub mod catalog;

use crate::logic::{GameplayStrategy, SimulationPlan};

/// A named plan the harness can run across tables and seeds.
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub description: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        plan: SimulationPlan,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            plan,
        }
    }
}

/// Look up a scenario by key or alias, applying CLI overrides.
pub fn get_scenario(
    name: &str,
    strategy: Option<GameplayStrategy>,
    narrated_night: bool,
    expansion: bool,
) -> Option<TestScenario> {
    let scenario = match name.to_lowercase().as_str() {
        "smoke" => catalog::smoke(),
        "full-game" | "full" => catalog::full_game(),
        "vote-collapse" | "deadlock" => catalog::vote_collapse(),
        "assassination" | "assassin" => catalog::assassination(),
        "narrated-night" | "night" => catalog::narrated_night(),
        "expansion" => catalog::expansion(),
        "replay" | "deterministic" => catalog::replay(),
        _ => return None,
    };
    Some(TestScenario {
        plan: scenario
            .plan
            .with_overrides(strategy, narrated_night, expansion),
        ..scenario
    })
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    vec![
        ("smoke", "Smoke Test"),
        ("full-game", "Full Game - Informed Players"),
        ("vote-collapse", "Vote Track Collapse"),
        ("assassination", "Assassination Endgame"),
        ("narrated-night", "Narrated Night Walkthrough"),
        ("expansion", "Expansion Role Deal"),
        ("replay", "Deterministic Replay"),
    ]
}

#[must_use]
pub fn all_scenario_keys() -> Vec<String> {
    list_scenarios()
        .into_iter()
        .map(|(key, _)| key.to_string())
        .collect()
}
