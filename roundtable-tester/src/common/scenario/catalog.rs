use anyhow::{Result, ensure};
use roundtable_game::constants::{MAX_REJECTIONS, QUESTS_TO_WIN};
use roundtable_game::{GamePhase, Role, Team, VictoryCause, night_script, roles_for};

use super::TestScenario;
use crate::logic::{GameplayStrategy, SimulationConfig, SimulationPlan, SimulationSession, SimulationSummary};

pub fn smoke() -> TestScenario {
    TestScenario::new(
        "Smoke Test",
        "random bots play to a verdict without breaking a rule",
        SimulationPlan::new(GameplayStrategy::Random).with_expectation(game_ends_expectation),
    )
}

pub fn full_game() -> TestScenario {
    TestScenario::new(
        "Full Game - Informed Players",
        "bots use their night knowledge; the game is decided on quests",
        SimulationPlan::new(GameplayStrategy::Informed)
            .pinned()
            .with_expectation(game_ends_expectation)
            .with_expectation(decided_on_quests_expectation),
    )
}

pub fn vote_collapse() -> TestScenario {
    TestScenario::new(
        "Vote Track Collapse",
        "every proposal is rejected until Evil takes the game",
        SimulationPlan::new(GameplayStrategy::Deadlock)
            .pinned()
            .with_expectation(vote_collapse_expectation),
    )
}

pub fn assassination() -> TestScenario {
    TestScenario::new(
        "Assassination Endgame",
        "loyal tables sweep the quests and hand the verdict to the Assassin",
        SimulationPlan::new(GameplayStrategy::Loyal)
            .pinned()
            .with_expectation(assassination_expectation),
    )
}

pub fn narrated_night() -> TestScenario {
    TestScenario::new(
        "Narrated Night Walkthrough",
        "the table is walked through every cue of the night script",
        SimulationPlan::new(GameplayStrategy::Random)
            .with_narrated_night(true)
            .with_expectation(narrated_night_expectation),
    )
}

pub fn expansion() -> TestScenario {
    TestScenario::new(
        "Expansion Role Deal",
        "expansion tables deal Agravaine in Mordred's seat",
        SimulationPlan::new(GameplayStrategy::Random)
            .with_expansion(true)
            .with_expectation(expansion_expectation),
    )
}

pub fn replay() -> TestScenario {
    TestScenario::new(
        "Deterministic Replay",
        "the same seed replays the same game command for command",
        SimulationPlan::new(GameplayStrategy::Random).with_expectation(replay_expectation),
    )
}

fn game_ends_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(summary.game_ended, "game should reach a verdict");
    ensure!(summary.winner().is_some(), "finished game should name a winner");
    Ok(())
}

fn decided_on_quests_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.cause() != Some(VictoryCause::VoteTrackExhausted),
        "informed tables should never exhaust the vote track"
    );
    let (successes, fails) = summary.final_state.score();
    ensure!(
        successes + fails >= QUESTS_TO_WIN,
        "only {} quests resolved",
        successes + fails
    );
    Ok(())
}

fn vote_collapse_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.cause() == Some(VictoryCause::VoteTrackExhausted),
        "expected a vote track collapse, got {:?}",
        summary.cause()
    );
    ensure!(summary.winner() == Some(Team::Evil), "collapse should hand Evil the game");
    ensure!(
        summary.proposals_rejected == usize::from(MAX_REJECTIONS),
        "{} proposals rejected",
        summary.proposals_rejected
    );
    ensure!(
        summary.final_state.current_round == 0,
        "collapse should happen on the first quest"
    );
    ensure!(
        !summary.visited(GamePhase::QuestExecution),
        "no quest should run"
    );
    Ok(())
}

fn assassination_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.visited(GamePhase::Assassination),
        "three successes should lead to the assassination"
    );
    ensure!(
        summary.final_state.score() == (QUESTS_TO_WIN, 0),
        "loyal table scored {:?}",
        summary.final_state.score()
    );
    ensure!(
        matches!(
            summary.cause(),
            Some(VictoryCause::MerlinAssassinated | VictoryCause::AssassinMissed)
        ),
        "assassination should decide the game, got {:?}",
        summary.cause()
    );
    Ok(())
}

fn narrated_night_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.visited(GamePhase::NarratedNight),
        "narrated game skipped the night"
    );
    let expected = night_script(&summary.final_state.players).len();
    ensure!(
        summary.night_steps == expected,
        "walked {} night steps, script has {expected}",
        summary.night_steps
    );
    Ok(())
}

fn expansion_expectation(summary: &SimulationSummary) -> Result<()> {
    let players = &summary.final_state.players;
    let mut expected = roles_for(players.len(), true)?.all_roles();
    let mut dealt: Vec<Role> = players.iter().map(|p| p.role).collect();
    expected.sort_unstable();
    dealt.sort_unstable();
    ensure!(dealt == expected, "dealt {dealt:?}, expected {expected:?}");
    let base = roles_for(players.len(), false)?;
    if players.len() >= 7 && base.evil.contains(&Role::Mordred) {
        ensure!(dealt.contains(&Role::Agravaine), "Agravaine missing");
        ensure!(!dealt.contains(&Role::Mordred), "Mordred still dealt");
    } else {
        let mut base_roles = base.all_roles();
        base_roles.sort_unstable();
        ensure!(dealt == base_roles, "table without Mordred changed: {dealt:?}");
    }
    Ok(())
}

fn replay_expectation(summary: &SimulationSummary) -> Result<()> {
    let config = SimulationConfig::new(summary.players, summary.strategy, summary.seed)
        .with_narrated_night(summary.narrated_night)
        .with_expansion(summary.expansion);
    let again = SimulationSession::new(config).run();
    ensure!(
        again.commands.len() == summary.commands.len(),
        "replay issued {} commands, first run {}",
        again.commands.len(),
        summary.commands.len()
    );
    ensure!(again.final_state == summary.final_state, "replay diverged");
    ensure!(again.rng_draws == summary.rng_draws, "replay drew a different number of values");
    Ok(())
}
