//! Rule checks run against the snapshot after every command.

use roundtable_game::constants::{MAX_REJECTIONS, QUEST_COUNT, QUESTS_TO_WIN};
use roundtable_game::{
    GamePhase, GameState, PlayerId, QuestResult, Role, resolve_outcomes, roles_for,
};

/// Every rule the snapshot breaks, as readable sentences. Empty means clean.
#[must_use]
pub fn audit(state: &GameState) -> Vec<String> {
    let mut violations = Vec::new();
    if state.phase == GamePhase::Setup {
        if !state.players.is_empty() || !state.quests.is_empty() {
            violations.push("setup phase still holds a seated table".to_string());
        }
        return violations;
    }

    check_roles(state, &mut violations);
    check_counters(state, &mut violations);
    check_quests(state, &mut violations);
    check_phase(state, &mut violations);
    violations
}

fn check_roles(state: &GameState, violations: &mut Vec<String>) {
    let Ok(config) = roles_for(state.players.len(), state.expansion) else {
        violations.push(format!("unsupported table of {} players", state.players.len()));
        return;
    };
    let mut expected = config.all_roles();
    let mut dealt: Vec<Role> = state.players.iter().map(|p| p.role).collect();
    expected.sort_unstable();
    dealt.sort_unstable();
    if dealt != expected {
        violations.push(format!("dealt roles {dealt:?} differ from table {expected:?}"));
    }
    for (seat, player) in state.players.iter().enumerate() {
        if player.id.index() != seat {
            violations.push(format!("seat {seat} holds player id {}", player.id));
        }
        if player.team != player.role.team() {
            violations.push(format!("{} sits on the wrong team", player.name));
        }
    }
}

fn check_counters(state: &GameState, violations: &mut Vec<String>) {
    if state.vote_track >= MAX_REJECTIONS && state.phase != GamePhase::GameOver {
        violations.push(format!(
            "vote track at {} outside game over",
            state.vote_track
        ));
    }
    if state.current_round >= QUEST_COUNT {
        violations.push(format!("round index {} past the last quest", state.current_round));
    }
    if state.current_leader_index >= state.players.len() {
        violations.push(format!(
            "leader index {} outside the table",
            state.current_leader_index
        ));
    }
}

fn check_quests(state: &GameState, violations: &mut Vec<String>) {
    for quest in &state.quests {
        let round = quest.id + 1;
        if !quest.result.is_resolved() {
            if !quest.team.is_empty() || !quest.outcomes.is_empty() {
                violations.push(format!("pending quest {round} already has a team"));
            }
            continue;
        }
        if quest.team.len() != quest.team_size {
            violations.push(format!(
                "quest {round} sent {} players, needed {}",
                quest.team.len(),
                quest.team_size
            ));
        }
        if quest.outcomes.len() != quest.team.len() {
            violations.push(format!(
                "quest {round} has {} cards for {} members",
                quest.outcomes.len(),
                quest.team.len()
            ));
        }
        if resolve_outcomes(&quest.outcomes, quest.fails_required) != quest.result {
            violations.push(format!(
                "quest {round} {} despite {} fails against a threshold of {}",
                quest.result,
                quest.fail_count(),
                quest.fails_required
            ));
        }
        let evil_members = quest
            .team
            .iter()
            .filter(|id| state.player(**id).is_some_and(|p| p.is_evil()))
            .count();
        if quest.fail_count() > evil_members {
            violations.push(format!(
                "quest {round} shows {} fails but only {evil_members} evil members",
                quest.fail_count()
            ));
        }
    }
}

fn check_phase(state: &GameState, violations: &mut Vec<String>) {
    let (successes, fails) = state.score();
    match state.phase {
        GamePhase::Assassination => {
            if successes != QUESTS_TO_WIN || fails >= QUESTS_TO_WIN {
                violations.push(format!(
                    "assassination reached at {successes} successes and {fails} fails"
                ));
            }
        }
        GamePhase::GameOver => {
            if state.victory.is_none() {
                violations.push("game over without a victory".to_string());
            }
        }
        _ => {
            if state.victory.is_some() {
                violations.push(format!("victory recorded during {}", state.phase));
            }
            if successes >= QUESTS_TO_WIN || fails >= QUESTS_TO_WIN {
                violations.push(format!(
                    "play continues at {successes} successes and {fails} fails"
                ));
            }
        }
    }
    if state.phase == GamePhase::QuestExecution
        && !state.is_on_current_team(PlayerId(state.active_player_index))
    {
        violations.push(format!(
            "active seat {} is not on the quest",
            state.active_player_index
        ));
    }
    let pending = state
        .quests
        .iter()
        .filter(|q| q.result == QuestResult::Pending)
        .count();
    if pending + successes + fails != state.quests.len() {
        violations.push("quest tally does not add up".to_string());
    }
}
