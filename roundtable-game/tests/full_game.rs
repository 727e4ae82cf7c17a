use roundtable_game::{
    Command, Deal, GameError, GameMessage, GamePhase, GameSession, GameSetup, GameState,
    PlayerId, QuestOutcome, QuestResult, Role, Team, VictoryCause,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

const NAMES: [&str; 5] = ["Ada", "Brin", "Cato", "Dara", "Eli"];

/// P0 Merlin, P1 Percival, P2 Loyal Servant, P3 Morgana, P4 Assassin.
fn scripted_table(leader: usize) -> GameState {
    let mut state = GameState::new();
    state
        .setup_game_with_deal(
            &GameSetup::new(NAMES),
            Deal {
                roles: vec![
                    Role::Merlin,
                    Role::Percival,
                    Role::LoyalServant,
                    Role::Morgana,
                    Role::Assassin,
                ],
                leader,
            },
        )
        .unwrap();
    while state.phase == GamePhase::RoleReveal {
        state.advance_role_reveal().unwrap();
    }
    state
}

fn send_team(state: &mut GameState, seats: &[usize]) {
    for seat in seats {
        state.select_team_member(PlayerId(*seat)).unwrap();
    }
    state.propose_team().unwrap();
    state.handle_team_vote(true).unwrap();
}

fn play_cards(state: &mut GameState, cards: &[QuestOutcome]) {
    for card in cards {
        state.submit_quest_outcome(*card).unwrap();
    }
    assert_eq!(state.phase, GamePhase::QuestResult);
}

#[test]
fn evil_wins_by_failing_three_quests_without_an_assassination() {
    let mut rng = ChaCha20Rng::seed_from_u64(99);
    let mut state = scripted_table(0);
    let mut phases = vec![state.phase];

    // Round one: the two Evil players go; Morgana fails.
    assert_eq!(state.quests[0].team_size, 2);
    assert_eq!(state.quests[0].fails_required, 1);
    send_team(&mut state, &[3, 4]);
    assert_eq!(state.active_player_index, 3);
    play_cards(&mut state, &[QuestOutcome::Fail, QuestOutcome::Success]);
    state.process_quest_result(&mut rng).unwrap();
    assert_eq!(state.quests[0].result, QuestResult::Fail);
    assert_eq!(state.quests[0].fail_count(), 1);
    phases.push(state.phase);

    // Round two needs three; Morgana fails again.
    send_team(&mut state, &[0, 3, 1]);
    play_cards(
        &mut state,
        &[QuestOutcome::Success, QuestOutcome::Fail, QuestOutcome::Success],
    );
    state.process_quest_result(&mut rng).unwrap();
    assert_eq!(state.quests[1].result, QuestResult::Fail);
    phases.push(state.phase);

    // Round three seals it.
    send_team(&mut state, &[4, 2]);
    play_cards(&mut state, &[QuestOutcome::Fail, QuestOutcome::Success]);
    state.process_quest_result(&mut rng).unwrap();
    phases.push(state.phase);

    assert_eq!(state.phase, GamePhase::GameOver);
    assert_eq!(state.winner(), Some(Team::Evil));
    assert_eq!(
        state.victory.map(|v| v.cause),
        Some(VictoryCause::QuestsFailed)
    );
    assert_eq!(state.score(), (0, 3));
    assert!(!phases.contains(&GamePhase::Assassination));
    assert_eq!(state.message, Some(GameMessage::EvilQuestVictory));
}

#[test]
fn five_rejections_in_round_one_hand_evil_the_game() {
    let mut state = scripted_table(2);
    for expected in 1..=5u8 {
        state.select_team_member(PlayerId(0)).unwrap();
        state.select_team_member(PlayerId(1)).unwrap();
        state.propose_team().unwrap();
        state.handle_team_vote(false).unwrap();
        assert_eq!(state.vote_track, expected);
    }
    assert_eq!(state.phase, GamePhase::GameOver);
    assert_eq!(state.winner(), Some(Team::Evil));
    assert_eq!(state.current_round, 0);
    assert!(state.quests.iter().all(|q| q.result == QuestResult::Pending));
}

#[test]
fn good_wins_when_the_assassin_misses() {
    let mut rng = ChaCha20Rng::seed_from_u64(5);
    let mut state = scripted_table(1);
    for team in [&[0usize, 1][..], &[0, 1, 2], &[1, 2]] {
        send_team(&mut state, team);
        let cards = vec![QuestOutcome::Success; team.len()];
        play_cards(&mut state, &cards);
        state.process_quest_result(&mut rng).unwrap();
    }
    assert_eq!(state.phase, GamePhase::Assassination);
    assert_eq!(state.assassin, Some(PlayerId(4)));
    assert_eq!(state.score(), (3, 0));

    state.assassinate(PlayerId(1)).unwrap();
    assert_eq!(state.winner(), Some(Team::Good));
    assert_eq!(
        state.message,
        Some(GameMessage::AssassinMissed {
            target: "Brin".to_string()
        })
    );
}

#[test]
fn vote_track_clears_between_rounds() {
    let mut rng = ChaCha20Rng::seed_from_u64(12);
    let mut state = scripted_table(0);
    for _ in 0..3 {
        state.select_team_member(PlayerId(2)).unwrap();
        state.select_team_member(PlayerId(3)).unwrap();
        state.propose_team().unwrap();
        state.handle_team_vote(false).unwrap();
    }
    assert_eq!(state.vote_track, 3);
    assert_eq!(state.current_leader_index, 3);
    send_team(&mut state, &[0, 2]);
    assert_eq!(state.vote_track, 0);
    play_cards(&mut state, &[QuestOutcome::Success, QuestOutcome::Success]);
    state.process_quest_result(&mut rng).unwrap();
    assert_eq!(state.vote_track, 0);
    assert_eq!(state.current_leader_index, 4);
    assert_eq!(state.current_round, 1);
}

#[test]
fn rejected_commands_leave_the_snapshot_alone() {
    let mut state = scripted_table(0);
    let snapshot = state.clone();
    let attempts = [
        state.clone().propose_team(),
        state.clone().handle_team_vote(true),
        state.clone().submit_quest_outcome(QuestOutcome::Success),
        state.clone().assassinate(PlayerId(0)),
        state.clone().advance_night_phase(),
    ];
    assert!(attempts.iter().all(Result::is_err));
    assert!(matches!(
        state.propose_team(),
        Err(GameError::TeamSizeMismatch {
            required: 2,
            selected: 0
        })
    ));
    assert_eq!(state, snapshot);
}

#[test]
fn seeded_sessions_replay_identically() {
    fn drive(seed: u64) -> GameState {
        let mut session = GameSession::new(seed);
        session
            .setup_game(GameSetup::new(NAMES).with_narrated_night(true))
            .unwrap();
        while session.state().phase == GamePhase::RoleReveal {
            session.advance_role_reveal().unwrap();
        }
        while session.state().phase == GamePhase::NarratedNight {
            session.advance_night_phase().unwrap();
        }
        for _ in 0..3 {
            let size = session.state().required_team_size();
            for seat in 0..size {
                session.select_team_member(PlayerId(seat)).unwrap();
            }
            session.propose_team().unwrap();
            session.handle_team_vote(true).unwrap();
            while session.state().phase == GamePhase::QuestExecution {
                let active = session.state().active_player().unwrap().id;
                let card = *session.state().legal_outcomes(active).last().unwrap();
                session.submit_quest_outcome(card).unwrap();
            }
            session.process_quest_result().unwrap();
            if session.state().phase != GamePhase::TeamProposal {
                break;
            }
        }
        session.into_state()
    }

    assert_eq!(drive(314), drive(314));
}

#[test]
fn commands_round_trip_through_json() {
    let script = vec![
        Command::Setup(GameSetup::new(NAMES)),
        Command::AdvanceRoleReveal,
        Command::SelectTeamMember {
            player: PlayerId(3),
        },
        Command::SubmitQuestOutcome {
            outcome: QuestOutcome::Fail,
        },
        Command::Assassinate {
            target: PlayerId(0),
        },
    ];
    let json = serde_json::to_string(&script).unwrap();
    let back: Vec<Command> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, script);
}

#[test]
fn snapshot_serializes_for_presentation_layers() {
    let state = scripted_table(0);
    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(json["phase"], "team_proposal");
    assert_eq!(json["players"][3]["role"], "morgana");
    assert_eq!(json["players"][3]["team"], "evil");
    assert_eq!(json["message"]["kind"], "proposal_turn");
    let back: GameState = serde_json::from_value(json).unwrap();
    assert_eq!(back, state);
}
