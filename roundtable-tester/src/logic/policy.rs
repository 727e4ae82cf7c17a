use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use roundtable_game::{GameState, Player, PlayerId, QuestOutcome, QuestResult, RoleKnowledge};

/// Policy interface for automated play strategies.
///
/// One policy plays every seat; each call names the seat it decides for and
/// the policy must only use what that seat would legitimately know.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Seats the leader puts forward. Must hold exactly the required count.
    fn propose_team(&mut self, state: &GameState, leader: PlayerId) -> Vec<PlayerId>;

    /// One seat's vote on the proposed team.
    fn vote(&mut self, state: &GameState, voter: PlayerId) -> bool;

    /// Card played by a quest member.
    fn play_card(&mut self, state: &GameState, player: PlayerId) -> QuestOutcome;

    /// The Assassin's guess among the legal targets.
    fn pick_target(&mut self, state: &GameState) -> PlayerId;
}

/// Built-in gameplay strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameplayStrategy {
    Random,
    Informed,
    Loyal,
    Deadlock,
}

impl GameplayStrategy {
    pub const ALL: [Self; 4] = [Self::Random, Self::Informed, Self::Loyal, Self::Deadlock];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Random => "Random",
            Self::Informed => "Informed",
            Self::Loyal => "Loyal",
            Self::Deadlock => "Deadlock",
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Informed => "informed",
            Self::Loyal => "loyal",
            Self::Deadlock => "deadlock",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            Self::Random => Box::new(RandomPolicy::new(seed)),
            Self::Informed => Box::new(InformedPolicy::new(seed)),
            Self::Loyal => Box::new(LoyalPolicy::new(seed)),
            Self::Deadlock => Box::new(DeadlockPolicy),
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GameplayStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.key() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|s| s.key()).collect();
                format!("unknown strategy '{s}' (expected one of {})", known.join(", "))
            })
    }
}

/// Chance a random voter approves.
const RANDOM_APPROVAL: f64 = 0.65;
/// Chance a random Evil quest member fails.
const RANDOM_FAIL: f64 = 0.5;
/// From this many rejections on, informed voters approve anything.
const INFORMED_PATIENCE: u8 = 4;

struct RandomPolicy {
    rng: ChaCha20Rng,
}

struct InformedPolicy {
    rng: ChaCha20Rng,
}

struct LoyalPolicy {
    rng: ChaCha20Rng,
}

struct DeadlockPolicy;

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl InformedPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl LoyalPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl PlayerPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn propose_team(&mut self, state: &GameState, _leader: PlayerId) -> Vec<PlayerId> {
        let mut seats = seat_ids(state);
        seats.shuffle(&mut self.rng);
        seats.truncate(state.required_team_size());
        seats
    }

    fn vote(&mut self, _state: &GameState, _voter: PlayerId) -> bool {
        self.rng.gen_bool(RANDOM_APPROVAL)
    }

    fn play_card(&mut self, state: &GameState, player: PlayerId) -> QuestOutcome {
        if is_evil(state, player) && self.rng.gen_bool(RANDOM_FAIL) {
            QuestOutcome::Fail
        } else {
            QuestOutcome::Success
        }
    }

    fn pick_target(&mut self, state: &GameState) -> PlayerId {
        random_target(state, &mut self.rng)
    }
}

impl PlayerPolicy for InformedPolicy {
    fn name(&self) -> &'static str {
        "Informed"
    }

    fn propose_team(&mut self, state: &GameState, leader: PlayerId) -> Vec<PlayerId> {
        let size = state.required_team_size();
        let suspects = known_evil(state, leader);
        let mut team = vec![leader];

        if is_evil(state, leader) {
            // Seat allies first so the quest can be sabotaged.
            team.extend(suspects.iter().copied().filter(|id| *id != leader));
            team.truncate(size.min(2));
        }

        let mut rest: Vec<PlayerId> = seat_ids(state)
            .into_iter()
            .filter(|id| !team.contains(id) && !suspects.contains(id))
            .collect();
        rest.shuffle(&mut self.rng);
        team.extend(rest);

        // A table with too few trusted seats still has to field a full team.
        let mut fallback: Vec<PlayerId> = seat_ids(state)
            .into_iter()
            .filter(|id| !team.contains(id))
            .collect();
        fallback.shuffle(&mut self.rng);
        team.extend(fallback);

        team.truncate(size);
        team
    }

    fn vote(&mut self, state: &GameState, voter: PlayerId) -> bool {
        if state.vote_track >= INFORMED_PATIENCE {
            return true;
        }
        let team = &state.current_quest_team;
        let suspects = known_evil(state, voter);
        if is_evil(state, voter) {
            team.iter().any(|id| *id == voter || suspects.contains(id))
        } else if !suspects.is_empty() {
            !team.iter().any(|id| suspects.contains(id))
        } else {
            team.contains(&voter) || self.rng.gen_bool(0.5)
        }
    }

    fn play_card(&mut self, state: &GameState, player: PlayerId) -> QuestOutcome {
        if is_evil(state, player) {
            QuestOutcome::Fail
        } else {
            QuestOutcome::Success
        }
    }

    fn pick_target(&mut self, state: &GameState) -> PlayerId {
        let targets: Vec<PlayerId> = state.assassination_targets().iter().map(|p| p.id).collect();
        targets
            .choose_weighted(&mut self.rng, |id| quest_record(state, *id))
            .ok()
            .copied()
            .unwrap_or_else(|| random_target(state, &mut self.rng))
    }
}

impl PlayerPolicy for LoyalPolicy {
    fn name(&self) -> &'static str {
        "Loyal"
    }

    fn propose_team(&mut self, state: &GameState, leader: PlayerId) -> Vec<PlayerId> {
        let seats = seat_ids(state);
        let start = leader.index();
        seats
            .iter()
            .cycle()
            .skip(start)
            .take(state.required_team_size())
            .copied()
            .collect()
    }

    fn vote(&mut self, _state: &GameState, _voter: PlayerId) -> bool {
        true
    }

    fn play_card(&mut self, _state: &GameState, _player: PlayerId) -> QuestOutcome {
        QuestOutcome::Success
    }

    fn pick_target(&mut self, state: &GameState) -> PlayerId {
        random_target(state, &mut self.rng)
    }
}

impl PlayerPolicy for DeadlockPolicy {
    fn name(&self) -> &'static str {
        "Deadlock"
    }

    fn propose_team(&mut self, state: &GameState, _leader: PlayerId) -> Vec<PlayerId> {
        seat_ids(state)
            .into_iter()
            .take(state.required_team_size())
            .collect()
    }

    fn vote(&mut self, _state: &GameState, _voter: PlayerId) -> bool {
        false
    }

    fn play_card(&mut self, _state: &GameState, _player: PlayerId) -> QuestOutcome {
        QuestOutcome::Success
    }

    fn pick_target(&mut self, state: &GameState) -> PlayerId {
        state
            .assassination_targets()
            .first()
            .map_or(PlayerId(0), |p| p.id)
    }
}

fn seat_ids(state: &GameState) -> Vec<PlayerId> {
    state.players.iter().map(|p| p.id).collect()
}

fn is_legal_target(state: &GameState, id: PlayerId) -> bool {
    state.assassination_targets().iter().any(|p| p.id == id)
}

fn is_evil(state: &GameState, id: PlayerId) -> bool {
    state.player(id).is_some_and(Player::is_evil)
}

/// Players `viewer` has been told are Evil.
fn known_evil(state: &GameState, viewer: PlayerId) -> Vec<PlayerId> {
    match state.knowledge_for(viewer) {
        Some(RoleKnowledge::SeesEvil { players, .. } | RoleKnowledge::EvilAllies { players, .. }) => {
            players
        }
        _ => Vec::new(),
    }
}

/// Assassin's suspicion of `id`: one plus every successful quest it sat on.
fn quest_record(state: &GameState, id: PlayerId) -> u32 {
    let clean = state
        .quests
        .iter()
        .filter(|q| q.result == QuestResult::Success && q.team.contains(&id))
        .count();
    1 + u32::try_from(clean).unwrap_or(0)
}

fn random_target(state: &GameState, rng: &mut ChaCha20Rng) -> PlayerId {
    let targets: Vec<PlayerId> = state.assassination_targets().iter().map(|p| p.id).collect();
    targets.choose(rng).copied().unwrap_or(PlayerId(0))
}
