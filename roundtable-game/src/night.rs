//! Read-aloud script for the narrated night.
//!
//! The script is derived purely from the seated roster; it never touches
//! game state. A presentation layer steps an index through it and calls
//! `finish_narration` (or `advance_night_phase` past the last entry).

use serde::{Deserialize, Serialize};

use crate::player::{Player, has_role};
use crate::roles::Role;

/// Which part of the night a step belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NightCue {
    Sleep,
    EvilWake,
    EvilSleep,
    LoversWake,
    LoversSleep,
    EvilThumbs,
    MerlinWake,
    MerlinSleep,
    PercivalThumbs,
    PercivalWake,
    PercivalSleep,
    Dawn,
}

/// A single line of narration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrationStep {
    pub cue: NightCue,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtext: Option<String>,
}

impl NarrationStep {
    fn new(cue: NightCue, text: impl Into<String>) -> Self {
        Self {
            cue,
            text: text.into(),
            subtext: None,
        }
    }

    fn with_subtext(mut self, subtext: impl Into<String>) -> Self {
        self.subtext = Some(subtext.into());
        self
    }
}

/// Build the ordered night script for `players`.
#[must_use]
pub fn night_script(players: &[Player]) -> Vec<NarrationStep> {
    let visible_evil = players
        .iter()
        .filter(|p| p.is_evil() && p.role != Role::Oberon)
        .count();
    let has_merlin = has_role(players, Role::Merlin);
    let has_percival = has_role(players, Role::Percival);
    let has_morgana = has_role(players, Role::Morgana);
    let has_mordred = has_role(players, Role::Mordred);
    let has_oberon = has_role(players, Role::Oberon);
    let has_lovers = has_role(players, Role::Tristan) && has_role(players, Role::Isolde);

    let mut steps = Vec::with_capacity(14);
    steps.push(
        NarrationStep::new(NightCue::Sleep, "Everyone, close your eyes.")
            .with_subtext("Rest your fists on the table so no one hears a hand move."),
    );

    if visible_evil > 1 {
        let wake = if has_oberon {
            "Servants of evil, except Oberon, open your eyes and find each other."
        } else {
            "Servants of evil, open your eyes and find each other."
        };
        let mut step = NarrationStep::new(NightCue::EvilWake, wake);
        if has_oberon {
            step = step.with_subtext("Oberon keeps his eyes closed.");
        }
        steps.push(step);
        steps.push(NarrationStep::new(
            NightCue::EvilSleep,
            "Servants of evil, close your eyes.",
        ));
    }

    if has_lovers {
        steps.push(NarrationStep::new(
            NightCue::LoversWake,
            "Tristan and Isolde, open your eyes and find each other.",
        ));
        steps.push(NarrationStep::new(
            NightCue::LoversSleep,
            "Tristan and Isolde, close your eyes.",
        ));
    }

    if has_merlin {
        let thumbs = if has_mordred {
            "Servants of evil, except Mordred, raise your thumbs."
        } else {
            "Servants of evil, raise your thumbs."
        };
        let mut step = NarrationStep::new(NightCue::EvilThumbs, thumbs);
        if has_mordred {
            step = step.with_subtext("Mordred keeps his thumb down.");
        }
        steps.push(step);
        steps.push(
            NarrationStep::new(NightCue::MerlinWake, "Merlin, open your eyes and see evil.")
                .with_subtext("Merlin, remember who they are."),
        );
        steps.push(NarrationStep::new(
            NightCue::MerlinSleep,
            "Merlin, close your eyes. Servants of evil, lower your thumbs.",
        ));
    }

    if has_percival {
        let thumbs = if has_morgana {
            "Merlin and Morgana, raise your thumbs."
        } else {
            "Merlin, raise your thumb."
        };
        let mut step = NarrationStep::new(NightCue::PercivalThumbs, thumbs);
        if has_morgana {
            step = step.with_subtext("Percival must not learn which one is Merlin.");
        }
        steps.push(step);
        steps.push(NarrationStep::new(
            NightCue::PercivalWake,
            "Percival, open your eyes and see them.",
        ));
        steps.push(NarrationStep::new(
            NightCue::PercivalSleep,
            "Percival, close your eyes. Lower your thumbs.",
        ));
    }

    steps.push(
        NarrationStep::new(NightCue::Dawn, "Everyone, open your eyes.")
            .with_subtext("Morning has come and the first quest is about to begin."),
    );
    steps
}
