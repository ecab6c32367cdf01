use crate::{
    bundles::HomeAwayBundle,
    game_snapshot::{EventKind, ScoringEvent},
    side::Side,
};
use enum_iterator::all;
use serde::Serialize;

/// Shown for a score nobody has reported yet. This is the only unknown-score
/// marker used anywhere in the crate.
pub const DEFAULT_SCORE: &str = "0";

/// Shown for a scorer or assist nobody has reported yet. A single space keeps
/// the output file non-empty, so the sink still writes a (blank) line.
pub const BLANK_NAME: &str = " ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatestScoringState {
    pub scores: HomeAwayBundle<String>,
    pub scorer: String,
    pub assist: String,
}

impl Default for LatestScoringState {
    fn default() -> Self {
        Self {
            scores: HomeAwayBundle::from_fn(|_| DEFAULT_SCORE.to_string()),
            scorer: BLANK_NAME.to_string(),
            assist: BLANK_NAME.to_string(),
        }
    }
}

/// Picks the score, scorer and assist to display from the latest goal.
///
/// Only `EventKind::Score` events count. The latest is the one with the highest
/// game time; when two share a time the one later in the list wins. Fields the
/// chosen event leaves empty keep their defaults instead of blanking the display.
pub fn select_latest(events: &[ScoringEvent]) -> LatestScoringState {
    let mut state = LatestScoringState::default();

    let Some(latest) = events
        .iter()
        .filter(|event| event.kind == EventKind::Score)
        .max_by_key(|event| event.event_time_secs)
    else {
        return state;
    };

    replace_if_present(&mut state.scorer, &latest.scorer);
    replace_if_present(&mut state.assist, &latest.assist);
    for side in all::<Side>() {
        replace_if_present(&mut state.scores[side], &latest.score_after[side]);
    }

    state
}

fn replace_if_present(display: &mut String, value: &Option<String>) {
    if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
        *display = value.to_string();
    }
}
