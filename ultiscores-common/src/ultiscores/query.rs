use super::FormFields;
use std::fmt;
use time::Date;

/// The requests the reader can make of the watchlive endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Every game scheduled on `date`
    Schedule { date: Date },
    /// Current state of one game, reported but not written to the outputs
    GameState { game: u32 },
    /// Current state of one game, written to the outputs
    GameEvents { game: u32 },
}

impl Query {
    /// Picks the query the command line asked for. A game id wins over a date.
    pub fn from_inputs(game: Option<u32>, date: Option<Date>, write_outputs: bool) -> Option<Self> {
        match (game, date) {
            (Some(game), _) if write_outputs => Some(Self::GameEvents { game }),
            (Some(game), _) => Some(Self::GameState { game }),
            (None, Some(date)) => Some(Self::Schedule { date }),
            (None, None) => None,
        }
    }

    pub fn form_fields(&self) -> FormFields {
        match self {
            Self::Schedule { date } => FormFields::from([
                ("schedule", date.to_string()),
                ("date", date.to_string()),
            ]),
            Self::GameState { game } | Self::GameEvents { game } => FormFields::from([
                ("game", game.to_string()),
                ("update", "true".to_string()),
                ("players", "true".to_string()),
                ("teams", "true".to_string()),
            ]),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schedule { date } => write!(f, "schedule for {date}"),
            Self::GameState { game } => write!(f, "state of game {game}"),
            Self::GameEvents { game } => write!(f, "events of game {game}"),
        }
    }
}
