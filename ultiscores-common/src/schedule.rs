use crate::{
    bundles::HomeAwayBundle,
    parse::{ParseError, ParseWarning, Parsed, value_as_bool, value_as_string},
    scoring::DEFAULT_SCORE,
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledGame {
    pub id: String,
    pub date: String,
    pub time: String,
    pub names: HomeAwayBundle<String>,
    pub abbreviations: HomeAwayBundle<String>,
    /// Unplayed games have no scores yet
    pub scores: HomeAwayBundle<Option<String>>,
    pub is_finished: bool,
    pub division: String,
}

impl fmt::Display for ScheduledGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Game ID: {}", self.id)?;
        writeln!(f, "Date: {} Start Time: {}", self.date, self.time)?;
        for (side, name) in &self.names {
            writeln!(
                f,
                "{side} Team: {name} ({}) - {}",
                self.abbreviations[side],
                self.scores[side].as_deref().unwrap_or(DEFAULT_SCORE)
            )?;
        }
        writeln!(f, "Division: {}", self.division)?;
        writeln!(
            f,
            "Game Finished: {}",
            if self.is_finished { "Yes" } else { "No" }
        )
    }
}

/// Parses the response to a schedule query.
///
/// An empty body is an empty schedule. Games missing any required attribute are
/// skipped with a warning and the rest of the list is kept.
pub fn parse_schedule(raw: &str) -> Result<Parsed<Vec<ScheduledGame>>, ParseError> {
    if raw.trim().is_empty() {
        return Ok(Parsed::new(vec![], vec![]));
    }

    let data: Value = serde_json::from_str(raw)?;
    let records = data.as_array().ok_or_else(|| {
        ParseError::MalformedPayload("JSON content is not formatted as a list of games".to_string())
    })?;

    let mut games = Vec::with_capacity(records.len());
    let mut warnings = Vec::new();
    for (index, record) in records.iter().enumerate() {
        match parse_game(index, record) {
            Ok(game) => games.push(game),
            Err(warning) => {
                warn!("Skipping a game: {warning}");
                warnings.push(warning);
            }
        }
    }
    debug!(
        "Parsed {} scheduled games, skipped {}",
        games.len(),
        warnings.len()
    );

    Ok(Parsed::new(games, warnings))
}

fn parse_game(index: usize, record: &Value) -> Result<ScheduledGame, ParseWarning> {
    if !record.is_object() {
        return Err(ParseWarning::NotAnObject { index });
    }

    let required = |field: &'static str| {
        value_as_string(&record[field]).ok_or(ParseWarning::MissingField { index, field })
    };

    Ok(ScheduledGame {
        id: required("i")?,
        date: required("d")?,
        time: required("t")?,
        names: HomeAwayBundle {
            home: required("hn")?,
            away: required("an")?,
        },
        abbreviations: HomeAwayBundle {
            home: required("ha")?,
            away: required("aa")?,
        },
        scores: HomeAwayBundle {
            home: value_as_string(&record["h"]),
            away: value_as_string(&record["a"]),
        },
        is_finished: match &record["e"] {
            Value::Null => Err(ParseWarning::MissingField { index, field: "e" }),
            e => value_as_bool(e).ok_or(ParseWarning::InvalidField { index, field: "e" }),
        }?,
        division: required("dv")?,
    })
}
