use crate::{
    bundles::HomeAwayBundle,
    parse::{ParseError, ParseWarning, Parsed, value_as_bool, value_as_int, value_as_string},
    side::Side,
};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Shirt number (as a string) to player name, in the order the service lists them
pub type Roster = IndexMap<String, String>;

/// The server's stopwatch at the moment the snapshot was taken. `time` and `ds`
/// only make sense together, so they only exist together.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerClock {
    /// Game time elapsed since the start, in tenths of a second
    pub elapsed_tenths: i64,
    /// Server wall clock, in tenths of a second, when the stopwatch was last started
    pub stopwatch_timestamp_tenths: i64,
    pub is_stopped: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Score,
    Other(String),
    Unspecified,
}

impl EventKind {
    pub fn from_code(code: &str) -> Self {
        match code {
            "S" => Self::Score,
            other => Self::Other(other.to_string()),
        }
    }
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringEvent {
    /// Game clock seconds at which the play happened
    pub event_time_secs: i64,
    pub side: Side,
    pub kind: EventKind,
    pub scorer: Option<String>,
    pub assist: Option<String>,
    /// Score after the play. `None` means the service reported no change.
    pub score_after: HomeAwayBundle<Option<String>>,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub clock: Option<ServerClock>,
    pub scores: HomeAwayBundle<Option<String>>,
    pub rosters: HomeAwayBundle<Roster>,
    /// In emission order, which is not necessarily time order
    pub events: Vec<ScoringEvent>,
    pub names: HomeAwayBundle<Option<String>>,
    pub abbreviations: HomeAwayBundle<Option<String>>,
}

/// Parses the response to a single game query.
///
/// Only a payload that is not a JSON object is an error. Missing blocks become
/// `None` or empty, and events without a usable time or team are dropped with a
/// warning.
pub fn parse_snapshot(raw: &str) -> Result<Parsed<GameSnapshot>, ParseError> {
    let data: Value = serde_json::from_str(raw)?;
    if !data.is_object() {
        return Err(ParseError::MalformedPayload(
            "game data is not a JSON object".to_string(),
        ));
    }

    let mut warnings = Vec::new();

    let clock = parse_clock(&data["ts"], &mut warnings);
    let rosters = HomeAwayBundle::from_fn(|side| parse_roster(&data["p"][side.code()]));

    let mut events = Vec::new();
    for (index, raw_event) in data["e"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .enumerate()
    {
        match parse_event(index, raw_event, &rosters) {
            Ok(event) => events.push(event),
            Err(warning) => {
                warn!("Skipping a game event: {warning}");
                warnings.push(warning);
            }
        }
    }
    debug!("Parsed {} game events", events.len());

    let snapshot = GameSnapshot {
        clock,
        scores: HomeAwayBundle {
            home: value_as_string(&data["h"]),
            away: value_as_string(&data["a"]),
        },
        rosters,
        events,
        names: HomeAwayBundle {
            home: data["hn"].as_str().map(str::to_string),
            away: data["an"].as_str().map(str::to_string),
        },
        abbreviations: HomeAwayBundle {
            home: data["ha"].as_str().map(str::to_string),
            away: data["aa"].as_str().map(str::to_string),
        },
    };

    Ok(Parsed::new(snapshot, warnings))
}

fn parse_clock(ts: &Value, warnings: &mut Vec<ParseWarning>) -> Option<ServerClock> {
    match (value_as_int(&ts["time"]), value_as_int(&ts["ds"])) {
        (Some(elapsed_tenths), Some(stopwatch_timestamp_tenths)) => Some(ServerClock {
            elapsed_tenths,
            stopwatch_timestamp_tenths,
            is_stopped: value_as_bool(&ts["stop"]),
        }),
        (None, None) => None,
        _ => {
            warn!("{}", ParseWarning::UnpairedClock);
            warnings.push(ParseWarning::UnpairedClock);
            None
        }
    }
}

fn parse_roster(players: &Value) -> Roster {
    players
        .as_object()
        .map(|players| {
            players
                .iter()
                .filter_map(|(number, name)| Some((number.clone(), value_as_string(name)?)))
                .collect()
        })
        .unwrap_or_default()
}

fn parse_event(
    index: usize,
    raw: &Value,
    rosters: &HomeAwayBundle<Roster>,
) -> Result<ScoringEvent, ParseWarning> {
    if !raw.is_object() {
        return Err(ParseWarning::NotAnObject { index });
    }

    let event_time_secs = match &raw["t"] {
        Value::Null => Err(ParseWarning::MissingField { index, field: "t" }),
        t => value_as_int(t).ok_or(ParseWarning::InvalidField { index, field: "t" }),
    }?;

    let side = match &raw["e"] {
        Value::Null => Err(ParseWarning::MissingField { index, field: "e" }),
        e => e
            .as_str()
            .and_then(Side::from_code)
            .ok_or(ParseWarning::InvalidField { index, field: "e" }),
    }?;

    let kind = raw["y"]
        .as_str()
        .map_or(EventKind::Unspecified, EventKind::from_code);

    Ok(ScoringEvent {
        event_time_secs,
        side,
        kind,
        scorer: resolve_player(rosters, side, &raw["s"]),
        assist: resolve_player(rosters, side, &raw["a"]),
        score_after: HomeAwayBundle {
            home: value_as_string(&raw["hs"]),
            away: value_as_string(&raw["as"]),
        },
    })
}

/// Looks a shirt number up in the roster of `side`. A missing number or a
/// number nobody on the roster wears both resolve to `None`.
pub fn resolve_player(
    rosters: &HomeAwayBundle<Roster>,
    side: Side,
    shirt_number: &Value,
) -> Option<String> {
    let key = value_as_string(shirt_number)?;
    rosters[side].get(&key).cloned()
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    const FULL_SNAPSHOT: &str = r#"{
        "ts": {"time": 123, "ds": 1000, "stop": false},
        "h": "2",
        "a": 1,
        "p": {
            "h": {"7": "Alice Home", "12": "Bea Home"},
            "a": {"3": "Cleo Away"}
        },
        "e": [
            {"t": 300, "e": "h", "y": "S", "s": 7, "a": "12", "hs": "1", "as": "0"},
            {"t": 200, "e": "a", "y": "T"},
            {"t": 450, "e": "a", "y": "S", "s": 3, "a": null, "hs": null, "as": 1},
            {"t": 600, "e": "h", "y": "S", "s": 12, "a": 7, "hs": 2}
        ],
        "hn": "Home Team",
        "an": "Away Team",
        "ha": "HOM",
        "aa": "AWY"
    }"#;

    #[test]
    fn test_parse_full_snapshot() {
        let parsed = parse_snapshot(FULL_SNAPSHOT).unwrap();
        assert!(parsed.warnings.is_empty());
        let snapshot = parsed.value;

        assert_eq!(
            snapshot.clock,
            Some(ServerClock {
                elapsed_tenths: 123,
                stopwatch_timestamp_tenths: 1000,
                is_stopped: Some(false),
            })
        );
        assert_eq!(snapshot.scores.home.as_deref(), Some("2"));
        assert_eq!(snapshot.scores.away.as_deref(), Some("1"));
        assert_eq!(snapshot.names.home.as_deref(), Some("Home Team"));
        assert_eq!(snapshot.abbreviations.away.as_deref(), Some("AWY"));

        let home_numbers: Vec<_> = snapshot.rosters.home.keys().cloned().collect();
        assert_eq!(home_numbers, vec!["7", "12"]);

        assert_eq!(snapshot.events.len(), 4);
        assert_eq!(snapshot.events[1].kind, EventKind::Other("T".to_string()));

        let first = &snapshot.events[0];
        assert_eq!(first.event_time_secs, 300);
        assert_eq!(first.side, Side::Home);
        assert_eq!(first.kind, EventKind::Score);
        assert_eq!(first.scorer.as_deref(), Some("Alice Home"));
        assert_eq!(first.assist.as_deref(), Some("Bea Home"));
        assert_eq!(first.score_after.home.as_deref(), Some("1"));

        let away_goal = &snapshot.events[2];
        assert_eq!(away_goal.scorer.as_deref(), Some("Cleo Away"));
        assert_eq!(away_goal.assist, None);
        assert_eq!(away_goal.score_after.home, None);
        assert_eq!(away_goal.score_after.away.as_deref(), Some("1"));
    }

    #[test]
    fn test_parse_without_clock_or_rosters() {
        let parsed = parse_snapshot(r#"{"h": "0", "a": "0"}"#).unwrap();
        assert!(parsed.warnings.is_empty());
        assert_eq!(parsed.value.clock, None);
        assert!(parsed.value.rosters.home.is_empty());
        assert!(parsed.value.rosters.away.is_empty());
        assert!(parsed.value.events.is_empty());
        assert_eq!(parsed.value.names.home, None);
    }

    #[test]
    fn test_roster_keeps_feed_order() {
        let parsed = parse_snapshot(
            r#"{"p": {"h": {"30": "Cora", "4": "Dana", "12": "Bea", "7": "Alice"}}}"#,
        )
        .unwrap();
        let numbers: Vec<_> = parsed.value.rosters.home.keys().map(String::as_str).collect();
        assert_eq!(numbers, vec!["30", "4", "12", "7"]);
    }

    #[test]
    fn test_parse_one_sided_roster() {
        let parsed = parse_snapshot(r#"{"p": {"a": {"9": "Only Away"}}}"#).unwrap();
        assert!(parsed.value.rosters.home.is_empty());
        assert_eq!(
            parsed.value.rosters.away.get("9").map(String::as_str),
            Some("Only Away")
        );
    }

    #[test]
    fn test_clock_without_stop_flag() {
        let parsed = parse_snapshot(r#"{"ts": {"time": "50", "ds": "900"}}"#).unwrap();
        assert_eq!(
            parsed.value.clock,
            Some(ServerClock {
                elapsed_tenths: 50,
                stopwatch_timestamp_tenths: 900,
                is_stopped: None,
            })
        );
    }

    #[test]
    fn test_unpaired_clock_is_ignored() {
        let parsed = parse_snapshot(r#"{"ts": {"time": 50, "stop": true}}"#).unwrap();
        assert_eq!(parsed.value.clock, None);
        assert_eq!(parsed.warnings, vec![ParseWarning::UnpairedClock]);
    }

    #[test]
    fn test_incomplete_events_are_dropped() {
        let raw = r#"{
            "e": [
                {"e": "h", "y": "S"},
                {"t": 10, "y": "S"},
                {"t": 20, "e": "x", "y": "S"},
                "garbage",
                {"t": 30, "e": "a", "y": "S"}
            ]
        }"#;
        let parsed = parse_snapshot(raw).unwrap();
        assert_eq!(parsed.value.events.len(), 1);
        assert_eq!(parsed.value.events[0].event_time_secs, 30);
        assert_eq!(
            parsed.warnings,
            vec![
                ParseWarning::MissingField { index: 0, field: "t" },
                ParseWarning::MissingField { index: 1, field: "e" },
                ParseWarning::InvalidField { index: 2, field: "e" },
                ParseWarning::NotAnObject { index: 3 },
            ]
        );
    }

    #[test]
    fn test_event_without_kind() {
        let parsed = parse_snapshot(r#"{"e": [{"t": 5, "e": "a"}]}"#).unwrap();
        assert_eq!(parsed.value.events[0].kind, EventKind::Unspecified);
    }

    #[test]
    fn test_malformed_payloads() {
        assert!(matches!(
            parse_snapshot("not json at all"),
            Err(ParseError::MalformedPayload(_))
        ));
        assert!(matches!(
            parse_snapshot("[1, 2, 3]"),
            Err(ParseError::MalformedPayload(_))
        ));
        assert!(matches!(
            parse_snapshot(""),
            Err(ParseError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_resolve_player() {
        let mut rosters: HomeAwayBundle<Roster> = Default::default();
        rosters.home.insert("7".to_string(), "Alice".to_string());
        rosters.away.insert("7".to_string(), "Zed".to_string());

        assert_eq!(
            resolve_player(&rosters, Side::Home, &json!(7)).as_deref(),
            Some("Alice")
        );
        assert_eq!(
            resolve_player(&rosters, Side::Away, &json!("7")).as_deref(),
            Some("Zed")
        );
        assert_eq!(resolve_player(&rosters, Side::Home, &json!(8)), None);
        assert_eq!(resolve_player(&rosters, Side::Home, &json!(null)), None);
    }

    #[test]
    fn test_event_list_reserializes_in_order() {
        let snapshot = parse_snapshot(FULL_SNAPSHOT).unwrap().value;
        let serialized = serde_json::to_string(&snapshot.events).unwrap();
        let events: Vec<ScoringEvent> = serde_json::from_str(&serialized).unwrap();
        assert_eq!(events, snapshot.events);

        let times: Vec<_> = events.iter().map(|e| e.event_time_secs).collect();
        assert_eq!(times, vec![300, 200, 450, 600]);
    }
}
