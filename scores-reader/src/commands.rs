use log::{info, warn};
use ultiscores_common::{
    output::{OutputSink, persist_snapshot},
    scoring::select_latest,
    ultiscores::{Query, QueryError, Transport, fetch_schedule, fetch_snapshot},
};

/// Runs `query` once and returns the text to show the user. Only
/// `Query::GameEvents` writes to `sink`.
pub async fn execute<T: Transport, S: OutputSink>(
    query: &Query,
    transport: &T,
    sink: &mut S,
) -> Result<String, QueryError> {
    info!("Requesting the {query}");
    match query {
        Query::Schedule { .. } => {
            let games = fetch_schedule(transport, query).await?;
            if !games.warnings.is_empty() {
                warn!("Skipped {} incomplete games", games.warnings.len());
            }
            Ok(games
                .value
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n"))
        }
        Query::GameState { .. } => {
            let parsed = fetch_snapshot(transport, query).await?;
            Ok(serde_json::to_string_pretty(&parsed.value)?)
        }
        Query::GameEvents { .. } => {
            let parsed = fetch_snapshot(transport, query).await?;
            let latest = select_latest(&parsed.value.events);
            persist_snapshot(sink, &parsed.value, &latest)?;
            Ok(serde_json::to_string_pretty(&parsed.value)?)
        }
    }
}
