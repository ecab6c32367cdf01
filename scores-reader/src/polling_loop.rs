use log::{debug, error, info, warn};
use std::{future::Future, time::Duration};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use ultiscores_common::{
    clock::{ClockSynchronizer, WallClock},
    config,
    game_snapshot::GameSnapshot,
    output::{OutputFile, OutputSink, persist_snapshot},
    parse::Parsed,
    scoring::select_latest,
    ultiscores::{Query, QueryError, Transport, TransportError, fetch_snapshot},
};

const SAMPLE_PERIOD: Duration = Duration::from_millis(100);

type FetchResult = Result<Parsed<GameSnapshot>, QueryError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub now: i64,
    /// This second starts a resync
    pub resync: bool,
}

/// Turns wall clock samples into one tick per second, flagging the seconds on
/// which the clock should be resynced.
#[derive(Debug, Clone)]
pub struct Cadence {
    interval: i64,
    last_second: Option<i64>,
}

impl Cadence {
    pub fn new(interval_secs: u32) -> Self {
        Self {
            interval: i64::from(interval_secs.max(1)),
            last_second: None,
        }
    }

    pub fn observe(&mut self, now: i64) -> Option<Tick> {
        if self.last_second == Some(now) {
            return None;
        }
        self.last_second = Some(now);

        // Each second is seen once, so a boundary can only trigger one resync
        Some(Tick {
            now,
            resync: now.rem_euclid(self.interval) == 0,
        })
    }
}

/// Drives the overlay clock for one game until it ends
pub struct PollingLoop<T, S, W> {
    transport: T,
    sink: S,
    wall_clock: W,
    clock: ClockSynchronizer,
    cadence: Cadence,
    query: Query,
    fetch_timeout: Duration,
}

impl<T: Transport, S: OutputSink, W: WallClock> PollingLoop<T, S, W> {
    pub fn new(transport: T, sink: S, wall_clock: W, config: &config::Clock, game: u32) -> Self {
        Self {
            transport,
            sink,
            wall_clock,
            clock: ClockSynchronizer::new(config.game_duration()),
            cadence: Cadence::new(config.resync_interval_secs()),
            query: Query::GameEvents { game },
            fetch_timeout: config.fetch_timeout(),
        }
    }

    #[cfg(test)]
    fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Runs until the server reports the game clock stopped with no time
    /// left, or until `shutdown` completes.
    pub async fn run_until<F: Future>(&mut self, shutdown: F) {
        let (tx, mut rx) = mpsc::channel(1);
        let mut in_flight: Option<JoinHandle<()>> = None;
        let mut sampler = time::interval(SAMPLE_PERIOD);
        sampler.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = sampler.tick() => {
                    let Some(tick) = self.cadence.observe(self.wall_clock.now_secs()) else {
                        continue;
                    };

                    self.write_clock(tick.now);
                    if self.clock.is_finished(tick.now) {
                        info!("The game clock has run out");
                        break;
                    }

                    if tick.resync {
                        if let Some(handle) = in_flight.take() {
                            if !handle.is_finished() {
                                warn!("Previous game update is still running, aborting it");
                                handle.abort();
                            }
                        }
                        in_flight = Some(self.spawn_fetch(tx.clone()));
                    }
                }
                Some(result) = rx.recv() => self.apply_fetch(result),
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
            }
        }

        if let Some(handle) = in_flight {
            handle.abort();
        }
    }

    fn write_clock(&mut self, now: i64) {
        let rendered = self.clock.render(now);
        match self.sink.write_text(OutputFile::Clock, &rendered) {
            Ok(()) => debug!("Clock: {rendered}"),
            Err(e) => error!("Failed to write the clock: {e}"),
        }
    }

    fn spawn_fetch(&self, tx: mpsc::Sender<FetchResult>) -> JoinHandle<()> {
        let transport = self.transport.clone();
        let query = self.query.clone();
        let limit = self.fetch_timeout;

        tokio::spawn(async move {
            let result = time::timeout(limit, fetch_snapshot(&transport, &query))
                .await
                .unwrap_or_else(|_| Err(QueryError::Transport(TransportError::Timeout)));
            if tx.send(result).await.is_err() {
                debug!("Game update finished after the loop stopped");
            }
        })
    }

    fn apply_fetch(&mut self, result: FetchResult) {
        let snapshot = match result {
            Ok(parsed) => parsed.value,
            Err(e) => {
                warn!("Game update failed, keeping the last known state: {e}");
                return;
            }
        };

        if self.clock.resync(&snapshot) {
            debug!("Clock resynced: {:?}", self.clock.state());
        } else {
            debug!("Game update has no clock, keeping {:?}", self.clock.state());
        }

        let latest = select_latest(&snapshot.events);
        debug!("Latest scoring state: {latest:?}");
        if let Err(e) = persist_snapshot(&mut self.sink, &snapshot, &latest) {
            error!("Failed to write game outputs: {e}");
        }
    }
}
