//! Connection supervisor.
//!
//! One supervisor per upstream feed:
//!
//! ```text
//! Disconnected -> Connecting -> Subscribed -> Disconnected (close / error)
//! ```
//!
//! - After the socket opens it waits `settle_delay`, reading and discarding
//!   whatever arrives, then sends the feed's subscribe frames.
//! - Reconnect delays start at `backoff_floor`, double per consecutive
//!   failure up to `backoff_ceiling`, and reset on every `Subscribed`.
//! - A ping goes out every `ping_interval` while subscribed. A missing pong
//!   is not treated as a failure; only transport close/error is.
//! - Malformed payloads are logged and dropped.

use std::time::Duration;

use common::shutdown::ShutdownSignal;
use common::time::now_ms;
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, trace, warn};

use crate::error::FeedError;
use crate::feed::{EventSink, Feed, WatchedMints};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedState {
    Disconnected,
    Connecting,
    Subscribed,
}

#[derive(Clone, Copy, Debug)]
pub struct SupervisorSettings {
    pub settle_delay: Duration,
    pub ping_interval: Duration,
    pub backoff_floor: Duration,
    pub backoff_ceiling: Duration,
    pub connect_timeout: Duration,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(500),
            ping_interval: Duration::from_secs(30),
            backoff_floor: Duration::from_secs(1),
            backoff_ceiling: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Doubling reconnect delay, capped.
#[derive(Clone, Debug)]
pub struct Backoff {
    floor: Duration,
    ceiling: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(floor: Duration, ceiling: Duration) -> Self {
        let ceiling = ceiling.max(floor);
        Self {
            floor,
            ceiling,
            current: floor,
        }
    }

    /// Delay before the next attempt; advances the sequence.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self
            .current
            .checked_mul(2)
            .map_or(self.ceiling, |d| d.min(self.ceiling));
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.floor;
    }
}

enum SessionEnd {
    Closed,
    Shutdown,
}

pub struct FeedSupervisor<F, S> {
    feed: F,
    sink: S,
    settings: SupervisorSettings,
    watched: watch::Receiver<WatchedMints>,
    state_tx: watch::Sender<FeedState>,
    shutdown: ShutdownSignal,
}

impl<F, S> FeedSupervisor<F, S>
where
    F: Feed,
    S: EventSink,
{
    pub fn new(
        feed: F,
        sink: S,
        watched: watch::Receiver<WatchedMints>,
        settings: SupervisorSettings,
        shutdown: ShutdownSignal,
    ) -> Self {
        let (state_tx, _) = watch::channel(FeedState::Disconnected);
        Self {
            feed,
            sink,
            settings,
            watched,
            state_tx,
            shutdown,
        }
    }

    pub fn state(&self) -> watch::Receiver<FeedState> {
        self.state_tx.subscribe()
    }

    fn set_state(&self, state: FeedState) {
        let prev = self.state_tx.send_replace(state);
        if prev != state {
            debug!(feed = self.feed.name(), ?prev, ?state, "feed state changed");
        }
    }

    /// Runs until shutdown or until the sink closes. Transport faults never
    /// end the loop.
    pub async fn run(mut self) -> anyhow::Result<()> {
        let feed = self.feed.name();
        let mut backoff = Backoff::new(self.settings.backoff_floor, self.settings.backoff_ceiling);
        info!(feed, url = self.feed.url(), "feed supervisor started");

        while !self.shutdown.triggered() {
            self.set_state(FeedState::Connecting);

            match self.session(&mut backoff).await {
                Ok(SessionEnd::Shutdown) => break,
                Ok(SessionEnd::Closed) => info!(feed, "feed connection closed"),
                Err(FeedError::SinkClosed) => {
                    info!(feed, "event sink closed; stopping feed");
                    break;
                }
                Err(e) => warn!(feed, error = %e, "feed connection failed"),
            }

            self.set_state(FeedState::Disconnected);
            let delay = backoff.next_delay();
            info!(feed, delay_ms = delay.as_millis() as u64, "reconnecting after backoff");
            if !self.shutdown.sleep(delay).await {
                break;
            }
        }

        self.set_state(FeedState::Disconnected);
        info!(feed, "feed supervisor stopped");
        Ok(())
    }

    async fn session(&mut self, backoff: &mut Backoff) -> Result<SessionEnd, FeedError> {
        let url = self.feed.url().to_string();
        let timeout = self.settings.connect_timeout;

        let ws = tokio::select! {
            _ = self.shutdown.wait() => return Ok(SessionEnd::Shutdown),
            res = tokio::time::timeout(timeout, connect_async(url.as_str())) => {
                let (ws, _) = res.map_err(|_| FeedError::ConnectTimeout(timeout))??;
                ws
            }
        };
        let (mut write, mut read) = ws.split();

        // settle: anything the server says before we subscribe is dropped
        let settle = tokio::time::sleep(self.settings.settle_delay);
        tokio::pin!(settle);
        loop {
            tokio::select! {
                _ = self.shutdown.wait() => {
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(SessionEnd::Shutdown);
                }
                _ = &mut settle => break,
                msg = read.next() => match msg {
                    Some(Ok(m)) => trace!(feed = self.feed.name(), len = m.len(), "frame before subscribe ignored"),
                    Some(Err(e)) => return Err(e.into()),
                    None => return Ok(SessionEnd::Closed),
                },
            }
        }

        let watched = self.watched.borrow_and_update().clone();
        for frame in self.feed.subscribe_frames(&watched) {
            trace!(feed = self.feed.name(), %frame, "subscribe");
            write.send(Message::Text(frame.into())).await?;
        }
        self.set_state(FeedState::Subscribed);
        backoff.reset();
        info!(feed = self.feed.name(), watched = watched.len(), "feed subscribed");

        let period = self.settings.ping_interval;
        let mut ping = tokio::time::interval_at(Instant::now() + period, period);
        ping.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut watch_open = true;

        loop {
            tokio::select! {
                _ = self.shutdown.wait() => {
                    if let Err(e) = write.send(Message::Close(None)).await {
                        debug!(feed = self.feed.name(), error = %e, "close frame not sent");
                    }
                    return Ok(SessionEnd::Shutdown);
                }

                _ = ping.tick() => {
                    write.send(Message::Ping(Default::default())).await?;
                    trace!(feed = self.feed.name(), "ping");
                }

                changed = self.watched.changed(), if watch_open => {
                    if changed.is_err() {
                        watch_open = false;
                        continue;
                    }
                    let current = self.watched.borrow_and_update().clone();
                    for frame in self.feed.watch_frames(&current) {
                        trace!(feed = self.feed.name(), %frame, "watch update");
                        write.send(Message::Text(frame.into())).await?;
                    }
                }

                msg = read.next() => match msg {
                    Some(Ok(Message::Text(text))) => self.handle_text(text.as_str()).await?,
                    Some(Ok(Message::Close(frame))) => {
                        info!(feed = self.feed.name(), ?frame, "server closed the connection");
                        return Ok(SessionEnd::Closed);
                    }
                    // ping / pong / binary
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => return Ok(SessionEnd::Closed),
                },
            }
        }
    }

    async fn handle_text(&mut self, raw: &str) -> Result<(), FeedError> {
        trace!(feed = self.feed.name(), raw, "frame");
        let now = now_ms();
        let watched = self.watched.borrow().clone();

        match self.feed.decode(raw, &watched, now) {
            Ok(events) => {
                for event in events {
                    self.sink.deliver(event).await?;
                }
            }
            Err(e) => warn!(feed = self.feed.name(), error = %e, "dropping malformed payload"),
        }
        Ok(())
    }
}
