//! State shared by the engine's tasks.
//!
//! `EngineState` (alerts + prices) lives behind one async mutex so that a
//! tick's detect-and-retire step and a user's add/remove never interleave.
//! Retiring an alert happens under that lock, before any notification is
//! attempted; that is what makes every alert fire at most once.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use corelib::{AlertId, Pair};
use market::Tick;
use tokio::sync::{Mutex, Notify, mpsc, watch};
use tracing::{debug, info};

use crate::collaborator::Firing;
use crate::counters::Counters;
use crate::crossing;
use crate::price_state::PriceState;
use crate::store::{AlertStore, Removed};
use crate::subscription::StreamState;

#[derive(Debug, Default)]
pub struct EngineState {
    pub alerts: AlertStore,
    pub prices: PriceState,
}

#[derive(Debug, Default, PartialEq)]
pub struct TickOutcome {
    pub firings: Vec<Firing>,
    /// At least one firing removed the last alert of the pair.
    pub pair_emptied: bool,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove an alert and, if it was the last on its pair, the pair's prices.
    pub fn retire(&mut self, id: AlertId) -> Option<Removed> {
        let removed = self.alerts.remove(id)?;
        if removed.pair_emptied {
            self.prices.drop_pair(&removed.alert.pair);
        }
        Some(removed)
    }

    /// Record a tick and retire every alert it crosses.
    ///
    /// Ticks for pairs without alerts are ignored and leave no price state.
    pub fn apply_tick(&mut self, tick: &Tick) -> Option<TickOutcome> {
        if !self.alerts.contains_pair(&tick.pair) {
            return None;
        }

        let observation = self.prices.observe(&tick.pair, tick.ask);
        let crossings = crossing::detect(&observation, &self.alerts.list_by_pair(&tick.pair));

        let mut outcome = TickOutcome::default();
        for c in crossings {
            let Some(removed) = self.retire(c.alert.id) else {
                continue;
            };
            outcome.pair_emptied |= removed.pair_emptied;
            outcome.firings.push(Firing {
                alert: removed.alert,
                direction: c.direction,
                previous: c.previous,
                price: c.current,
                at: tick.ts,
            });
        }

        Some(outcome)
    }

    /// A fresh connection has no price history.
    pub fn on_connected(&mut self, subscribed: &[Pair]) {
        for pair in subscribed {
            self.prices.reset(pair);
        }
        let watched = self.alerts.pairs();
        self.prices.retain(&watched);
    }
}

pub(crate) struct Shared {
    pub state: Mutex<EngineState>,
    pub restart: Notify,
    pub firings: mpsc::UnboundedSender<Firing>,
    pub last_tick: parking_lot::Mutex<Option<DateTime<Utc>>>,
    pub stream_state: watch::Sender<StreamState>,
    pub counters: Counters,
}

impl Shared {
    pub fn new(firings: mpsc::UnboundedSender<Firing>) -> Self {
        let (stream_state, _) = watch::channel(StreamState::Idle);
        Self {
            state: Mutex::new(EngineState::new()),
            restart: Notify::new(),
            firings,
            last_tick: parking_lot::Mutex::new(None),
            stream_state,
            counters: Counters::default(),
        }
    }

    /// Ask the subscription manager to re-read the pair set.
    /// Requests made before it gets around to it collapse into one.
    pub fn request_restart(&self) {
        self.restart.notify_one();
    }

    pub fn set_stream_state(&self, state: StreamState) {
        let prev = self.stream_state.send_replace(state);
        if prev != state {
            debug!(from = %prev, to = %state, "Stream state changed");
        }
    }

    pub fn stream_state(&self) -> StreamState {
        *self.stream_state.borrow()
    }

    pub async fn watched_pairs(&self) -> BTreeSet<Pair> {
        self.state.lock().await.alerts.pairs()
    }

    pub async fn on_connected(&self, subscribed: &[Pair]) {
        self.state.lock().await.on_connected(subscribed);
        self.set_stream_state(StreamState::Streaming);
    }

    pub async fn on_tick(&self, tick: &Tick) {
        *self.last_tick.lock() = Some(Utc::now());
        Counters::bump(&self.counters.ticks);

        let outcome = self.state.lock().await.apply_tick(tick);
        let Some(outcome) = outcome else {
            Counters::bump(&self.counters.ticks_ignored);
            return;
        };

        if outcome.pair_emptied {
            self.request_restart();
        }

        for firing in outcome.firings {
            Counters::bump(&self.counters.firings);
            info!(
                alert_id = %firing.alert.id,
                pair = %firing.alert.pair,
                threshold = firing.alert.threshold,
                price = firing.price,
                direction = %firing.direction,
                "Alert crossed"
            );
            if self.firings.send(firing).is_err() {
                debug!("Dispatcher gone; firing dropped");
            }
        }
    }
}
