//! AlertStore
//!
//! In-memory registry of active alerts grouped by pair. The set of keys is
//! exactly the set of watched pairs: a pair is present iff it has at least
//! one alert, so the stream subscription can be derived from `pairs()`.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use corelib::{Alert, AlertId, Pair};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOutcome {
    pub id: AlertId,
    /// The pair had no alerts before this one; the subscription must change.
    pub first_for_pair: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Removed {
    pub alert: Alert,
    /// This was the last alert on its pair; the subscription must change.
    pub pair_emptied: bool,
}

#[derive(Debug, Default)]
pub struct AlertStore {
    by_pair: BTreeMap<Pair, Vec<Alert>>,
    index: HashMap<AlertId, Pair>,
}

impl AlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an alert. Re-adding a known id is a no-op.
    pub fn add(&mut self, alert: Alert) -> AddOutcome {
        let id = alert.id;
        if self.index.contains_key(&id) {
            return AddOutcome {
                id,
                first_for_pair: false,
            };
        }

        let first_for_pair = !self.by_pair.contains_key(&alert.pair);
        self.index.insert(id, alert.pair.clone());
        self.by_pair.entry(alert.pair.clone()).or_default().push(alert);

        AddOutcome { id, first_for_pair }
    }

    pub fn remove(&mut self, id: AlertId) -> Option<Removed> {
        let pair = self.index.remove(&id)?;
        let alerts = self.by_pair.get_mut(&pair)?;
        let pos = alerts.iter().position(|a| a.id == id)?;
        let alert = alerts.remove(pos);

        let pair_emptied = alerts.is_empty();
        if pair_emptied {
            self.by_pair.remove(&pair);
        }

        Some(Removed {
            alert,
            pair_emptied,
        })
    }

    pub fn get(&self, id: AlertId) -> Option<&Alert> {
        let pair = self.index.get(&id)?;
        self.by_pair.get(pair)?.iter().find(|a| a.id == id)
    }

    /// Snapshot of the alerts on `pair`, in insertion order.
    pub fn list_by_pair(&self, pair: &Pair) -> Vec<Alert> {
        self.by_pair.get(pair).cloned().unwrap_or_default()
    }

    pub fn contains_pair(&self, pair: &Pair) -> bool {
        self.by_pair.contains_key(pair)
    }

    pub fn pairs(&self) -> BTreeSet<Pair> {
        self.by_pair.keys().cloned().collect()
    }

    /// Every alert, ordered by pair and then by insertion.
    pub fn list(&self) -> Vec<Alert> {
        self.by_pair.values().flatten().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
