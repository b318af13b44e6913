use std::collections::{BTreeSet, HashMap};

use corelib::Pair;

/// Result of feeding one ask price into [`PriceState`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// `None` on the first tick after subscribe or reset: a baseline, never a crossing.
    pub previous: Option<f64>,
    pub current: f64,
}

impl Observation {
    pub fn is_baseline(&self) -> bool {
        self.previous.is_none()
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    previous: Option<f64>,
    current: f64,
}

/// Last two observed asks per watched pair.
#[derive(Debug, Default)]
pub struct PriceState {
    slots: HashMap<Pair, Slot>,
}

impl PriceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, pair: &Pair, price: f64) -> Observation {
        let slot = match self.slots.get_mut(pair) {
            Some(slot) => {
                slot.previous = Some(slot.current);
                slot.current = price;
                *slot
            }
            None => {
                let slot = Slot {
                    previous: None,
                    current: price,
                };
                self.slots.insert(pair.clone(), slot);
                slot
            }
        };

        Observation {
            previous: slot.previous,
            current: slot.current,
        }
    }

    /// Forget history so the next tick becomes a fresh baseline.
    pub fn reset(&mut self, pair: &Pair) {
        self.slots.remove(pair);
    }

    /// Discard a pair that is no longer watched.
    pub fn drop_pair(&mut self, pair: &Pair) {
        self.slots.remove(pair);
    }

    pub fn retain(&mut self, watched: &BTreeSet<Pair>) {
        self.slots.retain(|pair, _| watched.contains(pair));
    }

    pub fn latest(&self, pair: &Pair) -> Option<Observation> {
        self.slots.get(pair).map(|s| Observation {
            previous: s.previous,
            current: s.current,
        })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
