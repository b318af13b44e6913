//! Threshold crossing test.
//!
//! A crossing happens on a tick when the threshold lies inside the closed
//! interval spanned by the previous and the current ask. Touching the
//! threshold exactly counts; jumping over it in one tick counts too.

use corelib::{Alert, Direction};

use crate::price_state::Observation;

#[derive(Debug, Clone, PartialEq)]
pub struct Crossing {
    pub alert: Alert,
    pub direction: Direction,
    pub previous: f64,
    pub current: f64,
}

pub fn crossed(previous: f64, current: f64, threshold: f64) -> bool {
    let (low, high) = if previous <= current {
        (previous, current)
    } else {
        (current, previous)
    };
    low <= threshold && threshold <= high
}

/// Alerts from `alerts` crossed by `observation`. A baseline observation crosses nothing.
pub fn detect(observation: &Observation, alerts: &[Alert]) -> Vec<Crossing> {
    let Some(previous) = observation.previous else {
        return Vec::new();
    };
    let current = observation.current;
    let direction = Direction::between(previous, current);

    alerts
        .iter()
        .filter(|a| crossed(previous, current, a.threshold))
        .map(|a| Crossing {
            alert: a.clone(),
            direction,
            previous,
            current,
        })
        .collect()
}
