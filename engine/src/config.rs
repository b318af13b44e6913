use std::time::Duration;

#[derive(Clone, Debug)]
pub struct EngineConfig {
    // =========================
    // Stream lifecycle
    // =========================
    /// How often the subscription manager re-checks the pair set while
    /// there is nothing to watch. A restart request wakes it earlier.
    pub idle_poll: Duration,

    /// How long a cancelled connection gets to exit on its own before it
    /// is aborted. A new connection is never opened before the old one
    /// is gone.
    pub restart_grace: Duration,

    /// Backoff after a dropped connection or a missed pong.
    pub reconnect_delay: Duration,

    /// Backoff after the exchange refused the handshake.
    pub rejected_delay: Duration,

    /// Capacity of the channel between a connection and its tick consumer.
    pub tick_buffer: usize,

    // =========================
    // Heartbeat
    // =========================
    /// Reports are sent on wall-clock boundaries that are multiples of
    /// this step, counted from local midnight.
    pub heartbeat_step: Duration,

    // =========================
    // Collaborator calls
    // =========================
    /// Collaborator calls slower than this are logged.
    pub slow_call: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            idle_poll: Duration::from_secs(1),
            restart_grace: Duration::from_secs(1),
            reconnect_delay: Duration::from_secs(1),
            rejected_delay: Duration::from_secs(5),
            tick_buffer: 256,
            heartbeat_step: Duration::from_secs(20 * 60),
            slow_call: Duration::from_secs(2),
        }
    }
}
