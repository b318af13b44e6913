pub mod collaborator;
pub mod config;
pub mod counters;
pub mod crossing;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod heartbeat;
pub mod price_state;
pub mod state;
pub mod store;
pub mod subscription;

pub use collaborator::{AlertCollaborator, DeleteOutcome, Firing, HeartbeatReport};
pub use config::EngineConfig;
pub use counters::Counters;
pub use engine::AlertEngine;
pub use error::EngineError;
pub use subscription::StreamState;
