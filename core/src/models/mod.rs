mod alert;
mod pair;

pub use alert::{Alert, AlertId, AlertRequest, Direction, OriginRef};
pub use pair::{PAIR_SEPARATOR, Pair};
