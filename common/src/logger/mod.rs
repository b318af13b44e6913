mod init;
mod slow;

pub use init::init_logger;
pub use slow::warn_if_slow;
