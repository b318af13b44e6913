pub mod command;
pub mod desk;
pub mod format;
pub mod front_end;
pub mod webhook;

pub use command::{Command, CommandError, parse_command};
pub use desk::AlertDesk;
pub use front_end::WebhookFrontEnd;
pub use webhook::{WebhookClient, WebhookError};
