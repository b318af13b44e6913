use std::sync::Arc;

use adapters::AlertDesk;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const QUIT_COMMANDS: [&str; 2] = ["quit", "exit"];

/// Operator console: one command per stdin line, replies on stdout.
///
/// `quit` stops the process. End of input only stops the console; the
/// engine keeps running (e.g. under a supervisor with no terminal).
pub async fn run(desk: Arc<AlertDesk>, shutdown: CancellationToken) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            biased;
            _ = shutdown.cancelled() => return,
            line = lines.next_line() => line,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("stdin closed; console stopped");
                return;
            }
            Err(e) => {
                warn!(error = %e, "stdin read failed; console stopped");
                return;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if QUIT_COMMANDS.contains(&trimmed.to_ascii_lowercase().as_str()) {
            info!("Quit requested from console");
            shutdown.cancel();
            return;
        }

        println!("{}", desk.handle(trimmed).await);
    }
}
