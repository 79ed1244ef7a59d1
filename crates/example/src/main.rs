//! `stowage` command-line entry point.
//!
//! # Usage
//!
//! ```bash
//! stowage generate ./game
//! stowage query ./game player --with Camera
//! stowage inspect ./game
//! ```
//!
//! Logging is controlled by `STOWAGE_LOG` and `STOWAGE_LOG_FORMAT`; a `.env`
//! file in the working directory is loaded first.

#![expect(clippy::print_stderr, reason = "errors are reported on stderr")]

use std::process::ExitCode;

use example::{Command, USAGE, run};
use stowage_runtime::TracingSetup;
use tokio_util::sync::CancellationToken;
use tracing::Level;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    TracingSetup::from_env().with_level(Level::WARN).install();

    let command = match Command::parse(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(err) => {
            eprintln!("error: {err}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted");
            interrupt.cancel();
        }
    });

    let mut stdout = std::io::stdout().lock();
    match run(command, &cancel, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
