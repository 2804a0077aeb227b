use amirror_core::logging;

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Log file under the XDG state dir; stderr if that is not writable.
    if let Err(err) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable, using stderr: {:#}", err);
    }

    match CliCommand::run_from_args().await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("amirror error: {:#}", err);
            std::process::exit(1);
        }
    }
}
