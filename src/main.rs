//! Initiative Release - build and publish initiative_manager for every platform.
//!
//! Invoked as `initiative_release TARGET` the binary only prints the target
//! triple it was compiled for, like every binary it packages.

use initiative_release::cli;
use initiative_release::cli::OutputManager;
use initiative_release::target;
use std::process;

#[tokio::main]
async fn main() {
    if target::describe_if_requested(std::env::args()) {
        return;
    }

    env_logger::init();

    match cli::run().await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            // Fatal errors are never quiet
            let output = OutputManager::new(false, false);
            output.error(&format!("Fatal error: {e}"));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                let _ = output.println("\nRecovery suggestions:");
                for suggestion in suggestions {
                    let _ = output.indent(&suggestion);
                }
            }

            process::exit(1);
        }
    }
}
