//! Command execution functions coordinating the pipeline stages.

mod build;
mod helpers;
mod pipeline;
mod release;
mod status;

use crate::cli::{Args, Command, RuntimeConfig};
use crate::config::{EnvConfig, PipelineConfig};
use crate::error::Result;

use build::execute_build;
use pipeline::execute_pipeline;
use release::execute_release;
use status::execute_status;

/// Execute the main command based on parsed arguments
pub async fn execute_command(args: Args) -> Result<i32> {
    if let Err(validation_error) = args.validate() {
        let output = super::OutputManager::new(false, false);
        output.error(&format!("Invalid arguments: {}", validation_error));
        return Ok(1);
    }

    let runtime = RuntimeConfig::from(&args);

    if let Command::Target = args.command {
        println!("{}", crate::target::build_target());
        return Ok(0);
    }

    let env = EnvConfig::from_env();
    let config_path = args.config_path();
    let config = PipelineConfig::load(&config_path)?;
    let config = PipelineConfig {
        retry: config.retry.clone().with_env_overrides(&env),
        ..config
    };
    log::debug!("Loaded configuration: {:?}", config);
    runtime.verbose_println(&format!(
        "Config {} ({}), store {}",
        config_path.display(),
        if config_path.exists() { "loaded" } else { "defaults" },
        config.store_dir.display()
    ));

    let result = match &args.command {
        Command::Build { .. } => execute_build(&args, &config, &runtime).await,
        Command::Release { .. } => execute_release(&args, &config, &env, &runtime).await,
        Command::Pipeline { .. } => execute_pipeline(&args, config, &env, &runtime).await,
        Command::Status { .. } => execute_status(&args, &config, &runtime).await,
        Command::Target => Ok(0),
    };

    match result {
        Ok(exit_code) => Ok(exit_code),
        Err(e) => {
            runtime.error_println(&format!(
                "Command '{}' failed: {}",
                args.command.name(),
                e
            ));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() && !runtime.is_quiet() {
                runtime.println("\nRecovery suggestions:");
                for suggestion in suggestions {
                    runtime.println(&format!("  • {}", suggestion));
                }
            }

            Ok(1)
        }
    }
}
