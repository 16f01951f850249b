//! CLI command handling
//!
//! Runs CLI commands against the library and formats their output.

use colored::Colorize;
use std::path::Path;

use crate::actions::required_fields;
use crate::commands::Commands;
use crate::common::{Config, Error, Result};
use crate::events;
use crate::model::{ActionKind, Scenario, Step};
use crate::strategy::Strategy;
use crate::validation::ValidationChain;

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Validate { files, env } => {
            let env = env.unwrap_or_else(|| config.environment());
            let chain = ValidationChain::for_environment(&env);
            let strategy = Strategy::for_environment(&env, config);

            let mut failed = 0;
            for file in &files {
                if !validate_file(file, &chain, &strategy) {
                    failed += 1;
                }
            }

            println!();
            if failed > 0 {
                return Err(Error::Config(format!(
                    "{} of {} scenario files failed validation",
                    failed,
                    files.len()
                )));
            }
            println!(
                "{} {} scenario file(s) valid",
                "✓".green().bold(),
                files.len()
            );
            Ok(())
        }

        Commands::Plan { env, strategy } => {
            let env = env.unwrap_or_else(|| config.environment());
            let strategy = match strategy {
                Some(kind) => Strategy::build(kind, config),
                None => Strategy::for_environment(&env, config),
            };
            let chain = ValidationChain::for_environment(&env);
            let observers = events::for_environment(&env, config);

            println!("Environment: {}", env.bold());
            println!("Strategy:    {}", strategy.name());
            println!("             {}", strategy.description().dimmed());
            println!("Validators:  {}", chain.names().join(" -> "));
            let names: Vec<&str> = observers.iter().map(|o| o.name()).collect();
            println!("Observers:   {}", names.join(", "));
            println!(
                "Workers:     {} (timeout {}s)",
                config.parallel.threads, config.parallel.timeout_secs
            );
            Ok(())
        }

        Commands::Actions => {
            println!("{:<22} {:<9} FIELDS", "ACTION", "CATEGORY");
            for kind in ActionKind::ALL {
                println!(
                    "{:<22} {:<9} {}",
                    kind.as_str(),
                    kind.category().to_string(),
                    required_fields(kind).join(", ")
                );
            }
            Ok(())
        }
    }
}

/// Print the verdict for one file; true when it is valid
fn validate_file(path: &Path, chain: &ValidationChain<Step>, strategy: &Strategy) -> bool {
    let scenario = match Scenario::from_path(path) {
        Ok(scenario) => scenario,
        Err(e) => {
            println!("{} {}: {}", "✗".red(), path.display(), e);
            return false;
        }
    };

    if !strategy.supports(&scenario.steps) {
        println!(
            "{} {}: strategy {} does not support an empty step list",
            "✗".red(),
            path.display(),
            strategy
        );
        return false;
    }

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    for (index, step) in scenario.steps.iter().enumerate() {
        let result = chain.validate(step);
        let label = step.label(index);
        warnings.extend(result.warnings.iter().map(|w| format!("{}: {}", label, w)));
        if result.is_invalid() {
            errors.push(format!("{}: {}", label, result.error_message()));
        }
    }

    let valid = errors.is_empty();
    if valid {
        println!(
            "{} {} ({}, {} steps)",
            "✓".green(),
            path.display(),
            scenario.name,
            scenario.steps.len()
        );
    } else {
        println!("{} {} ({})", "✗".red(), path.display(), scenario.name);
    }
    for error in &errors {
        println!("    {} {}", "error:".red(), error);
    }
    for warning in &warnings {
        println!("    {} {}", "warning:".yellow(), warning.dimmed());
    }
    valid
}
