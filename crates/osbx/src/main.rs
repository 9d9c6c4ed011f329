use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process;

mod commands;

/// Exit codes follow the gate's status mapping.
/// 0 = OK, 3 = conflict (409), 6 = gone (410), 7 = not found (404), 1 = other.
const EXIT_OTHER: i32 = 1;
const EXIT_CONFLICT: i32 = 3;
const EXIT_GONE: i32 = 6;
const EXIT_NOT_FOUND: i32 = 7;

#[derive(Parser)]
#[command(name = "osbx", version, about = "Service broker CLI — catalog, provision, bind")]
struct Cli {
    /// Gate server URL
    #[arg(long, env = "OSB_GATE_URL", default_value = "http://localhost:3000")]
    gate: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the service catalog
    Catalog {
        /// Print raw JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Provision a service instance
    Provision { instance_id: String },
    /// Deprovision a service instance
    Deprovision { instance_id: String },
    /// Bind credentials to an instance
    Bind {
        instance_id: String,
        binding_id: String,
    },
    /// Remove a binding
    Unbind {
        instance_id: String,
        binding_id: String,
    },
    /// Check gate server health
    Health,
}

fn exit_code_for(err: &str) -> i32 {
    if err.starts_with("HTTP 409") {
        EXIT_CONFLICT
    } else if err.starts_with("HTTP 410") {
        EXIT_GONE
    } else if err.starts_with("HTTP 404") {
        EXIT_NOT_FOUND
    } else {
        EXIT_OTHER
    }
}

fn main() {
    let cli = Cli::parse();
    let client = commands::Client::new(&cli.gate);

    let result = match cli.command {
        Commands::Catalog { json } => commands::catalog(&client, json),
        Commands::Provision { instance_id } => commands::provision(&client, &instance_id),
        Commands::Deprovision { instance_id } => commands::deprovision(&client, &instance_id),
        Commands::Bind {
            instance_id,
            binding_id,
        } => commands::bind(&client, &instance_id, &binding_id),
        Commands::Unbind {
            instance_id,
            binding_id,
        } => commands::unbind(&client, &instance_id, &binding_id),
        Commands::Health => commands::health(&client),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        process::exit(exit_code_for(&e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_status() {
        assert_eq!(exit_code_for("HTTP 409: binding already exists"), EXIT_CONFLICT);
        assert_eq!(exit_code_for("HTTP 410: gone"), EXIT_GONE);
        assert_eq!(exit_code_for("HTTP 404: instance does not exist"), EXIT_NOT_FOUND);
        assert_eq!(exit_code_for("HTTP 500: broker failed"), EXIT_OTHER);
        assert_eq!(exit_code_for("request failed: connection refused"), EXIT_OTHER);
    }
}
