use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "claimguard")]
#[command(version, about = "Claim-based authorization CLI", long_about = None)]
struct Cli {
    /// Print debug logs (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Permissions model validation
    Model {
        #[command(subcommand)]
        command: ModelCommands,
    },
    /// Check an assertion against an authorization (exit code 1 on deny)
    Test {
        /// Path to the model file (.toml, .yaml, .yml)
        #[arg(short, long)]
        model: Option<String>,

        /// Granted claims, e.g. "admin edit@doc:1"
        authorization: String,

        /// Required claims, e.g. "role:* !banned"
        assertion: String,
    },
    /// Print the canonical, reduced form of a claim string
    Consolidate {
        /// Path to the model file
        #[arg(short, long)]
        model: Option<String>,

        /// Treat the input as an assertion (allows `!`)
        #[arg(long)]
        assertion: bool,

        /// Claim string
        claims: String,
    },
    /// Check whether every token of an authorization is defined by the model
    Supports {
        /// Path to the model file
        #[arg(short, long)]
        model: String,

        /// Claim string
        claims: String,
    },
    /// Classify and echo a single claim
    Inspect {
        /// Claim, e.g. "!edit@doc:1" or "alice>read"
        claim: String,
    },
}

#[derive(Subcommand)]
enum ModelCommands {
    /// Validate a model file
    Check {
        /// Path to the model file
        file: String,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Model { command } => match command {
            ModelCommands::Check { file } => {
                commands::model::check(&file)?;
            }
        },
        Commands::Test {
            model,
            authorization,
            assertion,
        } => {
            if !commands::claims::test(model.as_deref(), &authorization, &assertion)? {
                std::process::exit(1);
            }
        }
        Commands::Consolidate {
            model,
            assertion,
            claims,
        } => {
            commands::claims::consolidate(model.as_deref(), &claims, assertion)?;
        }
        Commands::Supports { model, claims } => {
            if !commands::claims::supports(&model, &claims)? {
                std::process::exit(1);
            }
        }
        Commands::Inspect { claim } => {
            commands::claims::inspect(&claim)?;
        }
    }

    Ok(())
}
