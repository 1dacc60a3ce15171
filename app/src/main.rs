use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "A personal trading journal server.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs the HTTP API server.
    Serve {
        /// Overrides the configured listen port.
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Connects to the database, applies pending migrations, and exits.
    Migrate,
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let settings = app_config::load_settings()?;

    // Respect the configured log level, but keep sqlx query logging quiet.
    let default_level = settings
        .app
        .log_level
        .parse()
        .unwrap_or(tracing::Level::INFO);
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(
        tracing_subscriber::filter::Targets::new()
            .with_target("sqlx::query", tracing::Level::WARN)
            .with_default(default_level),
    );
    tracing_subscriber::registry().with(fmt_layer).init();

    tracing::info!(
        environment = %settings.app.environment,
        "Starting trading journal"
    );

    match cli.command {
        Commands::Serve { port } => {
            let db = database::connect(&settings.database).await?;

            let mut server = settings.server.clone();
            if let Some(port) = port {
                server.port = port;
            }

            web_server::run(server, settings.session.clone(), db).await?;
        }
        Commands::Migrate => {
            // `connect` runs pending migrations before returning.
            database::connect(&settings.database).await?;
            tracing::info!("Database migrations are up to date");
        }
    }

    Ok(())
}
