use clap::{Parser, Subcommand};

mod app;
mod config;
mod error;
mod handlers;
mod middleware;
mod models;

#[derive(Parser)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Apply pending migrations before accepting requests
        #[arg(long)]
        migrate: bool,
    },
    /// Apply pending migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    app::init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve { migrate } => app::serve(migrate).await,
        Commands::Migrate => app::migrate().await,
    }
}
