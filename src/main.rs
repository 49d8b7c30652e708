//! SwarSetu server binary

use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use swarsetu::database::{Database, TABLES};
use swarsetu::media::MediaStore;
use swarsetu::server::{self, AppState};
use swarsetu::settings::Settings;

#[derive(Parser)]
#[command(name = "swarsetu")]
#[command(about = "Music catalog, upload and likes service")]
struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Address to listen on
    #[arg(long, global = true)]
    host: Option<IpAddr>,
    /// Port to listen on
    #[arg(long, global = true)]
    port: Option<u16>,
    /// SQLite database file
    #[arg(long, global = true)]
    database: Option<PathBuf>,
    /// Directory for uploaded files
    #[arg(long, global = true)]
    uploads: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve,
    /// Create the database and its tables, then exit
    InitDb,
    /// Print the effective settings
    Config {
        /// Also write them to the settings file
        #[arg(long)]
        save: bool,
    },
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load_from_file(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => Settings::load(),
        };

        if let Some(host) = self.host {
            settings.server.host = host;
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(path) = &self.database {
            settings.storage.database_path = path.clone();
        }
        if let Some(dir) = &self.uploads {
            settings.storage.uploads_dir = dir.clone();
        }
        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = cli.settings()?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let db = Database::new(&settings.storage.database_path).await?;
            let media = MediaStore::open(settings.storage.uploads_dir.clone()).await?;
            info!(
                database = %settings.storage.database_path.display(),
                uploads = %settings.storage.uploads_dir.display(),
                "Storage ready"
            );

            let result = server::serve(AppState { db: db.clone(), media }, &settings.server).await;
            db.close().await;
            result
        }
        Commands::InitDb => {
            let db = Database::new(&settings.storage.database_path).await?;
            for table in TABLES {
                info!("Table '{table}' is ready");
            }
            info!(
                "Database initialized at {}",
                settings.storage.database_path.display()
            );
            db.close().await;
            Ok(())
        }
        Commands::Config { save } => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
            match (save, &cli.config) {
                (false, _) => {}
                (true, Some(path)) => settings.save_to_file(path)?,
                (true, None) => settings.save()?,
            }
            Ok(())
        }
    }
}
