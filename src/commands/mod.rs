//! CLI command definitions and dispatch.

pub mod migrate;
pub mod sow;
pub mod stats;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use sowgen_core::config::AppConfig;
use sowgen_core::error::AppError;
use sowgen_database::{DatabasePool, PgSowCollection, SowCollection};

/// SOWgen: Statement of Work lifecycle administration
#[derive(Debug, Parser)]
#[command(name = "sowgen", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file; when omitted, `config/default.toml` and
    /// `config/{env}.toml` are layered
    #[arg(short, long)]
    pub config: Option<String>,

    /// Environment overlay name
    #[arg(short, long, env = "SOWGEN_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// List SOWs, newest first
    List(sow::ListArgs),
    /// Show one SOW
    Show(sow::ShowArgs),
    /// Show the revision history of a SOW
    History(sow::HistoryArgs),
    /// Latest revisions across SOWs, newest first
    Recent(sow::RecentArgs),
    /// Dashboard statistics
    Stats(stats::StatsArgs),
}

impl Cli {
    /// Load configuration as selected by the global flags.
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        match &self.config {
            Some(path) => AppConfig::load_file(path),
            None => AppConfig::load(&self.env),
        }
    }

    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        let pool = DatabasePool::connect(&config.database).await?;

        let result = match &self.command {
            Commands::Migrate => migrate::execute(&pool).await,
            Commands::List(args) => sow::list(args, collection(&pool), self.format).await,
            Commands::Show(args) => sow::show(args, collection(&pool), self.format).await,
            Commands::History(args) => sow::history(args, collection(&pool), self.format).await,
            Commands::Recent(args) => sow::recent(args, collection(&pool), self.format).await,
            Commands::Stats(args) => stats::execute(args, collection(&pool), self.format).await,
        };

        pool.close().await;
        result
    }
}

fn collection(pool: &DatabasePool) -> Arc<dyn SowCollection> {
    Arc::new(PgSowCollection::new(pool.pool().clone()))
}

/// Parse an optional user id argument.
pub fn parse_user(raw: Option<&str>) -> Result<Option<sowgen_core::types::UserId>, AppError> {
    raw.map(|s| {
        s.parse()
            .map_err(|e| AppError::validation(format!("Invalid user id '{s}': {e}")))
    })
    .transpose()
}
