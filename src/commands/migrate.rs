//! Database migration command.

use crate::output;
use sowgen_core::error::AppError;
use sowgen_database::DatabasePool;

/// Run all pending migrations.
pub async fn execute(pool: &DatabasePool) -> Result<(), AppError> {
    println!("Running database migrations...");
    sowgen_database::migration::run_migrations(pool.pool()).await?;
    output::print_success("All migrations applied successfully.");
    Ok(())
}
