//! Dashboard statistics command.

use std::sync::Arc;

use clap::Args;

use crate::output::{self, OutputFormat};
use sowgen_core::error::AppError;
use sowgen_database::SowCollection;
use sowgen_service::StatsService;

/// Arguments for `stats`
#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Only SOWs owned by this client id
    #[arg(long)]
    pub client: Option<String>,
}

/// Print dashboard statistics.
pub async fn execute(
    args: &StatsArgs,
    collection: Arc<dyn SowCollection>,
    format: OutputFormat,
) -> Result<(), AppError> {
    let owner = super::parse_user(args.client.as_deref())?;
    let stats = StatsService::new(collection).compute(owner).await?;

    let pairs = [
        ("Total", stats.total.to_string()),
        ("Draft", stats.draft.to_string()),
        ("Pending", stats.pending.to_string()),
        ("Approved", stats.approved.to_string()),
        ("Rejected", stats.rejected.to_string()),
        ("Changes requested", stats.changes_requested.to_string()),
        ("Approval rate", format!("{}%", stats.approval_rate)),
        ("Avg. approval time", format!("{} days", stats.avg_approval_time_days)),
    ];
    output::print_item(&pairs, &stats, format);
    Ok(())
}
