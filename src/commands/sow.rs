//! SOW inspection commands.

use std::sync::Arc;

use clap::Args;
use futures::{StreamExt, TryStreamExt};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use sowgen_core::error::AppError;
use sowgen_database::SowCollection;
use sowgen_entity::sow::{Sow, SowStatus};
use sowgen_service::{DocumentStore, RecentChange};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Arguments for `list`
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only SOWs owned by this client id
    #[arg(long)]
    pub client: Option<String>,
    /// Only SOWs in this status
    #[arg(short, long)]
    pub status: Option<String>,
    /// Maximum number of rows
    #[arg(short, long, default_value = "200")]
    pub limit: usize,
}

/// Arguments for `show`
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// SOW id
    pub id: String,
}

/// Arguments for `history`
#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// SOW id
    pub id: String,
    /// Replay the history and check it against the current document
    #[arg(long)]
    pub verify: bool,
}

/// Arguments for `recent`
#[derive(Debug, Args)]
pub struct RecentArgs {
    /// Only revisions of SOWs owned by this client id
    #[arg(long)]
    pub client: Option<String>,
    /// Maximum number of revisions
    #[arg(short, long, default_value = "10")]
    pub limit: usize,
}

/// SOW list row
#[derive(Debug, Serialize, Tabled)]
struct SowRow {
    /// ID
    id: String,
    /// Project
    project: String,
    /// Status
    status: String,
    /// Version
    version: u64,
    /// Updated
    updated: String,
}

impl From<&Sow> for SowRow {
    fn from(sow: &Sow) -> Self {
        Self {
            id: sow.id.to_string(),
            project: sow.project_name.clone(),
            status: sow.status.to_string(),
            version: sow.version,
            updated: sow.updated_at.format(TIME_FORMAT).to_string(),
        }
    }
}

/// Revision row
#[derive(Debug, Serialize, Tabled)]
struct RevisionRow {
    /// Version
    version: u64,
    /// When
    time: String,
    /// Changed by
    changed_by: String,
    /// Summary
    summary: String,
}

/// Recent change row
#[derive(Debug, Serialize, Tabled)]
struct RecentRow {
    /// When
    time: String,
    /// Project
    project: String,
    /// Version
    version: u64,
    /// Changed by
    changed_by: String,
    /// Summary
    summary: String,
    /// Fields
    changes: usize,
}

impl From<&RecentChange> for RecentRow {
    fn from(change: &RecentChange) -> Self {
        Self {
            time: change.timestamp.format(TIME_FORMAT).to_string(),
            project: change.project_name.clone(),
            version: change.version,
            changed_by: change.changed_by_name.clone(),
            summary: change.summary.clone(),
            changes: change.change_count,
        }
    }
}

/// List SOWs.
pub async fn list(
    args: &ListArgs,
    collection: Arc<dyn SowCollection>,
    format: OutputFormat,
) -> Result<(), AppError> {
    let owner = super::parse_user(args.client.as_deref())?;
    let status = args
        .status
        .as_deref()
        .map(str::parse::<SowStatus>)
        .transpose()?;

    let store = DocumentStore::with_defaults(collection);
    let sows: Vec<Sow> = store
        .list(owner, status)
        .take(args.limit)
        .try_collect()
        .await?;

    let rows: Vec<SowRow> = sows.iter().map(SowRow::from).collect();
    output::print_list(&rows, &sows, format);
    Ok(())
}

/// Show one SOW.
pub async fn show(
    args: &ShowArgs,
    collection: Arc<dyn SowCollection>,
    format: OutputFormat,
) -> Result<(), AppError> {
    let store = DocumentStore::with_defaults(collection);
    let sow = store.get(&args.id).await?;

    let optional = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    let pairs = [
        ("ID", sow.id.to_string()),
        ("Project", sow.project_name.clone()),
        ("Description", optional(&sow.project_description)),
        ("Client", sow.client_id.to_string()),
        ("Client name", optional(&sow.client_name)),
        ("Organization", optional(&sow.client_organization)),
        ("Status", sow.status.to_string()),
        ("Version", sow.version.to_string()),
        ("Created", sow.created_at.format(TIME_FORMAT).to_string()),
        ("Updated", sow.updated_at.format(TIME_FORMAT).to_string()),
        ("Revisions", sow.revision_history.len().to_string()),
        ("Comments", sow.approval_history.len().to_string()),
    ];
    output::print_item(&pairs, &sow, format);
    Ok(())
}

/// Show the revision history of a SOW.
pub async fn history(
    args: &HistoryArgs,
    collection: Arc<dyn SowCollection>,
    format: OutputFormat,
) -> Result<(), AppError> {
    let store = DocumentStore::with_defaults(collection);
    let sow = store.get(&args.id).await?;
    let revisions = &sow.revision_history;

    let rows: Vec<RevisionRow> = revisions
        .iter()
        .map(|r| RevisionRow {
            version: r.version,
            time: r.timestamp.format(TIME_FORMAT).to_string(),
            changed_by: r.changed_by_name.clone(),
            summary: r.summary.clone(),
        })
        .collect();
    output::print_list(&rows, revisions, format);

    if args.verify {
        let initial = revisions
            .first()
            .map(|r| r.snapshot.clone())
            .unwrap_or_else(|| sow.snapshot());
        let states = store.revisions().replay(&initial, revisions)?;
        if states.last() != Some(&sow.tracked_state()) {
            return Err(AppError::internal(format!(
                "Replayed history of SOW {} does not reach its current state",
                sow.id
            )));
        }
        output::print_success(&format!("Replayed {} revision(s) cleanly", revisions.len()));
    }
    Ok(())
}

/// Show the latest revisions across SOWs.
pub async fn recent(
    args: &RecentArgs,
    collection: Arc<dyn SowCollection>,
    format: OutputFormat,
) -> Result<(), AppError> {
    let owner = super::parse_user(args.client.as_deref())?;
    let store = DocumentStore::with_defaults(collection);
    let changes = store.recent_changes(owner, args.limit).await?;

    let rows: Vec<RecentRow> = changes.iter().map(RecentRow::from).collect();
    output::print_list(&rows, &changes, format);
    Ok(())
}
