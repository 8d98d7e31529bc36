//! Dashboard statistics over SOW documents.

use std::sync::Arc;

use futures::TryStreamExt;
use serde::{Deserialize, Serialize};

use sowgen_core::result::AppResult;
use sowgen_core::traits::Service;
use sowgen_core::types::UserId;
use sowgen_database::{SowCollection, SowQuery};
use sowgen_entity::sow::{Sow, SowStatus};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Counts per status plus approval metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SowStats {
    /// Number of documents considered.
    pub total: u64,
    /// Documents in `draft`.
    pub draft: u64,
    /// Documents in `pending`.
    pub pending: u64,
    /// Documents in `approved`.
    pub approved: u64,
    /// Documents in `rejected`.
    pub rejected: u64,
    /// Documents in `changes-requested`.
    pub changes_requested: u64,
    /// Approved share of all documents, as a whole percentage.
    pub approval_rate: u32,
    /// Mean days from submission to approval, one decimal.
    pub avg_approval_time_days: f64,
}

impl SowStats {
    /// Fold a set of documents into statistics.
    pub fn from_documents<'a>(sows: impl IntoIterator<Item = &'a Sow>) -> Self {
        let mut stats = Self::default();
        let mut approval_days = Vec::new();

        for sow in sows {
            stats.total += 1;
            match sow.status {
                SowStatus::Draft => stats.draft += 1,
                SowStatus::Pending => stats.pending += 1,
                SowStatus::Approved => stats.approved += 1,
                SowStatus::Rejected => stats.rejected += 1,
                SowStatus::ChangesRequested => stats.changes_requested += 1,
            }
            if sow.status == SowStatus::Approved {
                if let (Some(submitted), Some(approved)) = (sow.submitted_at, sow.approved_at) {
                    let seconds = (approved - submitted).num_milliseconds() as f64 / 1000.0;
                    approval_days.push(seconds / SECONDS_PER_DAY);
                }
            }
        }

        if stats.total > 0 {
            stats.approval_rate =
                (stats.approved as f64 / stats.total as f64 * 100.0).round() as u32;
        }
        if !approval_days.is_empty() {
            let mean = approval_days.iter().sum::<f64>() / approval_days.len() as f64;
            stats.avg_approval_time_days = (mean * 10.0).round() / 10.0;
        }
        stats
    }
}

/// Computes [`SowStats`] from the collection.
#[derive(Clone)]
pub struct StatsService {
    collection: Arc<dyn SowCollection>,
}

impl std::fmt::Debug for StatsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsService").finish()
    }
}

impl Service for StatsService {}

impl StatsService {
    /// Creates a new statistics service.
    pub fn new(collection: Arc<dyn SowCollection>) -> Self {
        Self { collection }
    }

    /// Statistics over every document, or only those owned by `owner`.
    pub async fn compute(&self, owner: Option<UserId>) -> AppResult<SowStats> {
        let sows: Vec<Sow> = self
            .collection
            .find(SowQuery {
                client_id: owner,
                status: None,
            })
            .try_collect()
            .await?;
        Ok(SowStats::from_documents(&sows))
    }
}
