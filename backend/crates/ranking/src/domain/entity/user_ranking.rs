//! Ranking Snapshot Entity
//!
//! Rows are written in batches by a period recompute and never updated.

use chrono::{DateTime, Utc};
use kernel::id::{RankingBatchId, UserId};
use serde::Serialize;

use crate::domain::value_object::Period;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRanking {
    /// Shared by every row written by the same recompute
    pub batch_id: RankingBatchId,
    pub user_id: UserId,
    /// 1-based
    pub position: u32,
    pub experience: u64,
    pub period: Period,
    pub period_start: DateTime<Utc>,
    /// Exclusive
    pub period_end: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
