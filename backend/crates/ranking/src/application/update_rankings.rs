//! Update Rankings Use Case
//!
//! Appends a full-population snapshot batch for one period. Every call writes
//! a new batch; repeated calls within a period only add redundant rows.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::RankingBatchId;
use serde::Serialize;

use crate::application::config::RankingConfig;
use crate::domain::repository::{UserRankingRepository, UserRepository};
use crate::domain::services;
use crate::domain::value_object::Period;
use crate::error::{RankingError, RankingResult};

/// Summary of a written batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingUpdate {
    pub batch_id: RankingBatchId,
    pub period: Period,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub users_ranked: usize,
}

pub struct UpdateRankingsUseCase<U, K>
where
    U: UserRepository,
    K: UserRankingRepository,
{
    user_repo: Arc<U>,
    ranking_repo: Arc<K>,
    config: Arc<RankingConfig>,
}

impl<U, K> UpdateRankingsUseCase<U, K>
where
    U: UserRepository,
    K: UserRankingRepository,
{
    pub fn new(user_repo: Arc<U>, ranking_repo: Arc<K>, config: Arc<RankingConfig>) -> Self {
        Self {
            user_repo,
            ranking_repo,
            config,
        }
    }

    pub async fn execute(&self, period: Period) -> RankingResult<RankingUpdate> {
        let now = self.config.now();
        let bounds = period
            .bounds(now)
            .ok_or_else(|| RankingError::Internal(format!("{period} boundary out of range")))?;

        // One extra row tells a population at the cap from one beyond it
        let cap = self.config.snapshot_cap;
        let mut users = self
            .user_repo
            .top_by_experience(cap.saturating_add(1))
            .await?;
        if users.len() > cap as usize {
            users.truncate(cap as usize);
            tracing::warn!(cap, "Ranking snapshot truncated at cap");
        }

        let batch_id = RankingBatchId::new();
        let batch = services::build_snapshot(users, period, bounds, batch_id, now.to_utc());

        if !batch.is_empty() {
            self.ranking_repo.save_batch(&batch).await?;
        }

        tracing::info!(
            batch_id = %batch_id,
            period = %period,
            period_start = %bounds.start,
            period_end = %bounds.end,
            users = batch.len(),
            "Saved ranking snapshot"
        );

        Ok(RankingUpdate {
            batch_id,
            period,
            period_start: bounds.start,
            period_end: bounds.end,
            users_ranked: batch.len(),
        })
    }
}
