//! User Profile Use Cases
//!
//! Public profile lookup by user name and edits to the optional name parts.

use std::sync::Arc;

use kernel::id::UserId;

use crate::domain::entity::{ProfileUpdate, User, UserProfile, UserStats};
use crate::domain::repository::{LessonResultRepository, UserRepository};
use crate::domain::value_object::{PersonName, UserName};
use crate::error::{RankingError, RankingResult};

/// Profile plus result statistics, looked up by user name
pub struct UserProfileUseCase<U, S>
where
    U: UserRepository,
    S: LessonResultRepository,
{
    user_repo: Arc<U>,
    result_repo: Arc<S>,
}

impl<U, S> UserProfileUseCase<U, S>
where
    U: UserRepository,
    S: LessonResultRepository,
{
    pub fn new(user_repo: Arc<U>, result_repo: Arc<S>) -> Self {
        Self {
            user_repo,
            result_repo,
        }
    }

    /// Lookup is case-insensitive, like registration
    pub async fn execute(&self, user_name: &str) -> RankingResult<UserProfile> {
        let user_name = UserName::new(user_name)?;

        let user = self
            .user_repo
            .find_by_user_name(&user_name)
            .await?
            .ok_or(RankingError::UserNotFound)?;

        let summary = self.result_repo.stats_for_user(&user.user_id).await?;

        Ok(UserProfile {
            user,
            stats: UserStats::from(summary),
        })
    }
}

pub struct UpdateProfileUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> UpdateProfileUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    /// Blank or missing parts are left unchanged
    pub async fn execute(
        &self,
        user_id: UserId,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> RankingResult<User> {
        let profile = ProfileUpdate {
            first_name: PersonName::optional(first_name)?,
            last_name: PersonName::optional(last_name)?,
        };

        if profile.is_empty() {
            return self
                .user_repo
                .find_by_id(&user_id)
                .await?
                .ok_or(RankingError::UserNotFound);
        }

        let user = self.user_repo.update_profile(&user_id, &profile).await?;
        tracing::info!(user_id = %user_id, "User profile updated");

        Ok(user)
    }
}
