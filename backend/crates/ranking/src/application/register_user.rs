//! Register User Use Case

use std::sync::Arc;

use crate::domain::entity::{ProfileUpdate, User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{PersonName, UserName};
use crate::error::{RankingError, RankingResult};

#[derive(Debug, Clone, Default)]
pub struct RegisterUserInput {
    pub user_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

pub struct RegisterUserUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> RegisterUserUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    pub async fn execute(&self, input: RegisterUserInput) -> RankingResult<User> {
        let user_name = UserName::new(&input.user_name)?;
        let profile = ProfileUpdate {
            first_name: PersonName::optional(input.first_name.as_deref())?,
            last_name: PersonName::optional(input.last_name.as_deref())?,
        };

        if self.user_repo.exists_by_user_name(&user_name).await? {
            return Err(RankingError::UserNameTaken);
        }

        let user = User::new(user_name).with_profile(profile);
        self.user_repo.create(&user).await?;

        tracing::info!(
            user_id = %user.user_id,
            user_name = %user.user_name,
            "User registered"
        );

        Ok(user)
    }
}
