//! User Entity
//!
//! Identity plus the cumulative experience counter the global leaderboard is
//! ranked by.

use chrono::{DateTime, Utc};
use kernel::id::UserId;

use crate::domain::entity::UserStats;
use crate::domain::value_object::{PersonName, UserName};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: UserId,
    /// Unique, validated display name
    pub user_name: UserName,
    pub first_name: Option<PersonName>,
    pub last_name: Option<PersonName>,
    /// Never decreases; mutated only through lesson completions
    pub experience: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a freshly registered user with zero experience
    pub fn new(user_name: UserName) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            user_name,
            first_name: None,
            last_name: None,
            experience: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_profile(mut self, profile: ProfileUpdate) -> Self {
        self.apply_profile(&profile);
        self
    }

    /// Overwrite the given name parts; absent parts stay as they are
    pub fn apply_profile(&mut self, profile: &ProfileUpdate) {
        if let Some(first_name) = &profile.first_name {
            self.first_name = Some(first_name.clone());
        }
        if let Some(last_name) = &profile.last_name {
            self.last_name = Some(last_name.clone());
        }
    }

    /// Experience after earning `earned`, or `None` if the counter would overflow
    pub fn experience_after(&self, earned: u64) -> Option<u64> {
        self.experience.checked_add(earned)
    }
}

/// Name parts to set on a user; `None` leaves the stored value alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub first_name: Option<PersonName>,
    pub last_name: Option<PersonName>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none()
    }
}

/// A user together with statistics over their lesson results
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub user: User,
    pub stats: UserStats,
}
