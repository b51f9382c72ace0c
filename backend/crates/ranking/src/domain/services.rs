//! Domain Services
//!
//! Pure ranking rules: ordering, positions, windows, trends and snapshots.
//! Nothing here touches a store.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use kernel::id::{RankingBatchId, UserId};

use crate::domain::entity::{Lesson, LessonLevel, LeaderboardEntry, User, UserRanking};
use crate::domain::value_object::{LessonMode, Period, PeriodBounds, Trend};

/// Positions are u32; anything past that saturates
#[inline]
fn position_at(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}

/// Experience descending, then id ascending
pub fn sort_by_experience(users: &mut [User]) {
    users.sort_by(|a, b| {
        b.experience
            .cmp(&a.experience)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
}

/// Global leaderboard rows with trend against a previous snapshot batch
pub fn rank_global(mut users: Vec<User>, previous: &[UserRanking]) -> Vec<LeaderboardEntry> {
    sort_by_experience(&mut users);

    let previous: HashMap<UserId, u32> = previous
        .iter()
        .map(|ranking| (ranking.user_id, ranking.position))
        .collect();

    users
        .into_iter()
        .enumerate()
        .map(|(index, user)| {
            let position = position_at(index);
            LeaderboardEntry {
                user_id: user.user_id,
                user_name: user.user_name.to_string(),
                first_name: user.first_name.map(|n| n.to_string()),
                last_name: user.last_name.map(|n| n.to_string()),
                position,
                experience: user.experience,
                trend: Trend::between(previous.get(&user.user_id).copied(), position),
            }
        })
        .collect()
}

/// 1-based ordinal where a lesson window of `2*limit+1` rows starts.
///
/// `ordinal` is the user's 1-based place in the total order of the lesson's
/// results. The window is centered on it where possible and slides back
/// from the tail, so it always holds `min(total, 2*limit+1)` rows including
/// the user's own.
pub fn window_start(ordinal: u64, total: u64, limit: u32) -> u64 {
    let half = u64::from(limit);
    let centered = ordinal.saturating_sub(half);
    let tail_anchor = total.saturating_sub(half.saturating_mul(2));
    centered.min(tail_anchor).max(1)
}

/// Competition-rank positions for a window of scores sorted ascending.
///
/// `first_position` is the rank of the first row (results strictly better
/// than it, plus one). Equal scores share a position; otherwise a row's
/// position is its ordinal.
pub fn window_positions(first_position: u32, window_start: u64, scores: &[u64]) -> Vec<u32> {
    let mut positions: Vec<u32> = Vec::with_capacity(scores.len());

    for (index, score) in scores.iter().enumerate() {
        let position = match (index, positions.last()) {
            (0, _) | (_, None) => first_position,
            (_, Some(&prev)) if scores[index - 1] == *score => prev,
            _ => u32::try_from(window_start + index as u64).unwrap_or(u32::MAX),
        };
        positions.push(position);
    }

    positions
}

/// One snapshot row per user, positions 1..N in leaderboard order
pub fn build_snapshot(
    mut users: Vec<User>,
    period: Period,
    bounds: PeriodBounds,
    batch_id: RankingBatchId,
    created_at: DateTime<Utc>,
) -> Vec<UserRanking> {
    sort_by_experience(&mut users);

    users
        .into_iter()
        .enumerate()
        .map(|(index, user)| UserRanking {
            batch_id,
            user_id: user.user_id,
            position: position_at(index),
            experience: user.experience,
            period,
            period_start: bounds.start,
            period_end: bounds.end,
            created_at,
        })
        .collect()
}

/// Group lessons of one type into levels, each with an easy and a hard id.
///
/// Levels missing either mode are left out.
pub fn group_levels(lessons: &[Lesson]) -> Vec<LessonLevel> {
    let mut by_level: BTreeMap<u32, (Option<&Lesson>, Option<&Lesson>)> = BTreeMap::new();

    for lesson in lessons {
        let slot = by_level.entry(lesson.level).or_default();
        match lesson.mode {
            LessonMode::Easy => slot.0 = Some(lesson),
            LessonMode::Hard => slot.1 = Some(lesson),
        }
    }

    by_level
        .into_iter()
        .filter_map(|(level, modes)| match modes {
            (Some(easy), Some(hard)) => Some(LessonLevel {
                level,
                easy_id: easy.lesson_id,
                hard_id: hard.lesson_id,
            }),
            (easy, hard) => {
                tracing::warn!(
                    level,
                    has_easy = easy.is_some(),
                    has_hard = hard.is_some(),
                    "Skipping incomplete lesson level"
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::UserName;
    use chrono::TimeZone;

    fn user(name: &str, experience: u64) -> User {
        let mut user = User::new(UserName::new(name).unwrap());
        user.experience = experience;
        user
    }

    #[test]
    fn test_rank_global_orders_and_breaks_ties_by_id() {
        let a = user("alice", 500);
        let b = user("bob", 300);
        let c = user("carol", 300);
        assert!(b.user_id < c.user_id);

        let entries = rank_global(vec![c.clone(), a.clone(), b.clone()], &[]);

        let order: Vec<_> = entries.iter().map(|e| (e.user_id, e.position)).collect();
        assert_eq!(order, vec![(a.user_id, 1), (b.user_id, 2), (c.user_id, 3)]);
        assert!(entries.iter().all(|e| e.trend == Trend::Stable));
    }

    #[test]
    fn test_rank_global_trend() {
        let a = user("alice", 500);
        let b = user("bob", 300);
        let c = user("carol", 100);
        let bounds = PeriodBounds {
            start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap(),
        };

        // Last week: bob, carol, alice
        let mut last_week = build_snapshot(
            vec![a.clone(), b.clone(), c.clone()],
            Period::Weekly,
            bounds,
            RankingBatchId::new(),
            bounds.end,
        );
        for row in &mut last_week {
            row.position = match row.user_id {
                id if id == b.user_id => 1,
                id if id == c.user_id => 2,
                _ => 3,
            };
        }

        let entries = rank_global(vec![a, b, c], &last_week);
        let trends: Vec<_> = entries.iter().map(|e| e.trend).collect();
        assert_eq!(trends, vec![Trend::Up, Trend::Down, Trend::Down]);
    }

    #[test]
    fn test_window_start() {
        // five results, limit 1
        assert_eq!(window_start(1, 5, 1), 1);
        assert_eq!(window_start(3, 5, 1), 2);
        assert_eq!(window_start(5, 5, 1), 3);
        // fewer results than the window
        assert_eq!(window_start(2, 2, 1), 1);
        assert_eq!(window_start(1, 1, 0), 1);
    }

    #[test]
    fn test_window_always_full_and_contains_user() {
        for total in 1..=12u64 {
            for limit in 0..=4u32 {
                for ordinal in 1..=total {
                    let start = window_start(ordinal, total, limit);
                    let size = (2 * u64::from(limit) + 1).min(total);
                    let end = start + size - 1;
                    assert!(end <= total, "total={total} limit={limit} ordinal={ordinal}");
                    assert!(start <= ordinal && ordinal <= end);
                }
            }
        }
    }

    #[test]
    fn test_window_positions_untied() {
        assert_eq!(window_positions(2, 2, &[80, 120, 200]), vec![2, 3, 4]);
    }

    #[test]
    fn test_window_positions_with_ties() {
        // Window starts at ordinal 3, but its first score ties with ordinal 2
        assert_eq!(window_positions(2, 3, &[50, 50, 70, 70, 90]), vec![2, 2, 5, 5, 7]);
    }

    #[test]
    fn test_build_snapshot() {
        let bounds = PeriodBounds {
            start: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap(),
        };
        let batch_id = RankingBatchId::new();
        let rows = build_snapshot(
            vec![user("bob", 10), user("alice", 30)],
            Period::Monthly,
            bounds,
            batch_id,
            Utc::now(),
        );

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].experience, 30);
        assert_eq!(rows[0].position, 1);
        assert_eq!(rows[1].position, 2);
        assert!(rows.iter().all(|r| r.batch_id == batch_id && r.period == Period::Monthly));
    }

    #[test]
    fn test_group_levels_skips_incomplete() {
        let content = serde_json::json!({});
        let lessons = vec![
            Lesson::new("kana", 2, LessonMode::Hard, 20, content.clone()),
            Lesson::new("kana", 1, LessonMode::Easy, 10, content.clone()),
            Lesson::new("kana", 1, LessonMode::Hard, 20, content.clone()),
            Lesson::new("kana", 3, LessonMode::Easy, 10, content),
        ];

        let levels = group_levels(&lessons);

        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].level, 1);
        assert_eq!(levels[0].easy_id, lessons[1].lesson_id);
        assert_eq!(levels[0].hard_id, lessons[2].lesson_id);
    }
}
