// src/models/badge.rs

use serde::Serialize;
use utoipa::ToSchema;

/// A badge tier and the total points needed to reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeTier {
    pub name: &'static str,
    pub threshold: i32,
}

/// Ascending by threshold.
pub const BADGE_TIERS: [BadgeTier; 6] = [
    BadgeTier { name: "Newbie", threshold: 20 },
    BadgeTier { name: "Explorer", threshold: 40 },
    BadgeTier { name: "Achiever", threshold: 60 },
    BadgeTier { name: "Specialist", threshold: 80 },
    BadgeTier { name: "Expert", threshold: 100 },
    BadgeTier { name: "Master", threshold: 120 },
];

/// Badge state derived from a user's total points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BadgeProgress {
    pub current: Option<String>,
    pub next: Option<String>,
    pub points_to_next: i32,
    /// 0-100; 100 once the last tier is reached.
    pub progress_percent: i32,
}

/// Highest tier reached with `points`, if any.
pub fn badge_for(points: i32) -> Option<BadgeTier> {
    BADGE_TIERS.iter().rev().find(|t| points >= t.threshold).copied()
}

pub fn badge_progress(points: i32) -> BadgeProgress {
    let points = points.max(0);
    let current = badge_for(points);
    let next = BADGE_TIERS.iter().find(|t| points < t.threshold).copied();

    match next {
        None => BadgeProgress {
            current: current.map(|t| t.name.to_string()),
            next: None,
            points_to_next: 0,
            progress_percent: 100,
        },
        Some(next) => {
            let floor = current.map(|t| t.threshold).unwrap_or(0);
            let span = next.threshold - floor;
            let progress_percent = (points - floor) * 100 / span;
            BadgeProgress {
                current: current.map(|t| t.name.to_string()),
                next: Some(next.name.to_string()),
                points_to_next: next.threshold - points,
                progress_percent,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_badge_below_first_tier() {
        let p = badge_progress(10);
        assert_eq!(p.current, None);
        assert_eq!(p.next.as_deref(), Some("Newbie"));
        assert_eq!(p.points_to_next, 10);
        assert_eq!(p.progress_percent, 50);
    }

    #[test]
    fn test_exact_threshold_reaches_tier() {
        assert_eq!(badge_for(40).map(|t| t.name), Some("Explorer"));
        let p = badge_progress(40);
        assert_eq!(p.current.as_deref(), Some("Explorer"));
        assert_eq!(p.next.as_deref(), Some("Achiever"));
        assert_eq!(p.progress_percent, 0);
    }

    #[test]
    fn test_progress_between_tiers() {
        let p = badge_progress(75);
        assert_eq!(p.current.as_deref(), Some("Achiever"));
        assert_eq!(p.next.as_deref(), Some("Specialist"));
        assert_eq!(p.points_to_next, 5);
        assert_eq!(p.progress_percent, 75);
    }

    #[test]
    fn test_master_is_capped() {
        let p = badge_progress(500);
        assert_eq!(p.current.as_deref(), Some("Master"));
        assert_eq!(p.next, None);
        assert_eq!(p.progress_percent, 100);
    }

    #[test]
    fn test_tiers_are_ascending() {
        assert!(BADGE_TIERS.windows(2).all(|w| w[0].threshold < w[1].threshold));
    }
}
