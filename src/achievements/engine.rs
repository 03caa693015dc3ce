use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::Role;
use crate::stats::counters::ActivityCounters;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
}

impl Tier {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bronze" => Some(Tier::Bronze),
            "silver" => Some(Tier::Silver),
            "gold" => Some(Tier::Gold),
            "platinum" => Some(Tier::Platinum),
            "diamond" => Some(Tier::Diamond),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Donation,
    Delivery,
    Streak,
    Impact,
    Special,
}

impl Category {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "donation" => Some(Category::Donation),
            "delivery" => Some(Category::Delivery),
            "streak" => Some(Category::Streak),
            "impact" => Some(Category::Impact),
            "special" => Some(Category::Special),
            _ => None,
        }
    }
}

/// Whether a definition's role string (donor | volunteer | both) covers the
/// actor's role.
pub fn applies_to(definition_role: &str, role: Role) -> bool {
    match definition_role {
        "both" => true,
        "donor" => role == Role::Donor,
        "volunteer" => role == Role::Volunteer,
        _ => false,
    }
}

/// Threshold derived from points_required with fixed per-category divisors.
/// Product constants, not configurable.
pub fn target_value(category: Category, points_required: i64) -> i64 {
    match category {
        Category::Donation | Category::Delivery => points_required / 10,
        Category::Impact => points_required / 2,
        Category::Streak | Category::Special => points_required,
    }
}

pub fn current_value(category: Category, counters: &ActivityCounters) -> i64 {
    match category {
        Category::Donation => counters.donations_completed,
        Category::Delivery => counters.deliveries_completed,
        Category::Streak => counters.current_streak,
        Category::Impact => counters.lives_impacted,
        Category::Special => counters.total_points,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub unlocked: bool,
    pub unlocked_at: Option<OffsetDateTime>,
    pub progress: i64,
    pub current_value: i64,
    pub target_value: i64,
}

/// Evaluates one definition against current counters. An existing unlock is
/// final: progress stays pinned at 100 whatever the counters say now.
pub fn evaluate(
    category: Category,
    points_required: i64,
    counters: &ActivityCounters,
    unlocked_at: Option<OffsetDateTime>,
) -> Evaluation {
    let target = target_value(category, points_required);
    let current = current_value(category, counters);

    if let Some(at) = unlocked_at {
        return Evaluation {
            unlocked: true,
            unlocked_at: Some(at),
            progress: 100,
            current_value: current,
            target_value: target,
        };
    }

    // target 0 would divide by zero; report no progress instead
    let progress = if target <= 0 {
        0
    } else {
        (current * 100 / target).clamp(0, 100)
    };

    Evaluation {
        unlocked: current >= target,
        unlocked_at: None,
        progress,
        current_value: current,
        target_value: target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counters(donations: i64, deliveries: i64, streak: i64) -> ActivityCounters {
        crate::stats::counters::compute(
            &vec!["5".to_string(); donations as usize],
            deliveries,
            streak,
        )
    }

    #[test]
    fn tiers_are_ordered() {
        assert!(Tier::Bronze < Tier::Silver);
        assert!(Tier::Silver < Tier::Gold);
        assert!(Tier::Gold < Tier::Platinum);
        assert!(Tier::Platinum < Tier::Diamond);
    }

    #[test]
    fn target_divisors_per_category() {
        assert_eq!(target_value(Category::Donation, 50), 5);
        assert_eq!(target_value(Category::Delivery, 100), 10);
        assert_eq!(target_value(Category::Impact, 50), 25);
        assert_eq!(target_value(Category::Streak, 7), 7);
        assert_eq!(target_value(Category::Special, 100), 100);
    }

    #[test]
    fn progress_is_capped_at_100() {
        let c = counters(20, 0, 0);
        let e = evaluate(Category::Donation, 50, &c, None);
        assert_eq!(e.target_value, 5);
        assert_eq!(e.current_value, 20);
        assert_eq!(e.progress, 100);
        assert!(e.unlocked);
    }

    #[test]
    fn partial_progress_rounds_down() {
        let c = counters(3, 0, 0);
        let e = evaluate(Category::Donation, 100, &c, None);
        assert_eq!(e.target_value, 10);
        assert_eq!(e.progress, 30);
        assert!(!e.unlocked);
    }

    #[test]
    fn zero_target_reports_zero_progress() {
        let c = counters(3, 0, 0);
        let e = evaluate(Category::Donation, 0, &c, None);
        assert_eq!(e.target_value, 0);
        assert_eq!(e.progress, 0);
    }

    #[test]
    fn existing_unlock_pins_progress_at_100() {
        let at = OffsetDateTime::now_utc();
        // counters hypothetically below threshold again
        let c = counters(1, 0, 0);
        let e = evaluate(Category::Donation, 100, &c, Some(at));
        assert!(e.unlocked);
        assert_eq!(e.progress, 100);
        assert_eq!(e.unlocked_at, Some(at));
    }

    #[test]
    fn progress_is_monotonic_in_counters() {
        let mut last = 0;
        for donations in 0..=12 {
            let e = evaluate(Category::Donation, 100, &counters(donations, 0, 0), None);
            assert!(e.progress >= last);
            last = e.progress;
        }
        assert_eq!(last, 100);
    }

    #[test]
    fn special_category_uses_total_points() {
        // 4 donations * 10 + 4 deliveries * 15 = 100
        let c = counters(4, 4, 0);
        let e = evaluate(Category::Special, 100, &c, None);
        assert_eq!(e.current_value, 100);
        assert!(e.unlocked);
    }

    #[test]
    fn streak_category_uses_day_counts_unscaled() {
        let c = counters(0, 0, 7);
        let e = evaluate(Category::Streak, 7, &c, None);
        assert_eq!(e.target_value, 7);
        assert!(e.unlocked);
    }

    #[test]
    fn role_applicability() {
        assert!(applies_to("both", Role::Donor));
        assert!(applies_to("both", Role::Volunteer));
        assert!(applies_to("donor", Role::Donor));
        assert!(!applies_to("donor", Role::Volunteer));
        assert!(applies_to("volunteer", Role::Volunteer));
        assert!(!applies_to("volunteer", Role::Donor));
        assert!(!applies_to("admin", Role::Donor));
    }
}
