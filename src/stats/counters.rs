use serde::Serialize;
use time::Date;

pub const POINTS_PER_DONATION: i64 = 10;
pub const POINTS_PER_DELIVERY: i64 = 15;
/// One person fed per 5 units of donated quantity.
pub const QUANTITY_PER_LIFE: f64 = 5.0;

/// Derived activity metrics. Never persisted; always recomputed from the
/// donations table, so there is no second source of truth to drift.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityCounters {
    pub donations_completed: i64,
    pub deliveries_completed: i64,
    pub total_quantity: f64,
    pub total_points: i64,
    pub lives_impacted: i64,
    pub current_streak: i64,
}

/// Leading-numeric parse of a free-form quantity string: "12" -> 12,
/// "3.5 kg" -> 3.5, "approx 4 boxes" -> 0. Never fails.
pub fn parse_quantity(raw: &str) -> f64 {
    let s = raw.trim();
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        if c.is_ascii_digit() {
            end = i + 1;
        } else if c == '.' && !seen_dot {
            seen_dot = true;
            end = i + 1;
        } else {
            break;
        }
    }
    s[..end].parse::<f64>().unwrap_or(0.0)
}

/// Pure aggregation over the user's donation rows. Donations count on
/// creation, regardless of status; deliveries count only when delivered.
pub fn compute(
    donation_quantities: &[String],
    deliveries_completed: i64,
    current_streak: i64,
) -> ActivityCounters {
    let donations_completed = donation_quantities.len() as i64;
    let total_quantity: f64 = donation_quantities.iter().map(|q| parse_quantity(q)).sum();
    let total_points =
        donations_completed * POINTS_PER_DONATION + deliveries_completed * POINTS_PER_DELIVERY;
    let lives_impacted = if donations_completed == 0 {
        0
    } else {
        ((total_quantity / QUANTITY_PER_LIFE).floor() as i64).max(1)
    };
    ActivityCounters {
        donations_completed,
        deliveries_completed,
        total_quantity,
        total_points,
        lives_impacted,
        current_streak,
    }
}

/// Consecutive-day streak over the distinct calendar days the user was
/// active, ending today or yesterday (activity later today keeps an unbroken
/// streak alive).
pub fn current_streak(today: Date, days: &[Date]) -> i64 {
    let mut sorted: Vec<Date> = days.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut cursor = if sorted.binary_search(&today).is_ok() {
        today
    } else {
        match today.previous_day() {
            Some(yesterday) if sorted.binary_search(&yesterday).is_ok() => yesterday,
            _ => return 0,
        }
    };

    let mut streak = 1;
    while let Some(prev) = cursor.previous_day() {
        if sorted.binary_search(&prev).is_err() {
            break;
        }
        cursor = prev;
        streak += 1;
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn quantities(qs: &[&str]) -> Vec<String> {
        qs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_quantity_handles_plain_numbers() {
        assert_eq!(parse_quantity("12"), 12.0);
        assert_eq!(parse_quantity("3.5"), 3.5);
        assert_eq!(parse_quantity(" 7 "), 7.0);
    }

    #[test]
    fn parse_quantity_takes_leading_numeric_prefix() {
        assert_eq!(parse_quantity("3.5 kg"), 3.5);
        assert_eq!(parse_quantity("12 boxes"), 12.0);
    }

    #[test]
    fn parse_quantity_non_numeric_is_zero() {
        assert_eq!(parse_quantity("approx 4 boxes"), 0.0);
        assert_eq!(parse_quantity(""), 0.0);
        assert_eq!(parse_quantity("a lot"), 0.0);
    }

    #[test]
    fn points_use_fixed_weights() {
        let c = compute(&quantities(&["5", "5", "5"]), 2, 0);
        assert_eq!(c.donations_completed, 3);
        assert_eq!(c.deliveries_completed, 2);
        assert_eq!(c.total_points, 3 * 10 + 2 * 15);
    }

    #[test]
    fn lives_impacted_floors_at_five_units_per_person() {
        // 12 units -> 2 people
        let c = compute(&quantities(&["12"]), 0, 0);
        assert_eq!(c.lives_impacted, 2);
        // 3 units -> below one ration, but a donation exists
        let c = compute(&quantities(&["3"]), 0, 0);
        assert_eq!(c.lives_impacted, 1);
        // no donations at all
        let c = compute(&[], 0, 0);
        assert_eq!(c.lives_impacted, 0);
        assert_eq!(c.total_quantity, 0.0);
    }

    #[test]
    fn non_numeric_quantities_count_as_donations_but_not_quantity() {
        let c = compute(&quantities(&["a trayful", "10"]), 0, 0);
        assert_eq!(c.donations_completed, 2);
        assert_eq!(c.total_quantity, 10.0);
        assert_eq!(c.lives_impacted, 2);
    }

    #[test]
    fn compute_is_deterministic() {
        let qs = quantities(&["5", "3.5 kg", "nope"]);
        assert_eq!(compute(&qs, 4, 2), compute(&qs, 4, 2));
    }

    #[test]
    fn streak_counts_consecutive_days_ending_today() {
        let today = date!(2026 - 08 - 30);
        let days = [
            date!(2026 - 08 - 28),
            date!(2026 - 08 - 29),
            date!(2026 - 08 - 30),
        ];
        assert_eq!(current_streak(today, &days), 3);
    }

    #[test]
    fn streak_survives_until_end_of_today() {
        // active yesterday but not yet today
        let today = date!(2026 - 08 - 30);
        let days = [date!(2026 - 08 - 28), date!(2026 - 08 - 29)];
        assert_eq!(current_streak(today, &days), 2);
    }

    #[test]
    fn streak_breaks_on_a_gap() {
        let today = date!(2026 - 08 - 30);
        let days = [date!(2026 - 08 - 26), date!(2026 - 08 - 30)];
        assert_eq!(current_streak(today, &days), 1);
        assert_eq!(current_streak(today, &[date!(2026 - 08 - 26)]), 0);
        assert_eq!(current_streak(today, &[]), 0);
    }

    #[test]
    fn streak_ignores_duplicate_days() {
        let today = date!(2026 - 08 - 30);
        let days = [
            date!(2026 - 08 - 30),
            date!(2026 - 08 - 30),
            date!(2026 - 08 - 29),
        ];
        assert_eq!(current_streak(today, &days), 2);
    }
}
