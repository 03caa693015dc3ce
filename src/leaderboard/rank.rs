use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub user_id: Uuid,
    pub name: Option<String>,
    pub count: i64,
}

/// Deterministic ranking: count descending, ties broken by ascending user id,
/// zero-activity users dropped, truncated to n. Repeated calls over unchanged
/// data return identical output.
pub fn rank(mut rows: Vec<(Uuid, Option<String>, i64)>, n: usize) -> Vec<LeaderboardEntry> {
    rows.retain(|(_, _, count)| *count > 0);
    rows.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));
    rows.truncate(n);
    rows.into_iter()
        .enumerate()
        .map(|(i, (user_id, name, count))| LeaderboardEntry {
            rank: i as i64 + 1,
            user_id,
            name,
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uuid(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn orders_by_count_descending() {
        let rows = vec![
            (uuid(1), None, 2),
            (uuid(2), None, 7),
            (uuid(3), None, 4),
        ];
        let ranked = rank(rows, 3);
        assert_eq!(
            ranked.iter().map(|e| e.count).collect::<Vec<_>>(),
            vec![7, 4, 2]
        );
        assert_eq!(
            ranked.iter().map(|e| e.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn ties_break_by_ascending_user_id() {
        let rows = vec![
            (uuid(9), None, 5),
            (uuid(1), None, 5),
            (uuid(4), None, 5),
        ];
        let ranked = rank(rows, 3);
        assert_eq!(
            ranked.iter().map(|e| e.user_id).collect::<Vec<_>>(),
            vec![uuid(1), uuid(4), uuid(9)]
        );
    }

    #[test]
    fn zero_activity_users_are_excluded() {
        let rows = vec![(uuid(1), None, 0), (uuid(2), None, 3)];
        let ranked = rank(rows, 10);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].user_id, uuid(2));
    }

    #[test]
    fn truncates_to_n() {
        let rows = (1..=10u128).map(|i| (uuid(i), None, i as i64)).collect();
        let ranked = rank(rows, 3);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].count, 10);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let rows: Vec<_> = vec![
            (uuid(3), Some("c".to_string()), 5),
            (uuid(1), Some("a".to_string()), 5),
            (uuid(2), Some("b".to_string()), 8),
        ];
        assert_eq!(rank(rows.clone(), 3), rank(rows, 3));
    }
}
