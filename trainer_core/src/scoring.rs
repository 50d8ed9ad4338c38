//! Point scoring.
//!
//! Rules:
//! - +2 per correct rep, -1 per wrong rep
//! - +2 per second held
//! - The plan ceiling is every target hit once at 2 points per unit, times 4

use crate::types::*;

pub const POINTS_PER_CORRECT_REP: i64 = 2;
pub const PENALTY_PER_WRONG_REP: i64 = 1;
pub const POINTS_PER_SECOND: i64 = 2;
pub const TARGET_POINTS_PER_UNIT: i64 = 2;
pub const MAX_POINTS_MULTIPLIER: i64 = 4;

/// Cumulative score for a session history. Can be negative.
///
/// Rep points come from the aggregated buckets; hold time is summed from the
/// records themselves.
pub fn score(totals: &AggregateTotals, records: &[SessionRecord]) -> i64 {
    let rep_points: i64 = totals
        .reps
        .values()
        .map(|r| r.correct as i64 * POINTS_PER_CORRECT_REP - r.wrong as i64 * PENALTY_PER_WRONG_REP)
        .sum();

    let time_points: i64 = records
        .iter()
        .filter(|r| r.duration_seconds > 0)
        .map(|r| i64::from(r.duration_seconds) * POINTS_PER_SECOND)
        .sum();

    rep_points + time_points
}

/// Points required for promotion on a plan
pub fn max_points(plan: &PlanTargets) -> i64 {
    let per_pass: i64 = plan
        .targets
        .iter()
        .map(|t| i64::from(t.target) * TARGET_POINTS_PER_UNIT)
        .sum();
    per_pass * MAX_POINTS_MULTIPLIER
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::catalog::default_catalog;
    use chrono::Utc;

    fn single_target_plan(exercise: Exercise, target: u32) -> PlanTargets {
        PlanTargets {
            id: 1,
            label: "Test".into(),
            targets: vec![PlanTarget { exercise, target }],
        }
    }

    #[test]
    fn test_max_points_single_rep_exercise() {
        assert_eq!(max_points(&single_target_plan(Exercise::PushUp, 15)), 120);
    }

    #[test]
    fn test_max_points_default_plans() {
        let catalog = default_catalog();
        assert_eq!(max_points(catalog.resolve(1).unwrap()), 800);
        assert_eq!(max_points(catalog.resolve(2).unwrap()), 1280);
        assert_eq!(max_points(catalog.resolve(3).unwrap()), 2000);
    }

    #[test]
    fn test_score_mixed_history() {
        let now = Utc::now();
        let records = vec![
            SessionRecord::reps(Exercise::PushUp, 10, 2, now).unwrap(),
            SessionRecord::timed(Exercise::Plank, 30, now).unwrap(),
        ];
        let totals = aggregate(&records);
        // 10*2 - 2 + 30*2
        assert_eq!(score(&totals, &records), 78);
    }

    #[test]
    fn test_score_negative_when_mostly_wrong() {
        let now = Utc::now();
        let records = vec![
            SessionRecord::reps(Exercise::Squat, 2, 9, now).unwrap(),
            SessionRecord::reps(Exercise::Crunches, 0, 4, now).unwrap(),
        ];
        let totals = aggregate(&records);
        assert_eq!(score(&totals, &records), 4 - 9 - 4);
        assert!(score(&totals, &records) < 0);
    }

    #[test]
    fn test_empty_history_scores_zero() {
        assert_eq!(score(&aggregate(&[]), &[]), 0);
    }
}
