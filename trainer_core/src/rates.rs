//! Per-exercise success rates.

use crate::types::*;

/// Success rate for every exercise in the plan, in percent.
///
/// Rep-based: share of correct reps. Time-based: seconds held against the
/// per-session target, over the sessions that were attempted. Exercises
/// without activity report 0. Values above 100 are kept as-is.
pub fn success_rates(totals: &AggregateTotals, plan: &PlanTargets) -> SuccessRates {
    let rates = plan
        .targets
        .iter()
        .map(|target| {
            let rate = match target.exercise.kind() {
                ExerciseKind::RepBased => rep_rate(totals.reps.get(&target.exercise)),
                ExerciseKind::TimeBased => {
                    time_rate(totals.time.get(&target.exercise), target.target)
                }
            };
            (target.exercise, rate)
        })
        .collect();

    SuccessRates(rates)
}

fn rep_rate(bucket: Option<&RepTotals>) -> f64 {
    match bucket {
        Some(r) if r.total > 0 => r.correct as f64 / r.total as f64 * 100.0,
        _ => 0.0,
    }
}

fn time_rate(bucket: Option<&TimeTotals>, target_seconds: u32) -> f64 {
    match bucket {
        Some(t) if target_seconds > 0 && t.session_count > 0 => {
            let expected = f64::from(target_seconds) * t.session_count as f64;
            t.total_seconds as f64 / expected * 100.0
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::catalog::default_catalog;
    use chrono::Utc;

    #[test]
    fn test_rep_rate() {
        let now = Utc::now();
        let records = vec![
            SessionRecord::reps(Exercise::PushUp, 6, 2, now).unwrap(),
            SessionRecord::reps(Exercise::PushUp, 3, 1, now).unwrap(),
        ];
        let rates = success_rates(&aggregate(&records), default_catalog().resolve(1).unwrap());
        assert_eq!(rates.get(Exercise::PushUp), Some(75.0));
    }

    #[test]
    fn test_time_rate_uses_target_per_session() {
        let now = Utc::now();
        // Beginner plank target is 20 seconds
        let records = vec![
            SessionRecord::timed(Exercise::Plank, 20, now).unwrap(),
            SessionRecord::timed(Exercise::Plank, 10, now).unwrap(),
        ];
        let rates = success_rates(&aggregate(&records), default_catalog().resolve(1).unwrap());
        assert_eq!(rates.get(Exercise::Plank), Some(75.0));
    }

    #[test]
    fn test_rate_is_not_clamped() {
        let now = Utc::now();
        let records = vec![SessionRecord::timed(Exercise::Plank, 50, now).unwrap()];
        let rates = success_rates(&aggregate(&records), default_catalog().resolve(1).unwrap());
        assert_eq!(rates.get(Exercise::Plank), Some(250.0));
        assert_eq!(rates.display_value(Exercise::Plank), 100.0);
    }

    #[test]
    fn test_every_plan_exercise_has_an_entry() {
        let plan = default_catalog().resolve(2).unwrap();
        let rates = success_rates(&aggregate(&[]), plan);
        assert_eq!(rates.len(), plan.targets.len());
        assert!(rates.iter().all(|(_, r)| r == 0.0));
    }

    #[test]
    fn test_absent_exercise_is_zero() {
        let now = Utc::now();
        let records = vec![SessionRecord::reps(Exercise::Squat, 10, 0, now).unwrap()];
        let rates = success_rates(&aggregate(&records), default_catalog().resolve(1).unwrap());
        assert_eq!(rates.get(Exercise::Squat), Some(100.0));
        assert_eq!(rates.get(Exercise::CobraStretch), Some(0.0));
        assert_eq!(rates.get(Exercise::PushUp), Some(0.0));
    }

    #[test]
    fn test_zero_target_time_exercise_is_zero() {
        let plan = PlanTargets {
            id: 1,
            label: "Test".into(),
            targets: vec![PlanTarget {
                exercise: Exercise::Plank,
                target: 0,
            }],
        };
        let records = vec![SessionRecord::timed(Exercise::Plank, 30, Utc::now()).unwrap()];
        let rates = success_rates(&aggregate(&records), &plan);
        assert_eq!(rates.get(Exercise::Plank), Some(0.0));
    }
}
