//! Promotion decision.
//!
//! Checked in order on every evaluation:
//! 1. Inactivity: no activity for `inactivity_days` resets progress
//! 2. Points at or above the plan ceiling AND every exercise at or above the
//!    rate floor promotes to the next plan
//! 3. Otherwise, `reset_after_sessions` sessions without promotion resets
//! 4. Otherwise the trainee keeps training

use crate::types::*;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Thresholds for the promotion and reset rules
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PromotionRules {
    #[serde(default = "default_rate_floor")]
    pub rate_floor_percent: f64,

    #[serde(default = "default_reset_after_sessions")]
    pub reset_after_sessions: usize,

    #[serde(default = "default_inactivity_days")]
    pub inactivity_days: i64,
}

impl Default for PromotionRules {
    fn default() -> Self {
        Self {
            rate_floor_percent: default_rate_floor(),
            reset_after_sessions: default_reset_after_sessions(),
            inactivity_days: default_inactivity_days(),
        }
    }
}

fn default_rate_floor() -> f64 {
    60.0
}

fn default_reset_after_sessions() -> usize {
    60
}

fn default_inactivity_days() -> i64 {
    30
}

/// Everything the decision looks at
#[derive(Clone, Debug)]
pub struct DecisionInput<'a> {
    pub scorecard: &'a Scorecard,
    /// Plan reached on promotion (equal to the current plan when terminal)
    pub next_plan: PlanId,
    pub last_activity: Option<NaiveDate>,
    pub today: NaiveDate,
}

/// Days since the last recorded activity, if that crosses the threshold.
/// A trainee with no recorded activity is never considered inactive.
pub fn idle_days(last_activity: Option<NaiveDate>, today: NaiveDate, rules: &PromotionRules) -> Option<i64> {
    let last = last_activity?;
    let idle = (today - last).num_days();
    (idle >= rules.inactivity_days).then_some(idle)
}

/// True when every rate meets the floor. Rates are compared unclamped.
pub fn exercises_ok(rates: &SuccessRates, rules: &PromotionRules) -> bool {
    rates.iter().all(|(_, rate)| rate >= rules.rate_floor_percent)
}

pub fn points_ok(scorecard: &Scorecard) -> bool {
    scorecard.total_points >= scorecard.max_points
}

/// Decide the outcome for one evaluation
pub fn decide(input: &DecisionInput<'_>, rules: &PromotionRules) -> PromotionOutcome {
    let card = input.scorecard;

    if let Some(idle) = idle_days(input.last_activity, input.today, rules) {
        tracing::info!(
            "No activity for {} days (limit {}), resetting plan {}",
            idle,
            rules.inactivity_days,
            card.plan_id
        );
        return PromotionOutcome::Reset(ResetReason::Inactive { idle_days: idle });
    }

    let points = points_ok(card);
    let exercises = exercises_ok(&card.rates, rules);
    tracing::debug!(
        "Plan {}: {}/{} points (ok: {}), rates ok: {}",
        card.plan_id,
        card.total_points,
        card.max_points,
        points,
        exercises
    );

    if points && exercises {
        tracing::info!("Promotion criteria met on plan {}", card.plan_id);
        return PromotionOutcome::Promoted {
            from: card.plan_id,
            to: input.next_plan,
        };
    }

    if card.total_sessions >= rules.reset_after_sessions {
        tracing::info!(
            "{} sessions recorded without promotion (limit {}), resetting plan {}",
            card.total_sessions,
            rules.reset_after_sessions,
            card.plan_id
        );
        return PromotionOutcome::Reset(ResetReason::AttemptsExhausted {
            sessions: card.total_sessions,
        });
    }

    PromotionOutcome::Continuing
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::collections::BTreeMap;

    fn card(plan_id: PlanId, points: i64, max: i64, rates: &[(Exercise, f64)], sessions: usize) -> Scorecard {
        Scorecard {
            plan_id,
            total_points: points,
            max_points: max,
            rates: SuccessRates(rates.iter().copied().collect::<BTreeMap<_, _>>()),
            total_sessions: sessions,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 20).unwrap()
    }

    fn input(scorecard: &Scorecard, last_activity: Option<NaiveDate>) -> DecisionInput<'_> {
        DecisionInput {
            scorecard,
            next_plan: (scorecard.plan_id + 1).min(3),
            last_activity,
            today: today(),
        }
    }

    #[test]
    fn test_promotes_when_both_conditions_hold() {
        let c = card(1, 160, 120, &[(Exercise::PushUp, 100.0)], 4);
        let outcome = decide(&input(&c, Some(today())), &PromotionRules::default());
        assert_eq!(outcome, PromotionOutcome::Promoted { from: 1, to: 2 });
    }

    #[test]
    fn test_continues_when_points_short() {
        let c = card(1, 100, 120, &[(Exercise::PushUp, 100.0)], 4);
        let outcome = decide(&input(&c, None), &PromotionRules::default());
        assert_eq!(outcome, PromotionOutcome::Continuing);
    }

    #[test]
    fn test_rate_floor_is_inclusive() {
        let c = card(2, 500, 500, &[(Exercise::Squat, 60.0), (Exercise::Plank, 140.0)], 10);
        let outcome = decide(&input(&c, None), &PromotionRules::default());
        assert_eq!(outcome, PromotionOutcome::Promoted { from: 2, to: 3 });
    }

    #[test]
    fn test_one_weak_exercise_blocks_promotion() {
        let c = card(1, 900, 800, &[(Exercise::Squat, 100.0), (Exercise::CobraStretch, 0.0)], 12);
        let outcome = decide(&input(&c, None), &PromotionRules::default());
        assert_eq!(outcome, PromotionOutcome::Continuing);
    }

    #[test]
    fn test_reset_after_sixty_sessions_without_promotion() {
        let c = card(2, 5000, 1280, &[(Exercise::PushUp, 40.0), (Exercise::Plank, 90.0)], 60);
        let outcome = decide(&input(&c, None), &PromotionRules::default());
        assert_eq!(
            outcome,
            PromotionOutcome::Reset(ResetReason::AttemptsExhausted { sessions: 60 })
        );
    }

    #[test]
    fn test_promotion_wins_over_session_limit() {
        let c = card(1, 900, 800, &[(Exercise::PushUp, 95.0)], 75);
        let outcome = decide(&input(&c, None), &PromotionRules::default());
        assert_eq!(outcome, PromotionOutcome::Promoted { from: 1, to: 2 });
    }

    #[test]
    fn test_inactivity_overrides_everything() {
        let c = card(1, 900, 800, &[(Exercise::PushUp, 100.0)], 75);
        let last = today() - Duration::days(31);
        let outcome = decide(&input(&c, Some(last)), &PromotionRules::default());
        assert_eq!(
            outcome,
            PromotionOutcome::Reset(ResetReason::Inactive { idle_days: 31 })
        );
    }

    #[test]
    fn test_inactivity_threshold_boundary() {
        let rules = PromotionRules::default();
        assert_eq!(idle_days(Some(today() - Duration::days(29)), today(), &rules), None);
        assert_eq!(idle_days(Some(today() - Duration::days(30)), today(), &rules), Some(30));
        assert_eq!(idle_days(None, today(), &rules), None);
    }

    #[test]
    fn test_terminal_plan_promotes_to_itself() {
        let c = card(3, 2500, 2000, &[(Exercise::PushUp, 100.0)], 20);
        let outcome = decide(&input(&c, None), &PromotionRules::default());
        assert_eq!(outcome, PromotionOutcome::Promoted { from: 3, to: 3 });
        assert_eq!(outcome.target_plan(3), 3);
        assert!(outcome.clears_history());
    }

    #[test]
    fn test_custom_rules() {
        let rules = PromotionRules {
            rate_floor_percent: 80.0,
            reset_after_sessions: 10,
            inactivity_days: 7,
        };
        let c = card(1, 200, 120, &[(Exercise::PushUp, 70.0)], 10);
        let outcome = decide(&input(&c, None), &rules);
        assert_eq!(
            outcome,
            PromotionOutcome::Reset(ResetReason::AttemptsExhausted { sessions: 10 })
        );
    }
}
