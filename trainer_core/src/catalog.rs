//! Plan catalog: per-plan exercise targets.
//!
//! The built-in Beginner / Intermediate / Advanced tables can be replaced
//! through the `[[plans]]` section of the config file.

use crate::scoring::max_points;
use crate::types::*;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashSet};

/// Plan every trainee starts from when nothing better is known
pub const ENTRY_PLAN: PlanId = 1;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<PlanCatalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn default_catalog() -> &'static PlanCatalog {
    &DEFAULT_CATALOG
}

/// Targets for every known plan, keyed by plan id
#[derive(Clone, Debug, PartialEq)]
pub struct PlanCatalog {
    plans: BTreeMap<PlanId, PlanTargets>,
}

impl PlanCatalog {
    pub fn new(plans: impl IntoIterator<Item = PlanTargets>) -> Self {
        Self {
            plans: plans.into_iter().map(|p| (p.id, p)).collect(),
        }
    }

    /// Look up the target table for a plan
    pub fn resolve(&self, plan_id: PlanId) -> Result<&PlanTargets> {
        self.plans.get(&plan_id).ok_or(Error::UnknownPlan(plan_id))
    }

    /// Plan a trainee moves to on promotion. The highest plan is terminal.
    pub fn next_plan(&self, current: PlanId) -> PlanId {
        let next = current.saturating_add(1);
        if self.plans.contains_key(&next) {
            next
        } else {
            current
        }
    }

    pub fn plans(&self) -> impl Iterator<Item = &PlanTargets> {
        self.plans.values()
    }

    /// Returns every problem found; an empty list means the catalog is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.plans.is_empty() {
            errors.push("catalog defines no plans".to_string());
            return errors;
        }
        if !self.plans.contains_key(&ENTRY_PLAN) {
            errors.push(format!("entry plan {} is missing", ENTRY_PLAN));
        }

        // Promotion only ever moves to id + 1
        let mut expected = ENTRY_PLAN;
        for &id in self.plans.keys() {
            if id == expected {
                expected += 1;
            } else {
                errors.push(format!(
                    "plan {} is unreachable: plan ids must run {}, {}, ... without gaps",
                    id,
                    ENTRY_PLAN,
                    ENTRY_PLAN + 1
                ));
            }
        }

        for plan in self.plans.values() {
            if plan.targets.is_empty() {
                errors.push(format!("plan {} ({}) has no targets", plan.id, plan.label));
                continue;
            }

            let mut seen = HashSet::new();
            for target in &plan.targets {
                if !seen.insert(target.exercise) {
                    errors.push(format!(
                        "plan {} lists {} more than once",
                        plan.id, target.exercise
                    ));
                }
            }

            if max_points(plan) <= 0 {
                errors.push(format!(
                    "plan {} ({}) has no positive targets",
                    plan.id, plan.label
                ));
            }
        }

        errors
    }
}

/// Map the self-reported workout experience from enrolment to a plan
pub fn plan_for_experience(experience: Option<&str>) -> PlanId {
    let Some(text) = experience else {
        return ENTRY_PLAN;
    };
    let text = text.to_lowercase();

    if text.contains("beginner") || text.contains("none") {
        1
    } else if text.contains("intermediate") || text.contains("moderate") {
        2
    } else if text.contains("advanced") || text.contains("expert") {
        3
    } else {
        ENTRY_PLAN
    }
}

fn plan(id: PlanId, label: &str, targets: [(Exercise, u32); 6]) -> PlanTargets {
    PlanTargets {
        id,
        label: label.into(),
        targets: targets
            .into_iter()
            .map(|(exercise, target)| PlanTarget { exercise, target })
            .collect(),
    }
}

/// Builds the default three-tier catalog
///
/// Prefer `default_catalog()`, which returns a cached reference.
pub fn build_default_catalog() -> PlanCatalog {
    use Exercise::*;

    PlanCatalog::new([
        plan(
            1,
            "Beginner",
            [
                (JumpingJack, 20),
                (PushUp, 10),
                (Plank, 20),
                (Crunches, 15),
                (Squat, 15),
                (CobraStretch, 20),
            ],
        ),
        plan(
            2,
            "Intermediate",
            [
                (JumpingJack, 30),
                (PushUp, 15),
                (Plank, 40),
                (Crunches, 20),
                (Squat, 25),
                (CobraStretch, 30),
            ],
        ),
        plan(
            3,
            "Advanced",
            [
                (JumpingJack, 50),
                (PushUp, 25),
                (Plank, 60),
                (Crunches, 30),
                (Squat, 40),
                (CobraStretch, 45),
            ],
        ),
    ])
}
