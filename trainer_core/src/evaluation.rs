//! Progress evaluation: load history, score it, decide, and apply.
//!
//! A [`ProgressEngine`] is built per call around a store, a plan catalog and
//! promotion rules; it keeps no state between calls. All figures come from
//! the session history loaded at the start of the call.

use crate::aggregate::{aggregate, ingest};
use crate::catalog::{plan_for_experience, PlanCatalog, ENTRY_PLAN};
use crate::promotion::{self, DecisionInput, PromotionRules};
use crate::rates::success_rates;
use crate::scoring::{max_points, score};
use crate::store::TraineeStore;
use crate::types::*;
use crate::{Error, Result, StorageOp};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Result of one evaluation
#[derive(Clone, Debug)]
pub struct Evaluation {
    pub trainee_id: TraineeId,
    pub outcome: PromotionOutcome,
    /// Figures the decision was made on
    pub decided_on: Scorecard,
    /// Figures once the outcome is in effect (fresh plan after promotion or
    /// reset; same as `decided_on` while continuing)
    pub active: Scorecard,
    /// Totals behind `decided_on`, for analytics tables
    pub totals: AggregateTotals,
    /// Session rows dropped at ingestion
    pub rejected_rows: usize,
    /// Whether the outcome's writes were performed
    pub applied: bool,
}

/// Counts from a bulk import
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Engine facade over a trainee store
pub struct ProgressEngine<'a, S: TraineeStore> {
    store: &'a mut S,
    plans: &'a PlanCatalog,
    rules: &'a PromotionRules,
}

impl<'a, S: TraineeStore> ProgressEngine<'a, S> {
    pub fn new(store: &'a mut S, plans: &'a PlanCatalog, rules: &'a PromotionRules) -> Self {
        Self {
            store,
            plans,
            rules,
        }
    }

    /// Compute the scorecard and decision without writing anything
    pub fn preview(&self, trainee_id: TraineeId, now: DateTime<Utc>) -> Result<Evaluation> {
        let snapshot = self.store.get_trainee(trainee_id)?;
        let plan = self.plans.resolve(snapshot.profile.plan_id)?;

        let ingested = ingest(self.store.load_sessions(trainee_id)?);
        let totals = aggregate(&ingested.records);
        let decided_on = Scorecard {
            plan_id: plan.id,
            total_points: score(&totals, &ingested.records),
            max_points: max_points(plan),
            rates: success_rates(&totals, plan),
            total_sessions: totals.total_sessions,
        };

        let input = DecisionInput {
            scorecard: &decided_on,
            next_plan: self.plans.next_plan(plan.id),
            last_activity: snapshot.last_activity,
            today: now.date_naive(),
        };
        let outcome = promotion::decide(&input, self.rules);

        let active = if outcome.clears_history() {
            fresh_scorecard(self.plans.resolve(outcome.target_plan(plan.id))?)
        } else {
            decided_on.clone()
        };

        Ok(Evaluation {
            trainee_id,
            outcome,
            decided_on,
            active,
            totals,
            rejected_rows: ingested.rejected,
            applied: false,
        })
    }

    /// Evaluate and persist the outcome.
    ///
    /// If any write fails the error is returned and no evaluation is
    /// reported, so callers never display a promotion or reset that did not
    /// reach storage. Nothing is retried here.
    pub fn evaluate(&mut self, trainee_id: TraineeId, now: DateTime<Utc>) -> Result<Evaluation> {
        let mut evaluation = self.preview(trainee_id, now)?;
        self.apply(trainee_id, &evaluation.outcome)?;
        evaluation.applied = evaluation.outcome.clears_history();

        tracing::info!(
            "Trainee {}: {} ({} / {} points)",
            trainee_id,
            evaluation.outcome,
            evaluation.decided_on.total_points,
            evaluation.decided_on.max_points
        );
        Ok(evaluation)
    }

    fn apply(&mut self, trainee_id: TraineeId, outcome: &PromotionOutcome) -> Result<()> {
        match *outcome {
            PromotionOutcome::Continuing => Ok(()),
            PromotionOutcome::Reset(_) => self
                .store
                .clear_sessions(trainee_id)
                .map_err(|e| Error::write_failed(StorageOp::ClearSessions, e)),
            PromotionOutcome::Promoted { from, to } => {
                let label = self.plans.resolve(to)?.label.clone();
                let previous_label = self.store.get_trainee(trainee_id)?.profile.fitness_level;

                // Clearing history cannot be undone, so it goes last and the
                // profile writes before it are put back if anything fails.
                self.store
                    .set_plan(trainee_id, to)
                    .map_err(|e| Error::write_failed(StorageOp::SetPlan, e))?;

                if let Err(e) = self.store.set_fitness_level(trainee_id, &label) {
                    let err = Error::write_failed(StorageOp::SetFitnessLevel, e);
                    return Err(self.restore_profile(trainee_id, from, None, err));
                }

                if let Err(e) = self.store.clear_sessions(trainee_id) {
                    let err = Error::write_failed(StorageOp::ClearSessions, e);
                    return Err(self.restore_profile(trainee_id, from, Some(&previous_label), err));
                }
                Ok(())
            }
        }
    }

    /// Undo the profile half of a promotion after `err`. Returns the error
    /// to report, carrying the restore failure if there was one.
    fn restore_profile(
        &mut self,
        trainee_id: TraineeId,
        plan_id: PlanId,
        label: Option<&str>,
        err: Error,
    ) -> Error {
        let restored = match label {
            Some(label) => self.store.set_fitness_level(trainee_id, label),
            None => Ok(()),
        }
        .and_then(|()| self.store.set_plan(trainee_id, plan_id));

        match restored {
            Ok(()) => {
                tracing::warn!(
                    "Promotion of trainee {} not applied, kept plan {}: {}",
                    trainee_id,
                    plan_id,
                    err
                );
                err
            }
            Err(rollback) => {
                tracing::error!(
                    "Trainee {}: failed to restore plan {} after a failed promotion: {}",
                    trainee_id,
                    plan_id,
                    rollback
                );
                err.with_rollback(rollback)
            }
        }
    }

    /// Log a finished exercise.
    ///
    /// A pending inactivity reset is applied first, otherwise stamping the
    /// new activity date would wipe out the penalty. Returns that reset, if
    /// one happened.
    pub fn record_session(
        &mut self,
        trainee_id: TraineeId,
        record: &SessionRecord,
        now: DateTime<Utc>,
    ) -> Result<Option<PromotionOutcome>> {
        let snapshot = self.store.get_trainee(trainee_id)?;
        let today = now.date_naive();

        let reset = match promotion::idle_days(snapshot.last_activity, today, self.rules) {
            Some(idle_days) => {
                let outcome = PromotionOutcome::Reset(ResetReason::Inactive { idle_days });
                self.apply(trainee_id, &outcome)?;
                tracing::info!("Trainee {}: {} before logging", trainee_id, outcome);
                Some(outcome)
            }
            None => None,
        };

        self.store
            .append_session(trainee_id, record)
            .map_err(|e| Error::write_failed(StorageOp::AppendSession, e))?;
        self.store
            .touch_activity(trainee_id, today)
            .map_err(|e| Error::write_failed(StorageOp::TouchActivity, e))?;

        tracing::info!(
            "Logged {} for trainee {} ({:?})",
            record.exercise,
            trainee_id,
            record.measurement()
        );
        Ok(reset)
    }

    /// Append externally recorded rows (e.g. a CSV file) to a trainee's
    /// history. Invalid rows and ids already in the history are skipped.
    pub fn import_sessions(
        &mut self,
        trainee_id: TraineeId,
        rows: Vec<RawSessionRow>,
    ) -> Result<ImportSummary> {
        self.store.get_trainee(trainee_id)?;
        let existing: HashSet<_> = ingest(self.store.load_sessions(trainee_id)?)
            .records
            .into_iter()
            .map(|r| r.id)
            .collect();

        let ingested = ingest(rows);
        let mut summary = ImportSummary {
            imported: 0,
            skipped: ingested.rejected,
        };

        for record in &ingested.records {
            if existing.contains(&record.id) {
                tracing::debug!("Session {} already recorded, skipping", record.id);
                summary.skipped += 1;
                continue;
            }
            self.store
                .append_session(trainee_id, record)
                .map_err(|e| Error::write_failed(StorageOp::AppendSession, e))?;
            summary.imported += 1;
        }

        tracing::info!(
            "Imported {} sessions for trainee {} ({} skipped)",
            summary.imported,
            trainee_id,
            summary.skipped
        );
        Ok(summary)
    }

    /// Create a trainee on the plan matching their stated experience
    pub fn enroll(
        &mut self,
        trainee_id: TraineeId,
        name: &str,
        experience: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<TraineeProfile> {
        let wanted = plan_for_experience(experience);
        let plan = match self.plans.resolve(wanted) {
            Ok(plan) => plan,
            Err(_) => {
                tracing::warn!("Plan {} is not configured, enrolling on plan {}", wanted, ENTRY_PLAN);
                self.plans.resolve(ENTRY_PLAN)?
            }
        };

        let profile = TraineeProfile {
            trainee_id,
            name: name.to_string(),
            plan_id: plan.id,
            fitness_level: plan.label.clone(),
            enrolled_at: now,
        };
        self.store.create_trainee(&profile)?;

        tracing::info!("Enrolled trainee {} on plan {} ({})", trainee_id, plan.id, plan.label);
        Ok(profile)
    }
}

/// Scorecard for a plan with no history yet
pub fn fresh_scorecard(plan: &PlanTargets) -> Scorecard {
    Scorecard {
        plan_id: plan.id,
        total_points: 0,
        max_points: max_points(plan),
        rates: success_rates(&AggregateTotals::default(), plan),
        total_sessions: 0,
    }
}
