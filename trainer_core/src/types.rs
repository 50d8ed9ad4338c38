//! Core domain types for the trainer progress engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - The exercise catalog and how each exercise is measured
//! - Session records and their untyped storage form
//! - Aggregated totals, plan targets and scorecards
//! - Promotion outcomes and trainee state

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Trainee identifier (assigned by the enrolling front end)
pub type TraineeId = u32;

/// Plan identifier: 1 = Beginner, 2 = Intermediate, 3 = Advanced
pub type PlanId = u32;

// ============================================================================
// Exercise Types
// ============================================================================

/// How an exercise is measured
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    /// Counts correct and wrong repetitions
    RepBased,
    /// Counts seconds held
    TimeBased,
}

/// The fixed exercise catalog, in workout order
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub enum Exercise {
    JumpingJack,
    PushUp,
    Plank,
    Crunches,
    Squat,
    CobraStretch,
}

impl Exercise {
    pub const ALL: [Exercise; 6] = [
        Exercise::JumpingJack,
        Exercise::PushUp,
        Exercise::Plank,
        Exercise::Crunches,
        Exercise::Squat,
        Exercise::CobraStretch,
    ];

    pub fn kind(self) -> ExerciseKind {
        match self {
            Exercise::Plank | Exercise::CobraStretch => ExerciseKind::TimeBased,
            _ => ExerciseKind::RepBased,
        }
    }

    /// Canonical display name
    pub fn name(self) -> &'static str {
        match self {
            Exercise::JumpingJack => "Jumping Jack",
            Exercise::PushUp => "Push-up",
            Exercise::Plank => "Plank",
            Exercise::Crunches => "Crunches",
            Exercise::Squat => "Squat",
            Exercise::CobraStretch => "Cobra Stretch",
        }
    }

    /// Unit the plan target is expressed in
    pub fn unit(self) -> &'static str {
        match self.kind() {
            ExerciseKind::RepBased => "reps",
            ExerciseKind::TimeBased => "seconds",
        }
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Exercise {
    type Err = Error;

    /// Case-insensitive; punctuation and whitespace are ignored and the
    /// plural names shown on plan cards ("Push Ups", "Squats") are accepted.
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match key.as_str() {
            "jumpingjack" | "jumpingjacks" => Ok(Exercise::JumpingJack),
            "pushup" | "pushups" => Ok(Exercise::PushUp),
            "plank" | "planks" => Ok(Exercise::Plank),
            "crunch" | "crunches" => Ok(Exercise::Crunches),
            "squat" | "squats" => Ok(Exercise::Squat),
            "cobra" | "cobrastretch" => Ok(Exercise::CobraStretch),
            _ => Err(Error::UnknownExercise(s.to_string())),
        }
    }
}

impl TryFrom<String> for Exercise {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Exercise> for String {
    fn from(exercise: Exercise) -> Self {
        exercise.name().to_string()
    }
}

// ============================================================================
// Session Types
// ============================================================================

/// The active measurement carried by a session record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Measurement {
    Reps { correct: u32, wrong: u32 },
    Seconds(u32),
    /// Both measurements are zero; carries no signal
    Empty,
}

/// One validated row of completed-exercise data
#[derive(Clone, Debug, PartialEq)]
pub struct SessionRecord {
    pub id: Uuid,
    pub exercise: Exercise,
    pub correct_reps: u32,
    pub wrong_reps: u32,
    pub duration_seconds: u32,
    pub performed_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Build a record, enforcing that at most one measurement is active and
    /// that it matches the exercise kind.
    pub fn new(
        id: Uuid,
        exercise: Exercise,
        correct_reps: u32,
        wrong_reps: u32,
        duration_seconds: u32,
        performed_at: DateTime<Utc>,
    ) -> Result<Self> {
        let has_reps = correct_reps > 0 || wrong_reps > 0;
        let has_time = duration_seconds > 0;

        if has_reps && has_time {
            return Err(Error::InvalidSession(format!(
                "{} record carries both reps and duration",
                exercise
            )));
        }
        match exercise.kind() {
            ExerciseKind::RepBased if has_time => {
                return Err(Error::InvalidSession(format!(
                    "{} is rep-based but the record carries a duration",
                    exercise
                )));
            }
            ExerciseKind::TimeBased if has_reps => {
                return Err(Error::InvalidSession(format!(
                    "{} is time-based but the record carries reps",
                    exercise
                )));
            }
            _ => {}
        }

        Ok(Self {
            id,
            exercise,
            correct_reps,
            wrong_reps,
            duration_seconds,
            performed_at,
        })
    }

    /// A rep-based record with a fresh id
    pub fn reps(
        exercise: Exercise,
        correct: u32,
        wrong: u32,
        performed_at: DateTime<Utc>,
    ) -> Result<Self> {
        Self::new(Uuid::new_v4(), exercise, correct, wrong, 0, performed_at)
    }

    /// A time-based record with a fresh id
    pub fn timed(exercise: Exercise, seconds: u32, performed_at: DateTime<Utc>) -> Result<Self> {
        Self::new(Uuid::new_v4(), exercise, 0, 0, seconds, performed_at)
    }

    pub fn measurement(&self) -> Measurement {
        if self.correct_reps > 0 || self.wrong_reps > 0 {
            Measurement::Reps {
                correct: self.correct_reps,
                wrong: self.wrong_reps,
            }
        } else if self.duration_seconds > 0 {
            Measurement::Seconds(self.duration_seconds)
        } else {
            Measurement::Empty
        }
    }
}

/// Untyped session row as stored in the journal or read from CSV.
///
/// Converting into [`SessionRecord`] is the only validation point.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RawSessionRow {
    #[serde(default)]
    pub id: Option<String>,
    pub exercise: String,
    pub correct_reps: i64,
    pub wrong_reps: i64,
    pub duration_seconds: i64,
    pub performed_at: String,
}

fn counter(field: &str, value: i64) -> Result<u32> {
    if value < 0 {
        return Err(Error::InvalidSession(format!(
            "{} must not be negative (got {})",
            field, value
        )));
    }
    u32::try_from(value)
        .map_err(|_| Error::InvalidSession(format!("{} is out of range (got {})", field, value)))
}

impl TryFrom<RawSessionRow> for SessionRecord {
    type Error = Error;

    fn try_from(row: RawSessionRow) -> Result<Self> {
        let exercise: Exercise = row.exercise.parse()?;
        let correct_reps = counter("correct_reps", row.correct_reps)?;
        let wrong_reps = counter("wrong_reps", row.wrong_reps)?;
        let duration_seconds = counter("duration_seconds", row.duration_seconds)?;

        let id = match row.id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Uuid::parse_str(raw)
                .map_err(|e| Error::InvalidSession(format!("Invalid UUID {:?}: {}", raw, e)))?,
            None => Uuid::new_v4(),
        };

        let performed_at = DateTime::parse_from_rfc3339(row.performed_at.trim())
            .map_err(|e| {
                Error::InvalidSession(format!("Invalid date {:?}: {}", row.performed_at, e))
            })?
            .with_timezone(&Utc);

        SessionRecord::new(
            id,
            exercise,
            correct_reps,
            wrong_reps,
            duration_seconds,
            performed_at,
        )
    }
}

impl From<&SessionRecord> for RawSessionRow {
    fn from(record: &SessionRecord) -> Self {
        RawSessionRow {
            id: Some(record.id.to_string()),
            exercise: record.exercise.name().to_string(),
            correct_reps: i64::from(record.correct_reps),
            wrong_reps: i64::from(record.wrong_reps),
            duration_seconds: i64::from(record.duration_seconds),
            performed_at: record.performed_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Aggregate Types
// ============================================================================

/// Summed repetition counters for one rep-based exercise
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RepTotals {
    pub total: u64,
    pub correct: u64,
    pub wrong: u64,
}

/// Summed hold time for one time-based exercise
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TimeTotals {
    pub total_seconds: u64,
    /// Records that contributed more than zero seconds
    pub session_count: u64,
}

/// Per-exercise totals derived from a trainee's session history
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AggregateTotals {
    pub reps: BTreeMap<Exercise, RepTotals>,
    pub time: BTreeMap<Exercise, TimeTotals>,
    pub total_sessions: usize,
}

// ============================================================================
// Plan Types
// ============================================================================

/// Target for one exercise within a plan (reps or seconds)
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanTarget {
    pub exercise: Exercise,
    pub target: u32,
}

/// Per-exercise targets for one plan
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanTargets {
    pub id: PlanId,
    pub label: String,
    pub targets: Vec<PlanTarget>,
}

impl PlanTargets {
    pub fn target_for(&self, exercise: Exercise) -> Option<u32> {
        self.targets
            .iter()
            .find(|t| t.exercise == exercise)
            .map(|t| t.target)
    }

    pub fn exercises(&self) -> impl Iterator<Item = Exercise> + '_ {
        self.targets.iter().map(|t| t.exercise)
    }
}

// ============================================================================
// Evaluation Types
// ============================================================================

/// Success rate per exercise, in percent, unclamped
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SuccessRates(pub BTreeMap<Exercise, f64>);

impl SuccessRates {
    pub fn get(&self, exercise: Exercise) -> Option<f64> {
        self.0.get(&exercise).copied()
    }

    /// Rate clamped to 0..=100 for charts and tables. Decisions never use this.
    pub fn display_value(&self, exercise: Exercise) -> f64 {
        self.get(exercise).unwrap_or(0.0).clamp(0.0, 100.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Exercise, f64)> + '_ {
        self.0.iter().map(|(e, r)| (*e, *r))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Points, ceiling and rates for one trainee on one plan
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Scorecard {
    pub plan_id: PlanId,
    pub total_points: i64,
    pub max_points: i64,
    pub rates: SuccessRates,
    pub total_sessions: usize,
}

/// Why a trainee's progress was cleared
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ResetReason {
    /// No recorded activity for too long
    Inactive { idle_days: i64 },
    /// Too many sessions without meeting the promotion bar
    AttemptsExhausted { sessions: usize },
}

/// Result of one promotion decision
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PromotionOutcome {
    Promoted { from: PlanId, to: PlanId },
    Continuing,
    Reset(ResetReason),
}

impl PromotionOutcome {
    /// Plan the trainee is on once this outcome has been applied
    pub fn target_plan(&self, current: PlanId) -> PlanId {
        match self {
            PromotionOutcome::Promoted { to, .. } => *to,
            _ => current,
        }
    }

    /// Whether applying this outcome clears session history
    pub fn clears_history(&self) -> bool {
        !matches!(self, PromotionOutcome::Continuing)
    }
}

impl fmt::Display for PromotionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromotionOutcome::Promoted { from, to } if from == to => {
                write!(f, "Promoted (plan {} is the final plan)", to)
            }
            PromotionOutcome::Promoted { from, to } => {
                write!(f, "Promoted from plan {} to plan {}", from, to)
            }
            PromotionOutcome::Continuing => f.write_str("Continuing"),
            PromotionOutcome::Reset(ResetReason::Inactive { idle_days }) => {
                write!(f, "Reset after {} days of inactivity", idle_days)
            }
            PromotionOutcome::Reset(ResetReason::AttemptsExhausted { sessions }) => {
                write!(f, "Reset after {} sessions without promotion", sessions)
            }
        }
    }
}

// ============================================================================
// Trainee Types
// ============================================================================

/// Persisted trainee profile
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TraineeProfile {
    pub trainee_id: TraineeId,
    pub name: String,
    pub plan_id: PlanId,
    pub fitness_level: String,
    pub enrolled_at: DateTime<Utc>,
}

/// What the engine needs to know about a trainee at evaluation time
#[derive(Clone, Debug, PartialEq)]
pub struct TraineeSnapshot {
    pub profile: TraineeProfile,
    pub last_activity: Option<NaiveDate>,
}
