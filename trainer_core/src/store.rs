//! Storage collaborators for the evaluation engine.
//!
//! The engine only talks to [`TraineeStore`]. [`FileStore`] lays trainees
//! out under a data directory:
//!
//! ```text
//! <data_dir>/last_activity.json
//! <data_dir>/trainees/<id>/profile.json
//! <data_dir>/trainees/<id>/sessions.jsonl
//! ```

use crate::journal::SessionJournal;
use crate::types::*;
use crate::{activity, Error, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Reads and writes the engine needs from persistent storage
pub trait TraineeStore {
    fn load_sessions(&self, trainee_id: TraineeId) -> Result<Vec<RawSessionRow>>;
    fn append_session(&mut self, trainee_id: TraineeId, record: &SessionRecord) -> Result<()>;
    fn clear_sessions(&mut self, trainee_id: TraineeId) -> Result<()>;

    /// Profile plus last activity. `Error::TraineeNotFound` if not enrolled.
    fn get_trainee(&self, trainee_id: TraineeId) -> Result<TraineeSnapshot>;
    fn create_trainee(&mut self, profile: &TraineeProfile) -> Result<()>;
    fn set_plan(&mut self, trainee_id: TraineeId, plan_id: PlanId) -> Result<()>;
    fn set_fitness_level(&mut self, trainee_id: TraineeId, label: &str) -> Result<()>;
    fn touch_activity(&mut self, trainee_id: TraineeId, date: NaiveDate) -> Result<()>;
}

/// File-backed store rooted at a data directory
#[derive(Clone, Debug)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn trainee_dir(&self, trainee_id: TraineeId) -> PathBuf {
        self.data_dir.join("trainees").join(trainee_id.to_string())
    }

    pub fn profile_path(&self, trainee_id: TraineeId) -> PathBuf {
        self.trainee_dir(trainee_id).join("profile.json")
    }

    pub fn sessions_path(&self, trainee_id: TraineeId) -> PathBuf {
        self.trainee_dir(trainee_id).join("sessions.jsonl")
    }

    pub fn activity_path(&self) -> PathBuf {
        self.data_dir.join("last_activity.json")
    }

    fn journal(&self, trainee_id: TraineeId) -> SessionJournal {
        SessionJournal::new(self.sessions_path(trainee_id))
    }

    fn require_profile(&self, trainee_id: TraineeId) -> Result<TraineeProfile> {
        TraineeProfile::load(&self.profile_path(trainee_id))?
            .ok_or(Error::TraineeNotFound(trainee_id))
    }
}

impl TraineeStore for FileStore {
    fn load_sessions(&self, trainee_id: TraineeId) -> Result<Vec<RawSessionRow>> {
        self.journal(trainee_id).read_rows()
    }

    fn append_session(&mut self, trainee_id: TraineeId, record: &SessionRecord) -> Result<()> {
        self.journal(trainee_id).append(record)
    }

    fn clear_sessions(&mut self, trainee_id: TraineeId) -> Result<()> {
        self.journal(trainee_id).clear()
    }

    fn get_trainee(&self, trainee_id: TraineeId) -> Result<TraineeSnapshot> {
        let profile = self.require_profile(trainee_id)?;
        let last_activity = activity::last_activity(&self.activity_path(), trainee_id);
        Ok(TraineeSnapshot {
            profile,
            last_activity,
        })
    }

    fn create_trainee(&mut self, profile: &TraineeProfile) -> Result<()> {
        let path = self.profile_path(profile.trainee_id);
        if path.exists() {
            return Err(Error::State(format!(
                "Trainee {} is already enrolled",
                profile.trainee_id
            )));
        }
        profile.save(&path)
    }

    fn set_plan(&mut self, trainee_id: TraineeId, plan_id: PlanId) -> Result<()> {
        TraineeProfile::update(&self.profile_path(trainee_id), |p| p.plan_id = plan_id)?;
        Ok(())
    }

    fn set_fitness_level(&mut self, trainee_id: TraineeId, label: &str) -> Result<()> {
        TraineeProfile::update(&self.profile_path(trainee_id), |p| {
            p.fitness_level = label.to_string()
        })?;
        Ok(())
    }

    fn touch_activity(&mut self, trainee_id: TraineeId, date: NaiveDate) -> Result<()> {
        activity::record_activity(&self.activity_path(), trainee_id, date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn profile(id: TraineeId) -> TraineeProfile {
        TraineeProfile {
            trainee_id: id,
            name: "Robin".into(),
            plan_id: 1,
            fitness_level: "Beginner".into(),
            enrolled_at: Utc::now(),
        }
    }

    #[test]
    fn test_unknown_trainee() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());
        assert!(matches!(store.get_trainee(4), Err(Error::TraineeNotFound(4))));
    }

    #[test]
    fn test_create_and_update_trainee() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(temp_dir.path());
        store.create_trainee(&profile(4)).unwrap();
        store.set_plan(4, 2).unwrap();
        store.set_fitness_level(4, "Intermediate").unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        store.touch_activity(4, day).unwrap();

        let snapshot = store.get_trainee(4).unwrap();
        assert_eq!(snapshot.profile.plan_id, 2);
        assert_eq!(snapshot.profile.fitness_level, "Intermediate");
        assert_eq!(snapshot.last_activity, Some(day));
    }

    #[test]
    fn test_duplicate_enrolment_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(temp_dir.path());
        store.create_trainee(&profile(4)).unwrap();
        assert!(matches!(store.create_trainee(&profile(4)), Err(Error::State(_))));
    }

    #[test]
    fn test_sessions_are_per_trainee() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(temp_dir.path());
        let record = SessionRecord::reps(Exercise::Squat, 10, 0, Utc::now()).unwrap();

        store.append_session(1, &record).unwrap();
        store.append_session(2, &record).unwrap();
        store.clear_sessions(1).unwrap();

        assert!(store.load_sessions(1).unwrap().is_empty());
        assert_eq!(store.load_sessions(2).unwrap().len(), 1);
    }

    #[test]
    fn test_set_plan_for_missing_trainee_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(temp_dir.path());
        assert!(store.set_plan(9, 2).is_err());
    }
}
