//! Trainee profile persistence with file locking.
//!
//! Unlike the lenient activity map, a profile that exists but cannot be read
//! is an error: falling back to a default would silently move the trainee to
//! the entry plan.

use crate::{Error, Result, TraineeProfile};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

impl TraineeProfile {
    /// Load a profile with a shared lock. Returns `None` if there is no file.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        let profile = serde_json::from_str::<TraineeProfile>(&contents).map_err(|e| {
            Error::State(format!("Corrupt trainee profile {:?}: {}", path, e))
        })?;

        tracing::debug!("Loaded trainee profile from {:?}", path);
        Ok(Some(profile))
    }

    /// Save a profile atomically: temp file, fsync, rename over the existing file
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "profile path missing parent")
        })?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string_pretty(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved trainee profile to {:?}", path);
        Ok(())
    }

    /// Load, modify and save a profile that must already exist
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(&mut TraineeProfile),
    {
        let mut profile = Self::load(path)?
            .ok_or_else(|| Error::State(format!("No trainee profile at {:?}", path)))?;
        f(&mut profile);
        profile.save(path)?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn profile() -> TraineeProfile {
        TraineeProfile {
            trainee_id: 7,
            name: "Sam".into(),
            plan_id: 1,
            fitness_level: "Beginner".into(),
            enrolled_at: Utc::now(),
        }
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("7/profile.json");

        profile().save(&path).unwrap();
        let loaded = TraineeProfile::load(&path).unwrap().unwrap();
        assert_eq!(loaded.trainee_id, 7);
        assert_eq!(loaded.fitness_level, "Beginner");
    }

    #[test]
    fn test_load_missing_is_none() {
        let temp_dir = tempfile::tempdir().unwrap();
        let loaded = TraineeProfile::load(&temp_dir.path().join("profile.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_corrupt_profile_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("profile.json");
        std::fs::write(&path, "{ plan_id: ").unwrap();

        assert!(matches!(TraineeProfile::load(&path), Err(Error::State(_))));
    }

    #[test]
    fn test_update_pattern() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("profile.json");
        profile().save(&path).unwrap();

        TraineeProfile::update(&path, |p| {
            p.plan_id = 2;
            p.fitness_level = "Intermediate".into();
        })
        .unwrap();

        let loaded = TraineeProfile::load(&path).unwrap().unwrap();
        assert_eq!(loaded.plan_id, 2);
        assert_eq!(loaded.fitness_level, "Intermediate");
    }

    #[test]
    fn test_update_missing_profile_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = TraineeProfile::update(&temp_dir.path().join("profile.json"), |p| p.plan_id = 3);
        assert!(result.is_err());
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("profile.json");
        profile().save(&path).unwrap();
        profile().save(&path).unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "profile.json")
            .collect();
        assert!(extras.is_empty(), "unexpected files: {:?}", extras);
    }
}
