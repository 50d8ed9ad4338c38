//! Last-activity tracking.
//!
//! A single `last_activity.json` maps trainee ids to the date of their most
//! recent workout (`{"7": "2026-03-01"}`). Reading is lenient: a missing or
//! damaged file means "no activity known", which never triggers an
//! inactivity reset.

use crate::{Error, Result, TraineeId};
use chrono::NaiveDate;
use fs2::FileExt;
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

type ActivityMap = BTreeMap<String, NaiveDate>;

/// Read the map. `Err` carries why an existing file could not be used.
fn read_map(path: &Path) -> std::result::Result<ActivityMap, String> {
    if !path.exists() {
        tracing::debug!("No activity file found at {:?}", path);
        return Ok(ActivityMap::new());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| format!("read failed: {}", e))?;
    serde_json::from_str(&contents).map_err(|e| format!("parse failed: {}", e))
}

fn load_map(path: &Path) -> ActivityMap {
    read_map(path).unwrap_or_else(|reason| {
        tracing::warn!("Ignoring activity file {:?}: {}", path, reason);
        ActivityMap::new()
    })
}

/// Where an unreadable activity file is moved before it is rewritten
pub fn quarantine_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".corrupt");
    PathBuf::from(name)
}

/// Date of the trainee's last recorded workout, if any
pub fn last_activity(path: &Path, trainee_id: TraineeId) -> Option<NaiveDate> {
    load_map(path).get(&trainee_id.to_string()).copied()
}

/// Record activity for a trainee, replacing any earlier date
pub fn record_activity(path: &Path, trainee_id: TraineeId, date: NaiveDate) -> Result<()> {
    let parent = path.parent().ok_or_else(|| {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "activity path missing parent",
        ))
    })?;
    std::fs::create_dir_all(parent)?;

    // Held across read-modify-write of the shared map
    let lock = OpenOptions::new()
        .create(true)
        .write(true)
        .open(path.with_extension("lock"))?;
    lock.lock_exclusive()?;

    let mut map = match read_map(path) {
        Ok(map) => map,
        Err(reason) => {
            let aside = quarantine_path(path);
            std::fs::rename(path, &aside)?;
            tracing::warn!(
                "Activity file {:?} is unreadable ({}); moved it to {:?} and starting afresh",
                path,
                reason,
                aside
            );
            ActivityMap::new()
        }
    };
    map.insert(trainee_id.to_string(), date);

    let temp = NamedTempFile::new_in(parent)?;
    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        writer.write_all(serde_json::to_string(&map)?.as_bytes())?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    lock.unlock()?;

    tracing::debug!("Recorded activity for trainee {} on {}", trainee_id, date);
    Ok(())
}
