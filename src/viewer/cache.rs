//! Process-wide cache of loaded output datasets
//!
//! Entries are keyed by the file's canonical location and remember its
//! modification time. A lookup reloads whenever the file on disk has a
//! different modification time, so a rescored file is picked up without
//! restarting the viewer.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::time::SystemTime;

use crate::data::{load_scores, ScoredTable};
use crate::error::{DataIssue, Result, RiskError};

/// Shown instead of the dashboard while no scored dataset exists
pub const MISSING_SCORES_MESSAGE: &str =
    "Please run `score_employees` first to generate the risk scores!";

static SCORE_CACHE: OnceLock<Mutex<HashMap<PathBuf, CacheEntry>>> = OnceLock::new();

#[derive(Clone)]
struct CacheEntry {
    modified: SystemTime,
    table: Arc<ScoredTable>,
}

fn cache() -> MutexGuard<'static, HashMap<PathBuf, CacheEntry>> {
    SCORE_CACHE
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Canonical parent directory joined with the file name.
///
/// The parent is resolved rather than the file so a deleted file still maps
/// to the key it was cached under.
fn cache_key(path: &Path) -> PathBuf {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match (fs::canonicalize(parent), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

fn modified(path: &Path) -> Result<SystemTime> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => RiskError::DataUnavailable {
            path: path.to_path_buf(),
            issue: DataIssue::NotFound,
        },
        _ => RiskError::unreadable(path, e),
    })?;
    metadata
        .modified()
        .map_err(|e| RiskError::unreadable(path, e))
}

/// Load the output dataset at `path`, reusing the cached copy while the
/// file's modification time is unchanged
pub fn load_cached<P: AsRef<Path>>(path: P) -> Result<Arc<ScoredTable>> {
    let path = path.as_ref();
    let key = cache_key(path);
    let stamp = match modified(path) {
        Ok(stamp) => stamp,
        Err(e) => {
            cache().remove(&key);
            return Err(e);
        }
    };

    if let Some(entry) = cache().get(&key) {
        if entry.modified == stamp {
            log::debug!("Score cache hit for {}", path.display());
            return Ok(Arc::clone(&entry.table));
        }
    }

    // Load outside the lock
    let table = Arc::new(load_scores(path)?);
    cache().insert(
        key,
        CacheEntry {
            modified: stamp,
            table: Arc::clone(&table),
        },
    );
    Ok(table)
}

/// Drop the cached copy of `path`; returns whether one was held
pub fn invalidate<P: AsRef<Path>>(path: P) -> bool {
    cache().remove(&cache_key(path.as_ref())).is_some()
}

/// Drop every cached dataset
pub fn clear() {
    cache().clear();
}

/// Load the output dataset for display.
///
/// `Ok(None)` means the file has not been produced yet; the caller should
/// show [`MISSING_SCORES_MESSAGE`] and render nothing else.
pub fn open_scores<P: AsRef<Path>>(path: P) -> Result<Option<Arc<ScoredTable>>> {
    match load_cached(path) {
        Ok(table) => Ok(Some(table)),
        Err(e) if e.is_missing_file() => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    const HEADER: &str = "Department,Attrition_Probability,Risk_Category\n";

    fn write_scores(path: &Path, body: &str, modified: SystemTime) {
        fs::write(path, format!("{}{}", HEADER, body)).unwrap();
        fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(modified)
            .unwrap();
    }

    #[test]
    fn test_unchanged_file_is_served_from_cache() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scores.csv");
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        write_scores(&path, "2,0.7,High Risk\n", t0);

        let first = load_cached(&path).unwrap();
        let second = load_cached(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_changed_modification_time_reloads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scores.csv");
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        write_scores(&path, "2,0.7,High Risk\n", t0);
        assert_eq!(load_cached(&path).unwrap().len(), 1);

        write_scores(&path, "2,0.7,High Risk\n1,0.1,Low Risk\n", t0 + Duration::from_secs(60));
        assert_eq!(load_cached(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scores.csv");
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        write_scores(&path, "2,0.7,High Risk\n", t0);
        let first = load_cached(&path).unwrap();

        // Same modification time, new content: only invalidation reveals it
        write_scores(&path, "0,0.2,Low Risk\n1,0.4,Medium Risk\n", t0);
        assert!(Arc::ptr_eq(&first, &load_cached(&path).unwrap()));

        assert!(invalidate(&path));
        assert!(!invalidate(&path));
        assert_eq!(load_cached(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_equivalent_paths_share_an_entry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scores.csv");
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        write_scores(&path, "2,0.7,High Risk\n", t0);

        let direct = load_cached(&path).unwrap();
        let dotted = load_cached(dir.path().join(".").join("scores.csv")).unwrap();
        assert!(Arc::ptr_eq(&direct, &dotted));

        assert!(invalidate(dir.path().join(".").join("scores.csv")));
        assert!(!invalidate(&path));
    }

    #[test]
    fn test_open_scores_without_output_renders_nothing() {
        let dir = tempdir().unwrap();
        let opened = open_scores(dir.path().join("Employee_Risk_Scores.csv")).unwrap();
        assert!(opened.is_none());
        assert_eq!(
            MISSING_SCORES_MESSAGE,
            "Please run `score_employees` first to generate the risk scores!"
        );
    }

    #[test]
    fn test_open_scores_propagates_corrupt_output() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Employee_Risk_Scores.csv");
        fs::write(&path, "Department\n2\n").unwrap();

        let err = open_scores(&path).unwrap_err();
        assert!(matches!(err, RiskError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let dir = tempdir().unwrap();
        let err = load_cached(dir.path().join("Employee_Risk_Scores.csv")).unwrap_err();
        assert!(err.is_missing_file());
    }
}
