//! Baseline and artifact persistence.
//!
//! Three image categories live under separate roots so that cleaning
//! captures and diffs between runs never touches approved baselines:
//!
//! ```text
//! <baseline_dir>/<key>.png       approved reference, long-lived
//! <actual_dir>/<key>.png         latest capture, overwritten every run
//! <diff_dir>/<key>-diff.png      only written when a difference exists
//! <baseline_dir>/<key>.name      logical name that owns the key
//! ```

use crate::config::VisregConfig;
use crate::naming::{baseline_key, check_owner, sanitize_name};
use crate::result::{VisregError, VisregResult};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};

/// Named-image storage used by the orchestrator
pub trait BaselineRepository: Send + Sync {
    /// Write or overwrite the baseline for `name`
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the write fails, or a configuration error if
    /// `name` collides with another name's key.
    fn save(&self, name: &str, bytes: &[u8]) -> VisregResult<()>;

    /// Read the baseline for `name`
    ///
    /// # Errors
    ///
    /// Returns [`VisregError::NotFound`] if no baseline exists.
    fn load(&self, name: &str) -> VisregResult<Vec<u8>>;

    /// Whether a baseline exists for `name`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `name` collides with another name's key.
    fn exists(&self, name: &str) -> VisregResult<bool>;

    /// Write the baseline only if none exists yet; `Ok(false)` if one did
    ///
    /// The default implementation checks then writes and is not atomic.
    ///
    /// # Errors
    ///
    /// As [`Self::save`].
    fn save_if_absent(&self, name: &str, bytes: &[u8]) -> VisregResult<bool> {
        if self.exists(name)? {
            return Ok(false);
        }
        self.save(name, bytes)?;
        Ok(true)
    }

    /// Intentionally replace the baseline for `name`
    ///
    /// # Errors
    ///
    /// As [`Self::save`].
    fn update(&self, name: &str, bytes: &[u8]) -> VisregResult<()> {
        info!(name, bytes = bytes.len(), "updating baseline");
        self.save(name, bytes)
    }

    /// Store the latest capture for `name`, returning its location
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the write fails.
    fn save_actual(&self, name: &str, bytes: &[u8]) -> VisregResult<String>;

    /// Store a generated diff image for `name`, returning its location
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the write fails.
    fn save_diff(&self, name: &str, bytes: &[u8]) -> VisregResult<String>;

    /// Where the baseline for `name` lives (whether or not it exists)
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `name` collides with another name's key.
    fn baseline_location(&self, name: &str) -> VisregResult<String>;

    /// Remove every actual and diff artifact, keeping baselines
    ///
    /// # Errors
    ///
    /// Returns an I/O error if removal fails.
    fn clear_artifacts(&self) -> VisregResult<()>;
}

static STAGING_COUNTER: AtomicU64 = AtomicU64::new(0);

/// File-system repository with three artifact roots
///
/// Key ownership is recorded on disk, so a name collision is caught across
/// repository instances and processes.
#[derive(Debug)]
pub struct FsBaselineRepository {
    baseline_dir: PathBuf,
    actual_dir: PathBuf,
    diff_dir: PathBuf,
}

impl FsBaselineRepository {
    /// Create a repository over the given roots; directories are created on demand
    #[must_use]
    pub fn new(
        baseline_dir: impl Into<PathBuf>,
        actual_dir: impl Into<PathBuf>,
        diff_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            baseline_dir: baseline_dir.into(),
            actual_dir: actual_dir.into(),
            diff_dir: diff_dir.into(),
        }
    }

    /// Create a repository from project settings
    #[must_use]
    pub fn from_config(config: &VisregConfig) -> Self {
        Self::new(
            config.baseline_dir.clone(),
            config.actual_dir.clone(),
            config.diff_dir.clone(),
        )
    }

    /// Path of the baseline for `name`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if another name owns the key.
    pub fn baseline_path(&self, name: &str) -> VisregResult<PathBuf> {
        let key = self.key_for(name)?;
        Ok(self.baseline_dir.join(format!("{key}.png")))
    }

    /// Path of the latest capture for `name`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if another name owns the key.
    pub fn actual_path(&self, name: &str) -> VisregResult<PathBuf> {
        let key = self.key_for(name)?;
        Ok(self.actual_dir.join(format!("{key}.png")))
    }

    /// Path of the diff image for `name`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if another name owns the key.
    pub fn diff_path(&self, name: &str) -> VisregResult<PathBuf> {
        let key = self.key_for(name)?;
        Ok(self.diff_dir.join(format!("{key}-diff.png")))
    }

    fn owner_path(&self, key: &str) -> PathBuf {
        self.baseline_dir.join(format!("{key}.name"))
    }

    /// Sanitized key for `name`, checked against the recorded owner
    fn key_for(&self, name: &str) -> VisregResult<String> {
        let key = baseline_key(name)?;
        match fs::read_to_string(self.owner_path(&key)) {
            Ok(owner) => check_owner(&key, &owner, name)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        Ok(key)
    }

    /// Record `name` as owner of its key, or fail if another name got there first
    fn claim(&self, name: &str) -> VisregResult<String> {
        let key = baseline_key(name)?;
        let owner_path = self.owner_path(&key);
        if !create_exclusive(&owner_path, name.as_bytes())? {
            check_owner(&key, &fs::read_to_string(&owner_path)?, name)?;
        }
        Ok(key)
    }
}

fn write_creating_parents(path: &Path, bytes: &[u8]) -> VisregResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(())
}

/// Write `bytes` to `path` only if it does not exist; `Ok(false)` if it did
///
/// The full content is written aside and then hard-linked into place, so
/// exactly one concurrent writer wins and readers never see a partial file.
fn create_exclusive(path: &Path, bytes: &[u8]) -> VisregResult<bool> {
    let Some(dir) = path.parent() else {
        return Err(VisregError::config(format!(
            "{} has no parent directory",
            path.display()
        )));
    };
    fs::create_dir_all(dir)?;

    let staging = dir.join(format!(
        ".{}.{}.{}.tmp",
        path.file_name().map_or_else(String::new, |f| f.to_string_lossy().into_owned()),
        std::process::id(),
        STAGING_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    fs::write(&staging, bytes)?;
    let linked = fs::hard_link(&staging, path);
    fs::remove_file(&staging)?;

    match linked {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn remove_dir_if_present(dir: &Path) -> VisregResult<()> {
    match fs::remove_dir_all(dir) {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
        _ => Ok(()),
    }
}

impl BaselineRepository for FsBaselineRepository {
    fn save(&self, name: &str, bytes: &[u8]) -> VisregResult<()> {
        let key = self.claim(name)?;
        let path = self.baseline_dir.join(format!("{key}.png"));
        write_creating_parents(&path, bytes)?;
        info!(name, path = %path.display(), "baseline saved");
        Ok(())
    }

    fn load(&self, name: &str) -> VisregResult<Vec<u8>> {
        let path = self.baseline_path(name)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(VisregError::NotFound {
                name: name.to_string(),
                path: path.display().to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, name: &str) -> VisregResult<bool> {
        Ok(self.baseline_path(name)?.is_file())
    }

    fn save_if_absent(&self, name: &str, bytes: &[u8]) -> VisregResult<bool> {
        let key = self.claim(name)?;
        let path = self.baseline_dir.join(format!("{key}.png"));
        let created = create_exclusive(&path, bytes)?;
        if created {
            info!(name, path = %path.display(), "baseline created");
        }
        Ok(created)
    }

    fn save_actual(&self, name: &str, bytes: &[u8]) -> VisregResult<String> {
        let path = self.actual_path(name)?;
        write_creating_parents(&path, bytes)?;
        debug!(name, path = %path.display(), "actual capture saved");
        Ok(path.display().to_string())
    }

    fn save_diff(&self, name: &str, bytes: &[u8]) -> VisregResult<String> {
        let path = self.diff_path(name)?;
        write_creating_parents(&path, bytes)?;
        debug!(name, path = %path.display(), "diff image saved");
        Ok(path.display().to_string())
    }

    fn baseline_location(&self, name: &str) -> VisregResult<String> {
        Ok(self.baseline_path(name)?.display().to_string())
    }

    fn clear_artifacts(&self) -> VisregResult<()> {
        remove_dir_if_present(&self.actual_dir)?;
        remove_dir_if_present(&self.diff_dir)?;
        info!(
            actual_dir = %self.actual_dir.display(),
            diff_dir = %self.diff_dir.display(),
            "artifacts cleared"
        );
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryStore {
    owners: HashMap<String, String>,
    baselines: HashMap<String, Vec<u8>>,
    actuals: HashMap<String, Vec<u8>>,
    diffs: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    fn key_for(&self, name: &str) -> VisregResult<String> {
        let key = baseline_key(name)?;
        if let Some(owner) = self.owners.get(&key) {
            check_owner(&key, owner, name)?;
        }
        Ok(key)
    }

    fn claim(&mut self, name: &str) -> VisregResult<String> {
        let key = self.key_for(name)?;
        self.owners
            .entry(key.clone())
            .or_insert_with(|| name.to_string());
        Ok(key)
    }
}

/// In-memory repository for tests and dashboards
///
/// Locations are reported as `memory://<category>/<key>.png`. A key is
/// owned by the first name that stores a baseline under it.
#[derive(Debug, Default)]
pub struct MemoryBaselineRepository {
    store: Mutex<MemoryStore>,
}

impl MemoryBaselineRepository {
    /// Create an empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_store<T>(&self, f: impl FnOnce(&mut MemoryStore) -> T) -> T {
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut store)
    }

    /// Latest capture stored for `name`
    #[must_use]
    pub fn actual(&self, name: &str) -> Option<Vec<u8>> {
        let key = sanitize_name(name);
        self.with_store(|s| s.actuals.get(&key).cloned())
    }

    /// Diff image stored for `name`
    #[must_use]
    pub fn diff(&self, name: &str) -> Option<Vec<u8>> {
        let key = sanitize_name(name);
        self.with_store(|s| s.diffs.get(&key).cloned())
    }

    /// Number of stored baselines
    #[must_use]
    pub fn baseline_count(&self) -> usize {
        self.with_store(|s| s.baselines.len())
    }
}

impl BaselineRepository for MemoryBaselineRepository {
    fn save(&self, name: &str, bytes: &[u8]) -> VisregResult<()> {
        self.with_store(|s| {
            let key = s.claim(name)?;
            s.baselines.insert(key, bytes.to_vec());
            Ok(())
        })
    }

    fn load(&self, name: &str) -> VisregResult<Vec<u8>> {
        self.with_store(|s| {
            let key = s.key_for(name)?;
            s.baselines
                .get(&key)
                .cloned()
                .ok_or_else(|| VisregError::NotFound {
                    name: name.to_string(),
                    path: format!("memory://baseline/{key}.png"),
                })
        })
    }

    fn exists(&self, name: &str) -> VisregResult<bool> {
        self.with_store(|s| {
            let key = s.key_for(name)?;
            Ok(s.baselines.contains_key(&key))
        })
    }

    fn save_if_absent(&self, name: &str, bytes: &[u8]) -> VisregResult<bool> {
        self.with_store(|s| {
            let key = s.claim(name)?;
            if s.baselines.contains_key(&key) {
                return Ok(false);
            }
            s.baselines.insert(key, bytes.to_vec());
            Ok(true)
        })
    }

    fn save_actual(&self, name: &str, bytes: &[u8]) -> VisregResult<String> {
        self.with_store(|s| {
            let key = s.key_for(name)?;
            let location = format!("memory://actual/{key}.png");
            s.actuals.insert(key, bytes.to_vec());
            Ok(location)
        })
    }

    fn save_diff(&self, name: &str, bytes: &[u8]) -> VisregResult<String> {
        self.with_store(|s| {
            let key = s.key_for(name)?;
            let location = format!("memory://diff/{key}-diff.png");
            s.diffs.insert(key, bytes.to_vec());
            Ok(location)
        })
    }

    fn baseline_location(&self, name: &str) -> VisregResult<String> {
        self.with_store(|s| {
            let key = s.key_for(name)?;
            Ok(format!("memory://baseline/{key}.png"))
        })
    }

    fn clear_artifacts(&self) -> VisregResult<()> {
        self.with_store(|s| {
            s.actuals.clear();
            s.diffs.clear();
        });
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fs_repo(dir: &TempDir) -> FsBaselineRepository {
        FsBaselineRepository::from_config(&VisregConfig::new().with_root(dir.path()))
    }

    #[test]
    fn test_fs_save_load_exists() {
        let dir = TempDir::new().unwrap();
        let repo = fs_repo(&dir);

        assert!(!repo.exists("checkout summary").unwrap());
        repo.save("checkout summary", b"png-bytes").unwrap();
        assert!(repo.exists("checkout summary").unwrap());
        assert_eq!(repo.load("checkout summary").unwrap(), b"png-bytes");
        assert!(dir.path().join("baselines/checkout_summary.png").is_file());
    }

    #[test]
    fn test_fs_load_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = fs_repo(&dir).load("missing").unwrap_err();
        match err {
            VisregError::NotFound { name, path } => {
                assert_eq!(name, "missing");
                assert!(path.ends_with("missing.png"));
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_fs_update_overwrites() {
        let dir = TempDir::new().unwrap();
        let repo = fs_repo(&dir);
        repo.save("hero", b"old").unwrap();
        repo.update("hero", b"new").unwrap();
        assert_eq!(repo.load("hero").unwrap(), b"new");
    }

    #[test]
    fn test_fs_save_if_absent() {
        let dir = TempDir::new().unwrap();
        let repo = fs_repo(&dir);
        assert!(repo.save_if_absent("nav", b"first").unwrap());
        assert!(!repo.save_if_absent("nav", b"second").unwrap());
        assert_eq!(repo.load("nav").unwrap(), b"first");
    }

    #[test]
    fn test_fs_artifact_paths() {
        let dir = TempDir::new().unwrap();
        let repo = fs_repo(&dir);
        let actual = repo.save_actual("nav.bar", b"a").unwrap();
        let diff = repo.save_diff("nav.bar", b"d").unwrap();
        assert!(actual.ends_with("nav_bar.png"));
        assert!(diff.ends_with("nav_bar-diff.png"));
        assert!(dir.path().join("actual/nav_bar.png").is_file());
        assert!(dir.path().join("diffs/nav_bar-diff.png").is_file());
    }

    #[test]
    fn test_fs_clear_artifacts_keeps_baselines() {
        let dir = TempDir::new().unwrap();
        let repo = fs_repo(&dir);
        repo.save("footer", b"b").unwrap();
        repo.save_actual("footer", b"a").unwrap();
        repo.save_diff("footer", b"d").unwrap();

        repo.clear_artifacts().unwrap();

        assert!(repo.exists("footer").unwrap());
        assert!(!dir.path().join("actual").exists());
        assert!(!dir.path().join("diffs").exists());
        // clearing twice is fine
        repo.clear_artifacts().unwrap();
    }

    #[test]
    fn test_fs_collision_rejected() {
        let dir = TempDir::new().unwrap();
        let repo = fs_repo(&dir);
        repo.save("a/b", b"1").unwrap();
        let err = repo.save("a?b", b"2").unwrap_err();
        assert!(matches!(err, VisregError::Configuration { .. }));
        assert_eq!(repo.load("a/b").unwrap(), b"1");
    }

    #[test]
    fn test_fs_owner_survives_new_instance() {
        let dir = TempDir::new().unwrap();
        fs_repo(&dir).save("cart/summary", b"cart").unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("baselines/cart_summary.name")).unwrap(),
            "cart/summary"
        );

        let later = fs_repo(&dir);
        for err in [
            later.exists("cart summary").unwrap_err(),
            later.load("cart summary").unwrap_err(),
            later.save("cart summary", b"other").unwrap_err(),
            later.save_if_absent("cart summary", b"other").unwrap_err(),
            later.save_actual("cart summary", b"other").unwrap_err(),
        ] {
            assert!(matches!(err, VisregError::Configuration { .. }), "{err:?}");
            assert!(err.to_string().contains("both map to key 'cart_summary'"));
        }

        assert_eq!(later.load("cart/summary").unwrap(), b"cart");
        assert!(!dir.path().join("actual").exists());
    }

    #[test]
    fn test_fs_clear_artifacts_keeps_owners() {
        let dir = TempDir::new().unwrap();
        let repo = fs_repo(&dir);
        repo.save("a/b", b"1").unwrap();
        repo.clear_artifacts().unwrap();
        assert!(fs_repo(&dir).save("a b", b"2").is_err());
    }

    #[test]
    fn test_memory_collision_rejected() {
        let repo = MemoryBaselineRepository::new();
        // lookups alone do not claim a key
        assert!(!repo.exists("a b").unwrap());
        repo.save("a/b", b"1").unwrap();

        let err = repo.save("a b", b"2").unwrap_err();
        assert!(matches!(err, VisregError::Configuration { .. }));
        assert!(repo.exists("a b").is_err());
        assert_eq!(repo.load("a/b").unwrap(), b"1");
        assert_eq!(repo.baseline_count(), 1);
    }

    #[test]
    fn test_memory_repository() {
        let repo = MemoryBaselineRepository::new();
        assert!(matches!(
            repo.load("x").unwrap_err(),
            VisregError::NotFound { .. }
        ));
        assert!(repo.save_if_absent("x", b"1").unwrap());
        assert!(!repo.save_if_absent("x", b"2").unwrap());
        assert_eq!(repo.load("x").unwrap(), b"1");

        assert_eq!(repo.save_actual("x", b"a").unwrap(), "memory://actual/x.png");
        assert_eq!(repo.save_diff("x", b"d").unwrap(), "memory://diff/x-diff.png");
        assert_eq!(repo.actual("x").unwrap(), b"a");

        repo.clear_artifacts().unwrap();
        assert!(repo.actual("x").is_none());
        assert!(repo.diff("x").is_none());
        assert_eq!(repo.baseline_count(), 1);
    }
}
