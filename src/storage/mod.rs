//! Session-to-session memory for card profiles and balances.
//!
//! Nicknames and APRs rarely change, so they are stored separately from
//! the balances the user refreshes every run. The simulator core never
//! reads this store; the CLI resolves stored values into [`Card`]s first.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::{PayoffError, Result};
use crate::registry::Card;

pub const STORE_SCHEMA_VERSION: u32 = 1;

const PROFILES_FILE: &str = "profiles.json";
const BALANCES_FILE: &str = "balances.json";
const BACKUPS_DIR: &str = "backups";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
const BACKUP_RETENTION: usize = 5;

/// Nickname + APR pair remembered between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardProfile {
    pub nickname: String,
    pub apr: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCards {
    pub schema_version: u32,
    pub profiles: Vec<CardProfile>,
}

impl Default for StoredCards {
    fn default() -> Self {
        Self {
            schema_version: STORE_SCHEMA_VERSION,
            profiles: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredBalances {
    pub schema_version: u32,
    pub balances: BTreeMap<String, f64>,
}

impl Default for StoredBalances {
    fn default() -> Self {
        Self {
            schema_version: STORE_SCHEMA_VERSION,
            balances: BTreeMap::new(),
        }
    }
}

/// JSON-file store rooted in the app data directory (override-able for
/// tests). Writes are atomic: tmp file then rename.
#[derive(Clone)]
pub struct JsonStore {
    root: PathBuf,
    profiles_file: PathBuf,
    balances_file: PathBuf,
    backups_dir: PathBuf,
}

impl JsonStore {
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let root = root.unwrap_or_else(default_base_dir);
        ensure_dir(&root)?;
        let backups_dir = root.join(BACKUPS_DIR);
        Ok(Self {
            profiles_file: root.join(PROFILES_FILE),
            balances_file: root.join(BALANCES_FILE),
            backups_dir,
            root,
        })
    }

    pub fn open_default() -> Result<Self> {
        Self::new(None)
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn load_profiles(&self) -> Result<StoredCards> {
        let stored: StoredCards = self.read_or_default(&self.profiles_file)?;
        check_schema(stored.schema_version, &self.profiles_file)?;
        Ok(stored)
    }

    pub fn save_profiles(&self, stored: &StoredCards) -> Result<()> {
        self.backup_existing(&self.profiles_file)?;
        self.write_json(&self.profiles_file, stored)
    }

    pub fn load_balances(&self) -> Result<StoredBalances> {
        let stored: StoredBalances = self.read_or_default(&self.balances_file)?;
        check_schema(stored.schema_version, &self.balances_file)?;
        Ok(stored)
    }

    pub fn save_balances(&self, stored: &StoredBalances) -> Result<()> {
        self.backup_existing(&self.balances_file)?;
        self.write_json(&self.balances_file, stored)
    }

    pub fn reset_profiles(&self) -> Result<()> {
        remove_if_present(&self.profiles_file)
    }

    pub fn reset_balances(&self) -> Result<()> {
        remove_if_present(&self.balances_file)
    }

    fn read_or_default<T>(&self, path: &Path) -> Result<T>
    where
        T: Default + for<'de> Deserialize<'de>,
    {
        if path.exists() {
            let data = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(T::default())
        }
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        let tmp = tmp_path(path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    fn backup_existing(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        ensure_dir(&self.backups_dir)?;
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("store");
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let backup = self
            .backups_dir
            .join(format!("{}_{}.json", stem, timestamp));
        fs::copy(path, &backup)?;
        self.prune_backups(stem)?;
        Ok(())
    }

    fn prune_backups(&self, stem: &str) -> Result<()> {
        let mut backups: Vec<PathBuf> = fs::read_dir(&self.backups_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension().and_then(|ext| ext.to_str()) == Some("json")
                    && path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .map(|name| name.starts_with(stem))
                        .unwrap_or(false)
            })
            .collect();
        backups.sort();
        backups.reverse();
        for stale in backups.iter().skip(BACKUP_RETENTION) {
            let _ = fs::remove_file(stale);
        }
        Ok(())
    }
}

/// Joins remembered profiles with remembered balances into simulator
/// input. Balances default to zero for cards with no stored value.
pub fn resolve_cards(profiles: &StoredCards, balances: &StoredBalances) -> Result<Vec<Card>> {
    profiles
        .profiles
        .iter()
        .map(|profile| {
            let balance = balances
                .balances
                .get(&profile.nickname)
                .copied()
                .unwrap_or(0.0)
                .max(0.0);
            Card::new(profile.nickname.clone(), balance, profile.apr)
        })
        .collect()
}

fn default_base_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("payoff_core")
}

fn check_schema(version: u32, path: &Path) -> Result<()> {
    if version > STORE_SCHEMA_VERSION {
        return Err(PayoffError::Storage(format!(
            "`{}` is from a newer schema version ({} > {})",
            path.display(),
            version,
            STORE_SCHEMA_VERSION
        )));
    }
    Ok(())
}

fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

fn remove_if_present(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with_temp_dir() -> (JsonStore, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let store = JsonStore::new(Some(temp.path().to_path_buf())).expect("json store");
        (store, temp)
    }

    #[test]
    fn profiles_roundtrip() {
        let (store, _guard) = store_with_temp_dir();
        let stored = StoredCards {
            schema_version: STORE_SCHEMA_VERSION,
            profiles: vec![CardProfile {
                nickname: "Chase".into(),
                apr: 27.49,
            }],
        };
        store.save_profiles(&stored).expect("save profiles");
        let loaded = store.load_profiles().expect("load profiles");
        assert_eq!(loaded, stored);
    }

    #[test]
    fn missing_files_yield_defaults() {
        let (store, _guard) = store_with_temp_dir();
        assert!(store.load_profiles().expect("profiles").profiles.is_empty());
        assert!(store.load_balances().expect("balances").balances.is_empty());
    }

    #[test]
    fn newer_schema_is_rejected() {
        let (store, guard) = store_with_temp_dir();
        let raw = format!(
            "{{\"schema_version\": {}, \"profiles\": []}}",
            STORE_SCHEMA_VERSION + 1
        );
        fs::write(guard.path().join(PROFILES_FILE), raw).expect("write raw");
        assert!(matches!(
            store.load_profiles(),
            Err(PayoffError::Storage(_))
        ));
    }

    #[test]
    fn saving_again_keeps_timestamped_backup() {
        let (store, guard) = store_with_temp_dir();
        let mut stored = StoredBalances::default();
        stored.balances.insert("Chase".into(), 1000.0);
        store.save_balances(&stored).expect("first save");
        stored.balances.insert("Chase".into(), 900.0);
        store.save_balances(&stored).expect("second save");
        let backups: Vec<_> = fs::read_dir(guard.path().join(BACKUPS_DIR))
            .expect("backups dir")
            .collect();
        assert!(!backups.is_empty(), "expected a backup of the first save");
    }
}
