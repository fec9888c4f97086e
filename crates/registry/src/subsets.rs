//! Command subsets: predefined groupings plus per-user custom ones.
//!
//! Custom subsets are stored one JSON file per user
//! (`~/.config/rconsole/command_subsets_<user>.json` on most platforms). There
//! is no cross-process locking; the last writer wins.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rconsole_types::{
    CUSTOM_SUBSET_PREFIX, CommandSubset, Locale, LocalizedText, SYSTEM_CREATOR, SubsetDraft, SubsetPatch,
    is_custom_subset_id,
};
use rconsole_util::{config_root, sanitize_file_component};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors surfaced by subset store operations.
#[derive(Debug, Error)]
pub enum SubsetStoreError {
    #[error("subset I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("subset serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("subset name must not be empty")]
    EmptyName,
    #[error("'{0}' is a predefined subset and cannot be changed")]
    Predefined(String),
}

struct PredefinedEntry {
    id: &'static str,
    name: LocalizedText,
    description: LocalizedText,
    command_ids: &'static [&'static str],
}

const PREDEFINED: &[PredefinedEntry] = &[
    PredefinedEntry {
        id: "maintenance",
        name: LocalizedText::new("Maintenance", "Mantenimiento"),
        description: LocalizedText::new(
            "Backups, restores, audits and updates",
            "Respaldos, restauraciones, auditorías y actualizaciones",
        ),
        command_ids: &["backup_data", "restore_data", "system_audit", "windows_compatibility", "update"],
    },
    PredefinedEntry {
        id: "web_management",
        name: LocalizedText::new("Web management", "Gestión web"),
        description: LocalizedText::new(
            "Web server control and web credentials",
            "Control del servidor web y credenciales web",
        ),
        command_ids: &["web_server", "web_credentials", "web_credentials_add", "web_credentials_remove"],
    },
    PredefinedEntry {
        id: "licensing",
        name: LocalizedText::new("Licensing", "Licenciamiento"),
        description: LocalizedText::new(
            "License activation and volume licenses",
            "Activación de licencias y licencias por volumen",
        ),
        command_ids: &[
            "activate_license",
            "license_reset",
            "vl_activate",
            "vl_enable",
            "vl_disable",
            "vl_update",
            "vl_credits_license",
            "vl_credits_support",
        ],
    },
    PredefinedEntry {
        id: "security",
        name: LocalizedText::new("Security", "Seguridad"),
        description: LocalizedText::new(
            "Two-factor authentication and Windows credentials",
            "Autenticación de dos factores y credenciales de Windows",
        ),
        command_ids: &[
            "2fa_resetuser",
            "2fa_addusers",
            "2fa_addgroups",
            "2fa_getusers",
            "2fa_deleteuser",
            "windowscredential_addorupdate",
            "windowscredential_remove",
        ],
    },
    PredefinedEntry {
        id: "farm_management",
        name: LocalizedText::new("Farm management", "Gestión de granja"),
        description: LocalizedText::new("Sessions and load balancing", "Sesiones y balanceo de carga"),
        command_ids: &["farm_sessions_monitor", "farm_loadbalancing", "session_manager"],
    },
    PredefinedEntry {
        id: "printer_management",
        name: LocalizedText::new("Printer management", "Gestión de impresoras"),
        description: LocalizedText::new("Universal Printer setup", "Instalación de la Impresora Universal"),
        command_ids: &["install_printer", "remove_printer"],
    },
    PredefinedEntry {
        id: "proxy_management",
        name: LocalizedText::new("Proxy management", "Gestión de proxy"),
        description: LocalizedText::new("Internet proxy settings", "Configuración del proxy de Internet"),
        command_ids: &["proxy_set"],
    },
];

/// The built-in subsets, labelled in `locale`.
pub fn predefined_subsets(locale: Locale) -> Vec<CommandSubset> {
    PREDEFINED
        .iter()
        .map(|entry| CommandSubset {
            id: entry.id.to_string(),
            name: entry.name.get(locale).to_string(),
            description: Some(entry.description.get(locale).to_string()),
            command_ids: entry.command_ids.iter().map(|id| id.to_string()).collect(),
            created_by: Some(SYSTEM_CREATOR.to_string()),
            created_at: None,
            updated_at: None,
        })
        .collect()
}

/// Persistence for user-created subsets.
pub trait SubsetStore: Send + Sync {
    fn list_custom(&self, user_id: &str) -> Result<Vec<CommandSubset>, SubsetStoreError>;

    /// Assigns a `custom_<millis>` id, the creator and both timestamps.
    fn create(&self, user_id: &str, draft: SubsetDraft) -> Result<CommandSubset, SubsetStoreError>;

    /// Returns `None` when the user has no subset with `id`.
    fn update(&self, user_id: &str, id: &str, patch: SubsetPatch) -> Result<Option<CommandSubset>, SubsetStoreError>;

    /// Returns whether anything was removed.
    fn delete(&self, user_id: &str, id: &str) -> Result<bool, SubsetStoreError>;
}

/// Predefined subsets followed by the custom subsets `user_id` created.
pub fn all_subsets_for_user(
    store: &dyn SubsetStore,
    user_id: &str,
    locale: Locale,
) -> Result<Vec<CommandSubset>, SubsetStoreError> {
    let mut subsets = predefined_subsets(locale);
    subsets.extend(
        store
            .list_custom(user_id)?
            .into_iter()
            .filter(|subset| subset.created_by.as_deref() == Some(user_id)),
    );
    Ok(subsets)
}

/// Find a subset by id among the predefined and the user's custom subsets.
pub fn find_subset(
    store: &dyn SubsetStore,
    user_id: &str,
    id: &str,
    locale: Locale,
) -> Result<Option<CommandSubset>, SubsetStoreError> {
    Ok(all_subsets_for_user(store, user_id, locale)?
        .into_iter()
        .find(|subset| subset.id == id))
}

fn guard_custom(id: &str) -> Result<(), SubsetStoreError> {
    if !is_custom_subset_id(id) && PREDEFINED.iter().any(|entry| entry.id == id) {
        return Err(SubsetStoreError::Predefined(id.to_string()));
    }
    Ok(())
}

fn next_custom_id(existing: &[CommandSubset], now: DateTime<Utc>) -> String {
    let mut millis = now.timestamp_millis();
    loop {
        let candidate = format!("{CUSTOM_SUBSET_PREFIX}{millis}");
        if !existing.iter().any(|subset| subset.id == candidate) {
            return candidate;
        }
        millis += 1;
    }
}

fn create_in(subsets: &mut Vec<CommandSubset>, user_id: &str, draft: SubsetDraft) -> Result<CommandSubset, SubsetStoreError> {
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(SubsetStoreError::EmptyName);
    }
    let now = Utc::now();
    let subset = CommandSubset {
        id: next_custom_id(subsets, now),
        name: name.to_string(),
        description: draft.description.filter(|description| !description.trim().is_empty()),
        command_ids: draft.command_ids,
        created_by: Some(user_id.to_string()),
        created_at: Some(now),
        updated_at: Some(now),
    };
    subsets.push(subset.clone());
    Ok(subset)
}

fn update_in(subsets: &mut [CommandSubset], id: &str, patch: SubsetPatch) -> Result<Option<CommandSubset>, SubsetStoreError> {
    guard_custom(id)?;
    if patch.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
        return Err(SubsetStoreError::EmptyName);
    }
    let Some(subset) = subsets.iter_mut().find(|subset| subset.id == id) else {
        return Ok(None);
    };
    patch.apply_to(subset);
    subset.updated_at = Some(Utc::now());
    Ok(Some(subset.clone()))
}

fn delete_in(subsets: &mut Vec<CommandSubset>, id: &str) -> Result<bool, SubsetStoreError> {
    guard_custom(id)?;
    let before = subsets.len();
    subsets.retain(|subset| subset.id != id);
    Ok(subsets.len() != before)
}

/// JSON-backed store, one file per user under a root directory.
pub struct JsonSubsetStore {
    root: PathBuf,
    io_lock: Mutex<()>,
}

impl JsonSubsetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            io_lock: Mutex::new(()),
        }
    }

    /// Store rooted at the console's configuration directory.
    pub fn with_defaults() -> Self {
        Self::new(config_root())
    }

    pub fn path_for(&self, user_id: &str) -> PathBuf {
        self.root
            .join(format!("command_subsets_{}.json", sanitize_file_component(user_id)))
    }

    fn read(&self, path: &Path) -> Result<Vec<CommandSubset>, SubsetStoreError> {
        match fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(subsets) => Ok(subsets),
                Err(error) => {
                    warn!(
                        path = %path.display(),
                        error = %error,
                        "Failed to parse custom subsets; treating as empty"
                    );
                    Ok(Vec::new())
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(error) => Err(SubsetStoreError::Io(error)),
        }
    }

    fn write(&self, path: &Path, subsets: &[CommandSubset]) -> Result<(), SubsetStoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(subsets)?)?;
        debug!(path = %path.display(), count = subsets.len(), "custom subsets saved");
        Ok(())
    }

    fn modify<R>(
        &self,
        user_id: &str,
        change: impl FnOnce(&mut Vec<CommandSubset>) -> Result<R, SubsetStoreError>,
        changed: impl Fn(&R) -> bool,
    ) -> Result<R, SubsetStoreError> {
        let _guard = self.io_lock.lock().expect("subset lock poisoned");
        let path = self.path_for(user_id);
        let mut subsets = self.read(&path)?;
        let result = change(&mut subsets)?;
        if changed(&result) {
            self.write(&path, &subsets)?;
        }
        Ok(result)
    }
}

impl SubsetStore for JsonSubsetStore {
    fn list_custom(&self, user_id: &str) -> Result<Vec<CommandSubset>, SubsetStoreError> {
        let _guard = self.io_lock.lock().expect("subset lock poisoned");
        self.read(&self.path_for(user_id))
    }

    fn create(&self, user_id: &str, draft: SubsetDraft) -> Result<CommandSubset, SubsetStoreError> {
        self.modify(user_id, |subsets| create_in(subsets, user_id, draft), |_| true)
    }

    fn update(&self, user_id: &str, id: &str, patch: SubsetPatch) -> Result<Option<CommandSubset>, SubsetStoreError> {
        self.modify(user_id, |subsets| update_in(subsets, id, patch), Option::is_some)
    }

    fn delete(&self, user_id: &str, id: &str) -> Result<bool, SubsetStoreError> {
        self.modify(user_id, |subsets| delete_in(subsets, id), |removed| *removed)
    }
}

/// In-memory subset store primarily used for unit testing.
#[derive(Default)]
pub struct InMemorySubsetStore {
    subsets: Mutex<HashMap<String, Vec<CommandSubset>>>,
}

impl InMemorySubsetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SubsetStore for InMemorySubsetStore {
    fn list_custom(&self, user_id: &str) -> Result<Vec<CommandSubset>, SubsetStoreError> {
        let subsets = self.subsets.lock().expect("subset lock poisoned");
        Ok(subsets.get(user_id).cloned().unwrap_or_default())
    }

    fn create(&self, user_id: &str, draft: SubsetDraft) -> Result<CommandSubset, SubsetStoreError> {
        let mut subsets = self.subsets.lock().expect("subset lock poisoned");
        create_in(subsets.entry(user_id.to_string()).or_default(), user_id, draft)
    }

    fn update(&self, user_id: &str, id: &str, patch: SubsetPatch) -> Result<Option<CommandSubset>, SubsetStoreError> {
        let mut subsets = self.subsets.lock().expect("subset lock poisoned");
        update_in(subsets.entry(user_id.to_string()).or_default(), id, patch)
    }

    fn delete(&self, user_id: &str, id: &str) -> Result<bool, SubsetStoreError> {
        let mut subsets = self.subsets.lock().expect("subset lock poisoned");
        delete_in(subsets.entry(user_id.to_string()).or_default(), id)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::catalog::CommandCatalog;

    fn draft(name: &str, ids: &[&str]) -> SubsetDraft {
        SubsetDraft {
            name: name.into(),
            description: None,
            command_ids: ids.iter().map(|id| id.to_string()).collect(),
        }
    }

    #[test]
    fn predefined_subsets_reference_catalog_commands() {
        let catalog = CommandCatalog::default();
        for subset in predefined_subsets(Locale::En) {
            assert!(!subset.is_custom());
            assert_eq!(subset.created_by.as_deref(), Some(SYSTEM_CREATOR));
            for id in &subset.command_ids {
                assert!(catalog.contains(id), "{} references unknown {id}", subset.id);
            }
        }
    }

    #[test]
    fn json_store_persists_per_user() {
        let dir = tempdir().unwrap();
        let store = JsonSubsetStore::new(dir.path());

        let created = store.create("ana", draft("Daily", &["update", "system_audit"])).unwrap();
        assert!(created.id.starts_with(CUSTOM_SUBSET_PREFIX));
        assert_eq!(created.created_by.as_deref(), Some("ana"));
        assert!(store.path_for("ana").exists());

        let reopened = JsonSubsetStore::new(dir.path());
        assert_eq!(reopened.list_custom("ana").unwrap(), vec![created.clone()]);
        assert!(reopened.list_custom("luis").unwrap().is_empty());
    }

    #[test]
    fn ids_do_not_collide_within_the_same_millisecond() {
        let store = InMemorySubsetStore::new();
        let first = store.create("ana", draft("One", &[])).unwrap();
        let second = store.create("ana", draft("Two", &[])).unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn update_merges_patch_and_bumps_timestamp() {
        let dir = tempdir().unwrap();
        let store = JsonSubsetStore::new(dir.path());
        let created = store.create("ana", draft("Daily", &["update"])).unwrap();

        let updated = store
            .update(
                "ana",
                &created.id,
                SubsetPatch {
                    command_ids: Some(vec!["backup_data".into()]),
                    ..Default::default()
                },
            )
            .unwrap()
            .expect("existing subset");

        assert_eq!(updated.name, "Daily");
        assert_eq!(updated.command_ids, vec!["backup_data".to_string()]);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(store.update("ana", "custom_0", SubsetPatch::default()).unwrap(), None);
    }

    #[test]
    fn delete_reports_whether_anything_was_removed() {
        let store = InMemorySubsetStore::new();
        let created = store.create("ana", draft("Daily", &[])).unwrap();
        assert!(store.delete("ana", &created.id).unwrap());
        assert!(!store.delete("ana", &created.id).unwrap());
    }

    #[test]
    fn predefined_subsets_are_read_only() {
        let store = InMemorySubsetStore::new();
        assert!(matches!(store.delete("ana", "licensing"), Err(SubsetStoreError::Predefined(_))));
        assert!(matches!(
            store.update("ana", "security", SubsetPatch::default()),
            Err(SubsetStoreError::Predefined(_))
        ));
        assert!(matches!(store.create("ana", draft("  ", &[])), Err(SubsetStoreError::EmptyName)));
    }

    #[test]
    fn user_view_lists_predefined_then_own_subsets() {
        let dir = tempdir().unwrap();
        let store = JsonSubsetStore::new(dir.path());
        store.create("ana", draft("Mine", &["update"])).unwrap();
        store.create("luis", draft("His", &["update"])).unwrap();

        let subsets = all_subsets_for_user(&store, "ana", Locale::Es).unwrap();
        assert_eq!(subsets.len(), PREDEFINED.len() + 1);
        assert_eq!(subsets[0].name, "Mantenimiento");
        assert_eq!(subsets.last().unwrap().name, "Mine");
        assert!(find_subset(&store, "ana", "licensing", Locale::En).unwrap().is_some());
    }

    #[test]
    fn unreadable_file_degrades_to_empty() {
        let dir = tempdir().unwrap();
        let store = JsonSubsetStore::new(dir.path());
        fs::write(store.path_for("ana"), "not json").unwrap();
        assert!(store.list_custom("ana").unwrap().is_empty());
    }
}
