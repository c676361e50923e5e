//! The Persistent Store.
//!
//! Owns the one `SessionDocument` of a run. Every accepted write is
//! validated, persisted and then announced to subscribers keyed by its
//! path. Bulk loads announce the wildcard path once.

mod observers;
mod transfer;

pub use observers::{Listener, Subscription};
pub use transfer::{
    EXPORT_PREFIX, EXPORT_VERSION, EXPORTED_AT_KEY, ExportFile, VERSION_KEY, export_document,
    export_filename,
};

use chrono::Utc;
use finer_core::document::path::lookup;
use finer_core::document::{ApiProvider, Section, Settings, WILDCARD_PATH};
use finer_core::storage::{
    API_KEY_KEY, API_PROVIDER_KEY, DEMO_MODE_KEY, DurableStorage, SESSION_STATE_KEY,
};
use finer_core::{FinerError, Result, SessionDocument};
use observers::Observers;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex, MutexGuard};

/// Path announced when the derived guideline changes as a side effect.
pub const GUIDELINE_SELECTED_PATH: &str = "guideline.selected";

/// A change to one global setting.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingUpdate {
    ApiKey(String),
    ApiProvider(ApiProvider),
    DemoMode(bool),
}

impl SettingUpdate {
    pub fn path(&self) -> &'static str {
        match self {
            Self::ApiKey(_) => "settings.apiKey",
            Self::ApiProvider(_) => "settings.apiProvider",
            Self::DemoMode(_) => "settings.demoMode",
        }
    }

    fn apply(&self, settings: &mut Settings) {
        match self {
            Self::ApiKey(key) => settings.api_key = key.trim().to_string(),
            Self::ApiProvider(provider) => settings.api_provider = *provider,
            Self::DemoMode(on) => settings.demo_mode = *on,
        }
    }
}

#[derive(Clone)]
pub struct PersistentStore {
    doc: Arc<Mutex<SessionDocument>>,
    storage: Arc<dyn DurableStorage>,
    observers: Observers,
}

impl PersistentStore {
    /// Opens a store with default sections and the persisted settings.
    ///
    /// The session blob is not read; call [`load_full_state`] to resume.
    ///
    /// [`load_full_state`]: Self::load_full_state
    pub fn open(storage: Arc<dyn DurableStorage>) -> Self {
        let settings = read_settings(storage.as_ref());
        Self {
            doc: Arc::new(Mutex::new(SessionDocument::with_settings(settings))),
            storage,
            observers: Observers::default(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionDocument> {
        self.doc.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> SessionDocument {
        self.lock().clone()
    }

    /// Runs `f` against the current document without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&SessionDocument) -> R) -> R {
        f(&self.lock())
    }

    pub fn settings(&self) -> Settings {
        self.read(|doc| doc.settings.clone())
    }

    /// Reads the value at a dotted path. The wildcard path yields the whole
    /// document.
    pub fn get(&self, path: &str) -> Option<Value> {
        let doc = self.lock();
        if path == WILDCARD_PATH {
            return doc.to_value().ok();
        }
        doc.get_path(path)
    }

    /// Replaces the value at `path`.
    ///
    /// Fails with `InvalidPath`, `InvalidValue` or `Invariant` and leaves the
    /// document untouched when the write does not fit. Persistence trouble
    /// is logged and never fails the write.
    pub fn set(&self, path: &str, value: Value) -> Result<()> {
        self.commit(path, |doc| doc.with_value_at(path, value))
    }

    /// Reads, transforms and writes back one path.
    pub fn update(&self, path: &str, f: impl FnOnce(Option<Value>) -> Value) -> Result<()> {
        let next = f(self.get(path));
        self.set(path, next)
    }

    /// Typed write of several fields, announced under `path`.
    ///
    /// `f` runs while the document is locked and must not call back into
    /// the store.
    pub fn mutate(&self, path: &str, f: impl FnOnce(&mut SessionDocument)) -> Result<()> {
        self.commit(path, |doc| {
            let mut candidate = doc.clone();
            f(&mut candidate);
            Ok(candidate)
        })
    }

    fn commit(
        &self,
        path: &str,
        build: impl FnOnce(&SessionDocument) -> Result<SessionDocument>,
    ) -> Result<()> {
        let (snapshot, derived_changed) = {
            let mut doc = self.lock();
            let mut candidate = match build(&*doc).and_then(|c| validate_write(path, c)) {
                Ok(candidate) => candidate,
                Err(e) => {
                    tracing::debug!("[Store] Rejected write to {}: {}", path, e);
                    return Err(e);
                }
            };

            let derived_changed = candidate.sync_derived();
            if derived_changed {
                tracing::info!(
                    "[Store] Guideline now {:?}; checklist cleared",
                    candidate.guideline.selected
                );
            }

            let settings_changed = candidate.settings != doc.settings;
            *doc = candidate;
            if is_settings_path(path) {
                if settings_changed {
                    self.persist_settings(&doc.settings);
                }
            } else {
                self.persist(&doc);
            }
            (doc.clone(), derived_changed)
        };

        self.observers.notify(path, &snapshot);
        if derived_changed && path != GUIDELINE_SELECTED_PATH {
            self.observers.notify(GUIDELINE_SELECTED_PATH, &snapshot);
        }
        Ok(())
    }

    /// Registers a listener for every accepted write and bulk load.
    pub fn subscribe(
        &self,
        listener: impl Fn(&str, &SessionDocument) + Send + Sync + 'static,
    ) -> Subscription {
        self.observers.add(Arc::new(listener))
    }

    pub fn subscriber_count(&self) -> usize {
        self.observers.len()
    }

    fn persist(&self, doc: &SessionDocument) {
        let result = transfer::session_blob(doc)
            .and_then(|blob| self.storage.set_item(SESSION_STATE_KEY, &blob));
        if let Err(e) = result {
            tracing::warn!("[Store] Failed to persist session: {}", e);
        }
    }

    fn persist_settings(&self, settings: &Settings) {
        let writes = [
            (API_KEY_KEY, settings.api_key.clone()),
            (DEMO_MODE_KEY, settings.demo_mode.to_string()),
            (API_PROVIDER_KEY, settings.api_provider.to_string()),
        ];
        for (key, value) in writes {
            if let Err(e) = self.storage.set_item(key, &value) {
                tracing::warn!("[Store] Failed to persist setting {}: {}", key, e);
            }
        }
    }

    /// Whether durable storage holds a session with real progress.
    ///
    /// Reads storage only. A blob with nothing but defaults reports false.
    pub fn has_saved_data(&self) -> bool {
        match self.storage.get_item(SESSION_STATE_KEY) {
            Ok(Some(blob)) => serde_json::from_str::<Value>(&blob)
                .map(|tree| has_progress(&tree))
                .unwrap_or(false),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!("[Store] Could not read saved session: {}", e);
                false
            }
        }
    }

    /// Overlays the saved session onto the document.
    ///
    /// Returns false, leaving the document as it was, when nothing usable is
    /// stored.
    pub fn load_full_state(&self) -> bool {
        let blob = match self.storage.get_item(SESSION_STATE_KEY) {
            Ok(Some(blob)) => blob,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!("[Store] Could not read saved session: {}", e);
                return false;
            }
        };
        let incoming = match serde_json::from_str::<Value>(&blob) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                tracing::warn!("[Store] Saved session is not an object; ignoring it");
                return false;
            }
            Err(e) => {
                tracing::warn!("[Store] Saved session is unreadable: {}", e);
                return false;
            }
        };

        match self.apply_overlay(&incoming, false) {
            Ok(sections) => {
                tracing::info!("[Store] Resumed {} sections", sections.len());
                true
            }
            Err(e) => {
                tracing::warn!("[Store] Saved session does not fit the model: {}", e);
                false
            }
        }
    }

    /// Produces the export file for the current document.
    pub fn export_to_json(&self) -> Result<ExportFile> {
        export_document(&self.snapshot(), Utc::now())
    }

    /// Applies an export file. A file that fails to parse changes nothing.
    pub fn import_from_json(&self, content: &str) -> Result<Vec<Section>> {
        let incoming = transfer::parse_import(content)?;
        let sections = self
            .apply_overlay(&incoming, true)
            .map_err(|e| FinerError::import(e.to_string()))?;
        tracing::info!("[Store] Imported {} sections", sections.len());
        Ok(sections)
    }

    fn apply_overlay(&self, incoming: &Map<String, Value>, persist: bool) -> Result<Vec<Section>> {
        let (snapshot, sections) = {
            let mut doc = self.lock();
            let (mut candidate, sections) = transfer::overlay_sections(&doc, incoming)?;
            candidate.settings = doc.settings.clone();
            for repair in candidate.repair_invariants() {
                tracing::warn!("[Store] Repaired loaded session: {}", repair);
            }
            candidate.sync_derived();
            *doc = candidate;
            if persist {
                self.persist(&doc);
            }
            (doc.clone(), sections)
        };
        self.observers.notify(WILDCARD_PATH, &snapshot);
        Ok(sections)
    }

    /// Writes one setting to the document and to its own storage key.
    pub fn save_setting(&self, update: SettingUpdate) -> Result<()> {
        let path = update.path();
        self.mutate(path, |doc| update.apply(&mut doc.settings))
    }

    /// Drops the saved session and returns every section but settings to
    /// its defaults.
    pub fn reset(&self) {
        if let Err(e) = self.storage.remove_item(SESSION_STATE_KEY) {
            tracing::warn!("[Store] Failed to clear saved session: {}", e);
        }
        let snapshot = {
            let mut doc = self.lock();
            *doc = SessionDocument::with_settings(doc.settings.clone());
            doc.clone()
        };
        tracing::info!("[Store] Session reset");
        self.observers.notify(WILDCARD_PATH, &snapshot);
    }
}

fn is_settings_path(path: &str) -> bool {
    path == "settings" || path.starts_with("settings.")
}

/// Invariants plus the rule that the cached guideline is never written
/// directly with a value its design does not imply.
fn validate_write(path: &str, candidate: SessionDocument) -> Result<SessionDocument> {
    candidate.check_invariants()?;
    let touches_guideline = path == "guideline" || path == GUIDELINE_SELECTED_PATH;
    if touches_guideline && candidate.guideline.selected.as_deref() != candidate.derived_guideline()
    {
        return Err(FinerError::invariant(
            "guideline.selected is derived from designProposal.selectedDesign",
        ));
    }
    Ok(candidate)
}

fn has_progress(tree: &Value) -> bool {
    let non_empty = |path: &str| {
        lookup(tree, path)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.trim().is_empty())
    };
    non_empty("seed.question")
        || lookup(tree, "seed.refinedResult").is_some_and(|v| !v.is_null())
        || non_empty("designProposal.selectedDesign")
}

fn read_settings(storage: &dyn DurableStorage) -> Settings {
    let mut settings = Settings::default();
    let read = |key: &str| match storage.get_item(key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("[Store] Could not read setting {}: {}", key, e);
            None
        }
    };

    if let Some(key) = read(API_KEY_KEY) {
        settings.api_key = key;
    }
    if let Some(demo) = read(DEMO_MODE_KEY) {
        settings.demo_mode = demo.trim() != "false";
    }
    if let Some(provider) = read(API_PROVIDER_KEY) {
        match provider.trim().parse::<ApiProvider>() {
            Ok(p) => settings.api_provider = p,
            Err(_) => tracing::warn!("[Store] Unknown provider '{}'; using default", provider),
        }
    }
    settings
}
