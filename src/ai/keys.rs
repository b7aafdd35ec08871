//! Key Manager
//!
//! Process-wide credential state. Exactly one credential is active at a
//! time, resolved from two sources with fixed precedence: an
//! operator-supplied key (config/env, deploy-time) wins over a user-entered
//! key in the backing store.
//!
//! Resolution is lazy and idempotent: every availability check and every
//! client request re-reads the backing store first, so a credential changed
//! by another process sharing the store is observed without notification.
//! A credential that fails client construction is dropped from the cache,
//! and evicted from the backing store when it came from there, so one bad
//! stored key cannot wedge every subsequent call.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use super::provider::{GeminiModel, SharedModel};
use crate::config::{ConfigLoader, ModelConfig};
use crate::types::{Result, StudyError};

/// Environment variable consulted when the config carries no operator key
const OPERATOR_KEY_ENV: &str = "GEMINI_API_KEY";

// =============================================================================
// Credential Store
// =============================================================================

/// Backing store for the user-entered credential: a single named entry,
/// read and written only by the Key Manager.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Option<String>;
    fn save(&self, value: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// File-backed credential store in the user config directory
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the default per-user location
    pub fn open_default() -> Result<Self> {
        let path = ConfigLoader::credential_path().ok_or_else(|| {
            StudyError::Config("Cannot determine credential store location".to_string())
        })?;
        Ok(Self::new(path))
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Option<String> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    fn save(&self, value: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, value)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for embedding hosts and tests
#[derive(Default)]
pub struct MemoryCredentialStore {
    value: Mutex<Option<String>>,
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Option<String> {
        self.value.lock().expect("credential store poisoned").clone()
    }

    fn save(&self, value: &str) -> Result<()> {
        *self.value.lock().expect("credential store poisoned") = Some(value.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.value.lock().expect("credential store poisoned") = None;
        Ok(())
    }
}

// =============================================================================
// Key Manager
// =============================================================================

/// Which source the active credential came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// Deploy-time, from config or environment
    Operator,
    /// Runtime-entered, from the backing store
    User,
}

struct ResolvedCredential {
    key: SecretString,
    source: KeySource,
    client: SharedModel,
}

/// Single owner of the active credential and the model client built from it
pub struct KeyManager {
    operator_key: Option<SecretString>,
    model_config: ModelConfig,
    store: Box<dyn CredentialStore>,
    state: Mutex<Option<ResolvedCredential>>,
}

impl KeyManager {
    pub fn new(model_config: ModelConfig, store: Box<dyn CredentialStore>) -> Self {
        let operator_key = model_config
            .api_key
            .clone()
            .or_else(|| std::env::var(OPERATOR_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
            .map(SecretString::from);

        Self {
            operator_key,
            model_config,
            store,
            state: Mutex::new(None),
        }
    }

    /// Whether any credential is currently usable. Re-reads the backing
    /// store first, so a key set in another context is picked up here.
    pub fn has_credential(&self) -> bool {
        let mut state = self.state.lock().expect("key state poisoned");
        self.resolve(&mut state);
        state.is_some()
    }

    /// Where the active credential came from, if one is resolved
    pub fn credential_source(&self) -> Option<KeySource> {
        let mut state = self.state.lock().expect("key state poisoned");
        self.resolve(&mut state);
        state.as_ref().map(|resolved| resolved.source)
    }

    /// Persist a user-entered credential and re-resolve immediately
    pub fn set_user_credential(&self, value: &str) -> Result<()> {
        self.store.save(value)?;
        let mut state = self.state.lock().expect("key state poisoned");
        self.resolve(&mut state);
        Ok(())
    }

    /// Remove the stored user credential and drop it from the cache
    pub fn clear_user_credential(&self) -> Result<()> {
        self.store.clear()?;
        let mut state = self.state.lock().expect("key state poisoned");
        self.resolve(&mut state);
        Ok(())
    }

    /// The model client for the active credential. Triggers resolution once
    /// more and fails with `CredentialMissing` if still unresolved, so the
    /// caller can prompt for a key rather than show a generic failure.
    pub fn client(&self) -> Result<SharedModel> {
        let mut state = self.state.lock().expect("key state poisoned");
        self.resolve(&mut state);
        state
            .as_ref()
            .map(|resolved| Arc::clone(&resolved.client))
            .ok_or(StudyError::CredentialMissing)
    }

    /// Re-derive the active credential. Idempotent: resolving to the same
    /// key keeps the existing client; a changed key rebuilds it. A key that
    /// fails construction clears the cache, and is evicted from the backing
    /// store when the failing value is the stored one.
    fn resolve(&self, state: &mut Option<ResolvedCredential>) {
        let stored = self.store.load();

        let (candidate, source) = match (&self.operator_key, &stored) {
            (Some(operator), _) => (Some(operator.expose_secret().to_string()), KeySource::Operator),
            (None, Some(user)) => (Some(user.clone()), KeySource::User),
            (None, None) => (None, KeySource::User),
        };

        let Some(key) = candidate else {
            *state = None;
            return;
        };

        let unchanged = state
            .as_ref()
            .is_some_and(|resolved| resolved.key.expose_secret() == key);
        if unchanged {
            return;
        }

        match GeminiModel::new(SecretString::from(key.clone()), &self.model_config) {
            Ok(client) => {
                debug!(source = ?source, "model client (re)initialized");
                *state = Some(ResolvedCredential {
                    key: SecretString::from(key),
                    source,
                    client: Arc::new(client),
                });
            }
            Err(e) => {
                warn!("failed to initialize model client with resolved key: {}", e);
                *state = None;
                if stored.as_deref() == Some(key.as_str())
                    && let Err(clear_err) = self.store.clear()
                {
                    warn!("failed to evict bad stored credential: {}", clear_err);
                }
            }
        }
    }
}

impl std::fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyManager")
            .field("operator_key", &self.operator_key.as_ref().map(|_| "[REDACTED]"))
            .field("model_config", &self.model_config)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_with(operator: Option<&str>, stored: Option<&str>) -> KeyManager {
        let store = MemoryCredentialStore::default();
        if let Some(value) = stored {
            store.save(value).unwrap();
        }
        let config = ModelConfig {
            api_key: operator.map(String::from),
            ..ModelConfig::default()
        };
        let mut manager = KeyManager::new(config, Box::new(store));
        if operator.is_none() {
            // Keep the test hermetic even when the env fallback is set.
            manager.operator_key = None;
        }
        manager
    }

    #[test]
    fn test_operator_key_wins() {
        let manager = manager_with(Some("operator-key"), Some("user-key"));
        assert!(manager.has_credential());
        assert_eq!(manager.credential_source(), Some(KeySource::Operator));
    }

    #[test]
    fn test_user_key_used_when_no_operator() {
        let manager = manager_with(None, Some("user-key"));
        assert!(manager.has_credential());
        assert_eq!(manager.credential_source(), Some(KeySource::User));
    }

    #[test]
    fn test_no_credential() {
        let config = ModelConfig::default();
        // Bypass the env fallback so the test is hermetic.
        let mut manager =
            KeyManager::new(config, Box::new(MemoryCredentialStore::default()));
        manager.operator_key = None;

        assert!(!manager.has_credential());
        assert_eq!(manager.credential_source(), None);
        assert!(matches!(
            manager.client(),
            Err(StudyError::CredentialMissing)
        ));
    }

    #[test]
    fn test_set_user_credential_resolves() {
        let config = ModelConfig::default();
        let mut manager =
            KeyManager::new(config, Box::new(MemoryCredentialStore::default()));
        manager.operator_key = None;

        assert!(!manager.has_credential());
        manager.set_user_credential("fresh-key").unwrap();
        assert!(manager.has_credential());
        assert!(manager.client().is_ok());
    }

    #[test]
    fn test_store_change_observed_without_notification() {
        let store = Arc::new(MemoryCredentialStore::default());

        struct SharedStore(Arc<MemoryCredentialStore>);
        impl CredentialStore for SharedStore {
            fn load(&self) -> Option<String> {
                self.0.load()
            }
            fn save(&self, value: &str) -> Result<()> {
                self.0.save(value)
            }
            fn clear(&self) -> Result<()> {
                self.0.clear()
            }
        }

        let mut manager = KeyManager::new(
            ModelConfig::default(),
            Box::new(SharedStore(Arc::clone(&store))),
        );
        manager.operator_key = None;
        assert!(!manager.has_credential());

        // Another execution context writes the shared store directly.
        store.save("out-of-band-key").unwrap();
        assert!(manager.has_credential());
        assert_eq!(manager.credential_source(), Some(KeySource::User));
    }

    #[test]
    fn test_bad_stored_credential_is_evicted() {
        let store = Arc::new(MemoryCredentialStore::default());
        // Whitespace-only keys fail client construction.
        store.save("   ").unwrap();

        struct SharedStore(Arc<MemoryCredentialStore>);
        impl CredentialStore for SharedStore {
            fn load(&self) -> Option<String> {
                self.0.load()
            }
            fn save(&self, value: &str) -> Result<()> {
                self.0.save(value)
            }
            fn clear(&self) -> Result<()> {
                self.0.clear()
            }
        }

        let mut manager = KeyManager::new(
            ModelConfig::default(),
            Box::new(SharedStore(Arc::clone(&store))),
        );
        manager.operator_key = None;

        assert!(!manager.has_credential());
        // The unusable key was evicted so later resolutions start clean.
        assert!(store.load().is_none());
    }
}
