//! Durable key/value storage seam.
//!
//! The store depends only on this trait; file-backed and in-memory
//! implementations live in the infrastructure crate.

use crate::error::Result;

/// Key holding the session blob (every section except settings).
pub const SESSION_STATE_KEY: &str = "session-state";
/// Key holding the API key, independent of the session blob.
pub const API_KEY_KEY: &str = "session-api-key";
/// Key holding `"true"`/`"false"` for demo mode.
pub const DEMO_MODE_KEY: &str = "session-demo-mode";
/// Key holding the selected provider.
pub const API_PROVIDER_KEY: &str = "session-api-provider";

/// Text-valued durable storage.
///
/// Writes must replace the previous value atomically: a failed `set_item`
/// leaves the old value readable.
pub trait DurableStorage: Send + Sync {
    /// Returns the value for `key`, or `None` when absent.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;
}
