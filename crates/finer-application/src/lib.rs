//! Application layer for FINER.
//!
//! This crate holds the Persistent Store, the context object passed to
//! every step controller, the controllers themselves and the prompt
//! templates they render.

pub mod context;
pub mod prompts;
pub mod steps;
pub mod store;
pub mod summary;

pub use context::{RequestDefaults, WizardContext, gateway_config};
pub use store::{ExportFile, PersistentStore, SettingUpdate, Subscription};
pub use summary::SessionSummary;
