//! The Session Document: typed model, dotted-path access and invariants.

mod invariants;
pub mod model;
pub mod path;

pub use model::*;
pub use path::WILDCARD_PATH;
