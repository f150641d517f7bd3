//! Observability vocabulary.
//!
//! Library code emits `tracing` events using the names in [`events`] and the field
//! keys/formatters in [`fields`]. It never installs a global subscriber; binaries and
//! tests own `tracing_subscriber` initialization.

pub mod events;
pub mod fields;
