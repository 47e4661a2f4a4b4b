//! Event types published by the engine.
//!
//! All types derive `serde::Serialize` + `serde::Deserialize` so hosts can
//! forward them as JSON (the CLI prints one event per line).

pub mod events;
