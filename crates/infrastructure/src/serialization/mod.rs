//! Deterministic JSON serialization for settings files.
//!
//! Output is pretty-printed with 2-space indentation and a trailing
//! newline so hand-edited and generated files diff cleanly.

mod json;

pub use json::{SerializationError, from_json_bytes, to_json_stable};
