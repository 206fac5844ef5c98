// Core storage module - typed persistent values over a pluggable medium.

pub mod kv_medium;
pub mod persistent_value;
pub mod schema_gate;

pub use kv_medium::*;
pub use persistent_value::*;
pub use schema_gate::*;
