// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "storage/mod.rs"]
pub mod storage;

#[path = "moderation/mod.rs"]
pub mod moderation;

#[path = "resolutions/mod.rs"]
pub mod resolutions;
