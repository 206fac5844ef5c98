// Resolutions feature - the cards visitors share, like and delete.

pub mod resolution_models;
pub mod resolution_service;

pub use resolution_models::*;
pub use resolution_service::*;
