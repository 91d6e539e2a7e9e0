//! Store facade that ties the in-memory account to its persistence.

pub mod account_store;
pub mod utils;

pub use account_store::{AccountStore, LoadMetadata};
