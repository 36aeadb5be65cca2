//! Service layer providing business-oriented operations on top of models.
//! - Separates catalog/settings policy from data access.
//! - Reuses validation and entity definitions in `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod catalog;
pub mod settings;
pub mod storage;
pub mod runtime;
