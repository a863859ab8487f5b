//! Classification, validation, encoding, and inspection of media sources.
//!
//! # Submodules
//! - `models`: media categories, the MIME lookup tables, and [`FileInfo`]
//! - `service`: [`FileService`] and the [`is_url`] classifier

mod models;
mod service;

pub use models::*;
pub use service::*;
