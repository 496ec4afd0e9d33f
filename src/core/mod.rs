//! Core module - catalog store, naming rules and configuration

pub mod catalog;
pub mod config;
pub mod error;
pub mod taxonomy;

pub use catalog::Catalog;
pub use config::Config;
pub use error::{CatalogError, ErrorKind, Result};
pub use taxonomy::{slugify, Binomial, Rank};
