//! Template tree loading

pub mod embedded_repository;
pub mod filesystem_loader;
pub mod types;

pub use embedded_repository::*;
pub use filesystem_loader::*;
pub use types::*;
