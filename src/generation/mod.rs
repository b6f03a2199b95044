//! Generation domain module - orchestrates code generation workflow
//!
//! This module holds the pipeline itself: the type reference graph and its
//! resolver, the import registry and aggregator, extraction of operations and
//! models, and the orchestrator that drives rendering and output.

pub mod errors;
pub mod extractor;
pub mod imports;
pub mod orchestrator;
pub mod references;
pub mod traits;
pub mod types;
pub mod utils;

pub use errors::*;
pub use extractor::*;
pub use imports::*;
pub use orchestrator::*;
pub use references::*;
pub use traits::*;
pub use types::*;
