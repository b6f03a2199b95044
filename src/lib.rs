//! fastapi-codegen - generates FastAPI application code from OpenAPI documents
//!
//! The pipeline parses a document once, aggregates the imports every
//! generated module needs, renders a tree of Tera templates and writes the
//! formatted result, together with pydantic data models, to an output
//! directory.
#![deny(unsafe_code)]

pub mod config;
pub mod generation;
pub mod infrastructure;

pub use config::Config;
pub use generation::{GenerationError, GenerationReport, Generator, SchemaDocument, generate_code};
