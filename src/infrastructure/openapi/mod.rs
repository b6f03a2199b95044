//! OpenAPI loading, parsing and model generation

pub mod composite_loader;
pub mod file_loader;
pub mod http_loader;
pub mod models;
pub mod parser;
pub mod schema_types;
pub mod stdin_loader;

pub use composite_loader::CompositeSchemaLoader;
pub use file_loader::FileSchemaLoader;
pub use http_loader::HttpSchemaLoader;
pub use models::ModelGenerator;
pub use parser::OpenApiParser;
pub use schema_types::TypeBuilder;
pub use stdin_loader::{STDIN_NAME, STDIN_SOURCE, StdinSchemaLoader};
