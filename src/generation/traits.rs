//! Port interfaces for the generation domain

use async_trait::async_trait;

use crate::generation::{ModelSource, ParserOutput, Result, SchemaDocument};

/// Turns document text into structured operations and model source
pub trait SchemaParser {
    /// Operations, info, declared imports and the type graph behind them
    fn parse_paths(&self) -> Result<ParserOutput>;

    /// Data-model source for the document's reusable schemas
    fn parse_models(&self) -> Result<ModelSource>;
}

/// Pretty-prints generated source.
///
/// Implementations must be deterministic and idempotent:
/// `format(format(x)) == format(x)`.
#[async_trait]
pub trait CodeFormatter: Send + Sync {
    async fn format(&self, code: &str) -> Result<String>;
}

/// Fetches an OpenAPI document from some source
#[async_trait]
pub trait SchemaLoader: Send + Sync {
    async fn load(&self, source: &str) -> Result<SchemaDocument>;
}
