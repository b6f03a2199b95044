//! File-based schema loader
//!
//! This loader handles only file I/O. Parsing is done by the OpenApiParser.

use async_trait::async_trait;
use tokio::fs;

use crate::generation::{GenerationError, Result, SchemaDocument, SchemaLoader};

/// Loads OpenAPI documents from local files
pub struct FileSchemaLoader;

impl FileSchemaLoader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileSchemaLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SchemaLoader for FileSchemaLoader {
    async fn load(&self, source: &str) -> Result<SchemaDocument> {
        let text = fs::read_to_string(source)
            .await
            .map_err(|e| GenerationError::file_system(source, e))?;
        Ok(SchemaDocument::new(source, text))
    }
}
