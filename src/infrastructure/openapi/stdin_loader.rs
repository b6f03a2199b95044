//! Reads the schema document from standard input

use async_trait::async_trait;
use tokio::io::AsyncReadExt;

use crate::generation::{GenerationError, Result, SchemaDocument, SchemaLoader};

/// Source argument that selects standard input
pub const STDIN_SOURCE: &str = "-";

/// Document name used in provenance headers for piped input
pub const STDIN_NAME: &str = "<stdin>";

pub struct StdinSchemaLoader;

#[async_trait]
impl SchemaLoader for StdinSchemaLoader {
    async fn load(&self, _source: &str) -> Result<SchemaDocument> {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .map_err(|e| GenerationError::Load {
                location: STDIN_NAME.to_string(),
                message: e.to_string(),
            })?;
        Ok(SchemaDocument::new(STDIN_NAME, text))
    }
}
