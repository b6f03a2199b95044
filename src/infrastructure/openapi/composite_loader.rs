//! Composite schema loader that picks a strategy from the source string

use async_trait::async_trait;

use super::{FileSchemaLoader, HttpSchemaLoader, STDIN_SOURCE, StdinSchemaLoader};
use crate::generation::{Result, SchemaDocument, SchemaLoader};

/// Dispatches `-` to stdin, `http(s)://` to HTTP and anything else to a file read
pub struct CompositeSchemaLoader {
    http: HttpSchemaLoader,
    file: FileSchemaLoader,
    stdin: StdinSchemaLoader,
}

impl CompositeSchemaLoader {
    pub fn new() -> Result<Self> {
        Ok(Self {
            http: HttpSchemaLoader::new()?,
            file: FileSchemaLoader::new(),
            stdin: StdinSchemaLoader,
        })
    }
}

#[async_trait]
impl SchemaLoader for CompositeSchemaLoader {
    async fn load(&self, source: &str) -> Result<SchemaDocument> {
        tracing::debug!("CompositeSchemaLoader: Loading from source: {source}");

        if source == STDIN_SOURCE {
            tracing::debug!("CompositeSchemaLoader: Using stdin loader");
            self.stdin.load(source).await
        } else if source.starts_with("http://") || source.starts_with("https://") {
            tracing::debug!("CompositeSchemaLoader: Using HTTP loader");
            self.http.load(source).await
        } else {
            tracing::debug!("CompositeSchemaLoader: Using file loader");
            self.file.load(source).await
        }
    }
}
