//! Filesystem-based template loader
//!
//! Loads every file below a directory, typically specified via the
//! --template-dir CLI flag. Symbolic links are followed.

use std::path::{Path, PathBuf};
use tokio::fs;

use super::{TemplateFile, TemplateSource, TemplateTree};
use crate::generation::{GenerationError, Result};

/// Load the template tree rooted at `root`
pub async fn load_template_dir(root: &Path) -> Result<TemplateTree> {
    let metadata = fs::metadata(root)
        .await
        .map_err(|e| GenerationError::file_system(root, e))?;
    if !metadata.is_dir() {
        return Err(GenerationError::file_system(
            root,
            std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
        ));
    }

    let mut files = Vec::new();
    let mut pending: Vec<PathBuf> = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| GenerationError::file_system(&dir, e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| GenerationError::file_system(&dir, e))?
        {
            let path = entry.path();
            let metadata = fs::metadata(&path)
                .await
                .map_err(|e| GenerationError::file_system(&path, e))?;

            if metadata.is_dir() {
                pending.push(path);
            } else if metadata.is_file() {
                let content = fs::read_to_string(&path)
                    .await
                    .map_err(|e| GenerationError::file_system(&path, e))?;
                let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
                files.push(TemplateFile::new(relative, content));
            }
        }
    }

    tracing::debug!(
        "Loaded {} templates from {}",
        files.len(),
        root.display()
    );
    Ok(TemplateTree::new(
        TemplateSource::FileSystem(root.to_path_buf()),
        files,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_tree(dir: &Path) {
        fs::create_dir_all(dir.join("routers/nested")).await.unwrap();
        fs::write(dir.join("main.jinja2"), "app = FastAPI()").await.unwrap();
        fs::write(dir.join("routers/items.jinja2"), "# items").await.unwrap();
        fs::write(dir.join("routers/nested/deep.tpl"), "# deep").await.unwrap();
    }

    #[tokio::test]
    async fn test_load_nested_tree() {
        let temp_dir = TempDir::new().unwrap();
        create_test_tree(temp_dir.path()).await;

        let tree = load_template_dir(temp_dir.path()).await.unwrap();
        assert_eq!(
            tree.source,
            TemplateSource::FileSystem(temp_dir.path().to_path_buf())
        );

        let names: Vec<_> = tree.files().iter().map(TemplateFile::name).collect();
        assert_eq!(
            names,
            vec![
                "main.jinja2",
                "routers/items.jinja2",
                "routers/nested/deep.tpl"
            ]
        );
        assert_eq!(tree.files()[1].content, "# items");
    }

    #[tokio::test]
    async fn test_empty_directory_gives_empty_tree() {
        let temp_dir = TempDir::new().unwrap();
        let tree = load_template_dir(temp_dir.path()).await.unwrap();
        assert!(tree.is_empty());
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let result = load_template_dir(Path::new("/nonexistent/templates")).await;
        match result.unwrap_err() {
            GenerationError::FileSystem { path, .. } => {
                assert_eq!(path, PathBuf::from("/nonexistent/templates"));
            }
            other => panic!("Expected FileSystem error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_file_instead_of_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("main.jinja2");
        fs::write(&file, "").await.unwrap();
        assert!(matches!(
            load_template_dir(&file).await,
            Err(GenerationError::FileSystem { .. })
        ));
    }
}
