use crate::core::Storage;
use crate::utils::error::Result;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;

/// Storage rooted at a directory on local disk. The directory is created on
/// the first write.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.base_path.join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(full_path, data).await?;
        Ok(())
    }

    async fn list_files(&self) -> Result<Vec<String>> {
        let mut entries = match fs::read_dir(&self.base_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }

    async fn remove_file(&self, path: &str) -> Result<()> {
        fs::remove_file(self.base_path.join(path)).await?;
        Ok(())
    }

    fn location(&self, path: &str) -> String {
        self.base_path.join(path).display().to_string()
    }
}
