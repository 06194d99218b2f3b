use crate::core::interfaces::FileSystemService;
use crate::utils::{Result, SproutError};
use chrono::{DateTime, Utc};
use std::fs::FileTimes;
use std::path::Path;
use std::time::SystemTime;
use tokio::fs;

pub struct TokioFileSystemService;

#[async_trait::async_trait]
impl FileSystemService for TokioFileSystemService {
    async fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).await.map_err(SproutError::Io)
    }

    async fn write_bytes(
        &self,
        path: &Path,
        bytes: &[u8],
        mtime: Option<DateTime<Utc>>,
    ) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_directory(parent).await?;
            }
        }

        fs::write(path, bytes).await.map_err(SproutError::Io)?;

        let stamp = mtime.map(SystemTime::from).unwrap_or_else(SystemTime::now);
        let file = std::fs::OpenOptions::new().append(true).open(path)?;
        file.set_times(FileTimes::new().set_accessed(stamp).set_modified(stamp))?;
        Ok(())
    }

    async fn create_directory(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).await.map_err(SproutError::Io)
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}
